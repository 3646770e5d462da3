// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime error type for repository operations.

/// Errors returned by [`Repository`](crate::Repository) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying driver failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A table in the related set shares no foreign key with the base
    /// table or any table joined before it.
    #[error("table `{table}` has no foreign key relation to `{base}` or any joined table")]
    UnrelatedTable {
        /// Table the query selects from.
        base:  &'static str,
        /// Table that could not be joined.
        table: &'static str
    },

    /// Joining a table onto itself needs aliases the generated schema does
    /// not carry.
    #[error("table `{table}` cannot be joined onto itself")]
    SelfJoin {
        /// Offending table.
        table: &'static str
    },

    /// Two foreign keys between the same pair of tables point at the same
    /// column, so the join condition is not unique.
    #[error(
        "`{from}` has foreign keys `{first}` and `{second}` to the same column of `{to}`; the join \
         is ambiguous"
    )]
    AmbiguousJoin {
        /// Table holding the foreign keys.
        from:   &'static str,
        /// Referenced table.
        to:     &'static str,
        /// First foreign key column.
        first:  &'static str,
        /// Second foreign key column.
        second: &'static str
    },

    /// An insert succeeded but the inserted row could not be read back.
    #[error("inserted row in `{table}` could not be read back")]
    MissingInsertedRow {
        /// Table the row was inserted into.
        table: &'static str
    }
}

/// Result alias used across the runtime and generated repositories.
pub type Result<T> = std::result::Result<T, Error>;
