// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed column handles.
//!
//! Generated schema types expose one associated constant per column:
//!
//! ```rust,ignore
//! impl MovieTable {
//!     pub const TITLE: Column<MovieTable, String> = Column::new("movie", "title");
//!     pub const DIRECTOR_ID: Column<MovieTable, EntityId<i64, DirectorTable>> =
//!         Column::new("movie", "director_id");
//! }
//!
//! let filter = MovieTable::DIRECTOR_ID.eq(director.id);
//! ```
//!
//! The value type parameter is the column's resolved type, so predicates
//! only accept values convertible into it.

use std::{fmt, marker::PhantomData};

use crate::{
    expr::{ColumnRef, CompareOp, Expr},
    value::SqlValue
};

/// Handle to column of table `T` holding values of type `V`.
pub struct Column<T, V> {
    table:  &'static str,
    name:   &'static str,
    marker: PhantomData<fn() -> (T, V)>
}

impl<T, V> Column<T, V> {
    /// Handle for `table.name`.
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self {
            table,
            name,
            marker: PhantomData
        }
    }

    /// Owning table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Qualified reference used in rendered SQL.
    #[must_use]
    pub const fn column_ref(&self) -> ColumnRef {
        ColumnRef {
            table: self.table,
            name:  self.name
        }
    }

    /// `column IS NULL`
    #[must_use]
    pub const fn is_null(&self) -> Expr {
        Expr::IsNull {
            column:  self.column_ref(),
            negated: false
        }
    }

    /// `column IS NOT NULL`
    #[must_use]
    pub const fn is_not_null(&self) -> Expr {
        Expr::IsNull {
            column:  self.column_ref(),
            negated: true
        }
    }

    /// `column LIKE pattern`
    #[must_use]
    pub fn like(&self, pattern: impl Into<String>) -> Expr {
        Expr::Like {
            column:  self.column_ref(),
            pattern: pattern.into()
        }
    }
}

impl<T, V: SqlValue> Column<T, V> {
    fn compare(&self, op: CompareOp, value: V) -> Expr {
        Expr::Compare {
            column: self.column_ref(),
            op,
            value: value.to_value()
        }
    }

    /// `column = value`
    #[must_use]
    pub fn eq(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Eq, value.into())
    }

    /// `column <> value`
    #[must_use]
    pub fn ne(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Ne, value.into())
    }

    /// `column < value`
    #[must_use]
    pub fn lt(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Lt, value.into())
    }

    /// `column <= value`
    #[must_use]
    pub fn le(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Le, value.into())
    }

    /// `column > value`
    #[must_use]
    pub fn gt(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Gt, value.into())
    }

    /// `column >= value`
    #[must_use]
    pub fn ge(&self, value: impl Into<V>) -> Expr {
        self.compare(CompareOp::Ge, value.into())
    }

    /// `column IN (values)`
    #[must_use]
    pub fn is_in<I>(&self, values: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<V>
    {
        Expr::In {
            column: self.column_ref(),
            values: values
                .into_iter()
                .map(|value| value.into().to_value())
                .collect()
        }
    }
}

impl<T, V> Clone for Column<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Column<T, V> {}

impl<T, V> fmt::Debug for Column<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({}.{})", self.table, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id::EntityId, value::Value};

    struct MovieTable;
    struct DirectorTable;

    const TITLE: Column<MovieTable, String> = Column::new("movie", "title");
    const DIRECTOR_ID: Column<MovieTable, EntityId<i64, DirectorTable>> =
        Column::new("movie", "director_id");
    const ORIGINAL: Column<MovieTable, Option<String>> = Column::new("movie", "original_title");

    #[test]
    fn eq_accepts_raw_value_for_identifier_column() {
        let expr = DIRECTOR_ID.eq(7_i64);
        assert_eq!(
            expr,
            Expr::Compare {
                column: ColumnRef {
                    table: "movie",
                    name:  "director_id"
                },
                op:     CompareOp::Eq,
                value:  Value::Integer(7)
            }
        );
    }

    #[test]
    fn eq_accepts_str_for_string_column() {
        let (sql, binds) = TITLE.eq("Psycho").to_sql();
        assert_eq!(sql, "\"movie\".\"title\" = ?");
        assert_eq!(binds, vec![Value::Text("Psycho".into())]);
    }

    #[test]
    fn nullable_column_helpers() {
        assert_eq!(
            ORIGINAL.is_null().to_sql().0,
            "\"movie\".\"original_title\" IS NULL"
        );
        assert_eq!(
            ORIGINAL.eq(Some("Rebecca".to_string())).to_sql().1,
            vec![Value::Text("Rebecca".into())]
        );
    }

    #[test]
    fn in_list_binds_each_value() {
        let (sql, binds) = DIRECTOR_ID.is_in([1_i64, 2, 3]).to_sql();
        assert_eq!(sql, "\"movie\".\"director_id\" IN (?, ?, ?)");
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn debug_shows_qualified_name() {
        assert_eq!(format!("{TITLE:?}"), "Column(movie.title)");
    }
}
