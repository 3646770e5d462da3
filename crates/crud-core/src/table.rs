// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Table descriptors and the [`Table`] trait.
//!
//! Every generated schema type implements [`Table`]. The trait carries the
//! static [`TableDef`] (what the table looks like) and the converters
//! between rows and records (how a record is read and written).
//!
//! # Row aliases
//!
//! Selects alias every column as `<table>__<column>` so that the columns of
//! several joined tables can live in one row without clashing. Converters
//! read by alias; see [`TableDef::alias`].

use sqlx::{Row, ValueRef, sqlite::SqliteRow};
use tracing::trace;

use crate::{
    expr::{ColumnRef, CompareOp, Expr},
    id::KeyValue,
    value::{SqlValue, Value}
};

/// Key column provided by the base table for simple integer identifiers.
///
/// Such a column is declared once as `INTEGER PRIMARY KEY` and is not
/// repeated in [`TableDef::columns`] or [`TableDef::primary_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdColumnDef {
    /// Column name.
    pub name:           &'static str,
    /// Whether the store generates the value.
    pub auto_increment: bool
}

/// One stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name:     &'static str,
    /// Declared SQL type.
    pub sql_type: &'static str,
    /// Whether `NULL` is allowed.
    pub nullable: bool,
    /// SQL default expression.
    pub default:  Option<&'static str>
}

/// Foreign key from a local column to a column of another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    /// Local column.
    pub column:        &'static str,
    /// Referenced table.
    pub target_table:  &'static str,
    /// Referenced column.
    pub target_column: &'static str
}

/// Named unique constraint over one or more columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueDef {
    /// Constraint name.
    pub name:    &'static str,
    /// Constrained columns.
    pub columns: &'static [&'static str]
}

/// Static description of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    /// Table name.
    pub name:           &'static str,
    /// Base-provided key column, for simple integer keys.
    pub id:             Option<IdColumnDef>,
    /// Stored columns in declaration order.
    pub columns:        &'static [ColumnDef],
    /// Explicit primary key declaration, absent when [`id`](Self::id) is set.
    pub primary_key:    Option<&'static [&'static str]>,
    /// Outgoing foreign keys.
    pub foreign_keys:   &'static [ForeignKeyDef],
    /// Unique constraints.
    pub unique_indexes: &'static [UniqueDef]
}

impl TableDef {
    /// Names of all columns, key column first when base-provided.
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.id
            .iter()
            .map(|id| id.name)
            .chain(self.columns.iter().map(|column| column.name))
    }

    /// Primary key columns in key order.
    #[must_use]
    pub fn key_columns(&self) -> Vec<&'static str> {
        match (self.id, self.primary_key) {
            (Some(id), _) => vec![id.name],
            (None, Some(key)) => key.to_vec(),
            (None, None) => Vec::new()
        }
    }

    /// Row alias of `column` in selects.
    #[must_use]
    pub fn alias(&self, column: &str) -> String {
        format!("{}__{}", self.name, column)
    }

    /// Qualified reference to `column`.
    #[must_use]
    pub const fn column(&self, name: &'static str) -> ColumnRef {
        ColumnRef {
            table: self.name,
            name
        }
    }
}

/// Column values collected for an insert or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingWrite {
    columns: Vec<&'static str>,
    values:  Vec<Value>
}

impl PendingWrite {
    /// Empty write.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values:  Vec::new()
        }
    }

    /// Set `column` to `value`.
    pub fn set<V: SqlValue + ?Sized>(&mut self, column: &'static str, value: &V) {
        self.columns.push(column);
        self.values.push(value.to_value());
    }

    /// Columns in the order they were set.
    #[must_use]
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    /// Values matching [`columns`](Self::columns).
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Whether nothing was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Tables requested for joining by the current repository.
#[derive(Debug, Clone, Copy)]
pub struct Related<'a> {
    tables: &'a [&'static TableDef]
}

impl<'a> Related<'a> {
    /// Wrap a related set.
    #[must_use]
    pub const fn new(tables: &'a [&'static TableDef]) -> Self {
        Self {
            tables
        }
    }

    /// Whether `R` was requested.
    #[must_use]
    pub fn contains<R: Table>(&self) -> bool {
        let name = R::def().name;
        self.tables.iter().any(|def| def.name == name)
    }

    /// Whether nothing was requested.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// A generated schema type.
///
/// `Record` is the user's entity struct. `Data` is the insert-time shape
/// without auto-increment columns; it is the record itself when the entity
/// has no separate create-data type.
pub trait Table: Sized + Send + Sync + 'static {
    /// Entity record.
    type Record: Send + Sync;

    /// Insert-time shape.
    type Data: Send + Sync;

    /// Primary key representation.
    type Id: KeyValue + Send + Sync;

    /// Static table description.
    fn def() -> &'static TableDef;

    /// Read the record's own columns from a row. Reference fields stay empty.
    ///
    /// # Errors
    ///
    /// Fails when a column is missing or cannot be decoded.
    fn from_row(row: &SqliteRow) -> Result<Self::Record, sqlx::Error>;

    /// Read the record and every forward reference present in the row.
    ///
    /// # Errors
    ///
    /// Fails when one of the record's own columns cannot be decoded.
    fn from_joined_row(row: &SqliteRow) -> Result<Self::Record, sqlx::Error> {
        Self::from_row(row)
    }

    /// Fill back-reference fields from the rows sharing this record's key.
    fn attach_back_references(
        _record: &mut Self::Record,
        _rows: &[&SqliteRow],
        _related: Related<'_>
    ) {
    }

    /// Write every column of `record`.
    fn write(record: &Self::Record, row: &mut PendingWrite);

    /// Write every column except auto-increment ones.
    fn write_except_auto_increment(data: &Self::Data, row: &mut PendingWrite);

    /// Primary key of `record`.
    fn make_pk(record: &Self::Record) -> Self::Id;

    /// Predicate matching exactly the row with key `id`.
    fn key_condition(id: &Self::Id) -> Expr {
        let def = Self::def();
        def.key_columns()
            .into_iter()
            .zip(id.key_values())
            .map(|(column, value)| Expr::Compare {
                column: def.column(column),
                op: CompareOp::Eq,
                value
            })
            .reduce(Expr::and)
            .unwrap_or(Expr::In {
                column: def.column(def.name),
                values: Vec::new()
            })
    }
}

fn key_present(row: &SqliteRow, def: &TableDef) -> bool {
    let keys = def.key_columns();
    !keys.is_empty()
        && keys.iter().all(|column| {
            row.try_get_raw(def.alias(column).as_str())
                .is_ok_and(|value| !value.is_null())
        })
}

/// Read the `R` record joined into `row`, if any.
///
/// Outer joins leave the columns of an unmatched table `NULL`; such rows
/// and rows where `R` was not joined at all yield `None`. A joined record
/// that fails to decode yields `None` as well and is traced.
#[must_use]
pub fn read_related<R: Table>(row: &SqliteRow) -> Option<R::Record> {
    let def = R::def();
    if !key_present(row, def) {
        return None;
    }
    match R::from_row(row) {
        Ok(record) => Some(record),
        Err(err) => {
            trace!(target: "crud_core", table = def.name, %err, "joined record skipped");
            None
        }
    }
}

/// Collect the distinct `R` records joined into `rows`.
#[must_use]
pub fn collect_related<R: Table>(rows: &[&SqliteRow]) -> Vec<R::Record> {
    let mut seen: Vec<Vec<Value>> = Vec::new();
    let mut records = Vec::new();
    for row in rows {
        let Some(record) = read_related::<R>(row) else {
            continue;
        };
        let key = R::make_pk(&record).key_values();
        if !seen.contains(&key) {
            seen.push(key);
            records.push(record);
        }
    }
    records
}
