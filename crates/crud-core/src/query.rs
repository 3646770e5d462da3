// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Select compilation and row grouping.
//!
//! # Joins
//!
//! Each table of the related set is left-joined in insertion order. The
//! join condition comes from the foreign keys between the new table and the
//! base table or any table joined before it, in either direction:
//!
//! ```text
//! base movie, related [director]
//!   movie.director_id -> director.id          LEFT JOIN "director" ON "movie"."director_id" = "director"."id"
//!
//! base director, related [movie]
//!   movie.director_id -> director.id          LEFT JOIN "movie" ON "movie"."director_id" = "director"."id"
//! ```
//!
//! With joins, one record spans several rows. Rows are grouped by the base
//! record's primary key before back-references are attached. `LIMIT` and
//! `DISTINCT` apply to rows.
//!
//! Two foreign keys from one table to the same column of another leave the
//! join without a single condition; such a join fails with
//! [`Error::AmbiguousJoin`].

use std::fmt::Write as _;

use sqlx::{SqliteConnection, sqlite::SqliteRow};
use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    expr::{ColumnRef, Expr},
    id::KeyValue,
    table::{Related, Table, TableDef},
    value::{Value, bind_values}
};

/// Sort order for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,

    /// Descending.
    Desc
}

impl SortDirection {
    /// SQL keyword.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC"
        }
    }
}

/// Clauses of a select beyond the table list.
#[derive(Debug, Clone, Default)]
pub(crate) struct SelectSpec {
    pub filter:   Option<Expr>,
    pub limit:    Option<u64>,
    pub distinct: bool,
    pub order:    Vec<(ColumnRef, SortDirection)>
}

fn join_condition(
    joined: &[&'static TableDef],
    table: &'static TableDef
) -> Result<Option<String>> {
    let links = |from: &'static TableDef, to: &'static TableDef| -> Result<Vec<String>> {
        let fks: Vec<_> = from
            .foreign_keys
            .iter()
            .filter(|fk| fk.target_table == to.name)
            .collect();
        for (index, fk) in fks.iter().enumerate() {
            if let Some(other) = fks[index + 1..]
                .iter()
                .find(|other| other.target_column == fk.target_column)
            {
                return Err(Error::AmbiguousJoin {
                    from:   from.name,
                    to:     to.name,
                    first:  fk.column,
                    second: other.column
                });
            }
        }
        Ok(fks
            .iter()
            .map(|fk| {
                format!(
                    "\"{}\".\"{}\" = \"{}\".\"{}\"",
                    from.name, fk.column, to.name, fk.target_column
                )
            })
            .collect())
    };

    for &present in joined {
        let mut parts = links(present, table)?;
        if parts.is_empty() {
            parts = links(table, present)?;
        }
        if !parts.is_empty() {
            return Ok(Some(parts.join(" AND ")));
        }
    }
    Ok(None)
}

/// Render a select over `base` joined with `related`.
pub(crate) fn compile_select(
    base: &'static TableDef,
    related: &[&'static TableDef],
    spec: &SelectSpec
) -> Result<(String, Vec<Value>)> {
    let mut sql = String::from("SELECT ");
    if spec.distinct {
        sql.push_str("DISTINCT ");
    }

    let tables: Vec<&'static TableDef> = std::iter::once(base).chain(related.iter().copied()).collect();
    let columns: Vec<String> = tables
        .iter()
        .flat_map(|def| {
            def.column_names().map(move |column| {
                format!("\"{}\".\"{}\" AS \"{}\"", def.name, column, def.alias(column))
            })
        })
        .collect();
    sql.push_str(&columns.join(", "));
    let _ = write!(sql, " FROM \"{}\"", base.name);

    let mut joined = vec![base];
    for &table in related {
        if table.name == base.name {
            return Err(Error::SelfJoin {
                table: table.name
            });
        }
        let condition = join_condition(&joined, table)?.ok_or(Error::UnrelatedTable {
            base:  base.name,
            table: table.name
        })?;
        let _ = write!(sql, " LEFT JOIN \"{}\" ON {condition}", table.name);
        joined.push(table);
    }

    let mut binds = Vec::new();
    if let Some(filter) = &spec.filter {
        sql.push_str(" WHERE ");
        filter.render(&mut sql, &mut binds);
    }

    if !spec.order.is_empty() {
        let order: Vec<String> = spec
            .order
            .iter()
            .map(|(column, direction)| {
                format!("\"{}\".\"{}\" {}", column.table, column.name, direction.as_sql())
            })
            .collect();
        let _ = write!(sql, " ORDER BY {}", order.join(", "));
    }

    if let Some(limit) = spec.limit {
        let _ = write!(sql, " LIMIT {limit}");
    }

    Ok((sql, binds))
}

/// Run a select and convert its rows into records.
pub(crate) async fn fetch_records<T: Table>(
    conn: &mut SqliteConnection,
    related: &[&'static TableDef],
    spec: &SelectSpec
) -> Result<Vec<T::Record>> {
    let (sql, binds) = compile_select(T::def(), related, spec)?;
    debug!(target: "crud_core", %sql, ?binds, "select");
    let rows = bind_values(sqlx::query(&sql), &binds).fetch_all(&mut *conn).await?;

    if related.is_empty() {
        return rows
            .iter()
            .map(|row| T::from_row(row).map_err(Error::from))
            .collect();
    }
    group_rows::<T>(&rows, Related::new(related))
}

struct Group<'r, R> {
    key:    Vec<Value>,
    record: R,
    rows:   Vec<&'r SqliteRow>
}

/// Fold joined rows into one record per base key, in first-seen order.
pub(crate) fn group_rows<T: Table>(rows: &[SqliteRow], related: Related<'_>) -> Result<Vec<T::Record>> {
    let mut groups: Vec<Group<'_, T::Record>> = Vec::new();
    for row in rows {
        let record = T::from_joined_row(row)?;
        let key = T::make_pk(&record).key_values();
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.rows.push(row),
            None => groups.push(Group {
                key,
                record,
                rows: vec![row]
            })
        }
    }
    trace!(target: "crud_core", rows = rows.len(), records = groups.len(), "grouped joined rows");

    Ok(groups
        .into_iter()
        .map(|mut group| {
            T::attach_back_references(&mut group.record, &group.rows, related);
            group.record
        })
        .collect())
}
