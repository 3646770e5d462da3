// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! DDL rendering and schema helpers.
//!
//! ```text
//! CREATE TABLE IF NOT EXISTS "movie" (
//!     "id" INTEGER PRIMARY KEY AUTOINCREMENT,
//!     "title" TEXT NOT NULL,
//!     "director_id" INTEGER NOT NULL,
//!     FOREIGN KEY ("director_id") REFERENCES "director" ("id")
//! )
//! ```

use std::fmt::Write as _;

use sqlx::SqliteConnection;
use tracing::debug;

use crate::{error::Result, table::TableDef};

fn quoted_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

impl TableDef {
    /// `CREATE TABLE IF NOT EXISTS` statement for this table.
    #[must_use]
    pub fn create_statement(&self) -> String {
        let mut parts = Vec::new();

        if let Some(id) = self.id {
            let auto = if id.auto_increment { " AUTOINCREMENT" } else { "" };
            parts.push(format!("\"{}\" INTEGER PRIMARY KEY{auto}", id.name));
        }

        for column in self.columns {
            let mut part = format!("\"{}\" {}", column.name, column.sql_type);
            if !column.nullable {
                part.push_str(" NOT NULL");
            }
            if let Some(default) = column.default {
                let _ = write!(part, " DEFAULT {default}");
            }
            parts.push(part);
        }

        if let Some(key) = self.primary_key {
            parts.push(format!("PRIMARY KEY ({})", quoted_list(key)));
        }

        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY (\"{}\") REFERENCES \"{}\" (\"{}\")",
                fk.column, fk.target_table, fk.target_column
            ));
        }

        for unique in self.unique_indexes {
            parts.push(format!(
                "CONSTRAINT \"{}\" UNIQUE ({})",
                unique.name,
                quoted_list(unique.columns)
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (\n    {}\n)",
            self.name,
            parts.join(",\n    ")
        )
    }

    /// `DROP TABLE IF EXISTS` statement for this table.
    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS \"{}\"", self.name)
    }
}

/// Create `tables` in order.
///
/// # Errors
///
/// Returns the first driver error.
pub async fn create_tables(conn: &mut SqliteConnection, tables: &[&TableDef]) -> Result<()> {
    for table in tables {
        let sql = table.create_statement();
        debug!(target: "crud_core", %sql, "create table");
        sqlx::query(&sql).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Drop `tables` in reverse order.
///
/// # Errors
///
/// Returns the first driver error.
pub async fn drop_tables(conn: &mut SqliteConnection, tables: &[&TableDef]) -> Result<()> {
    for table in tables.iter().rev() {
        let sql = table.drop_statement();
        debug!(target: "crud_core", %sql, "drop table");
        sqlx::query(&sql).execute(&mut *conn).await?;
    }
    Ok(())
}
