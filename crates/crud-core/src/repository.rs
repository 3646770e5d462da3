// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generic typed repository.
//!
//! [`Repository`] borrows a connection for its lifetime and performs every
//! CRUD operation for one schema type. Generated code adds entity-specific
//! operations (`find_by_id`, `delete_by_id`, `create_with_related`) through
//! an extension trait implemented for `Repository<'c, EntityTable>`.
//!
//! The repository never opens, pools or retries connections. Callers scope
//! work with whatever transaction discipline they need; a
//! `sqlx::Transaction` derefs to a connection and works the same way.
//!
//! # Related set
//!
//! ```rust,ignore
//! let mut repo = DirectorTable::repo(&mut conn).with_related(MovieTable);
//! let directors = repo.select_all().await?; // movies populated
//! ```

use std::marker::PhantomData;

use sqlx::SqliteConnection;
use tracing::debug;

use crate::{
    error::{Error, Result},
    expr::Expr,
    query::{SelectSpec, fetch_records},
    select::TypedSelect,
    table::{PendingWrite, Related, Table, TableDef},
    value::bind_values
};

/// CRUD operations for table `T` over a borrowed connection.
pub struct Repository<'c, T: Table> {
    conn:    &'c mut SqliteConnection,
    related: Vec<&'static TableDef>,
    table:   PhantomData<fn() -> T>
}

impl<'c, T: Table> Repository<'c, T> {
    /// Repository over `conn` with an empty related set.
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self {
            conn,
            related: Vec::new(),
            table: PhantomData
        }
    }

    /// Add `R` to the related set, builder style.
    #[must_use]
    pub fn with_related<R: Table>(mut self, _table: R) -> Self {
        self.include::<R>();
        self
    }

    /// Add `R` to the related set. Adding a table twice has no effect.
    pub fn include<R: Table>(&mut self) -> &mut Self {
        let def = R::def();
        if !self.related.iter().any(|present| present.name == def.name) {
            self.related.push(def);
        }
        self
    }

    /// Empty the related set.
    pub fn clear_related(&mut self) -> &mut Self {
        self.related.clear();
        self
    }

    /// Current related set.
    #[must_use]
    pub fn related(&self) -> Related<'_> {
        Related::new(&self.related)
    }

    /// The borrowed connection, for statements the repository does not
    /// cover.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut *self.conn
    }

    /// Repository for another table on the same connection.
    pub fn repo_for<R: Table>(&mut self) -> Repository<'_, R> {
        Repository::new(&mut *self.conn)
    }

    /// Every record, realized.
    ///
    /// # Errors
    ///
    /// Driver and join errors.
    pub async fn select_all(&mut self) -> Result<Vec<T::Record>> {
        fetch_records::<T>(&mut *self.conn, &self.related, &SelectSpec::default()).await
    }

    /// Every record, lazily.
    ///
    /// Nothing runs until [`TypedSelect::stream`] is called, and each call
    /// runs the query again.
    pub fn select_all_lazy(&mut self) -> TypedSelect<'_, T> {
        self.select()
    }

    /// Start a filtered select.
    pub fn select(&mut self) -> TypedSelect<'_, T> {
        TypedSelect::new(&mut *self.conn, &self.related)
    }

    /// First record matching `filter`.
    ///
    /// # Errors
    ///
    /// Driver and join errors.
    pub async fn find_one(&mut self, filter: Expr) -> Result<Option<T::Record>> {
        self.select().where_(filter).first().await
    }

    /// Record with primary key `id`.
    ///
    /// # Errors
    ///
    /// Driver and join errors.
    pub async fn find_by_key(&mut self, id: T::Id) -> Result<Option<T::Record>> {
        self.find_one(T::key_condition(&id)).await
    }

    /// Insert a full record, key columns included.
    ///
    /// # Errors
    ///
    /// Driver errors, constraint violations among them.
    pub async fn insert(&mut self, record: &T::Record) -> Result<u64> {
        let mut row = PendingWrite::new();
        T::write(record, &mut row);
        Ok(self.execute_insert(&row).await?.0)
    }

    /// Insert a full record and read it back.
    ///
    /// # Errors
    ///
    /// Driver errors, or [`Error::MissingInsertedRow`].
    pub async fn insert_returning(&mut self, record: &T::Record) -> Result<T::Record> {
        let mut row = PendingWrite::new();
        T::write(record, &mut row);
        let (_, rowid) = self.execute_insert(&row).await?;
        self.read_back(rowid).await
    }

    /// Insert without auto-increment columns; the store generates them.
    ///
    /// # Errors
    ///
    /// Driver errors, constraint violations among them.
    pub async fn create(&mut self, data: &T::Data) -> Result<u64> {
        let mut row = PendingWrite::new();
        T::write_except_auto_increment(data, &mut row);
        Ok(self.execute_insert(&row).await?.0)
    }

    /// Insert without auto-increment columns and return the stored record,
    /// generated key included.
    ///
    /// # Errors
    ///
    /// Driver errors, or [`Error::MissingInsertedRow`].
    pub async fn create_returning(&mut self, data: &T::Data) -> Result<T::Record> {
        let mut row = PendingWrite::new();
        T::write_except_auto_increment(data, &mut row);
        let (_, rowid) = self.execute_insert(&row).await?;
        self.read_back(rowid).await
    }

    /// Overwrite the non-generated columns of every row matching `filter`.
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn update_where(&mut self, filter: Expr, data: &T::Data) -> Result<u64> {
        let mut row = PendingWrite::new();
        T::write_except_auto_increment(data, &mut row);
        self.execute_update(&row, &filter).await
    }

    /// Overwrite the row with `record`'s primary key.
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn update(&mut self, record: &T::Record) -> Result<u64> {
        let mut row = PendingWrite::new();
        T::write(record, &mut row);
        let filter = T::key_condition(&T::make_pk(record));
        self.execute_update(&row, &filter).await
    }

    /// Delete the row with `record`'s primary key.
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn delete(&mut self, record: &T::Record) -> Result<u64> {
        let filter = T::key_condition(&T::make_pk(record));
        self.delete_where(filter).await
    }

    /// Delete the row with primary key `id`.
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn delete_by_key(&mut self, id: T::Id) -> Result<u64> {
        self.delete_where(T::key_condition(&id)).await
    }

    /// Delete every row matching `filter`.
    ///
    /// # Errors
    ///
    /// Driver errors.
    pub async fn delete_where(&mut self, filter: Expr) -> Result<u64> {
        let mut sql = format!("DELETE FROM \"{}\" WHERE ", T::def().name);
        let mut binds = Vec::new();
        filter.render(&mut sql, &mut binds);
        debug!(target: "crud_core", %sql, ?binds, "delete");
        let result = bind_values(sqlx::query(&sql), &binds)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn execute_insert(&mut self, row: &PendingWrite) -> Result<(u64, i64)> {
        let table = T::def().name;
        let sql = if row.is_empty() {
            format!("INSERT INTO \"{table}\" DEFAULT VALUES")
        } else {
            let columns: Vec<String> = row.columns().iter().map(|c| format!("\"{c}\"")).collect();
            let placeholders = vec!["?"; columns.len()].join(", ");
            format!(
                "INSERT INTO \"{table}\" ({}) VALUES ({placeholders})",
                columns.join(", ")
            )
        };
        debug!(target: "crud_core", %sql, binds = ?row.values(), "insert");
        let result = bind_values(sqlx::query(&sql), row.values())
            .execute(&mut *self.conn)
            .await?;
        Ok((result.rows_affected(), result.last_insert_rowid()))
    }

    async fn execute_update(&mut self, row: &PendingWrite, filter: &Expr) -> Result<u64> {
        if row.is_empty() {
            return Ok(0);
        }
        let assignments: Vec<String> = row.columns().iter().map(|c| format!("\"{c}\" = ?")).collect();
        let mut sql = format!(
            "UPDATE \"{}\" SET {} WHERE ",
            T::def().name,
            assignments.join(", ")
        );
        let mut binds = row.values().to_vec();
        filter.render(&mut sql, &mut binds);
        debug!(target: "crud_core", %sql, ?binds, "update");
        let result = bind_values(sqlx::query(&sql), &binds)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn read_back(&mut self, rowid: i64) -> Result<T::Record> {
        let table = T::def().name;
        self.find_one(Expr::RowId {
            table,
            rowid
        })
        .await?
        .ok_or(Error::MissingInsertedRow {
            table
        })
    }
}
