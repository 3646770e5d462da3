// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Typed select builder.

use futures::{
    StreamExt,
    future,
    stream::{self, BoxStream}
};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::{
    error::{Error, Result},
    expr::Expr,
    query::{SelectSpec, SortDirection, compile_select, fetch_records, group_rows},
    table::{Related, Table, TableDef},
    value::{Value, bind_values}
};

/// A select over table `T` under construction.
///
/// Builder methods consume and return the select:
///
/// ```rust,ignore
/// let movies = repo
///     .select()
///     .where_(MovieTable::DIRECTOR_ID.eq(director.id))
///     .and_where(MovieTable::TITLE.like("The %"))
///     .limit(10)
///     .all()
///     .await?;
/// ```
pub struct TypedSelect<'r, T: Table> {
    conn:     &'r mut SqliteConnection,
    related:  &'r [&'static TableDef],
    spec:     SelectSpec,
    compiled: Option<(String, Vec<Value>)>,
    marker:   std::marker::PhantomData<fn() -> T>
}

impl<'r, T: Table> TypedSelect<'r, T> {
    pub(crate) fn new(conn: &'r mut SqliteConnection, related: &'r [&'static TableDef]) -> Self {
        Self {
            conn,
            related,
            spec: SelectSpec::default(),
            compiled: None,
            marker: std::marker::PhantomData
        }
    }

    fn changed(mut self) -> Self {
        self.compiled = None;
        self
    }

    /// Replace the filter.
    #[must_use]
    pub fn where_(mut self, filter: Expr) -> Self {
        self.spec.filter = Some(filter);
        self.changed()
    }

    /// Conjoin `filter` with the current filter.
    #[must_use]
    pub fn and_where(mut self, filter: Expr) -> Self {
        self.spec.filter = Some(match self.spec.filter.take() {
            Some(current) => current.and(filter),
            None => filter
        });
        self.changed()
    }

    /// Disjoin `filter` with the current filter.
    #[must_use]
    pub fn or_where(mut self, filter: Expr) -> Self {
        self.spec.filter = Some(match self.spec.filter.take() {
            Some(current) => current.or(filter),
            None => filter
        });
        self.changed()
    }

    /// Return at most `limit` rows.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.spec.limit = Some(limit);
        self.changed()
    }

    /// Toggle `SELECT DISTINCT`.
    #[must_use]
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.spec.distinct = distinct;
        self.changed()
    }

    /// Append an `ORDER BY` term.
    #[must_use]
    pub fn order_by<V>(mut self, column: crate::Column<T, V>, direction: SortDirection) -> Self {
        self.spec.order.push((column.column_ref(), direction));
        self.changed()
    }

    /// Rendered SQL and binds, mostly for inspection.
    ///
    /// # Errors
    ///
    /// Join errors.
    pub fn to_sql(&self) -> Result<(String, Vec<Value>)> {
        compile_select(T::def(), self.related, &self.spec)
    }

    /// Run and collect every record.
    ///
    /// # Errors
    ///
    /// Driver and join errors.
    pub async fn all(self) -> Result<Vec<T::Record>> {
        fetch_records::<T>(self.conn, self.related, &self.spec).await
    }

    /// Run and return the first record.
    ///
    /// Without joins this limits the query to one row. With joins the
    /// limit is left alone so the first record keeps every joined row.
    ///
    /// # Errors
    ///
    /// Driver and join errors.
    pub async fn first(mut self) -> Result<Option<T::Record>> {
        if self.related.is_empty() {
            self.spec.limit = Some(1);
        }
        Ok(self.all().await?.into_iter().next())
    }

    /// Run lazily, yielding records as rows arrive.
    ///
    /// The stream borrows the select; once it is dropped, `stream` can be
    /// called again to rerun the query. With joins, rows are buffered so
    /// they can be grouped per record.
    pub fn stream(&mut self) -> BoxStream<'_, Result<T::Record>> {
        if self.compiled.is_none() {
            match compile_select(T::def(), self.related, &self.spec) {
                Ok(compiled) => self.compiled = Some(compiled),
                Err(err) => return stream::once(future::ready(Err(err))).boxed()
            }
        }
        let Self {
            conn,
            related,
            compiled,
            ..
        } = self;
        let Some((sql, binds)) = compiled.as_ref() else {
            return stream::empty().boxed();
        };
        debug!(target: "crud_core", %sql, ?binds, "select stream");
        let query = bind_values(sqlx::query(sql), binds);

        if related.is_empty() {
            return query
                .fetch(&mut **conn)
                .map(|row| {
                    row.map_err(Error::from)
                        .and_then(|row| T::from_row(&row).map_err(Error::from))
                })
                .boxed();
        }

        let related = Related::new(*related);
        stream::once(async move {
            let rows = query.fetch_all(&mut **conn).await?;
            group_rows::<T>(&rows, related)
        })
        .map(|grouped| match grouped {
            Ok(records) => stream::iter(records.into_iter().map(Ok)).left_stream(),
            Err(err) => stream::once(future::ready(Err(err))).right_stream()
        })
        .flatten()
        .boxed()
    }
}
