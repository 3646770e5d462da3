// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime support for crud-derive generated code.
//!
//! Generated schema types implement [`Table`]; everything else here is
//! generic over it. The crate can also back hand-written tables.
//!
//! # Overview
//!
//! | Item | Role |
//! |------|------|
//! | [`Table`], [`TableDef`] | Schema type contract and static description |
//! | [`EntityId`], [`CompositeId`] | Primary-key and foreign-key values |
//! | [`Column`], [`Expr`] | Typed column handles and predicates |
//! | [`Repository`] | CRUD, joins and the related set |
//! | [`TypedSelect`] | Filtered select builder, eager or streaming |
//! | [`create_tables`], [`drop_tables`] | DDL from table descriptors |
//!
//! # Architecture
//!
//! ```text
//! Repository<'c, T>
//! ├── select() ──► TypedSelect ──► query::compile_select ──► sqlx
//! ├── insert / create / update / delete ──► PendingWrite ──► sqlx
//! └── related set ──► LEFT JOIN chain ──► row grouping ──► Table::attach_back_references
//! ```
//!
//! SQLite is the backing store, through `sqlx`.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod column;
mod error;
mod expr;
mod id;
pub mod prelude;
mod query;
mod repository;
mod schema;
mod select;
mod table;
mod value;

/// Re-export async_trait for generated code.
pub use async_trait::async_trait;
pub use column::Column;
pub use error::{Error, Result};
pub use expr::{ColumnRef, CompareOp, Expr};
/// Re-export futures for streaming selects.
pub use futures;
pub use id::{CompositeId, EntityId, KeyValue};
pub use query::SortDirection;
pub use repository::Repository;
pub use schema::{create_tables, drop_tables};
pub use select::TypedSelect;
/// Re-export sqlx for generated code.
pub use sqlx;
pub use table::{
    ColumnDef, ForeignKeyDef, IdColumnDef, PendingWrite, Related, Table, TableDef, UniqueDef,
    collect_related, read_related
};
pub use value::{SqlValue, Value};
