// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # crud-derive
//!
//! One crate for users. Re-exports:
//! - the [`schema`] attribute and the [`Entity`] derive from
//!   `crud-derive-impl`
//! - every runtime item from `crud-core` ([`Table`], [`Repository`],
//!   [`TypedSelect`], [`EntityId`], [`create_tables`], ...)
//! - `async_trait`, `sqlx` and `futures`, which generated code names
//!   through this crate
//!
//! # Generated Items
//!
//! For an entity `Movie` inside a `#[schema]` module:
//!
//! | Item | Description |
//! |------|-------------|
//! | `MovieTable` | Schema type. One typed column constant per column, `repo(conn)`. |
//! | `impl Table for MovieTable` | Table descriptor, row mappers, writers, key extraction. |
//! | `MovieData` | Insert shape without auto-increment columns, when it differs from `Movie`. |
//! | `MovieRepo<'c>` | `Repository<'c, MovieTable>`. |
//! | `MovieRepository` | `find_by_id`, `delete_by_id`, `create_with_related`. |
//!
//! # Related Set
//!
//! ```rust,ignore
//! let mut repo = DirectorTable::repo(&mut conn).with_related(MovieTable);
//! let directors = repo.select_all().await?;
//! // every director's `movies` is filled from one LEFT JOIN
//! ```

pub use crud_core::*;
pub use crud_derive_impl::{Entity, schema};
