// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Architecture
//!
//! ```text
//! crud-derive-impl/src/
//! ├── lib.rs     macro entry points
//! ├── schema.rs  #[schema]: scan, generate, append
//! └── entity.rs  #[derive(Entity)]: per-entity checks
//! ```
//!
//! Both front ends hand declarations to `crud-codegen`; this crate only
//! scans items and turns diagnostics into `compile_error!`s.

mod entity;
mod schema;

use proc_macro::TokenStream;

/// Generate schema types and repositories for every entity in a module.
///
/// Every struct inside the (inline) module that carries `#[entity]` takes
/// part in one generator run, so entities may reference each other in any
/// order. The generated items are appended to the module. When any entity
/// is invalid, every diagnostic is reported and nothing is generated.
///
/// # Arguments
///
/// | Argument | Default | Description |
/// |----------|---------|-------------|
/// | `crate` | `"::crud_derive"` | Path generated code uses for the runtime |
///
/// # Entity Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[entity]` | Marks the struct. Table name is the snake_case type name. |
/// | `#[entity(table = "movies")]` | Explicit table name. |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `#[id]` | Primary key member. Several make a composite key. |
/// | `#[id(auto_increment)]` | Database-assigned key. Sole key of `i32`, `i64` or `u32` only. |
/// | `#[column(name = "..")]` | Column name override. |
/// | `#[column(default = <lit>)]` | SQL default for non-string columns. A string literal is raw SQL. |
/// | `#[column(default_text = "..")]` | Quoted SQL default for string columns. |
/// | `#[column(varchar = 64)]` | `VARCHAR(64)` instead of `TEXT`. |
/// | `#[foreign_key(Director)]` | Foreign key to `Director`'s single key column. |
/// | `#[foreign_key(Language, column = "code")]` | Foreign key to a named column. |
/// | `#[references(Director)]` | Forward reference, filled by joined reads. Must be `Option<_>`. |
/// | `#[references(Language, columns(code, region))]` | Forward reference over listed local columns. |
/// | `#[back_reference(Movie)]` | Rows of `Movie` pointing here. `Option<Vec<_>>` or `Option<_>`. |
/// | `#[unique]`, `#[unique(group = "..")]` | Unique index, alone or grouped by name. |
///
/// # Example
///
/// ```rust,ignore
/// #[crud_derive::schema]
/// mod cinema {
///     #[entity]
///     pub struct Director {
///         #[id(auto_increment)]
///         pub id: i64,
///         pub name: String,
///         #[back_reference(Movie)]
///         pub movies: Option<Vec<Movie>>
///     }
///
///     #[entity]
///     pub struct Movie {
///         #[id(auto_increment)]
///         pub id: i64,
///         pub title: String,
///         #[foreign_key(Director)]
///         pub director_id: i64,
///         #[references(Director)]
///         pub director: Option<Director>
///     }
/// }
///
/// // cinema::DirectorTable, cinema::MovieTable, cinema::MovieData,
/// // cinema::MovieRepo<'c> and cinema::MovieRepository are generated.
/// ```
#[proc_macro_attribute]
pub fn schema(args: TokenStream, item: TokenStream) -> TokenStream {
    schema::expand(args.into(), item.into()).into()
}

/// Register the entity helper attributes outside a `#[schema]` module.
///
/// Declarations generated from a build script (`crud_codegen::Builder`)
/// keep their attributes in the source; this derive makes them legal and
/// reports the rules that concern one entity alone (missing key, attribute
/// syntax, column types) at the declaration. It generates nothing.
#[proc_macro_derive(
    Entity,
    attributes(entity, id, column, foreign_key, references, back_reference, unique)
)]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive(input.into()).into()
}
