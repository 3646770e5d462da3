// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports.
//!
//! ```rust,ignore
//! use crud_derive::prelude::*;
//! ```

pub use futures::TryStreamExt;

pub use crate::{
    CompositeId, EntityId, Error, Expr, Repository, Result, SortDirection, Table, async_trait,
    create_tables, drop_tables
};
