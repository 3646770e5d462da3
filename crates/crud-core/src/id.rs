// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Identifier types.
//!
//! Primary-key and foreign-key columns are exposed through [`EntityId`], a
//! raw key value tagged with the schema type of the table whose id space it
//! belongs to. `EntityId<i64, DirectorTable>` and `EntityId<i64, MovieTable>`
//! are distinct types, so a movie id cannot be compared against a director
//! column by accident.
//!
//! Composite keys are represented by [`CompositeId`], an ordered list of
//! member values.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    ops::Deref
};

use sqlx::{Decode, Sqlite, Type, error::BoxDynError};

use crate::value::{SqlValue, Value};

/// A key value tied to the id space of table `T`.
pub struct EntityId<V, T> {
    value: V,
    table: PhantomData<fn() -> T>
}

impl<V, T> EntityId<V, T> {
    /// Wrap a raw key value.
    pub const fn new(value: V) -> Self {
        Self {
            value,
            table: PhantomData
        }
    }

    /// Borrow the raw value.
    #[must_use]
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Unwrap the raw value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<V, T> From<V> for EntityId<V, T> {
    fn from(value: V) -> Self {
        Self::new(value)
    }
}

impl<V, T> Deref for EntityId<V, T> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

impl<V: Clone, T> Clone for EntityId<V, T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<V: Copy, T> Copy for EntityId<V, T> {}

impl<V: fmt::Debug, T> fmt::Debug for EntityId<V, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityId").field(&self.value).finish()
    }
}

impl<V: PartialEq, T> PartialEq for EntityId<V, T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<V: Eq, T> Eq for EntityId<V, T> {}

impl<V: Hash, T> Hash for EntityId<V, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<V: SqlValue, T> SqlValue for EntityId<V, T> {
    fn to_value(&self) -> Value {
        self.value.to_value()
    }
}

impl<V: Type<Sqlite>, T> Type<Sqlite> for EntityId<V, T> {
    fn type_info() -> <Sqlite as sqlx::Database>::TypeInfo {
        V::type_info()
    }

    fn compatible(ty: &<Sqlite as sqlx::Database>::TypeInfo) -> bool {
        V::compatible(ty)
    }
}

impl<'r, V: Decode<'r, Sqlite>, T> Decode<'r, Sqlite> for EntityId<V, T> {
    fn decode(value: <Sqlite as sqlx::Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        V::decode(value).map(Self::new)
    }
}

/// Ordered member values of a composite primary key.
///
/// Members are listed in key declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeId {
    values: Vec<Value>
}

impl CompositeId {
    /// Empty key; add members with [`with`](Self::with).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: Vec::new()
        }
    }

    /// Append the next key member.
    #[must_use]
    pub fn with<V: SqlValue + ?Sized>(mut self, value: &V) -> Self {
        self.values.push(value.to_value());
        self
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no members were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A primary-key representation that can be bound column by column.
pub trait KeyValue {
    /// Member values in key column order.
    fn key_values(&self) -> Vec<Value>;
}

impl<V: SqlValue, T> KeyValue for EntityId<V, T> {
    fn key_values(&self) -> Vec<Value> {
        vec![self.value.to_value()]
    }
}

impl KeyValue for CompositeId {
    fn key_values(&self) -> Vec<Value> {
        self.values.clone()
    }
}
