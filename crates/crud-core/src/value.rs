// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Bindable values.
//!
//! Every column value passes through [`Value`] before it reaches the driver.
//! Predicates and pending writes store values in this form so a statement
//! can be rendered once and bound in order.
//!
//! | Rust type | Value |
//! |-----------|-------|
//! | `bool` | `Bool` |
//! | `i8`..`i64`, `u8`..`u32` | `Integer` |
//! | `f32`, `f64` | `Real` |
//! | `String`, `str` | `Text` |
//! | `Vec<u8>`, `[u8]` | `Blob` |
//! | `Option<T>` | `Null` or the inner mapping |

use sqlx::{Sqlite, query::Query};

/// A single bindable SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,

    /// 64-bit signed integer.
    Integer(i64),

    /// Double precision float.
    Real(f64),

    /// UTF-8 text.
    Text(String),

    /// Boolean, stored by SQLite as `0`/`1`.
    Bool(bool),

    /// Raw bytes.
    Blob(Vec<u8>)
}

impl Value {
    /// Whether this is SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Conversion of a Rust value into a bindable [`Value`].
///
/// Implemented for every column type the generator maps, and for
/// [`EntityId`](crate::EntityId) wrappers around them.
pub trait SqlValue {
    /// Convert to a bindable value.
    fn to_value(&self) -> Value;
}

macro_rules! integer_value {
    ($($ty:ty),*) => {
        $(
            impl SqlValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32);

impl SqlValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl SqlValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl SqlValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl SqlValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl SqlValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl SqlValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl SqlValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl<V: SqlValue> SqlValue for Option<V> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, SqlValue::to_value)
    }
}

impl<V: SqlValue + ?Sized> SqlValue for &V {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// Bind values to a query in order.
pub(crate) fn bind_values<'q>(
    mut query: Query<'q, Sqlite, <Sqlite as sqlx::Database>::Arguments<'q>>,
    values: &[Value]
) -> Query<'q, Sqlite, <Sqlite as sqlx::Database>::Arguments<'q>> {
    for value in values {
        query = match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(v) => query.bind(*v),
            Value::Real(v) => query.bind(*v),
            Value::Text(v) => query.bind(v.clone()),
            Value::Bool(v) => query.bind(*v),
            Value::Blob(v) => query.bind(v.clone())
        };
    }
    query
}
