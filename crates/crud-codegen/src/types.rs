// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rust type to SQL type mapping.
//!
//! | Rust type | SqlKind | SQL type |
//! |-----------|---------|----------|
//! | `bool` | `Boolean` | `BOOLEAN` |
//! | `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32` | `Integer` | `INTEGER` |
//! | `f32`, `f64` | `Real` | `REAL` |
//! | `String` | `Text` | `TEXT`, or `VARCHAR(n)` |
//! | `Vec<u8>` | `Blob` | `BLOB` |
//!
//! `Option<T>` maps like `T` and makes the column nullable. `i32`, `i64` and
//! `u32` are simple identifier types: as a sole primary key they become the
//! base table's `INTEGER PRIMARY KEY`.

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type};

/// Storage class of a mapped column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKind {
    /// `BOOLEAN`
    Boolean,
    /// `INTEGER`
    Integer,
    /// `REAL`
    Real,
    /// `TEXT`
    Text,
    /// `BLOB`
    Blob
}

impl SqlKind {
    /// Declared SQL type, honouring a varchar length for text.
    #[must_use]
    pub fn sql_type(self, varchar: Option<usize>) -> String {
        match (self, varchar) {
            (Self::Text, Some(len)) => format!("VARCHAR({len})"),
            (Self::Boolean, _) => "BOOLEAN".into(),
            (Self::Integer, _) => "INTEGER".into(),
            (Self::Real, _) => "REAL".into(),
            (Self::Text, None) => "TEXT".into(),
            (Self::Blob, _) => "BLOB".into()
        }
    }
}

/// Single generic argument of `ty` when its last path segment is `wrapper`.
fn generic_inner<'a>(ty: &'a Type, wrapper: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None
    }
}

/// `T` of `Option<T>`.
#[must_use]
pub fn option_inner(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Option")
}

/// `T` of `Vec<T>`.
#[must_use]
pub fn vec_inner(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Vec")
}

/// Strip one `Option` layer.
#[must_use]
pub fn base_type(ty: &Type) -> &Type {
    option_inner(ty).unwrap_or(ty)
}

fn plain_ident(ty: &Type) -> Option<String> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    matches!(segment.arguments, PathArguments::None).then(|| segment.ident.to_string())
}

/// Storage class of a non-optional type.
#[must_use]
pub fn scalar_kind(ty: &Type) -> Option<SqlKind> {
    if let Some(inner) = vec_inner(ty) {
        return (plain_ident(inner).as_deref() == Some("u8")).then_some(SqlKind::Blob);
    }
    match plain_ident(ty)?.as_str() {
        "bool" => Some(SqlKind::Boolean),
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => Some(SqlKind::Integer),
        "f32" | "f64" => Some(SqlKind::Real),
        "String" => Some(SqlKind::Text),
        _ => None
    }
}

/// Whether `ty` can be the base table's integer key.
#[must_use]
pub fn is_simple_id(ty: &Type) -> bool {
    matches!(plain_ident(ty).as_deref(), Some("i32" | "i64" | "u32"))
}

/// Whether `ty` is `String`.
#[must_use]
pub fn is_string(ty: &Type) -> bool {
    plain_ident(ty).as_deref() == Some("String")
}

/// Whitespace-free spelling used for type equality and messages.
#[must_use]
pub fn type_key(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
