// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field-level attribute parsing.
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `#[id]`, `#[id(auto_increment)]` | primary key member |
//! | `#[column(..)]` | see [`ColumnConfig`] |
//! | `#[foreign_key(Target)]`, `#[foreign_key(Target, column = "..")]` | foreign key |
//! | `#[references(Target)]`, `#[references(Target, columns(a, b))]` | forward reference |
//! | `#[back_reference(Target)]` | back-reference |
//! | `#[unique]`, `#[unique(group = "..")]` | unique index member |

use syn::{Attribute, Field, Ident, LitStr, Meta, Path, Type, Visibility};

use super::column::ColumnConfig;

/// Helper attributes recognised on fields.
pub const FIELD_ATTRIBUTES: &[&str] = &[
    "id",
    "column",
    "foreign_key",
    "references",
    "back_reference",
    "unique"
];

/// `#[id(...)]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdMarker {
    /// Store-generated value.
    pub auto_increment: bool
}

/// `#[foreign_key(...)]`
#[derive(Debug, Clone)]
pub struct ForeignKeyMarker {
    /// Target entity.
    pub target: Ident,
    /// Explicit target column.
    pub column: Option<String>
}

/// `#[references(...)]`
#[derive(Debug, Clone)]
pub struct ReferencesMarker {
    /// Target entity.
    pub target:  Ident,
    /// Explicit local foreign key columns.
    pub columns: Vec<Ident>
}

/// `#[unique(...)]`
#[derive(Debug, Clone, Default)]
pub struct UniqueMarker {
    /// Index group name.
    pub group: Option<String>
}

/// A field with its helper attributes parsed.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Field identifier.
    pub ident:          Ident,
    /// Field visibility.
    pub vis:            Visibility,
    /// Declared type.
    pub ty:             Type,
    /// Primary key marker.
    pub id:             Option<IdMarker>,
    /// Column options.
    pub column:         ColumnConfig,
    /// Foreign key marker.
    pub foreign_key:    Option<ForeignKeyMarker>,
    /// Forward reference marker.
    pub references:     Option<ReferencesMarker>,
    /// Back-reference target.
    pub back_reference: Option<Ident>,
    /// Unique index marker.
    pub unique:         Option<UniqueMarker>
}

fn target_ident(path: &Path) -> syn::Result<Ident> {
    path.segments
        .last()
        .map(|segment| segment.ident.clone())
        .ok_or_else(|| syn::Error::new_spanned(path, "expected an entity type"))
}

fn parse_id(attr: &Attribute) -> syn::Result<IdMarker> {
    let mut marker = IdMarker::default();
    if let Meta::List(list) = &attr.meta {
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("auto_increment") {
                marker.auto_increment = true;
                Ok(())
            } else {
                Err(meta.error("expected `auto_increment`"))
            }
        })?;
    }
    Ok(marker)
}

fn parse_foreign_key(attr: &Attribute) -> syn::Result<ForeignKeyMarker> {
    let mut target = None;
    let mut column = None;
    attr.parse_nested_meta(|meta| {
        if target.is_none() {
            target = Some(target_ident(&meta.path)?);
        } else if meta.path.is_ident("column") {
            let value: LitStr = meta.value()?.parse()?;
            column = Some(value.value());
        } else {
            return Err(meta.error("expected `column = \"..\"`"));
        }
        Ok(())
    })?;
    let target =
        target.ok_or_else(|| syn::Error::new_spanned(attr, "expected #[foreign_key(Target)]"))?;
    Ok(ForeignKeyMarker {
        target,
        column
    })
}

fn parse_references(attr: &Attribute) -> syn::Result<ReferencesMarker> {
    let mut target = None;
    let mut columns = Vec::new();
    attr.parse_nested_meta(|meta| {
        if target.is_none() {
            target = Some(target_ident(&meta.path)?);
        } else if meta.path.is_ident("columns") {
            meta.parse_nested_meta(|inner| {
                columns.push(inner.path.require_ident()?.clone());
                Ok(())
            })?;
        } else {
            return Err(meta.error("expected `columns(..)`"));
        }
        Ok(())
    })?;
    let target =
        target.ok_or_else(|| syn::Error::new_spanned(attr, "expected #[references(Target)]"))?;
    Ok(ReferencesMarker {
        target,
        columns
    })
}

fn parse_unique(attr: &Attribute) -> syn::Result<UniqueMarker> {
    let mut marker = UniqueMarker::default();
    if let Meta::List(list) = &attr.meta {
        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("group") {
                let value: LitStr = meta.value()?.parse()?;
                marker.group = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `group = \"..\"`"))
            }
        })?;
    }
    Ok(marker)
}

impl RawField {
    /// Parse a named field and its helper attributes.
    ///
    /// # Errors
    ///
    /// Malformed helper attributes, or an unnamed field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "entity fields must be named"))?;

        let mut raw = Self {
            ident,
            vis: field.vis.clone(),
            ty: field.ty.clone(),
            id: None,
            column: ColumnConfig::default(),
            foreign_key: None,
            references: None,
            back_reference: None,
            unique: None
        };

        for attr in &field.attrs {
            if attr.path().is_ident("id") {
                raw.id = Some(parse_id(attr)?);
            } else if attr.path().is_ident("column") {
                raw.column = ColumnConfig::from_attr(attr)?;
            } else if attr.path().is_ident("foreign_key") {
                raw.foreign_key = Some(parse_foreign_key(attr)?);
            } else if attr.path().is_ident("references") {
                raw.references = Some(parse_references(attr)?);
            } else if attr.path().is_ident("back_reference") {
                let path: Path = attr.parse_args()?;
                raw.back_reference = Some(target_ident(&path)?);
            } else if attr.path().is_ident("unique") {
                raw.unique = Some(parse_unique(attr)?);
            }
        }

        if (raw.references.is_some() || raw.back_reference.is_some())
            && (raw.id.is_some() || raw.foreign_key.is_some() || raw.unique.is_some())
        {
            return Err(syn::Error::new_spanned(
                field,
                "reference fields are not stored and cannot carry column attributes"
            ));
        }
        if raw.references.is_some() && raw.back_reference.is_some() {
            return Err(syn::Error::new_spanned(
                field,
                "a field is either a reference or a back reference"
            ));
        }

        Ok(raw)
    }

    /// Whether the field is stored as a column.
    #[must_use]
    pub const fn is_column(&self) -> bool {
        self.references.is_none() && self.back_reference.is_none()
    }
}
