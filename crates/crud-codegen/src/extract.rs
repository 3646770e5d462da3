// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Metadata extraction.
//!
//! Turns a declaration (a `syn` item plus the file it came from) into a
//! [`RawEntity`]: the entity arguments and every field with its helper
//! attributes parsed, but nothing checked beyond attribute syntax and the
//! declaration shape.
//!
//! # Module Structure
//!
//! ```text
//! extract/
//! ├── column.rs  #[column(...)] options
//! └── field.rs   per-field helper attributes
//! ```

pub mod column;
pub mod field;

use std::path::PathBuf;

use darling::{FromMeta, ast::NestedMeta};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Item, Meta, Visibility};

pub use self::{
    column::{ColumnConfig, DefaultValue},
    field::{FIELD_ATTRIBUTES, ForeignKeyMarker, IdMarker, RawField, ReferencesMarker, UniqueMarker}
};
use crate::error::{DeclarationHandle, Diagnostic, ErrorKind};

/// Name of the entity marker attribute.
pub const ENTITY_ATTRIBUTE: &str = "entity";

/// One declaration handed over by the scanner.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The declared item.
    pub input:  DeriveInput,
    /// File the item was read from, when known.
    pub origin: Option<PathBuf>
}

impl Declaration {
    /// Declaration without a known file.
    #[must_use]
    pub const fn new(input: DeriveInput) -> Self {
        Self {
            input,
            origin: None
        }
    }

    /// Declaration read from `origin`.
    #[must_use]
    pub fn with_origin(input: DeriveInput, origin: impl Into<PathBuf>) -> Self {
        Self {
            input,
            origin: Some(origin.into())
        }
    }
}

/// Arguments of `#[entity(...)]`.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct EntityArgs {
    table: Option<String>
}

/// Entity declaration with attributes parsed.
#[derive(Debug, Clone)]
pub struct RawEntity {
    /// Type name.
    pub ident:  Ident,
    /// Type visibility.
    pub vis:    Visibility,
    /// Explicit table name.
    pub table:  Option<String>,
    /// Fields in declaration order.
    pub fields: Vec<RawField>,
    /// Declaration handle.
    pub handle: DeclarationHandle
}

/// Whether `attrs` contain the entity marker.
#[must_use]
pub fn is_entity(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(ENTITY_ATTRIBUTE))
}

/// `item` as a derive input when it carries the entity marker.
///
/// Enums and unions are kept so extraction can reject them by name.
#[must_use]
pub fn entity_input(item: &Item) -> Option<DeriveInput> {
    match item {
        Item::Struct(item) if is_entity(&item.attrs) => Some(item.clone().into()),
        Item::Enum(item) if is_entity(&item.attrs) => Some(item.clone().into()),
        Item::Union(item) if is_entity(&item.attrs) => Some(item.clone().into()),
        _ => None
    }
}

fn entity_args(attrs: &[Attribute]) -> syn::Result<EntityArgs> {
    let Some(attr) = attrs.iter().find(|attr| attr.path().is_ident(ENTITY_ATTRIBUTE)) else {
        return Ok(EntityArgs::default());
    };
    match &attr.meta {
        Meta::Path(_) => Ok(EntityArgs::default()),
        Meta::List(list) => {
            let items = NestedMeta::parse_meta_list(list.tokens.clone())?;
            EntityArgs::from_list(&items)
                .map_err(|err| syn::Error::new_spanned(attr, err.to_string()))
        }
        Meta::NameValue(_) => Err(syn::Error::new_spanned(
            attr,
            "expected #[entity] or #[entity(table = \"..\")]"
        ))
    }
}

fn shape_of(input: &DeriveInput) -> Option<&'static str> {
    if !input.generics.params.is_empty() {
        return Some("generic");
    }
    match &input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(_) => None,
            Fields::Unnamed(_) => Some("a tuple struct"),
            Fields::Unit => Some("a unit struct")
        },
        Data::Enum(_) => Some("an enum"),
        Data::Union(_) => Some("a union")
    }
}

/// Extract one declaration.
///
/// # Errors
///
/// `NotADataRecord` for anything but a non-generic struct with named
/// fields; `MalformedAttribute` for every helper attribute that does not
/// parse. All fields are checked before returning.
pub fn extract(declaration: &Declaration) -> Result<RawEntity, Vec<Diagnostic>> {
    let input = &declaration.input;
    let handle = DeclarationHandle::entity(
        input.ident.to_string(),
        input.ident.span(),
        declaration.origin.clone()
    );

    if let Some(shape) = shape_of(input) {
        return Err(vec![Diagnostic::new(
            ErrorKind::NotADataRecord {
                entity: input.ident.to_string(),
                shape:  shape.to_string()
            },
            handle
        )]);
    }

    let mut diagnostics = Vec::new();

    let args = entity_args(&input.attrs).unwrap_or_else(|err| {
        diagnostics.push(Diagnostic::malformed(&err, handle.clone()));
        EntityArgs::default()
    });

    let mut fields = Vec::new();
    if let Data::Struct(data) = &input.data {
        for field in &data.fields {
            match RawField::from_field(field) {
                Ok(raw) => fields.push(raw),
                Err(err) => {
                    let owner = field.ident.as_ref().map_or_else(
                        || handle.clone(),
                        |ident| handle.field(ident.to_string(), ident.span())
                    );
                    diagnostics.push(Diagnostic::malformed(&err, owner));
                }
            }
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    Ok(RawEntity {
        ident: input.ident.clone(),
        vis: input.vis.clone(),
        table: args.table,
        fields,
        handle
    })
}
