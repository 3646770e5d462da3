// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity model.
//!
//! An [`EntityModel`] is built once per declaration by
//! [`build_entity`](crate::build::build_entity) and never changes after the
//! validator accepted the whole graph. Columns are addressed by index into
//! [`EntityModel::columns`]; other entities are addressed by name through
//! the [`EntityGraph`](crate::graph::EntityGraph).
//!
//! ```text
//! EntityModel
//! ├── columns: Vec<ColumnModel>
//! │   └── foreign_key: Option<ForeignKeyInfo>
//! ├── primary_key: PrimaryKey ── Simple(idx) | Composite([idx, ..])
//! ├── references: Vec<ForwardReferenceInfo>
//! ├── back_references: Vec<BackReferenceInfo>
//! └── unique_groups: Vec<UniqueGroup>
//! ```

use syn::{Ident, Type, Visibility};

use crate::{error::DeclarationHandle, extract::DefaultValue, types::SqlKind};

/// Foreign key of a column.
#[derive(Debug, Clone)]
pub struct ForeignKeyInfo {
    /// Target entity.
    pub target: Ident,
    /// Explicit target column, else the target's primary key.
    pub column: Option<String>
}

/// One stored field.
#[derive(Debug, Clone)]
pub struct ColumnModel {
    /// Field identifier in the record.
    pub field:          Ident,
    /// Field visibility.
    pub vis:            Visibility,
    /// Stored column name.
    pub name:           String,
    /// Name of the typed column constant on the schema type.
    pub dsl:            Ident,
    /// Declared type.
    pub ty:             Type,
    /// Declared as `Option<_>`.
    pub nullable:       bool,
    /// Storage class.
    pub kind:           SqlKind,
    /// `VARCHAR` length.
    pub varchar:        Option<usize>,
    /// Store-generated.
    pub auto_increment: bool,
    /// Primary key member.
    pub primary_key:    bool,
    /// Default value.
    pub default:        Option<DefaultValue>,
    /// Foreign key.
    pub foreign_key:    Option<ForeignKeyInfo>,
    /// Declaration handle.
    pub handle:         DeclarationHandle
}

impl ColumnModel {
    /// Whether `name` designates this column by field, column or DSL name.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.field == name || self.name == name || self.dsl == name
    }

    /// SQL type of the column.
    #[must_use]
    pub fn sql_type(&self) -> String {
        self.kind.sql_type(self.varchar)
    }
}

/// Primary key of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryKey {
    /// One key column.
    Simple(usize),
    /// Several key columns in declaration order.
    Composite(Vec<usize>)
}

impl PrimaryKey {
    /// Key column indices in key order.
    #[must_use]
    pub fn columns(&self) -> &[usize] {
        match self {
            Self::Simple(index) => std::slice::from_ref(index),
            Self::Composite(indices) => indices
        }
    }

    /// Number of key columns.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.columns().len()
    }

    /// Whether `index` is a key column.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.columns().contains(&index)
    }
}

/// A field hydrated with the related record named by this entity's foreign
/// keys.
#[derive(Debug, Clone)]
pub struct ForwardReferenceInfo {
    /// Field identifier.
    pub field:      Ident,
    /// Field visibility.
    pub vis:        Visibility,
    /// Declared type, `Option<Target>`.
    pub ty:         Type,
    /// Target entity.
    pub target:     Ident,
    /// Explicit local foreign key fields.
    pub fk_columns: Vec<Ident>,
    /// Declaration handle.
    pub handle:     DeclarationHandle
}

/// A field hydrated with the records whose foreign keys point here.
#[derive(Debug, Clone)]
pub struct BackReferenceInfo {
    /// Field identifier.
    pub field:  Ident,
    /// Field visibility.
    pub vis:    Visibility,
    /// Declared type, `Option<Vec<Target>>` or `Option<Target>`.
    pub ty:     Type,
    /// Target entity.
    pub target: Ident,
    /// `Option<Vec<_>>` rather than `Option<_>`.
    pub many:   bool,
    /// Declaration handle.
    pub handle: DeclarationHandle
}

/// Columns sharing one unique index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueGroup {
    /// Index name.
    pub name:    String,
    /// Column indices.
    pub columns: Vec<usize>
}

/// Validated description of one entity.
#[derive(Debug, Clone)]
pub struct EntityModel {
    /// Declaration handle.
    pub handle:          DeclarationHandle,
    /// Record type.
    pub ident:           Ident,
    /// Record visibility.
    pub vis:             Visibility,
    /// Table name.
    pub table:           String,
    /// Stored columns in declaration order.
    pub columns:         Vec<ColumnModel>,
    /// Primary key.
    pub primary_key:     PrimaryKey,
    /// Forward references.
    pub references:      Vec<ForwardReferenceInfo>,
    /// Back-references.
    pub back_references: Vec<BackReferenceInfo>,
    /// Unique indexes.
    pub unique_groups:   Vec<UniqueGroup>
}

impl EntityModel {
    /// Name of the generated schema type.
    #[must_use]
    pub fn table_type(&self) -> Ident {
        table_type_of(&self.ident)
    }

    /// Key columns in key order.
    pub fn key_columns(&self) -> impl Iterator<Item = &ColumnModel> + '_ {
        self.primary_key
            .columns()
            .iter()
            .map(|&index| &self.columns[index])
    }

    /// The sole key column, for a simple key.
    #[must_use]
    pub fn simple_key(&self) -> Option<&ColumnModel> {
        match self.primary_key {
            PrimaryKey::Simple(index) => Some(&self.columns[index]),
            PrimaryKey::Composite(_) => None
        }
    }

    /// Whether the key is the base table's integer key.
    #[must_use]
    pub fn has_base_id(&self) -> bool {
        self.simple_key()
            .is_some_and(|column| crate::types::is_simple_id(&column.ty))
    }

    /// Column answering to `name`.
    #[must_use]
    pub fn find_column(&self, name: &str) -> Option<(usize, &ColumnModel)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.answers_to(name))
    }

    /// Column declared by field `field`.
    #[must_use]
    pub fn column_by_field(&self, field: &str) -> Option<(usize, &ColumnModel)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, column)| column.field == field)
    }

    /// Whether any column is auto-increment.
    #[must_use]
    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|column| column.auto_increment)
    }

    /// Whether a separate create-data type is generated.
    #[must_use]
    pub fn needs_data_type(&self) -> bool {
        self.has_auto_increment() && self.columns.iter().any(|column| !column.auto_increment)
    }

    /// Name of the create-data type.
    #[must_use]
    pub fn data_type(&self) -> Ident {
        quote::format_ident!("{}Data", self.ident)
    }
}

/// Name of the schema type generated for entity `ident`.
#[must_use]
pub fn table_type_of(ident: &Ident) -> Ident {
    quote::format_ident!("{}Table", ident)
}
