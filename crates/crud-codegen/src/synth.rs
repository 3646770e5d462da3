// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Code synthesis into an emit model.
//!
//! An [`EmitUnit`] is plain data describing everything generated for one
//! entity. It carries names, literals and types but no token layout; the
//! [`render`](crate::render) stage turns it into source. Units are built
//! per entity and refer to other entities by name only, so the order of
//! synthesis does not matter.
//!
//! ```text
//! EmitUnit
//! ├── schema      table type, TableDef literals, column constants
//! ├── converters  from_row, from_joined_row, attach_back_references
//! ├── writers     write, write_except_auto_increment
//! ├── key         make_pk, find_by_id / delete_by_id parameters
//! ├── data        optional create-data record
//! └── related     create_with_related parameters
//! ```

use std::collections::HashSet;

use quote::format_ident;
use syn::{Ident, Type, Visibility};

use crate::{
    error::{Diagnostic, ErrorKind},
    graph::EntityGraph,
    model::{EntityModel, PrimaryKey, table_type_of},
    resolve::{ResolvedType, ResolvedTypes},
    validate::foreign_key_target
};

/// One column as the generated code sees it.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Record field.
    pub field:          Ident,
    /// Record field visibility.
    pub vis:            Visibility,
    /// Typed column constant.
    pub constant:       Ident,
    /// Stored name.
    pub name:           String,
    /// Row alias in selects.
    pub alias:          String,
    /// Declared type.
    pub declared:       Type,
    /// Resolved type.
    pub resolved:       ResolvedType,
    /// SQL type.
    pub sql_type:       String,
    /// `NULL` allowed.
    pub nullable:       bool,
    /// Store-generated.
    pub auto_increment: bool,
    /// SQL default.
    pub default:        Option<String>,
    /// Declared in the column list rather than as the base id.
    pub listed:         bool
}

/// Base-provided integer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseIdSpec {
    /// Column name.
    pub name:           String,
    /// Store-generated.
    pub auto_increment: bool
}

/// Foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    /// Local column.
    pub column:        String,
    /// Target table.
    pub target_table:  String,
    /// Target column.
    pub target_column: String
}

/// Unique index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueSpec {
    /// Index name.
    pub name:    String,
    /// Column names.
    pub columns: Vec<String>
}

/// Primary key of the record.
#[derive(Debug, Clone)]
pub enum KeySpec {
    /// `EntityId<ty, Self>`.
    Simple {
        /// Key field.
        field: Ident,
        /// Declared type.
        ty:    Type
    },

    /// `CompositeId` over the members in key order.
    Composite(Vec<(Ident, Type)>)
}

impl KeySpec {
    /// Key fields with declared types, in key order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&Ident, &Type)> {
        match self {
            Self::Simple {
                field,
                ty
            } => vec![(field, ty)],
            Self::Composite(members) => members.iter().map(|(field, ty)| (field, ty)).collect()
        }
    }
}

/// Create-data record.
#[derive(Debug, Clone)]
pub struct DataSpec {
    /// Type name.
    pub ident:   Ident,
    /// Indices into [`EmitUnit::columns`].
    pub columns: Vec<usize>
}

/// Forward reference hydrated from the same row.
#[derive(Debug, Clone)]
pub struct ReferenceSpec {
    /// Record field.
    pub field:       Ident,
    /// Target schema type.
    pub target_type: Ident
}

/// Back-reference collected from grouped rows.
#[derive(Debug, Clone)]
pub struct BackReferenceSpec {
    /// Record field.
    pub field:       Ident,
    /// Target schema type.
    pub target_type: Ident,
    /// Collects every related record rather than the first.
    pub many:        bool
}

/// Optional related record accepted by `create_with_related`.
#[derive(Debug, Clone)]
pub struct RelatedParam {
    /// Parameter name.
    pub param:        Ident,
    /// Target schema type.
    pub target_type:  Ident,
    /// Local foreign key field receiving the key.
    pub fk_field:     Ident,
    /// Field of the created related record holding the key.
    pub source_field: Ident,
    /// The local field is `Option<_>` and the source is not.
    pub wrap_some:    bool
}

/// Everything generated for one entity.
#[derive(Debug, Clone)]
pub struct EmitUnit {
    /// Record type.
    pub entity:          Ident,
    /// Record visibility.
    pub vis:             Visibility,
    /// Schema type.
    pub table_type:      Ident,
    /// Table name.
    pub table_name:      String,
    /// Base-provided key.
    pub base_id:         Option<BaseIdSpec>,
    /// Every column in declaration order.
    pub columns:         Vec<ColumnSpec>,
    /// Explicit key declaration, absent with a base-provided key.
    pub primary_key:     Option<Vec<String>>,
    /// Key representation.
    pub key:             KeySpec,
    /// Foreign key constraints.
    pub foreign_keys:    Vec<ForeignKeySpec>,
    /// Unique indexes.
    pub unique_indexes:  Vec<UniqueSpec>,
    /// Create-data record.
    pub data:            Option<DataSpec>,
    /// Forward references.
    pub references:      Vec<ReferenceSpec>,
    /// Back-references.
    pub back_references: Vec<BackReferenceSpec>,
    /// Reference and back-reference fields, left empty by `from_row`.
    pub empty_fields:    Vec<Ident>,
    /// `create_with_related` parameters, when the operation is generated.
    pub related_create:  Option<Vec<RelatedParam>>
}

impl EmitUnit {
    /// Name of the repository alias.
    #[must_use]
    pub fn repo_alias(&self) -> Ident {
        format_ident!("{}Repo", self.entity)
    }

    /// Name of the repository extension trait.
    #[must_use]
    pub fn repository_trait(&self) -> Ident {
        format_ident!("{}Repository", self.entity)
    }

    /// Name of the `Table::Data` type.
    #[must_use]
    pub fn data_type(&self) -> &Ident {
        self.data.as_ref().map_or(&self.entity, |data| &data.ident)
    }
}

fn related_param_name(field: &Ident, taken: &mut HashSet<String>) -> Ident {
    let field_name = field.to_string();
    let stem = field_name.strip_suffix("_id").unwrap_or(&field_name);
    let usable = !stem.is_empty()
        && stem != "record"
        && !taken.contains(stem)
        && syn::parse_str::<Ident>(stem).is_ok();
    let name = if usable {
        stem.to_string()
    } else {
        format!("{field_name}_related")
    };
    taken.insert(name.clone());
    format_ident!("{}", name)
}

fn related_params(graph: &EntityGraph, entity: &EntityModel) -> Vec<RelatedParam> {
    let mut taken = HashSet::new();
    let mut params = Vec::new();
    for column in &entity.columns {
        let Some(fk) = &column.foreign_key else {
            continue;
        };
        if column.auto_increment {
            continue;
        }
        let Some(target) = graph.get(&fk.target) else {
            continue;
        };
        let Ok(source) = foreign_key_target(column, target) else {
            continue;
        };
        if source.nullable && !column.nullable {
            continue;
        }
        params.push(RelatedParam {
            param:        related_param_name(&column.field, &mut taken),
            target_type:  target.table_type(),
            fk_field:     column.field.clone(),
            source_field: source.field.clone(),
            wrap_some:    column.nullable && !source.nullable
        });
    }
    params
}

fn unresolved(entity: &EntityModel, field: &Ident) -> Diagnostic {
    Diagnostic::new(
        ErrorKind::UnresolvedColumnType {
            entity: entity.ident.to_string(),
            column: field.to_string()
        },
        entity.handle.field(field.to_string(), field.span())
    )
}

/// Synthesize the unit of the entity at `index`.
///
/// # Errors
///
/// `UnresolvedColumnType` when a column has no resolved type, or a foreign
/// key target vanished; both are ruled out by validation.
pub fn synthesize_entity(
    graph: &EntityGraph,
    types: &ResolvedTypes,
    index: usize
) -> Result<EmitUnit, Diagnostic> {
    let entity = &graph.entities()[index];
    let base_id = entity.has_base_id();

    let mut columns = Vec::with_capacity(entity.columns.len());
    let mut foreign_keys = Vec::new();
    for (position, column) in entity.columns.iter().enumerate() {
        let resolved = types
            .get(index, position)
            .cloned()
            .ok_or_else(|| unresolved(entity, &column.field))?;

        if let Some(fk) = &column.foreign_key {
            let (target, found) = graph
                .get(&fk.target)
                .and_then(|target| {
                    foreign_key_target(column, target)
                        .ok()
                        .map(|found| (target, found))
                })
                .ok_or_else(|| unresolved(entity, &column.field))?;
            foreign_keys.push(ForeignKeySpec {
                column:        column.name.clone(),
                target_table:  target.table.clone(),
                target_column: found.name.clone()
            });
        }

        columns.push(ColumnSpec {
            field: column.field.clone(),
            vis: column.vis.clone(),
            constant: column.dsl.clone(),
            name: column.name.clone(),
            alias: format!("{}__{}", entity.table, column.name),
            declared: column.ty.clone(),
            resolved,
            sql_type: column.sql_type(),
            nullable: column.nullable,
            auto_increment: column.auto_increment,
            default: column.default.as_ref().map(|default| default.to_sql()),
            listed: !(base_id && column.primary_key)
        });
    }

    let base = entity
        .simple_key()
        .filter(|_| base_id)
        .map(|column| BaseIdSpec {
            name:           column.name.clone(),
            auto_increment: column.auto_increment
        });

    let primary_key = (!base_id).then(|| entity.key_columns().map(|c| c.name.clone()).collect());

    let key = match &entity.primary_key {
        PrimaryKey::Simple(position) => {
            let column = &entity.columns[*position];
            KeySpec::Simple {
                field: column.field.clone(),
                ty:    column.ty.clone()
            }
        }
        PrimaryKey::Composite(_) => KeySpec::Composite(
            entity
                .key_columns()
                .map(|column| (column.field.clone(), column.ty.clone()))
                .collect()
        )
    };

    let unique_indexes = entity
        .unique_groups
        .iter()
        .map(|group| UniqueSpec {
            name:    group.name.clone(),
            columns: group
                .columns
                .iter()
                .map(|&position| entity.columns[position].name.clone())
                .collect()
        })
        .collect();

    let data = entity.needs_data_type().then(|| DataSpec {
        ident:   entity.data_type(),
        columns: entity
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| !column.auto_increment)
            .map(|(position, _)| position)
            .collect()
    });

    let references: Vec<ReferenceSpec> = entity
        .references
        .iter()
        .map(|reference| ReferenceSpec {
            field:       reference.field.clone(),
            target_type: table_type_of(&reference.target)
        })
        .collect();

    let back_references: Vec<BackReferenceSpec> = entity
        .back_references
        .iter()
        .map(|back| BackReferenceSpec {
            field:       back.field.clone(),
            target_type: table_type_of(&back.target),
            many:        back.many
        })
        .collect();

    let empty_fields = references
        .iter()
        .map(|reference| reference.field.clone())
        .chain(back_references.iter().map(|back| back.field.clone()))
        .collect();

    let has_foreign_keys = entity.columns.iter().any(|c| c.foreign_key.is_some());
    let related_create = (has_foreign_keys || !entity.references.is_empty())
        .then(|| related_params(graph, entity));

    Ok(EmitUnit {
        entity: entity.ident.clone(),
        vis: entity.vis.clone(),
        table_type: entity.table_type(),
        table_name: entity.table.clone(),
        base_id: base,
        columns,
        primary_key,
        key,
        foreign_keys,
        unique_indexes,
        data,
        references,
        back_references,
        empty_fields,
        related_create
    })
}

/// Synthesize every entity of a resolved graph.
///
/// # Errors
///
/// Every unit that failed, see [`synthesize_entity`].
pub fn synthesize(graph: &EntityGraph, types: &ResolvedTypes) -> Result<Vec<EmitUnit>, Vec<Diagnostic>> {
    let mut units = Vec::with_capacity(graph.len());
    let mut diagnostics = Vec::new();
    for index in 0..graph.len() {
        match synthesize_entity(graph, types, index) {
            Ok(unit) => units.push(unit),
            Err(diagnostic) => diagnostics.push(diagnostic)
        }
    }
    if diagnostics.is_empty() {
        Ok(units)
    } else {
        Err(diagnostics)
    }
}
