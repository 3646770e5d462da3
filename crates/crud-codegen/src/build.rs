// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Entity model builder.
//!
//! Per-entity rules only; anything that needs another entity is left to
//! [`validate`](crate::validate).
//!
//! | Rule | Diagnostic |
//! |------|------------|
//! | at least one `#[id]` | `MissingPrimaryKey` |
//! | column type has a SQL mapping | `UnsupportedColumnType` |
//! | key columns are not `Option<_>` | `UnsupportedColumnType` |
//! | auto-increment on `i32`, `i64`, `u32` | `UnsupportedColumnType` |
//! | `varchar` on `String` | `UnsupportedColumnType` |
//! | `default_text` on strings, `default` elsewhere | `DefaultKindMismatch` |
//! | references are `Option<_>` | `ReferenceMustBeNullable` |
//! | column names and constants are distinct | `MalformedAttribute` |

use std::collections::HashSet;

use convert_case::{Case, Casing};
use quote::format_ident;

use crate::{
    error::{Diagnostic, ErrorKind},
    extract::{DefaultValue, RawEntity, RawField},
    model::{
        BackReferenceInfo, ColumnModel, EntityModel, ForeignKeyInfo, ForwardReferenceInfo,
        PrimaryKey, UniqueGroup
    },
    types::{base_type, is_simple_id, is_string, option_inner, scalar_kind, type_key, vec_inner}
};

fn unsupported(field: &RawField, reason: &str) -> ErrorKind {
    ErrorKind::UnsupportedColumnType {
        field:  field.ident.to_string(),
        ty:     type_key(&field.ty),
        reason: reason.to_string()
    }
}

fn build_column(
    raw: &RawEntity,
    field: &RawField,
    sole_key: bool,
    diagnostics: &mut Vec<Diagnostic>
) -> Option<ColumnModel> {
    let handle = raw.handle.field(field.ident.to_string(), field.ident.span());
    let nullable = option_inner(&field.ty).is_some();
    let base = base_type(&field.ty);
    let mut failed = false;
    let mut report = |kind: ErrorKind| {
        diagnostics.push(Diagnostic::new(kind, handle.clone()));
        failed = true;
    };

    let kind = scalar_kind(base);
    if kind.is_none() {
        report(unsupported(field, "no SQL mapping for this type"));
    }

    let auto_increment = field.id.is_some_and(|id| id.auto_increment);
    if field.id.is_some() && nullable {
        report(unsupported(field, "primary key columns cannot be nullable"));
    }
    if auto_increment && !is_simple_id(&field.ty) {
        report(unsupported(field, "auto-increment requires i32, i64 or u32"));
    }
    if field.column.varchar.is_some() && !is_string(base) {
        report(unsupported(field, "varchar applies to String fields only"));
    }

    match &field.column.default {
        Some(DefaultValue::Text(_)) if !is_string(base) => {
            report(ErrorKind::DefaultKindMismatch {
                field:     field.ident.to_string(),
                attribute: "default_text".into(),
                ty:        type_key(&field.ty),
                hint:      "use `default` for non-string columns".into()
            });
        }
        Some(DefaultValue::Code(_)) if is_string(base) => {
            report(ErrorKind::DefaultKindMismatch {
                field:     field.ident.to_string(),
                attribute: "default".into(),
                ty:        type_key(&field.ty),
                hint:      "use `default_text` for string columns".into()
            });
        }
        _ => {}
    }

    let field_name = field.ident.to_string();
    let dsl = if sole_key {
        format_ident!("ID")
    } else {
        format_ident!("{}", field_name.to_case(Case::Constant))
    };

    let kind = kind?;
    if failed {
        return None;
    }

    Some(ColumnModel {
        field: field.ident.clone(),
        vis: field.vis.clone(),
        name: field.column.column_name(&field_name).to_string(),
        dsl,
        ty: field.ty.clone(),
        nullable,
        kind,
        varchar: field.column.varchar,
        auto_increment,
        primary_key: field.id.is_some(),
        default: field.column.default.clone(),
        foreign_key: field.foreign_key.as_ref().map(|fk| ForeignKeyInfo {
            target: fk.target.clone(),
            column: fk.column.clone()
        }),
        handle
    })
}

fn check_names(raw: &RawEntity, columns: &[ColumnModel], diagnostics: &mut Vec<Diagnostic>) {
    let mut names = HashSet::new();
    let mut constants = HashSet::new();
    for column in columns {
        if !names.insert(column.name.as_str()) {
            diagnostics.push(Diagnostic::new(
                ErrorKind::MalformedAttribute {
                    message: format!(
                        "column name `{}` is used twice in `{}`",
                        column.name, raw.ident
                    )
                },
                column.handle.clone()
            ));
        }
        if !constants.insert(column.dsl.to_string()) {
            diagnostics.push(Diagnostic::new(
                ErrorKind::MalformedAttribute {
                    message: format!(
                        "column constant `{}Table::{}` is used twice",
                        raw.ident, column.dsl
                    )
                },
                column.handle.clone()
            ));
        }
    }
}

/// Build the model of one entity.
///
/// # Errors
///
/// Every per-entity rule violation, see the module table.
pub fn build_entity(raw: &RawEntity) -> Result<EntityModel, Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();

    let table = raw
        .table
        .clone()
        .unwrap_or_else(|| raw.ident.to_string().to_case(Case::Snake));

    let key_count = raw
        .fields
        .iter()
        .filter(|field| field.is_column() && field.id.is_some())
        .count();

    let mut columns = Vec::new();
    let mut references = Vec::new();
    let mut back_references = Vec::new();
    let mut unique_members: Vec<(String, usize)> = Vec::new();

    for field in &raw.fields {
        let handle = raw.handle.field(field.ident.to_string(), field.ident.span());

        if let Some(reference) = &field.references {
            if option_inner(&field.ty).is_none() {
                diagnostics.push(Diagnostic::new(
                    ErrorKind::ReferenceMustBeNullable {
                        field: field.ident.to_string()
                    },
                    handle
                ));
                continue;
            }
            references.push(ForwardReferenceInfo {
                field: field.ident.clone(),
                vis: field.vis.clone(),
                ty: field.ty.clone(),
                target: reference.target.clone(),
                fk_columns: reference.columns.clone(),
                handle
            });
            continue;
        }

        if let Some(target) = &field.back_reference {
            let Some(inner) = option_inner(&field.ty) else {
                diagnostics.push(Diagnostic::new(
                    ErrorKind::ReferenceMustBeNullable {
                        field: field.ident.to_string()
                    },
                    handle
                ));
                continue;
            };
            back_references.push(BackReferenceInfo {
                field: field.ident.clone(),
                vis: field.vis.clone(),
                ty: field.ty.clone(),
                target: target.clone(),
                many: vec_inner(inner).is_some(),
                handle
            });
            continue;
        }

        let sole_key = key_count == 1 && field.id.is_some();
        if let Some(column) = build_column(raw, field, sole_key, &mut diagnostics) {
            if let Some(unique) = &field.unique {
                let group = unique
                    .group
                    .clone()
                    .unwrap_or_else(|| format!("{table}_{}_unique", column.name));
                unique_members.push((group, columns.len()));
            }
            columns.push(column);
        }
    }

    check_names(raw, &columns, &mut diagnostics);

    let key: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.primary_key)
        .map(|(index, _)| index)
        .collect();

    if key_count == 0 {
        diagnostics.push(Diagnostic::new(
            ErrorKind::MissingPrimaryKey {
                entity: raw.ident.to_string()
            },
            raw.handle.clone()
        ));
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let primary_key = match key.as_slice() {
        [single] => PrimaryKey::Simple(*single),
        _ => PrimaryKey::Composite(key)
    };

    let mut unique_groups: Vec<UniqueGroup> = Vec::new();
    for (name, index) in unique_members {
        match unique_groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.columns.push(index),
            None => unique_groups.push(UniqueGroup {
                name,
                columns: vec![index]
            })
        }
    }

    Ok(EntityModel {
        handle: raw.handle.clone(),
        ident: raw.ident.clone(),
        vis: raw.vis.clone(),
        table,
        columns,
        primary_key,
        references,
        back_references,
        unique_groups
    })
}
