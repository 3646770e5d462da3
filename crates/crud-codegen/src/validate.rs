// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Cross-entity validation.
//!
//! Runs once every entity is built. Checks every entity and reports every
//! violation; the run produces no output when any is found.
//!
//! A reference or back-reference joins its two entities on every foreign key
//! between them; two keys to the same target column make that join
//! ambiguous and are rejected.
//!
//! Foreign key types are compared without their `Option` layer, so a
//! nullable foreign key may point at a required key column.

use crate::{
    error::{Diagnostic, ErrorKind},
    graph::EntityGraph,
    model::{ColumnModel, EntityModel, ForwardReferenceInfo, PrimaryKey},
    types::{base_type, type_key}
};

/// Validate the whole graph.
///
/// # Errors
///
/// Every violation found, in entity order.
pub fn validate(graph: &EntityGraph) -> Result<(), Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    for entity in graph.entities() {
        check_auto_increment(entity, &mut diagnostics);
        for column in &entity.columns {
            check_foreign_key(graph, column, &mut diagnostics);
        }
        for reference in &entity.references {
            check_reference(graph, entity, reference, &mut diagnostics);
        }
        check_back_references(graph, entity, &mut diagnostics);
    }
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

fn check_auto_increment(entity: &EntityModel, diagnostics: &mut Vec<Diagnostic>) {
    if let PrimaryKey::Composite(indices) = &entity.primary_key {
        for &index in indices {
            let column = &entity.columns[index];
            if column.auto_increment {
                diagnostics.push(Diagnostic::new(
                    ErrorKind::AutoIncrementOnCompositeKey {
                        field: column.field.to_string()
                    },
                    column.handle.clone()
                ));
            }
        }
    }
}

/// Column of `target` a foreign key points at.
///
/// # Errors
///
/// The diagnostic kind when the column cannot be determined.
pub(crate) fn foreign_key_target<'g>(
    column: &ColumnModel,
    target: &'g EntityModel
) -> Result<&'g ColumnModel, ErrorKind> {
    let field = column.field.to_string();
    match column.foreign_key.as_ref().and_then(|fk| fk.column.as_deref()) {
        Some(name) => target
            .find_column(name)
            .map(|(_, found)| found)
            .ok_or_else(|| ErrorKind::UnknownForeignKeyColumn {
                field,
                target: target.ident.to_string(),
                column: name.to_string()
            }),
        None => target.simple_key().ok_or_else(|| ErrorKind::CompositeForeignKeyNeedsColumn {
            field,
            target: target.ident.to_string()
        })
    }
}

/// Two foreign keys of `from` that point at the same column of `to`.
fn ambiguous_join(from: &EntityModel, to: &EntityModel, field: &str) -> Option<ErrorKind> {
    let mut seen: Vec<(&ColumnModel, &ColumnModel)> = Vec::new();
    for column in &from.columns {
        let points_at_target = column
            .foreign_key
            .as_ref()
            .is_some_and(|fk| fk.target == to.ident);
        if !points_at_target {
            continue;
        }
        let Ok(target_column) = foreign_key_target(column, to) else {
            continue;
        };
        let earlier = seen
            .iter()
            .find(|(_, earlier)| earlier.name == target_column.name);
        if let Some((first, _)) = earlier {
            return Some(ErrorKind::AmbiguousJoin {
                field:  field.to_string(),
                from:   from.ident.to_string(),
                to:     to.ident.to_string(),
                column: target_column.name.clone(),
                first:  first.field.to_string(),
                second: column.field.to_string()
            });
        }
        seen.push((column, target_column));
    }
    None
}

fn check_foreign_key(graph: &EntityGraph, column: &ColumnModel, diagnostics: &mut Vec<Diagnostic>) {
    let Some(fk) = &column.foreign_key else {
        return;
    };
    let Some(target) = graph.get(&fk.target) else {
        diagnostics.push(Diagnostic::new(
            ErrorKind::UnknownForeignKeyTarget {
                field:  column.field.to_string(),
                target: fk.target.to_string()
            },
            column.handle.clone()
        ));
        return;
    };

    let target_column = match foreign_key_target(column, target) {
        Ok(found) => found,
        Err(kind) => {
            diagnostics.push(Diagnostic::new(kind, column.handle.clone()));
            return;
        }
    };

    let found = type_key(base_type(&column.ty));
    let expected = type_key(base_type(&target_column.ty));
    if found != expected {
        diagnostics.push(Diagnostic::new(
            ErrorKind::ColumnTypeMismatch {
                field: column.field.to_string(),
                found,
                target: target.ident.to_string(),
                column: target_column.field.to_string(),
                expected
            },
            column.handle.clone()
        ));
    }
}

fn check_reference(
    graph: &EntityGraph,
    entity: &EntityModel,
    reference: &ForwardReferenceInfo,
    diagnostics: &mut Vec<Diagnostic>
) {
    let field = reference.field.to_string();
    let Some(target) = graph.get(&reference.target) else {
        diagnostics.push(Diagnostic::new(
            ErrorKind::UnknownReferenceTarget {
                field,
                target: reference.target.to_string()
            },
            reference.handle.clone()
        ));
        return;
    };

    let explicit = !reference.fk_columns.is_empty();
    if explicit && reference.fk_columns.len() != target.primary_key.arity() {
        diagnostics.push(Diagnostic::new(
            ErrorKind::FkColumnCountMismatch {
                field,
                target: target.ident.to_string(),
                expected: target.primary_key.arity(),
                found: reference.fk_columns.len()
            },
            reference.handle.clone()
        ));
        return;
    }

    if let Some(kind) = ambiguous_join(entity, target, &field) {
        diagnostics.push(Diagnostic::new(kind, reference.handle.clone()));
    }

    let names = graph.reference_columns(reference).unwrap_or_default();
    for name in names {
        let annotated = entity
            .column_by_field(&name)
            .and_then(|(_, column)| column.foreign_key.as_ref())
            .is_some_and(|fk| fk.target == target.ident);
        if annotated {
            continue;
        }
        let kind = if explicit {
            ErrorKind::FkColumnNotAnnotated {
                field:  field.clone(),
                column: name,
                target: target.ident.to_string()
            }
        } else {
            ErrorKind::AutoDetectedFkMissing {
                field:    field.clone(),
                expected: name,
                target:   target.ident.to_string()
            }
        };
        diagnostics.push(Diagnostic::new(kind, reference.handle.clone()));
    }
}

fn check_back_references(
    graph: &EntityGraph,
    entity: &EntityModel,
    diagnostics: &mut Vec<Diagnostic>
) {
    for back in &entity.back_references {
        let Some(target) = graph.get(&back.target) else {
            diagnostics.push(Diagnostic::new(
                ErrorKind::UnknownReferenceTarget {
                    field:  back.field.to_string(),
                    target: back.target.to_string()
                },
                back.handle.clone()
            ));
            continue;
        };
        let points_back = target.columns.iter().any(|column| {
            column
                .foreign_key
                .as_ref()
                .is_some_and(|fk| fk.target == entity.ident)
        });
        if !points_back {
            diagnostics.push(Diagnostic::new(
                ErrorKind::UnmatchedBackReference {
                    field:  back.field.to_string(),
                    target: target.ident.to_string(),
                    entity: entity.ident.to_string()
                },
                back.handle.clone()
            ));
        } else if let Some(kind) = ambiguous_join(target, entity, &back.field.to_string()) {
            diagnostics.push(Diagnostic::new(kind, back.handle.clone()));
        }
    }
}
