// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column type resolution.
//!
//! Computes the externally visible type of every column.
//!
//! | Column | Resolved type |
//! |--------|---------------|
//! | foreign key, target has a simple key | `EntityId<declared, TargetTable>` |
//! | foreign key, explicit target column | type of that column, looked up |
//! | primary key member | `EntityId<declared, OwnTable>` |
//! | anything else | declared type |
//!
//! Lookups depend on other entities' columns, so resolution runs in two
//! passes over the arena: the first settles every column that needs no
//! lookup, the second repeats lookups until nothing changes. Whatever is
//! still open after that is an internal error; validation rules out every
//! input that could cause it. `Option<_>` on the local column is kept
//! around the resolved type.

use std::collections::HashMap;

use syn::{Ident, Type};
use tracing::trace;

use crate::{
    error::{Diagnostic, ErrorKind},
    graph::EntityGraph,
    types::base_type,
    validate::foreign_key_target
};

/// Resolved type of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    /// Identifier of a row of `entity`'s table.
    Identifier {
        /// Underlying value type.
        value:    Type,
        /// Entity whose key space the value belongs to.
        entity:   Ident,
        /// Wrapped in `Option`.
        nullable: bool
    },

    /// The declared type unchanged.
    Plain(Type)
}

impl ResolvedType {
    /// Whether the type is an identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier { .. })
    }

    fn with_nullability(self, declared: &Type, nullable: bool) -> Self {
        match self {
            Self::Identifier {
                value,
                entity,
                ..
            } => Self::Identifier {
                value,
                entity,
                nullable
            },
            Self::Plain(_) => Self::Plain(declared.clone())
        }
    }
}

/// Resolved types keyed by `(entity index, column index)`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTypes {
    types: HashMap<(usize, usize), ResolvedType>
}

impl ResolvedTypes {
    /// Resolved type of a column.
    #[must_use]
    pub fn get(&self, entity: usize, column: usize) -> Option<&ResolvedType> {
        self.types.get(&(entity, column))
    }

    /// Number of resolved columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether nothing is resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Resolve every column of a validated graph.
///
/// # Errors
///
/// `UnresolvedColumnType` for each column left open.
pub fn resolve(graph: &EntityGraph) -> Result<ResolvedTypes, Vec<Diagnostic>> {
    let mut resolved = ResolvedTypes::default();
    let mut pending: Vec<(usize, usize, usize, usize)> = Vec::new();

    for (entity_index, entity) in graph.entities().iter().enumerate() {
        for (column_index, column) in entity.columns.iter().enumerate() {
            let value = base_type(&column.ty).clone();
            let ty = match &column.foreign_key {
                Some(fk) => {
                    let (Some(target_index), Some(target)) =
                        (graph.index_of(&fk.target), graph.get(&fk.target))
                    else {
                        continue;
                    };
                    if fk.column.is_some() {
                        if let Ok(target_column) = foreign_key_target(column, target)
                            && let Some((found, _)) =
                                target.column_by_field(&target_column.field.to_string())
                        {
                            pending.push((entity_index, column_index, target_index, found));
                        }
                        continue;
                    }
                    ResolvedType::Identifier {
                        value,
                        entity: target.ident.clone(),
                        nullable: column.nullable
                    }
                }
                None if column.primary_key => ResolvedType::Identifier {
                    value,
                    entity: entity.ident.clone(),
                    nullable: false
                },
                None => ResolvedType::Plain(column.ty.clone())
            };
            resolved.types.insert((entity_index, column_index), ty);
        }
    }
    trace!(resolved = resolved.len(), pending = pending.len(), "first pass");

    loop {
        let before = pending.len();
        pending.retain(|&(entity, column, target_entity, target_column)| {
            let Some(target_ty) = resolved.get(target_entity, target_column).cloned() else {
                return true;
            };
            let local = &graph.entities()[entity].columns[column];
            resolved.types.insert(
                (entity, column),
                target_ty.with_nullability(&local.ty, local.nullable)
            );
            false
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    if pending.is_empty() {
        Ok(resolved)
    } else {
        Err(pending
            .into_iter()
            .map(|(entity, column, ..)| {
                let model = &graph.entities()[entity];
                let column = &model.columns[column];
                Diagnostic::new(
                    ErrorKind::UnresolvedColumnType {
                        entity: model.ident.to_string(),
                        column: column.field.to_string()
                    },
                    column.handle.clone()
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::*;
    use crate::{
        build::build_entity,
        extract::{Declaration, extract}
    };

    fn graph(inputs: Vec<DeriveInput>) -> EntityGraph {
        let models = inputs
            .into_iter()
            .map(|input| build_entity(&extract(&Declaration::new(input)).unwrap()).unwrap())
            .collect();
        EntityGraph::new(models).unwrap()
    }

    fn identifier(value: Type, entity: &str, nullable: bool) -> ResolvedType {
        ResolvedType::Identifier {
            value,
            entity: quote::format_ident!("{}", entity),
            nullable
        }
    }

    #[test]
    fn resolves_keys_and_foreign_keys() {
        let graph = graph(vec![
            parse_quote! {
                #[entity]
                struct Director {
                    #[id(auto_increment)]
                    id: i64,
                    name: String
                }
            },
            parse_quote! {
                #[entity]
                struct Movie {
                    #[id(auto_increment)]
                    id: i64,
                    #[foreign_key(Director)]
                    director_id: Option<i64>
                }
            }
        ]);
        let types = resolve(&graph).unwrap();
        assert_eq!(
            types.get(0, 0),
            Some(&identifier(parse_quote!(i64), "Director", false))
        );
        assert_eq!(
            types.get(0, 1),
            Some(&ResolvedType::Plain(parse_quote!(String)))
        );
        assert_eq!(
            types.get(1, 1),
            Some(&identifier(parse_quote!(i64), "Director", true))
        );
    }

    #[test]
    fn explicit_column_takes_target_type() {
        let graph = graph(vec![
            parse_quote! {
                #[entity]
                struct Category {
                    #[id(auto_increment)]
                    id: i64
                }
            },
            parse_quote! {
                #[entity]
                struct CategoryTranslations {
                    #[id]
                    #[foreign_key(Category)]
                    category_id: i64,
                    #[id]
                    language_code: String,
                    translation: String
                }
            },
            parse_quote! {
                #[entity]
                struct Caption {
                    #[id]
                    id: i64,
                    #[foreign_key(CategoryTranslations, column = "category_id")]
                    category: i64,
                    #[foreign_key(CategoryTranslations, column = "language_code")]
                    language: String,
                    #[foreign_key(CategoryTranslations, column = "translation")]
                    text: Option<String>
                }
            }
        ]);
        let types = resolve(&graph).unwrap();
        assert_eq!(
            types.get(1, 0),
            Some(&identifier(parse_quote!(i64), "Category", false))
        );
        assert_eq!(
            types.get(1, 1),
            Some(&identifier(parse_quote!(String), "CategoryTranslations", false))
        );
        assert_eq!(
            types.get(2, 1),
            Some(&identifier(parse_quote!(i64), "Category", false))
        );
        assert_eq!(
            types.get(2, 2),
            Some(&identifier(parse_quote!(String), "CategoryTranslations", false))
        );
        assert_eq!(
            types.get(2, 3),
            Some(&ResolvedType::Plain(parse_quote!(Option<String>)))
        );
    }

    #[test]
    fn chained_lookups_converge() {
        let graph = graph(vec![
            parse_quote! {
                #[entity]
                struct C {
                    #[id]
                    id: i64,
                    #[foreign_key(B, column = "code")]
                    b_code: String
                }
            },
            parse_quote! {
                #[entity]
                struct B {
                    #[id]
                    #[foreign_key(A, column = "name")]
                    code: String,
                    #[id]
                    part: i64
                }
            },
            parse_quote! {
                #[entity]
                struct A {
                    #[id]
                    name: String,
                    #[id]
                    version: i64
                }
            }
        ]);
        let types = resolve(&graph).unwrap();
        assert_eq!(
            types.get(0, 1),
            Some(&identifier(parse_quote!(String), "A", false))
        );
        assert_eq!(
            types.get(1, 0),
            Some(&identifier(parse_quote!(String), "A", false))
        );
    }

    #[test]
    fn cyclic_lookups_are_internal_errors() {
        let graph = graph(vec![
            parse_quote! {
                #[entity]
                struct A {
                    #[id]
                    id: i64,
                    #[id]
                    part: i64,
                    #[foreign_key(B, column = "link")]
                    link: i64
                }
            },
            parse_quote! {
                #[entity]
                struct B {
                    #[id]
                    id: i64,
                    #[id]
                    part: i64,
                    #[foreign_key(A, column = "link")]
                    link: i64
                }
            }
        ]);
        let errors = resolve(&graph).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(
            errors
                .iter()
                .all(|d| matches!(d.kind, ErrorKind::UnresolvedColumnType { .. }))
        );
    }
}
