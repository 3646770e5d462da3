// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Whole-graph entity arena.
//!
//! Entities refer to each other by name only, so cycles (a movie references
//! its director, the director back-references its movies) need no special
//! treatment.

use std::collections::HashMap;

use convert_case::{Case, Casing};
use syn::Ident;

use crate::{
    error::{Diagnostic, ErrorKind},
    model::{EntityModel, ForwardReferenceInfo}
};

/// Every entity of one generator run, addressed by name or index.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: Vec<EntityModel>,
    index:    HashMap<String, usize>
}

impl EntityGraph {
    /// Arrange built entities into a graph.
    ///
    /// # Errors
    ///
    /// Two entities with the same type name or the same table name.
    pub fn new(entities: Vec<EntityModel>) -> Result<Self, Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        let mut index = HashMap::new();
        let mut tables: HashMap<&str, &Ident> = HashMap::new();

        for (position, entity) in entities.iter().enumerate() {
            if index.insert(entity.ident.to_string(), position).is_some() {
                diagnostics.push(Diagnostic::new(
                    ErrorKind::MalformedAttribute {
                        message: format!("entity `{}` is declared twice", entity.ident)
                    },
                    entity.handle.clone()
                ));
            }
            if let Some(other) = tables.insert(entity.table.as_str(), &entity.ident) {
                diagnostics.push(Diagnostic::new(
                    ErrorKind::MalformedAttribute {
                        message: format!(
                            "table `{}` is used by both `{other}` and `{}`",
                            entity.table, entity.ident
                        )
                    },
                    entity.handle.clone()
                ));
            }
        }
        drop(tables);

        if diagnostics.is_empty() {
            Ok(Self {
                entities,
                index
            })
        } else {
            Err(diagnostics)
        }
    }

    /// Entity named `name`.
    #[must_use]
    pub fn get(&self, name: &Ident) -> Option<&EntityModel> {
        self.index_of(name).map(|index| &self.entities[index])
    }

    /// Arena index of the entity named `name`.
    #[must_use]
    pub fn index_of(&self, name: &Ident) -> Option<usize> {
        self.index.get(&name.to_string()).copied()
    }

    /// Entities in declaration order.
    #[must_use]
    pub fn entities(&self) -> &[EntityModel] {
        &self.entities
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Local foreign key field names a forward reference resolves through:
    /// the listed columns, or one derived name per target key column.
    ///
    /// `None` when the target is not an entity.
    #[must_use]
    pub fn reference_columns(&self, reference: &ForwardReferenceInfo) -> Option<Vec<String>> {
        if !reference.fk_columns.is_empty() {
            return Some(reference.fk_columns.iter().map(ToString::to_string).collect());
        }
        let target = self.get(&reference.target)?;
        let prefix = target.ident.to_string().to_case(Case::Snake);
        Some(
            target
                .key_columns()
                .map(|column| format!("{prefix}_{}", column.dsl.to_string().to_lowercase()))
                .collect()
        )
    }
}
