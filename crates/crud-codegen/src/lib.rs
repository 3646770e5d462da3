// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Pipeline
//!
//! ```text
//! Declaration ──extract──► RawEntity ──build──► EntityModel
//!                                                   │
//!                         EntityGraph ◄─────────────┘
//!                              │
//!                 validate ──► resolve ──► synthesize ──► EmitUnit ──render──► tokens
//! ```
//!
//! Each stage is all-or-nothing for the whole run: diagnostics are gathered
//! per stage and the run stops before the next stage when any exist.
//!
//! | Stage | Module | Failure |
//! |-------|--------|---------|
//! | extract | [`extract`] | `NotADataRecord`, `MalformedAttribute` |
//! | build | [`build`] | per-entity rules |
//! | graph | [`graph`] | duplicate entities or tables |
//! | validate | [`validate`] | cross-entity rules |
//! | resolve | [`resolve`] | `UnresolvedColumnType` (internal) |
//! | synthesize | [`synth`] | `UnresolvedColumnType` (internal) |
//! | render | [`render`] | infallible |

pub mod build;
pub mod emit;
pub mod error;
pub mod extract;
pub mod graph;
pub mod model;
pub mod render;
pub mod resolve;
pub mod synth;
pub mod types;
pub mod validate;

use std::path::PathBuf;

use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use syn::Ident;
use tracing::debug;

pub use crate::{
    emit::Builder,
    error::{DeclarationHandle, Diagnostic, Error, ErrorKind, combine},
    extract::{Declaration, ENTITY_ATTRIBUTE, FIELD_ATTRIBUTES, entity_input, is_entity},
    graph::EntityGraph,
    render::{Renderer, RustRenderer},
    synth::EmitUnit
};

/// Rendered output of one entity.
#[derive(Debug, Clone)]
pub struct Output {
    /// Entity type.
    pub entity:    Ident,
    /// File name for the emission sink, `<snake entity>.rs`.
    pub file_name: String,
    /// Declaration file the entity came from.
    pub origin:    Option<PathBuf>,
    /// Rendered tokens.
    pub tokens:    TokenStream
}

/// Build and validate the graph of `declarations`.
///
/// # Errors
///
/// Every diagnostic of the first failing stage.
pub fn analyze(declarations: &[Declaration]) -> Result<EntityGraph, Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let mut raw = Vec::with_capacity(declarations.len());
    for declaration in declarations {
        match extract::extract(declaration) {
            Ok(entity) => raw.push(entity),
            Err(errors) => diagnostics.extend(errors)
        }
    }

    let mut models = Vec::with_capacity(raw.len());
    for entity in &raw {
        match build::build_entity(entity) {
            Ok(model) => models.push(model),
            Err(errors) => diagnostics.extend(errors)
        }
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }
    debug!(entities = models.len(), "entities built");

    let graph = EntityGraph::new(models)?;
    validate::validate(&graph)?;
    debug!(entities = graph.len(), "graph validated");
    Ok(graph)
}

/// Synthesize the emit units of `declarations`.
///
/// # Errors
///
/// Every diagnostic of the first failing stage.
pub fn synthesize(declarations: &[Declaration]) -> Result<Vec<EmitUnit>, Vec<Diagnostic>> {
    let graph = analyze(declarations)?;
    let types = resolve::resolve(&graph)?;
    debug!(columns = types.len(), "column types resolved");
    let units = synth::synthesize(&graph, &types)?;
    debug!(units = units.len(), "units synthesized");
    Ok(units)
}

/// Run the whole pipeline and render every entity.
///
/// # Errors
///
/// Every diagnostic of the first failing stage; nothing is rendered then.
pub fn generate<R>(declarations: &[Declaration], renderer: &R) -> Result<Vec<Output>, Vec<Diagnostic>>
where
    R: Renderer<Output = TokenStream>
{
    let origins: Vec<(String, Option<PathBuf>)> = declarations
        .iter()
        .map(|declaration| (declaration.input.ident.to_string(), declaration.origin.clone()))
        .collect();

    let units = synthesize(declarations)?;
    Ok(units
        .iter()
        .map(|unit| {
            let name = unit.entity.to_string();
            let origin = origins
                .iter()
                .find(|(entity, _)| *entity == name)
                .and_then(|(_, origin)| origin.clone());
            Output {
                entity: unit.entity.clone(),
                file_name: format!("{}.rs", name.to_case(Case::Snake)),
                origin,
                tokens: renderer.render(unit)
            }
        })
        .collect())
}
