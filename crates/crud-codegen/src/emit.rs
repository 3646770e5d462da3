// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Emission sink for build scripts.
//!
//! ```rust,ignore
//! // build.rs
//! fn main() {
//!     crud_codegen::Builder::new()
//!         .declarations("src/models.rs")
//!         .generate()
//!         .unwrap();
//! }
//!
//! // src/models.rs
//! #[derive(crud_derive::Entity)]
//! #[entity]
//! pub struct Director { #[id(auto_increment)] pub id: i64, pub name: String }
//!
//! include!(concat!(env!("OUT_DIR"), "/director.rs"));
//! ```
//!
//! Every top-level item marked `#[entity]` in the declaration files takes
//! part in one run. Files are written only when every entity passed; each
//! written file is registered with `cargo:rerun-if-changed` on the file its
//! entity was declared in.

use std::{
    fs,
    path::{Path, PathBuf}
};

use tracing::info;

use crate::{
    Output,
    error::Error,
    extract::{Declaration, entity_input},
    generate,
    render::RustRenderer
};

/// Build-script front end of the generator.
#[derive(Debug, Clone)]
pub struct Builder {
    declarations:     Vec<PathBuf>,
    out_dir:          Option<PathBuf>,
    runtime:          syn::Path,
    rerun_if_changed: bool
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            declarations:     Vec::new(),
            out_dir:          None,
            runtime:          syn::parse_quote!(::crud_derive),
            rerun_if_changed: true
        }
    }
}

impl Builder {
    /// Builder with defaults: no declarations, `OUT_DIR`, `::crud_derive`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration file.
    #[must_use]
    pub fn declarations(mut self, path: impl Into<PathBuf>) -> Self {
        self.declarations.push(path.into());
        self
    }

    /// Write into `path` instead of `OUT_DIR`.
    #[must_use]
    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(path.into());
        self
    }

    /// Path generated code uses for the runtime crate.
    #[must_use]
    pub fn runtime_path(mut self, path: syn::Path) -> Self {
        self.runtime = path;
        self
    }

    /// Print `cargo:rerun-if-changed` lines. On by default.
    #[must_use]
    pub const fn rerun_if_changed(mut self, enabled: bool) -> Self {
        self.rerun_if_changed = enabled;
        self
    }

    fn read_declarations(&self) -> Result<Vec<Declaration>, Error> {
        let mut declarations = Vec::new();
        for path in &self.declarations {
            let source = fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.clone(),
                source
            })?;
            let file = syn::parse_file(&source).map_err(|source| Error::Parse {
                path: path.clone(),
                source
            })?;
            declarations.extend(
                file.items
                    .iter()
                    .filter_map(entity_input)
                    .map(|input| Declaration::with_origin(input, path.clone()))
            );
        }
        Ok(declarations)
    }

    fn target_dir(&self) -> Result<PathBuf, Error> {
        match &self.out_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or(Error::MissingOutDir)
        }
    }

    /// Run the generator and write one file per entity.
    ///
    /// # Errors
    ///
    /// Unreadable or unparsable declaration files, any entity diagnostic
    /// (nothing is written then), a missing output directory or a failed
    /// write.
    pub fn generate(&self) -> Result<Vec<PathBuf>, Error> {
        let out_dir = self.target_dir()?;
        let declarations = self.read_declarations()?;
        let renderer = RustRenderer::new(self.runtime.clone());
        let outputs = generate(&declarations, &renderer).map_err(Error::Diagnostics)?;
        write_outputs(&out_dir, &outputs, self.rerun_if_changed)
    }
}

fn write_outputs(dir: &Path, outputs: &[Output], rerun: bool) -> Result<Vec<PathBuf>, Error> {
    fs::create_dir_all(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source
    })?;
    let mut written = Vec::with_capacity(outputs.len());
    for output in outputs {
        let path = dir.join(&output.file_name);
        fs::write(&path, output.tokens.to_string()).map_err(|source| Error::Io {
            path: path.clone(),
            source
        })?;
        info!(entity = %output.entity, path = %path.display(), "generated");
        if rerun && let Some(origin) = &output.origin {
            println!("cargo:rerun-if-changed={}", origin.display());
        }
        written.push(path);
    }
    Ok(written)
}
