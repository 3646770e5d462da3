// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[derive(Entity)]`.

use crud_codegen::{Declaration, build::build_entity, combine, extract::extract, is_entity};
use proc_macro2::TokenStream;
use syn::DeriveInput;

/// Check one entity on its own.
///
/// Inside a `#[schema]` module the marker is already stripped, so the
/// derive has nothing to check there.
pub fn derive(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error()
    };
    if !is_entity(&input.attrs) {
        return TokenStream::new();
    }

    let result = extract(&Declaration::new(input)).and_then(|raw| build_entity(&raw).map(drop));
    match result {
        Ok(()) => TokenStream::new(),
        Err(diagnostics) => combine(&diagnostics)
            .map(|err| err.to_compile_error())
            .unwrap_or_default()
    }
}
