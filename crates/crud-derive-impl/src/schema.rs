// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! `#[schema]` on an inline module.
//!
//! The module is the unit of one generator run:
//!
//! 1. Every item marked `#[entity]` becomes a declaration.
//! 2. `crud-codegen` runs the whole pipeline over them.
//! 3. Helper attributes are stripped from the module's items.
//! 4. Generated items are appended, or every diagnostic is emitted.

use crud_codegen::{
    Declaration, ENTITY_ATTRIBUTE, FIELD_ATTRIBUTES, RustRenderer, combine, entity_input,
    generate, is_entity
};
use darling::{FromMeta, ast::NestedMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Fields, Item, ItemMod};

/// Arguments of `#[schema(...)]`.
#[derive(Debug, Default, FromMeta)]
#[darling(default)]
struct SchemaArgs {
    /// Runtime crate path, `crate = "path"`.
    #[darling(rename = "crate")]
    krate: Option<syn::Path>
}

impl SchemaArgs {
    fn parse(args: TokenStream) -> darling::Result<Self> {
        let list = NestedMeta::parse_meta_list(args)?;
        Self::from_list(&list)
    }

    fn runtime(self) -> syn::Path {
        self.krate.unwrap_or_else(|| syn::parse_quote!(::crud_derive))
    }
}

/// Expand `#[schema(args)] mod name { .. }`.
pub fn expand(args: TokenStream, item: TokenStream) -> TokenStream {
    let runtime = match SchemaArgs::parse(args) {
        Ok(args) => args.runtime(),
        Err(err) => return err.write_errors()
    };
    match syn::parse2::<ItemMod>(item) {
        Ok(module) => expand_module(module, runtime),
        Err(err) => err.to_compile_error()
    }
}

fn expand_module(mut module: ItemMod, runtime: syn::Path) -> TokenStream {
    let Some((brace, mut items)) = module.content.take() else {
        return syn::Error::new_spanned(
            &module,
            "#[schema] needs an inline module: `mod name { .. }`"
        )
        .to_compile_error();
    };

    let declarations: Vec<Declaration> = items
        .iter()
        .filter_map(entity_input)
        .map(Declaration::new)
        .collect();
    let result = generate(&declarations, &RustRenderer::new(runtime));

    for item in &mut items {
        strip_item(item);
    }

    let errors = match result {
        Ok(outputs) => {
            items.extend(outputs.into_iter().map(|output| Item::Verbatim(output.tokens)));
            None
        }
        Err(diagnostics) => combine(&diagnostics).map(|err| err.to_compile_error())
    };
    module.content = Some((brace, items));
    quote! {
        #errors
        #module
    }
}

fn strip_item(item: &mut Item) {
    match item {
        Item::Struct(item) if is_entity(&item.attrs) => {
            strip(&mut item.attrs, &[ENTITY_ATTRIBUTE]);
            strip_fields(&mut item.fields);
        }
        Item::Enum(item) if is_entity(&item.attrs) => {
            strip(&mut item.attrs, &[ENTITY_ATTRIBUTE]);
            for variant in &mut item.variants {
                strip_fields(&mut variant.fields);
            }
        }
        Item::Union(item) if is_entity(&item.attrs) => {
            strip(&mut item.attrs, &[ENTITY_ATTRIBUTE]);
            for field in &mut item.fields.named {
                strip(&mut field.attrs, FIELD_ATTRIBUTES);
            }
        }
        _ => {}
    }
}

fn strip_fields(fields: &mut Fields) {
    for field in fields.iter_mut() {
        strip(&mut field.attrs, FIELD_ATTRIBUTES);
    }
}

fn strip(attrs: &mut Vec<Attribute>, names: &[&str]) {
    attrs.retain(|attr| !names.iter().any(|name| attr.path().is_ident(name)));
}
