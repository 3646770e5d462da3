// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rendering of emit units.
//!
//! [`Renderer`] is the seam between the emit model and a concrete output;
//! [`RustRenderer`] produces Rust tokens that call into the runtime crate.
//!
//! # Generated Items
//!
//! For an entity `Movie`:
//!
//! | Item | Purpose |
//! |------|---------|
//! | `MovieTable` | schema type with typed column constants and `repo` |
//! | `impl Table for MovieTable` | descriptor, converters, writers, `make_pk` |
//! | `MovieData` | create-data record, when needed |
//! | `MovieRepo<'c>` | repository alias |
//! | `MovieRepository` | `find_by_id`, `delete_by_id`, `create_with_related` |

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Ident, LitStr, Path};

use crate::{
    resolve::ResolvedType,
    synth::{ColumnSpec, EmitUnit, KeySpec}
};

/// Turns an emit unit into output.
pub trait Renderer {
    /// Rendered form of one unit.
    type Output;

    /// Render `unit`.
    fn render(&self, unit: &EmitUnit) -> Self::Output;
}

/// Rust token renderer.
#[derive(Debug, Clone)]
pub struct RustRenderer {
    runtime: Path
}

impl Default for RustRenderer {
    fn default() -> Self {
        Self {
            runtime: syn::parse_quote!(::crud_derive)
        }
    }
}

impl RustRenderer {
    /// Renderer naming the runtime crate through `runtime`.
    #[must_use]
    pub const fn new(runtime: Path) -> Self {
        Self {
            runtime
        }
    }

    /// Runtime crate path.
    #[must_use]
    pub const fn runtime(&self) -> &Path {
        &self.runtime
    }
}

impl Renderer for RustRenderer {
    type Output = TokenStream;

    fn render(&self, unit: &EmitUnit) -> TokenStream {
        let schema = self.schema_type(unit);
        let data = self.data_type(unit);
        let table = self.table_impl(unit);
        let repository = self.repository(unit);
        quote! {
            #schema
            #data
            #table
            #repository
        }
    }
}

fn lit(value: &str) -> LitStr {
    LitStr::new(value, proc_macro2::Span::call_site())
}

fn option_lit(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => {
            let value = lit(value);
            quote!(::core::option::Option::Some(#value))
        }
        None => quote!(::core::option::Option::None)
    }
}

impl RustRenderer {
    fn resolved_type(&self, resolved: &ResolvedType) -> TokenStream {
        let rt = &self.runtime;
        match resolved {
            ResolvedType::Identifier {
                value,
                entity,
                nullable
            } => {
                let table = crate::model::table_type_of(entity);
                let id = quote!(#rt::EntityId<#value, #table>);
                if *nullable {
                    quote!(::core::option::Option<#id>)
                } else {
                    id
                }
            }
            ResolvedType::Plain(ty) => ty.to_token_stream()
        }
    }

    fn id_type(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let table_type = &unit.table_type;
        match &unit.key {
            KeySpec::Simple {
                ty, ..
            } => quote!(#rt::EntityId<#ty, #table_type>),
            KeySpec::Composite(_) => quote!(#rt::CompositeId)
        }
    }

    fn schema_type(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let EmitUnit {
            vis,
            table_type,
            table_name,
            ..
        } = unit;
        let doc = format!(" Schema of table `{table_name}`.");

        let constants = unit.columns.iter().map(|column| {
            let constant = &column.constant;
            let value = self.resolved_type(&column.resolved);
            let table = lit(table_name);
            let name = lit(&column.name);
            quote! {
                #vis const #constant: #rt::Column<#table_type, #value> = #rt::Column::new(#table, #name);
            }
        });

        quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            #vis struct #table_type;

            impl #table_type {
                #(#constants)*

                /// Repository over this table bound to `conn`.
                #vis fn repo<'c>(conn: &'c mut #rt::sqlx::SqliteConnection) -> #rt::Repository<'c, #table_type> {
                    #rt::Repository::new(conn)
                }
            }
        }
    }

    fn data_type(&self, unit: &EmitUnit) -> TokenStream {
        let Some(data) = &unit.data else {
            return TokenStream::new();
        };
        let EmitUnit {
            vis,
            entity,
            ..
        } = unit;
        let ident = &data.ident;
        let doc = format!(" Insert-time shape of [`{entity}`] without generated columns.");
        let fields = data.columns.iter().map(|&index| {
            let ColumnSpec {
                field,
                vis,
                declared,
                ..
            } = &unit.columns[index];
            quote!(#vis #field: #declared)
        });
        quote! {
            #[doc = #doc]
            #[derive(Debug, Clone, PartialEq)]
            #vis struct #ident {
                #(#fields),*
            }
        }
    }

    fn table_def(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let name = lit(&unit.table_name);

        let id = match &unit.base_id {
            Some(base) => {
                let column = lit(&base.name);
                let auto_increment = base.auto_increment;
                quote! {
                    ::core::option::Option::Some(#rt::IdColumnDef {
                        name: #column,
                        auto_increment: #auto_increment
                    })
                }
            }
            None => quote!(::core::option::Option::None)
        };

        let columns = unit.columns.iter().filter(|column| column.listed).map(|column| {
            let name = lit(&column.name);
            let sql_type = lit(&column.sql_type);
            let nullable = column.nullable;
            let default = option_lit(column.default.as_deref());
            quote! {
                #rt::ColumnDef {
                    name: #name,
                    sql_type: #sql_type,
                    nullable: #nullable,
                    default: #default
                }
            }
        });

        let primary_key = match &unit.primary_key {
            Some(columns) => {
                let columns = columns.iter().map(|column| lit(column));
                quote!(::core::option::Option::Some(&[#(#columns),*]))
            }
            None => quote!(::core::option::Option::None)
        };

        let foreign_keys = unit.foreign_keys.iter().map(|fk| {
            let column = lit(&fk.column);
            let target_table = lit(&fk.target_table);
            let target_column = lit(&fk.target_column);
            quote! {
                #rt::ForeignKeyDef {
                    column: #column,
                    target_table: #target_table,
                    target_column: #target_column
                }
            }
        });

        let unique_indexes = unit.unique_indexes.iter().map(|unique| {
            let name = lit(&unique.name);
            let columns = unique.columns.iter().map(|column| lit(column));
            quote! {
                #rt::UniqueDef {
                    name: #name,
                    columns: &[#(#columns),*]
                }
            }
        });

        quote! {
            static DEF: #rt::TableDef = #rt::TableDef {
                name: #name,
                id: #id,
                columns: &[#(#columns),*],
                primary_key: #primary_key,
                foreign_keys: &[#(#foreign_keys),*],
                unique_indexes: &[#(#unique_indexes),*]
            };
            &DEF
        }
    }

    fn read_column(&self, column: &ColumnSpec) -> TokenStream {
        let rt = &self.runtime;
        let alias = lit(&column.alias);
        let field = &column.field;
        let ty = self.resolved_type(&column.resolved);
        let read = quote!(#rt::sqlx::Row::try_get::<#ty, _>(row, #alias)?);
        match &column.resolved {
            ResolvedType::Identifier {
                nullable: true, ..
            } => quote!(#field: #read.map(#rt::EntityId::into_value)),
            ResolvedType::Identifier {
                ..
            } => quote!(#field: #read.into_value()),
            ResolvedType::Plain(_) => quote!(#field: #read)
        }
    }

    fn converters(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let entity = &unit.entity;
        let reads = unit.columns.iter().map(|column| self.read_column(column));
        let empty = unit.empty_fields.iter();

        let from_row = quote! {
            fn from_row(
                row: &#rt::sqlx::sqlite::SqliteRow
            ) -> ::core::result::Result<#entity, #rt::sqlx::Error> {
                ::core::result::Result::Ok(#entity {
                    #(#reads,)*
                    #(#empty: ::core::option::Option::None),*
                })
            }
        };

        let from_joined_row = if unit.references.is_empty() {
            TokenStream::new()
        } else {
            let hydrate = unit.references.iter().map(|reference| {
                let field = &reference.field;
                let target = &reference.target_type;
                quote!(record.#field = #rt::read_related::<#target>(row);)
            });
            quote! {
                fn from_joined_row(
                    row: &#rt::sqlx::sqlite::SqliteRow
                ) -> ::core::result::Result<#entity, #rt::sqlx::Error> {
                    let mut record = <Self as #rt::Table>::from_row(row)?;
                    #(#hydrate)*
                    ::core::result::Result::Ok(record)
                }
            }
        };

        let attach = if unit.back_references.is_empty() {
            TokenStream::new()
        } else {
            let collect = unit.back_references.iter().map(|back| {
                let field = &back.field;
                let target = &back.target_type;
                let value = if back.many {
                    quote!(::core::option::Option::Some(#rt::collect_related::<#target>(rows)))
                } else {
                    quote!(#rt::collect_related::<#target>(rows).into_iter().next())
                };
                quote! {
                    if related.contains::<#target>() {
                        record.#field = #value;
                    }
                }
            });
            quote! {
                fn attach_back_references(
                    record: &mut #entity,
                    rows: &[&#rt::sqlx::sqlite::SqliteRow],
                    related: #rt::Related<'_>
                ) {
                    #(#collect)*
                }
            }
        };

        quote! {
            #from_row
            #from_joined_row
            #attach
        }
    }

    fn writers(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let entity = &unit.entity;
        let data_type = unit.data_type();

        let set = |source: &Ident, column: &ColumnSpec| {
            let name = lit(&column.name);
            let field = &column.field;
            quote!(row.set(#name, &#source.#field);)
        };

        let record = Ident::new("record", proc_macro2::Span::call_site());
        let all = unit.columns.iter().map(|column| set(&record, column));

        let data = Ident::new("data", proc_macro2::Span::call_site());
        let insertable: Vec<TokenStream> = unit
            .columns
            .iter()
            .filter(|column| !column.auto_increment)
            .map(|column| set(&data, column))
            .collect();
        let (data_param, row_param) = if insertable.is_empty() {
            (quote!(_data), quote!(_row))
        } else {
            (quote!(data), quote!(row))
        };

        quote! {
            fn write(record: &#entity, row: &mut #rt::PendingWrite) {
                #(#all)*
            }

            fn write_except_auto_increment(#data_param: &#data_type, #row_param: &mut #rt::PendingWrite) {
                #(#insertable)*
            }
        }
    }

    fn make_pk(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let entity = &unit.entity;
        let body = match &unit.key {
            KeySpec::Simple {
                field, ..
            } => quote!(#rt::EntityId::new(::core::clone::Clone::clone(&record.#field))),
            KeySpec::Composite(members) => {
                let fields = members.iter().map(|(field, _)| field);
                quote!(#rt::CompositeId::new() #(.with(&record.#fields))*)
            }
        };
        quote! {
            fn make_pk(record: &#entity) -> Self::Id {
                #body
            }
        }
    }

    fn table_impl(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let EmitUnit {
            entity,
            table_type,
            ..
        } = unit;
        let data_type = unit.data_type();
        let id_type = self.id_type(unit);
        let def = self.table_def(unit);
        let converters = self.converters(unit);
        let writers = self.writers(unit);
        let make_pk = self.make_pk(unit);

        quote! {
            impl #rt::Table for #table_type {
                type Record = #entity;
                type Data = #data_type;
                type Id = #id_type;

                fn def() -> &'static #rt::TableDef {
                    #def
                }

                #converters
                #writers
                #make_pk
            }
        }
    }

    fn key_value(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        match &unit.key {
            KeySpec::Simple {
                field, ..
            } => quote!(#rt::EntityId::new(#field)),
            KeySpec::Composite(members) => {
                let fields = members.iter().map(|(field, _)| field);
                quote!(#rt::CompositeId::new() #(.with(&#fields))*)
            }
        }
    }

    fn repository(&self, unit: &EmitUnit) -> TokenStream {
        let rt = &self.runtime;
        let EmitUnit {
            vis,
            entity,
            table_type,
            ..
        } = unit;
        let alias = unit.repo_alias();
        let trait_name = unit.repository_trait();
        let alias_doc = format!(" Repository over [`{table_type}`].");
        let trait_doc = format!(" Operations on [`{entity}`] with typed key parameters.");

        let key_params: Vec<TokenStream> = unit
            .key
            .fields()
            .into_iter()
            .map(|(field, ty)| quote!(#field: #ty))
            .collect();
        let key_value = self.key_value(unit);

        let (related_sig, related_impl) = match &unit.related_create {
            Some(params) => {
                let declared = params.iter().map(|param| {
                    let name = &param.param;
                    let target = &param.target_type;
                    quote!(#name: ::core::option::Option<<#target as #rt::Table>::Data>)
                });
                let signature = quote! {
                    async fn create_with_related(
                        &mut self,
                        record: <#table_type as #rt::Table>::Data
                        #(, #declared)*
                    ) -> #rt::Result<#entity>
                };
                let steps = params.iter().map(|param| {
                    let name = &param.param;
                    let target = &param.target_type;
                    let fk_field = &param.fk_field;
                    let source = &param.source_field;
                    let value = if param.wrap_some {
                        quote!(::core::option::Option::Some(created.#source))
                    } else {
                        quote!(created.#source)
                    };
                    quote! {
                        if let ::core::option::Option::Some(related) = #name {
                            let created = self.repo_for::<#target>().create_returning(&related).await?;
                            record.#fk_field = #value;
                        }
                    }
                });
                let rebind = if params.is_empty() {
                    TokenStream::new()
                } else {
                    quote!(let mut record = record;)
                };
                let body = quote! {
                    #signature {
                        #rebind
                        #(#steps)*
                        self.create_returning(&record).await
                    }
                };
                (
                    quote! {
                        /// Create the record, first creating every supplied related record
                        /// and storing its key in the matching foreign key.
                        #signature;
                    },
                    body
                )
            }
            None => (TokenStream::new(), TokenStream::new())
        };

        quote! {
            #[doc = #alias_doc]
            #vis type #alias<'c> = #rt::Repository<'c, #table_type>;

            #[doc = #trait_doc]
            #[#rt::async_trait]
            #vis trait #trait_name {
                /// Record with the given key.
                async fn find_by_id(&mut self, #(#key_params),*) -> #rt::Result<::core::option::Option<#entity>>;

                /// Delete the record with the given key.
                async fn delete_by_id(&mut self, #(#key_params),*) -> #rt::Result<u64>;

                #related_sig
            }

            #[#rt::async_trait]
            impl<'c> #trait_name for #rt::Repository<'c, #table_type> {
                async fn find_by_id(&mut self, #(#key_params),*) -> #rt::Result<::core::option::Option<#entity>> {
                    self.find_by_key(#key_value).await
                }

                async fn delete_by_id(&mut self, #(#key_params),*) -> #rt::Result<u64> {
                    self.delete_by_key(#key_value).await
                }

                #related_impl
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::{DeriveInput, parse_quote};

    use super::*;
    use crate::{
        build::build_entity,
        extract::{Declaration, extract},
        graph::EntityGraph,
        resolve::resolve,
        synth::synthesize,
        validate::validate
    };

    fn render(inputs: Vec<DeriveInput>) -> Vec<String> {
        let models = inputs
            .into_iter()
            .map(|input| build_entity(&extract(&Declaration::new(input)).unwrap()).unwrap())
            .collect();
        let graph = EntityGraph::new(models).unwrap();
        validate(&graph).unwrap();
        let types = resolve(&graph).unwrap();
        let renderer = RustRenderer::default();
        synthesize(&graph, &types)
            .unwrap()
            .iter()
            .map(|unit| renderer.render(unit).to_string())
            .collect()
    }

    fn squash(tokens: &str) -> String {
        tokens.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn director_and_movie() -> Vec<String> {
        render(vec![
            parse_quote! {
                #[entity]
                pub struct Director {
                    #[id(auto_increment)]
                    pub id: i64,
                    pub name: String,
                    #[back_reference(Movie)]
                    pub movies: Option<Vec<Movie>>
                }
            },
            parse_quote! {
                #[entity]
                pub struct Movie {
                    #[id(auto_increment)]
                    pub id: i64,
                    pub title: String,
                    #[foreign_key(Director)]
                    pub director_id: i64,
                    #[references(Director)]
                    pub director: Option<Director>
                }
            }
        ])
        .into_iter()
        .map(|tokens| squash(&tokens))
        .collect()
    }

    #[test]
    fn renders_column_constants() {
        let units = director_and_movie();
        let movie = &units[1];
        assert!(movie.contains(
            "pubconstID:::crud_derive::Column<MovieTable,::crud_derive::EntityId<i64,MovieTable>>"
        ));
        assert!(movie.contains(
            "pubconstDIRECTOR_ID:::crud_derive::Column<MovieTable,::crud_derive::EntityId<i64,DirectorTable>>"
        ));
        assert!(movie.contains("pubconstTITLE:::crud_derive::Column<MovieTable,String>"));
    }

    #[test]
    fn renders_table_descriptor() {
        let units = director_and_movie();
        let movie = &units[1];
        assert!(movie.contains("name:\"movie\""));
        assert!(movie.contains("auto_increment:true"));
        assert!(movie.contains("target_table:\"director\""));
        assert!(movie.contains("primary_key:::core::option::Option::None"));
        assert!(!movie.contains("name:\"id\",sql_type"));
    }

    #[test]
    fn renders_data_type_and_writers() {
        let units = director_and_movie();
        let movie = &units[1];
        assert!(movie.contains("pubstructMovieData{pubtitle:String,pubdirector_id:i64}"));
        assert!(movie.contains("typeData=MovieData;"));
        assert!(movie.contains("fnwrite_except_auto_increment(data:&MovieData"));
        assert!(movie.contains("row.set(\"id\",&record.id);"));
    }

    #[test]
    fn renders_references() {
        let units = director_and_movie();
        assert!(units[1].contains("record.director=::crud_derive::read_related::<DirectorTable>(row);"));
        assert!(units[1].contains("director:::core::option::Option::None"));
        assert!(units[0].contains("ifrelated.contains::<MovieTable>()"));
        assert!(units[0].contains(
            "record.movies=::core::option::Option::Some(::crud_derive::collect_related::<MovieTable>(rows));"
        ));
    }

    #[test]
    fn renders_repository_trait() {
        let units = director_and_movie();
        let movie = &units[1];
        assert!(movie.contains("pubtypeMovieRepo<'c>=::crud_derive::Repository<'c,MovieTable>;"));
        assert!(movie.contains("asyncfnfind_by_id(&mutself,id:i64)"));
        assert!(movie.contains("self.find_by_key(::crud_derive::EntityId::new(id)).await"));
        assert!(movie.contains("director:::core::option::Option<<DirectorTableas::crud_derive::Table>::Data>"));
        assert!(movie.contains("record.director_id=created.id;"));
        assert!(!units[0].contains("create_with_related"));
    }

    #[test]
    fn renders_composite_key() {
        let units: Vec<String> = render(vec![parse_quote! {
            #[entity]
            pub struct CategoryTranslations {
                #[id]
                pub category_id: i64,
                #[id]
                pub language_code: String,
                pub translation: String
            }
        }])
        .into_iter()
        .map(|tokens| squash(&tokens))
        .collect();
        let unit = &units[0];
        assert!(unit.contains("typeId=::crud_derive::CompositeId;"));
        assert!(unit.contains(
            "::crud_derive::CompositeId::new().with(&record.category_id).with(&record.language_code)"
        ));
        assert!(unit.contains(
            "primary_key:::core::option::Option::Some(&[\"category_id\",\"language_code\"])"
        ));
        assert!(unit.contains("asyncfnfind_by_id(&mutself,category_id:i64,language_code:String)"));
        assert!(unit.contains("typeData=CategoryTranslations;"));
    }

    #[test]
    fn custom_runtime_path() {
        let renderer = RustRenderer::new(parse_quote!(my_runtime));
        assert_eq!(
            renderer.runtime().to_token_stream().to_string(),
            "my_runtime"
        );
    }
}
