// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column-level configuration.
//!
//! # Supported Attributes
//!
//! | Attribute | Example | SQL |
//! |-----------|---------|-----|
//! | `name` | `#[column(name = "movie_title")]` | Custom column name |
//! | `default` | `#[column(default = false)]` | `DEFAULT FALSE` |
//! | `default` | `#[column(default = "CURRENT_TIMESTAMP")]` | `DEFAULT CURRENT_TIMESTAMP` |
//! | `default_text` | `#[column(default_text = "01-01-1970")]` | `DEFAULT '01-01-1970'` |
//! | `varchar` | `#[column(varchar = 255)]` | `VARCHAR(255)` |
//!
//! `default` takes a literal written as code and is meant for non-string
//! columns; a string literal there is inserted verbatim as SQL. String
//! columns take a quoted default through `default_text`.

use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, LitInt, LitStr, Meta, UnOp};

/// Default value expression of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// Literal code, inserted as-is.
    Code(String),

    /// Text, inserted as a quoted SQL string.
    Text(String)
}

impl DefaultValue {
    /// SQL spelling of the default.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Code(code) => code.clone(),
            Self::Text(text) => format!("'{}'", text.replace('\'', "''"))
        }
    }
}

/// Column-level configuration parsed from `#[column(...)]`.
#[derive(Debug, Clone, Default)]
pub struct ColumnConfig {
    /// Custom column name.
    pub name:    Option<String>,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// VARCHAR length.
    pub varchar: Option<usize>
}

fn literal_code(expr: &Expr) -> syn::Result<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit, ..
        }) => match lit {
            Lit::Str(s) => Ok(s.value()),
            Lit::Int(i) => Ok(i.base10_digits().to_string()),
            Lit::Float(f) => Ok(f.base10_digits().to_string()),
            Lit::Bool(b) => Ok(if b.value { "TRUE" } else { "FALSE" }.to_string()),
            other => Err(syn::Error::new_spanned(other, "unsupported default literal"))
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => literal_code(expr).map(|code| format!("-{code}")),
        other => Err(syn::Error::new_spanned(
            other,
            "default must be a literal; use a string literal for raw SQL"
        ))
    }
}

impl ColumnConfig {
    /// Parse `#[column(...)]`.
    ///
    /// # Errors
    ///
    /// Unknown keys and malformed values.
    pub fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        let mut config = Self::default();

        let Meta::List(list) = &attr.meta else {
            return Err(syn::Error::new_spanned(
                attr,
                "expected #[column(name = \"..\", default = .., default_text = \"..\", varchar = N)]"
            ));
        };

        list.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                config.name = Some(value.value());
            } else if meta.path.is_ident("default") {
                let value: Expr = meta.value()?.parse()?;
                config.default = Some(DefaultValue::Code(literal_code(&value)?));
            } else if meta.path.is_ident("default_text") {
                let value: LitStr = meta.value()?.parse()?;
                config.default = Some(DefaultValue::Text(value.value()));
            } else if meta.path.is_ident("varchar") {
                let value: LitInt = meta.value()?.parse()?;
                config.varchar = Some(value.base10_parse()?);
            } else {
                return Err(meta.error("unknown column option"));
            }
            Ok(())
        })?;

        Ok(config)
    }

    /// Column name, using the custom name if set.
    #[must_use]
    pub fn column_name<'a>(&'a self, field_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(field_name)
    }
}
