// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Diagnostics.
//!
//! Every rule violation found while building or validating the entity graph
//! is a [`Diagnostic`]: an [`ErrorKind`] plus the [`DeclarationHandle`] of
//! the offending struct or field. The proc-macro front end turns them into
//! spanned `compile_error!`s; build scripts get them back inside
//! [`Error::Diagnostics`].
//!
//! # Taxonomy
//!
//! | Kind | Stage |
//! |------|-------|
//! | `NotADataRecord`, `MalformedAttribute` | extract |
//! | `MissingPrimaryKey`, `ReferenceMustBeNullable`, `UnsupportedColumnType`, `DefaultKindMismatch` | build |
//! | `AutoIncrementOnCompositeKey`, `UnknownForeignKeyTarget`, `UnknownReferenceTarget`, `UnknownForeignKeyColumn`, `ColumnTypeMismatch`, `CompositeForeignKeyNeedsColumn`, `FkColumnCountMismatch`, `FkColumnNotAnnotated`, `AutoDetectedFkMissing`, `UnmatchedBackReference` | validate |
//! | `UnresolvedColumnType` | resolve (internal) |

use std::{fmt, path::PathBuf};

use proc_macro2::Span;

/// Location of an entity or one of its fields.
#[derive(Debug, Clone)]
pub struct DeclarationHandle {
    /// Entity type name.
    pub entity: String,
    /// Field name, when the diagnostic concerns a field.
    pub field:  Option<String>,
    /// Span for compiler diagnostics.
    pub span:   Span,
    /// Declaration file, when known.
    pub origin: Option<PathBuf>
}

impl DeclarationHandle {
    /// Handle for the entity itself.
    #[must_use]
    pub fn entity(entity: impl Into<String>, span: Span, origin: Option<PathBuf>) -> Self {
        Self {
            entity: entity.into(),
            field: None,
            span,
            origin
        }
    }

    /// Handle for one of this entity's fields.
    #[must_use]
    pub fn field(&self, field: impl Into<String>, span: Span) -> Self {
        Self {
            entity: self.entity.clone(),
            field: Some(field.into()),
            span,
            origin: self.origin.clone()
        }
    }
}

impl fmt::Display for DeclarationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{}: ", origin.display())?;
        }
        match &self.field {
            Some(field) => write!(f, "{}.{}", self.entity, field),
            None => f.write_str(&self.entity)
        }
    }
}

/// Rule violated by a declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// No field carries `#[id]`.
    #[error("entity `{entity}` has no field marked with #[id]")]
    MissingPrimaryKey {
        /// Entity name.
        entity: String
    },

    /// `#[id(auto_increment)]` inside a composite key.
    #[error("auto-increment is not allowed on `{field}`, a member of a composite primary key")]
    AutoIncrementOnCompositeKey {
        /// Offending key member.
        field: String
    },

    /// `#[foreign_key(T)]` where `T` is not an entity.
    #[error("foreign key `{field}` targets `{target}`, which is not an entity")]
    UnknownForeignKeyTarget {
        /// Foreign key field.
        field:  String,
        /// Named target.
        target: String
    },

    /// `#[references(T)]` or `#[back_reference(T)]` where `T` is not an
    /// entity.
    #[error("reference `{field}` targets `{target}`, which is not an entity")]
    UnknownReferenceTarget {
        /// Reference field.
        field:  String,
        /// Named target.
        target: String
    },

    /// Explicit target column does not exist.
    #[error("foreign key `{field}` targets column `{column}`, which `{target}` does not have")]
    UnknownForeignKeyColumn {
        /// Foreign key field.
        field:  String,
        /// Target entity.
        target: String,
        /// Named column.
        column: String
    },

    /// Foreign key and target column types disagree.
    #[error(
        "foreign key `{field}` has type `{found}` but `{target}.{column}` has type `{expected}`"
    )]
    ColumnTypeMismatch {
        /// Foreign key field.
        field:    String,
        /// Foreign key field type.
        found:    String,
        /// Target entity.
        target:   String,
        /// Target column.
        column:   String,
        /// Target column type.
        expected: String
    },

    /// Foreign key into a composite key without naming the column.
    #[error(
        "foreign key `{field}` targets `{target}`, which has a composite primary key; name the \
         target column with #[foreign_key({target}, column = \"..\")]"
    )]
    CompositeForeignKeyNeedsColumn {
        /// Foreign key field.
        field:  String,
        /// Target entity.
        target: String
    },

    /// `columns(..)` length differs from the target key arity.
    #[error(
        "reference `{field}` lists {found} foreign key column(s) but `{target}` has a primary key \
         of {expected} column(s)"
    )]
    FkColumnCountMismatch {
        /// Reference field.
        field:    String,
        /// Target entity.
        target:   String,
        /// Target key arity.
        expected: usize,
        /// Listed columns.
        found:    usize
    },

    /// A listed local column is missing or not a foreign key to the target.
    #[error("column `{column}` named by reference `{field}` is not a foreign key to `{target}`")]
    FkColumnNotAnnotated {
        /// Reference field.
        field:  String,
        /// Listed column.
        column: String,
        /// Reference target.
        target: String
    },

    /// The derived local column is missing or not a foreign key to the
    /// target.
    #[error(
        "reference `{field}` needs a field `{expected}` marked #[foreign_key({target})], or list \
         the columns with #[references({target}, columns(..))]"
    )]
    AutoDetectedFkMissing {
        /// Reference field.
        field:    String,
        /// Derived column name.
        expected: String,
        /// Reference target.
        target:   String
    },

    /// Back-reference target holds no foreign key to this entity.
    #[error("back reference `{field}` expects `{target}` to have a foreign key to `{entity}`")]
    UnmatchedBackReference {
        /// Back-reference field.
        field:  String,
        /// Target entity.
        target: String,
        /// This entity.
        entity: String
    },

    /// A reference joins two entities linked by more than one foreign key to
    /// the same target column.
    #[error(
        "reference `{field}` cannot join `{from}` and `{to}`: foreign keys `{first}` and \
         `{second}` both point at `{to}.{column}`"
    )]
    AmbiguousJoin {
        /// Reference or back-reference field.
        field:  String,
        /// Entity holding the foreign keys.
        from:   String,
        /// Referenced entity.
        to:     String,
        /// Shared target column.
        column: String,
        /// First foreign key field.
        first:  String,
        /// Second foreign key field.
        second: String
    },

    /// Reference or back-reference field is not `Option<_>`.
    #[error("reference field `{field}` must be declared as Option<_>")]
    ReferenceMustBeNullable {
        /// Reference field.
        field: String
    },

    /// Column type has no SQL mapping, or the mapping is not allowed here.
    #[error("column `{field}` has unsupported type `{ty}`: {reason}")]
    UnsupportedColumnType {
        /// Column field.
        field:  String,
        /// Declared type.
        ty:     String,
        /// What is wrong.
        reason: String
    },

    /// `default_text` on a non-string field, or `default` on a string field.
    #[error("`{attribute}` cannot be used on `{field}` of type `{ty}`; {hint}")]
    DefaultKindMismatch {
        /// Column field.
        field:     String,
        /// Attribute used.
        attribute: String,
        /// Declared type.
        ty:        String,
        /// Attribute to use instead.
        hint:      String
    },

    /// `#[entity]` on something other than a plain named-field struct.
    #[error("#[entity] requires a struct with named fields and no generic parameters; `{entity}` is {shape}")]
    NotADataRecord {
        /// Type name.
        entity: String,
        /// What was found.
        shape:  String
    },

    /// Attribute arguments could not be parsed.
    #[error("{message}")]
    MalformedAttribute {
        /// Parser message.
        message: String
    },

    /// A column type could not be resolved after validation passed.
    #[error("internal error: column `{column}` of `{entity}` has no resolved type")]
    UnresolvedColumnType {
        /// Entity name.
        entity: String,
        /// Column field.
        column: String
    }
}

/// A rule violation tied to the declaration that caused it.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Violated rule.
    pub kind:   ErrorKind,
    /// Offending declaration.
    pub handle: DeclarationHandle
}

impl Diagnostic {
    /// Pair a rule with its declaration.
    #[must_use]
    pub const fn new(kind: ErrorKind, handle: DeclarationHandle) -> Self {
        Self {
            kind,
            handle
        }
    }

    /// Spanned compiler error.
    #[must_use]
    pub fn to_syn_error(&self) -> syn::Error {
        syn::Error::new(self.handle.span, &self.kind)
    }

    /// Wrap a `syn` parse error raised on an attribute of `handle`.
    #[must_use]
    pub fn malformed(err: &syn::Error, handle: DeclarationHandle) -> Self {
        let handle = DeclarationHandle {
            span: err.span(),
            ..handle
        };
        Self::new(
            ErrorKind::MalformedAttribute {
                message: err.to_string()
            },
            handle
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.handle, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// Combine diagnostics into one `syn::Error` carrying every span.
#[must_use]
pub fn combine(diagnostics: &[Diagnostic]) -> Option<syn::Error> {
    diagnostics
        .iter()
        .map(Diagnostic::to_syn_error)
        .reduce(|mut all, next| {
            all.combine(next);
            all
        })
}

/// Failure of a build-script generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Declarations violate the entity rules; nothing was written.
    #[error("{} entity declaration error(s):\n{}", .0.len(), render_list(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// A declaration file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Declaration file.
        path:   PathBuf,
        /// Parser error.
        source: syn::Error
    },

    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path:   PathBuf,
        /// Underlying error.
        source: std::io::Error
    },

    /// No output directory was configured and `OUT_DIR` is unset.
    #[error("no output directory: call Builder::out_dir or run from a build script")]
    MissingOutDir
}

fn render_list(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {d}"))
        .collect::<Vec<_>>()
        .join("\n")
}
