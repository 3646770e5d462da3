// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Predicate expressions.
//!
//! Built from typed column handles (`MovieTable::TITLE.eq("The Birds")`)
//! and combined with [`Expr::and`], [`Expr::or`], [`Expr::not`] or the
//! `&`, `|` and `!` operators. Rendering produces qualified column names
//! and positional `?` placeholders.

use std::{
    fmt::Write as _,
    ops::{BitAnd, BitOr, Not}
};

use crate::value::Value;

/// Qualified reference to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    /// Table name.
    pub table: &'static str,

    /// Column name.
    pub name: &'static str
}

impl ColumnRef {
    fn render(self, sql: &mut String) {
        let _ = write!(sql, "\"{}\".\"{}\"", self.table, self.name);
    }
}

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge
}

impl CompareOp {
    /// SQL spelling.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">="
        }
    }
}

/// A boolean SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `column <op> value`
    Compare {
        /// Left-hand column.
        column: ColumnRef,
        /// Operator.
        op:     CompareOp,
        /// Bound right-hand value.
        value:  Value
    },

    /// `column IS [NOT] NULL`
    IsNull {
        /// Tested column.
        column:  ColumnRef,
        /// `IS NOT NULL` when set.
        negated: bool
    },

    /// `column LIKE pattern`
    Like {
        /// Tested column.
        column:  ColumnRef,
        /// Pattern with `%` and `_` wildcards.
        pattern: String
    },

    /// `column IN (values)`
    In {
        /// Tested column.
        column: ColumnRef,
        /// Candidate values.
        values: Vec<Value>
    },

    /// Match one row of `table` by its SQLite rowid.
    RowId {
        /// Table name.
        table: &'static str,
        /// Row id.
        rowid: i64
    },

    /// Both sides hold.
    And(Box<Expr>, Box<Expr>),

    /// Either side holds.
    Or(Box<Expr>, Box<Expr>),

    /// Negation.
    Not(Box<Expr>)
}

impl Expr {
    /// Conjunction.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Disjunction.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Render into `sql`, pushing bound values onto `binds` in placeholder
    /// order.
    pub fn render(&self, sql: &mut String, binds: &mut Vec<Value>) {
        match self {
            Self::Compare {
                column,
                op,
                value
            } => {
                column.render(sql);
                match (op, value) {
                    (CompareOp::Eq, Value::Null) => sql.push_str(" IS NULL"),
                    (CompareOp::Ne, Value::Null) => sql.push_str(" IS NOT NULL"),
                    _ => {
                        let _ = write!(sql, " {} ?", op.as_sql());
                        binds.push(value.clone());
                    }
                }
            }
            Self::IsNull {
                column,
                negated
            } => {
                column.render(sql);
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::Like {
                column,
                pattern
            } => {
                column.render(sql);
                sql.push_str(" LIKE ?");
                binds.push(Value::Text(pattern.clone()));
            }
            Self::In {
                column,
                values
            } => {
                if values.is_empty() {
                    sql.push_str("1 = 0");
                    return;
                }
                column.render(sql);
                sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    sql.push('?');
                    binds.push(value.clone());
                }
                sql.push(')');
            }
            Self::RowId {
                table,
                rowid
            } => {
                let _ = write!(sql, "\"{table}\".rowid = ?");
                binds.push(Value::Integer(*rowid));
            }
            Self::And(lhs, rhs) => render_pair(sql, binds, lhs, "AND", rhs),
            Self::Or(lhs, rhs) => render_pair(sql, binds, lhs, "OR", rhs),
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, binds);
                sql.push(')');
            }
        }
    }

    /// Render to a standalone SQL fragment.
    #[must_use]
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = String::new();
        let mut binds = Vec::new();
        self.render(&mut sql, &mut binds);
        (sql, binds)
    }
}

fn render_pair(sql: &mut String, binds: &mut Vec<Value>, lhs: &Expr, op: &str, rhs: &Expr) {
    sql.push('(');
    lhs.render(sql, binds);
    let _ = write!(sql, ") {op} (");
    rhs.render(sql, binds);
    sql.push(')');
}

impl BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}
