//! Terms: typed SQL sub-expressions
//!
//! A [`Term`] is the triple `(repr, args, type)`. Columns and aliases additionally
//! remember their name so they can be referenced from `GROUP BY`.

use super::unit::{Representable, Unit};
use crate::args::{Args, HasArgs, UnresolvedArg};
use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of a term, used to reject incompatible compositions early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermType {
    Number,
    String,
    Bool,
    Time,
    Wildcard,
}

impl TermType {
    /// `Wildcard` matches anything, otherwise the types must be equal.
    pub fn matches(self, other: TermType) -> bool {
        self == TermType::Wildcard || other == TermType::Wildcard || self == other
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TermType::Number => "NUMBER",
            TermType::String => "STRING",
            TermType::Bool => "BOOL",
            TermType::Time => "TIME",
            TermType::Wildcard => "WILDCARD",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Expr,
    Column { name: String },
    Alias { name: String, inner: Box<Term> },
}

/// An immutable typed SQL sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    unit: Unit,
    term_type: TermType,
    shape: Shape,
}

impl Term {
    fn expr(unit: Unit, term_type: TermType) -> Self {
        Self {
            unit,
            term_type,
            shape: Shape::Expr,
        }
    }

    /// A plain column reference.
    pub fn column(name: impl Into<String>, term_type: TermType) -> Self {
        let name = name.into();
        Self {
            unit: Unit::of(name.clone()),
            term_type,
            shape: Shape::Column { name },
        }
    }

    /// A column qualified with its table: `table.name`.
    pub fn full_column(table: &str, name: impl Into<String>, term_type: TermType) -> Self {
        let name = name.into();
        Self {
            unit: Unit::of(format!("{}.{}", table, name)),
            term_type,
            shape: Shape::Column { name },
        }
    }

    /// `DISTINCT term`.
    pub fn distinct(term: &Term) -> Self {
        Self::expr(
            Unit::new(format!("DISTINCT {}", term.repr()), term.args().clone()),
            term.term_type,
        )
    }

    /// A `?` placeholder bound to `value`.
    pub fn variable(value: impl Into<Value>, term_type: TermType) -> Self {
        Self::expr(Unit::new("?", Args::single(value.into())), term_type)
    }

    pub fn int_var(value: i32) -> Self {
        Self::expr(Unit::new("?", Args::of_ints([value])), TermType::Number)
    }

    pub fn long_var(value: i64) -> Self {
        Self::expr(Unit::new("?", Args::of_longs([value])), TermType::Number)
    }

    /// A `?` placeholder whose value is resolved later by `name`.
    pub fn unresolved(name: impl Into<String>, term_type: TermType) -> Self {
        let arg = UnresolvedArg::of_type(name, term_type);
        Self::expr(Unit::new("?", Args::single(arg)), term_type)
    }

    pub fn number<N: fmt::Display>(num: N) -> Self {
        Self::expr(Unit::of(num.to_string()), TermType::Number)
    }

    /// A quoted string literal; embedded quotes are doubled.
    pub fn string_literal(literal: &str) -> Self {
        Self::expr(
            Unit::of(format!("'{}'", literal.replace('\'', "''"))),
            TermType::String,
        )
    }

    pub fn hardcoded(repr: impl Into<String>, args: Args, term_type: TermType) -> Self {
        Self::expr(Unit::new(repr, args), term_type)
    }

    pub fn hardcoded_number(repr: impl Into<String>) -> Self {
        Self::hardcoded(repr, Args::empty(), TermType::Number)
    }

    pub fn hardcoded_string(repr: impl Into<String>) -> Self {
        Self::hardcoded(repr, Args::empty(), TermType::String)
    }

    /// `term AS name`. Aliasing an alias replaces the previous name.
    pub fn named_as(&self, name: impl Into<String>) -> Term {
        let name = name.into();
        let inner = match &self.shape {
            Shape::Alias { inner, .. } => inner.as_ref().clone(),
            _ => self.clone(),
        };
        Self {
            unit: Unit::new(
                format!("{} AS {}", inner.repr(), name),
                inner.args().clone(),
            ),
            term_type: inner.term_type,
            shape: Shape::Alias {
                name,
                inner: Box::new(inner),
            },
        }
    }

    pub fn term_type(&self) -> TermType {
        self.term_type
    }

    /// Column or alias name, if this term has one.
    pub fn name(&self) -> Option<&str> {
        match &self.shape {
            Shape::Column { name } | Shape::Alias { name, .. } => Some(name),
            Shape::Expr => None,
        }
    }

    /// The aliased term, for `x AS y` terms.
    pub fn alias_target(&self) -> Option<&Term> {
        match &self.shape {
            Shape::Alias { inner, .. } => Some(inner),
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> String {
        format!("`{}` ({})", self.repr(), self.term_type)
    }
}

impl Representable for Term {
    fn repr(&self) -> &str {
        self.unit.repr()
    }
}

impl HasArgs for Term {
    fn args(&self) -> &Args {
        self.unit.args()
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.repr())
    }
}

// ============================================================================
// FUNCTIONS
// ============================================================================

/// A function call term, e.g. `COUNT(*)` or `LOWER(name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncExpr {
    term: Term,
    aggregate: bool,
}

impl FuncExpr {
    fn call(name: &str, arg: &Term, term_type: TermType, aggregate: bool) -> Self {
        Self {
            term: Term::hardcoded(
                format!("{}({})", name, arg.repr()),
                arg.args().clone(),
                term_type,
            ),
            aggregate,
        }
    }

    pub fn count_all() -> Self {
        Self {
            term: Term::hardcoded_number("count(*)"),
            aggregate: true,
        }
    }

    pub fn count(arg: &Term) -> Self {
        Self::call("count", arg, TermType::Number, true)
    }

    pub fn sum(arg: &Term) -> Self {
        Self::call("sum", arg, TermType::Number, true)
    }

    pub fn avg(arg: &Term) -> Self {
        Self::call("avg", arg, TermType::Number, true)
    }

    pub fn min(arg: &Term) -> Self {
        Self::call("min", arg, arg.term_type(), true)
    }

    pub fn max(arg: &Term) -> Self {
        Self::call("max", arg, arg.term_type(), true)
    }

    pub fn lower(arg: &Term) -> Self {
        Self::call("lower", arg, TermType::String, false)
    }

    pub fn upper(arg: &Term) -> Self {
        Self::call("upper", arg, TermType::String, false)
    }

    pub fn length(arg: &Term) -> Self {
        Self::call("length", arg, TermType::Number, false)
    }

    pub fn is_aggregate(&self) -> bool {
        self.aggregate
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn named_as(&self, name: impl Into<String>) -> Term {
        self.term.named_as(name)
    }
}

impl From<FuncExpr> for Term {
    fn from(func: FuncExpr) -> Self {
        func.term
    }
}

impl Representable for FuncExpr {
    fn repr(&self) -> &str {
        self.term.repr()
    }
}

impl HasArgs for FuncExpr {
    fn args(&self) -> &Args {
        self.term.args()
    }
}

/// Check that two operands may be composed with `op`.
pub(crate) fn ensure_compatible(lhs: &Term, rhs: &Term, op: &str) -> QueryResult<()> {
    if lhs.term_type().matches(rhs.term_type()) {
        Ok(())
    } else {
        Err(QueryError::IncompatibleTypes {
            lhs: lhs.describe(),
            rhs: rhs.describe(),
            op: op.to_string(),
        })
    }
}
