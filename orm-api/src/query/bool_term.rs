//! Boolean terms: comparisons, null checks, negation and AND/OR composition

use super::term::{ensure_compatible, Term, TermType};
use super::unit::{join_with_commas, Representable, Unit};
use crate::args::{flatten_args_of, Args, HasArgs};
use crate::error::{QueryError, QueryResult};
use std::fmt;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareType {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl CompareType {
    pub fn repr(self) -> &'static str {
        match self {
            CompareType::Eq => "=",
            CompareType::Ne => "<>",
            CompareType::Lt => "<",
            CompareType::Le => "<=",
            CompareType::Gt => ">",
            CompareType::Ge => ">=",
            CompareType::Like => "LIKE",
        }
    }
}

/// Boolean composition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOpType {
    And,
    Or,
}

impl BoolOpType {
    pub fn joiner(self) -> &'static str {
        match self {
            BoolOpType::And => " AND ",
            BoolOpType::Or => " OR ",
        }
    }
}

impl fmt::Display for BoolOpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOpType::And => f.write_str("AND"),
            BoolOpType::Or => f.write_str("OR"),
        }
    }
}

/// A term of type `Bool`. Remembers whether it is an AND/OR composite.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolTerm {
    unit: Unit,
    composite: Option<BoolOpType>,
}

impl BoolTerm {
    fn simple(repr: String, args: Args) -> Self {
        Self {
            unit: Unit::new(repr, args),
            composite: None,
        }
    }

    /// `lhs op rhs`, failing when the operand types are incompatible.
    pub fn compare(lhs: &Term, op: CompareType, rhs: &Term) -> QueryResult<Self> {
        ensure_compatible(lhs, rhs, op.repr())?;
        Ok(Self::simple(
            format!("{} {} {}", lhs.repr(), op.repr(), rhs.repr()),
            flatten_args_of([Some(lhs), Some(rhs)]),
        ))
    }

    pub fn eq(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Eq, rhs)
    }

    pub fn ne(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Ne, rhs)
    }

    pub fn lt(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Lt, rhs)
    }

    pub fn le(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Le, rhs)
    }

    pub fn gt(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Gt, rhs)
    }

    pub fn ge(lhs: &Term, rhs: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Ge, rhs)
    }

    pub fn like(lhs: &Term, pattern: &Term) -> QueryResult<Self> {
        Self::compare(lhs, CompareType::Like, pattern)
    }

    /// `term BETWEEN low AND high`.
    pub fn between(term: &Term, low: &Term, high: &Term) -> QueryResult<Self> {
        ensure_compatible(term, low, "BETWEEN")?;
        ensure_compatible(term, high, "BETWEEN")?;
        Ok(Self::simple(
            format!("{} BETWEEN {} AND {}", term.repr(), low.repr(), high.repr()),
            flatten_args_of([Some(term), Some(low), Some(high)]),
        ))
    }

    /// `term IN (a, b, ...)`.
    pub fn is_in(term: &Term, items: &[Term]) -> QueryResult<Self> {
        if items.is_empty() {
            return Err(QueryError::EmptyInList {
                term: term.repr().to_string(),
            });
        }
        for item in items {
            ensure_compatible(term, item, "IN")?;
        }
        let args = flatten_args_of(std::iter::once(Some(term)).chain(items.iter().map(Some)));
        Ok(Self::simple(
            format!("{} IN ({})", term.repr(), join_with_commas(items)),
            args,
        ))
    }

    pub fn is_null(term: &Term) -> Self {
        Self::simple(format!("{} IS NULL", term.repr()), term.args().clone())
    }

    pub fn is_not_null(term: &Term) -> Self {
        Self::simple(format!("{} IS NOT NULL", term.repr()), term.args().clone())
    }

    /// `NOT term`, parenthesized when the operand is an AND/OR composite.
    pub fn not(term: &BoolTerm) -> Self {
        let repr = if term.is_composite() {
            format!("NOT ({})", term.repr())
        } else {
            format!("NOT {}", term.repr())
        };
        Self::simple(repr, term.args().clone())
    }

    /// Joins the terms with `op`. Composite operands are parenthesized.
    pub fn bool_op(op: BoolOpType, terms: &[BoolTerm]) -> QueryResult<Self> {
        match terms {
            [] => Err(QueryError::EmptyBoolOp { op: op.to_string() }),
            [single] => Ok(single.clone()),
            _ => {
                let parts: Vec<String> = terms
                    .iter()
                    .map(|term| match term.composite {
                        Some(inner) if inner != op => format!("({})", term.repr()),
                        _ => term.repr().to_string(),
                    })
                    .collect();
                Ok(Self {
                    unit: Unit::new(parts.join(op.joiner()), flatten_args_of(terms.iter().map(Some))),
                    composite: Some(op),
                })
            }
        }
    }

    pub fn and(terms: &[BoolTerm]) -> QueryResult<Self> {
        Self::bool_op(BoolOpType::And, terms)
    }

    pub fn or(terms: &[BoolTerm]) -> QueryResult<Self> {
        Self::bool_op(BoolOpType::Or, terms)
    }

    /// Wraps a term used as a boolean; only `Bool` and `Wildcard` terms qualify.
    pub fn wrap(term: &Term) -> QueryResult<Self> {
        match term.term_type() {
            TermType::Bool | TermType::Wildcard => {
                Ok(Self::simple(term.repr().to_string(), term.args().clone()))
            }
            _ => Err(QueryError::NotBoolean {
                term: term.repr().to_string(),
            }),
        }
    }

    pub fn hardcoded(repr: impl Into<String>, args: Args) -> Self {
        Self::simple(repr.into(), args)
    }

    pub fn is_composite(&self) -> bool {
        self.composite.is_some()
    }

    pub fn composite_op(&self) -> Option<BoolOpType> {
        self.composite
    }

    pub fn term_type(&self) -> TermType {
        TermType::Bool
    }
}

impl Representable for BoolTerm {
    fn repr(&self) -> &str {
        self.unit.repr()
    }
}

impl HasArgs for BoolTerm {
    fn args(&self) -> &Args {
        self.unit.args()
    }
}

impl From<BoolTerm> for Term {
    fn from(term: BoolTerm) -> Self {
        Term::hardcoded(term.repr().to_string(), term.args().clone(), TermType::Bool)
    }
}

impl fmt::Display for BoolTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.repr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn id() -> Term {
        Term::column("id", TermType::Number)
    }

    fn name() -> Term {
        Term::column("name", TermType::String)
    }

    #[test]
    fn test_compare_repr_and_args() {
        let term = BoolTerm::eq(&id(), &Term::int_var(1)).unwrap();
        assert_eq!(term.repr(), "id = ?");
        assert_eq!(term.args().as_list(), vec![Value::Int(1)]);

        let term = BoolTerm::like(&name(), &Term::variable("A%", TermType::String)).unwrap();
        assert_eq!(term.repr(), "name LIKE ?");
    }

    #[test]
    fn test_compare_incompatible_types() {
        let err = BoolTerm::lt(&id(), &name()).unwrap_err();
        assert!(matches!(err, QueryError::IncompatibleTypes { ref op, .. } if op == "<"));
    }

    #[test]
    fn test_compare_wildcard_matches() {
        let any = Term::hardcoded("?", Args::of([Value::Null]), TermType::Wildcard);
        assert!(BoolTerm::ne(&name(), &any).is_ok());
    }

    #[test]
    fn test_between() {
        let term = BoolTerm::between(&id(), &Term::int_var(1), &Term::int_var(5)).unwrap();
        assert_eq!(term.repr(), "id BETWEEN ? AND ?");
        assert_eq!(term.args().as_list(), vec![Value::Int(1), Value::Int(5)]);
        assert!(BoolTerm::between(&id(), &Term::int_var(1), &Term::string_literal("z")).is_err());
    }

    #[test]
    fn test_is_in() {
        let term = BoolTerm::is_in(&id(), &[Term::int_var(1), Term::int_var(2)]).unwrap();
        assert_eq!(term.repr(), "id IN (?, ?)");
        assert_eq!(term.args().len(), 2);
        assert!(BoolTerm::is_in(&id(), &[]).is_err());
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(BoolTerm::is_null(&name()).repr(), "name IS NULL");
        assert_eq!(BoolTerm::is_not_null(&name()).repr(), "name IS NOT NULL");
    }

    #[test]
    fn test_not_parenthesizes_composites() {
        let a = BoolTerm::is_null(&name());
        let b = BoolTerm::eq(&id(), &Term::number(1)).unwrap();
        assert_eq!(BoolTerm::not(&a).repr(), "NOT name IS NULL");

        let both = BoolTerm::and(&[a, b]).unwrap();
        assert_eq!(both.repr(), "name IS NULL AND id = 1");
        assert_eq!(BoolTerm::not(&both).repr(), "NOT (name IS NULL AND id = 1)");
    }

    #[test]
    fn test_bool_op_nesting() {
        let a = BoolTerm::hardcoded("a", Args::empty());
        let b = BoolTerm::hardcoded("b", Args::empty());
        let c = BoolTerm::hardcoded("c", Args::empty());
        let or = BoolTerm::or(&[a.clone(), b]).unwrap();
        let and = BoolTerm::and(&[or, c]).unwrap();
        assert_eq!(and.repr(), "(a OR b) AND c");
        assert_eq!(and.composite_op(), Some(BoolOpType::And));

        assert_eq!(BoolTerm::and(&[a.clone()]).unwrap(), a);
        assert!(BoolTerm::or(&[]).is_err());
    }

    #[test]
    fn test_wrap_requires_bool() {
        let flag = Term::column("active", TermType::Bool);
        assert_eq!(BoolTerm::wrap(&flag).unwrap().repr(), "active");
        assert!(matches!(
            BoolTerm::wrap(&name()),
            Err(QueryError::NotBoolean { .. })
        ));
    }
}
