//! Error types for query construction and execution

use crate::value::Value;
use thiserror::Error;

/// Query construction errors.
///
/// These signal a malformed call sequence at the query call site, e.g. comparing a
/// number with a string or resolving deferred args with the wrong number of values.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryError {
    #[error("Incompatible types to compare: lhs={lhs} rhs={rhs} compare={op}")]
    IncompatibleTypes { lhs: String, rhs: String, op: String },

    #[error("Term can't be used for boolean: {term}")]
    NotBoolean { term: String },

    #[error("Term is not named: {term}")]
    NotNamed { term: String },

    #[error("No terms provided for {op}")]
    EmptyBoolOp { op: String },

    #[error("No values provided for IN: {term}")]
    EmptyInList { term: String },

    #[error("No terms provided for select query: table={table}")]
    EmptySelect { table: String },

    #[error("No select queries provided")]
    EmptyUnion,

    #[error("A single select query provided for a union: {query}")]
    SingleUnion { query: String },

    #[error("Provided select queries are all non-typed: {count} queries")]
    UntypedUnion { count: usize },

    #[error("Provided select queries have different number of columns: {counts:?}")]
    UnionColumnsMismatch { counts: Vec<usize> },

    #[error("Aggregate function already set: {existing}")]
    AggregateAlreadySet { existing: String },

    #[error("Non-aggregate function supplied: {func}")]
    NotAggregate { func: String },

    #[error("Aggregate function not provided for SelectGroupBy: table={table}")]
    MissingAggregate { table: String },

    #[error("Invalid limit value: {value}")]
    InvalidLimit { value: i64 },

    #[error("Invalid offset value: {value}")]
    InvalidOffset { value: i64 },

    #[error("Invalid page: number={number} size={size}")]
    InvalidPage { number: i64, size: i64 },

    #[error("No columns provided for {statement}: table={table}")]
    EmptyColumns { statement: String, table: String },

    #[error("{feature} is not supported by {engine}")]
    UnsupportedByEngine { feature: String, engine: String },

    #[error("Values number does not match the columns number: columns={columns}, values={values}")]
    ValuesMismatch { columns: usize, values: usize },

    #[error("Provided resolved args size doesn't match unresolved placeholders: internal={internal}, provided={provided}")]
    ResolutionSizeMismatch { internal: usize, provided: usize },

    #[error("Provided resolved args keys don't match unresolved placeholders: expected={expected:?}, provided={provided:?}")]
    ResolutionKeysMismatch {
        expected: Vec<String>,
        provided: Vec<String>,
    },
}

pub type QueryResult<T> = Result<T, QueryError>;

/// A backend failure wrapped with the statement that caused it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}. Query:\n```\n{query}\n```\nArgs: `{rendered}`", rendered = render_values(.args))]
pub struct ExecutionError {
    pub message: String,
    pub query: String,
    pub args: Vec<Value>,
    pub cause: Option<String>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>, query: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            message: message.into(),
            query: query.into(),
            args,
            cause: None,
        }
    }

    /// Wrap a backend error, keeping its text as the cause.
    pub fn caused_by(
        message: impl Into<String>,
        query: impl Into<String>,
        args: Vec<Value>,
        cause: &dyn std::error::Error,
    ) -> Self {
        Self {
            cause: Some(cause.to_string()),
            ..Self::new(message, query, args)
        }
    }

    /// Wrap a failed statement: any value exposing its text and args.
    pub fn for_statement<S>(message: impl Into<String>, statement: &S) -> Self
    where
        S: crate::query::Representable + crate::args::HasArgs + ?Sized,
    {
        Self::new(message, statement.repr(), statement.args().as_list())
    }
}

fn render_values(values: &[Value]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}
