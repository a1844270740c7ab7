//! ORM API - Typed SQL Query Algebra
//!
//! Immutable building blocks for SQL statements. Every fragment carries its text,
//! the ordered list of arguments bound to its `?` placeholders, and (for terms) a
//! static [`TermType`] that is checked whenever fragments are composed.
//!
//! Architecture:
//! ```text
//! Value / Args (+ UnresolvedArg)
//!     ↓
//! Term / BoolTerm (type-checked composition)
//!     ↓
//! Clauses (WHERE, GROUP BY, HAVING, ORDER BY, LIMIT, OFFSET)
//!     ↓
//! Statements (SELECT / UNION / INSERT / UPDATE / DELETE / DDL)
//!     ↓
//! Contextual (deferred args resolved per runtime context)
//!     ↓
//! ParamSink (positional binding into a prepared statement)
//! ```

pub mod args;
pub mod engine;
pub mod error;
pub mod query;
pub mod value;

// Re-export key types for convenience
pub use args::{flatten_args_of, Arg, Args, ArgsType, HasArgs, ParamSink, UnresolvedArg};
pub use engine::Engine;
pub use error::{ExecutionError, QueryError, QueryResult};
pub use query::*;
pub use value::{NativeValue, Value};
