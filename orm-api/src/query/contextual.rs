//! Queries whose placeholders are filled from a runtime context

use crate::args::{Args, HasArgs};
use crate::error::QueryResult;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type ByName<C> = Arc<dyn Fn(&C) -> HashMap<String, Value> + Send + Sync>;
type ByOrderedList<C> = Arc<dyn Fn(&C) -> Vec<Value> + Send + Sync>;

enum Resolver<C> {
    ByName(ByName<C>),
    ByOrderedList(ByOrderedList<C>),
}

impl<C> Clone for Resolver<C> {
    fn clone(&self) -> Self {
        match self {
            Resolver::ByName(f) => Resolver::ByName(Arc::clone(f)),
            Resolver::ByOrderedList(f) => Resolver::ByOrderedList(Arc::clone(f)),
        }
    }
}

/// A query plus a function that maps a context `C` to the values of its
/// unresolved args. The same instance serves every element of a batch.
pub struct Contextual<Q, C> {
    query: Q,
    resolver: Resolver<C>,
}

impl<Q: HasArgs, C> Contextual<Q, C> {
    pub fn resolving_by_name<F>(query: Q, resolver: F) -> Self
    where
        F: Fn(&C) -> HashMap<String, Value> + Send + Sync + 'static,
    {
        Self {
            query,
            resolver: Resolver::ByName(Arc::new(resolver)),
        }
    }

    pub fn resolving_by_ordered_list<F>(query: Q, resolver: F) -> Self
    where
        F: Fn(&C) -> Vec<Value> + Send + Sync + 'static,
    {
        Self {
            query,
            resolver: Resolver::ByOrderedList(Arc::new(resolver)),
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// The query args with every placeholder resolved against `context`.
    pub fn resolve_query_args(&self, context: &C) -> QueryResult<Args> {
        let args = self.query.args();
        tracing::trace!(unresolved = args.unresolved_args().len(), "resolving contextual args");
        match &self.resolver {
            Resolver::ByName(f) => args.resolve_by_name(&f(context)),
            Resolver::ByOrderedList(f) => args.resolve_by_ordered_list(&f(context)),
        }
    }
}

impl<Q: Clone, C> Clone for Contextual<Q, C> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<Q: fmt::Debug, C> fmt::Debug for Contextual<Q, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.resolver {
            Resolver::ByName(_) => "by_name",
            Resolver::ByOrderedList(_) => "by_ordered_list",
        };
        f.debug_struct("Contextual")
            .field("query", &self.query)
            .field("resolver", &kind)
            .finish()
    }
}
