//! SELECT statements and their builders

use super::clause::{
    impl_fragment, CompositeFilter, CompositeFilterBuilder, GroupBy, Having, Limit, Offset,
    Order, OrderBy, Pagination, Where,
};
use super::term::{FuncExpr, Term, TermType};
use super::unit::{join_with_commas, Fragment, Representable, Unit};
use crate::args::{flatten_args_of, Args, HasArgs};
use crate::engine::Engine;
use crate::error::{QueryError, QueryResult};
use std::fmt;
use std::sync::Arc;

/// Any select statement, typed or not.
pub trait SelectQuery: Representable + HasArgs + fmt::Debug + Send + Sync {
    /// The typed view, when the result columns are known.
    fn as_typed(&self) -> Option<&dyn TypedSelectQuery> {
        None
    }
}

/// A select statement with a known result shape.
pub trait TypedSelectQuery {
    fn columns_number(&self) -> usize;

    fn column_types(&self) -> Vec<TermType>;
}

// ============================================================================
// SELECT ... FROM
// ============================================================================

/// `SELECT a, b\nFROM table`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectFrom {
    unit: Unit,
    table: String,
    terms: Vec<Term>,
}

impl SelectFrom {
    pub fn new(table: impl Into<String>, terms: Vec<Term>) -> QueryResult<Self> {
        let table = table.into();
        if terms.is_empty() {
            return Err(QueryError::EmptySelect { table });
        }
        Ok(Self {
            unit: Unit::new(
                format!("SELECT {}\nFROM {}", join_with_commas(&terms), table),
                flatten_args_of(terms.iter().map(Some)),
            ),
            table,
            terms,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn terms_types(&self) -> Vec<TermType> {
        self.terms.iter().map(Term::term_type).collect()
    }
}

impl_fragment!(SelectFrom);

// ============================================================================
// SELECT ... WHERE
// ============================================================================

/// A standard `SELECT ... FROM ... WHERE ...` query with optional trailing clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectWhere {
    unit: Unit,
    select_from: SelectFrom,
    clause: CompositeFilter,
}

impl SelectWhere {
    pub fn new(select_from: SelectFrom, clause: CompositeFilter) -> Self {
        let parts: [Option<&dyn Fragment>; 2] = [Some(&select_from), Some(&clause)];
        Self {
            unit: Unit::joined_lines(&parts),
            select_from,
            clause,
        }
    }

    pub fn builder(table: impl Into<String>) -> SelectWhereBuilder {
        SelectWhereBuilder::new(table)
    }

    pub fn select_from(&self) -> &SelectFrom {
        &self.select_from
    }

    pub fn clause(&self) -> &CompositeFilter {
        &self.clause
    }

    pub fn union(self, query: impl SelectQuery + 'static) -> QueryResult<SelectUnion> {
        SelectUnion::builder().with(self).with(query).build()
    }

    pub fn to_builder(&self) -> SelectWhereBuilder {
        SelectWhereBuilder {
            table: self.select_from.table.clone(),
            terms: self.select_from.terms.clone(),
            filter: self.clause.to_builder(),
        }
    }
}

impl_fragment!(SelectWhere);

impl SelectQuery for SelectWhere {
    fn as_typed(&self) -> Option<&dyn TypedSelectQuery> {
        Some(self)
    }
}

impl TypedSelectQuery for SelectWhere {
    fn columns_number(&self) -> usize {
        self.select_from.terms.len()
    }

    fn column_types(&self) -> Vec<TermType> {
        self.select_from.terms_types()
    }
}

#[derive(Debug, Clone)]
pub struct SelectWhereBuilder {
    table: String,
    terms: Vec<Term>,
    filter: CompositeFilterBuilder,
}

impl SelectWhereBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            terms: Vec::new(),
            filter: CompositeFilterBuilder::default(),
        }
    }

    pub fn select(mut self, term: impl Into<Term>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn select_all(mut self, terms: impl IntoIterator<Item = Term>) -> Self {
        self.terms.extend(terms);
        self
    }

    pub fn where_(mut self, where_: Where) -> Self {
        self.filter.with_where(where_);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.filter.with_order_by(order_by);
        self
    }

    /// Ascending order by a single term.
    pub fn order_by_term(self, term: Term) -> Self {
        self.order_by(OrderBy::of(term, Order::Asc))
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.filter.with_limit(limit);
        self
    }

    pub fn offset(mut self, offset: Offset) -> Self {
        self.filter.with_offset(offset);
        self
    }

    pub fn paginate(mut self, pagination: Pagination, engine: Engine) -> QueryResult<Self> {
        self.filter.with_pagination(pagination, engine)?;
        Ok(self)
    }

    pub fn applying(self, consumer: impl FnOnce(Self) -> Self) -> Self {
        consumer(self)
    }

    pub fn union(self, query: impl SelectQuery + 'static) -> QueryResult<SelectUnionBuilder> {
        Ok(self.build()?.union(query)?.to_builder())
    }

    pub fn build(self) -> QueryResult<SelectWhere> {
        let select_from = SelectFrom::new(self.table, self.terms)?;
        Ok(SelectWhere::new(select_from, self.filter.build()))
    }
}

// ============================================================================
// SELECT ... GROUP BY
// ============================================================================

/// `SELECT ... GROUP BY ...` with an aggregate, optional `WHERE`, `HAVING` and
/// `ORDER BY`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectGroupBy {
    unit: Unit,
    select_from: SelectFrom,
    aggregate: FuncExpr,
    where_: Option<Where>,
    group_by: GroupBy,
    having: Option<Having>,
    order_by: Option<OrderBy>,
}

impl SelectGroupBy {
    pub fn new(
        select_from: SelectFrom,
        aggregate: FuncExpr,
        where_: Option<Where>,
        group_by: GroupBy,
        having: Option<Having>,
        order_by: Option<OrderBy>,
    ) -> Self {
        let parts: [Option<&dyn Fragment>; 5] = [
            Some(&select_from),
            where_.as_ref().map(|w| w as &dyn Fragment),
            Some(&group_by),
            having.as_ref().map(|h| h as &dyn Fragment),
            order_by.as_ref().map(|o| o as &dyn Fragment),
        ];
        let unit = Unit::joined_lines(&parts);
        Self {
            unit,
            select_from,
            aggregate,
            where_,
            group_by,
            having,
            order_by,
        }
    }

    pub fn builder(table: impl Into<String>) -> SelectGroupByBuilder {
        SelectGroupByBuilder::new(table)
    }

    pub fn aggregate(&self) -> &FuncExpr {
        &self.aggregate
    }

    pub fn group_by(&self) -> &GroupBy {
        &self.group_by
    }

    pub fn union(self, query: impl SelectQuery + 'static) -> QueryResult<SelectUnion> {
        SelectUnion::builder().with(self).with(query).build()
    }

    pub fn to_builder(&self) -> SelectGroupByBuilder {
        let mut filter = CompositeFilterBuilder::default();
        if let Some(where_) = &self.where_ {
            filter.with_where(where_.clone());
        }
        if let Some(order_by) = &self.order_by {
            filter.with_order_by(order_by.clone());
        }
        SelectGroupByBuilder {
            table: self.select_from.table.clone(),
            aggregate: Some(self.aggregate.clone()),
            terms: self.group_by.terms().to_vec(),
            having: self.having.clone(),
            filter,
        }
    }
}

impl_fragment!(SelectGroupBy);

impl SelectQuery for SelectGroupBy {
    fn as_typed(&self) -> Option<&dyn TypedSelectQuery> {
        Some(self)
    }
}

impl TypedSelectQuery for SelectGroupBy {
    fn columns_number(&self) -> usize {
        self.select_from.terms.len()
    }

    fn column_types(&self) -> Vec<TermType> {
        self.select_from.terms_types()
    }
}

#[derive(Debug, Clone)]
pub struct SelectGroupByBuilder {
    table: String,
    aggregate: Option<FuncExpr>,
    terms: Vec<Term>,
    having: Option<Having>,
    filter: CompositeFilterBuilder,
}

impl SelectGroupByBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            aggregate: None,
            terms: Vec::new(),
            having: None,
            filter: CompositeFilterBuilder::default(),
        }
    }

    pub fn select(self, terms: impl IntoIterator<Item = Term>, aggregate: FuncExpr) -> QueryResult<Self> {
        self.group_by_all(terms).aggregate(aggregate)
    }

    pub fn aggregate(mut self, aggregate: FuncExpr) -> QueryResult<Self> {
        if let Some(existing) = &self.aggregate {
            return Err(QueryError::AggregateAlreadySet {
                existing: existing.repr().to_string(),
            });
        }
        if !aggregate.is_aggregate() {
            return Err(QueryError::NotAggregate {
                func: aggregate.repr().to_string(),
            });
        }
        self.aggregate = Some(aggregate);
        Ok(self)
    }

    pub fn group_by(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    pub fn group_by_all(mut self, terms: impl IntoIterator<Item = Term>) -> Self {
        self.terms.extend(terms);
        self
    }

    pub fn having(mut self, having: Having) -> Self {
        self.having = Some(having);
        self
    }

    pub fn where_(mut self, where_: Where) -> Self {
        self.filter.with_where(where_);
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.filter.with_order_by(order_by);
        self
    }

    pub fn union(self, query: impl SelectQuery + 'static) -> QueryResult<SelectUnionBuilder> {
        Ok(self.build()?.union(query)?.to_builder())
    }

    pub fn build(self) -> QueryResult<SelectGroupBy> {
        let aggregate = self.aggregate.ok_or_else(|| QueryError::MissingAggregate {
            table: self.table.clone(),
        })?;
        let mut all_terms = self.terms.clone();
        all_terms.push(aggregate.term().clone());
        let select_from = SelectFrom::new(self.table, all_terms)?;
        let group_by = GroupBy::new(self.terms)?;
        let composite = self.filter.build();
        Ok(SelectGroupBy::new(
            select_from,
            aggregate,
            composite.where_clause().cloned(),
            group_by,
            self.having,
            composite.order_by().cloned(),
        ))
    }
}

// ============================================================================
// UNION
// ============================================================================

/// Several select statements joined with `UNION`.
#[derive(Debug, Clone)]
pub struct SelectUnion {
    unit: Unit,
    selects: Vec<Arc<dyn SelectQuery>>,
    column_types: Vec<TermType>,
}

impl SelectUnion {
    pub fn new(selects: Vec<Arc<dyn SelectQuery>>) -> QueryResult<Self> {
        match selects.as_slice() {
            [] => return Err(QueryError::EmptyUnion),
            [single] => {
                return Err(QueryError::SingleUnion {
                    query: single.repr().to_string(),
                })
            }
            _ => {}
        }

        let typed: Vec<&dyn TypedSelectQuery> =
            selects.iter().filter_map(|query| query.as_typed()).collect();
        if typed.is_empty() {
            return Err(QueryError::UntypedUnion {
                count: selects.len(),
            });
        }
        if typed.len() < selects.len() {
            tracing::debug!(
                untyped = selects.len() - typed.len(),
                "union column types inferred from typed queries only"
            );
        }
        let counts: Vec<usize> = typed.iter().map(|query| query.columns_number()).collect();
        if counts.iter().any(|count| *count != counts[0]) {
            return Err(QueryError::UnionColumnsMismatch { counts });
        }
        let column_types = Self::common_column_types(&typed, counts[0]);

        let repr = selects
            .iter()
            .map(|query| query.repr().trim())
            .collect::<Vec<_>>()
            .join("\nUNION\n");
        let args = flatten_args_of(selects.iter().map(|query| Some(query.as_ref())));
        Ok(Self {
            unit: Unit::new(repr, args),
            selects,
            column_types,
        })
    }

    /// The shared type of each column across typed queries, `Wildcard` where they differ.
    fn common_column_types(typed: &[&dyn TypedSelectQuery], columns: usize) -> Vec<TermType> {
        let all_types: Vec<Vec<TermType>> = typed.iter().map(|query| query.column_types()).collect();
        (0..columns)
            .map(|i| {
                let first = all_types[0].get(i).copied().unwrap_or(TermType::Wildcard);
                if all_types.iter().all(|types| types.get(i) == Some(&first)) {
                    first
                } else {
                    TermType::Wildcard
                }
            })
            .collect()
    }

    pub fn builder() -> SelectUnionBuilder {
        SelectUnionBuilder::default()
    }

    pub fn selects(&self) -> &[Arc<dyn SelectQuery>] {
        &self.selects
    }

    pub fn to_builder(&self) -> SelectUnionBuilder {
        SelectUnionBuilder {
            selects: self.selects.clone(),
        }
    }
}

impl_fragment!(SelectUnion);

impl SelectQuery for SelectUnion {
    fn as_typed(&self) -> Option<&dyn TypedSelectQuery> {
        Some(self)
    }
}

impl TypedSelectQuery for SelectUnion {
    fn columns_number(&self) -> usize {
        self.column_types.len()
    }

    fn column_types(&self) -> Vec<TermType> {
        self.column_types.clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectUnionBuilder {
    selects: Vec<Arc<dyn SelectQuery>>,
}

impl SelectUnionBuilder {
    pub fn with(mut self, query: impl SelectQuery + 'static) -> Self {
        self.selects.push(Arc::new(query));
        self
    }

    pub fn with_shared(mut self, query: Arc<dyn SelectQuery>) -> Self {
        self.selects.push(query);
        self
    }

    pub fn build(self) -> QueryResult<SelectUnion> {
        SelectUnion::new(self.selects)
    }
}

// ============================================================================
// HARDCODED
// ============================================================================

/// A select given as raw text; its result shape is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct HardcodedSelectQuery {
    unit: Unit,
}

impl HardcodedSelectQuery {
    pub fn of(query: impl Into<String>) -> Self {
        Self::with_args(query, Args::empty())
    }

    pub fn with_args(query: impl Into<String>, args: Args) -> Self {
        Self {
            unit: Unit::new(query, args),
        }
    }
}

impl_fragment!(HardcodedSelectQuery);

impl SelectQuery for HardcodedSelectQuery {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::BoolTerm;
    use crate::value::Value;

    fn id() -> Term {
        Term::column("id", TermType::Number)
    }

    fn name() -> Term {
        Term::column("name", TermType::String)
    }

    #[test]
    fn test_select_from_requires_terms() {
        let err = SelectFrom::new("user", vec![]).unwrap_err();
        assert_eq!(err.to_string(), "No terms provided for select query: table=user");
    }

    #[test]
    fn test_select_where_full() {
        let query = SelectWhere::builder("user")
            .select(id())
            .select(name())
            .where_(Where::of(BoolTerm::gt(&id(), &Term::int_var(10)).unwrap()))
            .order_by_term(name())
            .limit(Limit::of(5).unwrap())
            .build()
            .unwrap();
        assert_eq!(
            query.repr(),
            "SELECT id, name\nFROM user\nWHERE id > ?\nORDER BY name ASC\nLIMIT ?"
        );
        assert_eq!(query.args().as_list(), vec![Value::Int(10), Value::Int(5)]);
        assert_eq!(query.columns_number(), 2);
        assert_eq!(query.column_types(), vec![TermType::Number, TermType::String]);
    }

    #[test]
    fn test_select_where_to_builder_round_trip() {
        let query = SelectWhere::builder("user").select(id()).build().unwrap();
        let extended = query
            .to_builder()
            .where_(Where::of(BoolTerm::is_null(&name())))
            .build()
            .unwrap();
        assert_eq!(extended.repr(), "SELECT id\nFROM user\nWHERE name IS NULL");
    }

    #[test]
    fn test_select_group_by() {
        let query = SelectGroupBy::builder("song")
            .select([name()], FuncExpr::count_all())
            .unwrap()
            .having(Having::of(
                &BoolTerm::gt(FuncExpr::count_all().term(), &Term::int_var(1)).unwrap(),
            ))
            .build()
            .unwrap();
        assert_eq!(
            query.repr(),
            "SELECT name, count(*)\nFROM song\nGROUP BY name\nHAVING count(*) > ?"
        );
        assert_eq!(query.columns_number(), 2);
        assert_eq!(query.args().as_list(), vec![Value::Int(1)]);
    }

    #[test]
    fn test_select_group_by_aggregate_rules() {
        let err = SelectGroupBy::builder("song").group_by(name()).build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Aggregate function not provided for SelectGroupBy: table=song"
        );

        let err = SelectGroupBy::builder("song")
            .aggregate(FuncExpr::lower(&name()))
            .unwrap_err();
        assert!(matches!(err, QueryError::NotAggregate { .. }));

        let err = SelectGroupBy::builder("song")
            .aggregate(FuncExpr::count_all())
            .unwrap()
            .aggregate(FuncExpr::sum(&id()))
            .unwrap_err();
        assert!(matches!(err, QueryError::AggregateAlreadySet { .. }));
    }

    #[test]
    fn test_union() {
        let first = SelectWhere::builder("a").select(id()).build().unwrap();
        let second = SelectWhere::builder("b").select(id()).build().unwrap();
        let union = first.union(second).unwrap();
        assert_eq!(union.repr(), "SELECT id\nFROM a\nUNION\nSELECT id\nFROM b");
        assert_eq!(union.column_types(), vec![TermType::Number]);
    }

    #[test]
    fn test_union_mixed_types_become_wildcard() {
        let first = SelectWhere::builder("a").select(id()).build().unwrap();
        let second = SelectWhere::builder("b").select(name()).build().unwrap();
        let raw = HardcodedSelectQuery::of("SELECT 1");
        let union = SelectUnion::builder()
            .with(first)
            .with(second)
            .with(raw)
            .build()
            .unwrap();
        assert_eq!(union.columns_number(), 1);
        assert_eq!(union.column_types(), vec![TermType::Wildcard]);
    }

    #[test]
    fn test_union_errors() {
        assert_eq!(SelectUnion::builder().build().unwrap_err(), QueryError::EmptyUnion);

        let single = SelectUnion::builder()
            .with(HardcodedSelectQuery::of("SELECT 1"))
            .build()
            .unwrap_err();
        assert!(matches!(single, QueryError::SingleUnion { .. }));

        let untyped = SelectUnion::builder()
            .with(HardcodedSelectQuery::of("SELECT 1"))
            .with(HardcodedSelectQuery::of("SELECT 2"))
            .build()
            .unwrap_err();
        assert_eq!(untyped, QueryError::UntypedUnion { count: 2 });

        let wide = SelectWhere::builder("a").select(id()).select(name()).build().unwrap();
        let narrow = SelectWhere::builder("b").select(id()).build().unwrap();
        let err = wide.union(narrow).unwrap_err();
        assert_eq!(err, QueryError::UnionColumnsMismatch { counts: vec![2, 1] });
    }
}
