//! Clauses that follow `SELECT ... FROM ...`

use super::bool_term::BoolTerm;
use super::term::Term;
use super::unit::{join_with_commas, Fragment, Representable, Unit};
use crate::args::{flatten_args_of, Args, HasArgs};
use crate::engine::Engine;
use crate::error::{QueryError, QueryResult};

macro_rules! impl_fragment {
    ($type:ty) => {
        impl Representable for $type {
            fn repr(&self) -> &str {
                self.unit.repr()
            }
        }

        impl HasArgs for $type {
            fn args(&self) -> &Args {
                self.unit.args()
            }
        }
    };
}

pub(crate) use impl_fragment;

// ============================================================================
// WHERE / HAVING
// ============================================================================

/// `WHERE <bool term>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    unit: Unit,
    term: BoolTerm,
}

impl Where {
    pub fn of(term: BoolTerm) -> Self {
        Self {
            unit: Unit::new(format!("WHERE {}", term.repr()), term.args().clone()),
            term,
        }
    }

    pub fn and(terms: &[BoolTerm]) -> QueryResult<Self> {
        BoolTerm::and(terms).map(Self::of)
    }

    pub fn or(terms: &[BoolTerm]) -> QueryResult<Self> {
        BoolTerm::or(terms).map(Self::of)
    }

    pub fn hardcoded(repr: impl Into<String>, args: Args) -> Self {
        Self::of(BoolTerm::hardcoded(repr, args))
    }

    /// This condition AND-ed with one more term.
    pub fn and_also(&self, term: BoolTerm) -> QueryResult<Self> {
        Self::and(&[self.term.clone(), term])
    }

    pub fn term(&self) -> &BoolTerm {
        &self.term
    }
}

impl_fragment!(Where);

/// `HAVING <bool term>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Having {
    unit: Unit,
}

impl Having {
    pub fn of(term: &BoolTerm) -> Self {
        Self {
            unit: Unit::new(format!("HAVING {}", term.repr()), term.args().clone()),
        }
    }
}

impl_fragment!(Having);

// ============================================================================
// GROUP BY / ORDER BY
// ============================================================================

/// `GROUP BY a, b`; every term must be a named column or alias.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    unit: Unit,
    terms: Vec<Term>,
}

impl GroupBy {
    pub fn new(terms: Vec<Term>) -> QueryResult<Self> {
        let names = terms
            .iter()
            .map(|term| {
                term.name().ok_or_else(|| QueryError::NotNamed {
                    term: term.repr().to_string(),
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Self {
            unit: Unit::of(format!("GROUP BY {}", names.join(", "))),
            terms,
        })
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

impl_fragment!(GroupBy);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn repr(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// `term ASC` or `term DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    unit: Unit,
    term: Term,
    order: Order,
}

impl OrderTerm {
    pub fn new(term: Term, order: Order) -> Self {
        Self {
            unit: Unit::new(format!("{} {}", term.repr(), order.repr()), term.args().clone()),
            term,
            order,
        }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

impl_fragment!(OrderTerm);

/// `ORDER BY a ASC, b DESC`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    unit: Unit,
    terms: Vec<OrderTerm>,
}

impl OrderBy {
    pub fn new(terms: Vec<OrderTerm>) -> Self {
        Self {
            unit: Unit::new(
                format!("ORDER BY {}", join_with_commas(&terms)),
                flatten_args_of(terms.iter().map(Some)),
            ),
            terms,
        }
    }

    pub fn of(term: Term, order: Order) -> Self {
        Self::new(vec![OrderTerm::new(term, order)])
    }

    /// Every term with the same order.
    pub fn of_all(order: Order, terms: impl IntoIterator<Item = Term>) -> Self {
        Self::new(terms.into_iter().map(|term| OrderTerm::new(term, order)).collect())
    }

    pub fn with_one_more_term(&self, term: Term, order: Order) -> Self {
        self.with_more_terms(vec![OrderTerm::new(term, order)])
    }

    pub fn with_more_terms(&self, terms: Vec<OrderTerm>) -> Self {
        let mut all = self.terms.clone();
        all.extend(terms);
        Self::new(all)
    }

    pub fn terms(&self) -> &[OrderTerm] {
        &self.terms
    }
}

impl_fragment!(OrderBy);

// ============================================================================
// LIMIT / OFFSET / PAGINATION
// ============================================================================

/// `LIMIT ?`, or `FETCH NEXT ? ROWS ONLY` for engines without `LIMIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    unit: Unit,
    value: i32,
    fetch: bool,
}

impl Limit {
    pub fn of(value: i32) -> QueryResult<Self> {
        Self::build(value, false)
    }

    pub fn fetch_next(value: i32) -> QueryResult<Self> {
        Self::build(value, true)
    }

    fn build(value: i32, fetch: bool) -> QueryResult<Self> {
        if value <= 0 {
            return Err(QueryError::InvalidLimit {
                value: i64::from(value),
            });
        }
        let repr = if fetch { "FETCH NEXT ? ROWS ONLY" } else { "LIMIT ?" };
        Ok(Self {
            unit: Unit::new(repr, Args::of_ints([value])),
            value,
            fetch,
        })
    }

    pub fn limit_value(&self) -> i32 {
        self.value
    }

    pub fn is_fetch(&self) -> bool {
        self.fetch
    }
}

impl_fragment!(Limit);

/// `OFFSET ?`, or `OFFSET ? ROWS` for engines without `LIMIT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Offset {
    unit: Unit,
    value: i32,
}

impl Offset {
    pub fn of(value: i32) -> QueryResult<Self> {
        Self::build(value, "OFFSET ?")
    }

    pub fn rows(value: i32) -> QueryResult<Self> {
        Self::build(value, "OFFSET ? ROWS")
    }

    fn build(value: i32, repr: &str) -> QueryResult<Self> {
        if value < 0 {
            return Err(QueryError::InvalidOffset {
                value: i64::from(value),
            });
        }
        Ok(Self {
            unit: Unit::new(repr, Args::of_ints([value])),
            value,
        })
    }

    pub fn offset_value(&self) -> i32 {
        self.value
    }
}

impl_fragment!(Offset);

/// A window of rows: `limit` rows after skipping `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: i32,
    offset: i32,
}

impl Pagination {
    pub fn of_offset(offset: i32, limit: i32) -> QueryResult<Self> {
        if limit <= 0 {
            return Err(QueryError::InvalidLimit {
                value: i64::from(limit),
            });
        }
        if offset < 0 {
            return Err(QueryError::InvalidOffset {
                value: i64::from(offset),
            });
        }
        Ok(Self { limit, offset })
    }

    pub fn first_page(limit: i32) -> QueryResult<Self> {
        Self::of_offset(0, limit)
    }

    /// Page `number` (1-based) of `size` rows.
    pub fn of_page(number: i32, size: i32) -> QueryResult<Self> {
        let invalid = || QueryError::InvalidPage {
            number: i64::from(number),
            size: i64::from(size),
        };
        if number < 1 || size < 1 {
            return Err(invalid());
        }
        let offset = i64::from(number - 1) * i64::from(size);
        let offset = i32::try_from(offset).map_err(|_| invalid())?;
        Self::of_offset(offset, size)
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }
}

// ============================================================================
// COMPOSITE FILTER
// ============================================================================

/// The optional trailing clauses of a select, rendered one per line.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFilter {
    unit: Unit,
    where_: Option<Where>,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    offset: Option<Offset>,
}

impl CompositeFilter {
    pub fn new(
        where_: Option<Where>,
        order_by: Option<OrderBy>,
        limit: Option<Limit>,
        offset: Option<Offset>,
    ) -> Self {
        let fetch_style = limit.as_ref().is_some_and(Limit::is_fetch);
        let parts: [Option<&dyn Fragment>; 4] = if fetch_style {
            [
                fragment(&where_),
                fragment(&order_by),
                fragment(&offset),
                fragment(&limit),
            ]
        } else {
            [
                fragment(&where_),
                fragment(&order_by),
                fragment(&limit),
                fragment(&offset),
            ]
        };
        Self {
            unit: Unit::joined_lines(&parts),
            where_,
            order_by,
            limit,
            offset,
        }
    }

    pub fn empty() -> Self {
        Self::new(None, None, None, None)
    }

    pub fn where_clause(&self) -> Option<&Where> {
        self.where_.as_ref()
    }

    pub fn order_by(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn limit(&self) -> Option<&Limit> {
        self.limit.as_ref()
    }

    pub fn offset(&self) -> Option<&Offset> {
        self.offset.as_ref()
    }

    pub fn to_builder(&self) -> CompositeFilterBuilder {
        CompositeFilterBuilder {
            where_: self.where_.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit.clone(),
            offset: self.offset.clone(),
        }
    }
}

impl_fragment!(CompositeFilter);

fn fragment<T: Fragment>(part: &Option<T>) -> Option<&dyn Fragment> {
    part.as_ref().map(|p| p as &dyn Fragment)
}

#[derive(Debug, Clone, Default)]
pub struct CompositeFilterBuilder {
    where_: Option<Where>,
    order_by: Option<OrderBy>,
    limit: Option<Limit>,
    offset: Option<Offset>,
}

impl CompositeFilterBuilder {
    pub fn with_where(&mut self, where_: Where) -> &mut Self {
        self.where_ = Some(where_);
        self
    }

    pub fn with_order_by(&mut self, order_by: OrderBy) -> &mut Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_limit(&mut self, limit: Limit) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(&mut self, offset: Offset) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Engine-specific limit/offset pair for the window.
    pub fn with_pagination(
        &mut self,
        pagination: Pagination,
        engine: Engine,
    ) -> QueryResult<&mut Self> {
        if engine.supports_limit() {
            self.limit = Some(Limit::of(pagination.limit())?);
            self.offset = match pagination.offset() {
                0 => None,
                offset => Some(Offset::of(offset)?),
            };
        } else {
            self.limit = Some(Limit::fetch_next(pagination.limit())?);
            self.offset = Some(Offset::rows(pagination.offset())?);
        }
        Ok(self)
    }

    pub fn build(&self) -> CompositeFilter {
        CompositeFilter::new(
            self.where_.clone(),
            self.order_by.clone(),
            self.limit.clone(),
            self.offset.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TermType;
    use crate::value::Value;

    fn id() -> Term {
        Term::column("id", TermType::Number)
    }

    #[test]
    fn test_where() {
        let where_ = Where::of(BoolTerm::eq(&id(), &Term::int_var(3)).unwrap());
        assert_eq!(where_.repr(), "WHERE id = ?");
        assert_eq!(where_.args().as_list(), vec![Value::Int(3)]);

        let more = where_.and_also(BoolTerm::is_not_null(&id())).unwrap();
        assert_eq!(more.repr(), "WHERE id = ? AND id IS NOT NULL");
    }

    #[test]
    fn test_group_by_requires_names() {
        let name = Term::column("name", TermType::String);
        let group = GroupBy::new(vec![name.clone(), id().named_as("key")]).unwrap();
        assert_eq!(group.repr(), "GROUP BY name, key");
        assert!(group.args().is_empty());

        let err = GroupBy::new(vec![Term::number(1)]).unwrap_err();
        assert!(matches!(err, QueryError::NotNamed { .. }));
    }

    #[test]
    fn test_order_by() {
        let order = OrderBy::of(id(), Order::Asc);
        assert_eq!(order.repr(), "ORDER BY id ASC");
        let more = order.with_one_more_term(Term::column("name", TermType::String), Order::Desc);
        assert_eq!(more.repr(), "ORDER BY id ASC, name DESC");
        assert_eq!(more.terms().len(), 2);
        assert_eq!(OrderBy::of_all(Order::Desc, [id()]).repr(), "ORDER BY id DESC");
    }

    #[test]
    fn test_limit_and_offset_validation() {
        assert_eq!(Limit::of(5).unwrap().repr(), "LIMIT ?");
        assert_eq!(Limit::of(5).unwrap().args().as_list(), vec![Value::Int(5)]);
        assert!(Limit::of(0).is_err());
        assert_eq!(Offset::of(0).unwrap().repr(), "OFFSET ?");
        assert!(Offset::of(-1).is_err());
    }

    #[test]
    fn test_pagination_of_page() {
        let page = Pagination::of_page(3, 10).unwrap();
        assert_eq!((page.offset(), page.limit()), (20, 10));
        assert!(Pagination::of_page(0, 10).is_err());
        assert!(Pagination::of_page(1, 0).is_err());
    }

    #[test]
    fn test_composite_filter_order() {
        let filter = CompositeFilter::new(
            Some(Where::hardcoded("x > 0", Args::empty())),
            Some(OrderBy::of(id(), Order::Asc)),
            Some(Limit::of(2).unwrap()),
            Some(Offset::of(4).unwrap()),
        );
        assert_eq!(
            filter.repr(),
            "WHERE x > 0\nORDER BY id ASC\nLIMIT ?\nOFFSET ?"
        );
        assert_eq!(filter.args().as_list(), vec![Value::Int(2), Value::Int(4)]);
    }

    #[test]
    fn test_pagination_per_engine() {
        let page = Pagination::of_offset(10, 5).unwrap();

        let mut builder = CompositeFilterBuilder::default();
        builder.with_pagination(page, Engine::PostgreSQL).unwrap();
        let filter = builder.build();
        assert_eq!(filter.repr(), "LIMIT ?\nOFFSET ?");
        assert_eq!(filter.args().as_list(), vec![Value::Int(5), Value::Int(10)]);

        let mut builder = CompositeFilterBuilder::default();
        builder.with_pagination(page, Engine::MsSqlServer).unwrap();
        let filter = builder.build();
        assert_eq!(filter.repr(), "OFFSET ? ROWS\nFETCH NEXT ? ROWS ONLY");
        assert_eq!(filter.args().as_list(), vec![Value::Int(10), Value::Int(5)]);
    }

    #[test]
    fn test_first_page_skips_offset() {
        let mut builder = CompositeFilterBuilder::default();
        builder
            .with_pagination(Pagination::first_page(3).unwrap(), Engine::SQLite)
            .unwrap();
        assert_eq!(builder.build().repr(), "LIMIT ?");
    }
}
