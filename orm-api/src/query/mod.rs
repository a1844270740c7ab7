//! Query building blocks, from single terms up to whole statements

pub mod bool_term;
pub mod clause;
pub mod contextual;
pub mod ddl;
pub mod dml;
pub mod select;
pub mod term;
pub mod unit;

pub use bool_term::{BoolOpType, BoolTerm, CompareType};
pub use clause::{
    CompositeFilter, CompositeFilterBuilder, GroupBy, Having, Limit, Offset, Order, OrderBy,
    OrderTerm, Pagination, Where,
};
pub use contextual::Contextual;
pub use ddl::{
    AlterTableAddForeignKeyQuery, ColumnDefinition, CreateTableQuery, CreateTableQueryBuilder,
    DataDefinitionQuery, DropTableQuery, DropTableQueryBuilder, ForeignKeyDefinition,
    HardcodedDataDefinitionQuery, TruncateTableQuery,
};
pub use dml::{DeleteWhere, InsertValues, InsertValuesBuilder, OnConflict, UpdateWhere, UpdateWhereBuilder};
pub use select::{
    HardcodedSelectQuery, SelectFrom, SelectGroupBy, SelectGroupByBuilder, SelectQuery,
    SelectUnion, SelectUnionBuilder, SelectWhere, SelectWhereBuilder, TypedSelectQuery,
};
pub use term::{FuncExpr, Term, TermType};
pub use unit::{join_with_commas, join_with_lines, Fragment, Representable, Unit};
