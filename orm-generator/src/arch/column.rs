//! Columns and their table-qualified form

use crate::error::ArchResult;
use crate::jdbc::JdbcType;
use crate::naming;
use serde::Serialize;
use std::fmt;

/// One SQL column. The name is validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Column {
    sql_name: String,
    jdbc_type: JdbcType,
}

impl Column {
    pub fn new(sql_name: impl Into<String>, jdbc_type: JdbcType) -> ArchResult<Self> {
        let sql_name = sql_name.into();
        naming::validate_sql_name(&sql_name)?;
        Ok(Self { sql_name, jdbc_type })
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn jdbc_type(&self) -> JdbcType {
        self.jdbc_type
    }

    /// Same type, name prefixed: `point` + `x` -> `point_x`.
    pub fn prefixed_name(&self, prefix: &str) -> ArchResult<Column> {
        Column::new(naming::concat_sql_names(prefix, &self.sql_name), self.jdbc_type)
    }

    pub fn qualified(&self, table: impl Into<String>) -> PrefixedColumn {
        PrefixedColumn {
            prefix: table.into(),
            column: self.clone(),
        }
    }
}

/// A column qualified by its table: `prefix.sql_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PrefixedColumn {
    prefix: String,
    column: Column,
}

impl PrefixedColumn {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn sql_prefixed_name(&self) -> String {
        format!("{}.{}", self.prefix, self.column.sql_name)
    }
}

impl fmt::Display for PrefixedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.prefix, self.column.sql_name)
    }
}
