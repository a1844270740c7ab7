//! Data definition statements: CREATE, DROP, TRUNCATE and ALTER TABLE

use super::clause::impl_fragment;
use super::unit::{Representable, Unit};
use crate::args::{Args, HasArgs};
use crate::engine::Engine;
use crate::error::{QueryError, QueryResult};
use std::fmt;

/// A schema manipulation statement.
pub trait DataDefinitionQuery: Representable + HasArgs + fmt::Debug + Send + Sync {}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// One column of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    name: String,
    sql_type: String,
    primary_key: bool,
    unique: bool,
    not_null: bool,
    default: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            unique: false,
            not_null: false,
            default: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// A raw SQL default expression.
    pub fn default_value(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    fn render(&self) -> String {
        let mut out = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if self.unique {
            out.push_str(" UNIQUE");
        }
        if self.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        out
    }
}

/// `FOREIGN KEY(column) REFERENCES table(column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDefinition {
    column: String,
    foreign_table: String,
    foreign_column: String,
}

impl ForeignKeyDefinition {
    pub fn new(
        column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn foreign_table(&self) -> &str {
        &self.foreign_table
    }

    fn render(&self) -> String {
        format!(
            "FOREIGN KEY({}) REFERENCES {}({})",
            self.column, self.foreign_table, self.foreign_column
        )
    }
}

// ============================================================================
// CREATE TABLE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableQuery {
    unit: Unit,
    table: String,
}

impl CreateTableQuery {
    pub fn builder(table: impl Into<String>) -> CreateTableQueryBuilder {
        CreateTableQueryBuilder::new(table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl_fragment!(CreateTableQuery);
impl DataDefinitionQuery for CreateTableQuery {}

#[derive(Debug, Clone)]
pub struct CreateTableQueryBuilder {
    table: String,
    if_not_exists: bool,
    columns: Vec<ColumnDefinition>,
    primary_key: Vec<String>,
    foreign_keys: Vec<ForeignKeyDefinition>,
}

impl CreateTableQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            if_not_exists: true,
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDefinition>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Table-level `PRIMARY KEY (a, b)` for a key spread over several columns.
    pub fn primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn build(self, engine: Engine) -> QueryResult<CreateTableQuery> {
        if self.columns.is_empty() {
            return Err(QueryError::EmptyColumns {
                statement: "CREATE TABLE".to_string(),
                table: self.table,
            });
        }
        let head = if self.if_not_exists && engine.supports_if_exists() {
            "CREATE TABLE IF NOT EXISTS"
        } else {
            "CREATE TABLE"
        };
        let primary_key =
            (!self.primary_key.is_empty()).then(|| format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        let lines: Vec<String> = self
            .columns
            .iter()
            .map(ColumnDefinition::render)
            .chain(primary_key)
            .chain(self.foreign_keys.iter().map(ForeignKeyDefinition::render))
            .map(|line| format!("    {}", line))
            .collect();
        Ok(CreateTableQuery {
            unit: Unit::of(format!("{} {} (\n{}\n)", head, self.table, lines.join(",\n"))),
            table: self.table,
        })
    }
}

// ============================================================================
// DROP / TRUNCATE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableQuery {
    unit: Unit,
}

impl DropTableQuery {
    pub fn builder(table: impl Into<String>) -> DropTableQueryBuilder {
        DropTableQueryBuilder {
            table: table.into(),
            if_exists: true,
            cascade: false,
        }
    }
}

impl_fragment!(DropTableQuery);
impl DataDefinitionQuery for DropTableQuery {}

#[derive(Debug, Clone)]
pub struct DropTableQueryBuilder {
    table: String,
    if_exists: bool,
    cascade: bool,
}

impl DropTableQueryBuilder {
    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn build(self, engine: Engine) -> DropTableQuery {
        let mut repr = if self.if_exists && engine.supports_if_exists() {
            format!("DROP TABLE IF EXISTS {}", self.table)
        } else {
            format!("DROP TABLE {}", self.table)
        };
        // SQLite has no CASCADE on DROP TABLE
        if self.cascade && engine != Engine::SQLite {
            repr.push_str(" CASCADE");
        }
        DropTableQuery {
            unit: Unit::of(repr),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TruncateTableQuery {
    unit: Unit,
}

impl TruncateTableQuery {
    /// `TRUNCATE TABLE t`, or `DELETE FROM t` where truncation is missing.
    pub fn of(table: &str, engine: Engine) -> Self {
        let repr = match engine {
            Engine::SQLite => format!("DELETE FROM {}", table),
            _ => format!("TRUNCATE TABLE {}", table),
        };
        Self {
            unit: Unit::of(repr),
        }
    }
}

impl_fragment!(TruncateTableQuery);
impl DataDefinitionQuery for TruncateTableQuery {}

// ============================================================================
// ALTER TABLE
// ============================================================================

/// `ALTER TABLE t ADD FOREIGN KEY(column) REFERENCES other(column)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableAddForeignKeyQuery {
    unit: Unit,
}

impl AlterTableAddForeignKeyQuery {
    pub fn new(table: &str, foreign_key: &ForeignKeyDefinition, engine: Engine) -> QueryResult<Self> {
        if engine == Engine::SQLite {
            return Err(QueryError::UnsupportedByEngine {
                feature: "ALTER TABLE ADD FOREIGN KEY".to_string(),
                engine: format!("{engine:?}"),
            });
        }
        Ok(Self {
            unit: Unit::of(format!("ALTER TABLE {} ADD {}", table, foreign_key.render())),
        })
    }

    /// One statement per foreign key.
    pub fn for_all(
        table: &str,
        foreign_keys: &[ForeignKeyDefinition],
        engine: Engine,
    ) -> QueryResult<Vec<Self>> {
        foreign_keys
            .iter()
            .map(|foreign_key| Self::new(table, foreign_key, engine))
            .collect()
    }
}

impl_fragment!(AlterTableAddForeignKeyQuery);
impl DataDefinitionQuery for AlterTableAddForeignKeyQuery {}

/// Raw DDL text.
#[derive(Debug, Clone, PartialEq)]
pub struct HardcodedDataDefinitionQuery {
    unit: Unit,
}

impl HardcodedDataDefinitionQuery {
    pub fn of(query: impl Into<String>) -> Self {
        Self {
            unit: Unit::new(query, Args::empty()),
        }
    }
}

impl_fragment!(HardcodedDataDefinitionQuery);
impl DataDefinitionQuery for HardcodedDataDefinitionQuery {}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_table() -> CreateTableQueryBuilder {
        CreateTableQuery::builder("user")
            .column(ColumnDefinition::new("id", "INTEGER").primary_key())
            .column(ColumnDefinition::new("name", "VARCHAR(255)").not_null().unique())
            .column(ColumnDefinition::new("age", "INTEGER").default_value("0"))
    }

    #[test]
    fn test_create_table() {
        let query = user_table()
            .foreign_key(ForeignKeyDefinition::new("group_id", "group", "id"))
            .build(Engine::MySQL)
            .unwrap();
        assert_eq!(
            query.repr(),
            "CREATE TABLE IF NOT EXISTS user (\n    \
             id INTEGER PRIMARY KEY,\n    \
             name VARCHAR(255) UNIQUE NOT NULL,\n    \
             age INTEGER DEFAULT 0,\n    \
             FOREIGN KEY(group_id) REFERENCES group(id)\n)"
        );
        assert!(query.args().is_empty());
    }

    #[test]
    fn test_create_table_with_composite_primary_key() {
        let query = CreateTableQuery::builder("visit")
            .column(ColumnDefinition::new("spot_x", "DOUBLE").not_null())
            .column(ColumnDefinition::new("spot_y", "DOUBLE").not_null())
            .primary_key(["spot_x", "spot_y"])
            .foreign_key(ForeignKeyDefinition::new("spot_x", "area", "x"))
            .build(Engine::MySQL)
            .unwrap();
        assert_eq!(
            query.repr(),
            "CREATE TABLE IF NOT EXISTS visit (\n    \
             spot_x DOUBLE NOT NULL,\n    \
             spot_y DOUBLE NOT NULL,\n    \
             PRIMARY KEY (spot_x, spot_y),\n    \
             FOREIGN KEY(spot_x) REFERENCES area(x)\n)"
        );
    }

    #[test]
    fn test_create_table_without_if_not_exists() {
        let query = user_table().build(Engine::Oracle).unwrap();
        assert!(query.repr().starts_with("CREATE TABLE user (\n"));
        let query = user_table().if_not_exists(false).build(Engine::H2).unwrap();
        assert!(query.repr().starts_with("CREATE TABLE user (\n"));
    }

    #[test]
    fn test_create_table_requires_columns() {
        let err = CreateTableQuery::builder("t").build(Engine::H2).unwrap_err();
        assert_eq!(err.to_string(), "No columns provided for CREATE TABLE: table=t");
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            DropTableQuery::builder("user").build(Engine::H2).repr(),
            "DROP TABLE IF EXISTS user"
        );
        assert_eq!(
            DropTableQuery::builder("user").cascade(true).build(Engine::PostgreSQL).repr(),
            "DROP TABLE IF EXISTS user CASCADE"
        );
        assert_eq!(
            DropTableQuery::builder("user").cascade(true).build(Engine::SQLite).repr(),
            "DROP TABLE IF EXISTS user"
        );
    }

    #[test]
    fn test_truncate_table() {
        assert_eq!(TruncateTableQuery::of("user", Engine::MySQL).repr(), "TRUNCATE TABLE user");
        assert_eq!(TruncateTableQuery::of("user", Engine::SQLite).repr(), "DELETE FROM user");
    }

    #[test]
    fn test_alter_table_add_foreign_key() {
        let keys = [
            ForeignKeyDefinition::new("a_id", "a", "id"),
            ForeignKeyDefinition::new("b_id", "b", "id"),
        ];
        let queries = AlterTableAddForeignKeyQuery::for_all("c", &keys, Engine::H2).unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(
            queries[0].repr(),
            "ALTER TABLE c ADD FOREIGN KEY(a_id) REFERENCES a(id)"
        );
        assert!(AlterTableAddForeignKeyQuery::for_all("c", &keys, Engine::SQLite).is_err());
    }
}
