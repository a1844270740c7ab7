//! Data manipulation statements: INSERT, UPDATE and DELETE

use super::clause::{impl_fragment, Where};
use super::term::Term;
use super::unit::{join_with_commas, Representable, Unit};
use crate::args::{flatten_args_of, Args, HasArgs};
use crate::engine::Engine;
use crate::error::{QueryError, QueryResult};

/// What to do with a row that violates a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnConflict {
    #[default]
    Fail,
    Ignore,
}

// ============================================================================
// INSERT
// ============================================================================

/// `INSERT INTO t (a, b)\nVALUES (?, ?)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertValues {
    unit: Unit,
    table: String,
    columns: Vec<String>,
}

impl InsertValues {
    pub fn into_table(table: impl Into<String>) -> InsertValuesBuilder {
        InsertValuesBuilder::new(table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl_fragment!(InsertValues);

#[derive(Debug, Clone)]
pub struct InsertValuesBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<Term>,
    on_conflict: OnConflict,
}

impl InsertValuesBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
            on_conflict: OnConflict::Fail,
        }
    }

    /// One column with its value.
    pub fn set(mut self, column: impl Into<String>, value: Term) -> Self {
        self.columns.push(column.into());
        self.values.push(value);
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn values(mut self, values: impl IntoIterator<Item = Term>) -> Self {
        self.values.extend(values);
        self
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = on_conflict;
        self
    }

    pub fn ignoring_duplicates(self) -> Self {
        self.on_conflict(OnConflict::Ignore)
    }

    pub fn build(self, engine: Engine) -> QueryResult<InsertValues> {
        if self.columns.is_empty() {
            return Err(QueryError::EmptyColumns {
                statement: "INSERT".to_string(),
                table: self.table,
            });
        }
        if self.columns.len() != self.values.len() {
            return Err(QueryError::ValuesMismatch {
                columns: self.columns.len(),
                values: self.values.len(),
            });
        }

        let (head, tail) = match self.on_conflict {
            OnConflict::Fail => ("INSERT INTO", ""),
            OnConflict::Ignore => ignore_syntax(engine)?,
        };
        let repr = format!(
            "{} {} ({})\nVALUES ({}){}",
            head,
            self.table,
            self.columns.join(", "),
            join_with_commas(&self.values),
            tail,
        );
        Ok(InsertValues {
            unit: Unit::new(repr, flatten_args_of(self.values.iter().map(Some))),
            table: self.table,
            columns: self.columns,
        })
    }
}

fn ignore_syntax(engine: Engine) -> QueryResult<(&'static str, &'static str)> {
    match engine {
        Engine::MySQL | Engine::MariaDB => Ok(("INSERT IGNORE INTO", "")),
        Engine::SQLite => Ok(("INSERT OR IGNORE INTO", "")),
        Engine::PostgreSQL => Ok(("INSERT INTO", "\nON CONFLICT DO NOTHING")),
        other => Err(QueryError::UnsupportedByEngine {
            feature: "INSERT ignoring duplicates".to_string(),
            engine: format!("{other:?}"),
        }),
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// `UPDATE t\nSET a=?, b=?\nWHERE ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWhere {
    unit: Unit,
    table: String,
}

impl UpdateWhere {
    pub fn table_builder(table: impl Into<String>) -> UpdateWhereBuilder {
        UpdateWhereBuilder::new(table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl_fragment!(UpdateWhere);

#[derive(Debug, Clone)]
pub struct UpdateWhereBuilder {
    table: String,
    assignments: Vec<(String, Term)>,
    where_: Option<Where>,
}

impl UpdateWhereBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            where_: None,
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: Term) -> Self {
        self.assignments.push((column.into(), value));
        self
    }

    pub fn where_(mut self, where_: Where) -> Self {
        self.where_ = Some(where_);
        self
    }

    pub fn build(self) -> QueryResult<UpdateWhere> {
        if self.assignments.is_empty() {
            return Err(QueryError::EmptyColumns {
                statement: "UPDATE".to_string(),
                table: self.table,
            });
        }

        let sets: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{}={}", column, value.repr()))
            .collect();
        let mut repr = format!("UPDATE {}\nSET {}", self.table, sets.join(", "));
        if let Some(where_) = &self.where_ {
            repr.push('\n');
            repr.push_str(where_.repr());
        }

        let set_args = flatten_args_of(self.assignments.iter().map(|(_, value)| Some(value)));
        let args = match &self.where_ {
            Some(where_) => Args::concat(&set_args, where_.args()),
            None => set_args,
        };
        Ok(UpdateWhere {
            unit: Unit::new(repr, args),
            table: self.table,
        })
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// `DELETE FROM t`, optionally followed by a `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteWhere {
    unit: Unit,
    table: String,
}

impl DeleteWhere {
    pub fn new(table: impl Into<String>, where_: Option<Where>) -> Self {
        let table = table.into();
        let unit = match &where_ {
            Some(where_) => Unit::new(
                format!("DELETE FROM {}\n{}", table, where_.repr()),
                where_.args().clone(),
            ),
            None => Unit::of(format!("DELETE FROM {}", table)),
        };
        Self { unit, table }
    }

    pub fn all(table: impl Into<String>) -> Self {
        Self::new(table, None)
    }

    pub fn where_(table: impl Into<String>, where_: Where) -> Self {
        Self::new(table, Some(where_))
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl_fragment!(DeleteWhere);
