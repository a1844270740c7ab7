//! Resolved tables

use super::{Column, ForeignField, ModelInput, PrefixedColumn, TableField};
use crate::descriptor::TypeName;
use crate::error::{ArchError, ArchResult};
use crate::jdbc::JdbcType;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashSet;

/// Position of a table in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableId(pub(crate) usize);

impl TableId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How far columns of foreign tables are pulled into a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadFollow {
    #[default]
    NoFollow,
    FollowOneLevel,
    FollowAll,
}

/// The two foreign fields a bridge table connects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeInfo {
    pub left: String,
    pub right: String,
}

/// A table built in two steps: identity first, fields once every table of the run
/// is known.
#[derive(Debug)]
pub struct TableArch {
    id: TableId,
    sql_name: String,
    model_name: String,
    table_type_name: String,
    model_type: TypeName,
    exposed_as: Option<TypeName>,
    bridge: Option<BridgeInfo>,
    fields: OnceCell<Vec<TableField>>,
}

impl TableArch {
    pub(crate) fn shallow(id: TableId, input: &ModelInput) -> Self {
        Self {
            id,
            sql_name: input.sql_name().to_string(),
            model_name: input.model_name().to_string(),
            table_type_name: input.table_type_name().to_string(),
            model_type: input.model_type().clone(),
            exposed_as: input.exposed_as().cloned(),
            bridge: input.bridge().cloned(),
            fields: OnceCell::new(),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn table_type_name(&self) -> &str {
        &self.table_type_name
    }

    pub fn model_type(&self) -> &TypeName {
        &self.model_type
    }

    pub fn exposed_as(&self) -> Option<&TypeName> {
        self.exposed_as.as_ref()
    }

    pub fn bridge(&self) -> Option<&BridgeInfo> {
        self.bridge.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeName> {
        std::iter::once(&self.model_type).chain(self.exposed_as.as_ref())
    }

    pub fn is_initialized(&self) -> bool {
        self.fields.get().is_some()
    }

    pub fn initialize_or_die(&self, fields: Vec<TableField>) -> ArchResult<()> {
        self.fields.set(fields).map_err(|_| ArchError::AlreadyInitialized {
            table: self.sql_name.clone(),
        })
    }

    /// Empty until the table is initialized.
    pub fn fields(&self) -> &[TableField] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&TableField> {
        self.fields().iter().find(|f| f.name() == name)
    }

    pub fn primary_key_field(&self) -> Option<&TableField> {
        self.fields().iter().find(|f| f.is_primary_key())
    }

    pub fn has_primary_key_field(&self) -> bool {
        self.primary_key_field().is_some()
    }

    pub fn is_primary_key_int(&self) -> bool {
        self.primary_key_jdbc_type() == Some(JdbcType::Int)
    }

    pub fn is_primary_key_long(&self) -> bool {
        self.primary_key_jdbc_type() == Some(JdbcType::Long)
    }

    fn primary_key_jdbc_type(&self) -> Option<JdbcType> {
        match self.primary_key_field()?.columns() {
            [column] => Some(column.jdbc_type()),
            _ => None,
        }
    }

    pub fn foreign_fields(&self) -> impl Iterator<Item = &ForeignField> {
        self.fields().iter().filter_map(TableField::as_foreign)
    }

    pub fn has_foreign_key_field(&self) -> bool {
        self.foreign_fields().next().is_some()
    }

    pub fn own_columns(&self) -> impl Iterator<Item = &Column> {
        self.fields().iter().flat_map(TableField::columns)
    }

    /// Checks the invariants of a completed table.
    pub fn validate(&self) -> ArchResult<()> {
        let primary: Vec<String> = self
            .fields()
            .iter()
            .filter(|f| f.is_primary_key())
            .map(|f| f.name().to_string())
            .collect();
        if primary.len() > 1 {
            return Err(ArchError::MultiplePrimaryKeys {
                table: self.sql_name.clone(),
                fields: primary,
            });
        }

        let mut seen = HashSet::new();
        for column in self.own_columns() {
            if !seen.insert(column.sql_name()) {
                return Err(ArchError::DuplicateColumn {
                    table: self.sql_name.clone(),
                    column: column.sql_name().to_string(),
                });
            }
        }

        if let Some(bridge) = &self.bridge {
            let invalid = |reason: String| ArchError::InvalidBridge {
                table: self.sql_name.clone(),
                reason,
            };
            if bridge.left == bridge.right {
                return Err(invalid(format!("both sides name field `{}`", bridge.left)));
            }
            for side in [&bridge.left, &bridge.right] {
                match self.field(side) {
                    Some(field) if field.is_foreign_key() => {}
                    Some(_) => return Err(invalid(format!("field `{side}` is not a foreign key"))),
                    None => return Err(invalid(format!("no field `{side}`"))),
                }
            }
        }
        Ok(())
    }

    /// Columns read for this table, qualified by their table's sql name.
    ///
    /// Foreign key columns are always included. With `FollowOneLevel` the target
    /// table's own columns follow each of them; with `FollowAll` the target is
    /// followed recursively, skipping tables already on the path.
    pub fn columns(&self, follow: ReadFollow, tables: &[TableArch]) -> Vec<PrefixedColumn> {
        let mut out = Vec::new();
        let mut path = vec![self.id];
        self.collect_columns(follow, tables, &mut path, &mut out);
        out
    }

    fn collect_columns(
        &self,
        follow: ReadFollow,
        tables: &[TableArch],
        path: &mut Vec<TableId>,
        out: &mut Vec<PrefixedColumn>,
    ) {
        for field in self.fields() {
            out.extend(field.columns().iter().map(|c| c.qualified(self.sql_name.clone())));

            let Some(foreign) = field.as_foreign() else {
                continue;
            };
            let Some(target) = tables.get(foreign.target().index()) else {
                continue;
            };
            match follow {
                ReadFollow::NoFollow => {}
                ReadFollow::FollowOneLevel => {
                    out.extend(target.own_columns().map(|c| c.qualified(target.sql_name.clone())));
                }
                ReadFollow::FollowAll => {
                    if !path.contains(&target.id) {
                        path.push(target.id);
                        target.collect_columns(follow, tables, path, out);
                        path.pop();
                    }
                }
            }
        }
    }
}
