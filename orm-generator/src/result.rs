//! The outcome of a run and its JSON form

use crate::adapters::AdapterApi;
use crate::arch::{
    Accessor, AdapterArch, BridgeInfo, Column, Defaults, FieldKind, ForeignField, PrefixedColumn, ReadFollow,
    TableArch, TableField, TableId,
};
use crate::config::NamingConfig;
use crate::descriptor::TypeName;
use crate::factory::{PojoArchCollector, TableArchCollector};
use crate::mapper::MapperApi;
use orm_api::{CreateTableQuery, Engine, QueryResult};
use serde::Serialize;
use std::collections::HashMap;

/// Every table of a run plus one generated adapter per nested type.
#[derive(Debug)]
pub struct RunResult {
    tables: Vec<TableArch>,
    index: HashMap<TypeName, TableId>,
    adapters: Vec<AdapterArch>,
}

impl RunResult {
    pub(crate) fn new(tables: TableArchCollector, pojos: PojoArchCollector, naming: &NamingConfig) -> Self {
        let (tables, index) = tables.into_parts();
        let adapters = pojos
            .into_pojos()
            .into_iter()
            .map(|pojo| AdapterArch::new(pojo, naming))
            .collect();
        Self {
            tables,
            index,
            adapters,
        }
    }

    /// Tables in input order.
    pub fn tables(&self) -> &[TableArch] {
        &self.tables
    }

    /// Looks a table up by its model type or exposed-as type.
    pub fn table(&self, ty: &TypeName) -> Option<&TableArch> {
        self.index.get(ty).and_then(|id| self.table_by_id(*id))
    }

    pub fn table_by_id(&self, id: TableId) -> Option<&TableArch> {
        self.tables.get(id.index())
    }

    pub fn foreign_table(&self, field: &ForeignField) -> Option<&TableArch> {
        self.table_by_id(field.target())
    }

    pub fn adapters(&self) -> &[AdapterArch] {
        &self.adapters
    }

    pub fn columns(&self, table: &TableArch, follow: ReadFollow) -> Vec<PrefixedColumn> {
        table.columns(follow, &self.tables)
    }

    pub fn create_table_query(&self, table: &TableArch, engine: Engine) -> QueryResult<CreateTableQuery> {
        table.create_table_query(engine, &self.tables)
    }

    /// `CREATE TABLE` for every table, in input order.
    pub fn create_all_tables(&self, engine: Engine) -> QueryResult<Vec<CreateTableQuery>> {
        self.tables
            .iter()
            .map(|table| table.create_table_query(engine, &self.tables))
            .collect()
    }

    pub fn to_json_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.export())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }

    fn export(&self) -> RunExport<'_> {
        RunExport {
            tables: self.tables.iter().map(|t| self.export_table(t)).collect(),
            adapters: self
                .adapters
                .iter()
                .map(|a| AdapterExport {
                    name: a.name(),
                    adapter_type: a.adapter_type(),
                    pojo_type: a.pojo().pojo_type(),
                    columns: a.columns(),
                })
                .collect(),
        }
    }

    fn export_table<'r>(&'r self, table: &'r TableArch) -> TableExport<'r> {
        TableExport {
            sql_name: table.sql_name(),
            model_name: table.model_name(),
            table_type_name: table.table_type_name(),
            model_type: table.model_type(),
            exposed_as: table.exposed_as(),
            primary_key: table.primary_key_field().map(TableField::name),
            bridge: table.bridge(),
            fields: table
                .fields()
                .iter()
                .map(|field| FieldExport {
                    name: field.name(),
                    sql_name: field.sql_name(),
                    kind: field.kind(),
                    accessor: field.meta().field().accessor(),
                    columns: field.columns(),
                    primary: field.is_primary_key(),
                    unique: field.is_unique(),
                    nullable: field.is_nullable(),
                    defaults: field.defaults(),
                    foreign_table: field
                        .as_foreign()
                        .and_then(|f| self.foreign_table(f))
                        .map(TableArch::sql_name),
                    mapper: field.mapper(),
                    adapter: field.adapter(),
                })
                .collect(),
        }
    }
}

// ============================================================================
// JSON EXPORT
// ============================================================================

#[derive(Serialize)]
struct RunExport<'r> {
    tables: Vec<TableExport<'r>>,
    adapters: Vec<AdapterExport<'r>>,
}

#[derive(Serialize)]
struct TableExport<'r> {
    sql_name: &'r str,
    model_name: &'r str,
    table_type_name: &'r str,
    model_type: &'r TypeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    exposed_as: Option<&'r TypeName>,
    primary_key: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bridge: Option<&'r BridgeInfo>,
    fields: Vec<FieldExport<'r>>,
}

#[derive(Serialize)]
struct FieldExport<'r> {
    name: &'r str,
    sql_name: &'r str,
    kind: FieldKind,
    accessor: &'r Accessor,
    columns: &'r [Column],
    primary: bool,
    unique: bool,
    nullable: bool,
    defaults: &'r Defaults,
    #[serde(skip_serializing_if = "Option::is_none")]
    foreign_table: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mapper: Option<&'r MapperApi>,
    #[serde(skip_serializing_if = "Option::is_none")]
    adapter: Option<&'r AdapterApi>,
}

#[derive(Serialize)]
struct AdapterExport<'r> {
    name: &'r str,
    adapter_type: &'r TypeName,
    pojo_type: &'r TypeName,
    columns: &'r [Column],
}
