//! DDL derived from resolved tables

use crate::arch::{Column, ForeignField, TableArch, TableField};
use orm_api::{ColumnDefinition, CreateTableQuery, Engine, ForeignKeyDefinition, QueryResult};

impl TableArch {
    /// `CREATE TABLE` with column types for `engine`, constraints and foreign key
    /// references to the tables of the same run.
    pub fn create_table_query(&self, engine: Engine, tables: &[TableArch]) -> QueryResult<CreateTableQuery> {
        let builder = self
            .fields()
            .iter()
            .flat_map(|field| column_definitions(field, engine))
            .fold(CreateTableQuery::builder(self.sql_name()), |builder, column| builder.column(column));
        // a key over several columns becomes a table constraint
        let builder = match self.primary_key_field() {
            Some(pk) if pk.columns_number() > 1 => builder.primary_key(pk.columns().iter().map(Column::sql_name)),
            _ => builder,
        };
        self.foreign_key_definitions(tables)
            .into_iter()
            .fold(builder, |builder, fk| builder.foreign_key(fk))
            .build(engine)
    }

    /// References from each foreign field to the target's primary key column.
    pub fn foreign_key_definitions(&self, tables: &[TableArch]) -> Vec<ForeignKeyDefinition> {
        self.foreign_fields()
            .filter_map(|foreign| foreign_key_definition(foreign, tables))
            .collect()
    }
}

fn column_definitions(field: &TableField, engine: Engine) -> Vec<ColumnDefinition> {
    let single = field.columns_number() == 1;
    field
        .columns()
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let mut definition = ColumnDefinition::new(column.sql_name(), column.jdbc_type().sql_type(engine));
            if field.is_primary_key() && single {
                definition = definition.primary_key();
            } else if !field.is_nullable() {
                definition = definition.not_null();
            }
            if field.is_unique() && single {
                definition = definition.unique();
            }
            if let Some(default) = field.defaults().at(i) {
                definition = definition.default_value(default);
            }
            definition
        })
        .collect()
}

fn foreign_key_definition(foreign: &ForeignField, tables: &[TableArch]) -> Option<ForeignKeyDefinition> {
    let target = tables.get(foreign.target().index())?;
    match target.primary_key_field()?.columns() {
        [pk] => Some(ForeignKeyDefinition::new(
            foreign.column().sql_name(),
            target.sql_name(),
            pk.sql_name(),
        )),
        _ => None,
    }
}
