//! Builds the table field for one model field

use super::context::RunContext;
use super::pojo_factory::PojoArchFactory;
use super::resolver::{FieldResolver, ResolvedField};
use crate::adapters::AdapterApi;
use crate::annotations::{is_primary_key, FieldAnnotations};
use crate::arch::{
    Column, Conversion, FieldFlags, ForeignField, ModelField, ModelInput, MultiColumnField, OneColumnField, PojoArch,
    TableField,
};
use crate::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::error::{ArchError, ArchResult};
use crate::naming;
use std::sync::Arc;

pub(crate) struct TableFieldFactory<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> TableFieldFactory<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn build(&self, input: &ModelInput, owner: &TypeDescriptor, field: &FieldDescriptor) -> ArchResult<TableField> {
        let annotations = FieldAnnotations::analyze(field)?;
        let sql_name = annotations.sql_name_or_default(&field.name)?;
        let flags = FieldFlags {
            primary: is_primary_key(field, &annotations, input.identity()),
            unique: annotations.unique,
            nullable: annotations.nullable,
        };
        let model = input.model_name();
        let defaults = &annotations.defaults;

        let resolved = FieldResolver::new(self.ctx).resolve(model, field, &annotations)?;
        let table_field = match resolved {
            ResolvedField::Native(jdbc) => {
                let column = Column::new(sql_name.clone(), jdbc)?;
                let model_field = ModelField::of(owner, field, sql_name)?;
                TableField::OneColumn(OneColumnField::new(
                    model,
                    model_field,
                    flags,
                    column,
                    Conversion::Native,
                    defaults,
                )?)
            }
            ResolvedField::ForeignKey { table, jdbc_type } => {
                let column_name = match annotations.sql_name {
                    Some(_) => sql_name,
                    None => naming::concat_sql_names(&sql_name, &self.ctx.config.naming.foreign_key_suffix),
                };
                let column = Column::new(column_name.clone(), jdbc_type)?;
                let model_field = ModelField::of(owner, field, column_name)?;
                TableField::Foreign(ForeignField::new(
                    model,
                    model_field,
                    flags.nullable,
                    column,
                    table,
                    defaults,
                )?)
            }
            ResolvedField::Mapper(mapper) | ResolvedField::InlineMapper(mapper) => {
                let column = mapper.mapper_column(&sql_name)?;
                let model_field = ModelField::of(owner, field, sql_name)?;
                TableField::OneColumn(OneColumnField::new(
                    model,
                    model_field,
                    flags,
                    column,
                    Conversion::Mapper(mapper),
                    defaults,
                )?)
            }
            ResolvedField::Adapter(adapter) => {
                let columns = adapter.adapter_columns(&sql_name)?;
                let model_field = ModelField::of(owner, field, sql_name)?;
                of_columns(model, model_field, flags, columns, adapter, None, defaults)?
            }
            ResolvedField::Pojo(pojo_type) => {
                let pojo = PojoArchFactory::new(self.ctx).build(&pojo_type)?;
                let adapter = AdapterApi::of_signature(&pojo, &self.ctx.config.naming);
                let attached = pojo.reattached_to(&sql_name)?;
                let columns = attached.columns().to_vec();
                let model_field = ModelField::of(owner, field, sql_name)?;
                of_columns(model, model_field, flags, columns, adapter, Some(Arc::new(attached)), defaults)?
            }
        };
        Ok(table_field)
    }
}

/// One column stays a one-column field, more become a multi-column field.
fn of_columns(
    model: &str,
    field: ModelField,
    flags: FieldFlags,
    mut columns: Vec<Column>,
    adapter: AdapterApi,
    pojo: Option<Arc<PojoArch>>,
    defaults: &[String],
) -> ArchResult<TableField> {
    match columns.len() {
        0 => Err(ArchError::InvalidAdapter {
            adapter: adapter.adapter_type().to_string(),
            reason: "produces no columns".to_string(),
        }),
        1 => {
            let column = columns.remove(0);
            let field = OneColumnField::new(model, field, flags, column, Conversion::Adapter(adapter), defaults)?;
            Ok(TableField::OneColumn(field))
        }
        _ => Ok(TableField::MultiColumn(MultiColumnField::new(
            model, field, flags, columns, adapter, pojo, defaults,
        )?)),
    }
}
