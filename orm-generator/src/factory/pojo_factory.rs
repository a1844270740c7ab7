//! Builds nested value types

use super::context::RunContext;
use super::resolver::{FieldResolver, ForeignTableResolver, ResolvedField};
use crate::annotations::FieldAnnotations;
use crate::arch::{Column, ModelField, PojoArch, PojoField};
use crate::descriptor::{FieldDescriptor, TypeDescriptor, TypeName};
use crate::error::{ArchError, ArchResult};
use std::sync::Arc;

pub(crate) struct PojoArchFactory<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> PojoArchFactory<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// The shared, unprefixed pojo for `ty`.
    pub fn build(&self, ty: &TypeName) -> ArchResult<Arc<PojoArch>> {
        self.ctx.pojos.get_or_compute(ty, || self.compute(ty))
    }

    fn compute(&self, ty: &TypeName) -> ArchResult<PojoArch> {
        let descriptor = self.ctx.catalog.require(ty)?;
        let fields = descriptor
            .fields
            .iter()
            .map(|field| self.build_field(descriptor, field))
            .collect::<ArchResult<Vec<_>>>()?;
        Ok(PojoArch::new(ty.clone(), fields))
    }

    fn build_field(&self, owner: &TypeDescriptor, field: &FieldDescriptor) -> ArchResult<PojoField> {
        if ForeignTableResolver::new(self.ctx).is_foreign_reference(&field.ty) {
            return Err(ArchError::ForeignInPojo {
                field: format!("{}.{}", owner.simple_name(), field.name),
            });
        }
        let annotations = FieldAnnotations::analyze(field)?;
        let sql_name = annotations.sql_name_or_default(&field.name)?;
        let model_field = ModelField::of(owner, field, sql_name.clone())?;

        let pojo_field = match FieldResolver::new(self.ctx).resolve(owner.simple_name(), field, &annotations)? {
            ResolvedField::Native(jdbc) => PojoField::Native {
                field: model_field,
                column: Column::new(sql_name, jdbc)?,
            },
            ResolvedField::Mapper(mapper) | ResolvedField::InlineMapper(mapper) => PojoField::Mapper {
                field: model_field,
                column: mapper.mapper_column(&sql_name)?,
                mapper,
            },
            ResolvedField::Adapter(adapter) => PojoField::Adapter {
                field: model_field,
                columns: adapter.adapter_columns(&sql_name)?,
                adapter,
            },
            ResolvedField::Pojo(nested) => {
                let pojo = self.build(&nested)?;
                PojoField::Nested {
                    field: model_field,
                    pojo: Arc::new(pojo.reattached_to(&sql_name)?),
                }
            }
            ResolvedField::ForeignKey { .. } => {
                return Err(ArchError::ForeignInPojo {
                    field: format!("{}.{}", owner.simple_name(), field.name),
                })
            }
        };
        Ok(pojo_field)
    }
}
