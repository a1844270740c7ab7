//! Nested value types stored inline in their owner's table

use super::{Column, ModelField};
use crate::adapters::AdapterApi;
use crate::config::NamingConfig;
use crate::descriptor::TypeName;
use crate::error::ArchResult;
use crate::mapper::MapperApi;
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum PojoField {
    Native { field: ModelField, column: Column },
    Mapper { field: ModelField, column: Column, mapper: MapperApi },
    Adapter { field: ModelField, columns: Vec<Column>, adapter: AdapterApi },
    /// Columns of a nested type, already prefixed by this field's sql name.
    Nested { field: ModelField, pojo: Arc<PojoArch> },
}

impl PojoField {
    pub fn model_field(&self) -> &ModelField {
        match self {
            PojoField::Native { field, .. }
            | PojoField::Mapper { field, .. }
            | PojoField::Adapter { field, .. }
            | PojoField::Nested { field, .. } => field,
        }
    }

    fn reattached_to(&self, prefix: &str) -> ArchResult<PojoField> {
        let reattached = match self {
            PojoField::Native { field, column } => PojoField::Native {
                field: field.clone(),
                column: column.prefixed_name(prefix)?,
            },
            PojoField::Mapper { field, column, mapper } => PojoField::Mapper {
                field: field.clone(),
                column: column.prefixed_name(prefix)?,
                mapper: mapper.clone(),
            },
            PojoField::Adapter { field, columns, adapter } => PojoField::Adapter {
                field: field.clone(),
                columns: columns
                    .iter()
                    .map(|c| c.prefixed_name(prefix))
                    .collect::<ArchResult<_>>()?,
                adapter: adapter.clone(),
            },
            PojoField::Nested { field, pojo } => PojoField::Nested {
                field: field.clone(),
                pojo: Arc::new(pojo.reattached_to(prefix)?),
            },
        };
        Ok(reattached)
    }
}

/// A nested value type: its fields in declaration order and the flattened
/// columns, computed once.
#[derive(Debug, Clone)]
pub struct PojoArch {
    pojo_type: TypeName,
    fields: Vec<PojoField>,
    columns: OnceCell<Vec<Column>>,
}

impl PojoArch {
    pub fn new(pojo_type: TypeName, fields: Vec<PojoField>) -> Self {
        Self {
            pojo_type,
            fields,
            columns: OnceCell::new(),
        }
    }

    pub fn pojo_type(&self) -> &TypeName {
        &self.pojo_type
    }

    pub fn fields(&self) -> &[PojoField] {
        &self.fields
    }

    pub fn columns(&self) -> &[Column] {
        self.columns.get_or_init(|| {
            self.fields
                .iter()
                .flat_map(|field| match field {
                    PojoField::Native { column, .. } | PojoField::Mapper { column, .. } => vec![column.clone()],
                    PojoField::Adapter { columns, .. } => columns.clone(),
                    PojoField::Nested { pojo, .. } => pojo.columns().to_vec(),
                })
                .collect()
        })
    }

    pub fn adapter_name(&self, naming: &NamingConfig) -> String {
        format!("{}{}", self.pojo_type.simple_name(), naming.adapter_suffix)
    }

    pub fn adapter_type(&self, naming: &NamingConfig) -> TypeName {
        self.pojo_type.sibling(&self.adapter_name(naming))
    }

    /// A copy whose column names start with `prefix`, nested fields included.
    pub fn reattached_to(&self, prefix: &str) -> ArchResult<PojoArch> {
        let fields = self
            .fields
            .iter()
            .map(|f| f.reattached_to(prefix))
            .collect::<ArchResult<_>>()?;
        Ok(PojoArch::new(self.pojo_type.clone(), fields))
    }
}

impl PartialEq for PojoArch {
    fn eq(&self, other: &Self) -> bool {
        self.pojo_type == other.pojo_type && self.fields == other.fields
    }
}
