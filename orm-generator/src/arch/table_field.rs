//! Resolved table fields
//!
//! Every model field becomes exactly one [`TableField`]: a single column, several
//! columns written through an adapter, or a foreign key column pointing at another
//! table of the run.

use super::{Column, Defaults, ModelField, PojoArch, TableId};
use crate::adapters::AdapterApi;
use crate::error::ArchResult;
use crate::mapper::MapperApi;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags {
    pub primary: bool,
    pub unique: bool,
    pub nullable: bool,
}

/// Attributes shared by every kind of table field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMeta {
    model_name: String,
    field: ModelField,
    flags: FieldFlags,
    defaults: Defaults,
}

impl FieldMeta {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn field(&self) -> &ModelField {
        &self.field
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }
}

/// What converts a one-column field to its column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Native,
    Mapper(MapperApi),
    Adapter(AdapterApi),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneColumnField {
    meta: FieldMeta,
    column: Column,
    conversion: Conversion,
}

impl OneColumnField {
    pub fn new(
        model_name: &str,
        field: ModelField,
        flags: FieldFlags,
        column: Column,
        conversion: Conversion,
        defaults: &[String],
    ) -> ArchResult<Self> {
        Ok(Self {
            meta: FieldMeta {
                model_name: model_name.to_string(),
                field,
                flags,
                defaults: Defaults::of_one_column(defaults)?,
            },
            column,
            conversion,
        })
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn conversion(&self) -> &Conversion {
        &self.conversion
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiColumnField {
    meta: FieldMeta,
    columns: Vec<Column>,
    adapter: AdapterApi,
    pojo: Option<Arc<PojoArch>>,
}

impl MultiColumnField {
    pub fn new(
        model_name: &str,
        field: ModelField,
        flags: FieldFlags,
        columns: Vec<Column>,
        adapter: AdapterApi,
        pojo: Option<Arc<PojoArch>>,
        defaults: &[String],
    ) -> ArchResult<Self> {
        let defaults = Defaults::of_multi_columns(columns.len(), defaults)?;
        Ok(Self {
            meta: FieldMeta {
                model_name: model_name.to_string(),
                field,
                flags,
                defaults,
            },
            columns,
            adapter,
            pojo,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn adapter(&self) -> &AdapterApi {
        &self.adapter
    }

    pub fn pojo(&self) -> Option<&Arc<PojoArch>> {
        self.pojo.as_ref()
    }
}

/// A column holding the primary key of another table. Never a primary key or
/// unique itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignField {
    meta: FieldMeta,
    column: Column,
    target: TableId,
}

impl ForeignField {
    pub fn new(
        model_name: &str,
        field: ModelField,
        nullable: bool,
        column: Column,
        target: TableId,
        defaults: &[String],
    ) -> ArchResult<Self> {
        let flags = FieldFlags {
            primary: false,
            unique: false,
            nullable,
        };
        Ok(Self {
            meta: FieldMeta {
                model_name: model_name.to_string(),
                field,
                flags,
                defaults: Defaults::of_one_column(defaults)?,
            },
            column,
            target,
        })
    }

    pub fn meta(&self) -> &FieldMeta {
        &self.meta
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn target(&self) -> TableId {
        self.target
    }
}

/// Field category as reported to the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Native,
    Mapper,
    Adapter,
    Pojo,
    Foreign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableField {
    OneColumn(OneColumnField),
    MultiColumn(MultiColumnField),
    Foreign(ForeignField),
}

impl TableField {
    pub fn meta(&self) -> &FieldMeta {
        match self {
            TableField::OneColumn(f) => &f.meta,
            TableField::MultiColumn(f) => &f.meta,
            TableField::Foreign(f) => &f.meta,
        }
    }

    pub fn name(&self) -> &str {
        self.meta().field.name()
    }

    pub fn sql_name(&self) -> &str {
        self.meta().field.sql_name()
    }

    pub fn is_primary_key(&self) -> bool {
        self.meta().flags.primary
    }

    pub fn is_unique(&self) -> bool {
        self.meta().flags.unique
    }

    pub fn is_nullable(&self) -> bool {
        self.meta().flags.nullable
    }

    pub fn defaults(&self) -> &Defaults {
        &self.meta().defaults
    }

    pub fn columns(&self) -> &[Column] {
        match self {
            TableField::OneColumn(f) => std::slice::from_ref(&f.column),
            TableField::MultiColumn(f) => &f.columns,
            TableField::Foreign(f) => std::slice::from_ref(&f.column),
        }
    }

    pub fn columns_number(&self) -> usize {
        self.columns().len()
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, TableField::Foreign(_))
    }

    pub fn as_foreign(&self) -> Option<&ForeignField> {
        match self {
            TableField::Foreign(f) => Some(f),
            _ => None,
        }
    }

    pub fn mapper(&self) -> Option<&MapperApi> {
        match self {
            TableField::OneColumn(OneColumnField {
                conversion: Conversion::Mapper(mapper),
                ..
            }) => Some(mapper),
            _ => None,
        }
    }

    pub fn adapter(&self) -> Option<&AdapterApi> {
        match self {
            TableField::OneColumn(OneColumnField {
                conversion: Conversion::Adapter(adapter),
                ..
            }) => Some(adapter),
            TableField::MultiColumn(f) => Some(&f.adapter),
            _ => None,
        }
    }

    pub fn pojo(&self) -> Option<&Arc<PojoArch>> {
        match self {
            TableField::MultiColumn(f) => f.pojo(),
            _ => None,
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            TableField::OneColumn(f) => match f.conversion {
                Conversion::Native => FieldKind::Native,
                Conversion::Mapper(_) => FieldKind::Mapper,
                Conversion::Adapter(_) => FieldKind::Adapter,
            },
            TableField::MultiColumn(f) if f.pojo.is_some() => FieldKind::Pojo,
            TableField::MultiColumn(_) => FieldKind::Adapter,
            TableField::Foreign(_) => FieldKind::Foreign,
        }
    }
}
