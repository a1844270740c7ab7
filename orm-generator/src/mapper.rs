//! Field <-> column conversions through a mapper
//!
//! A mapper is either a described type implementing `Reversible<U, V>` (one side
//! the field type, the other a native column type) or one of the inline
//! conversions synthesized for enums, `Option<T>` and `Cell<T>`.

use crate::arch::Column;
use crate::config::InlineMappersConfig;
use crate::descriptor::{TypeCatalog, TypeDescriptor, TypeName, TypeRef};
use crate::error::{ArchError, ArchResult};
use crate::jdbc::JdbcType;
use serde::Serialize;

const REVERSIBLE: &str = "Reversible";
const NULLABLE_SUFFIX: &str = "_nullable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapperKind {
    /// `jdbc_first`: the column type is the first argument of `Reversible`.
    Existing { mapper_type: TypeName, jdbc_first: bool },
    InlineEnum { enum_type: TypeName, variants: Vec<String> },
    InlineOption,
    InlineCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapperApi {
    kind: MapperKind,
    jdbc_type: JdbcType,
    nullable: bool,
}

impl MapperApi {
    pub fn is_mapper(descriptor: &TypeDescriptor) -> bool {
        descriptor.implemented(REVERSIBLE).is_some()
    }

    /// Inspects `Reversible<U, V>` on `mapper` against the field type.
    pub fn from_mapper_type(mapper: &TypeDescriptor, field_type: &TypeRef, nullable: bool) -> ArchResult<Self> {
        let failed = || ArchError::MapperArguments {
            mapper: mapper.name.to_string(),
            field: field_type.to_string(),
        };
        let reversible = mapper.implemented(REVERSIBLE).ok_or_else(failed)?;
        let [first, second] = reversible.args() else {
            return Err(failed());
        };

        let (jdbc_type, jdbc_first) = if first == field_type {
            (JdbcType::find_by_native_type(second).ok_or_else(failed)?, false)
        } else if second == field_type {
            (JdbcType::find_by_native_type(first).ok_or_else(failed)?, true)
        } else {
            return Err(failed());
        };

        Ok(Self {
            kind: MapperKind::Existing {
                mapper_type: mapper.name.clone(),
                jdbc_first,
            },
            jdbc_type,
            nullable,
        })
    }

    pub fn inline_enum(descriptor: &TypeDescriptor) -> Self {
        Self {
            kind: MapperKind::InlineEnum {
                enum_type: descriptor.name.clone(),
                variants: descriptor.variants.clone(),
            },
            jdbc_type: JdbcType::Int,
            nullable: false,
        }
    }

    pub fn inline_option(jdbc_type: JdbcType) -> Self {
        Self {
            kind: MapperKind::InlineOption,
            jdbc_type,
            nullable: true,
        }
    }

    pub fn inline_cell(jdbc_type: JdbcType, nullable: bool) -> Self {
        Self {
            kind: MapperKind::InlineCell,
            jdbc_type,
            nullable,
        }
    }

    pub fn kind(&self) -> &MapperKind {
        &self.kind
    }

    pub fn jdbc_type(&self) -> JdbcType {
        self.jdbc_type
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_inline(&self) -> bool {
        !matches!(self.kind, MapperKind::Existing { .. })
    }

    pub fn mapper_column(&self, field_sql_name: &str) -> ArchResult<Column> {
        Column::new(field_sql_name, self.jdbc_type)
    }

    /// Expression turning a column value into the field value.
    pub fn jdbc_to_field(&self, expr: &str) -> String {
        match &self.kind {
            MapperKind::Existing { mapper_type, jdbc_first } => {
                let call = if *jdbc_first { "forward" } else { "backward" };
                self.existing_call(mapper_type, call, expr)
            }
            MapperKind::InlineEnum { enum_type, variants } => {
                let values: Vec<String> = variants.iter().map(|v| format!("{enum_type}::{v}")).collect();
                format!("[{}][{expr} as usize]", values.join(", "))
            }
            MapperKind::InlineOption => format!("Option::from({expr})"),
            MapperKind::InlineCell => format!("std::cell::Cell::new({expr})"),
        }
    }

    /// Expression turning a field value into the column value.
    pub fn field_to_jdbc(&self, expr: &str) -> String {
        match &self.kind {
            MapperKind::Existing { mapper_type, jdbc_first } => {
                let call = if *jdbc_first { "backward" } else { "forward" };
                self.existing_call(mapper_type, call, expr)
            }
            MapperKind::InlineEnum { .. } => format!("{expr} as i32"),
            MapperKind::InlineOption => format!("{expr}.clone()"),
            MapperKind::InlineCell => format!("{expr}.get()"),
        }
    }

    fn existing_call(&self, mapper_type: &TypeName, call: &str, expr: &str) -> String {
        let suffix = if self.nullable { NULLABLE_SUFFIX } else { "" };
        format!("{mapper_type}::{call}{suffix}({expr})")
    }
}

// ============================================================================
// INLINE MAPPERS
// ============================================================================

/// Synthesizes mappers for field types that need no explicit mapper.
#[derive(Debug, Clone, Default)]
pub struct InlineMappers {
    config: InlineMappersConfig,
}

impl InlineMappers {
    pub fn new(config: InlineMappersConfig) -> Self {
        Self { config }
    }

    pub fn try_inline(&self, field_type: &TypeRef, catalog: &TypeCatalog, nullable: bool) -> Option<MapperApi> {
        if self.config.enums {
            if let Some(descriptor) = catalog.get_ref(field_type).filter(|d| d.is_enum()) {
                return Some(MapperApi::inline_enum(descriptor));
            }
        }
        if self.config.optionals {
            if let Some(jdbc) = field_type.option_inner().and_then(JdbcType::find_by_native_type) {
                return Some(MapperApi::inline_option(jdbc));
            }
        }
        if self.config.cells {
            if let Some(inner) = field_type.cell_inner() {
                if let Some(jdbc) = JdbcType::find_by_native_type(inner) {
                    return Some(MapperApi::inline_cell(jdbc, nullable));
                }
                // `Cell<Option<T>>` holds a nullable column
                if let Some(jdbc) = inner.option_inner().and_then(JdbcType::find_by_native_type) {
                    return Some(MapperApi::inline_cell(jdbc, true));
                }
            }
        }
        None
    }
}
