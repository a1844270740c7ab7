//! Adapters: types that spread one field over one or more native columns

use crate::arch::{Column, PojoArch};
use crate::config::NamingConfig;
use crate::descriptor::{TypeCatalog, TypeDescriptor, TypeName};
use crate::error::{ArchError, ArchResult};
use crate::jdbc::JdbcType;
use crate::naming;
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// DISCOVERY
// ============================================================================

/// Finds the adapter converting a field type.
pub trait AdapterRegistry {
    fn lookup(&self, ty: &TypeName) -> Option<TypeName>;
}

/// Looks adapters up in the catalog: an explicit `adapts` list on the adapter
/// descriptor wins over the `<Type><adapter_suffix>` naming convention.
#[derive(Debug)]
pub struct CatalogAdapterRegistry<'a> {
    catalog: &'a TypeCatalog,
    explicit: HashMap<TypeName, TypeName>,
    suffix: String,
}

impl<'a> CatalogAdapterRegistry<'a> {
    pub fn new(catalog: &'a TypeCatalog, naming: &NamingConfig) -> Self {
        let explicit = catalog
            .iter()
            .flat_map(|adapter| adapter.adapts.iter().map(|ty| (ty.clone(), adapter.name.clone())))
            .collect();
        Self {
            catalog,
            explicit,
            suffix: naming.adapter_suffix.clone(),
        }
    }
}

impl AdapterRegistry for CatalogAdapterRegistry<'_> {
    fn lookup(&self, ty: &TypeName) -> Option<TypeName> {
        if let Some(adapter) = self.explicit.get(ty) {
            return Some(adapter.clone());
        }
        let conventional = ty.sibling(&format!("{}{}", ty.simple_name(), self.suffix));
        self.catalog.get(&conventional).map(|d| d.name.clone())
    }
}

// ============================================================================
// ADAPTER API
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    /// One column, converted by `to_value_object`.
    Single,
    /// Several columns, written by `fill_array_values`.
    Array,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterParam {
    pub name: String,
    pub jdbc_type: JdbcType,
}

/// The conversion surface of an adapter: its `create_instance` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterApi {
    adapter_type: TypeName,
    params: Vec<AdapterParam>,
    kind: AdapterKind,
    generated: bool,
}

impl AdapterApi {
    pub fn of_descriptor(adapter: &TypeDescriptor) -> ArchResult<Self> {
        let invalid = |reason: String| ArchError::InvalidAdapter {
            adapter: adapter.name.to_string(),
            reason,
        };

        let create = adapter
            .methods_named("create_instance")
            .find(|m| m.is_static)
            .ok_or_else(|| invalid("no static `create_instance` method".to_string()))?;
        if create.params.is_empty() {
            return Err(invalid("`create_instance` takes no parameters".to_string()));
        }
        let params = create
            .params
            .iter()
            .map(|p| {
                JdbcType::find_by_native_type(&p.ty)
                    .map(|jdbc_type| AdapterParam {
                        name: p.name.clone(),
                        jdbc_type,
                    })
                    .ok_or_else(|| {
                        invalid(format!(
                            "`create_instance` parameter `{}` has non-native type `{}`",
                            p.name, p.ty
                        ))
                    })
            })
            .collect::<ArchResult<Vec<_>>>()?;

        let has = |name: &str| adapter.methods_named(name).next().is_some();
        let kind = if params.len() == 1 && has("to_value_object") {
            AdapterKind::Single
        } else if has("fill_array_values") && has("values_count") {
            AdapterKind::Array
        } else if params.len() == 1 {
            return Err(invalid("missing `to_value_object`".to_string()));
        } else {
            return Err(invalid("missing `fill_array_values` or `values_count`".to_string()));
        };

        Ok(Self {
            adapter_type: adapter.name.clone(),
            params,
            kind,
            generated: false,
        })
    }

    pub fn is_valid(adapter: &TypeDescriptor) -> bool {
        Self::of_descriptor(adapter).is_ok()
    }

    /// The adapter generated for a nested value type.
    pub fn of_signature(pojo: &PojoArch, naming: &NamingConfig) -> Self {
        let params: Vec<AdapterParam> = pojo
            .columns()
            .iter()
            .map(|c| AdapterParam {
                name: c.sql_name().to_string(),
                jdbc_type: c.jdbc_type(),
            })
            .collect();
        let kind = if params.len() == 1 {
            AdapterKind::Single
        } else {
            AdapterKind::Array
        };
        Self {
            adapter_type: pojo.adapter_type(naming),
            params,
            kind,
            generated: true,
        }
    }

    pub fn adapter_type(&self) -> &TypeName {
        &self.adapter_type
    }

    pub fn params(&self) -> &[AdapterParam] {
        &self.params
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn columns_number(&self) -> usize {
        self.params.len()
    }

    /// `[field_sql]` for one parameter, `field_sql_<param>` for each of several.
    pub fn adapter_columns(&self, field_sql_name: &str) -> ArchResult<Vec<Column>> {
        match self.params.as_slice() {
            [single] => Ok(vec![Column::new(field_sql_name, single.jdbc_type)?]),
            params => params
                .iter()
                .map(|p| {
                    let name = naming::concat_sql_names(field_sql_name, &naming::to_snake_case(&p.name));
                    Column::new(name, p.jdbc_type)
                })
                .collect(),
        }
    }

    /// Expression building the field value from column values.
    pub fn jdbc_to_field(&self, args: &[String]) -> String {
        format!("{}::create_instance({})", self.adapter_type, args.join(", "))
    }

    /// Expression writing the field value to its column value(s).
    pub fn field_to_jdbc(&self, expr: &str) -> String {
        match self.kind {
            AdapterKind::Single => format!("{}::to_value_object({expr})", self.adapter_type),
            AdapterKind::Array => format!("{}::fill_array_values({expr}, values, start)", self.adapter_type),
        }
    }
}
