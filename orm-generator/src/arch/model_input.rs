//! What a run is asked to resolve

use super::BridgeInfo;
use crate::annotations::ModelIdentity;
use crate::config::NamingConfig;
use crate::descriptor::{TypeCatalog, TypeDescriptor, TypeName};
use crate::error::{ArchError, ArchResult};
use crate::naming;

/// One model type to turn into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInput {
    model_type: TypeName,
    exposed_as: Option<TypeName>,
    model_name: String,
    sql_name: String,
    table_type_name: String,
    bridge: Option<BridgeInfo>,
}

impl ModelInput {
    pub fn new(
        model_type: TypeName,
        exposed_as: Option<TypeName>,
        model_name: impl Into<String>,
        sql_name: impl Into<String>,
        table_type_name: impl Into<String>,
    ) -> ArchResult<Self> {
        let model_name = model_name.into();
        let sql_name = sql_name.into();
        let table_type_name = table_type_name.into();
        naming::validate_identifier(&model_name)?;
        naming::validate_sql_name(&sql_name)?;
        naming::validate_identifier(&table_type_name)?;
        Ok(Self {
            model_type,
            exposed_as,
            model_name,
            sql_name,
            table_type_name,
            bridge: None,
        })
    }

    /// Names from the model declaration, defaulting to the type's simple name,
    /// its snake_case form and `<Model><table_suffix>`.
    pub fn from_descriptor(descriptor: &TypeDescriptor, naming_config: &NamingConfig) -> ArchResult<Self> {
        let declared = descriptor.model.clone().unwrap_or_default();
        let model_name = declared
            .model_name
            .unwrap_or_else(|| descriptor.simple_name().to_string());
        let sql_name = declared
            .sql_name
            .unwrap_or_else(|| naming::to_snake_case(&model_name));
        let table_type_name = declared
            .table_type_name
            .unwrap_or_else(|| format!("{}{}", model_name, naming_config.table_suffix));
        let input = Self::new(
            descriptor.name.clone(),
            declared.exposed_as,
            model_name,
            sql_name,
            table_type_name,
        )?;
        Ok(match &descriptor.bridge {
            Some(bridge) => input.with_bridge(&bridge.left, &bridge.right),
            None => input,
        })
    }

    pub fn with_bridge(mut self, left: &str, right: &str) -> Self {
        self.bridge = Some(BridgeInfo {
            left: left.to_string(),
            right: right.to_string(),
        });
        self
    }

    pub fn model_type(&self) -> &TypeName {
        &self.model_type
    }

    pub fn exposed_as(&self) -> Option<&TypeName> {
        self.exposed_as.as_ref()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn table_type_name(&self) -> &str {
        &self.table_type_name
    }

    pub fn bridge(&self) -> Option<&BridgeInfo> {
        self.bridge.as_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeName> {
        std::iter::once(&self.model_type).chain(self.exposed_as.as_ref())
    }

    pub fn identity(&self) -> ModelIdentity<'_> {
        ModelIdentity {
            model_name: &self.model_name,
            model_type: &self.model_type,
            exposed_as: self.exposed_as.as_ref(),
        }
    }
}

/// A nested value type that gets a generated adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PojoInput {
    pojo_type: TypeName,
}

impl PojoInput {
    pub fn new(pojo_type: impl Into<TypeName>) -> Self {
        Self {
            pojo_type: pojo_type.into(),
        }
    }

    pub fn pojo_type(&self) -> &TypeName {
        &self.pojo_type
    }
}

/// Everything one run resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInputs {
    pub models: Vec<ModelInput>,
    pub pojos: Vec<PojoInput>,
}

impl RunInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every catalog type carrying a model declaration, in catalog order.
    pub fn from_catalog(catalog: &TypeCatalog, naming_config: &NamingConfig) -> ArchResult<Self> {
        let models = catalog
            .iter()
            .filter(|d| d.model.is_some())
            .map(|d| ModelInput::from_descriptor(d, naming_config))
            .collect::<ArchResult<_>>()?;
        Ok(Self {
            models,
            pojos: Vec::new(),
        })
    }

    pub fn with_model(mut self, model: ModelInput) -> Self {
        self.models.push(model);
        self
    }

    pub fn with_pojo(mut self, pojo: PojoInput) -> Self {
        self.pojos.push(pojo);
        self
    }

    pub fn find_model(&self, ty: &TypeName) -> Option<&ModelInput> {
        self.models.iter().find(|m| m.keys().any(|k| k == ty))
    }

    pub fn require_model(&self, ty: &TypeName) -> ArchResult<&ModelInput> {
        self.find_model(ty).ok_or_else(|| ArchError::UnknownType { ty: ty.to_string() })
    }
}
