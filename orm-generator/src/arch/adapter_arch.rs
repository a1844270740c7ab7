//! Adapters to generate for nested value types

use super::{Column, PojoArch};
use crate::adapters::AdapterApi;
use crate::config::NamingConfig;
use crate::descriptor::TypeName;
use std::sync::Arc;

/// One generated adapter per distinct nested type of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterArch {
    name: String,
    pojo: Arc<PojoArch>,
    api: AdapterApi,
}

impl AdapterArch {
    pub fn new(pojo: Arc<PojoArch>, naming: &NamingConfig) -> Self {
        Self {
            name: pojo.adapter_name(naming),
            api: AdapterApi::of_signature(&pojo, naming),
            pojo,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter_type(&self) -> &TypeName {
        self.api.adapter_type()
    }

    pub fn pojo(&self) -> &Arc<PojoArch> {
        &self.pojo
    }

    pub fn api(&self) -> &AdapterApi {
        &self.api
    }

    pub fn columns(&self) -> &[Column] {
        self.pojo.columns()
    }
}
