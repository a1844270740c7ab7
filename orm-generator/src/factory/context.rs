//! State shared by the passes of one run

use super::collector::{PojoArchCollector, TableArchCollector};
use crate::adapters::AdapterRegistry;
use crate::arch::RunInputs;
use crate::config::GeneratorConfig;
use crate::descriptor::TypeCatalog;
use crate::mapper::InlineMappers;

/// Owned by a single run; the collectors are its only mutable state.
pub(crate) struct RunContext<'a> {
    pub catalog: &'a TypeCatalog,
    pub adapters: &'a dyn AdapterRegistry,
    pub config: &'a GeneratorConfig,
    pub inputs: &'a RunInputs,
    pub inline: InlineMappers,
    pub tables: TableArchCollector,
    pub pojos: PojoArchCollector,
}

impl<'a> RunContext<'a> {
    pub fn new(
        catalog: &'a TypeCatalog,
        adapters: &'a dyn AdapterRegistry,
        config: &'a GeneratorConfig,
        inputs: &'a RunInputs,
    ) -> Self {
        Self {
            catalog,
            adapters,
            config,
            inputs,
            inline: InlineMappers::new(config.inline_mappers.clone()),
            tables: TableArchCollector::default(),
            pojos: PojoArchCollector::default(),
        }
    }
}
