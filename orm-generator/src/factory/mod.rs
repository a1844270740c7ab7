//! The three-pass architecture builder
//!
//! ```text
//! RunInputs + TypeCatalog + AdapterRegistry + GeneratorConfig
//!     ↓
//! First pass:  register a shallow table per model (identity only)
//!     ↓
//! Second pass: resolve every field, initialize and validate each table
//!     ↓
//! Third pass:  build the requested nested types
//!     ↓
//! RunResult (tables + one adapter per nested type)
//! ```

mod collector;
mod context;
mod pojo_factory;
mod resolver;
mod table_field_factory;

pub use collector::{PojoArchCollector, TableArchCollector};
pub use resolver::ResolvedField;

use crate::adapters::AdapterRegistry;
use crate::arch::{ModelInput, RunInputs, TableId};
use crate::config::GeneratorConfig;
use crate::descriptor::TypeCatalog;
use crate::error::{ArchError, ArchResult};
use crate::result::RunResult;
use context::RunContext;
use pojo_factory::PojoArchFactory;
use table_field_factory::TableFieldFactory;

pub struct ArchFactory<'a> {
    catalog: &'a TypeCatalog,
    adapters: &'a dyn AdapterRegistry,
    config: &'a GeneratorConfig,
}

impl<'a> ArchFactory<'a> {
    pub fn new(catalog: &'a TypeCatalog, adapters: &'a dyn AdapterRegistry, config: &'a GeneratorConfig) -> Self {
        Self {
            catalog,
            adapters,
            config,
        }
    }

    pub fn build(&self, inputs: &RunInputs) -> ArchResult<RunResult> {
        let mut ctx = RunContext::new(self.catalog, self.adapters, self.config, inputs);

        // First pass: register every table so foreign keys can point anywhere
        tracing::debug!(models = inputs.models.len(), "stage 1: registering tables");
        let mut registered = Vec::with_capacity(inputs.models.len());
        for input in &inputs.models {
            let id = ctx
                .tables
                .register(input)
                .map_err(|e| e.in_model(input.model_name(), None))?;
            registered.push((id, input));
        }

        // Second pass: complete the tables
        tracing::debug!("stage 2: completing tables");
        for (id, input) in registered {
            complete_table(&ctx, id, input).map_err(|e| e.in_model(input.model_name(), None))?;
        }

        // Third pass: nested types requested on their own
        tracing::debug!(pojos = inputs.pojos.len(), "stage 3: building nested types");
        for pojo in &inputs.pojos {
            PojoArchFactory::new(&ctx)
                .build(pojo.pojo_type())
                .map_err(|e| e.in_model(pojo.pojo_type().simple_name(), None))?;
        }

        let result = RunResult::new(ctx.tables, ctx.pojos, &self.config.naming);
        tracing::info!(
            tables = result.tables().len(),
            adapters = result.adapters().len(),
            "architecture resolved"
        );
        Ok(result)
    }
}

fn complete_table(ctx: &RunContext<'_>, id: TableId, input: &ModelInput) -> ArchResult<()> {
    let table = ctx
        .tables
        .by_id(id)
        .ok_or_else(|| ArchError::UnknownType { ty: input.model_type().to_string() })?;
    let descriptor = ctx.catalog.require(input.model_type())?;
    let factory = TableFieldFactory::new(ctx);

    let fields = descriptor
        .fields
        .iter()
        .map(|field| {
            factory
                .build(input, descriptor, field)
                .map_err(|e| e.in_model(input.model_name(), Some(&field.name)))
        })
        .collect::<ArchResult<Vec<_>>>()?;

    table.initialize_or_die(fields)?;
    table.validate()?;
    tracing::debug!(table = %table.sql_name(), fields = table.fields().len(), "table completed");
    Ok(())
}
