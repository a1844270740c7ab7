//! Per-run indexes of tables and nested types

use crate::arch::{ModelInput, PojoArch, TableArch, TableId};
use crate::descriptor::TypeName;
use crate::error::{ArchError, ArchResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Tables of a run, stored in registration order and indexed by every key of
/// their model.
#[derive(Debug, Default)]
pub struct TableArchCollector {
    tables: Vec<TableArch>,
    index: HashMap<TypeName, TableId>,
}

impl TableArchCollector {
    /// Registers a shallow table under the model type and its exposed-as type.
    pub fn register(&mut self, input: &ModelInput) -> ArchResult<TableId> {
        if let Some(key) = input.keys().find(|k| self.index.contains_key(*k)) {
            return Err(ArchError::DuplicateInput { key: key.to_string() });
        }
        let id = TableId(self.tables.len());
        self.tables.push(TableArch::shallow(id, input));
        for key in input.keys() {
            self.index.insert(key.clone(), id);
        }
        tracing::debug!(model = %input.model_name(), table = %input.sql_name(), "table registered");
        Ok(id)
    }

    pub fn get(&self, ty: &TypeName) -> Option<&TableArch> {
        match self.index.get(ty) {
            Some(id) => self.tables.get(id.index()),
            None => {
                if let Some(similar) = self.index.keys().find(|k| k.simple_name() == ty.simple_name()) {
                    tracing::warn!(
                        missing = %ty,
                        existing = %similar,
                        "table lookup missed a model with the same simple name"
                    );
                }
                None
            }
        }
    }

    pub fn by_id(&self, id: TableId) -> Option<&TableArch> {
        self.tables.get(id.index())
    }

    pub fn tables(&self) -> &[TableArch] {
        &self.tables
    }

    pub fn into_parts(self) -> (Vec<TableArch>, HashMap<TypeName, TableId>) {
        (self.tables, self.index)
    }
}

/// Nested types of a run, built once per type.
#[derive(Debug, Default)]
pub struct PojoArchCollector {
    pojos: RefCell<Vec<Arc<PojoArch>>>,
    index: RefCell<HashMap<TypeName, usize>>,
    in_progress: RefCell<Vec<TypeName>>,
}

impl PojoArchCollector {
    pub fn get(&self, ty: &TypeName) -> Option<Arc<PojoArch>> {
        let index = self.index.borrow();
        let position = *index.get(ty)?;
        self.pojos.borrow().get(position).cloned()
    }

    /// The pojo built for `ty`, computing it on first request. A type requested
    /// again while its own computation runs is a recursive nesting.
    pub fn get_or_compute<F>(&self, ty: &TypeName, compute: F) -> ArchResult<Arc<PojoArch>>
    where
        F: FnOnce() -> ArchResult<PojoArch>,
    {
        if let Some(pojo) = self.get(ty) {
            return Ok(pojo);
        }
        {
            let in_progress = self.in_progress.borrow();
            if in_progress.contains(ty) {
                let path: Vec<String> = in_progress
                    .iter()
                    .chain(std::iter::once(ty))
                    .map(ToString::to_string)
                    .collect();
                return Err(ArchError::RecursivePojo {
                    pojo: ty.to_string(),
                    path: path.join(" -> "),
                });
            }
        }

        self.in_progress.borrow_mut().push(ty.clone());
        let computed = compute();
        self.in_progress.borrow_mut().pop();
        let pojo = Arc::new(computed?);

        let mut pojos = self.pojos.borrow_mut();
        self.index.borrow_mut().insert(ty.clone(), pojos.len());
        pojos.push(Arc::clone(&pojo));
        tracing::debug!(pojo = %ty, columns = pojo.columns().len(), "pojo built");
        Ok(pojo)
    }

    pub fn len(&self) -> usize {
        self.pojos.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collected pojos in the order they were first completed.
    pub fn into_pojos(self) -> Vec<Arc<PojoArch>> {
        self.pojos.into_inner()
    }
}
