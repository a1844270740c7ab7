//! Per-column default value expressions

use crate::error::{ArchError, ArchResult};
use serde::Serialize;

/// One optional SQL default expression per column of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Defaults(Vec<Option<String>>);

impl Defaults {
    pub fn of_one_column(values: &[String]) -> ArchResult<Self> {
        match values {
            [] => Ok(Self(vec![None])),
            [value] => Ok(Self(vec![Some(value.clone())])),
            _ => Err(ArchError::TooManyDefaults { values: values.to_vec() }),
        }
    }

    pub fn of_multi_columns(columns: usize, values: &[String]) -> ArchResult<Self> {
        if columns == 1 {
            return Self::of_one_column(values);
        }
        if values.is_empty() {
            return Ok(Self(vec![None; columns]));
        }
        if values.len() != columns {
            return Err(ArchError::DefaultsMismatch {
                columns,
                values: values.to_vec(),
            });
        }
        Ok(Self(values.iter().cloned().map(Some).collect()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|v| v.as_deref())
    }

    pub fn has_any(&self) -> bool {
        self.0.iter().any(Option::is_some)
    }
}
