//! Generator configuration, loaded from TOML

use crate::error::ConfigError;
use crate::naming;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONFIG STRUCTS
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub inline_mappers: InlineMappersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct NamingConfig {
    /// Generated table type name: `<Model><table_suffix>`.
    pub table_suffix: String,
    /// Conventional adapter name and generated adapter name: `<Type><adapter_suffix>`.
    pub adapter_suffix: String,
    /// Foreign key column: `<field_sql_name>_<foreign_key_suffix>`.
    pub foreign_key_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            table_suffix: "Table".to_string(),
            adapter_suffix: "JdbcAdapter".to_string(),
            foreign_key_suffix: "id".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct InlineMappersConfig {
    pub enums: bool,
    pub optionals: bool,
    pub cells: bool,
}

impl Default for InlineMappersConfig {
    fn default() -> Self {
        Self {
            enums: true,
            optionals: true,
            cells: true,
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let suffixes = [
            ("naming.table_suffix", &self.naming.table_suffix),
            ("naming.adapter_suffix", &self.naming.adapter_suffix),
            ("naming.foreign_key_suffix", &self.naming.foreign_key_suffix),
        ];
        for (field, suffix) in suffixes {
            // a suffix must keep `X<suffix>` a valid name
            if suffix.is_empty() || !naming::is_valid_identifier(&format!("X{suffix}")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("`{suffix}` is not a valid name suffix"),
                });
            }
        }
        Ok(())
    }
}
