//! Error types for architecture resolution and generator configuration

use thiserror::Error;

/// Errors raised while turning model descriptors into table architecture.
///
/// Anything raised while a model table is completed is wrapped once in
/// [`ArchError::InModel`], which names the model and, when known, the field.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ArchError {
    #[error("Invalid sql name: `{name}`")]
    InvalidSqlName { name: String },

    #[error("Invalid identifier: `{name}`")]
    InvalidIdentifier { name: String },

    #[error("Invalid type reference: `{text}`")]
    InvalidTypeRef { text: String },

    #[error("Invalid type catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Duplicate input: `{key}`")]
    DuplicateInput { key: String },

    #[error("Type `{ty}` is not described in the catalog")]
    UnknownType { ty: String },

    #[error("Element `{element}` contains ambiguous annotations for {concern}")]
    AmbiguousAnnotations { element: String, concern: String },

    #[error("Defaults for a column contains more than one column value: {values:?}")]
    TooManyDefaults { values: Vec<String> },

    #[error("Defaults number does not match the columns number {columns}: {values:?}")]
    DefaultsMismatch { columns: usize, values: Vec<String> },

    #[error("Model type `{model}` exposes no visible getter for field `{field}`")]
    NoAccessor { model: String, field: String },

    #[error(
        "Invalid foreign key reference type: `{wrapper}`. \
         Supported types: Foreign, ForeignInt, ForeignLong, ForeignObj"
    )]
    UnsupportedForeignWrapper { wrapper: String },

    #[error(
        "Foreign model `{foreign}` referenced from `{model}` model is missing \
         in the input set for table generation"
    )]
    ForeignModelMissing { foreign: String, model: String },

    #[error("Foreign model `{foreign}` does not have a primary key. Expected key type: `{key_type}`")]
    ForeignNoPrimaryKey { foreign: String, key_type: String },

    #[error("Foreign model `{foreign}` has more than one primary key: {fields:?}")]
    ForeignMultiplePrimaryKeys { foreign: String, fields: Vec<String> },

    #[error(
        "Foreign model `{foreign}` primary key `{pk_type}` doesn't match the foreign key. \
         Expected key type: `{key_type}`"
    )]
    ForeignKeyMismatch { foreign: String, pk_type: String, key_type: String },

    #[error("Foreign model `{foreign}` primary key `{pk_type}` must be natively supported type")]
    ForeignKeyNotNative { foreign: String, pk_type: String },

    #[error("`via` type must be either a valid mapper or adapter: `{via}`")]
    InvalidVia { via: String },

    #[error("Failed to identify mapper class arguments: mapper={mapper}, field={field}")]
    MapperArguments { mapper: String, field: String },

    #[error("Invalid adapter `{adapter}`: {reason}")]
    InvalidAdapter { adapter: String, reason: String },

    #[error("Model holds a collection `{ty}` without a mapper or adapter")]
    CollectionField { ty: String },

    #[error("Model holds an interface `{ty}` without a mapper or adapter")]
    InterfaceField { ty: String },

    #[error("Model holds an array `{ty}` without a mapper or adapter")]
    ArrayField { ty: String },

    #[error("Model holds a raw `{ty}` without a mapper or adapter")]
    RawAnyField { ty: String },

    #[error("Type `{ty}` of field `{field}` is not described")]
    UndescribedType { ty: String, field: String },

    #[error("Foreign keys in nested types are not supported: `{field}`")]
    ForeignInPojo { field: String },

    #[error("Recursive nesting of `{pojo}`: {path}")]
    RecursivePojo { pojo: String, path: String },

    #[error("Table `{table}` is already initialized")]
    AlreadyInitialized { table: String },

    #[error("Table `{table}` has more than one primary key: {fields:?}")]
    MultiplePrimaryKeys { table: String, fields: Vec<String> },

    #[error("Table `{table}` has duplicate column `{column}`")]
    DuplicateColumn { table: String, column: String },

    #[error("Invalid bridge `{table}`: {reason}")]
    InvalidBridge { table: String, reason: String },

    #[error("Error while processing the model: `{}`: {source}", located(.model, .field))]
    InModel {
        model: String,
        field: Option<String>,
        source: Box<ArchError>,
    },
}

fn located(model: &str, field: &Option<String>) -> String {
    match field {
        Some(field) => format!("{model}.{field}"),
        None => model.to_string(),
    }
}

impl ArchError {
    /// Attaches model/field context. An already attributed error is returned as is.
    pub fn in_model(self, model: &str, field: Option<&str>) -> ArchError {
        match self {
            ArchError::InModel { .. } => self,
            other => ArchError::InModel {
                model: model.to_string(),
                field: field.map(str::to_string),
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, skipping attribution wrappers.
    pub fn root(&self) -> &ArchError {
        match self {
            ArchError::InModel { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for architecture resolution.
pub type ArchResult<T> = Result<T, ArchError>;

/// Generator configuration errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_model_rendering() {
        let err = ArchError::InvalidSqlName { name: "1x".to_string() }.in_model("User", Some("name"));
        assert_eq!(
            err.to_string(),
            "Error while processing the model: `User.name`: Invalid sql name: `1x`"
        );

        let err = ArchError::DuplicateColumn {
            table: "user".to_string(),
            column: "id".to_string(),
        }
        .in_model("User", None);
        assert!(err.to_string().starts_with("Error while processing the model: `User`: "));
    }

    #[test]
    fn test_in_model_wraps_once() {
        let inner = ArchError::InvalidVia { via: "X".to_string() };
        let once = inner.clone().in_model("Song", Some("artist"));
        let twice = once.clone().in_model("Other", None);
        assert_eq!(once, twice);
        assert_eq!(twice.root(), &inner);
    }
}
