//! Per-field annotations and the facts derived from them

use crate::descriptor::{FieldDescriptor, TypeName, TypeRef};
use crate::error::{ArchError, ArchResult};
use crate::naming;
use serde::{Deserialize, Serialize};

/// Composite column declaration. Every member is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlAnnotation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub primary: Option<bool>,
    #[serde(default)]
    pub unique: Option<bool>,
    #[serde(default)]
    pub nullable: Option<bool>,
    #[serde(default)]
    pub defaults: Option<Vec<String>>,
    #[serde(default)]
    pub via: Option<TypeName>,
}

/// One annotation attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Annotation {
    Sql(SqlAnnotation),
    Name(String),
    PrimaryKey,
    Unique,
    Null,
    /// Nullability marker from outside the ORM vocabulary.
    Nullable,
    Default(Vec<String>),
    Via(TypeName),
}

/// The column facts a field's annotations declare.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldAnnotations {
    pub sql_name: Option<String>,
    pub primary: bool,
    pub unique: bool,
    pub nullable: bool,
    pub defaults: Vec<String>,
    pub via: Option<TypeName>,
}

impl FieldAnnotations {
    /// Merges the composite and shorthand forms. Declaring one concern through both
    /// forms is an error.
    pub fn analyze(field: &FieldDescriptor) -> ArchResult<Self> {
        let composite = field.annotations.iter().find_map(|a| match a {
            Annotation::Sql(sql) => Some(sql),
            _ => None,
        });
        let has = |pred: fn(&Annotation) -> bool| field.annotations.iter().any(pred);

        let name_marker = field.annotations.iter().find_map(|a| match a {
            Annotation::Name(name) => Some(name),
            _ => None,
        });
        let default_marker = field.annotations.iter().find_map(|a| match a {
            Annotation::Default(values) => Some(values),
            _ => None,
        });
        let via_marker = field.annotations.iter().find_map(|a| match a {
            Annotation::Via(via) => Some(via),
            _ => None,
        });

        let sql_name = merge(&field.name, "name", composite.and_then(|s| s.name.as_ref()), name_marker)?;
        let defaults = merge(&field.name, "defaults", composite.and_then(|s| s.defaults.as_ref()), default_marker)?;
        let via = merge(&field.name, "via", composite.and_then(|s| s.via.as_ref()), via_marker)?;
        let primary = merge_flag(
            &field.name,
            "primary",
            composite.and_then(|s| s.primary),
            has(|a| matches!(a, Annotation::PrimaryKey)),
        )?;
        let unique = merge_flag(
            &field.name,
            "unique",
            composite.and_then(|s| s.unique),
            has(|a| matches!(a, Annotation::Unique)),
        )?;
        let nullable = merge_flag(
            &field.name,
            "nullable",
            composite.and_then(|s| s.nullable),
            has(|a| matches!(a, Annotation::Null)),
        )?;

        Ok(Self {
            sql_name: sql_name.cloned(),
            primary,
            unique,
            nullable: nullable || has(|a| matches!(a, Annotation::Nullable)) || is_nullable_type(&field.ty),
            defaults: defaults.cloned().unwrap_or_default(),
            via: via.cloned(),
        })
    }

    /// The declared sql name, else the snake_case field name.
    pub fn sql_name_or_default(&self, field_name: &str) -> ArchResult<String> {
        let name = match &self.sql_name {
            Some(name) => name.clone(),
            None => naming::to_snake_case(field_name),
        };
        naming::validate_sql_name(&name)?;
        Ok(name)
    }
}

fn merge<'a, T>(
    element: &str,
    concern: &str,
    composite: Option<&'a T>,
    shorthand: Option<&'a T>,
) -> ArchResult<Option<&'a T>> {
    match (composite, shorthand) {
        (Some(_), Some(_)) => Err(ambiguous(element, concern)),
        (first, second) => Ok(first.or(second)),
    }
}

fn merge_flag(element: &str, concern: &str, composite: Option<bool>, marker: bool) -> ArchResult<bool> {
    match (composite, marker) {
        (Some(_), true) => Err(ambiguous(element, concern)),
        (Some(flag), false) => Ok(flag),
        (None, marker) => Ok(marker),
    }
}

fn ambiguous(element: &str, concern: &str) -> ArchError {
    ArchError::AmbiguousAnnotations {
        element: element.to_string(),
        concern: concern.to_string(),
    }
}

/// `Option<_>` and `Cell<Option<_>>` hold no value for SQL NULL.
pub fn is_nullable_type(ty: &TypeRef) -> bool {
    ty.option_inner().is_some() || ty.cell_inner().is_some_and(|inner| inner.option_inner().is_some())
}

/// Names that identify a model, used by the primary key convention.
#[derive(Debug, Clone, Copy)]
pub struct ModelIdentity<'a> {
    pub model_name: &'a str,
    pub model_type: &'a TypeName,
    pub exposed_as: Option<&'a TypeName>,
}

/// A field is the primary key when declared so, or when its name is `id` or
/// `<model>_id` for any of the names identifying the model.
pub fn is_primary_key(field: &FieldDescriptor, annotations: &FieldAnnotations, model: ModelIdentity<'_>) -> bool {
    if annotations.primary || field.name == "id" {
        return true;
    }
    let candidates = [
        Some(model.model_name),
        Some(model.model_type.simple_name()),
        model.exposed_as.map(TypeName::simple_name),
    ];
    candidates
        .into_iter()
        .flatten()
        .any(|name| field.name == naming::id_field_name(name))
}
