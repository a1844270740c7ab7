//! How generated code reaches a model field

use crate::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor, TypeRef, Visibility};
use crate::error::{ArchError, ArchResult};
use crate::jdbc::JdbcType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Accessor {
    Field(String),
    Getter(String),
}

impl Accessor {
    /// `user.name` or `user.get_name()`.
    pub fn render(&self, receiver: &str) -> String {
        match self {
            Accessor::Field(name) => format!("{receiver}.{name}"),
            Accessor::Getter(method) => format!("{receiver}.{method}()"),
        }
    }
}

/// A field of a model or nested type, with its column name and accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelField {
    name: String,
    sql_name: String,
    accessor: Accessor,
    ty: TypeRef,
}

impl ModelField {
    pub fn of(owner: &TypeDescriptor, field: &FieldDescriptor, sql_name: String) -> ArchResult<Self> {
        Ok(Self {
            name: field.name.clone(),
            sql_name,
            accessor: find_accessor(owner, field)?,
            ty: field.ty.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sql_name(&self) -> &str {
        &self.sql_name
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

fn find_accessor(owner: &TypeDescriptor, field: &FieldDescriptor) -> ArchResult<Accessor> {
    if field.is_public() {
        return Ok(Accessor::Field(field.name.clone()));
    }
    let mut candidates = vec![field.name.clone(), format!("get_{}", field.name)];
    if field.ty.path() == "bool" {
        candidates.push(format!("is_{}", field.name));
    }
    owner
        .methods
        .iter()
        .find(|m| is_getter(m, &field.ty) && candidates.contains(&m.name))
        .map(|m| Accessor::Getter(m.name.clone()))
        .ok_or_else(|| ArchError::NoAccessor {
            model: owner.simple_name().to_string(),
            field: field.name.clone(),
        })
}

fn is_getter(method: &MethodDescriptor, field_type: &TypeRef) -> bool {
    let returns_field = match &method.returns {
        Some(returns) => {
            returns == field_type
                || JdbcType::find_by_native_type(returns)
                    .is_some_and(|jdbc| JdbcType::find_by_native_type(field_type) == Some(jdbc))
        }
        None => false,
    };
    !method.is_static && method.visibility == Visibility::Public && method.params.is_empty() && returns_field
}
