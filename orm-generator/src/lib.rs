//! ORM Generator - Table Architecture Resolver
//!
//! Turns described model types into a fully typed table architecture: columns
//! with their JDBC types, foreign keys between tables, nested value types and the
//! adapters and mappers that convert fields to columns.
//!
//! Architecture:
//! ```text
//! TypeCatalog (model / value / mapper / adapter descriptors)
//!     ↓
//! Annotations + FieldResolver (native, foreign, via, inline, adapter, pojo)
//!     ↓
//! ArchFactory (register tables → complete tables → nested types)
//!     ↓
//! RunResult (TableArch / PojoArch / AdapterArch graph)
//!     ↓
//! JSON export, CREATE TABLE statements
//! ```

pub mod adapters;
pub mod annotations;
pub mod arch;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod jdbc;
pub mod mapper;
pub mod naming;
pub mod result;
mod schema;

// Re-export key types for convenience
pub use adapters::{AdapterApi, AdapterKind, AdapterRegistry, CatalogAdapterRegistry};
pub use annotations::{Annotation, FieldAnnotations, SqlAnnotation};
pub use arch::*;
pub use config::{GeneratorConfig, InlineMappersConfig, NamingConfig};
pub use descriptor::{
    BridgeDeclaration, FieldDescriptor, MethodDescriptor, ModelAnnotation, ParamDescriptor, TypeCatalog,
    TypeDescriptor, TypeKind, TypeName, TypeRef, Visibility,
};
pub use error::{ArchError, ArchResult, ConfigError};
pub use factory::ArchFactory;
pub use jdbc::JdbcType;
pub use mapper::{InlineMappers, MapperApi, MapperKind};
pub use result::RunResult;
