//! The resolved architecture: tables, fields, columns and nested types

pub mod adapter_arch;
pub mod column;
pub mod defaults;
pub mod model_field;
pub mod model_input;
pub mod pojo_arch;
pub mod table_arch;
pub mod table_field;

pub use adapter_arch::AdapterArch;
pub use column::{Column, PrefixedColumn};
pub use defaults::Defaults;
pub use model_field::{Accessor, ModelField};
pub use model_input::{ModelInput, PojoInput, RunInputs};
pub use pojo_arch::{PojoArch, PojoField};
pub use table_arch::{BridgeInfo, ReadFollow, TableArch, TableId};
pub use table_field::{
    Conversion, FieldFlags, FieldKind, FieldMeta, ForeignField, MultiColumnField, OneColumnField, TableField,
};
