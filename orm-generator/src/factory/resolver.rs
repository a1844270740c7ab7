//! Classifies a field into the single way it is stored

use super::context::RunContext;
use crate::adapters::AdapterApi;
use crate::annotations::{is_primary_key, FieldAnnotations};
use crate::arch::{TableArch, TableId};
use crate::descriptor::{FieldDescriptor, TypeName, TypeRef};
use crate::error::{ArchError, ArchResult};
use crate::jdbc::JdbcType;
use crate::mapper::MapperApi;

const FOREIGN: &str = "Foreign";
const FOREIGN_WRAPPERS: [&str; 4] = ["Foreign", "ForeignInt", "ForeignLong", "ForeignObj"];
const COLLECTIONS: [&str; 10] = [
    "Vec",
    "VecDeque",
    "LinkedList",
    "HashMap",
    "HashSet",
    "BTreeMap",
    "BTreeSet",
    "BinaryHeap",
    "IndexMap",
    "IndexSet",
];

/// How a field is stored. Checked in this order, first match wins.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedField {
    Native(JdbcType),
    ForeignKey { table: TableId, jdbc_type: JdbcType },
    Mapper(MapperApi),
    InlineMapper(MapperApi),
    Adapter(AdapterApi),
    Pojo(TypeName),
}

pub(crate) struct FieldResolver<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> FieldResolver<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn resolve(
        &self,
        model_name: &str,
        field: &FieldDescriptor,
        annotations: &FieldAnnotations,
    ) -> ArchResult<ResolvedField> {
        let ty = &field.ty;
        if let Some(jdbc) = JdbcType::find_by_native_type(ty) {
            return Ok(ResolvedField::Native(jdbc));
        }

        if let Some((table, jdbc_type)) = ForeignTableResolver::new(self.ctx).find_foreign_table_info(model_name, ty)? {
            return Ok(ResolvedField::ForeignKey { table, jdbc_type });
        }

        if let Some(via) = &annotations.via {
            return self.resolve_via(via, ty, annotations.nullable);
        }

        if let Some(mapper) = self.ctx.inline.try_inline(ty, self.ctx.catalog, annotations.nullable) {
            return Ok(ResolvedField::InlineMapper(mapper));
        }

        if let Some(adapter) = self.ctx.adapters.lookup(&ty.type_name()) {
            let descriptor = self.ctx.catalog.require(&adapter)?;
            return Ok(ResolvedField::Adapter(AdapterApi::of_descriptor(descriptor)?));
        }

        self.check_pojo(ty, &field.name).map(ResolvedField::Pojo)
    }

    fn resolve_via(&self, via: &TypeName, ty: &TypeRef, nullable: bool) -> ArchResult<ResolvedField> {
        let invalid = || ArchError::InvalidVia { via: via.to_string() };
        let descriptor = self.ctx.catalog.get(via).ok_or_else(invalid)?;
        if MapperApi::is_mapper(descriptor) {
            if AdapterApi::is_valid(descriptor) {
                tracing::warn!(via = %via, "`via` type is both a mapper and an adapter, using it as a mapper");
            }
            return MapperApi::from_mapper_type(descriptor, ty, nullable).map(ResolvedField::Mapper);
        }
        AdapterApi::of_descriptor(descriptor)
            .map(ResolvedField::Adapter)
            .map_err(|_| invalid())
    }

    fn check_pojo(&self, ty: &TypeRef, field_name: &str) -> ArchResult<TypeName> {
        let rendered = || ty.to_string();
        if COLLECTIONS.contains(&ty.simple_name()) {
            return Err(ArchError::CollectionField { ty: rendered() });
        }
        if ty.is_any() {
            return Err(ArchError::RawAnyField { ty: rendered() });
        }
        let descriptor = self.ctx.catalog.get_ref(ty);
        if ty.is_trait_object() || descriptor.is_some_and(|d| d.is_trait()) {
            return Err(ArchError::InterfaceField { ty: rendered() });
        }
        if ty.is_array() {
            return Err(ArchError::ArrayField { ty: rendered() });
        }
        match descriptor {
            Some(d) => Ok(d.name.clone()),
            None => Err(ArchError::UndescribedType {
                ty: rendered(),
                field: field_name.to_string(),
            }),
        }
    }
}

// ============================================================================
// FOREIGN KEYS
// ============================================================================

/// Resolves foreign key wrappers against the tables of the run.
pub(crate) struct ForeignTableResolver<'c, 'a> {
    ctx: &'c RunContext<'a>,
}

impl<'c, 'a> ForeignTableResolver<'c, 'a> {
    pub fn new(ctx: &'c RunContext<'a>) -> Self {
        Self { ctx }
    }

    /// True for the wrapper types and anything else implementing `Foreign`.
    pub fn is_foreign_reference(&self, ty: &TypeRef) -> bool {
        FOREIGN_WRAPPERS.contains(&ty.simple_name())
            || self
                .ctx
                .catalog
                .get_ref(ty)
                .is_some_and(|d| d.implemented(FOREIGN).is_some())
    }

    /// The referenced table and key column type, or `None` for a non-foreign type.
    pub fn find_foreign_table_info(&self, model_name: &str, ty: &TypeRef) -> ArchResult<Option<(TableId, JdbcType)>> {
        if !self.is_foreign_reference(ty) {
            return Ok(None);
        }
        let unsupported = || ArchError::UnsupportedForeignWrapper { wrapper: ty.to_string() };
        let (key_type, entity) = match (ty.simple_name(), ty.args()) {
            ("ForeignInt", [entity]) => (TypeRef::of("i32"), entity),
            ("ForeignLong", [entity]) => (TypeRef::of("i64"), entity),
            ("Foreign" | "ForeignObj", [key, entity]) => (key.clone(), entity),
            _ => return Err(unsupported()),
        };

        let table = self
            .ctx
            .tables
            .get(&entity.type_name())
            .ok_or_else(|| ArchError::ForeignModelMissing {
                foreign: entity.simple_name().to_string(),
                model: model_name.to_string(),
            })?;

        let pk_type = self.primary_key_type_of(table, &key_type)?;
        let pk_jdbc = JdbcType::find_by_native_type(&pk_type).ok_or_else(|| ArchError::ForeignKeyNotNative {
            foreign: table.model_name().to_string(),
            pk_type: pk_type.to_string(),
        })?;
        if JdbcType::find_by_native_type(&key_type) != Some(pk_jdbc) {
            return Err(ArchError::ForeignKeyMismatch {
                foreign: table.model_name().to_string(),
                pk_type: pk_type.to_string(),
                key_type: key_type.to_string(),
            });
        }
        Ok(Some((table.id(), pk_jdbc)))
    }

    /// The declared type of the target's primary key field.
    ///
    /// Reads the target's descriptor with the same primary key rule that completes
    /// tables, so the answer does not depend on whether the target is completed yet.
    /// Foreign key fields are never primary keys.
    pub fn primary_key_type_of(&self, table: &TableArch, expected: &TypeRef) -> ArchResult<TypeRef> {
        let descriptor = self.ctx.catalog.require(table.model_type())?;
        let input = self.ctx.inputs.require_model(table.model_type())?;
        let mut primary = Vec::new();
        for field in &descriptor.fields {
            if self.is_foreign_reference(&field.ty) {
                continue;
            }
            let annotations = FieldAnnotations::analyze(field)?;
            if is_primary_key(field, &annotations, input.identity()) {
                primary.push(field);
            }
        }
        match primary.as_slice() {
            [] => Err(ArchError::ForeignNoPrimaryKey {
                foreign: table.model_name().to_string(),
                key_type: expected.to_string(),
            }),
            [pk] => Ok(pk.ty.clone()),
            many => Err(ArchError::ForeignMultiplePrimaryKeys {
                foreign: table.model_name().to_string(),
                fields: many.iter().map(|f| f.name.clone()).collect(),
            }),
        }
    }
}
