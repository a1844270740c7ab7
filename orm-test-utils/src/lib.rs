//! ORM Test Utilities
//!
//! Shared test infrastructure for the ORM workspace:
//! - Mock prepared statement and adapter registry
//! - Proptest generators for values, args, names and engines
//! - A type descriptor builder and ready-made model catalogs
//! - Assertions for SQL text, bound args and resolution errors

// Re-export query types for convenience
pub use orm_api::{Arg, Args, Engine, HasArgs, ParamSink, Representable, TermType, UnresolvedArg, Value};

// Re-export generator types for convenience
pub use orm_generator::{
    AdapterRegistry, Annotation, ArchError, ArchFactory, ArchResult, BridgeDeclaration, CatalogAdapterRegistry,
    FieldDescriptor, GeneratorConfig, JdbcType, MethodDescriptor, ModelAnnotation, ParamDescriptor, RunInputs,
    RunResult, SqlAnnotation, TypeCatalog, TypeDescriptor, TypeKind, TypeName, TypeRef, Visibility,
};

use std::collections::HashMap;
use std::sync::Once;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// MOCKS
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to bind parameter at position {position}")]
pub struct MockBindError {
    pub position: usize,
}

/// Prepared statement stand-in that records every bound parameter.
#[derive(Debug, Clone, Default)]
pub struct MockStatement {
    params: Vec<(usize, Value)>,
    fail_at: Option<usize>,
}

impl MockStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the bind at `position` and everything after it.
    pub fn failing_at(position: usize) -> Self {
        Self {
            params: Vec::new(),
            fail_at: Some(position),
        }
    }

    pub fn params(&self) -> &[(usize, Value)] {
        &self.params
    }

    pub fn positions(&self) -> Vec<usize> {
        self.params.iter().map(|(position, _)| *position).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.params.iter().map(|(_, value)| value.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn clear(&mut self) {
        self.params.clear();
    }
}

impl ParamSink for MockStatement {
    type Error = MockBindError;

    fn set_value(&mut self, position: usize, value: &Value) -> Result<(), Self::Error> {
        if self.fail_at.is_some_and(|fail_at| position >= fail_at) {
            return Err(MockBindError { position });
        }
        self.params.push((position, value.clone()));
        Ok(())
    }
}

/// Adapter registry backed by a plain map, ignoring the catalog.
#[derive(Debug, Clone, Default)]
pub struct FakeAdapterRegistry {
    adapters: HashMap<TypeName, TypeName>,
}

impl FakeAdapterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, ty: &str, adapter: &str) -> Self {
        self.adapters.insert(TypeName::from(ty), TypeName::from(adapter));
        self
    }
}

impl AdapterRegistry for FakeAdapterRegistry {
    fn lookup(&self, ty: &TypeName) -> Option<TypeName> {
        self.adapters.get(ty).cloned()
    }
}

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Routes `tracing` output to the test harness, filtered by `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for query and architecture inputs.

    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    // === Values ===

    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (1970i32..2100, 1u32..=12, 1u32..=28).prop_filter_map("valid date", |(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
    }

    pub fn arb_timestamp() -> impl Strategy<Value = NaiveDateTime> {
        (arb_date(), 0u32..24, 0u32..60, 0u32..60)
            .prop_filter_map("valid timestamp", |(date, h, m, s)| date.and_hms_opt(h, m, s))
    }

    /// Any bound value except NaN floats, which never compare equal.
    pub fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::Int),
            any::<i64>().prop_map(Value::Long),
            any::<i16>().prop_map(Value::Short),
            any::<i8>().prop_map(Value::Byte),
            (-1.0e6f32..1.0e6).prop_map(Value::Float),
            (-1.0e12f64..1.0e12).prop_map(Value::Double),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
            prop::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
            arb_date().prop_map(Value::Date),
            arb_timestamp().prop_map(Value::Timestamp),
        ]
    }

    pub fn arb_term_type() -> impl Strategy<Value = TermType> {
        prop_oneof![
            Just(TermType::Number),
            Just(TermType::String),
            Just(TermType::Bool),
            Just(TermType::Time),
            Just(TermType::Wildcard),
        ]
    }

    // === Args ===

    pub fn arb_int_args() -> impl Strategy<Value = Args> {
        prop::collection::vec(any::<i32>(), 0..8).prop_map(Args::of_ints)
    }

    pub fn arb_long_args() -> impl Strategy<Value = Args> {
        prop::collection::vec(any::<i64>(), 0..8).prop_map(Args::of_longs)
    }

    pub fn arb_generic_args() -> impl Strategy<Value = Args> {
        prop::collection::vec(arb_value(), 0..8).prop_map(Args::of)
    }

    /// Args in every internal representation.
    pub fn arb_args() -> impl Strategy<Value = Args> {
        prop_oneof![arb_int_args(), arb_long_args(), arb_generic_args()]
    }

    /// Generic args mixing values with named placeholders `U0`, `U1`, ...
    pub fn arb_args_with_placeholders() -> impl Strategy<Value = Args> {
        prop::collection::vec((arb_value(), any::<bool>()), 1..8).prop_map(|slots| {
            let mut next = 0;
            let items: Vec<Arg> = slots
                .into_iter()
                .map(|(value, placeholder)| {
                    if placeholder {
                        next += 1;
                        Arg::Unresolved(UnresolvedArg::new(format!("U{}", next - 1), value))
                    } else {
                        Arg::Value(value)
                    }
                })
                .collect();
            Args::of(items)
        })
    }

    // === Names and types ===

    pub fn arb_sql_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,15}"
    }

    pub fn arb_type_simple_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,6}([A-Z][a-z]{1,6}){0,2}"
    }

    pub fn arb_jdbc_type() -> impl Strategy<Value = JdbcType> {
        prop::sample::select(JdbcType::ALL.to_vec())
    }

    pub fn arb_engine() -> impl Strategy<Value = Engine> {
        prop::sample::select(Engine::ALL.to_vec())
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Descriptor builders and model catalogs for common scenarios.

    use super::*;

    pub fn type_ref(text: &str) -> TypeRef {
        TypeRef::parse(text).unwrap_or_else(|e| panic!("invalid fixture type `{text}`: {e}"))
    }

    /// Fluent builder for [`TypeDescriptor`].
    #[derive(Debug, Clone)]
    pub struct TypeBuilder {
        descriptor: TypeDescriptor,
    }

    impl TypeBuilder {
        /// A struct declared as a model with default names.
        pub fn model(path: &str) -> Self {
            Self::value_type(path).model_annotation(ModelAnnotation::default())
        }

        /// A plain struct: nested value type, mapper or adapter.
        pub fn value_type(path: &str) -> Self {
            Self {
                descriptor: TypeDescriptor::new(path, TypeKind::Struct),
            }
        }

        pub fn enumeration(path: &str, variants: &[&str]) -> Self {
            let mut descriptor = TypeDescriptor::new(path, TypeKind::Enum);
            descriptor.variants = variants.iter().map(|v| v.to_string()).collect();
            Self { descriptor }
        }

        pub fn trait_type(path: &str) -> Self {
            Self {
                descriptor: TypeDescriptor::new(path, TypeKind::Trait),
            }
        }

        pub fn model_annotation(mut self, model: ModelAnnotation) -> Self {
            self.descriptor.model = Some(model);
            self
        }

        pub fn exposed_as(mut self, path: &str) -> Self {
            self.descriptor.model.get_or_insert_with(ModelAnnotation::default).exposed_as = Some(TypeName::from(path));
            self
        }

        pub fn sql_name(mut self, name: &str) -> Self {
            self.descriptor.model.get_or_insert_with(ModelAnnotation::default).sql_name = Some(name.to_string());
            self
        }

        pub fn field(self, name: &str, ty: &str) -> Self {
            self.annotated(name, ty, Vec::new())
        }

        pub fn annotated(mut self, name: &str, ty: &str, annotations: Vec<Annotation>) -> Self {
            self.descriptor.fields.push(FieldDescriptor {
                name: name.to_string(),
                ty: type_ref(ty),
                visibility: Visibility::Public,
                annotations,
            });
            self
        }

        pub fn private_field(mut self, name: &str, ty: &str) -> Self {
            self.descriptor.fields.push(FieldDescriptor {
                name: name.to_string(),
                ty: type_ref(ty),
                visibility: Visibility::Private,
                annotations: Vec::new(),
            });
            self
        }

        pub fn method(mut self, name: &str, is_static: bool, params: &[(&str, &str)], returns: Option<&str>) -> Self {
            self.descriptor.methods.push(MethodDescriptor {
                name: name.to_string(),
                is_static,
                visibility: Visibility::Public,
                params: params
                    .iter()
                    .map(|(name, ty)| ParamDescriptor {
                        name: name.to_string(),
                        ty: type_ref(ty),
                    })
                    .collect(),
                returns: returns.map(type_ref),
            });
            self
        }

        pub fn getter(self, name: &str, returns: &str) -> Self {
            self.method(name, false, &[], Some(returns))
        }

        pub fn static_method(self, name: &str, params: &[(&str, &str)], returns: Option<&str>) -> Self {
            self.method(name, true, params, returns)
        }

        pub fn implements(mut self, ty: &str) -> Self {
            self.descriptor.implements.push(type_ref(ty));
            self
        }

        pub fn adapts(mut self, path: &str) -> Self {
            self.descriptor.adapts.push(TypeName::from(path));
            self
        }

        pub fn bridge(mut self, left: &str, right: &str) -> Self {
            self.descriptor.bridge = Some(BridgeDeclaration {
                left: left.to_string(),
                right: right.to_string(),
            });
            self
        }

        pub fn build(self) -> TypeDescriptor {
            self.descriptor
        }
    }

    // === Conversion types ===

    /// A mapper implementing `Reversible<field_ty, jdbc_ty>`.
    pub fn mapper(path: &str, field_ty: &str, jdbc_ty: &str) -> TypeDescriptor {
        TypeBuilder::value_type(path)
            .implements(&format!("Reversible<{field_ty}, {jdbc_ty}>"))
            .build()
    }

    /// A one-column adapter: `create_instance(param)` plus `to_value_object`.
    pub fn single_adapter(path: &str, param: (&str, &str)) -> TypeDescriptor {
        TypeBuilder::value_type(path)
            .static_method("create_instance", &[param], None)
            .method("to_value_object", false, &[], Some(param.1))
            .build()
    }

    /// A multi-column adapter: `create_instance(params..)`, `fill_array_values`
    /// and `values_count`.
    pub fn array_adapter(path: &str, params: &[(&str, &str)]) -> TypeDescriptor {
        TypeBuilder::value_type(path)
            .static_method("create_instance", params, None)
            .method("fill_array_values", false, &[("values", "Vec<Value>"), ("start", "usize")], None)
            .method("values_count", false, &[], Some("usize"))
            .build()
    }

    pub fn catalog(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> TypeCatalog {
        TypeCatalog::from_descriptors(descriptors).unwrap_or_else(|e| panic!("invalid fixture catalog: {e}"))
    }

    // === Models ===

    /// `User { user_id: i32, name: String }`, keyed by the `<model>_id` convention.
    pub fn user() -> TypeDescriptor {
        TypeBuilder::model("app::User")
            .field("user_id", "i32")
            .field("name", "String")
            .build()
    }

    /// `Song` referencing `User` through `ForeignInt`.
    pub fn song() -> TypeDescriptor {
        TypeBuilder::model("app::Song")
            .field("id", "i64")
            .field("title", "String")
            .field("author", "ForeignInt<app::User>")
            .build()
    }

    pub fn music_catalog() -> TypeCatalog {
        catalog([user(), song()])
    }

    /// `Employee` and `Department` referencing each other.
    pub fn cycle_catalog(employee_first: bool) -> TypeCatalog {
        let employee = TypeBuilder::model("app::Employee")
            .field("id", "i32")
            .field("name", "String")
            .field("department", "ForeignInt<app::Department>")
            .build();
        let department = TypeBuilder::model("app::Department")
            .field("id", "i32")
            .field("title", "String")
            .annotated("head", "ForeignInt<app::Employee>", vec![Annotation::Null])
            .build();
        if employee_first {
            catalog([employee, department])
        } else {
            catalog([department, employee])
        }
    }

    /// `Account` where both `id` and `account_id` follow the key convention.
    pub fn two_primary_keys_catalog() -> TypeCatalog {
        catalog([TypeBuilder::model("app::Account")
            .field("id", "i32")
            .field("account_id", "i64")
            .build()])
    }

    /// `Post` referencing `Tag`, which has no primary key.
    pub fn missing_primary_key_catalog() -> TypeCatalog {
        let tag = TypeBuilder::model("app::Tag").field("label", "String").build();
        let post = TypeBuilder::model("app::Post")
            .field("id", "i64")
            .field("tag", "ForeignInt<app::Tag>")
            .build();
        catalog([tag, post])
    }

    /// `Place` with a nested `Point`, a multi-column `Zoned` adapter and a
    /// one-column `Money` adapter.
    pub fn geo_catalog() -> TypeCatalog {
        let point = TypeBuilder::value_type("app::Point")
            .field("x", "f64")
            .field("y", "f64")
            .build();
        let zoned = TypeBuilder::value_type("app::Zoned")
            .private_field("time", "chrono::NaiveDateTime")
            .private_field("offset", "i32")
            .build();
        let zoned_adapter = array_adapter(
            "app::ZonedJdbcAdapter",
            &[("time", "chrono::NaiveDateTime"), ("zoneOffsetSeconds", "i32")],
        );
        let money = TypeBuilder::value_type("app::Money").private_field("cents", "i64").build();
        let money_adapter = single_adapter("app::MoneyJdbcAdapter", ("cents", "i64"));
        let place = TypeBuilder::model("app::Place")
            .field("id", "i64")
            .field("name", "String")
            .field("location", "app::Point")
            .field("opened", "app::Zoned")
            .field("price", "app::Money")
            .build();
        catalog([point, zoned, zoned_adapter, money, money_adapter, place])
    }

    /// `Paint` covering explicit and inline mappers and a getter-only field.
    pub fn paint_catalog() -> TypeCatalog {
        let color = TypeBuilder::enumeration("app::Color", &["Red", "Green", "Blue"]).build();
        let color_mapper = mapper("app::ColorMapper", "app::Color", "String");
        let paint = TypeBuilder::model("app::Paint")
            .field("id", "i32")
            .annotated("color", "app::Color", vec![Annotation::Via(TypeName::from("app::ColorMapper"))])
            .field("shade", "app::Color")
            .field("note", "Option<String>")
            .field("counter", "Cell<i64>")
            .private_field("label", "String")
            .getter("get_label", "String")
            .build();
        catalog([color, color_mapper, paint])
    }

    /// `PlaylistTrack` bridging `Playlist` and `Track`.
    pub fn playlist_catalog() -> TypeCatalog {
        let playlist = TypeBuilder::model("app::Playlist")
            .field("id", "i64")
            .field("title", "String")
            .build();
        let track = TypeBuilder::model("app::Track")
            .field("id", "i64")
            .field("title", "String")
            .build();
        let bridge = TypeBuilder::model("app::PlaylistTrack")
            .field("playlist", "ForeignLong<app::Playlist>")
            .field("track", "ForeignLong<app::Track>")
            .field("position", "i32")
            .bridge("playlist", "track")
            .build();
        catalog([playlist, track, bridge])
    }

    // === Running ===

    /// Resolves every model of `catalog` with the default configuration.
    pub fn resolve(catalog: &TypeCatalog) -> ArchResult<RunResult> {
        resolve_with(catalog, &GeneratorConfig::default())
    }

    pub fn resolve_with(catalog: &TypeCatalog, config: &GeneratorConfig) -> ArchResult<RunResult> {
        let registry = CatalogAdapterRegistry::new(catalog, &config.naming);
        let inputs = RunInputs::from_catalog(catalog, &config.naming)?;
        ArchFactory::new(catalog, &registry, config).build(&inputs)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for query text, bound args and resolution results.

    use super::*;
    use orm_generator::TableArch;

    /// Assert the rendered SQL of a fragment.
    #[track_caller]
    pub fn assert_sql<F: Representable + ?Sized>(fragment: &F, expected: &str) {
        assert_eq!(fragment.repr(), expected, "unexpected SQL");
    }

    /// Assert the external view of a fragment's args.
    #[track_caller]
    pub fn assert_args<F: HasArgs + ?Sized>(fragment: &F, expected: &[Value]) {
        assert_eq!(fragment.args().as_list(), expected, "unexpected args");
    }

    /// Bind `args` into a fresh [`MockStatement`] and assert positions 1..=n in order.
    #[track_caller]
    pub fn assert_binds(args: &Args, expected: &[Value]) -> MockStatement {
        let mut statement = MockStatement::new();
        let next = args
            .set_prepared_params(&mut statement, 0)
            .unwrap_or_else(|e| panic!("binding failed: {e}"));
        assert_eq!(next, expected.len(), "unexpected next index");
        assert_eq!(statement.positions(), (1..=expected.len()).collect::<Vec<_>>());
        assert_eq!(statement.values(), expected);
        statement
    }

    /// Assert a resolution failed and its message contains `needle`.
    #[track_caller]
    pub fn assert_arch_error_contains<T: std::fmt::Debug>(result: &ArchResult<T>, needle: &str) {
        match result {
            Err(err) => assert!(
                err.to_string().contains(needle),
                "expected error containing `{needle}`, got: {err}"
            ),
            Ok(value) => panic!("expected error containing `{needle}`, got Ok: {value:?}"),
        }
    }

    /// Assert a resolution failed with `expected` once model attribution is peeled off.
    #[track_caller]
    pub fn assert_root_error<T: std::fmt::Debug>(result: &ArchResult<T>, expected: &ArchError) {
        match result {
            Err(err) => assert_eq!(err.root(), expected),
            Ok(value) => panic!("expected {expected:?}, got Ok: {value:?}"),
        }
    }

    /// Assert the column names of a table's own fields, in declaration order.
    #[track_caller]
    pub fn assert_columns(table: &TableArch, expected: &[&str]) {
        let names: Vec<&str> = table.own_columns().map(|c| c.sql_name()).collect();
        assert_eq!(names, expected, "unexpected columns of `{}`", table.sql_name());
    }

    /// Look a table up by model type path, failing the test when missing.
    #[track_caller]
    pub fn table<'r>(result: &'r RunResult, model_type: &str) -> &'r TableArch {
        result
            .table(&TypeName::from(model_type))
            .unwrap_or_else(|| panic!("no table for `{model_type}`"))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mock_statement_records_binds() {
        let mut statement = MockStatement::new();
        statement.set_value(1, &Value::Int(7)).unwrap();
        statement.set_long(2, 8).unwrap();
        assert_eq!(statement.positions(), vec![1, 2]);
        assert_eq!(statement.values(), vec![Value::Int(7), Value::Long(8)]);
        statement.clear();
        assert!(statement.is_empty());
    }

    #[test]
    fn test_mock_statement_failure() {
        let mut statement = MockStatement::failing_at(2);
        assert!(statement.set_int(1, 1).is_ok());
        assert_eq!(statement.set_int(2, 2), Err(MockBindError { position: 2 }));
        assert_eq!(statement.len(), 1);
    }

    #[test]
    fn test_fake_registry() {
        let registry = FakeAdapterRegistry::empty().with("app::Point", "app::PointCodec");
        assert_eq!(
            registry.lookup(&TypeName::from("app::Point")),
            Some(TypeName::from("app::PointCodec"))
        );
        assert_eq!(registry.lookup(&TypeName::from("app::Other")), None);
    }

    #[test]
    fn test_type_builder() {
        let paint = fixtures::TypeBuilder::model("app::Paint")
            .sql_name("paints")
            .field("id", "i32")
            .private_field("label", "String")
            .getter("get_label", "String")
            .build();
        assert_eq!(paint.fields.len(), 2);
        assert_eq!(paint.methods[0].returns, Some(TypeRef::of("String")));
        assert_eq!(paint.model.as_ref().and_then(|m| m.sql_name.as_deref()), Some("paints"));
    }

    #[test]
    fn test_fixture_catalogs_are_consistent() {
        for catalog in [
            fixtures::music_catalog(),
            fixtures::cycle_catalog(true),
            fixtures::geo_catalog(),
            fixtures::paint_catalog(),
            fixtures::playlist_catalog(),
        ] {
            assert!(fixtures::resolve(&catalog).is_ok());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_sql_names_are_valid(name in generators::arb_sql_name()) {
            prop_assert!(orm_generator::naming::is_valid_sql_name(&name));
        }

        #[test]
        fn prop_placeholders_are_counted(args in generators::arb_args_with_placeholders()) {
            let unresolved = args.unresolved_args().len();
            prop_assert_eq!(args.is_all_resolved(), unresolved == 0);
            prop_assert_eq!(args.as_list().len(), args.len());
        }
    }
}
