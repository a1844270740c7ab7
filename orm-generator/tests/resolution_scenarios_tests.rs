//! End-to-end resolution of model catalogs into table architecture

use orm_generator::{
    Accessor, AdapterKind, Annotation, ArchError, ArchFactory, FieldKind, GeneratorConfig, JdbcType, MapperKind,
    PojoInput, RunInputs, SqlAnnotation, TypeName,
};
use orm_test_utils::assertions::{assert_arch_error_contains, assert_columns, assert_root_error, table};
use orm_test_utils::fixtures::*;
use orm_test_utils::generators::arb_jdbc_type;
use orm_test_utils::{init_test_tracing, FakeAdapterRegistry};
use proptest::prelude::*;

// ============================================================================
// KEYS AND FOREIGN KEYS
// ============================================================================

#[test]
fn test_model_with_conventional_primary_key() {
    init_test_tracing();
    let result = resolve(&music_catalog()).unwrap();

    let user = table(&result, "app::User");
    assert_eq!(user.sql_name(), "user");
    assert_eq!(user.model_name(), "User");
    assert_eq!(user.table_type_name(), "UserTable");
    assert_columns(user, &["user_id", "name"]);
    assert!(user.is_primary_key_int());
    assert_eq!(user.primary_key_field().map(|f| f.name()), Some("user_id"));
}

#[test]
fn test_foreign_key_points_at_referenced_table() {
    let result = resolve(&music_catalog()).unwrap();
    let song = table(&result, "app::Song");
    assert_columns(song, &["id", "title", "author_id"]);
    assert!(song.is_primary_key_long());

    let author = song.field("author").unwrap();
    assert_eq!(author.kind(), FieldKind::Foreign);
    assert_eq!(author.columns()[0].jdbc_type(), JdbcType::Int);
    assert!(!author.is_nullable());

    let foreign = author.as_foreign().unwrap();
    let target = result.foreign_table(foreign).unwrap();
    assert_eq!(target.sql_name(), "user");
}

#[test]
fn test_mutual_references_resolve_in_any_order() {
    for employee_first in [true, false] {
        let result = resolve(&cycle_catalog(employee_first)).unwrap();
        let employee = table(&result, "app::Employee");
        let department = table(&result, "app::Department");
        assert_columns(employee, &["id", "name", "department_id"]);
        assert_columns(department, &["id", "title", "head_id"]);

        let head = department.field("head").unwrap();
        assert!(head.is_nullable());
        assert_eq!(
            result.foreign_table(head.as_foreign().unwrap()).map(|t| t.sql_name()),
            Some("employee")
        );
        assert_eq!(result.tables()[0].model_name(), if employee_first { "Employee" } else { "Department" });
    }
}

#[test]
fn test_two_primary_keys_rejected() {
    let result = resolve(&two_primary_keys_catalog());
    assert_root_error(
        &result,
        &ArchError::MultiplePrimaryKeys {
            table: "account".to_string(),
            fields: vec!["id".to_string(), "account_id".to_string()],
        },
    );
    assert_arch_error_contains(&result, "`Account`");
}

#[test]
fn test_reference_to_table_without_primary_key() {
    let result = resolve(&missing_primary_key_catalog());
    assert_root_error(
        &result,
        &ArchError::ForeignNoPrimaryKey {
            foreign: "Tag".to_string(),
            key_type: "i32".to_string(),
        },
    );
    assert_arch_error_contains(&result, "Error while processing the model: `Post.tag`");
}

#[test]
fn test_reference_to_model_outside_the_run() {
    let result = resolve(&catalog([song()]));
    assert_root_error(
        &result,
        &ArchError::ForeignModelMissing {
            foreign: "User".to_string(),
            model: "Song".to_string(),
        },
    );
}

#[test]
fn test_foreign_key_type_must_match_primary_key() {
    let song = TypeBuilder::model("app::Song")
        .field("id", "i64")
        .field("author", "ForeignLong<app::User>")
        .build();
    let result = resolve(&catalog([user(), song]));
    assert_root_error(
        &result,
        &ArchError::ForeignKeyMismatch {
            foreign: "User".to_string(),
            pk_type: "i32".to_string(),
            key_type: "i64".to_string(),
        },
    );
}

#[test]
fn test_foreign_key_named_like_a_key_is_not_a_primary_key() {
    let song = TypeBuilder::model("app::Song")
        .field("id", "i32")
        .field("song_id", "ForeignInt<app::User>")
        .build();
    let playlist = TypeBuilder::model("app::Playlist")
        .field("id", "i32")
        .field("song", "ForeignInt<app::Song>")
        .build();

    let alone = resolve(&catalog([user(), song.clone()])).unwrap();
    assert_eq!(table(&alone, "app::Song").primary_key_field().map(|f| f.name()), Some("id"));

    let result = resolve(&catalog([user(), song, playlist])).unwrap();
    let reference = table(&result, "app::Playlist").field("song").unwrap();
    assert_eq!(reference.columns()[0].jdbc_type(), JdbcType::Int);
    assert_eq!(result.foreign_table(reference.as_foreign().unwrap()).map(|t| t.sql_name()), Some("song"));
}

#[test]
fn test_generic_foreign_wrapper_with_explicit_key() {
    let song = TypeBuilder::model("app::Song")
        .field("id", "i64")
        .field("author", "Foreign<i32, app::User>")
        .build();
    let result = resolve(&catalog([user(), song])).unwrap();
    assert_eq!(
        table(&result, "app::Song").field("author").map(|f| f.kind()),
        Some(FieldKind::Foreign)
    );
}

#[test]
fn test_foreign_key_through_exposed_type() {
    let entity = TypeBuilder::model("app::UserEntity")
        .exposed_as("app::User")
        .field("user_id", "i32")
        .field("name", "String")
        .build();
    let result = resolve(&catalog([entity, song()])).unwrap();

    let user = table(&result, "app::User");
    assert_eq!(user.model_type(), &TypeName::from("app::UserEntity"));
    assert_eq!(user.sql_name(), "user_entity");
    assert_eq!(user.primary_key_field().map(|f| f.name()), Some("user_id"));

    let author = table(&result, "app::Song").field("author").unwrap();
    assert_eq!(result.foreign_table(author.as_foreign().unwrap()).map(|t| t.sql_name()), Some("user_entity"));
}

#[test]
fn test_declared_column_names() {
    let song = TypeBuilder::model("app::Song")
        .field("id", "i64")
        .annotated("title", "String", vec![Annotation::Name("song_title".to_string())])
        .annotated("author", "ForeignInt<app::User>", vec![Annotation::Name("written_by".to_string())])
        .build();
    let result = resolve(&catalog([user(), song])).unwrap();
    assert_columns(table(&result, "app::Song"), &["id", "song_title", "written_by"]);
}

#[test]
fn test_duplicate_column_rejected() {
    let song = TypeBuilder::model("app::Song")
        .field("id", "i64")
        .field("author", "ForeignInt<app::User>")
        .field("author_id", "i32")
        .build();
    assert_root_error(
        &resolve(&catalog([user(), song])),
        &ArchError::DuplicateColumn {
            table: "song".to_string(),
            column: "author_id".to_string(),
        },
    );
}

#[test]
fn test_same_concern_declared_twice() {
    let user = TypeBuilder::model("app::User")
        .field("user_id", "i32")
        .annotated(
            "name",
            "String",
            vec![
                Annotation::Unique,
                Annotation::Sql(SqlAnnotation {
                    unique: Some(true),
                    ..SqlAnnotation::default()
                }),
            ],
        )
        .build();
    assert!(matches!(
        resolve(&catalog([user])).unwrap_err().root(),
        ArchError::AmbiguousAnnotations { .. }
    ));
}

// ============================================================================
// NESTED TYPES AND ADAPTERS
// ============================================================================

#[test]
fn test_nested_type_and_adapters_spread_over_columns() {
    let result = resolve(&geo_catalog()).unwrap();
    let place = table(&result, "app::Place");
    assert_columns(
        place,
        &[
            "id",
            "name",
            "location_x",
            "location_y",
            "opened_time",
            "opened_zone_offset_seconds",
            "price",
        ],
    );

    let location = place.field("location").unwrap();
    assert_eq!(location.kind(), FieldKind::Pojo);
    let generated = location.adapter().unwrap();
    assert!(generated.is_generated());
    assert_eq!(generated.adapter_type(), &TypeName::from("app::PointJdbcAdapter"));

    let opened = place.field("opened").unwrap();
    assert_eq!(opened.kind(), FieldKind::Adapter);
    assert_eq!(opened.adapter().map(|a| a.kind()), Some(AdapterKind::Array));
    assert_eq!(opened.columns()[0].jdbc_type(), JdbcType::Timestamp);

    let price = place.field("price").unwrap();
    assert_eq!(price.kind(), FieldKind::Adapter);
    assert_eq!(price.columns_number(), 1);
    assert_eq!(price.adapter().map(|a| a.kind()), Some(AdapterKind::Single));
}

#[test]
fn test_one_adapter_generated_per_nested_type() {
    let result = resolve(&geo_catalog()).unwrap();
    let [point] = result.adapters() else {
        panic!("expected one generated adapter, got {:?}", result.adapters());
    };
    assert_eq!(point.name(), "PointJdbcAdapter");
    assert_eq!(point.pojo().pojo_type(), &TypeName::from("app::Point"));
    let columns: Vec<&str> = point.columns().iter().map(|c| c.sql_name()).collect();
    assert_eq!(columns, ["x", "y"]);
}

#[test]
fn test_requested_nested_type_without_models() {
    let catalog = geo_catalog();
    let config = GeneratorConfig::default();
    let registry = FakeAdapterRegistry::empty();
    let inputs = RunInputs::new().with_pojo(PojoInput::new("app::Point"));
    let result = ArchFactory::new(&catalog, &registry, &config).build(&inputs).unwrap();
    assert!(result.tables().is_empty());
    assert_eq!(result.adapters().len(), 1);
}

#[test]
fn test_registry_decides_which_adapter_applies() {
    let mut descriptors: Vec<_> = geo_catalog().iter().cloned().collect();
    descriptors.push(single_adapter("app::codec::PointCodec", ("wkt", "String")));
    let catalog = catalog(descriptors);
    let registry = FakeAdapterRegistry::empty()
        .with("app::Point", "app::codec::PointCodec")
        .with("app::Zoned", "app::ZonedJdbcAdapter")
        .with("app::Money", "app::MoneyJdbcAdapter");
    let config = GeneratorConfig::default();
    let inputs = RunInputs::from_catalog(&catalog, &config.naming).unwrap();
    let result = ArchFactory::new(&catalog, &registry, &config).build(&inputs).unwrap();

    let location = table(&result, "app::Place").field("location").unwrap();
    assert_eq!(location.kind(), FieldKind::Adapter);
    assert_eq!(location.columns()[0].sql_name(), "location");
    assert!(result.adapters().is_empty());
}

#[test]
fn test_explicit_adapter_through_via() {
    let money = TypeBuilder::value_type("app::Money").private_field("cents", "i64").build();
    let codec = single_adapter("app::codec::CentsCodec", ("cents", "i64"));
    let order = TypeBuilder::model("app::Order")
        .field("id", "i64")
        .annotated("total", "app::Money", vec![Annotation::Via(TypeName::from("app::codec::CentsCodec"))])
        .build();
    let result = resolve(&catalog([money, codec, order])).unwrap();
    let total = table(&result, "app::Order").field("total").unwrap();
    assert_eq!(
        total.adapter().map(|a| a.adapter_type().to_string()),
        Some("app::codec::CentsCodec".to_string())
    );
}

#[test]
fn test_via_must_name_a_mapper_or_adapter() {
    let order = TypeBuilder::model("app::Order")
        .field("id", "i64")
        .annotated("total", "app::Money", vec![Annotation::Via(TypeName::from("app::Nope"))])
        .build();
    let money = TypeBuilder::value_type("app::Money").field("cents", "i64").build();
    assert_root_error(
        &resolve(&catalog([money, order])),
        &ArchError::InvalidVia { via: "app::Nope".to_string() },
    );
}

#[test]
fn test_recursive_nesting_rejected() {
    let node = TypeBuilder::value_type("app::Node")
        .field("value", "i32")
        .field("next", "app::Node")
        .build();
    let list = TypeBuilder::model("app::List").field("id", "i32").field("head", "app::Node").build();
    let err = resolve(&catalog([node, list])).unwrap_err();
    assert!(matches!(err.root(), ArchError::RecursivePojo { pojo, .. } if pojo == "app::Node"));
}

#[test]
fn test_foreign_key_inside_nested_type_rejected() {
    let point = TypeBuilder::value_type("app::Point")
        .field("x", "f64")
        .field("owner", "ForeignInt<app::User>")
        .build();
    let place = TypeBuilder::model("app::Place").field("id", "i64").field("location", "app::Point").build();
    assert_root_error(
        &resolve(&catalog([user(), point, place])),
        &ArchError::ForeignInPojo { field: "Point.owner".to_string() },
    );
}

#[test]
fn test_defaults_must_cover_every_column() {
    let geo = geo_catalog();
    let descriptors = geo.iter().cloned().map(|mut d| {
        if d.simple_name() == "Place" {
            for field in d.fields.iter_mut().filter(|f| f.name == "opened") {
                field.annotations.push(Annotation::Default(vec!["now()".to_string()]));
            }
        }
        d
    });
    assert_root_error(
        &resolve(&catalog(descriptors.collect::<Vec<_>>())),
        &ArchError::DefaultsMismatch {
            columns: 2,
            values: vec!["now()".to_string()],
        },
    );
}

// ============================================================================
// MAPPERS AND ACCESSORS
// ============================================================================

#[test]
fn test_explicit_and_inline_mappers() {
    let result = resolve(&paint_catalog()).unwrap();
    let paint = table(&result, "app::Paint");
    assert_columns(paint, &["id", "color", "shade", "note", "counter", "label"]);

    let color = paint.field("color").unwrap();
    assert_eq!(color.kind(), FieldKind::Mapper);
    let mapper = color.mapper().unwrap();
    assert_eq!(mapper.jdbc_type(), JdbcType::String);
    assert_eq!(mapper.jdbc_to_field("v"), "app::ColorMapper::backward(v)");

    let shade = paint.field("shade").unwrap().mapper().unwrap();
    assert!(matches!(shade.kind(), MapperKind::InlineEnum { variants, .. } if variants.len() == 3));
    assert_eq!(shade.jdbc_type(), JdbcType::Int);

    let note = paint.field("note").unwrap();
    assert!(note.is_nullable());
    assert_eq!(note.mapper().map(|m| m.kind()), Some(&MapperKind::InlineOption));

    let counter = paint.field("counter").unwrap();
    assert_eq!(counter.mapper().map(|m| m.jdbc_type()), Some(JdbcType::Long));
}

#[test]
fn test_cell_of_option_is_a_nullable_column() {
    let model = TypeBuilder::model("app::Gauge")
        .field("id", "i32")
        .field("reading", "Cell<Option<i64>>")
        .build();
    let result = resolve(&catalog([model])).unwrap();
    let reading = table(&result, "app::Gauge").field("reading").unwrap();
    assert!(reading.is_nullable());
    assert_eq!(reading.kind(), FieldKind::Mapper);
    assert_eq!(reading.mapper().map(|m| m.kind()), Some(&MapperKind::InlineCell));
    assert_eq!(reading.columns()[0].jdbc_type(), JdbcType::Long);
}

#[test]
fn test_private_field_read_through_getter() {
    let result = resolve(&paint_catalog()).unwrap();
    let label = table(&result, "app::Paint").field("label").unwrap();
    assert_eq!(label.kind(), FieldKind::Native);
    assert_eq!(label.meta().field().accessor(), &Accessor::Getter("get_label".to_string()));
    assert_eq!(label.meta().field().accessor().render("paint"), "paint.get_label()");
}

#[test]
fn test_private_field_without_getter() {
    let model = TypeBuilder::model("app::Paint")
        .field("id", "i32")
        .private_field("label", "String")
        .build();
    assert_root_error(
        &resolve(&catalog([model])),
        &ArchError::NoAccessor {
            model: "Paint".to_string(),
            field: "label".to_string(),
        },
    );
}

#[test]
fn test_disabled_inline_option_leaves_field_undescribed() {
    let config = GeneratorConfig::from_toml_str("[inline_mappers]\noptionals = false\n").unwrap();
    assert_root_error(
        &resolve_with(&paint_catalog(), &config),
        &ArchError::UndescribedType {
            ty: "Option<String>".to_string(),
            field: "note".to_string(),
        },
    );
}

#[test]
fn test_disabled_inline_enum_has_no_columns() {
    let config = GeneratorConfig::from_toml_str("[inline_mappers]\nenums = false\n").unwrap();
    let result = resolve_with(&paint_catalog(), &config);
    assert!(matches!(
        result.as_ref().unwrap_err().root(),
        ArchError::InvalidAdapter { adapter, .. } if adapter == "app::ColorJdbcAdapter"
    ));
    assert_arch_error_contains(&result, "`Paint.shade`");
}

#[test]
fn test_unsupported_field_types() {
    let cases = [
        ("Vec<String>", "collection"),
        ("Box<dyn std::any::Any>", "raw"),
        ("[i32; 4]", "array"),
    ];
    for (ty, needle) in cases {
        let model = TypeBuilder::model("app::Bag").field("id", "i32").field("items", ty).build();
        assert_arch_error_contains(&resolve(&catalog([model])), needle);
    }
}

#[test]
fn test_trait_typed_field_rejected() {
    let shape = TypeBuilder::trait_type("app::Shape").build();
    let model = TypeBuilder::model("app::Canvas").field("id", "i32").field("shape", "app::Shape").build();
    assert!(matches!(
        resolve(&catalog([shape, model])).unwrap_err().root(),
        ArchError::InterfaceField { .. }
    ));
}

// ============================================================================
// BRIDGES
// ============================================================================

#[test]
fn test_bridge_table_between_two_models() {
    let result = resolve(&playlist_catalog()).unwrap();
    let bridge = table(&result, "app::PlaylistTrack");
    assert_eq!(bridge.sql_name(), "playlist_track");
    assert_columns(bridge, &["playlist_id", "track_id", "position"]);
    let info = bridge.bridge().unwrap();
    assert_eq!((info.left.as_str(), info.right.as_str()), ("playlist", "track"));
    assert!(!bridge.has_primary_key_field());
}

#[test]
fn test_bridge_side_must_be_a_foreign_key() {
    let playlists = playlist_catalog();
    let descriptors = playlists.iter().cloned().map(|mut d| {
        if let Some(bridge) = d.bridge.as_mut() {
            bridge.right = "position".to_string();
        }
        d
    });
    assert_root_error(
        &resolve(&catalog(descriptors.collect::<Vec<_>>())),
        &ArchError::InvalidBridge {
            table: "playlist_track".to_string(),
            reason: "field `position` is not a foreign key".to_string(),
        },
    );
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_native_fields_become_one_column_each(
        fields in prop::collection::btree_map("[a-z]{1,8}", arb_jdbc_type(), 1..8),
    ) {
        let model = fields
            .iter()
            .fold(TypeBuilder::model("app::Thing"), |b, (name, jdbc)| b.field(name, jdbc.native_type()))
            .build();
        let result = resolve(&catalog([model])).unwrap();
        let thing = table(&result, "app::Thing");

        let columns: Vec<(String, JdbcType)> = thing
            .own_columns()
            .map(|c| (c.sql_name().to_string(), c.jdbc_type()))
            .collect();
        let expected: Vec<(String, JdbcType)> = fields.into_iter().collect();
        prop_assert_eq!(columns, expected);
        prop_assert!(thing.fields().iter().all(|f| f.kind() == FieldKind::Native));
        prop_assert_eq!(thing.has_primary_key_field(), thing.field("id").is_some());
    }
}
