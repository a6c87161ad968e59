use super::*;
use crate::{
    error::ErrorClass,
    types::{ANALYZED_STRING, BIG_DECIMAL, GEO_POINT, INTEGER, KEYWORD, VECTOR},
};

fn realize(builder: IndexSchemaBuilder) -> IndexSchema {
    IndexSchema::realize(builder, standard_traits).expect("schema should realize")
}

#[test]
fn nested_chain_lists_nested_ancestors_outermost_first() {
    let mut builder = IndexSchemaBuilder::new("books");
    let outer = builder.object_field("nested", ObjectStructure::Nested, true);
    let middle = outer.object_field("flattened", ObjectStructure::Flattened, true);
    middle
        .object_field("nested", ObjectStructure::Nested, true)
        .field("keyword_field", &KEYWORD, FieldOptions::new());

    let schema = realize(builder);
    let field = schema
        .field("nested.flattened.nested.keyword_field")
        .expect("leaf should exist");

    assert_eq!(
        field.nested_chain,
        vec!["nested".to_string(), "nested.flattened.nested".to_string()]
    );
    assert_eq!(field.parent_path(), Some("nested.flattened.nested"));
    assert!(schema.object("nested.flattened").is_some());
    assert!(
        schema
            .object("nested")
            .expect("object")
            .traits
            .contains(&SearchTrait::Nested)
    );
}

#[test]
fn codec_reflects_resolved_options() {
    let mut builder = IndexSchemaBuilder::new("prices");
    builder
        .field("default_scale", &BIG_DECIMAL, FieldOptions::new())
        .field("wide_scale", &BIG_DECIMAL, FieldOptions::new().decimal_scale(7))
        .field("embedding", &VECTOR, FieldOptions::new());

    let schema = realize(builder);

    assert_eq!(
        schema.field("default_scale").expect("field").codec.to_string(),
        "DecimalFieldCodec[decimalScale=2]"
    );
    assert_eq!(
        schema.field("wide_scale").expect("field").codec.to_string(),
        "DecimalFieldCodec[decimalScale=7]"
    );
    assert_eq!(
        schema.field("embedding").expect("field").codec.to_string(),
        "VectorFieldCodec[dimension=3]"
    );
}

#[test]
fn analyzed_strings_default_to_standard_analyzer() {
    let mut builder = IndexSchemaBuilder::new("idx");
    builder.field("text", &ANALYZED_STRING, FieldOptions::new());

    let schema = realize(builder);
    let field = schema.field("text").expect("field");

    assert_eq!(field.options.analyzer.as_deref(), Some("standard"));
    assert!(field.supports(&SearchTrait::Phrase));
    assert!(!field.supports(&SearchTrait::Range));
}

#[test]
fn duplicate_field_is_rejected() {
    let mut builder = IndexSchemaBuilder::new("idx");
    builder
        .field("a", &INTEGER, FieldOptions::new())
        .field("a", &KEYWORD, FieldOptions::new());

    let err = IndexSchema::realize(builder, standard_traits).expect_err("duplicate");

    assert!(err.is(ErrorClass::Schema));
    assert!(err.message.contains("Duplicate field 'a'"));
}

#[test]
fn dotted_names_are_rejected() {
    let mut builder = IndexSchemaBuilder::new("idx");
    builder.field("a.b", &INTEGER, FieldOptions::new());

    let err = IndexSchema::realize(builder, standard_traits).expect_err("dotted name");

    assert!(err.is(ErrorClass::Schema));
}

#[test]
fn analyzer_on_numeric_field_is_rejected() {
    let mut builder = IndexSchemaBuilder::new("idx");
    builder.field("n", &INTEGER, FieldOptions::new().analyzer("standard"));

    let err = IndexSchema::realize(builder, standard_traits).expect_err("analyzer on integer");

    assert!(err.is(ErrorClass::Argument));
    assert!(err.context.indexes.contains("idx"));
}

#[test]
fn unsearchable_fields_advertise_no_predicate_trait() {
    for ty in [&INTEGER, &KEYWORD, &GEO_POINT, &VECTOR] {
        let traits = standard_traits(ty, &FieldOptions::new().searchable(false).projectable(true));

        assert!(traits.iter().all(|t| !t.is_predicate()), "{}", ty.name());
        assert!(traits.contains(&SearchTrait::ProjectionField));
    }
}

#[test]
fn trait_names_render_with_namespace() {
    assert_eq!(SearchTrait::Match.to_string(), "predicate:match");
    assert_eq!(
        SearchTrait::SpatialWithinCircle.to_string(),
        "predicate:spatial:within-circle"
    );
    assert_eq!(
        SearchTrait::Named("byAuthor".into()).to_string(),
        "predicate:named:byAuthor"
    );
}

#[test]
fn path_helpers_split_on_last_dot() {
    assert_eq!(parent_of("a.b.c"), Some("a.b"));
    assert_eq!(parent_of("a"), None);
    assert_eq!(leaf_name("a.b.c"), "c");
    assert_eq!(leaf_name("a"), "a");
}
