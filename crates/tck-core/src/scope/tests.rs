use super::*;
use crate::{
    error::ErrorClass,
    predicate::{NamedPredicateContext, Predicate},
    schema::{
        FieldOptions, IndexSchemaBuilder, PassThroughConverter, PrefixIdConverter,
        standard_traits,
    },
    types::{ANALYZED_STRING, BIG_DECIMAL, FieldTypeDescriptor, INTEGER, KEYWORD, LONG},
};

#[derive(Debug)]
struct Everything;

impl NamedPredicateDefinition for Everything {
    fn create(&self, context: &NamedPredicateContext<'_>) -> Result<Predicate, SearchError> {
        Ok(context.factory().match_all())
    }
}

fn index(build: impl FnOnce(&mut IndexSchemaBuilder), name: &str) -> Arc<IndexSchema> {
    let mut builder = IndexSchemaBuilder::new(name);
    build(&mut builder);

    Arc::new(IndexSchema::realize(builder, standard_traits).expect("schema should realize"))
}

/// Index `name` declaring the one value field `field`.
fn field_index(
    name: &str,
    field: &str,
    ty: &'static FieldTypeDescriptor,
    options: FieldOptions,
) -> Arc<IndexSchema> {
    let mut builder = IndexSchemaBuilder::new(name);
    builder.field(field, ty, options);

    Arc::new(IndexSchema::realize(builder, standard_traits).expect("schema should realize"))
}

fn scope(indexes: Vec<Arc<IndexSchema>>) -> ScopeModel {
    ScopeModel::new(indexes).expect("non-empty scope")
}

#[test]
fn unknown_field_names_every_index() {
    let scope = scope(vec![
        field_index("first", "a", &INTEGER, FieldOptions::new()),
        field_index("second", "a", &INTEGER, FieldOptions::new()),
    ]);

    let err = scope.field("missing").expect_err("unknown path");

    assert!(err.is(ErrorClass::Schema));
    assert!(err.message.contains("Unknown field 'missing'"));
    assert!(err.context.indexes.contains("first"));
    assert!(err.context.indexes.contains("second"));
}

#[test]
fn indexes_lacking_the_field_are_ignored() {
    let scope = scope(vec![
        field_index("main", "a", &INTEGER, FieldOptions::new()),
        field_index("missing", "other", &KEYWORD, FieldOptions::new()),
    ]);

    let field = scope.field("a").expect("present in one index");
    let target = field
        .target(&SearchTrait::Match, ValueConvert::Yes)
        .expect("match is supported");

    assert_eq!(field.index_names().collect::<Vec<_>>(), vec!["main"]);
    assert_eq!(target.codec.to_string(), "IntegerFieldCodec");
}

#[test]
fn codec_divergence_is_reported_with_both_values() {
    let scope = scope(vec![
        field_index("two", "price", &BIG_DECIMAL, FieldOptions::new()),
        field_index(
            "seven",
            "price",
            &BIG_DECIMAL,
            FieldOptions::new().decimal_scale(7),
        ),
    ]);

    let err = scope
        .field("price")
        .and_then(|f| f.target(&SearchTrait::Match, ValueConvert::Yes))
        .expect_err("scales differ");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("decimalScale=2"));
    assert!(err.message.contains("decimalScale=7"));
    assert_eq!(err.context.field_path.as_deref(), Some("price"));
}

#[test]
fn partial_trait_support_is_inconsistent() {
    let scope = scope(vec![
        field_index("searchable", "n", &INTEGER, FieldOptions::new()),
        field_index(
            "hidden",
            "n",
            &INTEGER,
            FieldOptions::new().searchable(false),
        ),
    ]);

    let field = scope.field("n").expect("field");
    let err = field
        .target(&SearchTrait::Range, ValueConvert::Yes)
        .expect_err("one index cannot search");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Inconsistent support for 'predicate:range'"));
    assert!(!field.traits().contains(&SearchTrait::Range));
}

#[test]
fn trait_supported_nowhere_is_a_schema_error() {
    let scope = scope(vec![field_index(
        "main",
        "text",
        &ANALYZED_STRING,
        FieldOptions::new(),
    )]);

    let err = scope
        .field("text")
        .and_then(|f| f.target(&SearchTrait::Range, ValueConvert::Yes))
        .expect_err("range on analyzed text");

    assert!(err.is(ErrorClass::Schema));
    assert!(err.message.contains("predicate:range"));
    assert!(err.message.contains("'text'"));
}

#[test]
fn converter_divergence_is_bypassed_without_conversion() {
    let converter: Arc<dyn crate::schema::ValueConverter> =
        Arc::new(PassThroughConverter::named("wrapped"));
    let scope = scope(vec![
        field_index("plain", "n", &INTEGER, FieldOptions::new()),
        field_index(
            "converted",
            "n",
            &INTEGER,
            FieldOptions::new().dsl_converter(converter),
        ),
    ]);
    let field = scope.field("n").expect("field");

    let err = field
        .target(&SearchTrait::Match, ValueConvert::Yes)
        .expect_err("converters differ");
    assert!(err.message.contains("DSL converter differs: pass-through vs. wrapped"));

    let target = field
        .target(&SearchTrait::Match, ValueConvert::No)
        .expect("raw values bypass converters");
    assert!(target.converter.is_none());

    field
        .target(&SearchTrait::Exists, ValueConvert::Yes)
        .expect("exists ignores converters");
}

#[test]
fn field_kind_mismatch_is_inconsistent() {
    let scope = scope(vec![
        field_index("leaf", "thing", &LONG, FieldOptions::new()),
        index(
            |b| {
                b.object_field("thing", ObjectStructure::Nested, false);
            },
            "object",
        ),
    ]);

    let err = scope.node("thing").expect_err("kinds differ");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Field kind differs"));
}

#[test]
fn nested_hierarchy_divergence_is_reported() {
    let scope = scope(vec![
        index(
            |b| {
                b.object_field("obj", ObjectStructure::Nested, true)
                    .field("k", &KEYWORD, FieldOptions::new());
            },
            "nested",
        ),
        index(
            |b| {
                b.object_field("obj", ObjectStructure::Flattened, true)
                    .field("k", &KEYWORD, FieldOptions::new());
            },
            "flattened",
        ),
    ]);

    let err = scope
        .field("obj.k")
        .and_then(|f| f.target(&SearchTrait::Match, ValueConvert::Yes))
        .expect_err("nested vs flattened parent");

    assert!(err.message.contains("Nested path hierarchy differs"));
}

#[test]
fn identifier_converters_must_agree_unless_disabled() {
    let prefixed = index(
        |b| {
            b.id_converter(Arc::new(PrefixIdConverter::new("document")));
        },
        "prefixed",
    );
    let plain = index(|_| {}, "plain");
    let scope = scope(vec![prefixed, plain]);

    let err = scope
        .id_converter(ValueConvert::Yes)
        .expect_err("converters differ");
    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Identifier converter differs: document vs. none"));

    assert!(
        scope
            .id_converter(ValueConvert::No)
            .expect("disabled conversion")
            .is_none()
    );
}

#[test]
fn named_predicate_needs_the_same_definition_instance() {
    let shared: Arc<dyn NamedPredicateDefinition> = Arc::new(Everything);
    let declare = |definition: &Arc<dyn NamedPredicateDefinition>, name: &str| {
        let definition = definition.clone();
        index(
            move |b| {
                b.named_predicate("everything", definition);
            },
            name,
        )
    };

    let agreeing = scope(vec![declare(&shared, "left"), declare(&shared, "right")]);
    agreeing
        .named_predicate("everything")
        .expect("shared definition");

    let other: Arc<dyn NamedPredicateDefinition> = Arc::new(Everything);
    let diverging = scope(vec![declare(&shared, "left"), declare(&other, "right")]);
    let err = diverging
        .named_predicate("everything")
        .expect_err("distinct instances");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Predicate definition differs: Everything@"));
    let (_, rendered) = err.message.split_once("differs: ").expect("diagnostic detail");
    let (left, right) = rendered.split_once(" vs. ").expect("both definitions");
    assert_ne!(left, right.trim_end_matches('.'));
}

#[test]
fn named_predicate_missing_in_one_index_is_inconsistent() {
    let scope = scope(vec![
        index(
            |b| {
                b.named_predicate("everything", Arc::new(Everything));
            },
            "declaring",
        ),
        field_index("silent", "a", &INTEGER, FieldOptions::new()),
    ]);

    let err = scope
        .named_predicate("everything")
        .expect_err("declared in one index only");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Inconsistent support for 'predicate:named:everything'"));
}

#[test]
fn analyzer_divergence_is_reported_for_text_traits() {
    let scope = scope(vec![
        field_index("standard", "text", &ANALYZED_STRING, FieldOptions::new()),
        field_index(
            "whitespace",
            "text",
            &ANALYZED_STRING,
            FieldOptions::new().analyzer("whitespace"),
        ),
    ]);
    let field = scope.field("text").expect("field");

    let err = field
        .target(&SearchTrait::Match, ValueConvert::Yes)
        .expect_err("analyzers differ");
    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Analyzer differs: standard vs. whitespace"));

    field
        .target(&SearchTrait::Exists, ValueConvert::Yes)
        .expect("exists ignores analysis");
}

#[test]
fn normalizer_divergence_is_reported() {
    let scope = scope(vec![
        field_index("raw", "code", &KEYWORD, FieldOptions::new()),
        field_index(
            "lowercased",
            "code",
            &KEYWORD,
            FieldOptions::new().normalizer("lowercase"),
        ),
    ]);

    let err = scope
        .field("code")
        .and_then(|f| f.target(&SearchTrait::Terms, ValueConvert::Yes))
        .expect_err("normalizers differ");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Normalizer differs: none vs. lowercase"));
}

#[test]
fn object_structure_divergence_is_reported() {
    let scope = scope(vec![
        index(
            |b| {
                b.object_field("obj", ObjectStructure::Nested, true);
            },
            "nested",
        ),
        index(
            |b| {
                b.object_field("obj", ObjectStructure::Flattened, true);
            },
            "flattened",
        ),
    ]);

    let err = scope
        .object("obj")
        .and_then(|o| o.target(&SearchTrait::Exists))
        .expect_err("structures differ");

    assert!(err.is(ErrorClass::Inconsistency));
    assert!(err.message.contains("Structure differs"));
    assert_eq!(err.context.field_path.as_deref(), Some("obj"));
}
