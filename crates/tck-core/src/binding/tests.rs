use super::*;
use crate::{
    schema::{IndexSchema, IndexSchemaBuilder, standard_traits},
    types::{BIG_DECIMAL, INTEGER, KEYWORD, LONG, all_types},
};
use proptest::prelude::*;

fn generate(types: &[&'static FieldTypeDescriptor]) -> (BindingTree, IndexSchema) {
    let mut builder = IndexSchemaBuilder::new("main");
    let tree = ObjectFieldBindingGenerator::new(types.iter().copied()).create_root(&mut builder);
    let schema = IndexSchema::realize(builder, standard_traits).expect("generated schema");

    (tree, schema)
}

fn arb_types() -> impl Strategy<Value = Vec<&'static FieldTypeDescriptor>> {
    prop::sample::subsequence(all_types().to_vec(), 1..=all_types().len())
}

#[test]
fn root_has_no_structure_and_an_empty_path() {
    let (tree, _) = generate(&[&KEYWORD]);
    let root = tree.root().expect("root binding");

    assert!(root.is_root());
    assert_eq!(root.absolute_path, "");
    assert_eq!(root.depth, 0);
    assert_eq!(root.nested.as_deref(), Some("nested"));
    assert_eq!(root.flattened.as_deref(), Some("flattened"));
}

#[test]
fn tree_is_a_full_binary_tree_up_to_max_depth() {
    let (tree, _) = generate(&[&KEYWORD]);

    // 2^0 + 2^1 + ... + 2^MAX_DEPTH
    assert_eq!(tree.len(), (1 << (MAX_DEPTH + 1)) - 1);

    let leaf = tree
        .get("nested.flattened.nested.flattened")
        .expect("deepest binding");
    assert_eq!(leaf.depth, MAX_DEPTH);
    assert_eq!(leaf.structure, Some(ObjectStructure::Flattened));
    assert!(leaf.nested.is_none() && leaf.flattened.is_none());
}

#[test]
fn paths_list_parents_before_children() {
    let (tree, _) = generate(&[&INTEGER]);
    let paths = tree.paths();

    assert_eq!(paths.len(), tree.len() - 1);
    assert_eq!(paths[0], "nested");
    for (idx, path) in paths.iter().enumerate() {
        if let Some(parent) = crate::schema::parent_of(path) {
            let parent_idx = paths.iter().position(|p| *p == parent).expect("parent listed");
            assert!(parent_idx < idx, "{parent} listed after {path}");
        }
    }
}

#[test]
fn leaf_paths_follow_the_object_path() {
    let (tree, _) = generate(&[&INTEGER, &KEYWORD]);

    assert_eq!(tree.leaf_path("", &KEYWORD), Some("keyword_field"));
    assert_eq!(
        tree.leaf_path("nested.flattened", &INTEGER),
        Some("nested.flattened.integer_field")
    );
    assert_eq!(tree.leaf_path("nested", &LONG), None);
}

#[test]
fn nested_ancestors_skip_flattened_objects() {
    let (tree, _) = generate(&[&KEYWORD]);

    assert_eq!(
        tree.nested_ancestors("nested.flattened.nested"),
        vec!["nested", "nested.flattened.nested"]
    );
    assert!(tree.nested_ancestors("flattened.flattened").is_empty());
    assert!(tree.nested_ancestors("").is_empty());
}

#[test]
fn declare_hook_changes_declared_types_not_paths() {
    let mut builder = IndexSchemaBuilder::new("incompatible");
    let tree = ObjectFieldBindingGenerator::new([&INTEGER, &BIG_DECIMAL])
        .declare(|ty| {
            if ty == &INTEGER {
                (&LONG, FieldOptions::new())
            } else {
                (ty, FieldOptions::new().decimal_scale(7))
            }
        })
        .create_root(&mut builder);
    let schema = IndexSchema::realize(builder, standard_traits).expect("schema");

    let integer = schema.field("nested.integer_field").expect("declared");
    assert_eq!(integer.field_type, &LONG);
    assert_eq!(tree.leaf_path("nested", &INTEGER), Some("nested.integer_field"));
    assert_eq!(
        schema
            .field("big_decimal_field")
            .and_then(|f| f.codec.decimal_scale()),
        Some(7)
    );
}

proptest! {
    #[test]
    fn generation_is_deterministic(types in arb_types()) {
        let (first, _) = generate(&types);
        let (second, _) = generate(&types);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_binding_is_declared_in_the_schema(types in arb_types()) {
        let (tree, schema) = generate(&types);

        for path in tree.paths() {
            let node = tree.get(path).expect("listed path");
            let object = schema.object(path).expect("object declared");
            prop_assert_eq!(Some(object.structure), node.structure);
            prop_assert!(node.depth <= MAX_DEPTH);
            prop_assert_eq!(node.nested.is_some(), node.depth < MAX_DEPTH);
        }
        for node in tree.paths().into_iter().filter_map(|p| tree.get(p)).chain(tree.root()) {
            let names = node.fields.iter().map(|f| f.field_type).collect::<Vec<_>>();
            prop_assert_eq!(&names, &types);
            for leaf in &node.fields {
                prop_assert!(schema.field(&leaf.absolute_path).is_some());
            }
        }
    }
}
