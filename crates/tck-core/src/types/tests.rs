use super::*;
use crate::value::Value;

#[test]
fn registry_lists_every_standard_type_once() {
    let registry = FieldTypeRegistry::global();
    let mut names = registry.iter().map(FieldTypeDescriptor::name).collect::<Vec<_>>();
    let len = names.len();
    names.sort();
    names.dedup();

    assert_eq!(len, 12);
    assert_eq!(names.len(), len, "type names must be unique");
    assert_eq!(registry.get("keyword"), Some(&KEYWORD));
    assert_eq!(registry.get("nope"), None);
}

#[test]
fn values_are_pairwise_distinct() {
    for ty in all_types() {
        let values = ty.test_values();
        let stored = values.all_stored();

        for (i, a) in stored.iter().enumerate() {
            for b in &stored[i + 1..] {
                assert_ne!(a, b, "duplicate test value for {}", ty.name());
            }
        }
        assert!(values.len() >= 2, "{} needs at least two values", ty.name());
    }
}

#[test]
fn ordered_values_are_ascending() {
    for ty in all_types()
        .iter()
        .filter(|ty| ty.value_kind().is_orderable() && !ty.is_analyzed())
    {
        let values = ty.test_values();
        for pair in values.all_stored().windows(2) {
            assert_eq!(
                pair[0].compare(&pair[1]),
                Some(std::cmp::Ordering::Less),
                "{} values must ascend",
                ty.name()
            );
        }
    }
}

#[test]
fn non_matching_value_is_not_stored() {
    for ty in all_types() {
        let values = ty.test_values();
        if let Some(other) = values.non_matching() {
            assert!(!values.all_stored().contains(other), "{}", ty.name());
            assert_eq!(other.kind(), Some(ty.value_kind()), "{}", ty.name());
        }
    }
}

#[test]
fn boolean_domain_has_two_values() {
    let values = BOOLEAN.test_values();

    assert_eq!(values.len(), 2);
    assert!(values.non_matching().is_none());
}

#[test]
fn normalized_arguments_differ_from_stored_values() {
    let values = NORMALIZED_STRING.test_values();

    assert_eq!(values.stored(0), &Value::from("Irving"));
    assert_eq!(values.matching(0), &Value::from("iRvInG"));
}

#[test]
fn leaf_field_names_follow_type_names() {
    assert_eq!(KEYWORD.field_name(), "keyword_field");
    assert_eq!(BIG_DECIMAL.field_name(), "big_decimal_field");
    assert_eq!(ANALYZED_STRING.default_analyzer(), Some(STANDARD_ANALYZER));
}
