//! Federated scopes over hand-written indexes: merged results and the
//! diagnostics raised when indexes disagree on a field.

use tck::core::literal;
use tck_conformance::run_literal;

fn checks(check: literal::LiteralCheck) -> usize {
    run_literal(check).unwrap_or_else(|err| panic!("{err}")).checks
}

#[test]
fn compatible_indexes_merge_hits_by_owner() {
    assert_eq!(checks(literal::federated_union), 1);
}

#[test]
fn indexes_without_the_field_are_ignored() {
    assert_eq!(checks(literal::missing_field_tolerated), 1);
}

#[test]
fn diverging_converters_fail_unless_conversion_is_disabled() {
    assert_eq!(checks(literal::converter_divergence), 2);
}

#[test]
fn converter_parses_text_arguments() {
    assert_eq!(checks(literal::text_parsing_converter), 2);
}

#[test]
fn partial_support_is_an_inconsistency() {
    assert_eq!(checks(literal::partial_support), 1);
}

#[test]
fn object_and_value_fields_do_not_mix() {
    assert_eq!(checks(literal::field_kind_divergence), 1);
}
