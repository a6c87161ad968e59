//! Object-field semantics through the backend: NESTED instances scope
//! their clauses, FLATTENED ones do not, and implicit nesting agrees with
//! explicit wrappers at every level.

use tck::core::literal;
use tck_conformance::run_literal;

fn checks(check: literal::LiteralCheck) -> usize {
    run_literal(check).unwrap_or_else(|err| panic!("{err}")).checks
}

#[test]
fn nested_clauses_match_within_one_instance() {
    assert_eq!(checks(literal::nested_instance_scoping), 3);
}

#[test]
fn implicit_nesting_equals_explicit_wrappers() {
    assert_eq!(checks(literal::implicit_nesting), 3);
}

#[test]
fn object_exists_ignores_empty_instances() {
    assert_eq!(checks(literal::object_exists), 2);
}
