use crate::predicate::{BoolPredicate, Predicate, PredicateKind};

/// Wrap `predicate` in one implicit nested predicate per NESTED ancestor,
/// outermost first.
pub(crate) fn wrap_implicit(predicate: Predicate, chain: &[String]) -> Predicate {
    chain.iter().rev().fold(predicate, |inner, path| {
        Predicate::new(PredicateKind::Nested {
            path: path.clone(),
            implicit: true,
            inner: Box::new(inner),
        })
    })
}

/// Whether `path` equals `object` or lies inside it.
pub(crate) fn is_within(path: &str, object: &str) -> bool {
    path == object
        || path
            .strip_prefix(object)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Remove the implicit wrappers an explicit `nested(object)` makes
/// redundant: those for `object` itself and for its ancestors.
///
/// The stripped wrapper's modifiers move onto its inner predicate.
pub(crate) fn strip_implicit(predicate: Predicate, object: &str) -> Predicate {
    let Predicate {
        kind,
        boost,
        constant_score,
    } = predicate;

    let kind = match kind {
        PredicateKind::Nested {
            path,
            implicit: true,
            inner,
        } if is_within(object, &path) => {
            let inner = strip_implicit(*inner, object);
            return transfer_modifiers(inner, boost, constant_score);
        }
        PredicateKind::Bool(b) => PredicateKind::Bool(BoolPredicate {
            must: strip_all(b.must, object),
            should: strip_all(b.should, object),
            filter: strip_all(b.filter, object),
            must_not: strip_all(b.must_not, object),
            minimum_should_match: b.minimum_should_match,
        }),
        PredicateKind::Not(inner) => PredicateKind::Not(Box::new(strip_implicit(*inner, object))),
        PredicateKind::MatchAll { except } => PredicateKind::MatchAll {
            except: strip_all(except, object),
        },
        other => other,
    };

    Predicate {
        kind,
        boost,
        constant_score,
    }
}

fn strip_all(predicates: Vec<Predicate>, object: &str) -> Vec<Predicate> {
    predicates
        .into_iter()
        .map(|p| strip_implicit(p, object))
        .collect()
}

fn transfer_modifiers(mut inner: Predicate, boost: Option<f32>, constant_score: bool) -> Predicate {
    if constant_score {
        inner.constant_score = true;
        inner.boost = boost;
    } else if let Some(boost) = boost {
        inner = inner.boost(boost);
    }

    inner
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> Predicate {
        Predicate::new(PredicateKind::MatchNone)
    }

    fn chain(paths: &[&str]) -> Vec<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn wrap_orders_outermost_first() {
        let wrapped = wrap_implicit(leaf(), &chain(&["a", "a.b"]));

        let PredicateKind::Nested { path, inner, .. } = wrapped.kind else {
            panic!("expected nested wrapper");
        };
        assert_eq!(path, "a");
        assert!(matches!(inner.kind, PredicateKind::Nested { ref path, .. } if path == "a.b"));
    }

    #[test]
    fn strip_removes_wrappers_for_object_and_ancestors_only() {
        let wrapped = wrap_implicit(leaf(), &chain(&["a", "a.b", "a.b.c"]));
        let stripped = strip_implicit(wrapped, "a.b");

        assert!(matches!(
            stripped.kind,
            PredicateKind::Nested { ref path, implicit: true, .. } if path == "a.b.c"
        ));
    }

    #[test]
    fn strip_moves_boost_onto_inner_predicate() {
        let wrapped = wrap_implicit(leaf(), &chain(&["a"])).boost(3.0);
        let stripped = strip_implicit(wrapped, "a");

        assert!(matches!(stripped.kind, PredicateKind::MatchNone));
        assert_eq!(stripped.boost, Some(3.0));
    }

    #[test]
    fn within_requires_segment_boundary() {
        assert!(is_within("a.b", "a"));
        assert!(is_within("a", "a"));
        assert!(!is_within("ab", "a"));
        assert!(!is_within("a", "a.b"));
    }
}
