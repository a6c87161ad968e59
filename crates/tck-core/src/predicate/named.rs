use crate::{
    error::SearchError,
    predicate::{Predicate, PredicateFactory},
    value::Value,
};
use std::{collections::BTreeMap, fmt};

///
/// NamedPredicateDefinition
///
/// Reusable predicate attached to a schema scope. Indexes agree on a named
/// predicate only when they share the same definition instance.
///

pub trait NamedPredicateDefinition: fmt::Debug + Send + Sync {
    fn create(&self, context: &NamedPredicateContext<'_>) -> Result<Predicate, SearchError>;
}

///
/// NamedPredicateContext
///
/// Factory relative to the scope the predicate is attached to, plus the
/// parameters passed at the call site.
///

pub struct NamedPredicateContext<'a> {
    factory: PredicateFactory<'a>,
    params: &'a BTreeMap<String, Value>,
}

impl<'a> NamedPredicateContext<'a> {
    pub(crate) const fn new(
        factory: PredicateFactory<'a>,
        params: &'a BTreeMap<String, Value>,
    ) -> Self {
        Self { factory, params }
    }

    #[must_use]
    pub const fn factory(&self) -> &PredicateFactory<'a> {
        &self.factory
    }

    /// Parameter value; a missing parameter is an argument error.
    pub fn param(&self, name: &str) -> Result<&Value, SearchError> {
        self.params.get(name).ok_or_else(|| {
            SearchError::argument(format!("Named predicate parameter '{name}' must not be null."))
        })
    }

    #[must_use]
    pub fn param_opt(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}
