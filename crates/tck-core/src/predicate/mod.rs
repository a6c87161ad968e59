//! Module: predicate
//! Responsibility: backend-agnostic predicate tree and the factory that
//! validates arguments and field traits while building it.
//! Does not own: evaluation against stored documents.

mod factory;
mod model;
mod named;
mod nesting;

#[cfg(test)]
mod tests;

pub use crate::schema::ValueConvert;
pub use factory::{
    BoolBuilder, ExistsBuilder, IdBuilder, KnnBuilder, MatchBuilder, NamedBuilder, NestedBuilder,
    PatternBuilder, PhraseBuilder, PredicateFactory, RangeBuilder, SimpleQueryStringBuilder,
    SpatialBuilder, SpatialWithinBuilder, TermsBuilder,
};
pub use model::{
    Arg, BoolPredicate, BooleanOperator, FieldTarget, GeoShape, Predicate, PredicateKind,
    QueryParams, RangeBound,
};
pub use named::{NamedPredicateContext, NamedPredicateDefinition};
