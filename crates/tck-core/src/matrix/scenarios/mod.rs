//! Module: matrix::scenarios
//! Responsibility: one `PredicateScenario` per shipped predicate kind.

mod field;
mod knn;
mod spatial;
mod text;


pub use field::{ExistsScenario, MatchScenario, RangeScenario, TermsScenario};
pub use knn::KnnScenario;
pub use spatial::{SpatialWithinBoundingBoxScenario, SpatialWithinCircleScenario};
pub use text::{PhraseScenario, RegexpScenario, SimpleQueryStringScenario, WildcardScenario};

use crate::matrix::PredicateScenario;

/// Every shipped scenario, in run order.
#[must_use]
pub fn standard_scenarios() -> Vec<Box<dyn PredicateScenario>> {
    vec![
        Box::new(MatchScenario),
        Box::new(RangeScenario),
        Box::new(TermsScenario),
        Box::new(ExistsScenario),
        Box::new(PhraseScenario),
        Box::new(WildcardScenario),
        Box::new(RegexpScenario),
        Box::new(SimpleQueryStringScenario),
        Box::new(SpatialWithinCircleScenario),
        Box::new(SpatialWithinBoundingBoxScenario),
        Box::new(KnnScenario),
    ]
}
