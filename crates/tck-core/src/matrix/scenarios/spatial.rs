use crate::{
    error::SearchError,
    matrix::PredicateScenario,
    predicate::{Predicate, PredicateFactory},
    schema::SearchTrait,
    types::TestValues,
    value::{GeoPoint, Value},
};

/// Test points are a degree apart; this radius isolates each one.
const RADIUS_METERS: f64 = 10_000.0;

/// Half side of the box drawn around a test point, in degrees.
const HALF_SIDE: f64 = 0.5;

///
/// SpatialWithinCircleScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SpatialWithinCircleScenario;

impl PredicateScenario for SpatialWithinCircleScenario {
    fn kind(&self) -> &'static str {
        "spatial-within-circle"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::SpatialWithinCircle
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        factory
            .spatial()
            .within()
            .field(path)
            .circle(values.stored(ordinal).clone(), RADIUS_METERS)
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .spatial()
                .within()
                .fields(paths.iter().copied())
                .circle(values.stored(ordinal).clone(), RADIUS_METERS),
        )
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .spatial()
                .within()
                .field(path)
                .circle(Value::Null, RADIUS_METERS),
        )
    }
}

///
/// SpatialWithinBoundingBoxScenario
///

#[derive(Clone, Copy, Debug, Default)]
pub struct SpatialWithinBoundingBoxScenario;

impl SpatialWithinBoundingBoxScenario {
    /// Corners of the box around the stored point. Non-point values are
    /// handed through so the predicate fails on the field, not the box.
    fn corners(ordinal: usize, values: &TestValues) -> (Value, Value) {
        let stored = values.stored(ordinal);
        match stored.as_geo_point() {
            Some(p) => (
                GeoPoint::new(p.latitude + HALF_SIDE, p.longitude - HALF_SIDE).into(),
                GeoPoint::new(p.latitude - HALF_SIDE, p.longitude + HALF_SIDE).into(),
            ),
            None => (stored.clone(), stored.clone()),
        }
    }
}

impl PredicateScenario for SpatialWithinBoundingBoxScenario {
    fn kind(&self) -> &'static str {
        "spatial-within-bounding-box"
    }

    fn required_trait(&self) -> SearchTrait {
        SearchTrait::SpatialWithinBoundingBox
    }

    fn predicate(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
        ordinal: usize,
        values: &TestValues,
    ) -> Result<Predicate, SearchError> {
        let (top_left, bottom_right) = Self::corners(ordinal, values);

        factory
            .spatial()
            .within()
            .field(path)
            .bounding_box(top_left, bottom_right)
    }

    fn multi_field_predicate(
        &self,
        factory: &PredicateFactory<'_>,
        paths: &[&str],
        ordinal: usize,
        values: &TestValues,
    ) -> Option<Result<Predicate, SearchError>> {
        let (top_left, bottom_right) = Self::corners(ordinal, values);

        Some(
            factory
                .spatial()
                .within()
                .fields(paths.iter().copied())
                .bounding_box(top_left, bottom_right),
        )
    }

    fn null_argument(
        &self,
        factory: &PredicateFactory<'_>,
        path: &str,
    ) -> Option<Result<Predicate, SearchError>> {
        Some(
            factory
                .spatial()
                .within()
                .field(path)
                .bounding_box(Value::Null, Value::Null),
        )
    }
}
