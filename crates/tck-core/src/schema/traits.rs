use crate::{schema::FieldOptions, types::FieldTypeDescriptor};
use derive_more::{Deref, Display, IntoIterator};
use std::collections::BTreeSet;

///
/// SearchTrait
///
/// Named capability a field advertises. Predicate construction checks the
/// trait before building anything, so an unsupported use fails with the
/// trait name in the diagnostic.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum SearchTrait {
    #[display("predicate:match")]
    Match,
    #[display("predicate:range")]
    Range,
    #[display("predicate:terms")]
    Terms,
    #[display("predicate:exists")]
    Exists,
    #[display("predicate:phrase")]
    Phrase,
    #[display("predicate:wildcard")]
    Wildcard,
    #[display("predicate:regexp")]
    Regexp,
    #[display("predicate:simple-query-string")]
    SimpleQueryString,
    #[display("predicate:spatial:within-circle")]
    SpatialWithinCircle,
    #[display("predicate:spatial:within-bounding-box")]
    SpatialWithinBoundingBox,
    #[display("predicate:spatial:within-polygon")]
    SpatialWithinPolygon,
    #[display("predicate:knn")]
    Knn,
    #[display("predicate:nested")]
    Nested,
    #[display("predicate:named:{_0}")]
    Named(String),
    #[display("sort:field")]
    SortField,
    #[display("projection:field")]
    ProjectionField,
    #[display("aggregation:terms")]
    AggregationTerms,
}

impl SearchTrait {
    /// Traits whose arguments pass through the field's DSL converter.
    #[must_use]
    pub const fn converts_values(&self) -> bool {
        matches!(self, Self::Match | Self::Range | Self::Terms)
    }

    /// Traits that run the field's analyzer or normalizer on their input.
    #[must_use]
    pub const fn uses_analysis(&self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Terms
                | Self::Phrase
                | Self::Wildcard
                | Self::Regexp
                | Self::SimpleQueryString
        )
    }

    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        !matches!(
            self,
            Self::SortField | Self::ProjectionField | Self::AggregationTerms
        )
    }
}

///
/// TraitSet
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct TraitSet(BTreeSet<SearchTrait>);

impl TraitSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, search_trait: SearchTrait) -> bool {
        self.0.insert(search_trait)
    }

    /// Traits present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0.intersection(&other.0).cloned().collect())
    }
}

impl FromIterator<SearchTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = SearchTrait>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Traits a field of `ty` declared with `options` supports on a backend
/// that implements every predicate kind.
#[must_use]
pub fn standard_traits(ty: &FieldTypeDescriptor, options: &FieldOptions) -> TraitSet {
    let mut traits = TraitSet::new();
    let geo = ty.is_geo_point();
    let vector = ty.is_vector();
    let analyzed = ty.is_analyzed();

    if options.searchable {
        if !geo && !vector {
            traits.insert(SearchTrait::Match);
            traits.insert(SearchTrait::Terms);
        }
        if !analyzed && !geo && !vector {
            traits.insert(SearchTrait::Range);
        }
        traits.insert(SearchTrait::Exists);
        if analyzed {
            traits.insert(SearchTrait::Phrase);
        }
        if ty.is_string() {
            traits.insert(SearchTrait::Wildcard);
            traits.insert(SearchTrait::Regexp);
            traits.insert(SearchTrait::SimpleQueryString);
        }
        if geo {
            traits.insert(SearchTrait::SpatialWithinCircle);
            traits.insert(SearchTrait::SpatialWithinBoundingBox);
            traits.insert(SearchTrait::SpatialWithinPolygon);
        }
        if vector {
            traits.insert(SearchTrait::Knn);
        }
    }

    if options.sortable && !analyzed && !vector {
        traits.insert(SearchTrait::SortField);
    }
    if options.projectable {
        traits.insert(SearchTrait::ProjectionField);
    }
    if options.aggregable && !analyzed && !geo && !vector {
        traits.insert(SearchTrait::AggregationTerms);
    }

    traits
}
