use crate::{
    error::{ErrorClass, SearchError},
    predicate::{
        Arg, BoolPredicate, BooleanOperator, FieldTarget, GeoShape, NamedPredicateContext,
        Predicate, PredicateKind, RangeBound,
        nesting::{is_within, strip_implicit, wrap_implicit},
    },
    schema::{SearchTrait, ValueConvert, raw_document_id},
    scope::{ScopeModel, ScopedNode},
    value::{GeoPoint, Value},
};
use std::collections::BTreeMap;

///
/// PredicateFactory
///
/// Entry point of the predicate DSL over one scope. Builders collect their
/// fields and arguments and validate everything in their terminal call,
/// which returns the finished predicate or the first error.
///

#[derive(Clone, Debug)]
pub struct PredicateFactory<'s> {
    scope: &'s ScopeModel,
    prefix: Option<String>,
}

impl<'s> PredicateFactory<'s> {
    #[must_use]
    pub const fn new(scope: &'s ScopeModel) -> Self {
        Self {
            scope,
            prefix: None,
        }
    }

    /// Factory whose paths are relative to `object_path`.
    #[must_use]
    pub fn relative_to(&self, object_path: Option<&str>) -> Self {
        Self {
            scope: self.scope,
            prefix: object_path.map(str::to_string),
        }
    }

    #[must_use]
    pub const fn scope(&self) -> &'s ScopeModel {
        self.scope
    }

    fn absolute(&self, path: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{path}"),
            None => path.to_string(),
        }
    }

    // leaf predicates

    #[must_use]
    pub fn match_field(&self, path: &str) -> MatchBuilder<'s> {
        MatchBuilder {
            fields: FieldList::new(self.clone()).with(path, None),
        }
    }

    #[must_use]
    pub fn range(&self) -> RangeBuilder<'s> {
        RangeBuilder {
            fields: FieldList::new(self.clone()),
        }
    }

    #[must_use]
    pub fn terms(&self) -> TermsBuilder<'s> {
        TermsBuilder {
            fields: FieldList::new(self.clone()),
        }
    }

    #[must_use]
    pub fn exists(&self, path: &str) -> ExistsBuilder<'s> {
        ExistsBuilder {
            factory: self.clone(),
            path: self.absolute(path),
        }
    }

    #[must_use]
    pub fn phrase(&self) -> PhraseBuilder<'s> {
        PhraseBuilder {
            fields: FieldList::new(self.clone()),
            slop: 0,
        }
    }

    #[must_use]
    pub fn wildcard(&self) -> PatternBuilder<'s> {
        PatternBuilder {
            fields: FieldList::new(self.clone()),
            regexp: false,
        }
    }

    #[must_use]
    pub fn regexp(&self) -> PatternBuilder<'s> {
        PatternBuilder {
            fields: FieldList::new(self.clone()),
            regexp: true,
        }
    }

    #[must_use]
    pub fn simple_query_string(&self) -> SimpleQueryStringBuilder<'s> {
        SimpleQueryStringBuilder {
            fields: FieldList::new(self.clone()),
            default_operator: BooleanOperator::default(),
        }
    }

    #[must_use]
    pub fn spatial(&self) -> SpatialBuilder<'s> {
        SpatialBuilder {
            factory: self.clone(),
        }
    }

    #[must_use]
    pub fn knn(&self, k: usize) -> KnnBuilder<'s> {
        KnnBuilder {
            fields: FieldList::new(self.clone()),
            k,
            filter: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> IdBuilder<'s> {
        IdBuilder {
            factory: self.clone(),
            values: Vec::new(),
            convert: ValueConvert::Yes,
        }
    }

    #[must_use]
    pub fn nested(&self, object_path: &str) -> NestedBuilder<'s> {
        NestedBuilder {
            factory: self.clone(),
            path: self.absolute(object_path),
            clauses: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(&self, path: &str) -> NamedBuilder<'s> {
        NamedBuilder {
            factory: self.clone(),
            path: self.absolute(path),
            params: BTreeMap::new(),
        }
    }

    // composites

    #[must_use]
    pub fn match_all(&self) -> Predicate {
        Predicate::new(PredicateKind::MatchAll { except: Vec::new() })
    }

    #[must_use]
    pub fn match_none(&self) -> Predicate {
        Predicate::new(PredicateKind::MatchNone)
    }

    /// Conjunction; an empty conjunction matches everything.
    #[must_use]
    pub fn and(&self, predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let must = predicates.into_iter().collect::<Vec<_>>();
        if must.is_empty() {
            return self.match_all();
        }

        Predicate::new(PredicateKind::Bool(BoolPredicate {
            must,
            ..BoolPredicate::default()
        }))
    }

    /// Disjunction; an empty disjunction matches nothing.
    #[must_use]
    pub fn or(&self, predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        let should = predicates.into_iter().collect::<Vec<_>>();
        if should.is_empty() {
            return self.match_none();
        }

        Predicate::new(PredicateKind::Bool(BoolPredicate {
            should,
            ..BoolPredicate::default()
        }))
    }

    #[must_use]
    pub fn not(&self, predicate: Predicate) -> Predicate {
        Predicate::new(PredicateKind::Not(Box::new(predicate)))
    }

    #[must_use]
    pub fn bool(&self) -> BoolBuilder {
        BoolBuilder::default()
    }
}

///
/// FieldList
///
/// Fields accumulated by a builder, resolved against the scope only in the
/// terminal call.
///

#[derive(Clone, Debug)]
struct FieldList<'s> {
    factory: PredicateFactory<'s>,
    fields: Vec<(String, Option<f32>)>,
    convert: ValueConvert,
}

impl<'s> FieldList<'s> {
    const fn new(factory: PredicateFactory<'s>) -> Self {
        Self {
            factory,
            fields: Vec::new(),
            convert: ValueConvert::Yes,
        }
    }

    fn with(mut self, path: &str, boost: Option<f32>) -> Self {
        self.fields.push((self.factory.absolute(path), boost));
        self
    }

    fn resolve(
        &self,
        search_trait: &SearchTrait,
    ) -> Result<(Vec<FieldTarget>, Vec<String>), SearchError> {
        if self.fields.is_empty() {
            return Err(SearchError::empty_argument("fields"));
        }

        let mut targets = Vec::with_capacity(self.fields.len());
        for (path, boost) in &self.fields {
            let mut target = self
                .factory
                .scope
                .field(path)?
                .target(search_trait, self.convert)?;
            target.boost = *boost;
            targets.push(target);
        }

        let chain = targets[0].nested_chain.clone();
        if let Some(other) = targets.iter().find(|t| t.nested_chain != chain) {
            return Err(SearchError::new(
                ErrorClass::Schema,
                format!(
                    "Fields '{}' and '{}' belong to different nested objects; \
                     a single predicate cannot target both.",
                    targets[0].path, other.path
                ),
            ));
        }

        Ok((targets, chain))
    }

    /// Wrap a finished field predicate in its implicit nested predicates.
    fn finish(chain: &[String], kind: PredicateKind) -> Predicate {
        wrap_implicit(Predicate::new(kind), chain)
    }
}

macro_rules! field_builder_methods {
    () => {
        /// Add a field to target.
        #[must_use]
        pub fn field(mut self, path: &str) -> Self {
            self.fields = self.fields.with(path, None);
            self
        }

        /// Add a field whose contribution to the score is multiplied by `boost`.
        #[must_use]
        pub fn field_with_boost(mut self, path: &str, boost: f32) -> Self {
            self.fields = self.fields.with(path, Some(boost));
            self
        }

        /// Add several fields at once.
        #[must_use]
        pub fn fields<'p>(mut self, paths: impl IntoIterator<Item = &'p str>) -> Self {
            for path in paths {
                self.fields = self.fields.with(path, None);
            }
            self
        }
    };
}

///
/// MatchBuilder
///

#[derive(Clone, Debug)]
pub struct MatchBuilder<'s> {
    fields: FieldList<'s>,
}

impl MatchBuilder<'_> {
    field_builder_methods!();

    /// Bypass DSL converters and match raw index values.
    #[must_use]
    pub const fn convert(mut self, convert: ValueConvert) -> Self {
        self.fields.convert = convert;
        self
    }

    pub fn matching(self, value: impl Into<Value>) -> Result<Predicate, SearchError> {
        let value = value.into();
        let (targets, chain) = self.fields.resolve(&SearchTrait::Match)?;
        for target in &targets {
            target.convert(&value)?;
        }

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Match {
                fields: targets,
                value: Arg::Literal(value),
            },
        ))
    }

    /// Match the value of query parameter `name`, bound at execution.
    pub fn matching_param(self, name: &str) -> Result<Predicate, SearchError> {
        let (targets, chain) = self.fields.resolve(&SearchTrait::Match)?;

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Match {
                fields: targets,
                value: Arg::Param(name.to_string()),
            },
        ))
    }
}

///
/// RangeBuilder
///

#[derive(Clone, Debug)]
pub struct RangeBuilder<'s> {
    fields: FieldList<'s>,
}

impl RangeBuilder<'_> {
    field_builder_methods!();

    #[must_use]
    pub const fn convert(mut self, convert: ValueConvert) -> Self {
        self.fields.convert = convert;
        self
    }

    /// Inclusive on both ends; a null bound leaves that side open.
    pub fn between(
        self,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Result<Predicate, SearchError> {
        self.within(included(lower.into()), included(upper.into()))
    }

    pub fn at_least(self, value: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.within(included(value.into()), RangeBound::Unbounded)
    }

    pub fn greater_than(self, value: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.within(excluded(value.into()), RangeBound::Unbounded)
    }

    pub fn at_most(self, value: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.within(RangeBound::Unbounded, included(value.into()))
    }

    pub fn less_than(self, value: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.within(RangeBound::Unbounded, excluded(value.into()))
    }

    /// Inclusive range whose bounds are query parameters.
    pub fn between_params(self, lower: &str, upper: &str) -> Result<Predicate, SearchError> {
        self.within(
            RangeBound::Included(Arg::Param(lower.to_string())),
            RangeBound::Included(Arg::Param(upper.to_string())),
        )
    }

    pub fn within(self, lower: RangeBound, upper: RangeBound) -> Result<Predicate, SearchError> {
        let (targets, chain) = self.fields.resolve(&SearchTrait::Range)?;
        if matches!(lower, RangeBound::Unbounded) && matches!(upper, RangeBound::Unbounded) {
            return Err(SearchError::argument(
                "Invalid range: at least one bound must not be null.",
            ));
        }
        for bound in [&lower, &upper] {
            if let Some(Arg::Literal(value)) = bound.arg() {
                for target in &targets {
                    target.convert(value)?;
                }
            }
        }

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Range {
                fields: targets,
                lower,
                upper,
            },
        ))
    }
}

fn included(value: Value) -> RangeBound {
    if value.is_null() {
        RangeBound::Unbounded
    } else {
        RangeBound::Included(Arg::Literal(value))
    }
}

fn excluded(value: Value) -> RangeBound {
    if value.is_null() {
        RangeBound::Unbounded
    } else {
        RangeBound::Excluded(Arg::Literal(value))
    }
}

///
/// TermsBuilder
///

#[derive(Clone, Debug)]
pub struct TermsBuilder<'s> {
    fields: FieldList<'s>,
}

impl TermsBuilder<'_> {
    field_builder_methods!();

    #[must_use]
    pub const fn convert(mut self, convert: ValueConvert) -> Self {
        self.fields.convert = convert;
        self
    }

    /// Documents with at least one of `values`.
    pub fn matching_any<V: Into<Value>>(
        self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Predicate, SearchError> {
        self.build(values, false)
    }

    /// Documents with every one of `values`.
    pub fn matching_all<V: Into<Value>>(
        self,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Predicate, SearchError> {
        self.build(values, true)
    }

    fn build<V: Into<Value>>(
        self,
        values: impl IntoIterator<Item = V>,
        match_all: bool,
    ) -> Result<Predicate, SearchError> {
        let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        let (targets, chain) = self.fields.resolve(&SearchTrait::Terms)?;
        if values.is_empty() {
            return Err(SearchError::empty_argument("terms"));
        }
        for value in &values {
            for target in &targets {
                target.convert(value)?;
            }
        }

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Terms {
                fields: targets,
                values,
                match_all,
            },
        ))
    }
}

///
/// ExistsBuilder
///

#[derive(Clone, Debug)]
pub struct ExistsBuilder<'s> {
    factory: PredicateFactory<'s>,
    path: String,
}

impl ExistsBuilder<'_> {
    /// Documents with at least one value for the field, or at least one
    /// non-empty instance of the object field.
    pub fn build(self) -> Result<Predicate, SearchError> {
        let (object, chain) = match self.factory.scope.node(&self.path)? {
            ScopedNode::Field(field) => {
                let target = field.target(&SearchTrait::Exists, ValueConvert::Yes)?;
                (false, target.nested_chain)
            }
            ScopedNode::Object(object) => {
                let (_, chain) = object.target(&SearchTrait::Exists)?;
                (true, chain)
            }
        };

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Exists {
                path: self.path,
                object,
            },
        ))
    }
}

///
/// PhraseBuilder
///

#[derive(Clone, Debug)]
pub struct PhraseBuilder<'s> {
    fields: FieldList<'s>,
    slop: u32,
}

impl PhraseBuilder<'_> {
    field_builder_methods!();

    /// Maximum number of position moves allowed between phrase terms.
    #[must_use]
    pub const fn slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    pub fn matching(self, text: impl Into<Value>) -> Result<Predicate, SearchError> {
        let text = text.into();
        let (targets, chain) = self.fields.resolve(&SearchTrait::Phrase)?;
        check_literal_text(&Arg::Literal(text.clone()))?;

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Phrase {
                fields: targets,
                text: Arg::Literal(text),
                slop: self.slop,
            },
        ))
    }

    pub fn matching_param(self, name: &str) -> Result<Predicate, SearchError> {
        let (targets, chain) = self.fields.resolve(&SearchTrait::Phrase)?;

        Ok(FieldList::finish(
            &chain,
            PredicateKind::Phrase {
                fields: targets,
                text: Arg::Param(name.to_string()),
                slop: self.slop,
            },
        ))
    }
}

///
/// PatternBuilder
///
/// Wildcard (`*`, `?`) or regular-expression predicate, anchored on the
/// whole indexed term.
///

#[derive(Clone, Debug)]
pub struct PatternBuilder<'s> {
    fields: FieldList<'s>,
    regexp: bool,
}

impl PatternBuilder<'_> {
    field_builder_methods!();

    pub fn matching(self, pattern: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.build(Arg::Literal(pattern.into()))
    }

    pub fn matching_param(self, name: &str) -> Result<Predicate, SearchError> {
        self.build(Arg::Param(name.to_string()))
    }

    fn build(self, pattern: Arg) -> Result<Predicate, SearchError> {
        let search_trait = if self.regexp {
            SearchTrait::Regexp
        } else {
            SearchTrait::Wildcard
        };
        let (fields, chain) = self.fields.resolve(&search_trait)?;
        check_literal_text(&pattern)?;
        let kind = if self.regexp {
            PredicateKind::Regexp { fields, pattern }
        } else {
            PredicateKind::Wildcard { fields, pattern }
        };

        Ok(FieldList::finish(&chain, kind))
    }
}

///
/// SimpleQueryStringBuilder
///

#[derive(Clone, Debug)]
pub struct SimpleQueryStringBuilder<'s> {
    fields: FieldList<'s>,
    default_operator: BooleanOperator,
}

impl SimpleQueryStringBuilder<'_> {
    field_builder_methods!();

    #[must_use]
    pub const fn default_operator(mut self, operator: BooleanOperator) -> Self {
        self.default_operator = operator;
        self
    }

    pub fn matching(self, query: impl Into<Value>) -> Result<Predicate, SearchError> {
        self.build(Arg::Literal(query.into()))
    }

    pub fn matching_param(self, name: &str) -> Result<Predicate, SearchError> {
        self.build(Arg::Param(name.to_string()))
    }

    fn build(self, query: Arg) -> Result<Predicate, SearchError> {
        let (fields, chain) = self.fields.resolve(&SearchTrait::SimpleQueryString)?;
        check_literal_text(&query)?;

        Ok(FieldList::finish(
            &chain,
            PredicateKind::SimpleQueryString {
                fields,
                query,
                default_operator: self.default_operator,
            },
        ))
    }
}

///
/// SpatialBuilder
///

#[derive(Clone, Debug)]
pub struct SpatialBuilder<'s> {
    factory: PredicateFactory<'s>,
}

impl<'s> SpatialBuilder<'s> {
    #[must_use]
    pub fn within(self) -> SpatialWithinBuilder<'s> {
        SpatialWithinBuilder {
            fields: FieldList::new(self.factory),
        }
    }
}

///
/// SpatialWithinBuilder
///

#[derive(Clone, Debug)]
pub struct SpatialWithinBuilder<'s> {
    fields: FieldList<'s>,
}

impl SpatialWithinBuilder<'_> {
    field_builder_methods!();

    /// Points at most `radius_meters` away from `center`.
    pub fn circle(
        self,
        center: impl Into<Value>,
        radius_meters: f64,
    ) -> Result<Predicate, SearchError> {
        let center = center.into();

        self.build(&SearchTrait::SpatialWithinCircle, || {
            let center = geo_point(center, "center")?;
            if radius_meters.is_nan() || radius_meters <= 0.0 {
                return Err(SearchError::argument("'radius' must be strictly positive."));
            }

            Ok(GeoShape::Circle {
                center,
                radius_meters,
            })
        })
    }

    pub fn bounding_box(
        self,
        top_left: impl Into<Value>,
        bottom_right: impl Into<Value>,
    ) -> Result<Predicate, SearchError> {
        let (top_left, bottom_right) = (top_left.into(), bottom_right.into());

        self.build(&SearchTrait::SpatialWithinBoundingBox, || {
            let top_left = geo_point(top_left, "topLeft")?;
            let bottom_right = geo_point(bottom_right, "bottomRight")?;
            if top_left.latitude < bottom_right.latitude {
                return Err(SearchError::argument(
                    "Invalid bounding box: 'topLeft' must not lie south of 'bottomRight'.",
                ));
            }

            Ok(GeoShape::BoundingBox {
                top_left,
                bottom_right,
            })
        })
    }

    pub fn polygon(
        self,
        points: impl IntoIterator<Item = GeoPoint>,
    ) -> Result<Predicate, SearchError> {
        let points = points.into_iter().collect::<Vec<_>>();

        self.build(&SearchTrait::SpatialWithinPolygon, || {
            if points.len() < 3 {
                return Err(SearchError::argument(
                    "Invalid polygon: 'points' must contain at least 3 points.",
                ));
            }

            Ok(GeoShape::Polygon(points))
        })
    }

    fn build<F>(self, search_trait: &SearchTrait, shape: F) -> Result<Predicate, SearchError>
    where
        F: FnOnce() -> Result<GeoShape, SearchError>,
    {
        let (fields, chain) = self.fields.resolve(search_trait)?;
        let shape = shape()?;

        Ok(FieldList::finish(
            &chain,
            PredicateKind::SpatialWithin { fields, shape },
        ))
    }
}

fn check_literal_text(arg: &Arg) -> Result<(), SearchError> {
    if let Arg::Literal(_) = arg {
        arg.resolve_text(&BTreeMap::new())?;
    }

    Ok(())
}

fn geo_point(value: Value, name: &str) -> Result<GeoPoint, SearchError> {
    match value {
        Value::Null => Err(SearchError::null_argument(name)),
        Value::GeoPoint(point) => Ok(point),
        other => Err(SearchError::argument(format!(
            "'{name}' must be a geo point, got '{other}'."
        ))),
    }
}

///
/// KnnBuilder
///
/// Approximate nearest neighbours on a single vector field.
///

#[derive(Clone, Debug)]
pub struct KnnBuilder<'s> {
    fields: FieldList<'s>,
    k: usize,
    filter: Option<Predicate>,
}

impl KnnBuilder<'_> {
    #[must_use]
    pub fn field(mut self, path: &str) -> Self {
        self.fields = self.fields.with(path, None);
        self
    }

    /// Only documents matching `filter` are neighbour candidates.
    #[must_use]
    pub fn filter(mut self, filter: Predicate) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn matching(self, vector: impl Into<Value>) -> Result<Predicate, SearchError> {
        let vector = vector.into();
        let target = self.check()?;
        target.convert(&vector)?;

        Ok(self.build(target, Arg::Literal(vector)))
    }

    pub fn matching_param(self, name: &str) -> Result<Predicate, SearchError> {
        let target = self.check()?;

        Ok(self.build(target, Arg::Param(name.to_string())))
    }

    fn check(&self) -> Result<FieldTarget, SearchError> {
        if self.k == 0 {
            return Err(SearchError::argument("'k' must be strictly positive."));
        }
        if self.fields.fields.len() > 1 {
            return Err(SearchError::argument(
                "A knn predicate targets exactly one vector field.",
            ));
        }
        let (mut targets, _) = self.fields.resolve(&SearchTrait::Knn)?;

        targets
            .pop()
            .ok_or_else(|| SearchError::empty_argument("fields"))
    }

    fn build(self, field: FieldTarget, vector: Arg) -> Predicate {
        let chain = field.nested_chain.clone();

        FieldList::finish(
            &chain,
            PredicateKind::Knn {
                field,
                k: self.k,
                vector,
                filter: self.filter.map(Box::new),
            },
        )
    }
}

///
/// IdBuilder
///

#[derive(Clone, Debug)]
pub struct IdBuilder<'s> {
    factory: PredicateFactory<'s>,
    values: Vec<Value>,
    convert: ValueConvert,
}

impl IdBuilder<'_> {
    #[must_use]
    pub fn matching(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }

    #[must_use]
    pub fn matching_any<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    /// With `ValueConvert::No`, arguments are raw document identifiers.
    #[must_use]
    pub const fn convert(mut self, convert: ValueConvert) -> Self {
        self.convert = convert;
        self
    }

    pub fn build(self) -> Result<Predicate, SearchError> {
        if self.values.is_empty() {
            return Err(SearchError::empty_argument("identifiers"));
        }
        let converter = self.factory.scope.id_converter(self.convert)?;
        for value in &self.values {
            match &converter {
                Some(converter) => converter.to_document_id(value)?,
                None => raw_document_id(value)?,
            };
        }

        Ok(Predicate::new(PredicateKind::Id {
            values: self.values,
            convert: self.convert,
            converter,
        }))
    }
}

///
/// NestedBuilder
///
/// Explicit nested predicate: every clause must match within the same
/// instance of the object field.
///

#[derive(Clone, Debug)]
pub struct NestedBuilder<'s> {
    factory: PredicateFactory<'s>,
    path: String,
    clauses: Vec<Predicate>,
}

impl NestedBuilder<'_> {
    #[must_use]
    pub fn add(mut self, clause: Predicate) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn build(mut self) -> Result<Predicate, SearchError> {
        let (_, chain) = self
            .factory
            .scope
            .object(&self.path)?
            .target(&SearchTrait::Nested)?;

        let inner = match self.clauses.len() {
            0 => return Err(SearchError::empty_argument("clauses")),
            1 => self.clauses.remove(0),
            _ => self.factory.and(self.clauses),
        };
        if let Some(outside) = inner
            .paths()
            .into_iter()
            .find(|p| *p == self.path || !is_within(p, &self.path))
        {
            return Err(SearchError::new(
                ErrorClass::Schema,
                format!(
                    "Invalid target for a predicate nested in '{}': \
                     '{outside}' is not a field of this object.",
                    self.path
                ),
            ));
        }

        let inner = strip_implicit(inner, &self.path);
        let explicit = Predicate::new(PredicateKind::Nested {
            path: self.path,
            implicit: false,
            inner: Box::new(inner),
        });

        Ok(wrap_implicit(explicit, &chain))
    }
}

///
/// NamedBuilder
///

#[derive(Clone, Debug)]
pub struct NamedBuilder<'s> {
    factory: PredicateFactory<'s>,
    path: String,
    params: BTreeMap<String, Value>,
}

impl NamedBuilder<'_> {
    #[must_use]
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn build(self) -> Result<Predicate, SearchError> {
        let schema = self.factory.scope.named_predicate(&self.path)?;
        let factory = self.factory.relative_to(schema.object_path.as_deref());
        let context = NamedPredicateContext::new(factory, &self.params);

        schema.definition.create(&context)
    }
}

///
/// BoolBuilder
///

#[derive(Clone, Debug, Default)]
pub struct BoolBuilder {
    clauses: BoolPredicate,
}

impl BoolBuilder {
    #[must_use]
    pub fn must(mut self, predicate: Predicate) -> Self {
        self.clauses.must.push(predicate);
        self
    }

    #[must_use]
    pub fn should(mut self, predicate: Predicate) -> Self {
        self.clauses.should.push(predicate);
        self
    }

    /// Like `must`, without contributing to the score.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.clauses.filter.push(predicate);
        self
    }

    #[must_use]
    pub fn must_not(mut self, predicate: Predicate) -> Self {
        self.clauses.must_not.push(predicate);
        self
    }

    #[must_use]
    pub const fn minimum_should_match(mut self, count: usize) -> Self {
        self.clauses.minimum_should_match = Some(count);
        self
    }

    #[must_use]
    pub fn build(self) -> Predicate {
        Predicate::new(PredicateKind::Bool(self.clauses))
    }
}
