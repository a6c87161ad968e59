use crate::{
    error::SearchError,
    schema::{FieldCodec, IdConverter, ValueConvert, ValueConverter},
    types::FieldTypeDescriptor,
    value::{GeoPoint, Value},
};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Named query parameters bound at execution time.
pub type QueryParams = BTreeMap<String, Value>;

///
/// Arg
///
/// A predicate argument: either a literal fixed at construction time or
/// the name of a query parameter supplied with the query.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    Literal(Value),
    Param(String),
}

impl Arg {
    pub fn resolve<'a>(&'a self, params: &'a QueryParams) -> Result<&'a Value, SearchError> {
        match self {
            Self::Literal(value) => Ok(value),
            Self::Param(name) => params.get(name).ok_or_else(|| {
                SearchError::query(format!("Query parameter '{name}' is not defined."))
            }),
        }
    }

    /// Resolve to text, as required by pattern and query-string predicates.
    pub fn resolve_text<'a>(&'a self, params: &'a QueryParams) -> Result<&'a str, SearchError> {
        let value = self.resolve(params)?;
        if value.is_null() {
            return Err(SearchError::null_argument("value"));
        }

        value.as_text().ok_or_else(|| {
            SearchError::argument(format!("Expected a text argument, got '{value}'."))
        })
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

///
/// FieldTarget
///
/// A field as a predicate sees it once the scope agreed on its
/// configuration. Carries everything a backend needs to turn an argument
/// into an index value.
///

#[derive(Clone, Debug)]
pub struct FieldTarget {
    pub path: String,
    pub field_type: &'static FieldTypeDescriptor,
    pub codec: FieldCodec,
    pub analyzer: Option<String>,
    pub normalizer: Option<String>,
    /// DSL converter to apply, `None` when absent or disabled.
    pub converter: Option<Arc<dyn ValueConverter>>,
    pub nested_chain: Vec<String>,
    pub multi_valued: bool,
    pub boost: Option<f32>,
}

impl FieldTarget {
    /// Resolve, convert and type-check an argument for this field.
    pub fn index_value(&self, arg: &Arg, params: &QueryParams) -> Result<Value, SearchError> {
        self.convert(arg.resolve(params)?)
    }

    /// Convert a DSL value into a value of the field's kind.
    pub fn convert(&self, value: &Value) -> Result<Value, SearchError> {
        if value.is_null() {
            return Err(SearchError::null_argument("value"));
        }

        let converted = match &self.converter {
            Some(converter) => converter.to_index(value)?,
            None => value.clone(),
        };
        let coerced = converted
            .coerce_to(self.field_type.value_kind())
            .ok_or_else(|| {
                SearchError::argument(format!(
                    "Invalid value '{converted}' for field '{}': expected a value of type '{}'.",
                    self.path,
                    self.field_type.name()
                ))
            })?;

        if let (FieldCodec::Vector { dimension }, Value::Vector(vector)) = (&self.codec, &coerced)
            && vector.len() != *dimension
        {
            return Err(SearchError::argument(format!(
                "Invalid vector for field '{}': expected dimension {dimension}, got {}.",
                self.path,
                vector.len()
            )));
        }

        Ok(coerced)
    }

    #[must_use]
    pub fn boost_value(&self) -> f32 {
        self.boost.unwrap_or(1.0)
    }
}

///
/// RangeBound
///

#[derive(Clone, Debug, PartialEq)]
pub enum RangeBound {
    Unbounded,
    Included(Arg),
    Excluded(Arg),
}

impl RangeBound {
    #[must_use]
    pub const fn arg(&self) -> Option<&Arg> {
        match self {
            Self::Unbounded => None,
            Self::Included(arg) | Self::Excluded(arg) => Some(arg),
        }
    }

    #[must_use]
    pub const fn is_inclusive(&self) -> bool {
        matches!(self, Self::Included(_))
    }
}

///
/// GeoShape
///

#[derive(Clone, Debug, PartialEq)]
pub enum GeoShape {
    Circle { center: GeoPoint, radius_meters: f64 },
    BoundingBox { top_left: GeoPoint, bottom_right: GeoPoint },
    Polygon(Vec<GeoPoint>),
}

///
/// BooleanOperator
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BooleanOperator {
    #[default]
    Or,
    And,
}

///
/// BoolPredicate
///
/// Without `must` or `filter` clauses, at least one `should` clause has to
/// match unless `minimum_should_match` says otherwise.
///

#[derive(Clone, Debug, Default)]
pub struct BoolPredicate {
    pub must: Vec<Predicate>,
    pub should: Vec<Predicate>,
    pub filter: Vec<Predicate>,
    pub must_not: Vec<Predicate>,
    pub minimum_should_match: Option<usize>,
}

impl BoolPredicate {
    /// Number of `should` clauses a document must satisfy. A minimum above
    /// the clause count matches nothing.
    #[must_use]
    pub fn required_should(&self) -> usize {
        match self.minimum_should_match {
            Some(n) => n,
            None if self.must.is_empty() && self.filter.is_empty() => {
                usize::from(!self.should.is_empty())
            }
            None => 0,
        }
    }
}

///
/// PredicateKind
///

#[derive(Clone, Debug)]
pub enum PredicateKind {
    MatchAll {
        except: Vec<Predicate>,
    },
    MatchNone,
    Bool(BoolPredicate),
    Not(Box<Predicate>),
    Match {
        fields: Vec<FieldTarget>,
        value: Arg,
    },
    Range {
        fields: Vec<FieldTarget>,
        lower: RangeBound,
        upper: RangeBound,
    },
    Terms {
        fields: Vec<FieldTarget>,
        values: Vec<Value>,
        match_all: bool,
    },
    Exists {
        path: String,
        object: bool,
    },
    Phrase {
        fields: Vec<FieldTarget>,
        text: Arg,
        slop: u32,
    },
    Wildcard {
        fields: Vec<FieldTarget>,
        pattern: Arg,
    },
    Regexp {
        fields: Vec<FieldTarget>,
        pattern: Arg,
    },
    SimpleQueryString {
        fields: Vec<FieldTarget>,
        query: Arg,
        default_operator: BooleanOperator,
    },
    SpatialWithin {
        fields: Vec<FieldTarget>,
        shape: GeoShape,
    },
    Knn {
        field: FieldTarget,
        k: usize,
        vector: Arg,
        filter: Option<Box<Predicate>>,
    },
    Id {
        values: Vec<Value>,
        convert: ValueConvert,
        converter: Option<Arc<dyn IdConverter>>,
    },
    Nested {
        path: String,
        implicit: bool,
        inner: Box<Predicate>,
    },
}

///
/// Predicate
///
/// Backend-agnostic predicate tree. Boost and constant-score apply to the
/// node's own score: the raw score is replaced by 1.0 when constant, then
/// multiplied by the boost, whichever order the modifiers were called in.
///

#[derive(Clone, Debug)]
pub struct Predicate {
    pub kind: PredicateKind,
    pub boost: Option<f32>,
    pub constant_score: bool,
}

impl Predicate {
    #[must_use]
    pub const fn new(kind: PredicateKind) -> Self {
        Self {
            kind,
            boost: None,
            constant_score: false,
        }
    }

    #[must_use]
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = Some(self.boost.map_or(boost, |current| current * boost));
        self
    }

    #[must_use]
    pub const fn constant_score(mut self) -> Self {
        self.constant_score = true;
        self
    }

    #[must_use]
    pub fn boost_value(&self) -> f32 {
        self.boost.unwrap_or(1.0)
    }

    /// Documents matching `self` but not `other`.
    #[must_use]
    pub fn except(mut self, other: Self) -> Self {
        if let PredicateKind::MatchAll { except } = &mut self.kind {
            except.push(other);
            return self;
        }

        Self::new(PredicateKind::Bool(BoolPredicate {
            must: vec![self],
            must_not: vec![other],
            ..BoolPredicate::default()
        }))
    }

    /// Every field or object path this predicate reads.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            PredicateKind::MatchAll { except } => {
                except.iter().for_each(|p| p.collect_paths(out));
            }
            PredicateKind::MatchNone | PredicateKind::Id { .. } => {}
            PredicateKind::Bool(b) => {
                for p in b.must.iter().chain(&b.should).chain(&b.filter).chain(&b.must_not) {
                    p.collect_paths(out);
                }
            }
            PredicateKind::Not(inner) | PredicateKind::Nested { inner, .. } => {
                inner.collect_paths(out);
            }
            PredicateKind::Match { fields, .. }
            | PredicateKind::Range { fields, .. }
            | PredicateKind::Terms { fields, .. }
            | PredicateKind::Phrase { fields, .. }
            | PredicateKind::Wildcard { fields, .. }
            | PredicateKind::Regexp { fields, .. }
            | PredicateKind::SimpleQueryString { fields, .. }
            | PredicateKind::SpatialWithin { fields, .. } => {
                out.extend(fields.iter().map(|f| f.path.as_str()));
            }
            PredicateKind::Exists { path, .. } => out.push(path),
            PredicateKind::Knn { field, filter, .. } => {
                out.push(&field.path);
                if let Some(filter) = filter {
                    filter.collect_paths(out);
                }
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match &self.kind {
            PredicateKind::MatchAll { .. } => "matchAll",
            PredicateKind::MatchNone => "matchNone",
            PredicateKind::Bool(_) => "bool",
            PredicateKind::Not(_) => "not",
            PredicateKind::Match { .. } => "match",
            PredicateKind::Range { .. } => "range",
            PredicateKind::Terms { .. } => "terms",
            PredicateKind::Exists { .. } => "exists",
            PredicateKind::Phrase { .. } => "phrase",
            PredicateKind::Wildcard { .. } => "wildcard",
            PredicateKind::Regexp { .. } => "regexp",
            PredicateKind::SimpleQueryString { .. } => "simpleQueryString",
            PredicateKind::SpatialWithin { .. } => "spatial.within",
            PredicateKind::Knn { .. } => "knn",
            PredicateKind::Id { .. } => "id",
            PredicateKind::Nested { .. } => "nested",
        };

        write!(f, "{label}{:?}", self.paths())
    }
}
