//! Module: eval
//! Responsibility: compile a predicate against its query parameters and
//! score indexed documents with it.
//! Does not own: document storage or locking (see `index`).
//!
//! Scoring model: a field predicate scores the sum of the boosts of the
//! fields it matched; bool sums its scoring clauses; nested keeps the best
//! instance; knn scores by similarity. A node's own modifiers apply last.

mod knn;
mod phrase;
mod spatial;
mod sqs;

use phrase::phrase_matches;

use crate::{
    codec::{FieldEncoder, IndexedValue},
    index::{IndexedDocument, IndexedObject},
};
use regex::Regex;
use sqs::QueryString;
use std::{collections::BTreeSet, ops::Bound};
use tck_core::{
    error::SearchError,
    predicate::{
        Arg, BooleanOperator, FieldTarget, GeoShape, Predicate, PredicateKind, QueryParams,
        RangeBound,
    },
    schema::{IdConverter, raw_document_id},
    value::Value,
};

/// A document of one index, as seen by the evaluator.
#[derive(Clone, Copy, Debug)]
pub struct Candidate<'d> {
    pub index: &'d str,
    pub document: &'d IndexedDocument,
}

impl Candidate<'_> {
    fn key(&self) -> (String, String) {
        (self.index.to_string(), self.document.id.clone())
    }
}

///
/// Program
///
/// A predicate with every argument resolved, converted and encoded. All
/// argument and parameter errors surface while compiling, even when no
/// document would be evaluated.
///

#[derive(Debug)]
pub struct Program {
    root: Node,
}

impl Program {
    pub fn compile(predicate: &Predicate, params: &QueryParams) -> Result<Self, SearchError> {
        Ok(Self {
            root: Node::compile(predicate, params)?,
        })
    }

    /// Select knn neighbours over the whole candidate set.
    pub fn prepare(&mut self, candidates: &[Candidate<'_>]) {
        self.root.prepare(candidates);
    }

    /// Score of a matching candidate, `None` when it does not match.
    #[must_use]
    pub fn score(&self, candidate: &Candidate<'_>) -> Option<f32> {
        self.root.score(candidate, Context::root(&candidate.document.root))
    }
}

///
/// Context
///
/// The object instance a predicate is evaluated in; the document root or
/// one instance of a nested object.
///

#[derive(Clone, Copy)]
struct Context<'a> {
    object: &'a IndexedObject,
    path: Option<&'a str>,
}

impl<'a> Context<'a> {
    const fn root(object: &'a IndexedObject) -> Self {
        Self { object, path: None }
    }

    fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        match self.path {
            None => Some(path),
            Some(prefix) => path.strip_prefix(prefix)?.strip_prefix('.'),
        }
    }

    fn values(&self, path: &str) -> Vec<&'a IndexedValue> {
        self.relative(path)
            .map(|relative| self.object.values_at(relative))
            .unwrap_or_default()
    }

    fn objects(&self, path: &str) -> Vec<&'a IndexedObject> {
        self.relative(path)
            .map(|relative| self.object.objects_at(relative))
            .unwrap_or_default()
    }
}

///
/// Node
///

#[derive(Debug)]
struct Node {
    op: Op,
    boost: f32,
    constant: bool,
}

#[derive(Debug)]
enum Op {
    All {
        except: Vec<Node>,
    },
    Nothing,
    Bool {
        must: Vec<Node>,
        should: Vec<Node>,
        filter: Vec<Node>,
        must_not: Vec<Node>,
        required_should: usize,
    },
    Not(Box<Node>),
    Fields(Vec<FieldClause>),
    Exists {
        path: String,
        object: bool,
    },
    Knn(Box<KnnClause>),
    Ids(BTreeSet<String>),
    Nested {
        path: String,
        inner: Box<Node>,
    },
}

impl Node {
    fn compile(predicate: &Predicate, params: &QueryParams) -> Result<Self, SearchError> {
        let all = |nodes: &[Predicate]| {
            nodes
                .iter()
                .map(|p| Self::compile(p, params))
                .collect::<Result<Vec<_>, _>>()
        };

        let op = match &predicate.kind {
            PredicateKind::MatchAll { except } => Op::All {
                except: all(except)?,
            },
            PredicateKind::MatchNone => Op::Nothing,
            PredicateKind::Bool(clauses) => Op::Bool {
                must: all(&clauses.must)?,
                should: all(&clauses.should)?,
                filter: all(&clauses.filter)?,
                must_not: all(&clauses.must_not)?,
                required_should: clauses.required_should(),
            },
            PredicateKind::Not(inner) => Op::Not(Box::new(Self::compile(inner, params)?)),
            PredicateKind::Match { fields, value } => match_fields(fields, value, params)?,
            PredicateKind::Range {
                fields,
                lower,
                upper,
            } => range_fields(fields, lower, upper, params)?,
            PredicateKind::Terms {
                fields,
                values,
                match_all,
            } => Op::Fields(FieldClause::each(fields, |target, encoder| {
                let terms = values
                    .iter()
                    .map(|value| Ok(encoder.term(&target.convert(value)?)))
                    .collect::<Result<Vec<_>, SearchError>>()?;

                Ok(FieldTest::Terms {
                    terms,
                    all: *match_all,
                })
            })?),
            PredicateKind::Exists { path, object } => Op::Exists {
                path: path.clone(),
                object: *object,
            },
            PredicateKind::Phrase { fields, text, slop } => {
                phrase_fields(fields, text, *slop, params)?
            }
            PredicateKind::Wildcard { fields, pattern } => {
                pattern_fields(fields, pattern, params, true)?
            }
            PredicateKind::Regexp { fields, pattern } => {
                pattern_fields(fields, pattern, params, false)?
            }
            PredicateKind::SimpleQueryString {
                fields,
                query,
                default_operator,
            } => query_string_fields(fields, query, *default_operator, params)?,
            PredicateKind::SpatialWithin { fields, shape } => {
                Op::Fields(FieldClause::each(fields, |_, _| {
                    Ok(FieldTest::Within(shape.clone()))
                })?)
            }
            PredicateKind::Knn {
                field,
                k,
                vector,
                filter,
            } => {
                let filter = filter
                    .as_deref()
                    .map(|filter| Self::compile(filter, params))
                    .transpose()?;

                Op::Knn(Box::new(KnnClause::new(field, *k, vector, filter, params)?))
            }
            PredicateKind::Id {
                values, converter, ..
            } => Op::Ids(document_ids(values, converter.as_deref())?),
            PredicateKind::Nested { path, inner, .. } => Op::Nested {
                path: path.clone(),
                inner: Box::new(Self::compile(inner, params)?),
            },
        };

        Ok(Self {
            op,
            boost: predicate.boost_value(),
            constant: predicate.constant_score,
        })
    }

    fn children_mut(&mut self) -> Vec<&mut Self> {
        match &mut self.op {
            Op::All { except } => except.iter_mut().collect(),
            Op::Bool {
                must,
                should,
                filter,
                must_not,
                ..
            } => must
                .iter_mut()
                .chain(should.iter_mut())
                .chain(filter.iter_mut())
                .chain(must_not.iter_mut())
                .collect(),
            Op::Not(inner) | Op::Nested { inner, .. } => vec![inner.as_mut()],
            Op::Knn(knn) => knn.filter.iter_mut().collect(),
            Op::Nothing | Op::Fields(_) | Op::Exists { .. } | Op::Ids(_) => Vec::new(),
        }
    }

    // Filters first: a knn filter may itself contain a knn clause.
    fn prepare(&mut self, candidates: &[Candidate<'_>]) {
        for child in self.children_mut() {
            child.prepare(candidates);
        }
        if let Op::Knn(knn) = &mut self.op {
            knn.neighbours = knn.select(candidates);
        }
    }

    fn score(&self, candidate: &Candidate<'_>, context: Context<'_>) -> Option<f32> {
        let raw = self.raw_score(candidate, context)?;
        let base = if self.constant { 1.0 } else { raw };

        Some(base * self.boost)
    }

    fn raw_score(&self, candidate: &Candidate<'_>, context: Context<'_>) -> Option<f32> {
        let matches = |node: &Self| node.score(candidate, context).is_some();

        match &self.op {
            Op::All { except } => (!except.iter().any(matches)).then_some(1.0),
            Op::Nothing => None,
            Op::Bool {
                must,
                should,
                filter,
                must_not,
                required_should,
            } => {
                let mut total = 0.0;
                for node in must {
                    total += node.score(candidate, context)?;
                }
                if !filter.iter().all(matches) || must_not.iter().any(matches) {
                    return None;
                }
                let mut matched = 0;
                for score in should.iter().filter_map(|node| node.score(candidate, context)) {
                    matched += 1;
                    total += score;
                }

                (matched >= *required_should).then_some(total)
            }
            Op::Not(inner) => (!matches(inner.as_ref())).then_some(1.0),
            Op::Fields(clauses) => clauses
                .iter()
                .filter(|clause| clause.test.matches(&context.values(&clause.path)))
                .map(|clause| clause.boost)
                .reduce(|a, b| a + b),
            Op::Exists { path, object: true } => context
                .objects(path)
                .iter()
                .any(|instance| !instance.is_empty())
                .then_some(1.0),
            Op::Exists {
                path,
                object: false,
            } => (!context.values(path).is_empty()).then_some(1.0),
            Op::Knn(knn) => knn.score(candidate, context),
            Op::Ids(ids) => ids.contains(&candidate.document.id).then_some(1.0),
            Op::Nested { path, inner } => context
                .objects(path)
                .into_iter()
                .filter_map(|instance| {
                    inner.score(
                        candidate,
                        Context {
                            object: instance,
                            path: Some(path.as_str()),
                        },
                    )
                })
                .reduce(f32::max),
        }
    }
}

///
/// FieldClause
///
/// One targeted field with its own encoded test; the encoding may differ
/// between fields of a multi-field predicate.
///

#[derive(Debug)]
struct FieldClause {
    path: String,
    boost: f32,
    test: FieldTest,
}

impl FieldClause {
    fn each<F>(targets: &[FieldTarget], mut test: F) -> Result<Vec<Self>, SearchError>
    where
        F: FnMut(&FieldTarget, &FieldEncoder) -> Result<FieldTest, SearchError>,
    {
        targets
            .iter()
            .map(|target| {
                let encoder = FieldEncoder::for_target(target)?;

                Ok(Self {
                    path: target.path.clone(),
                    boost: target.boost_value(),
                    test: test(target, &encoder)?,
                })
            })
            .collect()
    }
}

#[derive(Debug)]
enum FieldTest {
    Equals(Value),
    AnyToken(Vec<String>),
    Range {
        lower: Bound<Value>,
        upper: Bound<Value>,
    },
    Terms {
        terms: Vec<Value>,
        all: bool,
    },
    Phrase {
        tokens: Vec<String>,
        slop: u32,
    },
    Pattern(Regex),
    QueryString(QueryString<Vec<String>>),
    Within(GeoShape),
}

impl FieldTest {
    fn matches(&self, values: &[&IndexedValue]) -> bool {
        match self {
            Self::Equals(expected) => values.iter().any(|v| v.scalar() == Some(expected)),
            Self::AnyToken(tokens) => values
                .iter()
                .any(|v| v.terms().iter().any(|term| tokens.contains(term))),
            Self::Range { lower, upper } => values.iter().any(|v| match v {
                IndexedValue::Scalar(value) => in_range(value, lower, upper),
                IndexedValue::Text(terms) => terms
                    .iter()
                    .any(|term| in_range(&Value::Text(term.clone()), lower, upper)),
            }),
            Self::Terms { terms, all } => {
                let present = |term: &Value| values.iter().any(|v| holds_term(v, term));
                if *all {
                    terms.iter().all(present)
                } else {
                    terms.iter().any(present)
                }
            }
            Self::Phrase { tokens, slop } => values
                .iter()
                .any(|v| phrase_matches(v.terms(), tokens, *slop)),
            Self::Pattern(regex) => values.iter().any(|v| match v {
                IndexedValue::Text(terms) => terms.iter().any(|term| regex.is_match(term)),
                IndexedValue::Scalar(value) => regex.is_match(&value.to_string()),
            }),
            Self::QueryString(query) => query.matches(|tokens| {
                values
                    .iter()
                    .any(|v| phrase_matches(v.terms(), tokens, 0))
            }),
            Self::Within(shape) => values.iter().any(|v| {
                v.scalar()
                    .and_then(Value::as_geo_point)
                    .is_some_and(|point| spatial::within(shape, point))
            }),
        }
    }
}

fn holds_term(value: &IndexedValue, term: &Value) -> bool {
    match (value, term) {
        (IndexedValue::Text(terms), Value::Text(term)) => terms.contains(term),
        (IndexedValue::Scalar(stored), term) => stored == term,
        (IndexedValue::Text(_), _) => false,
    }
}

fn in_range(value: &Value, lower: &Bound<Value>, upper: &Bound<Value>) -> bool {
    let above = match lower {
        Bound::Unbounded => true,
        Bound::Included(bound) => value.compare(bound).is_some_and(|o| o.is_ge()),
        Bound::Excluded(bound) => value.compare(bound).is_some_and(|o| o.is_gt()),
    };
    let below = match upper {
        Bound::Unbounded => true,
        Bound::Included(bound) => value.compare(bound).is_some_and(|o| o.is_le()),
        Bound::Excluded(bound) => value.compare(bound).is_some_and(|o| o.is_lt()),
    };

    above && below
}

fn match_fields(
    fields: &[FieldTarget],
    value: &Arg,
    params: &QueryParams,
) -> Result<Op, SearchError> {
    Ok(Op::Fields(FieldClause::each(fields, |target, encoder| {
        let value = target.index_value(value, params)?;
        Ok(match encoder.encode(&value) {
            IndexedValue::Text(tokens) => FieldTest::AnyToken(tokens),
            IndexedValue::Scalar(value) => FieldTest::Equals(value),
        })
    })?))
}

fn phrase_fields(
    fields: &[FieldTarget],
    text: &Arg,
    slop: u32,
    params: &QueryParams,
) -> Result<Op, SearchError> {
    let text = Value::from(text.resolve_text(params)?);

    Ok(Op::Fields(FieldClause::each(fields, |target, encoder| {
        match encoder.encode(&target.convert(&text)?) {
            IndexedValue::Text(tokens) => Ok(FieldTest::Phrase { tokens, slop }),
            IndexedValue::Scalar(_) => Err(not_text(target)),
        }
    })?))
}

fn range_fields(
    fields: &[FieldTarget],
    lower: &RangeBound,
    upper: &RangeBound,
    params: &QueryParams,
) -> Result<Op, SearchError> {
    Ok(Op::Fields(FieldClause::each(fields, |target, encoder| {
        let bound = |bound: &RangeBound| -> Result<Bound<Value>, SearchError> {
            let Some(arg) = bound.arg() else {
                return Ok(Bound::Unbounded);
            };
            let term = encoder.term(&target.index_value(arg, params)?);
            Ok(if bound.is_inclusive() {
                Bound::Included(term)
            } else {
                Bound::Excluded(term)
            })
        };

        Ok(FieldTest::Range {
            lower: bound(lower)?,
            upper: bound(upper)?,
        })
    })?))
}

fn query_string_fields(
    fields: &[FieldTarget],
    query: &Arg,
    default_operator: BooleanOperator,
    params: &QueryParams,
) -> Result<Op, SearchError> {
    let parsed = QueryString::parse(query.resolve_text(params)?, default_operator);

    Ok(Op::Fields(FieldClause::each(fields, |target, encoder| {
        let analysis = encoder.analysis().ok_or_else(|| not_text(target))?;
        let compiled = parsed.clone().try_map(|operand| {
            let tokens = analysis.tokens(&operand);
            (!tokens.is_empty()).then_some(tokens)
        });

        Ok(FieldTest::QueryString(compiled))
    })?))
}

fn document_ids(
    values: &[Value],
    converter: Option<&dyn IdConverter>,
) -> Result<BTreeSet<String>, SearchError> {
    values
        .iter()
        .map(|value| match converter {
            Some(converter) => converter.to_document_id(value),
            None => raw_document_id(value),
        })
        .collect()
}

fn pattern_fields(
    fields: &[FieldTarget],
    pattern: &Arg,
    params: &QueryParams,
    wildcard: bool,
) -> Result<Op, SearchError> {
    let pattern = pattern.resolve_text(params)?;

    Ok(Op::Fields(FieldClause::each(fields, |_, encoder| {
        let normalized = encoder
            .analysis()
            .map_or_else(|| pattern.to_string(), |analysis| analysis.normalize(pattern));
        let expression = if wildcard {
            wildcard_to_regex(&normalized)
        } else {
            normalized
        };
        let regex = Regex::new(&format!("^(?:{expression})$")).map_err(|err| {
            SearchError::query(format!("Invalid regular expression '{pattern}': {err}"))
        })?;

        Ok(FieldTest::Pattern(regex))
    })?))
}

/// `*` matches any sequence, `?` any single character, `\` escapes.
fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }

    out
}

fn not_text(target: &FieldTarget) -> SearchError {
    SearchError::query(format!("Field '{}' does not index text.", target.path))
}

fn not_vector(target: &FieldTarget) -> SearchError {
    SearchError::query(format!("Field '{}' does not index vectors.", target.path))
}

///
/// KnnClause
///

#[derive(Debug)]
struct KnnClause {
    path: String,
    k: usize,
    vector: Vec<f32>,
    filter: Option<Node>,
    neighbours: BTreeSet<(String, String)>,
}

impl KnnClause {
    fn new(
        field: &FieldTarget,
        k: usize,
        vector: &Arg,
        filter: Option<Node>,
        params: &QueryParams,
    ) -> Result<Self, SearchError> {
        let vector = field
            .index_value(vector, params)?
            .as_vector()
            .map(<[f32]>::to_vec)
            .ok_or_else(|| not_vector(field))?;

        Ok(Self {
            path: field.path.clone(),
            k,
            vector,
            filter,
            neighbours: BTreeSet::new(),
        })
    }

    fn closest(&self, values: &[&IndexedValue]) -> Option<f32> {
        values
            .iter()
            .filter_map(|v| v.scalar().and_then(Value::as_vector))
            .map(|stored| knn::squared_distance(stored, &self.vector))
            .reduce(f32::min)
    }

    fn select(&self, candidates: &[Candidate<'_>]) -> BTreeSet<(String, String)> {
        let scored = candidates
            .iter()
            .filter(|candidate| {
                self.filter.as_ref().is_none_or(|filter| {
                    filter
                        .score(candidate, Context::root(&candidate.document.root))
                        .is_some()
                })
            })
            .filter_map(|candidate| {
                let values = candidate.document.root.values_at(&self.path);
                self.closest(&values).map(|distance| (candidate.key(), distance))
            })
            .collect::<Vec<_>>();

        knn::nearest(scored, self.k).into_iter().collect()
    }

    fn score(&self, candidate: &Candidate<'_>, context: Context<'_>) -> Option<f32> {
        if !self.neighbours.contains(&candidate.key()) {
            return None;
        }

        self.closest(&context.values(&self.path)).map(knn::similarity)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests;
