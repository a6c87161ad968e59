//! Module: assert
//! Responsibility: compare search results and errors against expectations
//! and turn mismatches into `ConformanceError`s.

use crate::{
    backend::{SearchHit, SearchResult},
    error::{ConformanceError, ErrorClass, SearchError},
};
use std::{collections::BTreeSet, fmt};

///
/// DocRef
///
/// Document reference attributed to its owning index.
///

#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DocRef {
    pub index: String,
    pub id: String,
}

impl DocRef {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn of(hit: &SearchHit) -> Self {
        Self::new(hit.index.clone(), hit.id.clone())
    }

    /// References to `ids`, all in `index`.
    pub fn all_in<I, S>(index: &str, ids: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().map(|id| Self::new(index, id)).collect()
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.id)
    }
}

impl fmt::Debug for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Start asserting on `result`; `context` prefixes every failure.
#[must_use]
pub fn assert_that(context: impl Into<String>, result: &SearchResult) -> ResultAssertion<'_> {
    ResultAssertion {
        context: context.into(),
        result,
    }
}

///
/// ResultAssertion
///

pub struct ResultAssertion<'r> {
    context: String,
    result: &'r SearchResult,
}

impl ResultAssertion<'_> {
    fn actual(&self) -> Vec<DocRef> {
        self.result.hits.iter().map(DocRef::of).collect()
    }

    /// Exactly `expected`, in any order.
    pub fn has_hits_any_order(
        &self,
        expected: impl IntoIterator<Item = DocRef>,
    ) -> Result<&Self, ConformanceError> {
        let mut expected = expected.into_iter().collect::<Vec<_>>();
        let mut actual = self.actual();
        expected.sort();
        actual.sort();

        if expected != actual {
            return Err(ConformanceError::HitMismatch {
                context: self.context.clone(),
                expected,
                actual,
            });
        }

        Ok(self)
    }

    /// Exactly `expected`, in this order.
    pub fn has_hits_exact_order(
        &self,
        expected: impl IntoIterator<Item = DocRef>,
    ) -> Result<&Self, ConformanceError> {
        let expected = expected.into_iter().collect::<Vec<_>>();
        let actual = self.actual();

        if expected != actual {
            return Err(ConformanceError::OrderMismatch {
                context: self.context.clone(),
                expected,
                actual,
            });
        }

        Ok(self)
    }

    pub fn has_top_hit(&self, expected: &DocRef) -> Result<&Self, ConformanceError> {
        self.has_top_hit_within(expected, 1)
    }

    /// `expected` is among the first `k` hits.
    pub fn has_top_hit_within(
        &self,
        expected: &DocRef,
        k: usize,
    ) -> Result<&Self, ConformanceError> {
        let found = self
            .result
            .hits
            .iter()
            .take(k.max(1))
            .any(|hit| hit.index == expected.index && hit.id == expected.id);

        if !found {
            return Err(ConformanceError::TopHitMismatch {
                context: self.context.clone(),
                expected: expected.clone(),
                actual: self.result.hits.first().map(DocRef::of),
            });
        }

        Ok(self)
    }

    pub fn has_no_hits(&self) -> Result<&Self, ConformanceError> {
        self.has_hits_any_order(std::iter::empty())
    }

    pub fn has_total_hit_count(&self, expected: usize) -> Result<&Self, ConformanceError> {
        if self.result.total != expected {
            return Err(ConformanceError::TotalHitCountMismatch {
                context: self.context.clone(),
                expected,
                actual: self.result.total,
            });
        }

        Ok(self)
    }

    pub fn has_strictly_descending_scores(&self) -> Result<&Self, ConformanceError> {
        let scores = self.result.hits.iter().map(|h| h.score).collect::<Vec<_>>();
        if scores.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ConformanceError::ScoreOrder {
                context: self.context.clone(),
                scores,
            });
        }

        Ok(self)
    }
}

/// Expect `result` to have failed with an error of `class`.
pub fn expect_error<T>(
    context: impl Into<String>,
    result: Result<T, SearchError>,
    class: ErrorClass,
) -> Result<ErrorAssertion, ConformanceError> {
    let context = context.into();
    let error = match result {
        Ok(_) => {
            return Err(ConformanceError::UnexpectedSuccess {
                context,
                expected: format!("a {class} error"),
            });
        }
        Err(error) => error,
    };

    if !error.is(class) {
        return Err(ConformanceError::ClassMismatch {
            context,
            expected: class,
            actual: error.class,
            message: error.message,
        });
    }

    Ok(ErrorAssertion { context, error })
}

///
/// ErrorAssertion
///

#[derive(Debug)]
pub struct ErrorAssertion {
    context: String,
    error: SearchError,
}

impl ErrorAssertion {
    #[must_use]
    pub const fn error(&self) -> &SearchError {
        &self.error
    }

    pub fn message_contains(&self, fragment: &str) -> Result<&Self, ConformanceError> {
        if !self.error.message.contains(fragment) {
            return Err(ConformanceError::MessageMismatch {
                context: self.context.clone(),
                expected: fragment.to_string(),
                actual: self.error.message.clone(),
            });
        }

        Ok(self)
    }

    /// Every name in `indexes` appears in the error context. Order is
    /// irrelevant.
    pub fn context_indexes_contain<I, S>(&self, indexes: I) -> Result<&Self, ConformanceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let expected = indexes.into_iter().map(Into::into).collect::<BTreeSet<String>>();
        if !expected.is_subset(&self.error.context.indexes) {
            return Err(self.context_mismatch(expected));
        }

        Ok(self)
    }

    pub fn context_field(&self, path: &str) -> Result<&Self, ConformanceError> {
        if self.error.context.field_path.as_deref() != Some(path) {
            return Err(self.context_mismatch([path.to_string()].into()));
        }

        Ok(self)
    }

    fn context_mismatch(&self, expected: BTreeSet<String>) -> ConformanceError {
        ConformanceError::ContextMismatch {
            context: self.context.clone(),
            expected: expected.into_iter().collect(),
            actual: self.error.context.clone(),
        }
    }
}

///
/// TESTS
///
