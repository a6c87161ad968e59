use crate::{assert::DocRef, config::ConfigError};
use std::{collections::BTreeSet, fmt};
use thiserror::Error as ThisError;

///
/// ErrorClass
///
/// Stable classification of failures raised by predicate construction and
/// query execution. Negative scenarios assert on the class first and on the
/// message second.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    /// A required argument was null, empty or out of range.
    Argument,
    /// Unknown field path, or a trait the field does not support.
    Schema,
    /// Indexes of one scope disagree on a field's configuration.
    Inconsistency,
    /// The query itself is malformed (missing parameter, bad pattern).
    Query,
    /// The backend failed for reasons outside the DSL contract.
    Backend,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Argument => "argument",
            Self::Schema => "schema",
            Self::Inconsistency => "inconsistency",
            Self::Query => "query",
            Self::Backend => "backend",
        };

        f.write_str(label)
    }
}

///
/// ErrorContext
///
/// Structured diagnostic context carried next to the message.
/// Index names are kept in a set: assertions check containment, never
/// position.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorContext {
    pub indexes: BTreeSet<String>,
    pub field_path: Option<String>,
    pub trait_name: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indexes<I, S>(mut self, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.extend(indexes.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_field(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.trait_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty() && self.field_path.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        let mut parts = Vec::new();
        if !self.indexes.is_empty() {
            let names = self
                .indexes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            parts.push(format!("indexes [{names}]"));
        }
        if let Some(path) = &self.field_path {
            parts.push(format!("field '{path}'"));
        }

        write!(f, " Context: {}.", parts.join(", "))
    }
}

///
/// SearchError
///
/// Every failure surfaced by the DSL or a backend. Raised synchronously,
/// never retried; a negative scenario treats it as the verified outcome.
///

#[derive(Clone, Debug, ThisError)]
#[error("{message}{context}")]
pub struct SearchError {
    pub class: ErrorClass,
    pub message: String,
    pub context: Box<ErrorContext>,
}

impl SearchError {
    #[must_use]
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            context: Box::default(),
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Box::new(context);
        self
    }

    /// Construct an argument error; `message` names the violated constraint.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Argument, message)
    }

    /// `'<name>' must not be null.`
    #[must_use]
    pub fn null_argument(name: &str) -> Self {
        Self::argument(format!("'{name}' must not be null."))
    }

    /// `'<name>' must not be empty.`
    #[must_use]
    pub fn empty_argument(name: &str) -> Self {
        Self::argument(format!("'{name}' must not be empty."))
    }

    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Query, message)
    }

    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Backend, message)
    }

    /// Schema error for a path no index of the scope knows about.
    #[must_use]
    pub fn unknown_field<I, S>(path: &str, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ErrorClass::Schema, format!("Unknown field '{path}'.")).with_context(
            ErrorContext::new().with_indexes(indexes).with_field(path),
        )
    }

    /// Schema error for a trait the field does not advertise anywhere.
    #[must_use]
    pub fn unsupported_trait<I, S>(path: &str, trait_name: &str, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ErrorClass::Schema,
            format!(
                "Cannot use '{trait_name}' on field '{path}'. \
                 Make sure the field is marked as searchable/sortable/projectable/aggregable \
                 (whichever is relevant) and that its type supports '{trait_name}'."
            ),
        )
        .with_context(
            ErrorContext::new()
                .with_indexes(indexes)
                .with_field(path)
                .with_trait(trait_name),
        )
    }

    /// Cross-index error: some indexes support the trait, others do not.
    #[must_use]
    pub fn inconsistent_support<I, S>(path: &str, trait_name: &str, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::inconsistency(
            path,
            &format!("Inconsistent support for '{trait_name}'."),
            indexes,
        )
        .with_trait_name(trait_name)
    }

    /// Cross-index error: one property of the field differs between indexes.
    #[must_use]
    pub fn attribute_differs<I, S>(
        path: &str,
        property: &str,
        left: impl fmt::Display,
        right: impl fmt::Display,
        indexes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::inconsistency(
            path,
            &format!("{property} differs: {left} vs. {right}."),
            indexes,
        )
    }

    /// Cross-index error: indexes map identifiers differently.
    #[must_use]
    pub fn identifier_differs<I, S>(
        left: impl fmt::Display,
        right: impl fmt::Display,
        indexes: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ErrorClass::Inconsistency,
            format!(
                "Inconsistent configuration for the identifier in a search query \
                 across multiple indexes: Identifier converter differs: {left} vs. {right}."
            ),
        )
        .with_context(ErrorContext::new().with_indexes(indexes))
    }

    fn inconsistency<I, S>(path: &str, detail: &str, indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            ErrorClass::Inconsistency,
            format!(
                "Inconsistent configuration for field '{path}' in a search query \
                 across multiple indexes: {detail}"
            ),
        )
        .with_context(ErrorContext::new().with_indexes(indexes).with_field(path))
    }

    fn with_trait_name(mut self, trait_name: &str) -> Self {
        self.context.trait_name = Some(trait_name.to_string());
        self
    }

    #[must_use]
    pub fn is(&self, class: ErrorClass) -> bool {
        self.class == class
    }
}

///
/// ConformanceError
///
/// A backend failed one conformance check. `context` names the check
/// (scenario, field type, path, ordinal) so a failing run points at the
/// exact matrix cell.
///

#[derive(Debug, ThisError)]
pub enum ConformanceError {
    #[error("{context}: expected hits {expected:?} in any order, got {actual:?}")]
    HitMismatch {
        context: String,
        expected: Vec<DocRef>,
        actual: Vec<DocRef>,
    },

    #[error("{context}: expected hits {expected:?} in this exact order, got {actual:?}")]
    OrderMismatch {
        context: String,
        expected: Vec<DocRef>,
        actual: Vec<DocRef>,
    },

    #[error("{context}: expected top hit {expected}, got {actual:?}")]
    TopHitMismatch {
        context: String,
        expected: DocRef,
        actual: Option<DocRef>,
    },

    #[error("{context}: expected total hit count {expected}, got {actual}")]
    TotalHitCountMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("{context}: expected scores in strictly descending order, got {scores:?}")]
    ScoreOrder { context: String, scores: Vec<f32> },

    #[error("{context}: expected failure ({expected}), but the operation succeeded")]
    UnexpectedSuccess { context: String, expected: String },

    #[error("{context}: unexpected error: {source}")]
    UnexpectedError {
        context: String,
        #[source]
        source: SearchError,
    },

    #[error("{context}: expected a {expected} error, got a {actual} error: {message}")]
    ClassMismatch {
        context: String,
        expected: ErrorClass,
        actual: ErrorClass,
        message: String,
    },

    #[error("{context}: expected message to contain '{expected}', got '{actual}'")]
    MessageMismatch {
        context: String,
        expected: String,
        actual: String,
    },

    #[error("{context}: expected error context to mention {expected:?}, got {actual:?}")]
    ContextMismatch {
        context: String,
        expected: Vec<String>,
        actual: Box<ErrorContext>,
    },

    #[error("{context}: field '{path}' {problem} '{trait_name}'")]
    TraitAdvertisement {
        context: String,
        path: String,
        trait_name: String,
        problem: &'static str,
    },

    #[error("{context}: fixture setup failed: {source}")]
    Fixture {
        context: String,
        #[source]
        source: SearchError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[source] Box<ConfigError>),
}

impl From<ConfigError> for ConformanceError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

impl ConformanceError {
    pub(crate) fn unexpected(context: impl Into<String>, source: SearchError) -> Self {
        Self::UnexpectedError {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn fixture(context: impl Into<String>, source: SearchError) -> Self {
        Self::Fixture {
            context: context.into(),
            source,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_renders_indexes_and_field() {
        let err = SearchError::unknown_field("nested.keyword_field", ["b", "a"]);

        assert_eq!(
            err.to_string(),
            "Unknown field 'nested.keyword_field'. \
             Context: indexes [a, b], field 'nested.keyword_field'."
        );
        assert!(err.is(ErrorClass::Schema));
    }

    #[test]
    fn empty_context_renders_nothing() {
        let err = SearchError::null_argument("value");

        assert_eq!(err.to_string(), "'value' must not be null.");
        assert!(err.context.is_empty());
    }

    #[test]
    fn attribute_differs_names_both_values() {
        let err = SearchError::attribute_differs(
            "decimal_field",
            "Codec",
            "DecimalFieldCodec[decimalScale=2]",
            "DecimalFieldCodec[decimalScale=7]",
            ["left", "right"],
        );

        assert!(err.is(ErrorClass::Inconsistency));
        assert!(err.message.contains("decimalScale=2"));
        assert!(err.message.contains("decimalScale=7"));
        assert!(err.context.indexes.contains("left"));
        assert!(err.context.indexes.contains("right"));
    }

    #[test]
    fn inconsistent_support_records_trait() {
        let err = SearchError::inconsistent_support("f", "predicate:match", ["x"]);

        assert!(err.message.contains("Inconsistent support for 'predicate:match'"));
        assert_eq!(err.context.trait_name.as_deref(), Some("predicate:match"));
    }
}
