//! Module: analysis
//! Responsibility: turn string values into index terms, the same way on the
//! document side and on the query side.

use tck_core::{
    error::{ErrorClass, SearchError},
    types::{LOWERCASE_NORMALIZER, STANDARD_ANALYZER, WHITESPACE_ANALYZER},
};

///
/// Analysis
///
/// Keyword fields index their content as a single verbatim term.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Analysis {
    Keyword,
    Lowercase,
    Standard,
    Whitespace,
}

impl Analysis {
    /// Analysis of a string field named by its analyzer or normalizer.
    pub fn for_field(
        analyzer: Option<&str>,
        normalizer: Option<&str>,
    ) -> Result<Self, SearchError> {
        match (analyzer, normalizer) {
            (None, None) => Ok(Self::Keyword),
            (Some(STANDARD_ANALYZER), None) => Ok(Self::Standard),
            (Some(WHITESPACE_ANALYZER), None) => Ok(Self::Whitespace),
            (None, Some(LOWERCASE_NORMALIZER)) => Ok(Self::Lowercase),
            (Some(name), _) => Err(unknown("analyzer", name)),
            (None, Some(name)) => Err(unknown("normalizer", name)),
        }
    }

    /// Terms of `text` in position order.
    #[must_use]
    pub fn tokens(self, text: &str) -> Vec<String> {
        match self {
            Self::Keyword => vec![text.to_string()],
            Self::Lowercase => vec![text.to_lowercase()],
            Self::Standard => text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|token| !token.is_empty())
                .map(str::to_lowercase)
                .collect(),
            Self::Whitespace => text.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Normalize a term or pattern without splitting it.
    #[must_use]
    pub fn normalize(self, text: &str) -> String {
        if self.lowercases() {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }

    #[must_use]
    pub const fn lowercases(self) -> bool {
        matches!(self, Self::Lowercase | Self::Standard)
    }
}

fn unknown(kind: &str, name: &str) -> SearchError {
    SearchError::new(ErrorClass::Schema, format!("Unknown {kind} '{name}'."))
}

///
/// TESTS
///
