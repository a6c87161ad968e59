use crate::{error::SearchError, value::Value};
use std::fmt;

///
/// ValueConvert
///
/// Whether a predicate argument goes through the field's DSL converter
/// (and the index identifier converter for id predicates) or is handed to
/// the index as a raw value.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValueConvert {
    #[default]
    Yes,
    No,
}

impl ValueConvert {
    #[must_use]
    pub const fn enabled(self) -> bool {
        matches!(self, Self::Yes)
    }
}

///
/// ValueConverter
///
/// Turns a DSL argument into the value the index stores. Converters are
/// identified by name when indexes of one scope are reconciled.
///

pub trait ValueConverter: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn to_index(&self, value: &Value) -> Result<Value, SearchError>;
}

///
/// PassThroughConverter
///
/// Named converter that hands values through unchanged. Two fields using
/// differently named pass-through converters are still considered to
/// disagree on conversion.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassThroughConverter {
    name: String,
}

impl PassThroughConverter {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ValueConverter for PassThroughConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_index(&self, value: &Value) -> Result<Value, SearchError> {
        Ok(value.clone())
    }
}

///
/// TextParsingConverter
///
/// Accepts text arguments and parses them into integers. Raw integer
/// arguments are only accepted with conversion disabled.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextParsingConverter;

impl ValueConverter for TextParsingConverter {
    fn name(&self) -> &str {
        "text-parsing"
    }

    fn to_index(&self, value: &Value) -> Result<Value, SearchError> {
        let text = value.as_text().ok_or_else(|| {
            SearchError::argument(format!("Expected a text argument, got '{value}'."))
        })?;

        text.trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|err| {
                SearchError::argument(format!("Cannot parse '{text}' as an integer: {err}."))
            })
    }
}

///
/// IdConverter
///
/// Maps identifier arguments to document identifiers.
///

pub trait IdConverter: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn to_document_id(&self, value: &Value) -> Result<String, SearchError>;
}

///
/// PrefixIdConverter
///
/// `1` becomes `"<prefix>1"`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrefixIdConverter {
    prefix: String,
}

impl PrefixIdConverter {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl IdConverter for PrefixIdConverter {
    fn name(&self) -> &str {
        &self.prefix
    }

    fn to_document_id(&self, value: &Value) -> Result<String, SearchError> {
        if value.is_null() {
            return Err(SearchError::null_argument("value"));
        }

        Ok(format!("{}{value}", self.prefix))
    }
}

/// Identifier mapping used when an index declares no converter, or when
/// conversion is disabled: the argument must already be a document id.
pub fn raw_document_id(value: &Value) -> Result<String, SearchError> {
    match value {
        Value::Null => Err(SearchError::null_argument("value")),
        Value::Text(id) => Ok(id.clone()),
        other => Err(SearchError::argument(format!(
            "Identifier '{other}' must be a string when no identifier conversion applies."
        ))),
    }
}
