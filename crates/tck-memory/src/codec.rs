//! Module: codec
//! Responsibility: encode field values into comparable index values.
//! Does not own: coercion of DSL arguments (see `FieldTarget::convert`).

use crate::analysis::Analysis;
use bigdecimal::{BigDecimal, RoundingMode};
use tck_core::{
    error::SearchError,
    predicate::FieldTarget,
    schema::{FieldCodec, LeafFieldSchema},
    value::Value,
};

///
/// IndexedValue
///
/// One stored value. Strings keep their terms in position order so phrase
/// predicates can measure distances.
///

#[derive(Clone, Debug, PartialEq)]
pub enum IndexedValue {
    Scalar(Value),
    Text(Vec<String>),
}

impl IndexedValue {
    #[must_use]
    pub fn terms(&self) -> &[String] {
        match self {
            Self::Text(terms) => terms,
            Self::Scalar(_) => &[],
        }
    }

    #[must_use]
    pub const fn scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Text(_) => None,
        }
    }
}

///
/// FieldEncoder
///

#[derive(Clone, Debug)]
pub struct FieldEncoder {
    codec: FieldCodec,
    analysis: Option<Analysis>,
}

impl FieldEncoder {
    pub fn for_schema(field: &LeafFieldSchema) -> Result<Self, SearchError> {
        Self::new(
            field.codec.clone(),
            field.options.analyzer.as_deref(),
            field.options.normalizer.as_deref(),
        )
    }

    pub fn for_target(target: &FieldTarget) -> Result<Self, SearchError> {
        Self::new(
            target.codec.clone(),
            target.analyzer.as_deref(),
            target.normalizer.as_deref(),
        )
    }

    fn new(
        codec: FieldCodec,
        analyzer: Option<&str>,
        normalizer: Option<&str>,
    ) -> Result<Self, SearchError> {
        let analysis = match codec {
            FieldCodec::String => Some(Analysis::for_field(analyzer, normalizer)?),
            _ => None,
        };

        Ok(Self { codec, analysis })
    }

    #[must_use]
    pub const fn analysis(&self) -> Option<Analysis> {
        self.analysis
    }

    /// Encode a value already coerced to the field's kind.
    #[must_use]
    pub fn encode(&self, value: &Value) -> IndexedValue {
        match (self.analysis, value) {
            (Some(analysis), Value::Text(text)) => IndexedValue::Text(analysis.tokens(text)),
            _ => IndexedValue::Scalar(self.scalar(value)),
        }
    }

    /// Single comparable term: normalized but never split.
    #[must_use]
    pub fn term(&self, value: &Value) -> Value {
        match (self.analysis, value) {
            (Some(analysis), Value::Text(text)) => Value::Text(analysis.normalize(text)),
            _ => self.scalar(value),
        }
    }

    fn scalar(&self, value: &Value) -> Value {
        match (&self.codec, value) {
            (FieldCodec::BigDecimal { decimal_scale }, Value::Decimal(decimal)) => {
                Value::Decimal(decimal.with_scale_round(*decimal_scale, RoundingMode::HalfUp))
            }
            (FieldCodec::BigInteger { decimal_scale }, Value::BigInt(integer)) => {
                let decimal = BigDecimal::from(integer.clone());
                Value::Decimal(decimal.with_scale_round(*decimal_scale, RoundingMode::HalfUp))
            }
            _ => value.clone(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn decimal(unscaled: i64, scale: i64) -> Value {
        Value::Decimal(BigDecimal::new(BigInt::from(unscaled), scale))
    }

    #[test]
    fn decimals_round_half_up_to_the_codec_scale() {
        let encoder = FieldEncoder::new(FieldCodec::BigDecimal { decimal_scale: 1 }, None, None)
            .expect("encoder");

        assert_eq!(encoder.term(&decimal(105, 2)), decimal(11, 1));
        assert_eq!(encoder.term(&decimal(104, 2)), decimal(10, 1));
    }

    #[test]
    fn big_integers_round_at_negative_scales() {
        let encoder = FieldEncoder::new(FieldCodec::BigInteger { decimal_scale: -2 }, None, None)
            .expect("encoder");

        assert_eq!(
            encoder.term(&Value::BigInt(BigInt::from(1_249))),
            encoder.term(&Value::BigInt(BigInt::from(1_200)))
        );
        assert_ne!(
            encoder.term(&Value::BigInt(BigInt::from(1_250))),
            encoder.term(&Value::BigInt(BigInt::from(1_200)))
        );
    }

    #[test]
    fn strings_split_on_encode_and_normalize_on_term() {
        let encoder =
            FieldEncoder::new(FieldCodec::String, Some("standard"), None).expect("encoder");

        assert_eq!(
            encoder.encode(&Value::from("Jack Kerouac")),
            IndexedValue::Text(vec!["jack".into(), "kerouac".into()])
        );
        assert_eq!(encoder.term(&Value::from("Jack Kerouac")), Value::from("jack kerouac"));
    }
}
