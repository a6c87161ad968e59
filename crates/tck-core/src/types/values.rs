use crate::{
    types::{FieldTypeDescriptor, FieldTypeId},
    value::{GeoPoint, Value},
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_bigint::BigInt;

///
/// TestValues
///
/// Ordered, pairwise distinguishable values for one field type. `stored[i]`
/// is what document `i` holds; `matching[i]` is the argument a predicate
/// passes to match exactly that document. The two differ when the field
/// analyzes or normalizes its content.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TestValues {
    stored: Vec<Value>,
    matching: Vec<Value>,
    non_matching: Option<Value>,
}

impl TestValues {
    /// Pair stored values with matching arguments.
    ///
    /// Both sequences must have the same length.
    #[must_use]
    pub fn new(stored: Vec<Value>, matching: Vec<Value>) -> Self {
        debug_assert_eq!(stored.len(), matching.len());

        Self {
            stored,
            matching,
            non_matching: None,
        }
    }

    /// Values stored and matched verbatim.
    #[must_use]
    pub fn identity(values: Vec<Value>) -> Self {
        Self::new(values.clone(), values)
    }

    #[must_use]
    pub fn with_non_matching(mut self, value: impl Into<Value>) -> Self {
        self.non_matching = Some(value.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stored.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    #[must_use]
    pub fn stored(&self, ordinal: usize) -> &Value {
        &self.stored[ordinal]
    }

    #[must_use]
    pub fn matching(&self, ordinal: usize) -> &Value {
        &self.matching[ordinal]
    }

    #[must_use]
    pub fn all_stored(&self) -> &[Value] {
        &self.stored
    }

    /// A well-typed argument that matches no stored value.
    #[must_use]
    pub const fn non_matching(&self) -> Option<&Value> {
        self.non_matching.as_ref()
    }

    pub(crate) fn for_type(ty: &FieldTypeDescriptor) -> Self {
        match ty.id() {
            FieldTypeId::Boolean => Self::identity(vec![Value::Bool(false), Value::Bool(true)]),
            FieldTypeId::Integer => {
                Self::identity(ints([-42, 3, 13, 25, 1_024])).with_non_matching(7_777)
            }
            FieldTypeId::Long => Self::identity(
                [-42_000_000_000_i64, 3, 13, 25, 42_000_000_000]
                    .into_iter()
                    .map(Value::Long)
                    .collect(),
            )
            .with_non_matching(7_777_i64),
            FieldTypeId::Double => Self::identity(
                [-42.5, 1.5, 3.25, 13.75, 25.125]
                    .into_iter()
                    .map(Value::Double)
                    .collect(),
            )
            .with_non_matching(7_777.5),
            FieldTypeId::LocalDate => Self::identity(dates(&[
                (1970, 1, 1),
                (2003, 6, 15),
                (2018, 2, 28),
                (2020, 12, 31),
                (2042, 7, 4),
            ]))
            .with_non_matching(dates(&[(1999, 9, 9)]).pop().unwrap_or(Value::Null)),
            FieldTypeId::Keyword => Self::identity(texts(&[
                "Irving",
                "Kerouac",
                "Tolkien",
                "Woolf",
                "Yourcenar",
            ]))
            .with_non_matching("Zola"),
            FieldTypeId::NormalizedString => Self::new(
                texts(&["Irving", "Kerouac", "Tolkien", "Woolf", "Yourcenar"]),
                texts(&["iRvInG", "KEROUAC", "tolkien", "wOOLF", "YourCenar"]),
            )
            .with_non_matching("ZOLA"),
            FieldTypeId::AnalyzedString => Self::new(
                texts(&[
                    "John Irving",
                    "Jack Kerouac",
                    "J.R.R. Tolkien",
                    "Virginia Woolf",
                    "Marguerite Yourcenar",
                ]),
                texts(&["irving", "kerouac", "tolkien", "woolf", "yourcenar"]),
            )
            .with_non_matching("zola"),
            FieldTypeId::GeoPoint => Self::identity(
                [(40.0, -71.0), (41.0, -72.0), (42.0, -73.0), (43.0, -74.0)]
                    .into_iter()
                    .map(|(lat, lon)| Value::GeoPoint(GeoPoint::new(lat, lon)))
                    .collect(),
            )
            .with_non_matching(GeoPoint::new(-10.0, 10.0)),
            FieldTypeId::Vector => Self::identity(
                [
                    [1.0, 0.0, 0.0],
                    [0.0, 1.0, 0.0],
                    [0.0, 0.0, 1.0],
                    [5.0, 5.0, 5.0],
                ]
                .into_iter()
                .map(|v: [f32; 3]| Value::Vector(v.to_vec()))
                .collect(),
            )
            .with_non_matching(vec![-50.0_f32, -50.0, -50.0]),
            FieldTypeId::BigDecimal => Self::identity(
                [-4_250_i64, 105, 314, 1_350, 2_599]
                    .into_iter()
                    .map(|unscaled| Value::Decimal(BigDecimal::new(BigInt::from(unscaled), 2)))
                    .collect(),
            )
            .with_non_matching(BigDecimal::new(BigInt::from(777_777), 2)),
            FieldTypeId::BigInteger => Self::identity(
                [-3_i128, 2, 3, 5, 7]
                    .into_iter()
                    .map(|factor| Value::BigInt(BigInt::from(i128::from(i64::MAX) * factor)))
                    .collect(),
            )
            .with_non_matching(BigInt::from(i128::from(i64::MAX) * 11)),
        }
    }
}

fn ints<const N: usize>(values: [i32; N]) -> Vec<Value> {
    values.into_iter().map(Value::Int).collect()
}

fn texts(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

fn dates(ymd: &[(i32, u32, u32)]) -> Vec<Value> {
    ymd.iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .map(Value::Date)
        .collect()
}
