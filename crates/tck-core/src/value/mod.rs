
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use derive_more::Display;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

///
/// ValueKind
///
/// Value domains a field codec can hold.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[remain::sorted]
pub enum ValueKind {
    BigInt,
    Bool,
    Date,
    Decimal,
    Double,
    GeoPoint,
    Int,
    Long,
    Text,
    Vector,
}

impl ValueKind {
    /// Whether values of this kind have a total order usable by range predicates.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        !matches!(self, Self::GeoPoint | Self::Vector)
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::BigInt | Self::Decimal | Self::Double | Self::Int | Self::Long
        )
    }
}

///
/// GeoPoint
///

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

///
/// Value
///
/// Dynamic value passed to predicates and written into documents.
/// `Null` exists so callers can hand a missing argument to the DSL and
/// observe the argument error, the way an untyped caller would.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Date(NaiveDate),
    Text(String),
    Decimal(BigDecimal),
    BigInt(BigInt),
    GeoPoint(GeoPoint),
    Vector(Vec<f32>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Kind of the value, `None` for `Null`.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Self::Null => return None,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Double(_) => ValueKind::Double,
            Self::Date(_) => ValueKind::Date,
            Self::Text(_) => ValueKind::Text,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::BigInt(_) => ValueKind::BigInt,
            Self::GeoPoint(_) => ValueKind::GeoPoint,
            Self::Vector(_) => ValueKind::Vector,
        };

        Some(kind)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_geo_point(&self) -> Option<GeoPoint> {
        match self {
            Self::GeoPoint(point) => Some(*point),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Self::Vector(vector) => Some(vector),
            _ => None,
        }
    }

    /// Widen a value into `target` when the conversion is lossless.
    ///
    /// Integers widen into longs, doubles, big integers and decimals; big
    /// integers widen into decimals. Everything else must already match.
    #[must_use]
    pub fn coerce_to(&self, target: ValueKind) -> Option<Self> {
        if self.kind() == Some(target) {
            return Some(self.clone());
        }

        let coerced = match (self, target) {
            (Self::Int(v), ValueKind::Long) => Self::Long(i64::from(*v)),
            (Self::Int(v), ValueKind::Double) => Self::Double(f64::from(*v)),
            (Self::Int(v), ValueKind::BigInt) => Self::BigInt(BigInt::from(*v)),
            (Self::Int(v), ValueKind::Decimal) => Self::Decimal(BigDecimal::from(*v)),
            (Self::Long(v), ValueKind::BigInt) => Self::BigInt(BigInt::from(*v)),
            (Self::Long(v), ValueKind::Decimal) => Self::Decimal(BigDecimal::from(*v)),
            (Self::BigInt(v), ValueKind::Decimal) => Self::Decimal(BigDecimal::from(v.clone())),
            _ => return None,
        };

        Some(coerced)
    }

    /// Total order between two values of the same orderable kind.
    ///
    /// Returns `None` across kinds and for geo points / vectors.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Long(a), Self::Long(b)) => Some(a.cmp(b)),
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::BigInt(a), Self::BigInt(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::GeoPoint(v) => write!(f, "{v}"),
            Self::Vector(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_value_from {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_value_from! {
    bool => Bool,
    i32 => Int,
    i64 => Long,
    f64 => Double,
    NaiveDate => Date,
    String => Text,
    BigDecimal => Decimal,
    BigInt => BigInt,
    GeoPoint => GeoPoint,
    Vec<f32> => Vector,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
