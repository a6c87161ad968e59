mod values;

#[cfg(test)]
mod tests;

pub use values::TestValues;

use crate::value::ValueKind;
use derive_more::Display;
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    hash::{Hash, Hasher},
    sync::LazyLock,
};

///
/// CONSTANTS
///

pub const STANDARD_ANALYZER: &str = "standard";
pub const WHITESPACE_ANALYZER: &str = "whitespace";
pub const LOWERCASE_NORMALIZER: &str = "lowercase";

/// Dimension of generated vector fields.
pub const VECTOR_DIMENSION: usize = 3;

///
/// FieldTypeId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[remain::sorted]
pub enum FieldTypeId {
    #[display("analyzed_string")]
    AnalyzedString,
    #[display("big_decimal")]
    BigDecimal,
    #[display("big_integer")]
    BigInteger,
    #[display("boolean")]
    Boolean,
    #[display("double")]
    Double,
    #[display("geo_point")]
    GeoPoint,
    #[display("integer")]
    Integer,
    #[display("keyword")]
    Keyword,
    #[display("local_date")]
    LocalDate,
    #[display("long")]
    Long,
    #[display("normalized_string")]
    NormalizedString,
    #[display("vector")]
    Vector,
}

///
/// FieldTypeDescriptor
///
/// Identifies one value domain a field can be declared with, along with the
/// analysis and encoding defaults the domain implies. Descriptors are
/// `'static` and compared by identity of their id.
///

#[derive(Debug)]
pub struct FieldTypeDescriptor {
    id: FieldTypeId,
    value_kind: ValueKind,
    default_analyzer: Option<&'static str>,
    default_normalizer: Option<&'static str>,
    default_decimal_scale: Option<i64>,
    default_dimension: Option<usize>,
}

impl FieldTypeDescriptor {
    const fn new(id: FieldTypeId, value_kind: ValueKind) -> Self {
        Self {
            id,
            value_kind,
            default_analyzer: None,
            default_normalizer: None,
            default_decimal_scale: None,
            default_dimension: None,
        }
    }

    const fn analyzer(mut self, name: &'static str) -> Self {
        self.default_analyzer = Some(name);
        self
    }

    const fn normalizer(mut self, name: &'static str) -> Self {
        self.default_normalizer = Some(name);
        self
    }

    const fn decimal_scale(mut self, scale: i64) -> Self {
        self.default_decimal_scale = Some(scale);
        self
    }

    const fn dimension(mut self, dimension: usize) -> Self {
        self.default_dimension = Some(dimension);
        self
    }

    #[must_use]
    pub const fn id(&self) -> FieldTypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.id.to_string()
    }

    /// Name of the leaf field generated for this type, e.g. `keyword_field`.
    #[must_use]
    pub fn field_name(&self) -> String {
        format!("{}_field", self.id)
    }

    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    #[must_use]
    pub const fn default_analyzer(&self) -> Option<&'static str> {
        self.default_analyzer
    }

    #[must_use]
    pub const fn default_normalizer(&self) -> Option<&'static str> {
        self.default_normalizer
    }

    #[must_use]
    pub const fn default_decimal_scale(&self) -> Option<i64> {
        self.default_decimal_scale
    }

    #[must_use]
    pub const fn default_dimension(&self) -> Option<usize> {
        self.default_dimension
    }

    /// Keyword, analyzed and normalized strings.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.value_kind, ValueKind::Text)
    }

    #[must_use]
    pub const fn is_analyzed(&self) -> bool {
        matches!(self.id, FieldTypeId::AnalyzedString)
    }

    #[must_use]
    pub const fn is_geo_point(&self) -> bool {
        matches!(self.id, FieldTypeId::GeoPoint)
    }

    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self.id, FieldTypeId::Vector)
    }

    /// Matchable values of this type, ascending wherever the type is ordered.
    #[must_use]
    pub fn test_values(&self) -> TestValues {
        TestValues::for_type(self)
    }
}

impl PartialEq for FieldTypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FieldTypeDescriptor {}

impl Hash for FieldTypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for FieldTypeDescriptor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldTypeDescriptor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

///
/// STANDARD TYPES
///

pub static BOOLEAN: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::Boolean, ValueKind::Bool);
pub static INTEGER: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::Integer, ValueKind::Int);
pub static LONG: FieldTypeDescriptor = FieldTypeDescriptor::new(FieldTypeId::Long, ValueKind::Long);
pub static DOUBLE: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::Double, ValueKind::Double);
pub static LOCAL_DATE: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::LocalDate, ValueKind::Date);
pub static KEYWORD: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::Keyword, ValueKind::Text);
pub static ANALYZED_STRING: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::AnalyzedString, ValueKind::Text)
        .analyzer(STANDARD_ANALYZER);
pub static NORMALIZED_STRING: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::NormalizedString, ValueKind::Text)
        .normalizer(LOWERCASE_NORMALIZER);
pub static GEO_POINT: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::GeoPoint, ValueKind::GeoPoint);
pub static VECTOR: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::Vector, ValueKind::Vector).dimension(VECTOR_DIMENSION);
pub static BIG_DECIMAL: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::BigDecimal, ValueKind::Decimal).decimal_scale(2);
pub static BIG_INTEGER: FieldTypeDescriptor =
    FieldTypeDescriptor::new(FieldTypeId::BigInteger, ValueKind::BigInt).decimal_scale(0);

static REGISTRY: LazyLock<FieldTypeRegistry> = LazyLock::new(FieldTypeRegistry::standard);

///
/// FieldTypeRegistry
///
/// Every field type the kit generates schemas and values for.
/// Built once on first access and read-only afterwards.
///

#[derive(Debug)]
pub struct FieldTypeRegistry {
    types: Vec<&'static FieldTypeDescriptor>,
    by_name: BTreeMap<String, &'static FieldTypeDescriptor>,
}

impl FieldTypeRegistry {
    fn standard() -> Self {
        let types = vec![
            &BOOLEAN,
            &INTEGER,
            &LONG,
            &DOUBLE,
            &LOCAL_DATE,
            &KEYWORD,
            &ANALYZED_STRING,
            &NORMALIZED_STRING,
            &GEO_POINT,
            &VECTOR,
            &BIG_DECIMAL,
            &BIG_INTEGER,
        ];
        let by_name = types.iter().map(|ty| (ty.name(), *ty)).collect();

        Self { types, by_name }
    }

    #[must_use]
    pub fn global() -> &'static Self {
        &REGISTRY
    }

    /// Registered types in declaration order.
    #[must_use]
    pub fn all(&self) -> &[&'static FieldTypeDescriptor] {
        &self.types
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static FieldTypeDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static FieldTypeDescriptor> + '_ {
        self.types.iter().copied()
    }
}

/// Shorthand for `FieldTypeRegistry::global().all()`.
#[must_use]
pub fn all_types() -> &'static [&'static FieldTypeDescriptor] {
    FieldTypeRegistry::global().all()
}
