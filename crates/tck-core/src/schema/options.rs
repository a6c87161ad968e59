use crate::{
    error::SearchError,
    schema::convert::ValueConverter,
    types::{FieldTypeDescriptor, FieldTypeId},
};
use std::{fmt, sync::Arc};

///
/// ObjectStructure
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ObjectStructure {
    /// Each instance is indexed as a separately scoped sub-document.
    Nested,
    /// Instance values are inlined into the parent.
    Flattened,
}

impl ObjectStructure {
    /// Relative name of the child binding generated for this structure.
    #[must_use]
    pub const fn child_name(self) -> &'static str {
        match self {
            Self::Nested => "nested",
            Self::Flattened => "flattened",
        }
    }
}

impl fmt::Display for ObjectStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nested => "NESTED",
            Self::Flattened => "FLATTENED",
        })
    }
}

///
/// FieldOptions
///
/// Declaration-time configuration of a leaf field. Unset analysis and
/// encoding options fall back to the field type's defaults when the schema
/// is realized.
///

#[derive(Clone, Debug)]
pub struct FieldOptions {
    pub searchable: bool,
    pub sortable: bool,
    pub projectable: bool,
    pub aggregable: bool,
    pub highlightable: bool,
    pub analyzer: Option<String>,
    pub normalizer: Option<String>,
    pub decimal_scale: Option<i64>,
    pub dimension: Option<usize>,
    pub multi_valued: bool,
    pub dsl_converter: Option<Arc<dyn ValueConverter>>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            searchable: true,
            sortable: false,
            projectable: false,
            aggregable: false,
            highlightable: false,
            analyzer: None,
            normalizer: None,
            decimal_scale: None,
            dimension: None,
            multi_valued: false,
            dsl_converter: None,
        }
    }
}

impl FieldOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    #[must_use]
    pub const fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub const fn projectable(mut self, projectable: bool) -> Self {
        self.projectable = projectable;
        self
    }

    #[must_use]
    pub const fn aggregable(mut self, aggregable: bool) -> Self {
        self.aggregable = aggregable;
        self
    }

    #[must_use]
    pub const fn highlightable(mut self, highlightable: bool) -> Self {
        self.highlightable = highlightable;
        self
    }

    #[must_use]
    pub fn analyzer(mut self, name: impl Into<String>) -> Self {
        self.analyzer = Some(name.into());
        self
    }

    #[must_use]
    pub fn normalizer(mut self, name: impl Into<String>) -> Self {
        self.normalizer = Some(name.into());
        self
    }

    #[must_use]
    pub const fn decimal_scale(mut self, scale: i64) -> Self {
        self.decimal_scale = Some(scale);
        self
    }

    #[must_use]
    pub const fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    #[must_use]
    pub const fn multi_valued(mut self, multi_valued: bool) -> Self {
        self.multi_valued = multi_valued;
        self
    }

    #[must_use]
    pub fn dsl_converter(mut self, converter: Arc<dyn ValueConverter>) -> Self {
        self.dsl_converter = Some(converter);
        self
    }

    /// Fill unset analysis and encoding options from the type's defaults
    /// and reject combinations the type cannot honour.
    pub(crate) fn resolve(
        mut self,
        ty: &FieldTypeDescriptor,
        path: &str,
    ) -> Result<Self, SearchError> {
        if !ty.is_string() && (self.analyzer.is_some() || self.normalizer.is_some()) {
            return Err(SearchError::argument(format!(
                "Field '{path}' of type '{}' cannot declare an analyzer or normalizer.",
                ty.name()
            )));
        }
        if self.analyzer.is_some() && self.normalizer.is_some() {
            return Err(SearchError::argument(format!(
                "Field '{path}' cannot declare both an analyzer and a normalizer."
            )));
        }
        if let Some(dimension) = self.dimension
            && (!ty.is_vector() || dimension == 0)
        {
            return Err(SearchError::argument(format!(
                "Field '{path}': dimension must be strictly positive and only applies to vectors."
            )));
        }
        if self.decimal_scale.is_some() && ty.default_decimal_scale().is_none() {
            return Err(SearchError::argument(format!(
                "Field '{path}' of type '{}' cannot declare a decimal scale.",
                ty.name()
            )));
        }
        if ty.id() == FieldTypeId::BigInteger && self.decimal_scale.is_some_and(|s| s > 0) {
            return Err(SearchError::argument(format!(
                "Field '{path}': decimal scale of a big integer must not be positive."
            )));
        }

        if self.analyzer.is_none() && self.normalizer.is_none() {
            self.analyzer = ty.default_analyzer().map(str::to_string);
            self.normalizer = ty.default_normalizer().map(str::to_string);
        }
        self.decimal_scale = self.decimal_scale.or(ty.default_decimal_scale());
        self.dimension = self.dimension.or(ty.default_dimension());

        Ok(self)
    }
}

///
/// FieldCodec
///
/// Index encoding of a field. Two indexes agree on how a field is stored
/// if and only if the codecs are equal.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldCodec {
    BigDecimal { decimal_scale: i64 },
    BigInteger { decimal_scale: i64 },
    Boolean,
    Double,
    GeoPoint,
    Integer,
    LocalDate,
    Long,
    String,
    Vector { dimension: usize },
}

impl FieldCodec {
    /// Codec of a field whose options were already resolved against `ty`.
    #[must_use]
    pub fn for_field(ty: &FieldTypeDescriptor, options: &FieldOptions) -> Self {
        match ty.id() {
            FieldTypeId::AnalyzedString
            | FieldTypeId::Keyword
            | FieldTypeId::NormalizedString => Self::String,
            FieldTypeId::BigDecimal => Self::BigDecimal {
                decimal_scale: options.decimal_scale.unwrap_or(0),
            },
            FieldTypeId::BigInteger => Self::BigInteger {
                decimal_scale: options.decimal_scale.unwrap_or(0),
            },
            FieldTypeId::Boolean => Self::Boolean,
            FieldTypeId::Double => Self::Double,
            FieldTypeId::GeoPoint => Self::GeoPoint,
            FieldTypeId::Integer => Self::Integer,
            FieldTypeId::LocalDate => Self::LocalDate,
            FieldTypeId::Long => Self::Long,
            FieldTypeId::Vector => Self::Vector {
                dimension: options.dimension.unwrap_or(0),
            },
        }
    }

    #[must_use]
    pub const fn decimal_scale(&self) -> Option<i64> {
        match self {
            Self::BigDecimal { decimal_scale } | Self::BigInteger { decimal_scale } => {
                Some(*decimal_scale)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BigDecimal { decimal_scale } => {
                write!(f, "DecimalFieldCodec[decimalScale={decimal_scale}]")
            }
            Self::BigInteger { decimal_scale } => {
                write!(f, "BigIntegerFieldCodec[decimalScale={decimal_scale}]")
            }
            Self::Boolean => f.write_str("BooleanFieldCodec"),
            Self::Double => f.write_str("DoubleFieldCodec"),
            Self::GeoPoint => f.write_str("GeoPointFieldCodec"),
            Self::Integer => f.write_str("IntegerFieldCodec"),
            Self::LocalDate => f.write_str("LocalDateFieldCodec"),
            Self::Long => f.write_str("LongFieldCodec"),
            Self::String => f.write_str("StringFieldCodec"),
            Self::Vector { dimension } => write!(f, "VectorFieldCodec[dimension={dimension}]"),
        }
    }
}
