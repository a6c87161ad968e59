use crate::{
    backend::Backend,
    binding::{BindingTree, ObjectFieldBindingGenerator},
    config::TckConfig,
    dataset::{BulkIndexer, DataSet, MULTI_FIELD_COUNT},
    error::ConformanceError,
    matrix::PredicateScenario,
    schema::{FieldOptions, IndexSchemaBuilder, PassThroughConverter},
    scope::ScopeModel,
    types::{
        BIG_DECIMAL, BIG_INTEGER, FieldTypeDescriptor, FieldTypeId, INTEGER, KEYWORD, LONG,
        TestValues, VECTOR, VECTOR_DIMENSION, all_types,
    },
};
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the converter declared on every field of the raw-compatible index.
const RAW_COMPATIBLE_CONVERTER: &str = "raw-compatible";

/// Name of the one field the missing-field index declares.
const UNRELATED_FIELD: &str = "unrelated_field";

/// Type and options declared in the incompatible index in place of `ty`.
///
/// Every counterpart keeps the path but changes the codec; whether the
/// counterpart still supports a given trait decides which diagnostic the
/// federated scope raises.
#[must_use]
pub fn incompatible_counterpart(
    ty: &'static FieldTypeDescriptor,
) -> (&'static FieldTypeDescriptor, FieldOptions) {
    let options = FieldOptions::new();

    match ty.id() {
        FieldTypeId::BigDecimal => (&BIG_DECIMAL, options.decimal_scale(7)),
        FieldTypeId::BigInteger => (&BIG_INTEGER, options.decimal_scale(-2)),
        FieldTypeId::Boolean | FieldTypeId::GeoPoint | FieldTypeId::LocalDate => {
            (&KEYWORD, options)
        }
        FieldTypeId::Integer => (&LONG, options),
        FieldTypeId::Vector => (&VECTOR, options.dimension(VECTOR_DIMENSION + 1)),
        FieldTypeId::AnalyzedString
        | FieldTypeId::Double
        | FieldTypeId::Keyword
        | FieldTypeId::Long
        | FieldTypeId::NormalizedString => (&INTEGER, options),
    }
}

///
/// FixtureIndexes
///
/// Names of the indexes one scenario's fixture creates.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixtureIndexes {
    pub main: String,
    pub compatible: String,
    pub raw_compatible: String,
    pub missing_field: String,
    pub incompatible: String,
}

impl FixtureIndexes {
    #[must_use]
    pub fn for_scenario(kind: &str) -> Self {
        Self {
            main: format!("{kind}_main"),
            compatible: format!("{kind}_compatible"),
            raw_compatible: format!("{kind}_raw_compatible"),
            missing_field: format!("{kind}_missing_field"),
            incompatible: format!("{kind}_incompatible"),
        }
    }
}

///
/// TypeFixture
///
/// Datasets of one supported field type.
///

#[derive(Clone, Debug)]
pub struct TypeFixture {
    pub field_type: &'static FieldTypeDescriptor,
    pub values: TestValues,
    pub single: DataSet,
    pub multi: DataSet,
    pub multi_paths: Vec<String>,
    pub nesting: DataSet,
}

impl TypeFixture {
    fn new(
        scenario: &dyn PredicateScenario,
        tree: &BindingTree,
        field_type: &'static FieldTypeDescriptor,
    ) -> Self {
        let values = scenario.values(field_type);
        let name = field_type.name();
        let multi_paths = multi_field_paths(field_type);

        let single =
            DataSet::single_field(&format!("single_{name}"), &field_type.field_name(), &values);

        Self {
            field_type,
            single,
            multi: DataSet::multi_field(&format!("multi_{name}"), &multi_paths, &values),
            nesting: DataSet::object_nesting(&format!("nesting_{name}"), tree, field_type, &values),
            multi_paths,
            values,
        }
    }

    /// Root field path of the type.
    #[must_use]
    pub fn path(&self) -> String {
        self.field_type.field_name()
    }
}

///
/// MatrixFixture
///
/// Everything one scenario's checks read: created indexes, the binding
/// tree shared by them, and the contributed datasets. Built once by
/// `setup` and passed by reference afterwards.
///

#[derive(Debug)]
pub struct MatrixFixture {
    pub indexes: FixtureIndexes,
    pub tree: BindingTree,
    pub types: Vec<TypeFixture>,
    main_scope: ScopeModel,
}

impl MatrixFixture {
    /// Create the scenario's indexes, then contribute every dataset.
    pub fn setup(
        backend: &dyn Backend,
        scenario: &dyn PredicateScenario,
        config: &TckConfig,
    ) -> Result<Self, ConformanceError> {
        let kind = scenario.kind();
        let context = format!("{kind} setup");
        let indexes = FixtureIndexes::for_scenario(kind);
        let generator = ObjectFieldBindingGenerator::new(all_types().iter().copied());

        let mut main = IndexSchemaBuilder::new(&indexes.main);
        let tree = generator.create_root(&mut main);
        declare_root_extras(&mut main);
        let mut compatible = IndexSchemaBuilder::new(&indexes.compatible);
        generator.create_root(&mut compatible);
        declare_root_extras(&mut compatible);

        let mut raw_compatible = IndexSchemaBuilder::new(&indexes.raw_compatible);
        let converter = Arc::new(PassThroughConverter::named(RAW_COMPATIBLE_CONVERTER));
        ObjectFieldBindingGenerator::new(all_types().iter().copied())
            .declare(move |ty| (ty, FieldOptions::new().dsl_converter(converter.clone())))
            .create_root(&mut raw_compatible);

        let mut missing_field = IndexSchemaBuilder::new(&indexes.missing_field);
        missing_field.field(UNRELATED_FIELD, &KEYWORD, FieldOptions::new());

        let mut incompatible = IndexSchemaBuilder::new(&indexes.incompatible);
        ObjectFieldBindingGenerator::new(all_types().iter().copied())
            .declare(incompatible_counterpart)
            .create_root(&mut incompatible);

        for builder in [main, compatible, raw_compatible, missing_field, incompatible] {
            let name = builder.name().to_string();
            backend
                .create_index(builder)
                .map_err(|err| ConformanceError::fixture(&context, err))?;
            debug!(scenario = kind, index = %name, "index created");
        }

        let types = all_types()
            .iter()
            .copied()
            .filter(|ty| scenario.supports(ty))
            .map(|ty| TypeFixture::new(scenario, &tree, ty))
            .collect::<Vec<_>>();
        let absent = types
            .iter()
            .map(|t| DataSet::missing_field(&t.single))
            .collect::<Vec<_>>();

        let sink = |index: &str| {
            backend
                .sink(index)
                .map_err(|err| ConformanceError::fixture(&context, err))
        };
        let singles = types.iter().map(|t| &t.single).collect::<Vec<_>>();
        let everything = types
            .iter()
            .flat_map(|t| [&t.single, &t.multi, &t.nesting])
            .collect::<Vec<_>>();

        BulkIndexer::new(config.contribution.concurrent)
            .add(sink(&indexes.main)?, everything)
            .add(sink(&indexes.compatible)?, singles.clone())
            .add(sink(&indexes.raw_compatible)?, singles)
            .add(sink(&indexes.missing_field)?, absent.iter().collect())
            .add(sink(&indexes.incompatible)?, absent.iter().collect())
            .join()
            .map_err(|err| ConformanceError::fixture(&context, err))?;

        let main_scope = backend
            .scope(&[indexes.main.as_str()])
            .map_err(|err| ConformanceError::fixture(&context, err))?;
        info!(scenario = kind, types = types.len(), "fixture ready");

        Ok(Self {
            indexes,
            tree,
            types,
            main_scope,
        })
    }

    /// Scope over the main index alone.
    #[must_use]
    pub const fn main_scope(&self) -> &ScopeModel {
        &self.main_scope
    }
}

/// `<type>_field0..2` siblings of every type, and one non-searchable field
/// per type.
fn declare_root_extras(builder: &mut IndexSchemaBuilder) {
    for &ty in all_types() {
        for path in multi_field_paths(ty) {
            builder.field(path, ty, FieldOptions::new());
        }
        builder.field(unsearchable_path(ty), ty, FieldOptions::new().searchable(false));
    }
}

fn multi_field_paths(ty: &FieldTypeDescriptor) -> Vec<String> {
    (0..MULTI_FIELD_COUNT)
        .map(|i| format!("{}{i}", ty.field_name()))
        .collect()
}

pub(crate) fn unsearchable_path(ty: &FieldTypeDescriptor) -> String {
    format!("{}_unsearchable", ty.name())
}
