use crate::{
    assert::{DocRef, assert_that, expect_error},
    backend::{Backend, BackendFeatures, SearchQuery, SearchResult},
    compat::{CompatibilityExpectation, CompatibilityVerifier},
    config::TckConfig,
    error::{ConformanceError, ErrorClass, SearchError},
    matrix::{
        MatrixFixture, MatrixReport, PredicateScenario,
        fixture::{incompatible_counterpart, unsearchable_path},
    },
    predicate::{Predicate, PredicateFactory},
    scope::ScopeModel,
    types::all_types,
};
use tracing::{debug, info};

/// Name of the query parameter used by the parameterized check.
const PARAM: &str = "value";

type Operation<R> =
    fn(&R, &dyn PredicateScenario, &MatrixFixture) -> Result<MatrixReport, ConformanceError>;

///
/// PredicateMatrixRunner
///
/// Runs every check of the predicate matrix for one scenario at a time.
/// Each `run_*` operation reads a fixture built by `setup` and fails on
/// the first diverging cell.
///

pub struct PredicateMatrixRunner<'b> {
    backend: &'b dyn Backend,
    config: TckConfig,
    features: BackendFeatures,
}

impl<'b> PredicateMatrixRunner<'b> {
    #[must_use]
    pub fn new(backend: &'b dyn Backend, config: TckConfig) -> Self {
        let features = config.features(backend.features());

        Self {
            backend,
            config,
            features,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &TckConfig {
        &self.config
    }

    pub fn setup(
        &self,
        scenario: &dyn PredicateScenario,
    ) -> Result<MatrixFixture, ConformanceError> {
        MatrixFixture::setup(self.backend, scenario, &self.config)
    }

    /// Set up the scenario's fixture and run every enabled operation.
    pub fn run_all(
        &self,
        scenario: &dyn PredicateScenario,
    ) -> Result<MatrixReport, ConformanceError> {
        let fixture = self.setup(scenario)?;
        let matrix = &self.config.matrix;
        let mut report = MatrixReport::new(scenario.kind());

        let operations: [(bool, Operation<Self>); 9] = [
            (matrix.single_field, Self::run_single_field),
            (matrix.in_object_fields, Self::run_in_object_fields),
            (matrix.multi_field, Self::run_multi_field),
            (matrix.parameterized, Self::run_parameterized),
            (matrix.score, Self::run_score),
            (matrix.null_argument, Self::run_null_argument),
            (matrix.unsupported, Self::run_unsupported),
            (matrix.idempotence, Self::run_idempotence),
            (matrix.multi_index, Self::run_multi_index),
        ];

        for (enabled, operation) in operations {
            if enabled {
                report.merge(&operation(self, scenario, &fixture)?);
            }
        }
        info!(%report, "scenario passed");

        Ok(report)
    }

    /// Every supported type and ordinal matches exactly its own document
    /// through the type's root field.
    pub fn run_single_field(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);

        for ty in &fixture.types {
            let path = ty.path();
            for ordinal in 0..ty.single.ordinals() {
                let context = cell(scenario, "single field", &path, ordinal);
                let predicate =
                    built(&context, scenario.predicate(&factory, &path, ordinal, &ty.values))?;
                let result = self.search(&context, scope, predicate, ty.single.routing_key())?;

                let id = ty.single.doc_id(ordinal);
                self.expect_ordinal(scenario, &context, &result, &fixture.indexes.main, id)?;
                report.checks += 1;
            }

            let Some(predicate) = scenario.non_matching_predicate(&factory, &path, &ty.values)
            else {
                report.skipped += 1;
                continue;
            };
            let context = cell(scenario, "non-matching value", &path, 0);
            let predicate = built(&context, predicate)?;
            let result = self.search(&context, scope, predicate, ty.single.routing_key())?;
            assert_that(&context, &result).has_no_hits()?;
            report.checks += 1;
        }
        debug!(kind = scenario.kind(), checks = report.checks, "single field done");

        Ok(report)
    }

    /// Every object path of the binding tree, through implicit nesting and
    /// through an explicit wrapper on the innermost NESTED ancestor. Kinds
    /// applying to object fields must skip instances without values.
    pub fn run_in_object_fields(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);

        for ty in &fixture.types {
            for object_path in fixture.tree.paths() {
                if let Some(predicate) = scenario.object_predicate(&factory, object_path) {
                    let context = cell(scenario, "object field", object_path, 0);
                    let predicate = built(&context, predicate)?;
                    let result =
                        self.search(&context, scope, predicate, ty.nesting.routing_key())?;
                    let index = fixture.indexes.main.as_str();
                    let populated = (0..ty.nesting.ordinals())
                        .map(|ordinal| DocRef::new(index, ty.nesting.doc_id(ordinal)));
                    assert_that(&context, &result).has_hits_any_order(populated)?;
                    report.checks += 1;
                }

                let Some(path) = fixture.tree.leaf_path(object_path, ty.field_type) else {
                    report.skipped += 1;
                    continue;
                };
                let nested = fixture.tree.nested_ancestors(object_path).last().copied();

                for ordinal in 0..ty.nesting.ordinals() {
                    let context = cell(scenario, "in object field", path, ordinal);
                    let implicit =
                        built(&context, scenario.predicate(&factory, path, ordinal, &ty.values))?;
                    let mut variants = vec![implicit.clone()];
                    if let Some(nested) = nested {
                        let explicit = factory.nested(nested).add(implicit).build();
                        variants.push(built(&context, explicit)?);
                    }

                    for predicate in variants {
                        let result =
                            self.search(&context, scope, predicate, ty.nesting.routing_key())?;
                        self.expect_ordinal(
                            scenario,
                            &context,
                            &result,
                            &fixture.indexes.main,
                            ty.nesting.doc_id(ordinal),
                        )?;
                        report.checks += 1;
                    }
                }
            }
        }
        debug!(kind = scenario.kind(), checks = report.checks, "in object fields done");

        Ok(report)
    }

    /// `field(a).field(b)` matches the documents holding value i in a or b;
    /// adding the third sibling reaches every document.
    pub fn run_multi_field(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);

        for ty in &fixture.types {
            let paths = ty.multi_paths.iter().map(String::as_str).collect::<Vec<_>>();

            for ordinal in 0..ty.multi.ordinals() {
                for width in [2, paths.len()] {
                    let check = format!("{width} fields");
                    let context = cell(scenario, &check, &paths.join(","), ordinal);
                    let Some(predicate) = scenario.multi_field_predicate(
                        &factory,
                        &paths[..width],
                        ordinal,
                        &ty.values,
                    ) else {
                        report.skipped += 1;
                        continue;
                    };
                    let predicate = built(&context, predicate)?;
                    let result = self.search(&context, scope, predicate, ty.multi.routing_key())?;

                    let expected = (ordinal < width)
                        .then(|| DocRef::new(&fixture.indexes.main, ty.multi.doc_id(ordinal)));
                    assert_that(&context, &result).has_hits_any_order(expected)?;
                    report.checks += 1;
                }
            }
        }

        Ok(report)
    }

    /// The argument bound as a query parameter selects the same document
    /// as the literal; executing without the parameter is a query error.
    pub fn run_parameterized(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);

        for ty in &fixture.types {
            let path = ty.path();
            let Some(predicate) = scenario.parameterized_predicate(&factory, &path, PARAM) else {
                report.skipped += 1;
                continue;
            };
            let predicate = built(&cell(scenario, "parameterized", &path, 0), predicate)?;

            for ordinal in 0..ty.single.ordinals() {
                let context = cell(scenario, "parameterized", &path, ordinal);
                let query = SearchQuery::new(predicate.clone())
                    .routing(ty.single.routing_key())
                    .param(PARAM, scenario.parameter_value(ordinal, &ty.values));
                let result = self
                    .backend
                    .execute(scope, &query)
                    .map_err(|err| ConformanceError::unexpected(&context, err))?;

                let id = ty.single.doc_id(ordinal);
                self.expect_ordinal(scenario, &context, &result, &fixture.indexes.main, id)?;
                report.checks += 1;
            }

            let context = cell(scenario, "undefined parameter", &path, 0);
            let query = SearchQuery::new(predicate).routing(ty.single.routing_key());
            expect_error(&context, self.backend.execute(scope, &query), ErrorClass::Query)?
                .message_contains(PARAM)?;
            report.checks += 1;
        }

        Ok(report)
    }

    /// Boosts decide the ranking of two otherwise equal matches, whether
    /// applied to a scored or a constant-score predicate.
    pub fn run_score(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);
        let boost = self.config.matrix.boost;
        let [low, high] = self.config.matrix.constant_score_boosts;

        for ty in &fixture.types {
            if ty.single.ordinals() < 2 {
                report.skipped += 1;
                continue;
            }
            let path = ty.path();
            let values = &ty.values;
            let plain = |ordinal| scenario.predicate(&factory, &path, ordinal, values);
            let boosted = |ordinal| scenario.boosted(&factory, &path, ordinal, values, boost);
            let constant = |ordinal| scenario.constant_score(&factory, &path, ordinal, values);
            // Boost applied before constant_score() must survive it.
            let constant_boosted = |ordinal, boost| {
                scenario
                    .boosted(&factory, &path, ordinal, values, boost)
                    .map(Predicate::constant_score)
            };

            let cases: [(&str, Result<Vec<Predicate>, SearchError>, usize); 4] = [
                ("boost", plain(0).and_then(|a| Ok(vec![a, boosted(1)?])), 1),
                ("boost mirrored", boosted(0).and_then(|a| Ok(vec![a, plain(1)?])), 0),
                (
                    "constant score",
                    constant(0).and_then(|a| Ok(vec![a.boost(low), constant_boosted(1, high)?])),
                    1,
                ),
                (
                    "constant score mirrored",
                    constant_boosted(0, high).and_then(|a| Ok(vec![a, constant(1)?.boost(low)])),
                    0,
                ),
            ];

            for (check, clauses, top) in cases {
                let context = cell(scenario, check, &path, top);
                let predicate = factory.or(built(&context, clauses)?);
                let result = self.search(&context, scope, predicate, ty.single.routing_key())?;
                let first = DocRef::new(&fixture.indexes.main, ty.single.doc_id(top));

                if scenario.relaxed() {
                    assert_that(&context, &result)
                        .has_top_hit_within(&first, self.features.approximate_top_k)?;
                } else {
                    let second = DocRef::new(&fixture.indexes.main, ty.single.doc_id(1 - top));
                    assert_that(&context, &result)
                        .has_hits_exact_order([first, second])?
                        .has_strictly_descending_scores()?;
                }
                report.checks += 1;
            }
        }

        Ok(report)
    }

    /// A null argument is rejected when the predicate is built.
    pub fn run_null_argument(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let factory = PredicateFactory::new(fixture.main_scope());

        for ty in &fixture.types {
            let path = ty.path();
            let Some(outcome) = scenario.null_argument(&factory, &path) else {
                report.skipped += 1;
                continue;
            };

            let context = cell(scenario, "null argument", &path, 0);
            expect_error(&context, outcome, ErrorClass::Argument)?
                .message_contains("must not be null")?;
            report.checks += 1;
        }

        Ok(report)
    }

    /// Unsupported types and non-searchable fields neither advertise the
    /// trait nor accept the predicate.
    pub fn run_unsupported(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);
        let required = scenario.required_trait();
        let trait_name = required.to_string();

        let mut targets = Vec::new();
        for &ty in all_types() {
            let supported = scenario.supports(ty);
            if !supported {
                targets.push((ty, ty.field_name()));
            }
            targets.push((ty, unsearchable_path(ty)));

            let advertised = scope
                .field(&ty.field_name())
                .map_err(|err| ConformanceError::fixture(scenario.kind(), err))?
                .traits()
                .contains(&required);
            if advertised != supported {
                return Err(ConformanceError::TraitAdvertisement {
                    context: cell(scenario, "advertisement", &ty.field_name(), 0),
                    path: ty.field_name(),
                    trait_name,
                    problem: if supported {
                        "does not advertise supported trait"
                    } else {
                        "advertises unsupported trait"
                    },
                });
            }
            report.checks += 1;
        }

        for (ty, path) in targets {
            let context = cell(scenario, "unsupported", &path, 0);
            let advertised = scope
                .field(&path)
                .map_err(|err| ConformanceError::fixture(&context, err))?
                .traits()
                .contains(&required);
            if advertised {
                return Err(ConformanceError::TraitAdvertisement {
                    context,
                    path,
                    trait_name,
                    problem: "advertises unsupported trait",
                });
            }

            let outcome = scenario.predicate(&factory, &path, 0, &scenario.values(ty));
            expect_error(&context, outcome, ErrorClass::Schema)?
                .message_contains(&path)?
                .message_contains(&trait_name)?;
            report.checks += 1;
        }

        Ok(report)
    }

    /// Executing the same query twice yields identical hits.
    pub fn run_idempotence(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let scope = fixture.main_scope();
        let factory = PredicateFactory::new(scope);

        for ty in &fixture.types {
            let path = ty.path();
            let context = cell(scenario, "idempotence", &path, 0);
            let predicate = built(&context, scenario.predicate(&factory, &path, 0, &ty.values))?;
            let query = SearchQuery::new(predicate).routing(ty.single.routing_key());

            let run = || {
                self.backend
                    .execute(scope, &query)
                    .map_err(|err| ConformanceError::unexpected(&context, err))
            };
            let first = run()?;
            let second = run()?;
            assert_that(&context, &second)
                .has_hits_exact_order(first.hits.iter().map(DocRef::of))?
                .has_total_hit_count(first.total)?;
            report.checks += 1;
        }

        Ok(report)
    }

    /// Federated scopes over the main index and each counterpart.
    pub fn run_multi_index(
        &self,
        scenario: &dyn PredicateScenario,
        fixture: &MatrixFixture,
    ) -> Result<MatrixReport, ConformanceError> {
        let mut report = MatrixReport::new(scenario.kind());
        let indexes = &fixture.indexes;
        let main = indexes.main.as_str();
        let compatible = [main, indexes.compatible.as_str()];
        let raw_compatible = [main, indexes.raw_compatible.as_str()];
        let missing_field = [main, indexes.missing_field.as_str()];
        let incompatible = [main, indexes.incompatible.as_str()];

        for ty in &fixture.types {
            let owned_path = ty.path();
            let path = owned_path.as_str();
            let values = &ty.values;
            let verifier =
                CompatibilityVerifier::new(self.backend).routing(ty.single.routing_key());
            let predicate = |ordinal| {
                move |f: &PredicateFactory<'_>| scenario.predicate(f, path, ordinal, values)
            };

            if scenario.relaxed() {
                report.skipped += 1;
            } else {
                for ordinal in 0..ty.single.ordinals() {
                    let id = ty.single.doc_id(ordinal);
                    let union = |other: &str| [DocRef::new(main, &id), DocRef::new(other, &id)];

                    let context = cell(scenario, "compatible", path, ordinal);
                    verifier.expect_union(
                        &context,
                        &compatible,
                        predicate(ordinal),
                        union(compatible[1]),
                    )?;

                    // Conversion disabled sidesteps the diverging converter.
                    let context = cell(scenario, "raw compatible", path, ordinal);
                    if scenario.uses_conversion() {
                        verifier.expect_union(
                            &context,
                            &raw_compatible,
                            |f| scenario.raw_predicate(f, path, ordinal, values),
                            union(raw_compatible[1]),
                        )?;
                    } else {
                        verifier.expect_union(
                            &context,
                            &raw_compatible,
                            predicate(ordinal),
                            union(raw_compatible[1]),
                        )?;
                    }

                    let context = cell(scenario, "missing field", path, ordinal);
                    verifier.expect_missing_field_tolerated(
                        &context,
                        &missing_field,
                        predicate(ordinal),
                        main,
                        &[id.clone()],
                    )?;
                    report.checks += 3;
                }
            }

            if scenario.uses_conversion() {
                let context = cell(scenario, "converter divergence", path, 0);
                verifier.expect_failure(
                    &context,
                    &raw_compatible,
                    predicate(0),
                    &CompatibilityExpectation::new(path, "DSL converter differs"),
                )?;
                report.checks += 1;
            }

            let required = scenario.required_trait();
            let (counterpart, options) = incompatible_counterpart(ty.field_type);
            let detail = if self.backend.traits_for(counterpart, &options).contains(&required) {
                "Codec differs".to_string()
            } else {
                format!("Inconsistent support for '{required}'")
            };
            let context = cell(scenario, "incompatible", path, 0);
            verifier.expect_failure(
                &context,
                &incompatible,
                predicate(0),
                &CompatibilityExpectation::new(path, detail),
            )?;
            report.checks += 1;
        }

        Ok(report)
    }

    fn search(
        &self,
        context: &str,
        scope: &ScopeModel,
        predicate: Predicate,
        routing_key: &str,
    ) -> Result<SearchResult, ConformanceError> {
        let query = SearchQuery::new(predicate).routing(routing_key);

        self.backend
            .execute(scope, &query)
            .map_err(|err| ConformanceError::unexpected(context, err))
    }

    /// Exact single-hit match, or a top-k check for approximate kinds.
    fn expect_ordinal(
        &self,
        scenario: &dyn PredicateScenario,
        context: &str,
        result: &SearchResult,
        index: &str,
        id: String,
    ) -> Result<(), ConformanceError> {
        let expected = DocRef::new(index, id);
        let assertion = assert_that(context, result);

        if scenario.relaxed() {
            assertion.has_top_hit_within(&expected, self.features.approximate_top_k)?;
        } else {
            assertion.has_hits_any_order([expected])?;
        }

        Ok(())
    }
}

/// Failure context naming one matrix cell.
fn cell(scenario: &dyn PredicateScenario, check: &str, path: &str, ordinal: usize) -> String {
    format!("{} / {check} / '{path}' #{ordinal}", scenario.kind())
}

fn built<T>(context: &str, outcome: Result<T, SearchError>) -> Result<T, ConformanceError> {
    outcome.map_err(|err| ConformanceError::unexpected(context, err))
}
