//! Module: suite
//! Responsibility: run every shipped scenario and literal fixture against
//! one backend.
//! Does not own: the checks themselves (see `tck_core::matrix` and
//! `tck_core::literal`).

use std::fmt;
use tck_core::{
    backend::Backend,
    config::TckConfig,
    error::ConformanceError,
    literal::standard_fixtures,
    matrix::{
        MatrixReport, PredicateMatrixRunner, PredicateScenario, scenarios::standard_scenarios,
    },
};
use tracing::{debug, info};

///
/// SuiteReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SuiteReport {
    pub backend: String,
    pub scenarios: Vec<MatrixReport>,
    pub fixtures: Vec<MatrixReport>,
}

impl SuiteReport {
    fn reports(&self) -> impl Iterator<Item = &MatrixReport> {
        self.scenarios.iter().chain(&self.fixtures)
    }

    /// Checks passed by scenarios and fixtures together.
    #[must_use]
    pub fn checks(&self) -> usize {
        self.reports().map(|report| report.checks).sum()
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.reports().map(|report| report.skipped).sum()
    }

    #[must_use]
    pub fn scenario(&self, kind: &str) -> Option<&MatrixReport> {
        self.scenarios.iter().find(|report| report.scenario == kind)
    }

    #[must_use]
    pub fn fixture(&self, name: &str) -> Option<&MatrixReport> {
        self.fixtures.iter().find(|report| report.scenario == name)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} scenarios, {} fixtures, {} checks passed, {} skipped",
            self.backend,
            self.scenarios.len(),
            self.fixtures.len(),
            self.checks(),
            self.skipped()
        )
    }
}

///
/// Suite
///
/// The predicate matrix over every shipped scenario, filtered by
/// `[matrix] scenarios` of the configuration, followed by the literal
/// fixtures unless `[matrix] literal_fixtures` is off.
///

pub struct Suite<'b> {
    backend: &'b dyn Backend,
    config: TckConfig,
    scenarios: Vec<Box<dyn PredicateScenario>>,
}

impl<'b> Suite<'b> {
    #[must_use]
    pub fn new(backend: &'b dyn Backend, config: TckConfig) -> Self {
        Self {
            backend,
            config,
            scenarios: standard_scenarios(),
        }
    }

    /// Run an additional, backend-specific scenario after the shipped ones.
    #[must_use]
    pub fn with_scenario(mut self, scenario: Box<dyn PredicateScenario>) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Kinds that `run` will execute, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&'static str> {
        self.selected().map(|scenario| scenario.kind()).collect()
    }

    fn selected(&self) -> impl Iterator<Item = &(dyn PredicateScenario + 'static)> {
        self.scenarios
            .iter()
            .map(AsRef::as_ref)
            .filter(|scenario| self.config.matrix.runs_scenario(scenario.kind()))
    }

    /// Stops at the first failing scenario or fixture. A configuration
    /// naming an unknown scenario fails before anything runs.
    pub fn run(&self) -> Result<SuiteReport, ConformanceError> {
        self.config.validate()?;
        self.config
            .matrix
            .check_scenarios(self.scenarios.iter().map(|scenario| scenario.kind()))?;

        let runner = PredicateMatrixRunner::new(self.backend, self.config.clone());
        let mut report = SuiteReport {
            backend: self.backend.name().to_string(),
            ..SuiteReport::default()
        };

        for scenario in self.selected() {
            report.scenarios.push(runner.run_all(scenario)?);
        }
        if self.config.matrix.literal_fixtures {
            for fixture in standard_fixtures() {
                debug!(fixture = fixture.name, "running literal fixture");
                report.fixtures.push((fixture.run)(self.backend)?);
            }
        }
        info!(%report, "suite passed");

        Ok(report)
    }
}

///
/// TESTS
///

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use tck_core::{
        error::SearchError,
        matrix::scenarios::MatchScenario,
        predicate::{Predicate, PredicateFactory},
        schema::SearchTrait,
        types::{FieldTypeDescriptor, KEYWORD, TestValues},
    };
    use tck_memory::MemoryBackend;

    /// Match restricted to keyword fields, under its own kind.
    struct KeywordMatch;

    impl PredicateScenario for KeywordMatch {
        fn kind(&self) -> &'static str {
            "keyword-match"
        }

        fn required_trait(&self) -> SearchTrait {
            SearchTrait::Match
        }

        fn supports(&self, field_type: &FieldTypeDescriptor) -> bool {
            std::ptr::eq(field_type, &KEYWORD)
        }

        fn predicate(
            &self,
            factory: &PredicateFactory<'_>,
            path: &str,
            ordinal: usize,
            values: &TestValues,
        ) -> Result<Predicate, SearchError> {
            MatchScenario.predicate(factory, path, ordinal, values)
        }

        fn raw_predicate(
            &self,
            factory: &PredicateFactory<'_>,
            path: &str,
            ordinal: usize,
            values: &TestValues,
        ) -> Result<Predicate, SearchError> {
            MatchScenario.raw_predicate(factory, path, ordinal, values)
        }
    }

    fn matrix_only(toml: &str) -> TckConfig {
        let mut config = TckConfig::from_toml_str(toml).expect("valid config");
        config.matrix.literal_fixtures = false;
        config
    }

    #[test]
    fn configured_scenarios_filter_the_run() {
        let backend = MemoryBackend::new();
        let config = TckConfig::from_toml_str("[matrix]\nscenarios = [\"range\", \"match\"]\n")
            .expect("valid config");
        let suite = Suite::new(&backend, config);

        assert_eq!(suite.kinds(), vec!["match", "range"]);
    }

    #[test]
    fn default_config_selects_every_shipped_scenario() {
        let backend = MemoryBackend::new();
        let suite = Suite::new(&backend, TckConfig::default());

        assert_eq!(suite.kinds().len(), standard_scenarios().len());
    }

    #[test]
    fn added_scenario_runs_after_the_shipped_ones() {
        let backend = MemoryBackend::new();
        let config = matrix_only("[matrix]\nscenarios = [\"keyword-match\"]\n");
        let suite = Suite::new(&backend, config).with_scenario(Box::new(KeywordMatch));

        assert_eq!(suite.kinds(), vec!["keyword-match"]);
        let report = suite.run().expect("keyword match should pass");
        let scenario = report.scenario("keyword-match").expect("reported");
        assert!(scenario.checks > 0);
        assert!(report.fixtures.is_empty());
    }

    #[test]
    fn unknown_scenario_fails_before_running() {
        let backend = MemoryBackend::new();
        let config = matrix_only("[matrix]\nscenarios = [\"mtach\"]\n");
        let err = Suite::new(&backend, config).run().expect_err("typo");

        assert!(matches!(err, ConformanceError::Config(_)));
        assert!(err.to_string().contains("unknown scenario 'mtach'"));
    }

    #[test]
    fn out_of_range_boost_fails_before_running() {
        let backend = MemoryBackend::new();
        let mut config = matrix_only("");
        config.matrix.boost = 1.0;

        let err = Suite::new(&backend, config).run().expect_err("boost 1 cannot rank");
        assert!(matches!(err, ConformanceError::Config(_)));
    }

    #[test]
    fn literal_fixtures_run_after_the_matrix() {
        let backend = MemoryBackend::new();
        let config = TckConfig::from_toml_str("[matrix]\nscenarios = [\"exists\"]\n")
            .expect("valid config");

        let report = Suite::new(&backend, config).run().expect("suite should pass");
        assert_eq!(report.fixtures.len(), standard_fixtures().len());
        for fixture in standard_fixtures() {
            let ran = report.fixture(fixture.name).expect("fixture reported");
            assert!(ran.checks > 0, "{} ran no check", fixture.name);
        }
    }

    #[test]
    fn report_totals_sum_scenarios_and_fixtures() {
        let report = SuiteReport {
            backend: "memory".to_string(),
            fixtures: vec![MatrixReport {
                scenario: "phrase slop".to_string(),
                checks: 4,
                skipped: 0,
            }],
            scenarios: vec![
                MatrixReport {
                    scenario: "match".to_string(),
                    checks: 3,
                    skipped: 1,
                },
                MatrixReport {
                    scenario: "range".to_string(),
                    checks: 2,
                    skipped: 0,
                },
            ],
        };

        assert_eq!((report.checks(), report.skipped()), (9, 1));
        assert_eq!(report.scenario("range").map(|r| r.checks), Some(2));
        assert_eq!(report.fixture("phrase slop").map(|r| r.checks), Some(4));
        assert_eq!(
            report.to_string(),
            "memory: 2 scenarios, 1 fixtures, 9 checks passed, 1 skipped"
        );
    }
}
