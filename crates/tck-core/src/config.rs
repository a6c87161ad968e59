//! Module: config
//! Responsibility: load harness settings from TOML.

use crate::backend::BackendFeatures;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error("invalid [{section}] {key}: {problem}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        problem: String,
    },

    #[error("unknown scenario '{name}', expected one of: {}", known.join(", "))]
    UnknownScenario { name: String, known: Vec<String> },
}

impl ConfigError {
    fn invalid(section: &'static str, key: &'static str, problem: impl Into<String>) -> Self {
        Self::Invalid {
            section,
            key,
            problem: problem.into(),
        }
    }
}

///
/// TckConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TckConfig {
    pub matrix: MatrixConfig,
    pub backend: BackendConfig,
    pub contribution: ContributionConfig,
}

impl TckConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Range checks of the score modifiers and the top-k override.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let matrix = &self.matrix;
        if !(matrix.boost.is_finite() && matrix.boost > 1.0) {
            return Err(ConfigError::invalid(
                "matrix",
                "boost",
                format!("must be a finite number greater than 1, got {}", matrix.boost),
            ));
        }

        let [low, high] = matrix.constant_score_boosts;
        if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
            return Err(ConfigError::invalid(
                "matrix",
                "constant_score_boosts",
                format!("must be two positive, increasing numbers, got [{low}, {high}]"),
            ));
        }

        if self.backend.approximate_top_k == Some(0) {
            return Err(ConfigError::invalid("backend", "approximate_top_k", "must be at least 1"));
        }

        Ok(())
    }

    /// Backend features with configured overrides applied.
    #[must_use]
    pub fn features(&self, reported: BackendFeatures) -> BackendFeatures {
        BackendFeatures {
            approximate_top_k: self
                .backend
                .approximate_top_k
                .unwrap_or(reported.approximate_top_k),
        }
    }
}

///
/// MatrixConfig
///
/// Which runner operations run, and the score modifiers they use.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    pub single_field: bool,
    pub in_object_fields: bool,
    pub multi_field: bool,
    pub parameterized: bool,
    pub score: bool,
    pub null_argument: bool,
    pub unsupported: bool,
    pub idempotence: bool,
    pub multi_index: bool,

    /// Run the hand-written fixtures of `literal` after the scenarios.
    pub literal_fixtures: bool,

    /// Scenario kinds to run; empty runs every scenario.
    pub scenarios: Vec<String>,

    pub boost: f32,
    pub constant_score_boosts: [f32; 2],
}

impl MatrixConfig {
    #[must_use]
    pub fn runs_scenario(&self, kind: &str) -> bool {
        self.scenarios.is_empty() || self.scenarios.iter().any(|s| s == kind)
    }

    /// Every configured scenario name must be one of `known`.
    pub fn check_scenarios<'k>(
        &self,
        known: impl IntoIterator<Item = &'k str>,
    ) -> Result<(), ConfigError> {
        let known = known.into_iter().collect::<Vec<_>>();

        match self.scenarios.iter().find(|name| !known.contains(&name.as_str())) {
            Some(name) => Err(ConfigError::UnknownScenario {
                name: name.clone(),
                known: known.into_iter().map(str::to_string).collect(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            single_field: true,
            in_object_fields: true,
            multi_field: true,
            parameterized: true,
            score: true,
            null_argument: true,
            unsupported: true,
            idempotence: true,
            multi_index: true,
            literal_fixtures: true,
            scenarios: Vec::new(),
            boost: 42.0,
            constant_score_boosts: [7.0, 39.0],
        }
    }
}

///
/// BackendConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    /// Overrides the backend's own approximate top-k tolerance.
    pub approximate_top_k: Option<usize>,
}

///
/// ContributionConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ContributionConfig {
    pub concurrent: bool,
}

impl Default for ContributionConfig {
    fn default() -> Self {
        Self { concurrent: true }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config = TckConfig::from_toml_str("").expect("empty config");

        assert_eq!(config, TckConfig::default());
        assert!(config.matrix.multi_index);
        assert!(config.contribution.concurrent);
        assert_eq!(config.features(BackendFeatures::default()).approximate_top_k, 1);
    }

    #[test]
    fn sections_override_defaults() {
        let config = TckConfig::from_toml_str(
            r#"
            [matrix]
            score = false
            literal_fixtures = false
            scenarios = ["match", "range"]
            boost = 10.0

            [backend]
            approximate_top_k = 5

            [contribution]
            concurrent = false
            "#,
        )
        .expect("valid config");

        assert!(!config.matrix.score);
        assert!(config.matrix.single_field);
        assert!(!config.matrix.literal_fixtures);
        assert!(config.matrix.runs_scenario("range"));
        assert!(!config.matrix.runs_scenario("knn"));
        assert_eq!(config.matrix.boost, 10.0);
        assert_eq!(config.features(BackendFeatures::default()).approximate_top_k, 5);
        assert!(!config.contribution.concurrent);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = TckConfig::from_toml_str("[matrix]\nsingle_feild = true\n").expect_err("typo");

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn score_modifiers_that_cannot_rank_are_rejected() {
        let cases = [
            ("[matrix]\nboost = 0.5\n", "boost"),
            ("[matrix]\nboost = 1.0\n", "boost"),
            ("[matrix]\nconstant_score_boosts = [39.0, 7.0]\n", "constant_score_boosts"),
            ("[matrix]\nconstant_score_boosts = [0.0, 7.0]\n", "constant_score_boosts"),
            ("[backend]\napproximate_top_k = 0\n", "approximate_top_k"),
        ];

        for (source, key) in cases {
            let err = TckConfig::from_toml_str(source).expect_err(source);

            assert!(
                matches!(&err, ConfigError::Invalid { key: k, .. } if *k == key),
                "{source}: {err}"
            );
        }
    }

    #[test]
    fn programmatic_config_is_validated_too() {
        let mut config = TckConfig::default();
        config.validate().expect("defaults are valid");

        config.matrix.boost = -3.0;
        let err = config.validate().expect_err("negative boost");
        assert!(err.to_string().contains("[matrix] boost"));
    }

    #[test]
    fn configured_scenarios_must_be_known() {
        let config = TckConfig::from_toml_str(
            r#"
            [matrix]
            scenarios = ["match", "mtach"]
            "#,
        )
        .expect("syntactically valid");

        let err = config
            .matrix
            .check_scenarios(["match", "range"])
            .expect_err("typo");

        assert!(matches!(&err, ConfigError::UnknownScenario { name, .. } if name == "mtach"));
        assert!(err.to_string().contains("match, range"));
        TckConfig::default()
            .matrix
            .check_scenarios(["match"])
            .expect("empty selection runs everything");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TckConfig::load("/nonexistent/tck.toml").expect_err("no such file");

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/tck.toml"));
    }
}
