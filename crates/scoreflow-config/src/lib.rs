//! Configuration for scoreflow scoring sessions.
//!
//! Load scoring configuration from TOML or YAML to choose the propagation
//! backend, assertion level and constraint weights without code changes.
//!
//! # Examples
//!
//! Load configuration from a TOML string:
//!
//! ```
//! use scoreflow_config::{BackendKind, ScoringConfig};
//! use scoreflow_core::HardSoftScore;
//!
//! let config = ScoringConfig::from_toml_str(r#"
//!     backend = "incremental"
//!     environment_mode = "full_assert"
//!
//!     [constraint_weights]
//!     "Room conflict" = "1hard/0soft"
//!     "timetabling/Room stability" = "0hard/2soft"
//! "#).unwrap();
//!
//! assert_eq!(config.backend, BackendKind::Incremental);
//! let weights = config.constraint_weights::<HardSoftScore>().unwrap();
//! assert_eq!(weights.len(), 2);
//! ```
//!
//! Use default config when the file is missing:
//!
//! ```
//! use scoreflow_config::ScoringConfig;
//!
//! let config = ScoringConfig::load("scoring.toml").unwrap_or_default();
//! assert!(config.constraint_match_enabled);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scoreflow_core::{ConfigurationError, InitializingScoreTrend, ParseableScore};

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Scoring(#[from] ConfigurationError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Scoring session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Assertion level applied on every score calculation.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    /// Propagation strategy of new sessions.
    #[serde(default)]
    pub backend: BackendKind,

    /// Whether sessions keep enough state to explain the score.
    #[serde(default = "default_true")]
    pub constraint_match_enabled: bool,

    /// Eligibility of facts with unassigned variables for `for_each` and
    /// plain `if_exists`/`if_not_exists`.
    #[serde(default)]
    pub nullity_policy: NullityPolicy,

    /// Package of constraints that do not name one.
    #[serde(default)]
    pub default_constraint_package: Option<String>,

    /// Initializing score trend, e.g. `"ONLY_DOWN"` or `"ONLY_DOWN/ANY"`.
    #[serde(default)]
    pub initializing_score_trend: Option<String>,

    /// Weights of configurable constraints, keyed by constraint name or
    /// `package/name`, in the score type's string form.
    #[serde(default)]
    pub constraint_weights: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            environment_mode: EnvironmentMode::default(),
            backend: BackendKind::default(),
            constraint_match_enabled: true,
            nullity_policy: NullityPolicy::default(),
            default_constraint_package: None,
            initializing_score_trend: None,
            constraint_weights: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_constraint_match_enabled(mut self, enabled: bool) -> Self {
        self.constraint_match_enabled = enabled;
        self
    }

    pub fn with_nullity_policy(mut self, policy: NullityPolicy) -> Self {
        self.nullity_policy = policy;
        self
    }

    pub fn with_default_constraint_package(mut self, package: impl Into<String>) -> Self {
        self.default_constraint_package = Some(package.into());
        self
    }

    pub fn with_initializing_score_trend(mut self, trend: impl Into<String>) -> Self {
        self.initializing_score_trend = Some(trend.into());
        self
    }

    /// Sets the weight of a configurable constraint.
    pub fn with_constraint_weight(
        mut self,
        constraint: impl Into<String>,
        weight: impl Into<String>,
    ) -> Self {
        self.constraint_weights
            .insert(constraint.into(), weight.into());
        self
    }

    /// Parses every configured constraint weight as `Sc`.
    ///
    /// # Errors
    ///
    /// Returns the first weight that is not a valid `Sc` string.
    pub fn constraint_weights<Sc: ParseableScore>(&self) -> Result<Vec<(String, Sc)>, ConfigError> {
        self.constraint_weights
            .iter()
            .map(|(constraint, value)| {
                Sc::parse(value)
                    .map(|weight| (constraint.clone(), weight))
                    .map_err(|source| {
                        ConfigError::Scoring(ConfigurationError::InvalidConstraintWeight {
                            constraint: constraint.clone(),
                            value: value.clone(),
                            source,
                        })
                    })
            })
            .collect()
    }

    /// Parses the initializing score trend, if configured.
    pub fn score_trend(&self) -> Result<Option<InitializingScoreTrend>, ConfigError> {
        let Some(value) = self.initializing_score_trend.as_deref() else {
            return Ok(None);
        };
        InitializingScoreTrend::parse(value)
            .map(Some)
            .map_err(|source| {
                ConfigError::Scoring(ConfigurationError::InvalidScoreTrend {
                    value: value.to_string(),
                    source,
                })
            })
    }
}

/// Assertion level of a scoring session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// No assertions.
    #[default]
    NonReproducible,

    /// No assertions; deterministic iteration order is always used.
    Reproducible,

    /// Verify the total score against a from-scratch recomputation.
    FastAssert,

    /// Verify the total and every constraint's match total.
    FullAssert,
}

impl EnvironmentMode {
    pub fn is_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FastAssert | EnvironmentMode::FullAssert)
    }

    pub fn is_fully_asserted(&self) -> bool {
        matches!(self, EnvironmentMode::FullAssert)
    }
}

/// Propagation strategy of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Live node graph updated per insert/update/retract.
    #[default]
    Incremental,

    /// Re-evaluates every constraint over the fact set on each calculation.
    Recompute,
}

/// Whether facts with unassigned variables reach a source stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullityPolicy {
    /// Facts with unassigned variables are filtered out.
    #[default]
    ExcludeUninitialized,

    /// Every inserted fact is eligible.
    IncludeUninitialized,
}

impl NullityPolicy {
    /// Whether a fact with `uninitialized` unassigned variables passes.
    #[inline]
    pub fn admits(&self, uninitialized: u32) -> bool {
        match self {
            NullityPolicy::ExcludeUninitialized => uninitialized == 0,
            NullityPolicy::IncludeUninitialized => true,
        }
    }
}
