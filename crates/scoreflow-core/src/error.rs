//! Error types for scoreflow
//!
//! Errors fall into three families:
//! - [`DefinitionError`]: a constraint definition is malformed; raised while
//!   the session factory is built.
//! - [`StateError`]: the session and the caller's working solution disagree;
//!   raised during propagation. The session must be discarded afterwards.
//! - [`ConfigurationError`]: the external weight configuration or the
//!   scoring configuration cannot satisfy the constraint set.

use thiserror::Error;

use crate::score::ScoreParseError;

/// A constraint definition that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("constraint '{id}' is defined more than once")]
    DuplicateConstraint { id: String },

    #[error("constraint name must not be empty")]
    EmptyConstraintName,

    #[error("constraint '{constraint}' has a negative weight ({weight})")]
    NegativeConstraintWeight { constraint: String, weight: String },

    #[error(
        "constraint '{constraint}': indexable joiner '{joiner}' is declared after a filtering joiner"
    )]
    JoinerOrder {
        constraint: String,
        joiner: &'static str,
    },

    #[error("constraint '{constraint}' has no source stream")]
    NoSource { constraint: String },
}

/// Desynchronization between the session and its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("fact {fact_type}({id}) is already inserted")]
    FactAlreadyInserted { fact_type: &'static str, id: String },

    #[error("fact {fact_type}({id}) was never inserted")]
    FactNotInserted { fact_type: &'static str, id: String },

    #[error("{node} node received a retract for a tuple it does not hold")]
    UnknownTuple { node: &'static str },

    #[error("group in {node} node would drop below zero members")]
    NegativeGroupSize { node: &'static str },

    #[error("constraint '{constraint}' produced match weight {match_weight}; penalize and reward require a non-negative match weight")]
    InvalidMatchWeight { constraint: String, match_weight: i64 },

    #[error("score corruption{}: incremental {actual}, from scratch {expected}", scope(.constraint))]
    ScoreCorruption {
        constraint: Option<String>,
        expected: String,
        actual: String,
    },

    #[error("session is corrupted by an earlier error and must be discarded")]
    SessionCorrupted,

    #[error("session has been disposed")]
    SessionDisposed,
}

fn scope(constraint: &Option<String>) -> String {
    match constraint {
        Some(name) => format!(" in '{}'", name),
        None => String::new(),
    }
}

/// Configuration that cannot satisfy the constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("configurable constraint '{constraint}' has no weight in the constraint configuration")]
    MissingConstraintWeight { constraint: String },

    #[error("constraint weight '{value}' for '{constraint}' is invalid: {source}")]
    InvalidConstraintWeight {
        constraint: String,
        value: String,
        #[source]
        source: ScoreParseError,
    },

    #[error("invalid initializing score trend '{value}': {source}")]
    InvalidScoreTrend {
        value: String,
        #[source]
        source: ScoreParseError,
    },

    #[error("constraint match tracking is disabled for this session")]
    MatchTrackingDisabled,
}

/// Any error raised by the scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreflowError {
    #[error("definition error: {0}")]
    Definition(#[from] DefinitionError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl ScoreflowError {
    /// True for errors that leave a session unusable.
    pub fn is_state(&self) -> bool {
        matches!(self, ScoreflowError::State(_))
    }
}

/// Result type alias for scoreflow operations
pub type Result<T> = std::result::Result<T, ScoreflowError>;
