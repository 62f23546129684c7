//! Error types shared by agents, environments, the wrapper and the fitter.

use thiserror::Error;

/// Unified error type for model fitting, evaluation and simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A buffer read asked for a key the current trial never pushed.
    #[error("memory buffer has no value for key '{0}'")]
    MissingKey(String),

    /// A buffer or trial value was text where a number was expected.
    #[error("value for '{0}' is not numeric")]
    NotNumeric(String),

    /// Raw parameter vector does not match the agent's declared parameters.
    #[error("agent '{agent}' expects {expected} parameters, got {got}")]
    ParamCount {
        agent: &'static str,
        expected: usize,
        got: usize,
    },

    /// Prior specification is not aligned with the parameter vector.
    #[error("expected {expected} priors, got {got}")]
    PriorCount { expected: usize, got: usize },

    /// Introspection asked for a quantity the agent does not expose.
    #[error("unknown quantity '{name}' for agent '{agent}'")]
    UnknownQuantity { agent: &'static str, name: String },

    /// The environment factory has no environment for this block type.
    #[error("unknown block type '{0}'")]
    UnknownBlockType(String),

    /// No registered agent variant carries this name.
    #[error("unknown agent variant '{0}'")]
    UnknownAgent(String),

    /// A block holds no trials, so its block type cannot be read.
    #[error("block '{0}' has no trials")]
    EmptyBlock(String),

    /// A trial record lacks a field the environment needs.
    #[error("trial is missing field '{0}'")]
    MissingField(String),

    /// A trial field holds a value outside its domain.
    #[error("invalid trial field: {0}")]
    InvalidField(String),

    /// A policy produced a distribution that cannot be sampled.
    #[error("invalid action distribution: {0}")]
    InvalidDistribution(String),

    /// An environment generated a different number of values than it declares.
    #[error("environment generated {got} values for {expected} declared variables")]
    VoiMismatch { expected: usize, got: usize },

    /// Fitting was requested with an unusable configuration.
    #[error("invalid fit configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ModelError>;
