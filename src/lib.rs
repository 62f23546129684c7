#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

//! Agent–environment engine for fitting, evaluating and simulating
//! parametric behavioral models on block-structured trial data.
//!
//! A [`Wrapper`] drives one agent model through every block of a
//! [`Dataset`]: it scores log-likelihoods for an optimizer, records
//! per-trial diagnostics, and simulates fresh trajectories.

pub mod error;
pub mod fitting;
pub mod simulation;

pub use error::{ModelError, Result};
pub use fitting::{
    Algorithm, FitBackend, FitConfig, FitMethod, FitProblem, FitResult, MultiStartNelderMead,
    Objective, Optimum,
};
pub use simulation::agent::{condition_param_names, Agent, AgentKind, Rl, RlAsym};
pub use simulation::data::{Block, Dataset, Table, Trial, Value};
pub use simulation::environment::{EnvFactory, Environment, Reversal, ReversalTask, Volatility};
pub use simulation::inference::{Prior, Priors, Transform};
pub use simulation::memory::MemoryBuffer;
pub use simulation::wrapper::{Insights, Wrapper};
