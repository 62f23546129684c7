//! Numeric building blocks for agents.
//!
//! - Binary-outcome belief state
//! - Parameter transforms from optimizer space to native space
//! - Log-prior evaluation with a per-term floor
//! - Softmax policy head and categorical action sampling

mod beliefs;
mod policy;
mod prior;
mod transform;

pub use beliefs::{BinaryBelief, PeSign};
pub use policy::{sample_action, softmax};
pub use prior::{log_prior, Prior, Priors};
pub use transform::{clip_exp, sigmoid, to_native, Transform};
