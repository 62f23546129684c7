//! Agent capability contract and the concrete model variants.
//!
//! Every variant goes through the same lifecycle:
//! ```text
//! blank → load_params → init_beliefs → { learn → policy → learn → … }
//! ```
//! A fresh instance is built per block and dropped when the block ends.

mod critic;
mod rl;
mod rl_asym;

use std::fmt;
use std::str::FromStr;

use crate::error::{ModelError, Result};
use crate::fitting::{FitBackend, FitConfig, FitResult};
use crate::simulation::data::{Dataset, Table, Value};
use crate::simulation::environment::EnvFactory;
use crate::simulation::inference::{to_native, Priors, Transform};
use crate::simulation::memory::MemoryBuffer;
use crate::simulation::wrapper::Wrapper;

pub use rl::Rl;
pub use rl_asym::RlAsym;

/// Typed accessor for one introspectable quantity.
pub type Accessor<A> = fn(&A) -> Option<Value>;

/// Capabilities every agent variant provides to environments and the wrapper.
pub trait Agent: Sized + 'static {
    const NAME: &'static str;
    /// Parameter names, positionally matched to raw parameter vectors.
    const P_NAME: &'static [&'static str];
    /// Optimizer-space to native-space map per parameter.
    const P_TRANS: &'static [Transform];
    /// Range used to draw optimizer start points and for display.
    const P_PBNDS: &'static [(f64, f64)];
    /// Hard optimizer-space bounds, if any.
    const P_BNDS: Option<&'static [(f64, f64)]> = None;
    /// Quantities recorded by `eval` and `sim`.
    const VOI: &'static [&'static str];
    /// Name to accessor table for every gettable quantity.
    const QUANTITIES: &'static [(&'static str, Accessor<Self>)];

    /// Constructed but uninitialized instance.
    fn blank(n_actions: usize) -> Self;

    /// Transforms raw parameters and stores them natively.
    ///
    /// # Errors
    /// `ParamCount` if `raw` does not match `P_NAME`.
    fn load_params(&mut self, raw: &[f64]) -> Result<()>;

    /// Updates beliefs from the fields pushed to memory this trial.
    ///
    /// # Errors
    /// `MissingKey` when a field the rule needs was not pushed.
    fn learn(&mut self) -> Result<()>;

    /// Computes and caches the action distribution.
    ///
    /// Repeated calls without an intervening `learn` return the same vector.
    ///
    /// # Errors
    /// `InvalidDistribution` when `modulation` does not match the action count.
    fn policy(&mut self, modulation: &[f64]) -> Result<Vec<f64>>;

    fn memory_mut(&mut self) -> &mut MemoryBuffer;

    fn init_critic(&mut self) {}
    fn init_actor(&mut self) {}
    fn init_dists(&mut self) {}

    #[must_use]
    fn n_params() -> usize {
        Self::P_NAME.len()
    }

    /// Default priors; `None` means maximum likelihood.
    #[must_use]
    fn p_priors() -> Option<Priors> {
        None
    }

    /// Builds a ready-to-run agent from raw parameters.
    ///
    /// # Errors
    /// Propagates `load_params` failures.
    fn new(n_actions: usize, raw: &[f64]) -> Result<Self> {
        let mut agent = Self::blank(n_actions);
        agent.load_params(raw)?;
        agent.init_beliefs();
        Ok(agent)
    }

    /// Runs every belief-initialization stage once.
    fn init_beliefs(&mut self) {
        self.init_critic();
        self.init_actor();
        self.init_dists();
    }

    /// Checks the parameter count and maps raw values to native space.
    ///
    /// # Errors
    /// `ParamCount` on any length mismatch.
    fn native_params(raw: &[f64]) -> Result<Vec<f64>> {
        let expected = Self::n_params();
        if raw.len() != expected || Self::P_TRANS.len() != expected {
            return Err(ModelError::ParamCount {
                agent: Self::NAME,
                expected,
                got: raw.len(),
            });
        }
        Ok(to_native(raw, Self::P_TRANS))
    }

    /// Reads a named quantity; `Ok(None)` means it is not set yet.
    ///
    /// # Errors
    /// `UnknownQuantity` for names missing from `QUANTITIES`.
    fn get(&self, name: &str) -> Result<Option<Value>> {
        Self::QUANTITIES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, accessor)| accessor(self))
            .ok_or_else(|| ModelError::UnknownQuantity {
                agent: Self::NAME,
                name: name.to_owned(),
            })
    }
}

/// Registered agent variants, looked up by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentKind {
    Rl,
    RlAsym,
}

impl AgentKind {
    pub const ALL: [Self; 2] = [Self::Rl, Self::RlAsym];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rl => Rl::NAME,
            Self::RlAsym => RlAsym::NAME,
        }
    }

    #[must_use]
    pub const fn p_name(self) -> &'static [&'static str] {
        match self {
            Self::Rl => Rl::P_NAME,
            Self::RlAsym => RlAsym::P_NAME,
        }
    }

    #[must_use]
    pub const fn n_params(self) -> usize {
        self.p_name().len()
    }

    #[must_use]
    pub const fn voi(self) -> &'static [&'static str] {
        match self {
            Self::Rl => Rl::VOI,
            Self::RlAsym => RlAsym::VOI,
        }
    }

    /// Fits this variant through a [`Wrapper`].
    ///
    /// # Errors
    /// See [`Wrapper::fit`].
    pub fn fit<F: EnvFactory, B: FitBackend>(
        self,
        env_fn: F,
        data: &Dataset,
        backend: &B,
        config: &FitConfig,
        p_priors: Option<Priors>,
    ) -> Result<FitResult> {
        match self {
            Self::Rl => Wrapper::<Rl, F>::new(env_fn).fit(data, backend, config, p_priors),
            Self::RlAsym => Wrapper::<RlAsym, F>::new(env_fn).fit(data, backend, config, p_priors),
        }
    }

    /// Evaluates this variant through a [`Wrapper`].
    ///
    /// # Errors
    /// See [`Wrapper::eval`].
    pub fn eval<F: EnvFactory>(self, env_fn: F, data: &Dataset, params: &[f64]) -> Result<Table> {
        match self {
            Self::Rl => Wrapper::<Rl, F>::new(env_fn).eval(data, params),
            Self::RlAsym => Wrapper::<RlAsym, F>::new(env_fn).eval(data, params),
        }
    }
}

impl FromStr for AgentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| ModelError::UnknownAgent(s.to_owned()))
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Expands base parameter names over conditions as `{param}_{block}_{feedback}`.
///
/// Ordering is block-major, then feedback type, then parameter.
#[must_use]
pub fn condition_param_names(
    params: &[&str],
    block_types: &[&str],
    feedback_types: &[&str],
) -> Vec<String> {
    block_types
        .iter()
        .flat_map(|b| {
            feedback_types
                .iter()
                .flat_map(move |f| params.iter().map(move |p| format!("{p}_{b}_{f}")))
        })
        .collect()
}
