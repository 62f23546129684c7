//! Fitting backends.
//!
//! The wrapper hands a backend its loss function together with the agent's
//! parameter names and bounds; the backend returns the best optimizer-space
//! parameter vector it found.

mod nelder_mead;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::simulation::params::{DEFAULT_MAX_ITER, DEFAULT_N_FITS, DEFAULT_SEED, DEFAULT_TOLERANCE};

pub use nelder_mead::MultiStartNelderMead;

/// Loss over optimizer-space parameters. Must be safe to call concurrently.
pub type Objective<'a> = dyn Fn(&[f64]) -> Result<f64> + Sync + 'a;

/// Objective being optimized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMethod {
    /// Maximum likelihood: priors are ignored.
    Mle,
    /// Maximum a posteriori: priors are added to the likelihood.
    Map,
}

/// Optimization algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    NelderMead,
}

/// Options for one fit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    pub method: FitMethod,
    pub alg: Algorithm,
    /// Start point for the first run; later runs start at random.
    pub init: Option<Vec<f64>>,
    pub seed: u64,
    pub verbose: bool,
    /// Run `n_fits` starts across the rayon pool instead of a single start.
    pub parallel: bool,
    pub n_fits: usize,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            method: FitMethod::Mle,
            alg: Algorithm::NelderMead,
            init: None,
            seed: DEFAULT_SEED,
            verbose: false,
            parallel: false,
            n_fits: DEFAULT_N_FITS,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOLERANCE,
        }
    }
}

impl FitConfig {
    /// Number of optimizer starts this config asks for.
    #[must_use]
    pub const fn n_starts(&self) -> usize {
        if self.parallel {
            self.n_fits
        } else {
            1
        }
    }
}

/// Parameter space description handed to a backend.
#[derive(Clone, Copy, Debug)]
pub struct FitProblem<'a> {
    pub p_name: &'a [&'a str],
    pub p_bnds: Option<&'a [(f64, f64)]>,
    pub p_pbnds: &'a [(f64, f64)],
}

impl FitProblem<'_> {
    #[must_use]
    pub const fn n_params(&self) -> usize {
        self.p_name.len()
    }

    /// Checks bounds and configuration against the parameter count.
    ///
    /// # Errors
    /// `InvalidConfig` describing the first inconsistency.
    pub fn validate(&self, config: &FitConfig) -> Result<()> {
        let n = self.n_params();
        if n == 0 {
            return Err(ModelError::InvalidConfig("agent declares no parameters".into()));
        }
        if self.p_pbnds.len() != n {
            return Err(ModelError::InvalidConfig(format!(
                "{} start bounds for {n} parameters",
                self.p_pbnds.len()
            )));
        }
        if let Some(bnds) = self.p_bnds {
            if bnds.len() != n {
                return Err(ModelError::InvalidConfig(format!(
                    "{} hard bounds for {n} parameters",
                    bnds.len()
                )));
            }
        }
        if let Some(init) = &config.init {
            if init.len() != n {
                return Err(ModelError::InvalidConfig(format!(
                    "init has {} values for {n} parameters",
                    init.len()
                )));
            }
        }
        if config.n_starts() == 0 {
            return Err(ModelError::InvalidConfig("n_fits must be positive".into()));
        }
        Ok(())
    }
}

/// Best point found by a backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Optimum {
    /// Optimizer-space parameters.
    pub x: Vec<f64>,
    pub loss: f64,
    pub n_iter: usize,
    pub converged: bool,
    /// Seed of the start that produced this optimum.
    pub seed: u64,
}

/// Minimizes an objective over a parameter space.
pub trait FitBackend: Sync {
    /// # Errors
    /// Configuration errors, or the first error raised by `loss`.
    fn minimize(
        &self,
        loss: &Objective<'_>,
        problem: &FitProblem<'_>,
        config: &FitConfig,
    ) -> Result<Optimum>;
}

/// Fit summary returned by `Wrapper::fit`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub agent: String,
    pub param_names: Vec<String>,
    /// Best-fit optimizer-space parameters.
    pub params: Vec<f64>,
    /// The same parameters in native space.
    pub native_params: Vec<f64>,
    /// Minimized loss (negative log-likelihood, plus negative log-prior for MAP).
    pub loss: f64,
    pub log_like: f64,
    pub log_post: Option<f64>,
    pub n_params: usize,
    /// Total number of trials across blocks.
    pub n_obs: usize,
    pub aic: f64,
    pub bic: f64,
    pub n_iter: usize,
    pub converged: bool,
}

impl FitResult {
    /// `AIC = 2k − 2 ln L`
    #[must_use]
    pub fn aic(log_like: f64, n_params: usize) -> f64 {
        2.0 * n_params as f64 - 2.0 * log_like
    }

    /// `BIC = k ln n − 2 ln L`
    #[must_use]
    pub fn bic(log_like: f64, n_params: usize, n_obs: usize) -> f64 {
        n_params as f64 * (n_obs.max(1) as f64).ln() - 2.0 * log_like
    }
}
