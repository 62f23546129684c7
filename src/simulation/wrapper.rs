//! Agent wrapper: fits, evaluates and simulates one agent model on a dataset.
//!
//! Every block gets its own environment and a freshly built agent; trials
//! within a block run strictly in order. Blocks share no state, so the
//! likelihood is scored across blocks on the rayon pool and summed in
//! dataset order.
//!
//! ```text
//! MLE: log p(D|θ) = Σᵢ log p(Dᵢ|θ)
//! MAP: log p(θ|D) ∝ Σᵢ log p(Dᵢ|θ) + log p(θ)
//! ```

use std::marker::PhantomData;

use indexmap::IndexMap;
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::fitting::{FitBackend, FitConfig, FitMethod, FitProblem, FitResult};
use crate::simulation::agent::Agent;
use crate::simulation::data::{Block, Dataset, Predictions, Table, Value};
use crate::simulation::environment::{EnvFactory, Environment};
use crate::simulation::inference::{log_prior, to_native, Prior, Priors};

/// Per-trial introspection log, one entry per simulated trial.
pub type Insights = IndexMap<String, Vec<Option<Value>>>;

/// Drives agent model `A` through environments built by `F`.
///
/// Introspection quantities are read after the environment's call for the
/// trial, so they reflect beliefs after that trial's update.
pub struct Wrapper<A: Agent, F: EnvFactory> {
    env_fn: F,
    use_hook: bool,
    insights: Insights,
    _agent: PhantomData<fn() -> A>,
}

impl<A: Agent, F: EnvFactory> Wrapper<A, F> {
    #[must_use]
    pub fn new(env_fn: F) -> Self {
        Self {
            env_fn,
            use_hook: false,
            insights: Insights::new(),
            _agent: PhantomData,
        }
    }

    #[must_use]
    pub const fn env_fn(&self) -> &F {
        &self.env_fn
    }

    // ------------ fit ------------ //

    /// Fits parameters with `backend`.
    ///
    /// `p_priors` overrides the agent's default priors; both are ignored
    /// for `FitMethod::Mle`.
    ///
    /// # Errors
    /// `InvalidConfig` when MAP fitting has no priors, plus any backend or
    /// loss error.
    pub fn fit<B: FitBackend>(
        &self,
        data: &Dataset,
        backend: &B,
        config: &FitConfig,
        p_priors: Option<Priors>,
    ) -> Result<FitResult> {
        let priors = match config.method {
            FitMethod::Mle => None,
            FitMethod::Map => Some(p_priors.or_else(A::p_priors).ok_or_else(|| {
                ModelError::InvalidConfig(format!("MAP fit of '{}' needs priors", A::NAME))
            })?),
        };
        if let Some(priors) = &priors {
            if priors.len() != A::n_params() {
                return Err(ModelError::PriorCount {
                    expected: A::n_params(),
                    got: priors.len(),
                });
            }
        }

        let problem = FitProblem {
            p_name: A::P_NAME,
            p_bnds: A::P_BNDS,
            p_pbnds: A::P_PBNDS,
        };
        let loss = |params: &[f64]| self.loss_fn(params, data, priors.as_deref());
        let best = backend.minimize(&loss, &problem, config)?;

        let log_like = -self.loss_fn(&best.x, data, None)?;
        let log_post = match &priors {
            Some(priors) => Some(log_like + log_prior(&best.x, priors)?),
            None => None,
        };
        let n_params = A::n_params();
        let n_obs = data.values().map(Block::len).sum();

        Ok(FitResult {
            agent: A::NAME.to_owned(),
            param_names: A::P_NAME.iter().map(|&p| p.to_owned()).collect(),
            native_params: to_native(&best.x, A::P_TRANS),
            params: best.x,
            loss: best.loss,
            log_like,
            log_post,
            n_params,
            n_obs,
            aic: FitResult::aic(log_like, n_params),
            bic: FitResult::bic(log_like, n_params, n_obs),
            n_iter: best.n_iter,
            converged: best.converged,
        })
    }

    /// Total loss: negative log-likelihood plus, with priors, negative log-prior.
    ///
    /// Safe to call concurrently: each call builds its own agents.
    ///
    /// # Errors
    /// Any block's scoring error, or `PriorCount`.
    pub fn loss_fn(
        &self,
        params: &[f64],
        data: &Dataset,
        p_priors: Option<&[Box<dyn Prior>]>,
    ) -> Result<f64> {
        let blocks: Vec<(&String, &Block)> = data.iter().collect();
        let lls: Vec<f64> = blocks
            .par_iter()
            .map(|(id, block)| self.loglike(params, id, block))
            .collect::<Result<_>>()?;
        let tot_loglike_loss = -lls.iter().sum::<f64>();

        let tot_logprior_loss = match p_priors {
            Some(priors) => -Self::logprior(params, priors)?,
            None => 0.0,
        };
        Ok(tot_loglike_loss + tot_logprior_loss)
    }

    /// Log-likelihood of one block: `log p(Dᵢ|θ)`.
    ///
    /// # Errors
    /// Unknown block type, parameter count mismatch, or trial scoring errors.
    pub fn loglike(&self, params: &[f64], block_id: &str, block: &Block) -> Result<f64> {
        let block_type = block.block_type(block_id)?;
        let mut env = self.env_fn.make(block_type)?;
        let mut subj = A::new(env.n_actions(), params)?;

        let mut ll = 0.0;
        for row in &block.trials {
            ll += env.eval_fn(row, &mut subj)?;
        }
        debug!(block = block_id, block_type, trials = block.len(), ll, "block scored");
        Ok(ll)
    }

    /// Log-prior of the parameters, each term floored.
    ///
    /// # Errors
    /// `PriorCount` when priors and parameters are misaligned.
    pub fn logprior(params: &[f64], p_priors: &[Box<dyn Prior>]) -> Result<f64> {
        log_prior(params, p_priors)
    }

    // ------------ evaluate ------------ //

    /// Scores every trial and records its log-likelihood and the agent's
    /// quantities of interest next to the input data.
    ///
    /// # Errors
    /// Any block's scoring or introspection error.
    pub fn eval(&self, data: &Dataset, params: &[f64]) -> Result<Table> {
        let mut out = Table::new();
        for (block_id, block) in data {
            out.append(self.eval_block(block_id, block.clone(), params)?);
        }
        Ok(out)
    }

    fn eval_block(&self, block_id: &str, block: Block, params: &[f64]) -> Result<Table> {
        let block_type = block.block_type(block_id)?;
        let mut env = self.env_fn.make(block_type)?;
        let mut subj = A::new(env.n_actions(), params)?;

        let columns = std::iter::once("ll")
            .chain(A::VOI.iter().copied())
            .map(str::to_owned)
            .collect();
        let mut pred = Predictions::new(columns, block.len());

        for (t, row) in block.trials.iter().enumerate() {
            let ll = env.eval_fn(row, &mut subj)?;
            pred.set(t, 0, Some(Value::Num(ll)));
            for (j, v) in A::VOI.iter().enumerate() {
                pred.set(t, j + 1, subj.get(v)?);
            }
        }
        debug!(block = block_id, trials = block.len(), "block evaluated");

        Ok(pred.attach(block.trials))
    }

    // ------------ simulate ------------ //

    /// Simulates every block with parameters `params`.
    ///
    /// Input columns that share a name with a generated variable are
    /// dropped first. With hooks registered, each hooked quantity is
    /// appended to its insights log once per trial.
    ///
    /// # Errors
    /// Any block's generation or introspection error; unknown hooked
    /// quantities fail on the first trial.
    pub fn sim<R: Rng + ?Sized>(&mut self, data: &Dataset, params: &[f64], rng: &mut R) -> Result<Table> {
        let mut out = Table::new();
        for (block_id, block) in data {
            let mut block = block.clone();
            strip_generated(&mut block, self.env_fn.voi());
            out.append(self.sim_block(block_id, block, params, rng)?);
        }
        Ok(out)
    }

    fn sim_block<R: Rng + ?Sized>(
        &mut self,
        block_id: &str,
        block: Block,
        params: &[f64],
        rng: &mut R,
    ) -> Result<Table> {
        let block_type = block.block_type(block_id)?;
        let mut env = self.env_fn.make(block_type)?;
        let mut subj = A::new(env.n_actions(), params)?;

        let env_voi = self.env_fn.voi();
        let columns = env_voi
            .iter()
            .chain(A::VOI)
            .map(|&c| c.to_owned())
            .collect();
        let mut pred = Predictions::new(columns, block.len());

        for (t, row) in block.trials.iter().enumerate() {
            let subj_voi = env.sim_fn(row, &mut subj, rng)?;
            if subj_voi.len() != env_voi.len() {
                return Err(ModelError::VoiMismatch {
                    expected: env_voi.len(),
                    got: subj_voi.len(),
                });
            }

            for (j, v) in A::VOI.iter().enumerate() {
                pred.set(t, env_voi.len() + j, subj.get(v)?);
            }

            if self.use_hook {
                for (k, log) in &mut self.insights {
                    log.push(subj.get(k)?);
                }
            }

            for (i, value) in subj_voi.into_iter().enumerate() {
                pred.set(t, i, Some(value));
            }
        }
        debug!(block = block_id, trials = block.len(), "block simulated");

        Ok(pred.attach(block.trials))
    }

    /// Arms simulation-time introspection for the named quantities.
    ///
    /// Replaces any earlier registration and its logs.
    pub fn register_hooks(&mut self, names: &[&str]) {
        self.use_hook = true;
        self.insights = names.iter().map(|&k| (k.to_owned(), Vec::new())).collect();
    }

    /// Insights logged since hooks were registered, if any.
    #[must_use]
    pub fn insights(&self) -> Option<&Insights> {
        self.use_hook.then_some(&self.insights)
    }
}

/// Drops input columns named like a generated variable.
pub(crate) fn strip_generated(block: &mut Block, voi: &[&str]) {
    for v in voi {
        if block.has_column(v) {
            block.drop_column(v);
        }
    }
}
