use rand::distr::{Bernoulli, Distribution};
use rand::Rng;

use crate::error::{ModelError, Result};
use crate::simulation::agent::Agent;
use crate::simulation::data::{Trial, Value};
use crate::simulation::inference::sample_action;
use crate::simulation::params::EPS;

/// Per-block task logic that scores and generates trials for an agent.
///
/// Both functions own the ordering between the agent's `policy` and
/// `learn` calls within a trial.
pub trait Environment {
    fn n_actions(&self) -> usize;

    /// Scores one observed trial and advances the agent's beliefs.
    ///
    /// # Errors
    /// Missing trial fields, or agent failures.
    fn eval_fn<A: Agent>(&mut self, trial: &Trial, agent: &mut A) -> Result<f64>;

    /// Generates one trial's variables, aligned with the factory's `voi`.
    ///
    /// # Errors
    /// Missing trial fields, or agent failures.
    fn sim_fn<A: Agent, R: Rng + ?Sized>(
        &mut self,
        trial: &Trial,
        agent: &mut A,
        rng: &mut R,
    ) -> Result<Vec<Value>>;
}

/// Builds an environment per block type.
pub trait EnvFactory: Sync {
    type Env: Environment;

    /// Names of the variables `sim_fn` generates, in output order.
    fn voi(&self) -> &'static [&'static str];

    /// # Errors
    /// `UnknownBlockType` for block types the factory does not serve.
    fn make(&self, block_type: &str) -> Result<Self::Env>;
}

/// Reward-contingency regime of a reversal block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Volatility {
    /// "sta": contingencies rarely reverse.
    Stable,
    /// "vol": contingencies reverse often.
    Volatile,
}

impl Volatility {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stable => "sta",
            Self::Volatile => "vol",
        }
    }
}

/// Two-armed probabilistic reversal-learning task.
///
/// Each trial carries the feedback magnitudes `mag0`/`mag1` (the policy's
/// modulation), the observed outcome `state` ∈ {0, 1} and choice `act`,
/// an optional `f_type` ("gain" or "loss") and, for simulation, the
/// generative probability `psi` that `state` is 1.
#[derive(Debug, Clone)]
pub struct Reversal {
    pub volatility: Volatility,
    trials_run: usize,
}

/// Factory for [`Reversal`] environments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReversalTask;

impl ReversalTask {
    pub const VOI: &'static [&'static str] = &["act", "state", "acc"];
}

impl EnvFactory for ReversalTask {
    type Env = Reversal;

    fn voi(&self) -> &'static [&'static str] {
        Self::VOI
    }

    fn make(&self, block_type: &str) -> Result<Reversal> {
        let volatility = match block_type {
            "sta" => Volatility::Stable,
            "vol" => Volatility::Volatile,
            other => return Err(ModelError::UnknownBlockType(other.to_owned())),
        };
        Ok(Reversal::new(volatility))
    }
}

impl Reversal {
    #[must_use]
    pub const fn new(volatility: Volatility) -> Self {
        Self {
            volatility,
            trials_run: 0,
        }
    }

    /// Number of trials scored or generated so far.
    #[must_use]
    pub const fn trials_run(&self) -> usize {
        self.trials_run
    }

    fn modulation(trial: &Trial) -> Result<[f64; 2]> {
        Ok([trial.num("mag0")?, trial.num("mag1")?])
    }

    /// Pushes the fields `learn` reads for this trial.
    fn push_outcome<A: Agent>(&self, trial: &Trial, agent: &mut A, state: f64) {
        let f_type = trial
            .get("f_type")
            .cloned()
            .unwrap_or_else(|| Value::from("gain"));
        agent.memory_mut().push([
            ("s", Value::Num(state)),
            ("t_type", Value::from(self.volatility.label())),
            ("f_type", f_type),
        ]);
    }
}

impl Environment for Reversal {
    fn n_actions(&self) -> usize {
        2
    }

    fn eval_fn<A: Agent>(&mut self, trial: &Trial, agent: &mut A) -> Result<f64> {
        let m = Self::modulation(trial)?;
        let act = trial.index("act")?;
        let state = trial.num("state")?;

        let pi = agent.policy(&m)?;
        let p_act = *pi.get(act).ok_or_else(|| {
            ModelError::InvalidDistribution(format!("action {act} outside {} actions", pi.len()))
        })?;
        let ll = (p_act + EPS).ln();

        self.push_outcome(trial, agent, state);
        agent.learn()?;
        self.trials_run += 1;
        Ok(ll)
    }

    fn sim_fn<A: Agent, R: Rng + ?Sized>(
        &mut self,
        trial: &Trial,
        agent: &mut A,
        rng: &mut R,
    ) -> Result<Vec<Value>> {
        let m = Self::modulation(trial)?;
        let psi = trial.num("psi")?;

        let pi = agent.policy(&m)?;
        let act = sample_action(&pi, rng)?;
        let outcome = Bernoulli::new(psi)
            .map_err(|e| ModelError::InvalidDistribution(e.to_string()))?
            .sample(rng);
        let state = if outcome { 1.0 } else { 0.0 };
        let acc = (act as f64 - state).abs() < f64::EPSILON;

        self.push_outcome(trial, agent, state);
        agent.learn()?;
        self.trials_run += 1;
        Ok(vec![Value::Num(act as f64), Value::Num(state), Value::from(acc)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::agent::Rl;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn trial(act: f64, state: f64) -> Trial {
        Trial::new()
            .with("block_type", "sta")
            .with("mag0", 1.0)
            .with("mag1", 1.0)
            .with("act", act)
            .with("state", state)
            .with("psi", 0.8)
    }

    #[test]
    fn test_factory_block_types() {
        assert_eq!(ReversalTask.make("sta").unwrap().volatility, Volatility::Stable);
        assert_eq!(ReversalTask.make("vol").unwrap().volatility, Volatility::Volatile);
        assert_eq!(
            ReversalTask.make("xyz").err(),
            Some(ModelError::UnknownBlockType("xyz".into()))
        );
    }

    #[test]
    fn test_first_trial_likelihood_is_chance() {
        let mut env = ReversalTask.make("sta").unwrap();
        let mut agent = Rl::new(2, &[0.0, 0.0]).unwrap();
        let ll = env.eval_fn(&trial(1.0, 1.0), &mut agent).unwrap();
        assert!((ll - 0.5f64.ln()).abs() < 1e-9);
        assert!((agent.belief().p1() - 0.75).abs() < 1e-12);
        assert_eq!(env.trials_run(), 1);
    }

    #[test]
    fn test_eval_requires_fields() {
        let mut env = ReversalTask.make("sta").unwrap();
        let mut agent = Rl::new(2, &[0.0, 0.0]).unwrap();
        let incomplete = Trial::new().with("mag0", 1.0).with("mag1", 1.0);
        assert_eq!(
            env.eval_fn(&incomplete, &mut agent),
            Err(ModelError::MissingField("act".into()))
        );
    }

    #[test]
    fn test_sim_outputs_align_with_voi() {
        let mut env = ReversalTask.make("vol").unwrap();
        let mut agent = Rl::new(2, &[0.0, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let out = env.sim_fn(&trial(0.0, 0.0), &mut agent, &mut rng).unwrap();

        assert_eq!(out.len(), ReversalTask::VOI.len());
        let act = out[0].as_f64().unwrap();
        let state = out[1].as_f64().unwrap();
        let acc = out[2].as_f64().unwrap();
        assert!(act == 0.0 || act == 1.0);
        assert!(state == 0.0 || state == 1.0);
        assert_eq!(acc == 1.0, act == state);
    }
}
