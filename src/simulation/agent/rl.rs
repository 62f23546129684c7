use crate::error::Result;
use crate::simulation::inference::{BinaryBelief, Transform};
use crate::simulation::memory::MemoryBuffer;

use super::critic::DeltaCritic;
use super::{Accessor, Agent};

/// Two-parameter delta-rule learner.
///
/// Tracks the probability that the binary outcome `s` is 1 and chooses
/// with a softmax over `beta × p_S × modulation`:
/// 1. Prediction error `δ = s - p1`.
/// 2. Belief update `p1 ← p1 + alpha × δ`.
/// 3. Policy `π = softmax(beta × [1 - p1, p1] ⊙ m)`.
#[derive(Debug, Clone)]
pub struct Rl {
    n_actions: usize,
    /// Learning rate in (0, 1)
    pub alpha: f64,
    /// Inverse temperature in (0, ∞)
    pub beta: f64,
    critic: DeltaCritic,
    mem: MemoryBuffer,
}

impl Rl {
    #[must_use]
    pub const fn belief(&self) -> &BinaryBelief {
        self.critic.belief()
    }
}

impl Agent for Rl {
    const NAME: &'static str = "RL";
    const P_NAME: &'static [&'static str] = &["alpha", "beta"];
    const P_TRANS: &'static [Transform] = &[Transform::Sigmoid, Transform::Exp];
    const P_PBNDS: &'static [(f64, f64)] = &[(-10.0, -0.15), (-2.0, 2.0)];
    const VOI: &'static [&'static str] = &["pS1", "pi1"];
    const QUANTITIES: &'static [(&'static str, Accessor<Self>)] = &[
        ("pS1", |a: &Self| a.critic.ps1()),
        ("pi1", |a: &Self| a.critic.pi1()),
        ("o", |a: &Self| a.critic.o()),
        ("cond", |a: &Self| a.critic.cond()),
    ];

    fn blank(n_actions: usize) -> Self {
        Self {
            n_actions,
            alpha: f64::NAN,
            beta: f64::NAN,
            critic: DeltaCritic::default(),
            mem: MemoryBuffer::new(),
        }
    }

    fn load_params(&mut self, raw: &[f64]) -> Result<()> {
        let native = Self::native_params(raw)?;
        self.alpha = native[0];
        self.beta = native[1];
        Ok(())
    }

    fn init_critic(&mut self) {
        self.critic = DeltaCritic::default();
    }

    fn learn(&mut self) -> Result<()> {
        let delta = self.critic.observe(&self.mem)?;
        self.critic.update(self.alpha, delta);
        Ok(())
    }

    fn policy(&mut self, modulation: &[f64]) -> Result<Vec<f64>> {
        self.critic.policy(self.n_actions, self.beta, modulation)
    }

    fn memory_mut(&mut self) -> &mut MemoryBuffer {
        &mut self.mem
    }
}
