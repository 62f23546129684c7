use crate::error::Result;
use crate::simulation::inference::{BinaryBelief, Transform};
use crate::simulation::memory::MemoryBuffer;

use super::critic::DeltaCritic;
use super::{Accessor, Agent};

/// Delta-rule learner with separate rates for positive and negative errors.
///
/// `p1 ← p1 + alpha_pos × δ` when `δ > 0`, else `p1 ← p1 + alpha_neg × δ`.
#[derive(Debug, Clone)]
pub struct RlAsym {
    n_actions: usize,
    pub alpha_pos: f64,
    pub alpha_neg: f64,
    pub beta: f64,
    critic: DeltaCritic,
    mem: MemoryBuffer,
}

impl RlAsym {
    #[must_use]
    pub const fn belief(&self) -> &BinaryBelief {
        self.critic.belief()
    }
}

impl Agent for RlAsym {
    const NAME: &'static str = "RLasym";
    const P_NAME: &'static [&'static str] = &["alpha_pos", "alpha_neg", "beta"];
    const P_TRANS: &'static [Transform] =
        &[Transform::Sigmoid, Transform::Sigmoid, Transform::Exp];
    const P_PBNDS: &'static [(f64, f64)] = &[(-10.0, -0.15), (-10.0, -0.15), (-2.0, 2.0)];
    const VOI: &'static [&'static str] = &["pS1", "pi1", "o"];
    const QUANTITIES: &'static [(&'static str, Accessor<Self>)] = &[
        ("pS1", |a: &Self| a.critic.ps1()),
        ("pi1", |a: &Self| a.critic.pi1()),
        ("o", |a: &Self| a.critic.o()),
        ("cond", |a: &Self| a.critic.cond()),
    ];

    fn blank(n_actions: usize) -> Self {
        Self {
            n_actions,
            alpha_pos: f64::NAN,
            alpha_neg: f64::NAN,
            beta: f64::NAN,
            critic: DeltaCritic::default(),
            mem: MemoryBuffer::new(),
        }
    }

    fn load_params(&mut self, raw: &[f64]) -> Result<()> {
        let native = Self::native_params(raw)?;
        self.alpha_pos = native[0];
        self.alpha_neg = native[1];
        self.beta = native[2];
        Ok(())
    }

    fn init_critic(&mut self) {
        self.critic = DeltaCritic::default();
    }

    fn learn(&mut self) -> Result<()> {
        let delta = self.critic.observe(&self.mem)?;
        let rate = if delta > 0.0 { self.alpha_pos } else { self.alpha_neg };
        self.critic.update(rate, delta);
        Ok(())
    }

    fn policy(&mut self, modulation: &[f64]) -> Result<Vec<f64>> {
        self.critic.policy(self.n_actions, self.beta, modulation)
    }

    fn memory_mut(&mut self) -> &mut MemoryBuffer {
        &mut self.mem
    }
}
