use crate::error::{ModelError, Result};
use crate::simulation::data::Value;
use crate::simulation::inference::{softmax, BinaryBelief, PeSign};
use crate::simulation::memory::MemoryBuffer;

/// Delta-rule critic and softmax actor shared by the RL variants.
///
/// Variants differ only in the learning rate they pass to [`Self::update`].
#[derive(Debug, Clone, Default)]
pub struct DeltaCritic {
    belief: BinaryBelief,
    pi: Option<Vec<f64>>,
    pe_sign: Option<PeSign>,
    /// `{t_type}_{f_type}` of the last learned trial
    condition: Option<String>,
}

impl DeltaCritic {
    #[must_use]
    pub const fn belief(&self) -> &BinaryBelief {
        &self.belief
    }

    /// Reads the trial's outcome and condition from memory.
    ///
    /// Returns the prediction error `δ = s - p1` and records its sign.
    ///
    /// # Errors
    /// `MissingKey` for the first of `s`, `t_type`, `f_type` not pushed.
    pub fn observe(&mut self, mem: &MemoryBuffer) -> Result<f64> {
        let s = mem.num("s")?;
        let t_type = mem.text("t_type")?;
        let f_type = mem.text("f_type")?;

        let delta = self.belief.prediction_error(s);
        self.pe_sign = Some(if delta > 0.0 { PeSign::Pos } else { PeSign::Neg });
        self.condition = Some(format!("{t_type}_{f_type}"));
        Ok(delta)
    }

    pub fn update(&mut self, learning_rate: f64, delta: f64) {
        self.belief.update(learning_rate, delta);
    }

    /// `π = softmax(beta × [1 - p1, p1] ⊙ m)`, cached for `pi1`.
    ///
    /// # Errors
    /// `InvalidDistribution` when `modulation` does not have one entry per action.
    pub fn policy(&mut self, n_actions: usize, beta: f64, modulation: &[f64]) -> Result<Vec<f64>> {
        let p_s = self.belief.pair();
        if modulation.len() != n_actions || n_actions != p_s.len() {
            return Err(ModelError::InvalidDistribution(format!(
                "modulation has {} entries for {n_actions} actions over {} outcomes",
                modulation.len(),
                p_s.len()
            )));
        }
        let logits: Vec<f64> = p_s
            .iter()
            .zip(modulation)
            .map(|(p, m)| beta * p * m)
            .collect();
        let pi = softmax(&logits);
        self.pi = Some(pi.clone());
        Ok(pi)
    }

    pub fn ps1(&self) -> Option<Value> {
        Some(Value::Num(self.belief.p1()))
    }

    pub fn pi1(&self) -> Option<Value> {
        self.pi.as_ref().and_then(|pi| pi.get(1)).copied().map(Value::Num)
    }

    pub fn o(&self) -> Option<Value> {
        self.pe_sign.map(|o| Value::from(o.label()))
    }

    pub fn cond(&self) -> Option<Value> {
        self.condition.clone().map(Value::Text)
    }
}
