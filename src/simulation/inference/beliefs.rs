//! Belief state over a binary outcome.
//!
//! Represents the agent's running estimate p(s = 1) and its complement pair.

use serde::{Deserialize, Serialize};

use crate::simulation::params::INITIAL_P1;

/// Sign of the most recent prediction error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeSign {
    Pos,
    Neg,
}

impl PeSign {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pos => "pos",
            Self::Neg => "neg",
        }
    }
}

/// Represents beliefs over s ∈ {0, 1}: `p_s = [1 - p1, p1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryBelief {
    /// Believed probability that the outcome is 1
    p1: f64,
    /// Complement pair, always summing to 1
    p_s: [f64; 2],
}

impl Default for BinaryBelief {
    fn default() -> Self {
        Self::new(INITIAL_P1)
    }
}

impl BinaryBelief {
    /// Create beliefs centered on `p1`.
    #[must_use]
    pub const fn new(p1: f64) -> Self {
        Self {
            p1,
            p_s: [1.0 - p1, p1],
        }
    }

    /// Prediction error for an observed outcome indicator: `δ = s - p1`.
    #[must_use]
    pub fn prediction_error(&self, s: f64) -> f64 {
        s - self.p1
    }

    /// Delta-rule step: `p1 ← p1 + lr × δ`.
    pub fn update(&mut self, learning_rate: f64, delta: f64) {
        self.p1 += learning_rate * delta;
        self.p_s = [1.0 - self.p1, self.p1];
    }

    #[must_use]
    pub const fn p1(&self) -> f64 {
        self.p1
    }

    #[must_use]
    pub const fn pair(&self) -> [f64; 2] {
        self.p_s
    }
}
