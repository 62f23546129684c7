//! Optimizer-space to native-space parameter transforms.
//!
//! The optimizer searches an unconstrained space; agents compute with
//! bounded or positive values. Each parameter carries a monotone map:
//! ```text
//! sigmoid:  ℝ → (0, 1)
//! exp:      ℝ → (0, ∞)
//! identity: ℝ → ℝ
//! ```

use serde::{Deserialize, Serialize};

use crate::simulation::params::{CLIP_MAX, MAX_MAGNITUDE};

/// Exponential with its input clipped to `[-1e13, 50]`.
///
/// Optimizer trial points far out in parameter space must not
/// overflow to infinity.
#[inline]
#[must_use]
pub fn clip_exp(x: f64) -> f64 {
    x.clamp(-MAX_MAGNITUDE, CLIP_MAX).exp()
}

/// Logistic sigmoid built on [`clip_exp`].
#[inline]
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + clip_exp(-x))
}

/// Monotone map applied to one raw parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// Into (0, 1), e.g. learning rates.
    Sigmoid,
    /// Into (0, ∞), e.g. inverse temperatures.
    Exp,
    Identity,
}

impl Transform {
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sigmoid => sigmoid(x),
            Self::Exp => clip_exp(x),
            Self::Identity => x,
        }
    }
}

/// Applies each transform to its positionally matched raw value.
///
/// No bounds or length validation happens here; agents check the count.
#[must_use]
pub fn to_native(raw: &[f64], trans: &[Transform]) -> Vec<f64> {
    raw.iter().zip(trans).map(|(&x, t)| t.apply(x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_exp_does_not_overflow() {
        let y = clip_exp(1e6);
        assert!(y.is_finite());
        assert!((y - CLIP_MAX.exp()).abs() < 1e-6 * y);
    }

    #[test]
    fn test_sigmoid_range() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(-1e6) >= 0.0);
        assert!(sigmoid(1e6) <= 1.0);
        assert!(sigmoid(2.0) > sigmoid(1.0));
    }

    #[test]
    fn test_to_native_mixed() {
        let native = to_native(&[0.0, 0.0, 3.5], &[Transform::Sigmoid, Transform::Exp, Transform::Identity]);
        assert!((native[0] - 0.5).abs() < 1e-12);
        assert!((native[1] - 1.0).abs() < 1e-12);
        assert!((native[2] - 3.5).abs() < 1e-12);
    }
}
