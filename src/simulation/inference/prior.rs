//! Parameter priors for maximum-a-posteriori fitting.
//!
//! ```text
//! log p(θ|D) = Σᵢ log p(Dᵢ|θ) + Σⱼ log p(θⱼ)
//! ```

use statrs::distribution::Continuous;
use tracing::warn;

use crate::error::{ModelError, Result};
use crate::simulation::params::LOG_FLOOR;

/// A univariate distribution exposing its log-density.
pub trait Prior: Send + Sync {
    fn log_pdf(&self, x: f64) -> f64;
}

impl<D> Prior for D
where
    D: Continuous<f64, f64> + Send + Sync,
{
    fn log_pdf(&self, x: f64) -> f64 {
        self.ln_pdf(x)
    }
}

/// Priors aligned positionally with a parameter vector.
pub type Priors = Vec<Box<dyn Prior>>;

/// Sums each parameter's log-density under its aligned prior.
///
/// Each term is floored at `LOG_FLOOR` so a zero-density prior yields a
/// large but finite penalty.
///
/// # Errors
/// `PriorCount` when the priors do not line up with `params`.
pub fn log_prior(params: &[f64], priors: &[Box<dyn Prior>]) -> Result<f64> {
    if priors.len() != params.len() {
        return Err(ModelError::PriorCount {
            expected: params.len(),
            got: priors.len(),
        });
    }

    Ok(params
        .iter()
        .zip(priors)
        .enumerate()
        .map(|(i, (&x, prior))| {
            let lp = prior.log_pdf(x);
            if lp.is_nan() || lp < LOG_FLOOR {
                warn!(param = i, value = x, "prior log-density floored");
                LOG_FLOOR
            } else {
                lp
            }
        })
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use statrs::distribution::{Normal, Uniform};

    #[test]
    fn test_log_prior_sums_terms() {
        let priors: Priors = vec![
            Box::new(Normal::new(0.0, 1.0).unwrap()),
            Box::new(Normal::new(0.0, 1.0).unwrap()),
        ];
        let lp = log_prior(&[0.0, 0.0], &priors).unwrap();
        let expected = 2.0 * Normal::new(0.0, 1.0).unwrap().ln_pdf(0.0);
        assert!((lp - expected).abs() < 1e-12);
    }

    #[test]
    fn test_zero_density_is_floored() {
        let priors: Priors = vec![Box::new(Uniform::new(0.0, 1.0).unwrap())];
        let lp = log_prior(&[5.0], &priors).unwrap();
        assert!(lp.is_finite());
        assert!((lp - LOG_FLOOR).abs() < 1.0);
    }

    #[test]
    fn test_misaligned_priors() {
        let priors: Priors = vec![Box::new(Normal::new(0.0, 1.0).unwrap())];
        assert_eq!(
            log_prior(&[0.0, 1.0], &priors),
            Err(ModelError::PriorCount { expected: 2, got: 1 })
        );
    }
}
