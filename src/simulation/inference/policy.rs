//! Policy head: logits to action distribution, and sampling from it.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::error::{ModelError, Result};

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Draws an action index from a probability vector.
///
/// # Errors
/// `InvalidDistribution` if `pi` is empty, negative, or sums to zero.
pub fn sample_action<R: Rng + ?Sized>(pi: &[f64], rng: &mut R) -> Result<usize> {
    let dist =
        WeightedIndex::new(pi).map_err(|e| ModelError::InvalidDistribution(e.to_string()))?;
    Ok(dist.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_softmax_sums_to_one() {
        let pi = softmax(&[1.0, 2.0, 3.0]);
        assert!((pi.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(pi[2] > pi[1] && pi[1] > pi[0]);
    }

    #[test]
    fn test_softmax_large_logits() {
        let pi = softmax(&[1000.0, 1000.0]);
        assert!((pi[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_degenerate_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(sample_action(&[0.0, 1.0], &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_sample_rejects_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sample_action(&[], &mut rng).is_err());
    }
}
