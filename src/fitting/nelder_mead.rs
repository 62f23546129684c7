//! Multi-start Nelder–Mead simplex search.
//!
//! Each start draws its initial point uniformly from the start bounds with
//! an RNG seeded by `seed + start`, so runs are reproducible and
//! independent of scheduling. Parallel starts run on the rayon pool.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use super::{Algorithm, FitBackend, FitConfig, FitProblem, Objective, Optimum};
use crate::error::{ModelError, Result};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;
/// Initial simplex edge as a fraction of each start-bound width.
const STEP_FRACTION: f64 = 0.1;
const MIN_STEP: f64 = 1e-3;

/// Nelder–Mead backend with optional multi-start parallelism.
#[derive(Clone, Debug, Default)]
pub struct MultiStartNelderMead;

impl MultiStartNelderMead {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Initial point for one start.
    fn start_point(problem: &FitProblem<'_>, config: &FitConfig, start: usize, seed: u64) -> Vec<f64> {
        if start == 0 {
            if let Some(init) = &config.init {
                return init.clone();
            }
        }
        let mut rng = StdRng::seed_from_u64(seed);
        problem
            .p_pbnds
            .iter()
            .map(|&(lo, hi)| if hi > lo { rng.random_range(lo..hi) } else { lo })
            .collect()
    }

    /// Runs one simplex search from the start's initial point.
    fn run(
        loss: &Objective<'_>,
        problem: &FitProblem<'_>,
        config: &FitConfig,
        start: usize,
    ) -> Result<Optimum> {
        let seed = config.seed.wrapping_add(start as u64);
        let x0 = clamp(Self::start_point(problem, config, start, seed), problem.p_bnds);
        let n = x0.len();

        let mut simplex: Vec<(Vec<f64>, f64)> = Vec::with_capacity(n + 1);
        let f0 = score(loss, &x0)?;
        simplex.push((x0.clone(), f0));
        for (i, &(lo, hi)) in problem.p_pbnds.iter().enumerate() {
            let mut x = x0.clone();
            x[i] += (STEP_FRACTION * (hi - lo)).max(MIN_STEP);
            let x = clamp(x, problem.p_bnds);
            let f = score(loss, &x)?;
            simplex.push((x, f));
        }

        let mut n_iter = 0;
        let mut converged = false;
        while n_iter < config.max_iter {
            simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
            let spread = simplex[n].1 - simplex[0].1;
            if spread.abs() <= config.tol {
                converged = true;
                break;
            }
            n_iter += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|(x, _)| x[j]).sum::<f64>() / n as f64)
                .collect();
            let toward = |coef: f64| -> Vec<f64> {
                let worst = &simplex[n].0;
                let x = centroid
                    .iter()
                    .zip(worst)
                    .map(|(c, w)| c + coef * (c - w))
                    .collect();
                clamp(x, problem.p_bnds)
            };

            let xr = toward(REFLECT);
            let fr = score(loss, &xr)?;
            if fr < simplex[0].1 {
                let xe = toward(EXPAND);
                let fe = score(loss, &xe)?;
                simplex[n] = if fe < fr { (xe, fe) } else { (xr, fr) };
            } else if fr < simplex[n - 1].1 {
                simplex[n] = (xr, fr);
            } else {
                let (xc, fc) = if fr < simplex[n].1 {
                    let xc = toward(REFLECT * CONTRACT);
                    let fc = score(loss, &xc)?;
                    (xc, fc)
                } else {
                    let xc = toward(-CONTRACT);
                    let fc = score(loss, &xc)?;
                    (xc, fc)
                };
                if fc < simplex[n].1.min(fr) {
                    simplex[n] = (xc, fc);
                } else {
                    let best = simplex[0].0.clone();
                    for vertex in simplex.iter_mut().skip(1) {
                        let x = best
                            .iter()
                            .zip(&vertex.0)
                            .map(|(b, v)| b + SHRINK * (v - b))
                            .collect();
                        let x = clamp(x, problem.p_bnds);
                        let f = score(loss, &x)?;
                        *vertex = (x, f);
                    }
                }
            }
        }

        simplex.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (x, loss) = simplex.swap_remove(0);
        debug!(start, seed, loss, n_iter, converged, "nelder-mead start finished");
        Ok(Optimum {
            x,
            loss,
            n_iter,
            converged,
            seed,
        })
    }
}

impl FitBackend for MultiStartNelderMead {
    fn minimize(
        &self,
        loss: &Objective<'_>,
        problem: &FitProblem<'_>,
        config: &FitConfig,
    ) -> Result<Optimum> {
        problem.validate(config)?;
        match config.alg {
            Algorithm::NelderMead => {}
        }

        let runs: Vec<Optimum> = if config.parallel {
            (0..config.n_starts())
                .into_par_iter()
                .map(|start| Self::run(loss, problem, config, start))
                .collect::<Result<_>>()?
        } else {
            vec![Self::run(loss, problem, config, 0)?]
        };

        if config.verbose {
            for run in &runs {
                info!(seed = run.seed, loss = run.loss, n_iter = run.n_iter, "fit start");
            }
        }

        let best = runs
            .into_iter()
            .min_by(|a, b| a.loss.total_cmp(&b.loss))
            .ok_or_else(|| ModelError::InvalidConfig("no optimizer starts ran".into()))?;
        info!(seed = best.seed, loss = best.loss, n_iter = best.n_iter, "fit done");
        Ok(best)
    }
}

/// Evaluates the loss, ranking non-finite values last.
fn score(loss: &Objective<'_>, x: &[f64]) -> Result<f64> {
    let f = loss(x)?;
    Ok(if f.is_nan() { f64::INFINITY } else { f })
}

/// Clamps each coordinate into its hard bound, if bounds exist.
fn clamp(mut x: Vec<f64>, bnds: Option<&[(f64, f64)]>) -> Vec<f64> {
    if let Some(bnds) = bnds {
        for (v, &(lo, hi)) in x.iter_mut().zip(bnds) {
            *v = v.clamp(lo, hi);
        }
    }
    x
}
