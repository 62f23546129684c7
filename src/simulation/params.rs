//! Numeric constants shared by transforms, scoring and fitting.

/// Upper clip applied before exponentiation.
pub const CLIP_MAX: f64 = 50.0;
/// Magnitude bound: lower clip for exponent inputs and floor for log terms.
pub const MAX_MAGNITUDE: f64 = 1e13;
/// Floor for each prior log-density term.
pub const LOG_FLOOR: f64 = -MAX_MAGNITUDE;
/// Added to probabilities before taking logs.
pub const EPS: f64 = 1e-13;
/// Default seed for fitting.
pub const DEFAULT_SEED: u64 = 2021;
/// Default number of multi-start fits.
pub const DEFAULT_N_FITS: usize = 40;
/// Default iteration cap per Nelder–Mead run.
pub const DEFAULT_MAX_ITER: usize = 400;
/// Default convergence tolerance on the simplex loss spread.
pub const DEFAULT_TOLERANCE: f64 = 1e-8;
/// Initial belief that the binary outcome is 1.
pub const INITIAL_P1: f64 = 0.5;
