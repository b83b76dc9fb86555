//! Scalar root finding for equilibrium iterations
//!
//! Newton iteration with a one-sided finite-difference derivative, falling back
//! to bisection between the best bracketing pair seen so far. The fallback
//! triggers on non-finite or vanishing derivatives, on repeated iterates, and
//! on steps leaving the admissible interval. A degenerate derivative with no
//! bracketing pair to bisect is surfaced as its own failure.

use crate::solver::FailureReason;

/// Relative step for the one-sided finite-difference derivative
const DERIVATIVE_STEP: f64 = 1e-7;
/// Iterates closer than this fraction of the interval count as repeats
const REPEAT_TOLERANCE: f64 = 1e-12;

/// A converged root with its residual and iteration count
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootSolution {
    pub root: f64,
    pub residual: f64,
    pub iterations: usize,
}

/// Newton root finder over a bounded scalar unknown
#[derive(Debug, Clone, Copy)]
pub struct RootFinder {
    pub max_iterations: usize,
    /// Convergence threshold on |residual|
    pub tolerance: f64,
    /// Admissible interval for the unknown
    pub lower: f64,
    pub upper: f64,
}

impl RootFinder {
    pub fn new(max_iterations: usize, tolerance: f64, lower: f64, upper: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
            lower: lower.min(upper),
            upper: lower.max(upper),
        }
    }

    /// Find a root of `residual` starting from `initial`
    pub fn solve(
        &self,
        mut residual: impl FnMut(f64) -> f64,
        initial: f64,
    ) -> Result<RootSolution, FailureReason> {
        let span = (self.upper - self.lower).max(f64::MIN_POSITIVE);
        let mut x = initial.clamp(self.lower, self.upper);
        // best bracketing pair: smallest positive and largest negative residual
        let mut positive: Option<(f64, f64)> = None;
        let mut negative: Option<(f64, f64)> = None;
        let mut visited: Vec<f64> = Vec::with_capacity(self.max_iterations);

        for iteration in 0..self.max_iterations {
            let r = residual(x);
            if r.is_finite() {
                // while only one side is known, keep the best residual; once a
                // sign change is bracketed, only accept replacements that
                // shrink the interval
                if r > 0.0 {
                    let replace = match (positive, negative) {
                        (None, _) => true,
                        (Some((xp, _)), Some((xn, _))) => (x - xn).abs() < (xp - xn).abs(),
                        (Some((_, best)), None) => r < best,
                    };
                    if replace {
                        positive = Some((x, r));
                    }
                } else if r < 0.0 {
                    let replace = match (negative, positive) {
                        (None, _) => true,
                        (Some((xn, _)), Some((xp, _))) => (x - xp).abs() < (xn - xp).abs(),
                        (Some((_, best)), None) => r > best,
                    };
                    if replace {
                        negative = Some((x, r));
                    }
                }
                if r.abs() <= self.tolerance {
                    return Ok(RootSolution {
                        root: x,
                        residual: r,
                        iterations: iteration + 1,
                    });
                }
            }
            visited.push(x);

            let newton = if r.is_finite() {
                self.newton_step(&mut residual, x, r, span)
            } else {
                None
            };
            // a finite residual whose derivative vanished or blew up
            let degenerate = r.is_finite() && newton.is_none();
            let next = match newton {
                Some(step)
                    if step.is_finite()
                        && step >= self.lower
                        && step <= self.upper
                        && !is_repeat(&visited, step, span) =>
                {
                    step
                }
                _ => match (positive, negative) {
                    (Some((xp, _)), Some((xn, _))) => 0.5 * (xp + xn),
                    // no sign change seen yet: probe the far half of the interval
                    _ => {
                        let mid = 0.5 * (self.lower + self.upper);
                        if is_repeat(&visited, mid, span) {
                            return Err(if degenerate {
                                FailureReason::DegenerateDerivative
                            } else {
                                FailureReason::NoBracketingPair
                            });
                        }
                        mid
                    }
                },
            };
            if is_repeat(&visited, next, span) {
                // bisection has collapsed onto a known iterate
                return Err(FailureReason::NoBracketingPair);
            }
            x = next;
        }
        Err(FailureReason::MaxIterations)
    }

    fn newton_step(
        &self,
        residual: &mut impl FnMut(f64) -> f64,
        x: f64,
        r: f64,
        span: f64,
    ) -> Option<f64> {
        let h = DERIVATIVE_STEP * (x.abs().max(1e-3 * span));
        let probe = if x + h <= self.upper { x + h } else { x - h };
        let r_probe = residual(probe);
        let derivative = (r_probe - r) / (probe - x);
        if !derivative.is_finite() || derivative == 0.0 {
            return None;
        }
        Some(x - r / derivative)
    }
}

fn is_repeat(visited: &[f64], candidate: f64, span: f64) -> bool {
    visited
        .iter()
        .any(|&v| (v - candidate).abs() <= REPEAT_TOLERANCE * span)
}
