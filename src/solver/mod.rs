//! Equilibrium solvers and curve generators

mod curve;
mod mkappa;
mod mn_curve;
mod newton;

pub use curve::MKappaCurve;
pub use mkappa::{
    AxialForceEquilibrium, MKappaByConstantCurvature, MKappaByStrainPosition, MomentAxialForce,
};
pub use mn_curve::{MNCurve, MNKappaCurve};
pub use newton::{RootFinder, RootSolution};

use serde::{Deserialize, Serialize};

/// Options shared by all equilibrium solver runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Iteration budget per run
    pub max_iterations: usize,
    /// Absolute tolerance on the axial-force residual
    pub axial_tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            axial_tolerance: 10.0,
        }
    }
}

impl SolverOptions {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_axial_tolerance(mut self, axial_tolerance: f64) -> Self {
        self.axial_tolerance = axial_tolerance;
        self
    }
}

/// Why a solver run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The anchor strain cannot be reached within the material limits
    StrainOutOfRange,
    /// Newton diverged and no sign change was ever bracketed
    NoBracketingPair,
    /// Iteration budget exhausted
    MaxIterations,
    /// The numeric derivative vanished or was not finite
    DegenerateDerivative,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::StrainOutOfRange => write!(f, "strain out of range"),
            FailureReason::NoBracketingPair => write!(f, "no bracketing pair"),
            FailureReason::MaxIterations => write!(f, "maximum iterations reached"),
            FailureReason::DegenerateDerivative => write!(f, "degenerate derivative"),
        }
    }
}

/// Lifecycle of a solver run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SolveState {
    #[default]
    NotStarted,
    Iterating,
    Converged,
    Failed(FailureReason),
}
