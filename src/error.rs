//! Error types for moment-curvature analysis

use thiserror::Error;

/// Main error type for cross-section and beam operations
#[derive(Error, Debug)]
pub enum MnKappaError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Sections '{0}' and '{1}' overlap")]
    OverlappingSections(String, String),

    #[error("Cross-section has no sections")]
    EmptyCrossSection,

    #[error("Cross-section has no '{0}' sections")]
    MissingRole(String),

    #[error("Invalid loading: {0}")]
    InvalidLoading(String),

    #[error("Convergence failed after {0} iterations")]
    ConvergenceFailed(usize),

    #[error("Singular system - damped normal equations could not be solved")]
    SingularMatrix,

    #[error("Moment {0} exceeds the sectional capacity at a beam node")]
    MomentBeyondCapacity(f64),
}

/// Result type for cross-section and beam operations
pub type MnKappaResult<T> = Result<T, MnKappaError>;
