//! Strain-based moment-curvature analysis of beam cross-sections
//!
//! This library computes the bending response of cross-sections built from
//! arbitrary piecewise-linear stress-strain materials, and from that response
//! the deflection of single-span beams:
//! - stress integration over linearly varying strain profiles
//! - equilibrium solvers producing moment-curvature points and curves
//! - composite cross-sections with an M-N-kappa-strain-difference surface
//! - beam deflection by virtual forces, with or without joint slip
//!
//! Depths grow downward from the top of the cross-section; compression strains
//! and stresses are negative; a positive curvature compresses the top fibre.
//!
//! ## Example
//! ```rust
//! use mnkappa::prelude::*;
//!
//! // a 10 x 200 steel rectangle
//! let material = Steel::new(355.0)
//!     .with_failure_strain(0.15)
//!     .material(SectionRole::Girder)
//!     .unwrap();
//! let cross_section = CrossSection::new(vec![Section::new(
//!     Rectangle::centred(0.0, 200.0, 10.0).unwrap(),
//!     material,
//! )])
//! .unwrap();
//!
//! // full moment-curvature curve
//! let curve = MKappaCurve::new(&cross_section).compute();
//! assert!(curve.maximum_moment() > 0.0);
//!
//! // deflection of a uniformly loaded single span
//! let loading = Loading::uniform(4000.0, 1.0).unwrap();
//! let beam = Beam::new(cross_section, 4000.0, 8, loading).unwrap();
//! let deflection = beam.deflection().unwrap();
//! assert!(deflection > 0.0);
//! ```

pub mod beam;
pub mod error;
pub mod loads;
pub mod math;
pub mod results;
pub mod section;
pub mod solver;

// Re-export common types
pub mod prelude {
    pub use crate::beam::{
        effective_widths, Beam, BeamNode, CompositeBeam, EffectiveWidths, LoadDeflectionCurve,
        LoadStep, SlipSolution, SlipSolverOptions,
    };
    pub use crate::error::{MnKappaError, MnKappaResult};
    pub use crate::loads::{
        HeadedStud, Loading, ShearConnector, SingleLoad, SingleSpanSingleLoads,
        SingleSpanUniformLoad,
    };
    pub use crate::results::{
        FailedAnchor, MKappaCurvePoints, MKappaPoint, MNKappaPoint, MNKappaSurface,
    };
    pub use crate::section::{
        Circle, Concrete, ConcreteCompression, ConcreteTension, CrossSection, Geometry, Material,
        MaterialKind, Rectangle, Reinforcement, Section, SectionRole, Steel, StrainPosition,
        StrainProfile, StressStrain, Trapezoid,
    };
    pub use crate::solver::{
        AxialForceEquilibrium, FailureReason, MKappaByConstantCurvature, MKappaByStrainPosition,
        MKappaCurve, MNCurve, MNKappaCurve, MomentAxialForce, SolveState, SolverOptions,
    };
}

pub use error::{MnKappaError, MnKappaResult};
