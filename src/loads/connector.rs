//! Shear connectors for composite joints
//!
//! A connector transmits longitudinal shear through the joint as a function of
//! the local slip. The headed stud uses a bilinear load-slip curve with a
//! plateau at its resistance and loses its capacity past the maximum slip.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};
use crate::section::Concrete;

/// Slip at which the stud reaches its full resistance
const STUD_TRANSITION_SLIP: f64 = 0.5;
/// Slip capacity of the stud
const STUD_MAXIMUM_SLIP: f64 = 6.0;

/// A headed stud welded to the girder flange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadedStud {
    /// Shank diameter
    pub diameter: f64,
    /// Overall height after welding
    pub height: f64,
    /// Ultimate strength of the stud material
    pub f_u: f64,
    /// Mean compressive strength of the surrounding concrete
    pub f_cm: f64,
}

impl HeadedStud {
    pub fn new(diameter: f64, height: f64, f_u: f64, f_cm: f64) -> MnKappaResult<Self> {
        if diameter <= 0.0 || height <= 0.0 {
            return Err(MnKappaError::InvalidLoading(format!(
                "stud needs positive dimensions (d {diameter}, h {height})"
            )));
        }
        Ok(Self {
            diameter,
            height,
            f_u,
            f_cm,
        })
    }

    /// Height-to-diameter reduction: 1 for h/d >= 4, else 0.2 * (h/d + 1)
    pub fn alpha(&self) -> f64 {
        let ratio = self.height / self.diameter;
        if ratio >= 4.0 {
            1.0
        } else {
            0.2 * (ratio + 1.0)
        }
    }

    /// Steel shank failure load f_u * pi * d^2 / 4
    pub fn steel_resistance(&self) -> f64 {
        self.f_u * std::f64::consts::PI * self.diameter.powi(2) / 4.0
    }

    /// Concrete crushing load 0.374 * d^2 * alpha * sqrt(f_c * E_cm)
    pub fn concrete_resistance(&self) -> f64 {
        let e_cm = Concrete::new(self.f_cm).modulus();
        0.374 * self.diameter.powi(2) * self.alpha() * (self.f_cm * e_cm).sqrt()
    }

    /// Governing resistance
    pub fn resistance(&self) -> f64 {
        self.steel_resistance().min(self.concrete_resistance())
    }

    /// Transmitted load at the given slip
    ///
    /// Bilinear: linear rise to the resistance at 0.5 mm, plateau to 6 mm,
    /// zero beyond (the stud has sheared off). Antisymmetric in the slip sign.
    pub fn load(&self, slip: f64) -> f64 {
        let magnitude = slip.abs();
        let p_r = self.resistance();
        let value = if magnitude <= STUD_TRANSITION_SLIP {
            p_r * magnitude / STUD_TRANSITION_SLIP
        } else if magnitude <= STUD_MAXIMUM_SLIP {
            p_r
        } else {
            0.0
        };
        value * slip.signum()
    }

    /// Slip capacity of the connector
    pub fn maximum_slip(&self) -> f64 {
        STUD_MAXIMUM_SLIP
    }
}

/// A connector placed at a position along the beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShearConnector {
    /// Distance from the left support
    pub position: f64,
    pub stud: HeadedStud,
}

impl ShearConnector {
    pub fn new(position: f64, stud: HeadedStud) -> Self {
        Self { position, stud }
    }

    pub fn load(&self, slip: f64) -> f64 {
        self.stud.load(slip)
    }

    /// Equally spaced connectors over the span
    pub fn spaced(stud: HeadedStud, span: f64, spacing: f64) -> Vec<ShearConnector> {
        let mut connectors = Vec::new();
        let mut x = spacing / 2.0;
        while x < span {
            connectors.push(ShearConnector::new(x, stud));
            x += spacing;
        }
        connectors
    }
}
