//! Strain mapping and stress integration
//!
//! A strain profile assigns every depth a strain; stresses follow from the
//! material curves. Within a sub-slice bounded by material breakpoints both the
//! stress and the width are linear in z, so axial force and moment have
//! closed-form antiderivatives and the integration is exact to machine
//! precision.

use serde::{Deserialize, Serialize};

use crate::section::geometry::Geometry;
use crate::section::section::{CrossSection, Section};

/// Strain distribution over the cross-section depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StrainProfile {
    /// strain(z) = curvature * (z - neutral_axis), curvature != 0
    Linear { curvature: f64, neutral_axis: f64 },
    /// Uniform strain, the kappa = 0 path
    Constant(f64),
}

impl StrainProfile {
    /// Linear profile; zero curvature degenerates to the constant path
    pub fn linear(curvature: f64, neutral_axis: f64) -> Self {
        if curvature == 0.0 {
            StrainProfile::Constant(0.0)
        } else {
            StrainProfile::Linear {
                curvature,
                neutral_axis,
            }
        }
    }

    /// Linear profile through an anchor strain at an anchor depth
    pub fn through(curvature: f64, anchor_strain: f64, anchor_position: f64) -> Self {
        if curvature == 0.0 {
            StrainProfile::Constant(anchor_strain)
        } else {
            StrainProfile::Linear {
                curvature,
                neutral_axis: anchor_position - anchor_strain / curvature,
            }
        }
    }

    pub fn strain_at(&self, z: f64) -> f64 {
        match *self {
            StrainProfile::Linear {
                curvature,
                neutral_axis,
            } => curvature * (z - neutral_axis),
            StrainProfile::Constant(strain) => strain,
        }
    }

    /// Depth at which the profile reaches the given strain
    pub fn position_of_strain(&self, strain: f64) -> Option<f64> {
        match *self {
            StrainProfile::Linear {
                curvature,
                neutral_axis,
            } => Some(strain / curvature + neutral_axis),
            StrainProfile::Constant(_) => None,
        }
    }

    pub fn curvature(&self) -> f64 {
        match *self {
            StrainProfile::Linear { curvature, .. } => curvature,
            StrainProfile::Constant(_) => 0.0,
        }
    }

    pub fn neutral_axis(&self) -> Option<f64> {
        match *self {
            StrainProfile::Linear { neutral_axis, .. } => Some(neutral_axis),
            StrainProfile::Constant(_) => None,
        }
    }
}

/// Axial force and moment integrated over a section or cross-section
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InternalForces {
    /// Sum of sigma * b over the depth (negative = compression)
    pub axial_force: f64,
    /// Sum of sigma * b * z over the depth; positive when the top fibre is
    /// compressed
    pub moment: f64,
}

impl InternalForces {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Lever arm of the resultant, measured from z = 0
    pub fn lever_arm(&self) -> f64 {
        if self.axial_force.abs() > f64::EPSILON {
            self.moment / self.axial_force
        } else {
            0.0
        }
    }

    fn add(&mut self, other: InternalForces) {
        self.axial_force += other.axial_force;
        self.moment += other.moment;
    }
}

/// Depths closer than this fraction of the section height merge into one
const DEPTH_MERGE_TOLERANCE: f64 = 1e-9;

impl Section {
    /// Integrate stress over the section under the given strain profile
    pub fn internal_forces(&self, profile: &StrainProfile) -> InternalForces {
        if let Geometry::Circle(circle) = self.geometry {
            let stress = self.material.stress_at(profile.strain_at(circle.centroid_z));
            let axial_force = circle.area() * stress;
            return InternalForces {
                axial_force,
                moment: axial_force * circle.centroid_z,
            };
        }
        match *profile {
            StrainProfile::Constant(strain) => {
                let stress = self.material.stress_at(strain);
                let axial_force = stress * self.geometry.area();
                InternalForces {
                    axial_force,
                    moment: axial_force * self.geometry.centroid_z(),
                }
            }
            StrainProfile::Linear { .. } => self.integrate_linear(profile),
        }
    }

    fn integrate_linear(&self, profile: &StrainProfile) -> InternalForces {
        let top = self.geometry.top_edge();
        let bottom = self.geometry.bottom_edge();
        if bottom - top <= 0.0 {
            return InternalForces::zero();
        }
        let depths = self.slice_depths(profile, top, bottom);
        let mut total = InternalForces::zero();
        for pair in depths.windows(2) {
            let (z1, z2) = (pair[0], pair[1]);
            if z2 - z1 <= 0.0 {
                continue;
            }
            let sub = match self.geometry.split(z1, z2) {
                Some(g) => g,
                None => continue,
            };
            let s1 = self.material.stress_at(profile.strain_at(z1));
            let s2 = self.material.stress_at(profile.strain_at(z2));
            total.add(integrate_slice(&sub, z1, z2, s1, s2));
        }
        total
    }

    /// Slice boundaries: the geometry edges plus every material breakpoint
    /// depth falling inside the section
    fn slice_depths(&self, profile: &StrainProfile, top: f64, bottom: f64) -> Vec<f64> {
        let strain_top = profile.strain_at(top);
        let strain_bottom = profile.strain_at(bottom);
        let mut depths = vec![top, bottom];
        for strain in self.material.strains_between(strain_top, strain_bottom) {
            if let Some(z) = profile.position_of_strain(strain) {
                if z > top && z < bottom {
                    depths.push(z);
                }
            }
        }
        depths.sort_by(f64::total_cmp);
        let merge = DEPTH_MERGE_TOLERANCE * (bottom - top).max(1.0);
        depths.dedup_by(|a, b| (*a - *b).abs() <= merge);
        depths
    }
}

/// Closed-form integral of sigma(z) * b(z) and sigma(z) * b(z) * z over a slice
/// where both factors are linear
fn integrate_slice(geometry: &Geometry, z1: f64, z2: f64, s1: f64, s2: f64) -> InternalForces {
    let b1 = geometry.width_at(z1);
    let b2 = geometry.width_at(z2);
    let dz = z2 - z1;

    let ms = (s2 - s1) / dz;
    let cs = s1 - ms * z1;
    let mb = (b2 - b1) / dz;
    let cb = b1 - mb * z1;

    let p2 = (z2.powi(2) - z1.powi(2)) / 2.0;
    let p3 = (z2.powi(3) - z1.powi(3)) / 3.0;
    let p4 = (z2.powi(4) - z1.powi(4)) / 4.0;

    let axial_force = ms * mb * p3 + (ms * cb + mb * cs) * p2 + cs * cb * dz;
    let moment = ms * mb * p4 + (ms * cb + mb * cs) * p3 + cs * cb * p2;

    InternalForces {
        axial_force,
        moment,
    }
}

impl CrossSection {
    /// Integrate all sections under the given strain profile
    pub fn internal_forces(&self, profile: &StrainProfile) -> InternalForces {
        let mut total = InternalForces::zero();
        for section in self.sections() {
            total.add(section.internal_forces(profile));
        }
        total
    }

    /// True when no section strain exceeds a failing material limit
    pub fn is_admissible(&self, profile: &StrainProfile) -> bool {
        self.sections().iter().all(|section| {
            let strains = [
                profile.strain_at(section.top_edge()),
                profile.strain_at(section.bottom_edge()),
            ];
            strains.iter().all(|&s| !section.material.is_failed(s))
        })
    }
}
