//! Piecewise-linear stress-strain materials
//!
//! A material is an ordered list of [`StressStrain`] points through the origin.
//! Compression strains and stresses are negative, tension positive. Each half of
//! the curve either fails past its last breakpoint (steel, concrete in
//! compression) or degrades to zero stress without failing (cracked concrete in
//! tension); only failing halves bound the admissible strain states.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};

/// A single point of a stress-strain curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressStrain {
    pub strain: f64,
    pub stress: f64,
}

impl StressStrain {
    pub fn new(strain: f64, stress: f64) -> Self {
        Self { strain, stress }
    }
}

/// Structural role of a section within a composite cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionRole {
    Girder,
    Slab,
}

/// Material family, used to tag strain positions and solver anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Concrete,
    Steel,
    Reinforcement,
}

impl std::fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialKind::Concrete => write!(f, "Concrete"),
            MaterialKind::Steel => write!(f, "Steel"),
            MaterialKind::Reinforcement => write!(f, "Reinforcement"),
        }
    }
}

/// A strain anchored at a depth, tagged with the material it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainPosition {
    pub strain: f64,
    /// Depth z of the anchor
    pub position: f64,
    pub material: MaterialKind,
}

impl StrainPosition {
    pub fn new(strain: f64, position: f64, material: MaterialKind) -> Self {
        Self {
            strain,
            position,
            material,
        }
    }
}

/// Piecewise-linear stress-strain material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    kind: MaterialKind,
    role: SectionRole,
    /// Curve points sorted by strain ascending, containing the origin
    points: Vec<StressStrain>,
    /// Exceeding the most negative strain fails the material
    compression_fails: bool,
    /// Exceeding the most positive strain fails the material
    tension_fails: bool,
}

impl Material {
    /// Build a material from raw curve points
    ///
    /// Points are sorted by strain. The curve must be strictly monotone in
    /// strain and contain the origin.
    pub fn from_points(
        kind: MaterialKind,
        role: SectionRole,
        mut points: Vec<StressStrain>,
        compression_fails: bool,
        tension_fails: bool,
    ) -> MnKappaResult<Self> {
        if points.len() < 2 {
            return Err(MnKappaError::InvalidMaterial(
                "curve needs at least two points".to_string(),
            ));
        }
        points.sort_by(|a, b| a.strain.total_cmp(&b.strain));
        for pair in points.windows(2) {
            if pair[1].strain <= pair[0].strain {
                return Err(MnKappaError::InvalidMaterial(format!(
                    "strains not strictly monotone near {}",
                    pair[0].strain
                )));
            }
        }
        let has_origin = points
            .iter()
            .any(|p| p.strain == 0.0 && p.stress.abs() < 1e-9);
        if !has_origin {
            return Err(MnKappaError::InvalidMaterial(
                "curve does not pass through the origin".to_string(),
            ));
        }
        Ok(Self {
            kind,
            role,
            points,
            compression_fails,
            tension_fails,
        })
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn role(&self) -> SectionRole {
        self.role
    }

    pub fn points(&self) -> &[StressStrain] {
        &self.points
    }

    /// Most negative strain of the defined curve
    pub fn min_strain(&self) -> f64 {
        self.points.first().map(|p| p.strain).unwrap_or(0.0)
    }

    /// Most positive strain of the defined curve
    pub fn max_strain(&self) -> f64 {
        self.points.last().map(|p| p.strain).unwrap_or(0.0)
    }

    /// Compression strain past which the material fails, if any
    pub fn compression_limit(&self) -> Option<f64> {
        if self.compression_fails && self.min_strain() < 0.0 {
            Some(self.min_strain())
        } else {
            None
        }
    }

    /// Tension strain past which the material fails, if any
    pub fn tension_limit(&self) -> Option<f64> {
        if self.tension_fails && self.max_strain() > 0.0 {
            Some(self.max_strain())
        } else {
            None
        }
    }

    /// True when the strain exceeds a failing limit
    pub fn is_failed(&self, strain: f64) -> bool {
        if let Some(limit) = self.compression_limit() {
            if strain < limit {
                return true;
            }
        }
        if let Some(limit) = self.tension_limit() {
            if strain > limit {
                return true;
            }
        }
        false
    }

    /// Stress at the given strain
    ///
    /// Linear interpolation between adjacent curve points; zero outside the
    /// defined range. The limits themselves still evaluate to their curve
    /// stress, so a fibre exactly at a failing limit carries its full stress.
    pub fn stress_at(&self, strain: f64) -> f64 {
        if strain < self.min_strain() || strain > self.max_strain() {
            return 0.0;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if strain >= a.strain && strain <= b.strain {
                let dstrain = b.strain - a.strain;
                if dstrain == 0.0 {
                    return a.stress;
                }
                return a.stress + (b.stress - a.stress) * (strain - a.strain) / dstrain;
            }
        }
        0.0
    }

    /// All breakpoint strains of the curve, ascending
    pub fn breakpoints(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.strain)
    }

    /// Breakpoint strains within the closed interval spanned by the bounds
    pub fn strains_between(&self, bound_a: f64, bound_b: f64) -> impl Iterator<Item = f64> + '_ {
        let lo = bound_a.min(bound_b);
        let hi = bound_a.max(bound_b);
        self.breakpoints().filter(move |&s| s >= lo && s <= hi)
    }
}

fn bilinear_points(f_y: f64, f_u: Option<f64>, failure_strain: Option<f64>, e: f64) -> Vec<StressStrain> {
    let eps_y = f_y / e;
    let mut points = vec![
        StressStrain::new(-eps_y, -f_y),
        StressStrain::new(0.0, 0.0),
        StressStrain::new(eps_y, f_y),
    ];
    if let Some(eps_u) = failure_strain {
        let f_u = f_u.unwrap_or(f_y);
        points.insert(0, StressStrain::new(-eps_u, -f_u));
        points.push(StressStrain::new(eps_u, f_u));
    }
    points
}

/// Structural steel configuration
///
/// Omitting the failure strain selects purely elastic behaviour, bounded at the
/// yield strain. With a failure strain the curve becomes bilinear up to the
/// ultimate strength (or ideal-plastic when no ultimate strength is given).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Steel {
    pub f_y: f64,
    pub f_u: Option<f64>,
    pub failure_strain: Option<f64>,
    /// Modulus of elasticity
    pub e: f64,
}

impl Steel {
    pub fn new(f_y: f64) -> Self {
        Self {
            f_y,
            f_u: None,
            failure_strain: None,
            e: 210_000.0,
        }
    }

    pub fn with_ultimate_strength(mut self, f_u: f64) -> Self {
        self.f_u = Some(f_u);
        self
    }

    pub fn with_failure_strain(mut self, failure_strain: f64) -> Self {
        self.failure_strain = Some(failure_strain);
        self
    }

    pub fn with_modulus(mut self, e: f64) -> Self {
        self.e = e;
        self
    }

    /// Build the material curve for the given role
    pub fn material(&self, role: SectionRole) -> MnKappaResult<Material> {
        if self.f_y <= 0.0 || self.e <= 0.0 {
            return Err(MnKappaError::InvalidMaterial(format!(
                "steel needs positive f_y and modulus (f_y {}, E {})",
                self.f_y, self.e
            )));
        }
        if let Some(eps_u) = self.failure_strain {
            if eps_u <= self.f_y / self.e {
                return Err(MnKappaError::InvalidMaterial(format!(
                    "failure strain {eps_u} does not exceed the yield strain"
                )));
            }
        }
        Material::from_points(
            MaterialKind::Steel,
            role,
            bilinear_points(self.f_y, self.f_u, self.failure_strain, self.e),
            true,
            true,
        )
    }
}

/// Reinforcement steel configuration
///
/// Same curve family as [`Steel`] with the reinforcement default modulus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reinforcement {
    pub f_y: f64,
    pub f_u: Option<f64>,
    pub failure_strain: Option<f64>,
    pub e: f64,
}

impl Reinforcement {
    pub fn new(f_y: f64) -> Self {
        Self {
            f_y,
            f_u: None,
            failure_strain: None,
            e: 200_000.0,
        }
    }

    pub fn with_ultimate_strength(mut self, f_u: f64) -> Self {
        self.f_u = Some(f_u);
        self
    }

    pub fn with_failure_strain(mut self, failure_strain: f64) -> Self {
        self.failure_strain = Some(failure_strain);
        self
    }

    pub fn with_modulus(mut self, e: f64) -> Self {
        self.e = e;
        self
    }

    pub fn material(&self, role: SectionRole) -> MnKappaResult<Material> {
        if self.f_y <= 0.0 || self.e <= 0.0 {
            return Err(MnKappaError::InvalidMaterial(format!(
                "reinforcement needs positive f_y and modulus (f_y {}, E {})",
                self.f_y, self.e
            )));
        }
        Material::from_points(
            MaterialKind::Reinforcement,
            role,
            bilinear_points(self.f_y, self.f_u, self.failure_strain, self.e),
            true,
            true,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn steel_bilinear_curve() {
        let mat = Steel::new(355.0)
            .with_ultimate_strength(400.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        assert_eq!(mat.points().len(), 5);
        assert_relative_eq!(mat.stress_at(355.0 / 210_000.0), 355.0);
        assert_relative_eq!(mat.stress_at(0.15), 400.0);
        assert_relative_eq!(mat.stress_at(-0.15), -400.0);
        // halfway up the hardening branch
        let eps_y = 355.0 / 210_000.0;
        let mid = 0.5 * (eps_y + 0.15);
        assert_relative_eq!(mat.stress_at(mid), 0.5 * (355.0 + 400.0), epsilon = 1e-9);
        assert_eq!(mat.tension_limit(), Some(0.15));
        assert_eq!(mat.compression_limit(), Some(-0.15));
    }

    #[test]
    fn elastic_steel_is_bounded_at_yield() {
        let mat = Steel::new(235.0).material(SectionRole::Girder).unwrap();
        let eps_y = 235.0 / 210_000.0;
        assert_relative_eq!(mat.max_strain(), eps_y);
        assert_relative_eq!(mat.stress_at(0.5 * eps_y), 117.5);
        assert_eq!(mat.stress_at(2.0 * eps_y), 0.0);
    }

    #[test]
    fn stress_is_antisymmetric_for_symmetric_curve() {
        let mat = Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        for eps in [0.0001, 0.001, 0.01, 0.1] {
            assert_relative_eq!(mat.stress_at(eps), -mat.stress_at(-eps), epsilon = 1e-9);
        }
    }

    #[test]
    fn curve_must_contain_origin() {
        let result = Material::from_points(
            MaterialKind::Steel,
            SectionRole::Girder,
            vec![StressStrain::new(-1.0, -1.0), StressStrain::new(1.0, 1.0)],
            true,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn non_monotone_strains_rejected() {
        let result = Material::from_points(
            MaterialKind::Steel,
            SectionRole::Girder,
            vec![
                StressStrain::new(0.0, 0.0),
                StressStrain::new(0.001, 210.0),
                StressStrain::new(0.001, 220.0),
            ],
            true,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn strains_between_is_inclusive() {
        let mat = Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        let eps_y = 355.0 / 210_000.0;
        let strains: Vec<f64> = mat.strains_between(0.0, 0.15).collect();
        assert_eq!(strains, vec![0.0, eps_y, 0.15]);
        // reversed bounds span the same interval
        let reversed: Vec<f64> = mat.strains_between(0.15, 0.0).collect();
        assert_eq!(strains, reversed);
    }
}
