//! Concrete stress-strain curves
//!
//! Closed-form EN 1992-1-1 curve families, sampled into piecewise-linear
//! materials. Compression always fails at the ultimate strain; the tension
//! branch drops (or softens) to zero stress and never fails, so a cracked
//! fibre carries nothing but does not terminate the cross-section response.
//!
//! All strengths are in N/mm², strains dimensionless.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};
use crate::section::material::{Material, MaterialKind, SectionRole, StressStrain};

/// Compression curve family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteCompression {
    /// Continuous EN 1992-1-1 curve, sampled by chord-error refinement
    Nonlinear,
    /// Parabola up to eps_c2, rectangle to eps_cu2
    Parabola,
    /// Linear up to eps_c3, plateau to eps_cu3
    Bilinear,
}

/// Tension curve family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteTension {
    /// Linear to the tensile strength, then a drop to zero
    Default,
    /// Fracture-energy crack-opening softening past the tensile strength
    ConsiderOpeningBehaviour,
}

/// Concrete configuration
///
/// Only the mean compressive strength is required; everything else has code
/// defaults. The characteristic strength is taken as `f_cm - 8`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concrete {
    /// Mean compressive strength
    pub f_cm: f64,
    /// Mean tensile strength; computed from `f_cm` when omitted
    pub f_ctm: Option<f64>,
    pub compression_stress_strain_type: ConcreteCompression,
    pub tension_stress_strain_type: ConcreteTension,
    /// When false the tension branch is a near-zero sentinel
    pub use_tension: bool,
}

/// Chord-error tolerance for sampling continuous branches, relative to f_cm
const CHORD_TOLERANCE: f64 = 0.01;

impl Concrete {
    pub fn new(f_cm: f64) -> Self {
        Self {
            f_cm,
            f_ctm: None,
            compression_stress_strain_type: ConcreteCompression::Nonlinear,
            tension_stress_strain_type: ConcreteTension::Default,
            use_tension: true,
        }
    }

    pub fn with_tensile_strength(mut self, f_ctm: f64) -> Self {
        self.f_ctm = Some(f_ctm);
        self
    }

    pub fn with_compression_type(mut self, kind: ConcreteCompression) -> Self {
        self.compression_stress_strain_type = kind;
        self
    }

    pub fn with_tension_type(mut self, kind: ConcreteTension) -> Self {
        self.tension_stress_strain_type = kind;
        self
    }

    pub fn without_tension(mut self) -> Self {
        self.use_tension = false;
        self
    }

    /// Characteristic compressive strength
    pub fn f_ck(&self) -> f64 {
        self.f_cm - 8.0
    }

    /// Modulus of elasticity E_cm = 22000 * (f_cm / 10)^0.3
    pub fn modulus(&self) -> f64 {
        22_000.0 * (self.f_cm / 10.0).powf(0.3)
    }

    /// Mean tensile strength, from configuration or the code formula
    pub fn tensile_strength(&self) -> f64 {
        if let Some(f_ctm) = self.f_ctm {
            return f_ctm;
        }
        let f_ck = self.f_ck();
        if f_ck <= 50.0 {
            0.3 * f_ck.powf(2.0 / 3.0)
        } else {
            2.12 * (1.0 + self.f_cm / 10.0).ln()
        }
    }

    /// Strain at peak compressive stress (negative)
    pub fn strain_at_peak(&self) -> f64 {
        -(0.7 * self.f_cm.powf(0.31)).min(2.8) / 1000.0
    }

    /// Ultimate compressive strain (negative)
    ///
    /// The power-law expression applies to high-strength concrete only; below
    /// that the code value of 3.5 per mille governs.
    pub fn ultimate_strain(&self) -> f64 {
        let per_mille = if self.f_cm <= 58.0 {
            3.5
        } else {
            2.8 + 27.0 * ((98.0 - self.f_cm) / 100.0).powi(4)
        };
        -per_mille / 1000.0
    }

    /// Fracture energy G_F = 73 * f_cm^0.18, converted to N/mm
    pub fn fracture_energy(&self) -> f64 {
        0.073 * self.f_cm.powf(0.18)
    }

    /// Build the piecewise-linear material for the given role
    pub fn material(&self, role: SectionRole) -> MnKappaResult<Material> {
        if self.f_cm <= 0.0 {
            return Err(MnKappaError::InvalidMaterial(format!(
                "concrete needs positive f_cm, got {}",
                self.f_cm
            )));
        }
        let mut points = self.compression_points();
        points.push(StressStrain::new(0.0, 0.0));
        points.extend(self.tension_points());
        Material::from_points(MaterialKind::Concrete, role, points, true, false)
    }

    fn compression_points(&self) -> Vec<StressStrain> {
        let f_cm = self.f_cm;
        let tol = CHORD_TOLERANCE * f_cm;
        match self.compression_stress_strain_type {
            ConcreteCompression::Nonlinear => {
                let eps_c1 = -self.strain_at_peak();
                let eps_cu1 = -self.ultimate_strain();
                let e_cm = self.modulus();
                let k = 1.05 * e_cm * eps_c1 / f_cm;
                let sigma = move |eps: f64| {
                    let eta = -eps / eps_c1;
                    -f_cm * (k * eta - eta * eta) / (1.0 + (k - 2.0) * eta)
                };
                // split at the peak so it lands exactly on a breakpoint
                let mut points = sample_branch(&sigma, -eps_cu1, -eps_c1, tol);
                points.pop();
                points.extend(sample_branch(&sigma, -eps_c1, 0.0, tol));
                points.pop();
                points
            }
            ConcreteCompression::Parabola => {
                let f_ck = self.f_ck();
                let (eps_c2, eps_cu2, n) = if f_ck <= 50.0 {
                    (2.0e-3, 3.5e-3, 2.0)
                } else {
                    (
                        (2.0 + 0.085 * (f_ck - 50.0).powf(0.53)) / 1000.0,
                        (2.6 + 35.0 * ((90.0 - f_ck) / 100.0).powi(4)) / 1000.0,
                        1.4 + 23.4 * ((90.0 - f_ck) / 100.0).powi(4),
                    )
                };
                let sigma = move |eps: f64| -f_cm * (1.0 - (1.0 - (-eps) / eps_c2).powf(n));
                let mut points = vec![StressStrain::new(-eps_cu2, -f_cm)];
                points.extend(sample_branch(&sigma, -eps_c2, 0.0, tol));
                points.pop();
                points
            }
            ConcreteCompression::Bilinear => {
                let f_ck = self.f_ck();
                let (eps_c3, eps_cu3) = if f_ck <= 50.0 {
                    (1.75e-3, 3.5e-3)
                } else {
                    (
                        (1.75 + 0.55 * (f_ck - 50.0) / 40.0) / 1000.0,
                        (2.6 + 35.0 * ((90.0 - f_ck) / 100.0).powi(4)) / 1000.0,
                    )
                };
                vec![
                    StressStrain::new(-eps_cu3, -f_cm),
                    StressStrain::new(-eps_c3, -f_cm),
                ]
            }
        }
    }

    fn tension_points(&self) -> Vec<StressStrain> {
        if !self.use_tension {
            return vec![StressStrain::new(1e-10, 0.0)];
        }
        let f_ctm = self.tensile_strength();
        let eps_ct = f_ctm / self.modulus();
        let mut points = vec![StressStrain::new(eps_ct, f_ctm)];
        match self.tension_stress_strain_type {
            ConcreteTension::Default => {
                points.push(StressStrain::new(eps_ct + 1e-6, 0.0));
            }
            ConcreteTension::ConsiderOpeningBehaviour => {
                let g_f = self.fracture_energy();
                let w_1 = g_f / f_ctm;
                let w_c = 5.0 * g_f / f_ctm;
                points.push(StressStrain::new(eps_ct + w_1, 0.2 * f_ctm));
                points.push(StressStrain::new(eps_ct + w_c, 0.0));
            }
        }
        points
    }
}

/// Sample a continuous stress branch into chords with bounded midpoint error
///
/// Returns points over [a, b] inclusive, strains ascending. A chord is split at
/// its midpoint strain until the curve deviates from the chord by no more than
/// `tol` there.
fn sample_branch(sigma: &impl Fn(f64) -> f64, a: f64, b: f64, tol: f64) -> Vec<StressStrain> {
    fn refine(
        points: &mut Vec<StressStrain>,
        sigma: &impl Fn(f64) -> f64,
        a: f64,
        b: f64,
        tol: f64,
        depth: usize,
    ) {
        let mid = 0.5 * (a + b);
        let chord = 0.5 * (sigma(a) + sigma(b));
        if depth > 0 && (sigma(mid) - chord).abs() > tol {
            refine(points, sigma, a, mid, tol, depth - 1);
            points.push(StressStrain::new(mid, sigma(mid)));
            refine(points, sigma, mid, b, tol, depth - 1);
        }
    }
    let mut points = vec![StressStrain::new(a, sigma(a))];
    refine(&mut points, sigma, a, b, tol, 16);
    points.push(StressStrain::new(b, sigma(b)));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn modulus_and_tensile_strength_for_c30() {
        let concrete = Concrete::new(38.0);
        assert_relative_eq!(concrete.modulus(), 32_836.6, epsilon = 0.5);
        assert_relative_eq!(concrete.tensile_strength(), 2.896, epsilon = 1e-3);
        assert_relative_eq!(concrete.ultimate_strain(), -3.5e-3);
    }

    #[test]
    fn nonlinear_curve_peaks_at_f_cm() {
        let mat = Concrete::new(38.0).material(SectionRole::Slab).unwrap();
        let eps_c1 = Concrete::new(38.0).strain_at_peak();
        assert_relative_eq!(mat.stress_at(eps_c1), -38.0, epsilon = 1e-6);
        // curve fails in compression only
        assert!(mat.compression_limit().is_some());
        assert!(mat.tension_limit().is_none());
    }

    #[test]
    fn nonlinear_sampling_tracks_the_closed_form() {
        let concrete = Concrete::new(38.0);
        let mat = concrete.material(SectionRole::Slab).unwrap();
        let eps_c1 = -concrete.strain_at_peak();
        let e_cm = concrete.modulus();
        let k = 1.05 * e_cm * eps_c1 / 38.0;
        let mut eps = -3.4e-3;
        while eps < -1e-5 {
            let eta = -eps / eps_c1;
            let exact = -38.0 * (k * eta - eta * eta) / (1.0 + (k - 2.0) * eta);
            assert!(
                (mat.stress_at(eps) - exact).abs() <= 0.02 * 38.0,
                "chord error too large at {eps}"
            );
            eps += 1e-4;
        }
    }

    #[test]
    fn parabola_rectangle_has_plateau() {
        let mat = Concrete::new(38.0)
            .with_compression_type(ConcreteCompression::Parabola)
            .material(SectionRole::Slab)
            .unwrap();
        assert_relative_eq!(mat.stress_at(-2.0e-3), -38.0, epsilon = 1e-9);
        assert_relative_eq!(mat.stress_at(-3.0e-3), -38.0, epsilon = 1e-9);
        assert_relative_eq!(mat.stress_at(-3.5e-3), -38.0, epsilon = 1e-9);
        assert_relative_eq!(mat.min_strain(), -3.5e-3);
    }

    #[test]
    fn bilinear_rises_linearly_to_plateau() {
        let mat = Concrete::new(38.0)
            .with_compression_type(ConcreteCompression::Bilinear)
            .material(SectionRole::Slab)
            .unwrap();
        assert_relative_eq!(mat.stress_at(-1.75e-3), -38.0, epsilon = 1e-9);
        assert_relative_eq!(mat.stress_at(-0.875e-3), -19.0, epsilon = 1e-9);
    }

    #[test]
    fn tension_drop_and_opening_behaviour() {
        let drop = Concrete::new(38.0).material(SectionRole::Slab).unwrap();
        let eps_ct = 2.896 / 32_836.6;
        assert_relative_eq!(drop.stress_at(eps_ct), 2.896, epsilon = 1e-2);
        assert_eq!(drop.stress_at(1e-3), 0.0);

        let softening = Concrete::new(38.0)
            .with_tension_type(ConcreteTension::ConsiderOpeningBehaviour)
            .material(SectionRole::Slab)
            .unwrap();
        let g_f = Concrete::new(38.0).fracture_energy();
        let f_ctm = Concrete::new(38.0).tensile_strength();
        let w_1 = g_f / f_ctm;
        assert_relative_eq!(
            softening.stress_at(eps_ct + w_1),
            0.2 * f_ctm,
            epsilon = 1e-2
        );
        assert_eq!(softening.stress_at(eps_ct + 5.0 * w_1 + 0.01), 0.0);
    }

    #[test]
    fn disabled_tension_is_a_sentinel() {
        let mat = Concrete::new(38.0)
            .without_tension()
            .material(SectionRole::Slab)
            .unwrap();
        assert_eq!(mat.max_strain(), 1e-10);
        assert_eq!(mat.stress_at(1e-4), 0.0);
    }
}
