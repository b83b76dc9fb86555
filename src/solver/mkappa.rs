//! Equilibrium solvers for single curve points
//!
//! Each solver balances the integrated axial force against an applied one by
//! iterating a single scalar unknown. [`MKappaByStrainPosition`] pins the
//! strain profile at an anchor and iterates the neutral axis (the curvature
//! follows); [`MKappaByConstantCurvature`] fixes the curvature and iterates the
//! neutral axis (or, at zero curvature, the uniform strain);
//! [`MomentAxialForce`] balances opposite axial forces on the two parts of a
//! composite cross-section at zero curvature.

use crate::results::MKappaPoint;
use crate::section::{CrossSection, StrainPosition, StrainProfile};
use crate::solver::newton::RootFinder;
use crate::solver::{FailureReason, SolveState, SolverOptions};

/// Ratio between the boundary curvature and the smallest curvature probed
const CURVATURE_RANGE: f64 = 1e-4;
/// Fallback strain bounds when no failing limit exists on a side
const STRAIN_CAP: f64 = 0.1;
/// Neutral-axis excursion allowed beyond the section extent, in heights
const NEUTRAL_AXIS_EXTENT: f64 = 50.0;

/// Find the neutral axis balancing the axial force for a pinned anchor strain
#[derive(Debug, Clone)]
pub struct MKappaByStrainPosition<'a> {
    cross_section: &'a CrossSection,
    strain_position: StrainPosition,
    positive_curvature: bool,
    applied_axial_force: f64,
    options: SolverOptions,
    state: SolveState,
}

impl<'a> MKappaByStrainPosition<'a> {
    pub fn new(
        cross_section: &'a CrossSection,
        strain_position: StrainPosition,
        positive_curvature: bool,
    ) -> Self {
        Self {
            cross_section,
            strain_position,
            positive_curvature,
            applied_axial_force: 0.0,
            options: SolverOptions::default(),
            state: SolveState::NotStarted,
        }
    }

    pub fn with_axial_force(mut self, applied_axial_force: f64) -> Self {
        self.applied_axial_force = applied_axial_force;
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Run the iteration and produce a curve point
    pub fn solve(&mut self) -> Result<MKappaPoint, FailureReason> {
        self.state = SolveState::Iterating;
        let result = self.run();
        self.state = match &result {
            Ok(_) => SolveState::Converged,
            Err(reason) => SolveState::Failed(*reason),
        };
        result
    }

    fn run(&self) -> Result<MKappaPoint, FailureReason> {
        let anchor = self.strain_position;
        if anchor.strain == 0.0 {
            // a zero anchor strain pins the neutral axis instead of the
            // curvature; the curve origin covers this state
            return Err(FailureReason::StrainOutOfRange);
        }
        let bounds = self.cross_section.curvature_bounds(&anchor);
        let kappa_limit = if self.positive_curvature {
            bounds.positive
        } else {
            bounds.negative
        }
        .ok_or(FailureReason::StrainOutOfRange)?;

        // the neutral axis maps one-to-one onto the curvature:
        // kappa = strain / (position - z_n)
        let z_of = |kappa: f64| anchor.position - anchor.strain / kappa;
        let near = z_of(kappa_limit);
        let far = z_of(kappa_limit * CURVATURE_RANGE);
        let seed = z_of(kappa_limit * 0.5);

        let finder = RootFinder::new(
            self.options.max_iterations,
            self.options.axial_tolerance,
            near.min(far),
            near.max(far),
        );
        let cross_section = self.cross_section;
        let applied = self.applied_axial_force;
        let solution = finder.solve(
            |z_n| {
                let kappa = anchor.strain / (anchor.position - z_n);
                let profile = StrainProfile::linear(kappa, z_n);
                cross_section.internal_forces(&profile).axial_force - applied
            },
            seed,
        )?;

        let z_n = solution.root;
        let kappa = anchor.strain / (anchor.position - z_n);
        let forces = self
            .cross_section
            .internal_forces(&StrainProfile::linear(kappa, z_n));
        Ok(MKappaPoint {
            moment: forces.moment,
            curvature: kappa,
            axial_force: forces.axial_force,
            neutral_axis: Some(z_n),
            strain_position: Some(anchor),
        })
    }
}

/// Find the strain plane balancing the axial force at a fixed curvature
#[derive(Debug, Clone)]
pub struct MKappaByConstantCurvature<'a> {
    cross_section: &'a CrossSection,
    curvature: f64,
    applied_axial_force: f64,
    options: SolverOptions,
    state: SolveState,
}

impl<'a> MKappaByConstantCurvature<'a> {
    pub fn new(cross_section: &'a CrossSection, curvature: f64) -> Self {
        Self {
            cross_section,
            curvature,
            applied_axial_force: 0.0,
            options: SolverOptions::default(),
            state: SolveState::NotStarted,
        }
    }

    pub fn with_axial_force(mut self, applied_axial_force: f64) -> Self {
        self.applied_axial_force = applied_axial_force;
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    /// Run the iteration and return the converged strain profile
    pub fn solve(&mut self) -> Result<(StrainProfile, MKappaPoint), FailureReason> {
        self.state = SolveState::Iterating;
        let result = if self.curvature == 0.0 {
            self.run_constant_strain()
        } else {
            self.run_neutral_axis()
        };
        self.state = match &result {
            Ok(_) => SolveState::Converged,
            Err(reason) => SolveState::Failed(*reason),
        };
        result
    }

    fn run_constant_strain(&self) -> Result<(StrainProfile, MKappaPoint), FailureReason> {
        let lower = self
            .cross_section
            .sections()
            .iter()
            .filter_map(|s| s.material.compression_limit())
            .fold(f64::NEG_INFINITY, f64::max);
        let lower = if lower.is_finite() { lower } else { -STRAIN_CAP };
        let upper = self
            .cross_section
            .sections()
            .iter()
            .filter_map(|s| s.material.tension_limit())
            .fold(f64::INFINITY, f64::min);
        let upper = if upper.is_finite() { upper } else { STRAIN_CAP };

        let finder = RootFinder::new(
            self.options.max_iterations,
            self.options.axial_tolerance,
            lower,
            upper,
        );
        let cross_section = self.cross_section;
        let applied = self.applied_axial_force;
        let solution = finder.solve(
            |strain| {
                cross_section
                    .internal_forces(&StrainProfile::Constant(strain))
                    .axial_force
                    - applied
            },
            0.0,
        )?;
        let profile = StrainProfile::Constant(solution.root);
        Ok((profile, self.point(&profile)))
    }

    fn run_neutral_axis(&self) -> Result<(StrainProfile, MKappaPoint), FailureReason> {
        let (lower, upper) = self
            .cross_section
            .neutral_axis_bounds(self.curvature)
            .ok_or(FailureReason::StrainOutOfRange)?;
        // unbounded sides (no failing limit) are capped at a generous multiple
        // of the section extent
        let extent = NEUTRAL_AXIS_EXTENT * self.cross_section.height().max(1.0);
        let lower = lower.max(self.cross_section.top_edge() - extent);
        let upper = upper.min(self.cross_section.bottom_edge() + extent);
        if lower > upper {
            return Err(FailureReason::StrainOutOfRange);
        }

        let finder = RootFinder::new(
            self.options.max_iterations,
            self.options.axial_tolerance,
            lower,
            upper,
        );
        let cross_section = self.cross_section;
        let curvature = self.curvature;
        let applied = self.applied_axial_force;
        let solution = finder.solve(
            |z_n| {
                cross_section
                    .internal_forces(&StrainProfile::linear(curvature, z_n))
                    .axial_force
                    - applied
            },
            0.5 * (lower + upper),
        )?;
        let profile = StrainProfile::linear(self.curvature, solution.root);
        Ok((profile, self.point(&profile)))
    }

    fn point(&self, profile: &StrainProfile) -> MKappaPoint {
        let forces = self.cross_section.internal_forces(profile);
        MKappaPoint {
            moment: forces.moment,
            curvature: profile.curvature(),
            axial_force: forces.axial_force,
            neutral_axis: profile.neutral_axis(),
            strain_position: None,
        }
    }
}

/// Converged zero-curvature equilibrium of two coupled cross-section parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxialForceEquilibrium {
    /// Sum of both part moments
    pub moment: f64,
    /// Axial force carried by part A (part B carries the opposite)
    pub axial_force: f64,
    /// Uniform strain in part A
    pub strain_a: f64,
    /// Uniform strain in part B
    pub strain_b: f64,
    /// strain_a - strain_b
    pub strain_difference: f64,
}

/// Balance an axial force pair on two sub-cross-sections at zero curvature
#[derive(Debug, Clone)]
pub struct MomentAxialForce<'a> {
    sub_a: &'a CrossSection,
    sub_b: &'a CrossSection,
    axial_force: f64,
    options: SolverOptions,
    state: SolveState,
}

impl<'a> MomentAxialForce<'a> {
    pub fn new(sub_a: &'a CrossSection, sub_b: &'a CrossSection, axial_force: f64) -> Self {
        Self {
            sub_a,
            sub_b,
            axial_force,
            options: SolverOptions::default(),
            state: SolveState::NotStarted,
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> SolveState {
        self.state
    }

    pub fn solve(&mut self) -> Result<AxialForceEquilibrium, FailureReason> {
        self.state = SolveState::Iterating;
        let result = self.run();
        self.state = match &result {
            Ok(_) => SolveState::Converged,
            Err(reason) => SolveState::Failed(*reason),
        };
        result
    }

    fn run(&self) -> Result<AxialForceEquilibrium, FailureReason> {
        let (profile_a, point_a) = MKappaByConstantCurvature::new(self.sub_a, 0.0)
            .with_axial_force(self.axial_force)
            .with_options(self.options)
            .solve()?;
        let (profile_b, point_b) = MKappaByConstantCurvature::new(self.sub_b, 0.0)
            .with_axial_force(-self.axial_force)
            .with_options(self.options)
            .solve()?;
        let strain_a = profile_a.strain_at(0.0);
        let strain_b = profile_b.strain_at(0.0);
        Ok(AxialForceEquilibrium {
            moment: point_a.moment + point_b.moment,
            axial_force: point_a.axial_force,
            strain_a,
            strain_b,
            strain_difference: strain_a - strain_b,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{MaterialKind, Rectangle, Section, SectionRole, Steel};
    use approx::assert_relative_eq;

    fn steel_rectangle() -> CrossSection {
        let material = Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        CrossSection::new(vec![Section::new(
            Rectangle::centred(0.0, 200.0, 10.0).unwrap(),
            material,
        )])
        .unwrap()
    }

    #[test]
    fn symmetric_section_balances_at_mid_depth() {
        let cs = steel_rectangle();
        let anchor = StrainPosition::new(0.01, 200.0, MaterialKind::Steel);
        let point = MKappaByStrainPosition::new(&cs, anchor, true)
            .solve()
            .unwrap();
        assert!(point.axial_force.abs() <= 10.0);
        assert_relative_eq!(point.neutral_axis.unwrap(), 100.0, epsilon = 0.5);
        assert_relative_eq!(point.curvature, 0.01 / 100.0, max_relative = 0.01);
        assert!(point.moment > 0.0);
    }

    #[test]
    fn compression_anchor_gives_the_mirror_point() {
        let cs = steel_rectangle();
        let tension = StrainPosition::new(0.01, 200.0, MaterialKind::Steel);
        let compression = StrainPosition::new(-0.01, 0.0, MaterialKind::Steel);
        let p1 = MKappaByStrainPosition::new(&cs, tension, true)
            .solve()
            .unwrap();
        let p2 = MKappaByStrainPosition::new(&cs, compression, true)
            .solve()
            .unwrap();
        assert_relative_eq!(p1.moment, p2.moment, max_relative = 1e-3);
        assert_relative_eq!(p1.curvature, p2.curvature, max_relative = 1e-3);
    }

    #[test]
    fn negative_branch_mirrors_positive() {
        let cs = steel_rectangle();
        let up = MKappaByStrainPosition::new(
            &cs,
            StrainPosition::new(0.01, 200.0, MaterialKind::Steel),
            true,
        )
        .solve()
        .unwrap();
        let down = MKappaByStrainPosition::new(
            &cs,
            StrainPosition::new(-0.01, 200.0, MaterialKind::Steel),
            false,
        )
        .solve()
        .unwrap();
        assert_relative_eq!(up.moment, -down.moment, max_relative = 1e-3);
        assert_relative_eq!(up.curvature, -down.curvature, max_relative = 1e-3);
    }

    #[test]
    fn zero_anchor_strain_is_rejected() {
        let cs = steel_rectangle();
        let result = MKappaByStrainPosition::new(
            &cs,
            StrainPosition::new(0.0, 100.0, MaterialKind::Steel),
            true,
        )
        .solve();
        assert_eq!(result.unwrap_err(), FailureReason::StrainOutOfRange);
    }

    #[test]
    fn solver_state_machine_transitions() {
        let cs = steel_rectangle();
        let mut solver = MKappaByStrainPosition::new(
            &cs,
            StrainPosition::new(0.01, 200.0, MaterialKind::Steel),
            true,
        );
        assert_eq!(solver.state(), SolveState::NotStarted);
        solver.solve().unwrap();
        assert_eq!(solver.state(), SolveState::Converged);
    }

    #[test]
    fn constant_curvature_finds_the_same_axis() {
        let cs = steel_rectangle();
        let (profile, point) = MKappaByConstantCurvature::new(&cs, 5e-5).solve().unwrap();
        assert_relative_eq!(profile.neutral_axis().unwrap(), 100.0, epsilon = 0.5);
        assert!(point.axial_force.abs() <= 10.0);
    }

    #[test]
    fn constant_strain_carries_applied_force() {
        let cs = steel_rectangle();
        // elastic: N = E * A * eps
        let target = 100_000.0;
        let (profile, point) = MKappaByConstantCurvature::new(&cs, 0.0)
            .with_axial_force(target)
            .solve()
            .unwrap();
        assert!((point.axial_force - target).abs() <= 10.0);
        let expected_strain = target / (210_000.0 * 2000.0);
        assert_relative_eq!(profile.strain_at(0.0), expected_strain, max_relative = 1e-3);
    }

    #[test]
    fn axial_force_pair_balances_two_parts() {
        let upper = steel_rectangle();
        let material = Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        let lower = CrossSection::new(vec![Section::new(
            Rectangle::centred(200.0, 400.0, 10.0).unwrap(),
            material,
        )])
        .unwrap();
        let mut solver = MomentAxialForce::new(&upper, &lower, 50_000.0);
        let result = solver.solve().unwrap();
        assert!((result.axial_force - 50_000.0).abs() <= 10.0);
        // part A stretches, part B shortens by the same strain
        assert_relative_eq!(result.strain_a, -result.strain_b, max_relative = 1e-3);
        assert!(result.strain_difference > 0.0);
    }

    #[test]
    fn curvature_beyond_failure_is_rejected() {
        let cs = steel_rectangle();
        let (kappa_fail, _) = cs.failure_curvature(true).unwrap();
        let result = MKappaByConstantCurvature::new(&cs, kappa_fail * 1.5).solve();
        assert_eq!(result.unwrap_err(), FailureReason::StrainOutOfRange);
    }
}
