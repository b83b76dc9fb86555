//! Axial-force coupled curve generation for composite cross-sections
//!
//! [`MNCurve`] traces the zero-curvature edge of the composite response: every
//! material breakpoint of one part is applied as a uniform strain, the other
//! part balances the resulting axial force. [`MNKappaCurve`] fills the interior
//! by repeating the moment-curvature procedure on each part under every
//! axial-force level, pairing the parts at common curvatures.

use log::debug;
use rayon::prelude::*;

use crate::error::MnKappaResult;
use crate::results::{FailedAnchor, MNKappaPoint, MNKappaSurface};
use crate::section::{
    CrossSection, MaterialKind, SectionRole, StrainPosition, StrainProfile,
};
use crate::solver::mkappa::{MKappaByConstantCurvature, MKappaByStrainPosition};
use crate::solver::{FailureReason, SolverOptions};

/// Relative tolerance for merging curvatures within one axial-force level
const KAPPA_MERGE_TOLERANCE: f64 = 1e-9;

/// Zero-curvature moment-axial-force curve of a composite cross-section
#[derive(Debug, Clone)]
pub struct MNCurve<'a> {
    cross_section: &'a CrossSection,
    options: SolverOptions,
}

impl<'a> MNCurve<'a> {
    pub fn new(cross_section: &'a CrossSection) -> Self {
        Self {
            cross_section,
            options: SolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Compute the (M, N, 0, strain-difference) points
    pub fn compute(&self) -> MnKappaResult<MNKappaSurface> {
        let slab = self.cross_section.sub_cross_section(SectionRole::Slab)?;
        let girder = self.cross_section.sub_cross_section(SectionRole::Girder)?;
        let joint = self
            .cross_section
            .joint_depth()
            .unwrap_or_else(|| slab.bottom_edge());
        let slab_kind = part_kind(&slab);
        let girder_kind = part_kind(&girder);

        let mut points = Vec::new();
        let mut failures = Vec::new();
        for slab_drives in [true, false] {
            let (driver, follower) = if slab_drives {
                (&slab, &girder)
            } else {
                (&girder, &slab)
            };
            for strain in driving_strains(driver) {
                let profile = StrainProfile::Constant(strain);
                if !driver.is_admissible(&profile) {
                    continue;
                }
                let driver_forces = driver.internal_forces(&profile);
                let result = MKappaByConstantCurvature::new(follower, 0.0)
                    .with_axial_force(-driver_forces.axial_force)
                    .with_options(self.options)
                    .solve();
                match result {
                    Ok((follower_profile, follower_point)) => {
                        let follower_strain = follower_profile.strain_at(joint);
                        let (slab_strain, girder_strain, slab_force) = if slab_drives {
                            (strain, follower_strain, driver_forces.axial_force)
                        } else {
                            (follower_strain, strain, -driver_forces.axial_force)
                        };
                        points.push(MNKappaPoint {
                            moment: driver_forces.moment + follower_point.moment,
                            axial_force: slab_force,
                            curvature: 0.0,
                            strain_difference: slab_strain - girder_strain,
                            strain_position_slab: StrainPosition::new(
                                slab_strain,
                                joint,
                                slab_kind,
                            ),
                            strain_position_girder: StrainPosition::new(
                                girder_strain,
                                joint,
                                girder_kind,
                            ),
                        });
                    }
                    Err(reason) => failures.push(FailedAnchor {
                        strain_position: StrainPosition::new(
                            strain,
                            joint,
                            if slab_drives { slab_kind } else { girder_kind },
                        ),
                        reason,
                    }),
                }
            }
        }
        debug!(
            "M-N curve: {} points, {} failures",
            points.len(),
            failures.len()
        );
        Ok(MNKappaSurface::new(points, failures))
    }
}

/// Full M-N-kappa-strain-difference surface of a composite cross-section
///
/// Positive-curvature branch; the axial-force levels come from the M-N edge.
#[derive(Debug, Clone)]
pub struct MNKappaCurve<'a> {
    cross_section: &'a CrossSection,
    options: SolverOptions,
}

impl<'a> MNKappaCurve<'a> {
    pub fn new(cross_section: &'a CrossSection) -> Self {
        Self {
            cross_section,
            options: SolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn compute(&self) -> MnKappaResult<MNKappaSurface> {
        let slab = self.cross_section.sub_cross_section(SectionRole::Slab)?;
        let girder = self.cross_section.sub_cross_section(SectionRole::Girder)?;
        let joint = self
            .cross_section
            .joint_depth()
            .unwrap_or_else(|| slab.bottom_edge());
        let slab_kind = part_kind(&slab);
        let girder_kind = part_kind(&girder);

        let edge = MNCurve::new(self.cross_section)
            .with_options(self.options)
            .compute()?;
        let mut points = edge.points().to_vec();
        let mut failures = edge.failures().to_vec();
        // the unloaded state anchors the surface at its origin
        points.push(MNKappaPoint {
            moment: 0.0,
            axial_force: 0.0,
            curvature: 0.0,
            strain_difference: 0.0,
            strain_position_slab: StrainPosition::new(0.0, joint, slab_kind),
            strain_position_girder: StrainPosition::new(0.0, joint, girder_kind),
        });

        let mut levels = edge.axial_force_levels();
        levels.push(0.0);
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() <= 1e-6 * b.abs().max(1.0));

        // curvature grid per level: anchor solves on each part alone
        let probes: Vec<(f64, StrainPosition, bool)> = levels
            .iter()
            .flat_map(|&n| {
                part_anchors(&slab)
                    .into_iter()
                    .map(move |a| (n, a, true))
                    .chain(part_anchors(&girder).into_iter().map(move |a| (n, a, false)))
            })
            .collect();
        let kappa_results: Vec<(f64, StrainPosition, Option<f64>)> = probes
            .par_iter()
            .map(|&(n, anchor, on_slab)| {
                let (part, force) = if on_slab { (&slab, n) } else { (&girder, -n) };
                let kappa = MKappaByStrainPosition::new(part, anchor, true)
                    .with_axial_force(force)
                    .with_options(self.options)
                    .solve()
                    .ok()
                    .map(|p| p.curvature);
                (n, anchor, kappa)
            })
            .collect();

        // pair both parts at every probed curvature
        let mut tasks: Vec<(f64, f64, StrainPosition)> = kappa_results
            .into_iter()
            .filter_map(|(n, anchor, kappa)| kappa.map(|k| (n, k, anchor)))
            .collect();
        tasks.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        tasks.dedup_by(|a, b| {
            (a.0 - b.0).abs() <= 1e-6 * b.0.abs().max(1.0)
                && (a.1 - b.1).abs() <= KAPPA_MERGE_TOLERANCE * b.1.abs().max(1e-12)
        });
        debug!(
            "M-N-kappa surface: {} levels, {} paired solves",
            levels.len(),
            tasks.len()
        );

        let solved: Vec<Result<MNKappaPoint, FailedAnchor>> = tasks
            .par_iter()
            .map(|&(n, kappa, anchor)| {
                let pair = self.solve_pair(&slab, &girder, joint, slab_kind, girder_kind, n, kappa);
                pair.map_err(|reason| FailedAnchor {
                    strain_position: anchor,
                    reason,
                })
            })
            .collect();
        for result in solved {
            match result {
                Ok(point) => points.push(point),
                Err(failure) => failures.push(failure),
            }
        }
        Ok(MNKappaSurface::new(points, failures))
    }

    /// Solve both parts at a common curvature under opposite axial forces
    #[allow(clippy::too_many_arguments)]
    fn solve_pair(
        &self,
        slab: &CrossSection,
        girder: &CrossSection,
        joint: f64,
        slab_kind: MaterialKind,
        girder_kind: MaterialKind,
        axial_force: f64,
        kappa: f64,
    ) -> Result<MNKappaPoint, FailureReason> {
        let (slab_profile, slab_point) = MKappaByConstantCurvature::new(slab, kappa)
            .with_axial_force(axial_force)
            .with_options(self.options)
            .solve()?;
        let (girder_profile, girder_point) = MKappaByConstantCurvature::new(girder, kappa)
            .with_axial_force(-axial_force)
            .with_options(self.options)
            .solve()?;
        let slab_strain = slab_profile.strain_at(joint);
        let girder_strain = girder_profile.strain_at(joint);
        Ok(MNKappaPoint {
            moment: slab_point.moment + girder_point.moment,
            axial_force,
            curvature: kappa,
            strain_difference: slab_strain - girder_strain,
            strain_position_slab: StrainPosition::new(slab_strain, joint, slab_kind),
            strain_position_girder: StrainPosition::new(girder_strain, joint, girder_kind),
        })
    }
}

/// Non-zero breakpoint strains of every material in a part
fn driving_strains(part: &CrossSection) -> Vec<f64> {
    let mut strains: Vec<f64> = part
        .sections()
        .iter()
        .flat_map(|s| s.material.breakpoints().collect::<Vec<f64>>())
        .filter(|&s| s != 0.0)
        .collect();
    strains.sort_by(f64::total_cmp);
    strains.dedup_by(|a, b| (*a - *b).abs() <= 1e-12);
    strains
}

/// Breakpoint anchors at the part's section edges
fn part_anchors(part: &CrossSection) -> Vec<StrainPosition> {
    let mut anchors = Vec::new();
    for section in part.sections() {
        let kind = section.material.kind();
        for edge in [section.top_edge(), section.bottom_edge()] {
            for strain in section.material.breakpoints() {
                if strain != 0.0 {
                    anchors.push(StrainPosition::new(strain, edge, kind));
                }
            }
        }
    }
    anchors.sort_by(|a, b| {
        a.strain
            .total_cmp(&b.strain)
            .then(a.position.total_cmp(&b.position))
    });
    anchors.dedup_by(|a, b| {
        (a.strain - b.strain).abs() <= 1e-12 && (a.position - b.position).abs() <= 1e-12
    });
    anchors
}

/// Representative material kind of a part (for tagging joint strains)
fn part_kind(part: &CrossSection) -> MaterialKind {
    part.sections()
        .first()
        .map(|s| s.material.kind())
        .unwrap_or(MaterialKind::Steel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::{Concrete, Rectangle, Section, Steel};

    fn composite() -> CrossSection {
        let concrete = Concrete::new(38.0)
            .material(SectionRole::Slab)
            .unwrap();
        let steel = Steel::new(355.0)
            .with_ultimate_strength(400.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 100.0, 2000.0).unwrap(), concrete),
            Section::new(Rectangle::centred(100.0, 115.0, 200.0).unwrap(), steel.clone()),
            Section::new(Rectangle::centred(115.0, 285.0, 9.5).unwrap(), steel.clone()),
            Section::new(Rectangle::centred(285.0, 300.0, 200.0).unwrap(), steel),
        ])
        .unwrap()
    }

    #[test]
    fn mn_curve_balances_the_parts() {
        let surface = MNCurve::new(&composite()).compute().unwrap();
        assert!(!surface.is_empty());
        for point in surface.points() {
            assert_eq!(point.curvature, 0.0);
            // strain jump is consistent with the converged strains
            let jump = point.strain_position_slab.strain - point.strain_position_girder.strain;
            assert!((jump - point.strain_difference).abs() < 1e-12);
        }
    }

    #[test]
    fn mn_kappa_surface_has_interior_points() {
        let surface = MNKappaCurve::new(&composite()).compute().unwrap();
        assert!(surface.points().iter().any(|p| p.curvature > 0.0));
        // several axial-force levels beyond the zero level
        assert!(surface.axial_force_levels().len() > 2);
        // the surface must be usable for lookups around zero force
        assert!(surface.moment_at(0.0, 0.0).is_some());
    }

    #[test]
    fn surface_points_obey_the_lexicographic_order() {
        let surface = MNKappaCurve::new(&composite()).compute().unwrap();
        for pair in surface.points().windows(2) {
            let ordered = pair[0].curvature < pair[1].curvature
                || ((pair[0].curvature - pair[1].curvature).abs() < 1e-15
                    && pair[0].axial_force <= pair[1].axial_force + 1e-9);
            assert!(ordered);
        }
    }

    #[test]
    fn missing_role_is_an_error() {
        let steel = Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap();
        let bare = CrossSection::new(vec![Section::new(
            Rectangle::centred(0.0, 200.0, 10.0).unwrap(),
            steel,
        )])
        .unwrap();
        assert!(MNCurve::new(&bare).compute().is_err());
    }
}
