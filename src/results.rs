//! Curve point records produced by solver runs
//!
//! Points are immutable once produced. Curves keep their points sorted by
//! curvature (lexicographically by curvature and axial force for the
//! four-dimensional surface) and carry failed anchors alongside the successes.

use serde::{Deserialize, Serialize};

use crate::math::interpolate;
use crate::section::StrainPosition;
use crate::solver::FailureReason;

/// A single point of a moment-curvature curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MKappaPoint {
    pub moment: f64,
    pub curvature: f64,
    /// Residual axial force of the converged run (close to the applied one)
    pub axial_force: f64,
    /// Neutral axis of the converged profile; `None` at the curve origin
    pub neutral_axis: Option<f64>,
    /// Anchor the solver was launched from; `None` at the curve origin
    pub strain_position: Option<StrainPosition>,
}

impl MKappaPoint {
    /// The trivial point at the origin of the curve
    pub fn origin() -> Self {
        Self {
            moment: 0.0,
            curvature: 0.0,
            axial_force: 0.0,
            neutral_axis: None,
            strain_position: None,
        }
    }
}

/// An anchor whose solver run did not converge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FailedAnchor {
    pub strain_position: StrainPosition,
    pub reason: FailureReason,
}

/// Points whose curvature-moment pairs differ by less than this coincide
const POINT_MERGE_TOLERANCE: f64 = 1e-9;

/// A full moment-curvature curve, both branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MKappaCurvePoints {
    points: Vec<MKappaPoint>,
    failures: Vec<FailedAnchor>,
}

impl MKappaCurvePoints {
    /// Sort by curvature and drop coincident points
    pub fn new(mut points: Vec<MKappaPoint>, failures: Vec<FailedAnchor>) -> Self {
        points.sort_by(|a, b| a.curvature.total_cmp(&b.curvature));
        points.dedup_by(|a, b| {
            (a.curvature - b.curvature).abs() <= POINT_MERGE_TOLERANCE
                && (a.moment - b.moment).abs() <= POINT_MERGE_TOLERANCE * b.moment.abs().max(1.0)
        });
        Self { points, failures }
    }

    pub fn points(&self) -> &[MKappaPoint] {
        &self.points
    }

    pub fn failures(&self) -> &[FailedAnchor] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with non-negative curvature, ascending
    pub fn positive_branch(&self) -> impl Iterator<Item = &MKappaPoint> {
        self.points.iter().filter(|p| p.curvature >= 0.0)
    }

    /// Points with non-positive curvature, ascending
    pub fn negative_branch(&self) -> impl Iterator<Item = &MKappaPoint> {
        self.points.iter().filter(|p| p.curvature <= 0.0)
    }

    /// Largest sagging moment of the curve
    pub fn maximum_moment(&self) -> f64 {
        self.points.iter().map(|p| p.moment).fold(0.0, f64::max)
    }

    /// Most negative (hogging) moment of the curve
    pub fn minimum_moment(&self) -> f64 {
        self.points.iter().map(|p| p.moment).fold(0.0, f64::min)
    }

    /// Largest curvature on the positive branch
    pub fn maximum_curvature(&self) -> f64 {
        self.points.iter().map(|p| p.curvature).fold(0.0, f64::max)
    }

    /// Curvature belonging to a moment, interpolated on the matching branch
    ///
    /// Walks the branch from the origin outward and interpolates within the
    /// first segment crossing the requested moment. `None` when the moment
    /// exceeds the sectional capacity.
    pub fn curvature_at(&self, moment: f64) -> Option<f64> {
        if moment == 0.0 {
            return Some(0.0);
        }
        let branch: Vec<&MKappaPoint> = if moment > 0.0 {
            self.positive_branch().collect()
        } else {
            let mut b: Vec<&MKappaPoint> = self.negative_branch().collect();
            // walk outward from the origin
            b.reverse();
            b
        };
        for pair in branch.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let lo = a.moment.min(b.moment);
            let hi = a.moment.max(b.moment);
            if moment >= lo && moment <= hi {
                if (b.moment - a.moment).abs() < f64::EPSILON {
                    return Some(a.curvature);
                }
                return Some(interpolate(
                    moment,
                    (a.moment, a.curvature),
                    (b.moment, b.curvature),
                ));
            }
        }
        None
    }
}

/// A single point of the four-dimensional composite response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MNKappaPoint {
    pub moment: f64,
    /// Axial force applied to the slab part (the girder part carries the
    /// opposite force)
    pub axial_force: f64,
    pub curvature: f64,
    /// Strain jump across the joint, slab minus girder
    pub strain_difference: f64,
    /// Converged strain of the slab part at the joint depth
    pub strain_position_slab: StrainPosition,
    /// Converged strain of the girder part at the joint depth
    pub strain_position_girder: StrainPosition,
}

/// The M-N-kappa-strain-difference surface of one composite cross-section
///
/// Points are grouped into axial-force levels; lookups interpolate bilinearly
/// in (N, strain difference), clamped to the hull of computed points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MNKappaSurface {
    points: Vec<MNKappaPoint>,
    failures: Vec<FailedAnchor>,
}

impl MNKappaSurface {
    pub fn new(mut points: Vec<MNKappaPoint>, failures: Vec<FailedAnchor>) -> Self {
        points.sort_by(|a, b| {
            a.curvature
                .total_cmp(&b.curvature)
                .then(a.axial_force.total_cmp(&b.axial_force))
        });
        points.dedup_by(|a, b| {
            (a.curvature - b.curvature).abs() <= POINT_MERGE_TOLERANCE
                && (a.axial_force - b.axial_force).abs() <= POINT_MERGE_TOLERANCE
                && (a.strain_difference - b.strain_difference).abs() <= POINT_MERGE_TOLERANCE
        });
        Self { points, failures }
    }

    /// Points sorted lexicographically by (curvature, axial force)
    pub fn points(&self) -> &[MNKappaPoint] {
        &self.points
    }

    pub fn failures(&self) -> &[FailedAnchor] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct axial-force levels, ascending
    pub fn axial_force_levels(&self) -> Vec<f64> {
        let mut levels: Vec<f64> = self.points.iter().map(|p| p.axial_force).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() <= 1e-6 * b.abs().max(1.0));
        levels
    }

    /// Resisting moment and curvature at an axial force and strain difference
    ///
    /// Bilinear interpolation: within the two neighbouring axial-force levels
    /// the moment is interpolated over the strain difference, then linearly
    /// between the levels. Arguments are clamped to the computed hull, so the
    /// lookup never extrapolates.
    pub fn moment_at(&self, axial_force: f64, strain_difference: f64) -> Option<(f64, f64)> {
        let levels = self.axial_force_levels();
        if levels.is_empty() {
            return None;
        }
        let n = axial_force.clamp(levels[0], levels[levels.len() - 1]);
        let upper_index = levels
            .iter()
            .position(|&l| l >= n)
            .unwrap_or(levels.len() - 1);
        let lower_index = upper_index.saturating_sub(1);
        let (n1, n2) = (levels[lower_index], levels[upper_index]);

        let at1 = self.level_lookup(n1, strain_difference)?;
        let at2 = self.level_lookup(n2, strain_difference)?;
        if (n2 - n1).abs() < f64::EPSILON {
            return Some(at1);
        }
        let t = (n - n1) / (n2 - n1);
        Some((at1.0 + t * (at2.0 - at1.0), at1.1 + t * (at2.1 - at1.1)))
    }

    /// Interpolate moment and curvature over the strain difference within one
    /// axial-force level
    fn level_lookup(&self, level: f64, strain_difference: f64) -> Option<(f64, f64)> {
        let mut points: Vec<&MNKappaPoint> = self
            .points
            .iter()
            .filter(|p| (p.axial_force - level).abs() <= 1e-6 * level.abs().max(1.0))
            .collect();
        points.sort_by(|a, b| a.strain_difference.total_cmp(&b.strain_difference));
        match points.len() {
            0 => None,
            1 => Some((points[0].moment, points[0].curvature)),
            _ => {
                let first = points.first().unwrap();
                let last = points.last().unwrap();
                let eps =
                    strain_difference.clamp(first.strain_difference, last.strain_difference);
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    if eps >= a.strain_difference && eps <= b.strain_difference {
                        if (b.strain_difference - a.strain_difference).abs() < f64::EPSILON {
                            return Some((a.moment, a.curvature));
                        }
                        let moment = interpolate(
                            eps,
                            (a.strain_difference, a.moment),
                            (b.strain_difference, b.moment),
                        );
                        let curvature = interpolate(
                            eps,
                            (a.strain_difference, a.curvature),
                            (b.strain_difference, b.curvature),
                        );
                        return Some((moment, curvature));
                    }
                }
                Some((last.moment, last.curvature))
            }
        }
    }

    /// Largest sagging moment over all points
    pub fn maximum_moment(&self) -> f64 {
        self.points.iter().map(|p| p.moment).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::MaterialKind;
    use approx::assert_relative_eq;

    fn point(curvature: f64, moment: f64) -> MKappaPoint {
        MKappaPoint {
            moment,
            curvature,
            axial_force: 0.0,
            neutral_axis: Some(0.0),
            strain_position: Some(StrainPosition::new(0.001, 0.0, MaterialKind::Steel)),
        }
    }

    #[test]
    fn points_sorted_and_deduplicated() {
        let curve = MKappaCurvePoints::new(
            vec![
                point(2e-5, 200.0),
                MKappaPoint::origin(),
                point(1e-5, 100.0),
                point(1e-5, 100.0),
            ],
            vec![],
        );
        assert_eq!(curve.points().len(), 3);
        let kappas: Vec<f64> = curve.points().iter().map(|p| p.curvature).collect();
        assert_eq!(kappas, vec![0.0, 1e-5, 2e-5]);
    }

    #[test]
    fn curvature_interpolation_on_positive_branch() {
        let curve = MKappaCurvePoints::new(
            vec![MKappaPoint::origin(), point(1e-5, 100.0), point(3e-5, 150.0)],
            vec![],
        );
        assert_relative_eq!(curve.curvature_at(50.0).unwrap(), 0.5e-5);
        assert_relative_eq!(curve.curvature_at(125.0).unwrap(), 2e-5);
        assert_eq!(curve.curvature_at(200.0), None);
        assert_eq!(curve.curvature_at(0.0), Some(0.0));
    }

    #[test]
    fn negative_branch_walks_outward() {
        let curve = MKappaCurvePoints::new(
            vec![
                point(-3e-5, -150.0),
                point(-1e-5, -100.0),
                MKappaPoint::origin(),
                point(1e-5, 100.0),
            ],
            vec![],
        );
        assert_relative_eq!(curve.curvature_at(-50.0).unwrap(), -0.5e-5);
        assert_relative_eq!(curve.curvature_at(-125.0).unwrap(), -2e-5);
        assert_eq!(curve.curvature_at(-200.0), None);
    }

    #[test]
    fn surface_bilinear_lookup() {
        let sp = StrainPosition::new(0.0, 0.0, MaterialKind::Concrete);
        let mk = |m: f64, n: f64, k: f64, e: f64| MNKappaPoint {
            moment: m,
            axial_force: n,
            curvature: k,
            strain_difference: e,
            strain_position_slab: sp,
            strain_position_girder: sp,
        };
        let surface = MNKappaSurface::new(
            vec![
                mk(100.0, 0.0, 1e-5, 0.0),
                mk(200.0, 0.0, 2e-5, 0.002),
                mk(150.0, 1000.0, 1e-5, 0.0),
                mk(250.0, 1000.0, 2e-5, 0.002),
            ],
            vec![],
        );
        // mid in both axes
        let (m, k) = surface.moment_at(500.0, 0.001).unwrap();
        assert_relative_eq!(m, 175.0);
        assert_relative_eq!(k, 1.5e-5);
        // clamped outside the hull
        let (m_edge, _) = surface.moment_at(-500.0, 0.01).unwrap();
        assert_relative_eq!(m_edge, 200.0);
    }

    #[test]
    fn surface_points_are_lexicographic() {
        let sp = StrainPosition::new(0.0, 0.0, MaterialKind::Concrete);
        let mk = |n: f64, k: f64| MNKappaPoint {
            moment: 0.0,
            axial_force: n,
            curvature: k,
            strain_difference: 0.0,
            strain_position_slab: sp,
            strain_position_girder: sp,
        };
        let surface =
            MNKappaSurface::new(vec![mk(1.0, 2e-5), mk(0.0, 2e-5), mk(1.0, 1e-5)], vec![]);
        let order: Vec<(f64, f64)> = surface
            .points()
            .iter()
            .map(|p| (p.curvature, p.axial_force))
            .collect();
        assert_eq!(order, vec![(1e-5, 1.0), (2e-5, 0.0), (2e-5, 1.0)]);
    }
}
