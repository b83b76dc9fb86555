//! Boundary analysis of admissible strain states
//!
//! Every failing material limit anchored at a section edge bounds the strain
//! profiles a cross-section can sustain. From those (depth, strain-limit) pairs
//! this module derives the maximum admissible curvatures around an anchor, the
//! neutral-axis range for a fixed curvature, and the failure curvature of the
//! whole cross-section.

use serde::{Deserialize, Serialize};

use crate::section::material::StrainPosition;
use crate::section::section::CrossSection;

/// Curvatures below this magnitude are treated as zero
const KAPPA_EPSILON: f64 = 1e-14;

/// Maximum admissible curvatures around an anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureBounds {
    /// Largest admissible positive curvature, if any limit opposes the anchor
    pub positive: Option<f64>,
    /// Most negative admissible curvature
    pub negative: Option<f64>,
}

impl CrossSection {
    /// Failing strain limits anchored at every section edge
    pub fn strain_limits(&self) -> Vec<StrainPosition> {
        let mut limits = Vec::new();
        for section in self.sections() {
            let kind = section.material.kind();
            for z in [section.top_edge(), section.bottom_edge()] {
                if let Some(strain) = section.material.compression_limit() {
                    limits.push(StrainPosition::new(strain, z, kind));
                }
                if let Some(strain) = section.material.tension_limit() {
                    limits.push(StrainPosition::new(strain, z, kind));
                }
            }
        }
        limits
    }

    /// Maximum admissible curvatures for a profile pinned at the anchor
    ///
    /// Every opposing limit (z_j, eps_j) constrains the pinned rotation: the
    /// profile reaches the limit at kappa_j = (eps_j - eps_0) / (z_j - z_0).
    /// The branch bound is the smallest such upper constraint; a limit the
    /// anchor state violates for every curvature of the branch makes the whole
    /// branch inadmissible. Ties are resolved toward the limit closest to the
    /// anchor.
    pub fn curvature_bounds(&self, anchor: &StrainPosition) -> CurvatureBounds {
        CurvatureBounds {
            positive: self.branch_bound(anchor, true),
            negative: self.branch_bound(anchor, false),
        }
    }

    /// Largest admissible curvature magnitude on one branch, signed
    fn branch_bound(&self, anchor: &StrainPosition, positive: bool) -> Option<f64> {
        // upper constraint on the curvature magnitude, with the distance of
        // the governing limit for tie-breaking
        let mut upper: Option<(f64, f64)> = None;
        let mut lower = 0.0_f64;
        for limit in self.strain_limits() {
            let dz = limit.position - anchor.position;
            let gap = limit.strain - anchor.strain;
            let tension = limit.strain > 0.0;
            if dz.abs() < KAPPA_EPSILON {
                // a limit at the anchor depth must already hold there
                let violated = if tension {
                    anchor.strain > limit.strain
                } else {
                    anchor.strain < limit.strain
                };
                if violated {
                    return None;
                }
                continue;
            }
            // strain at the limit depth: eps_0 + kappa * dz, compared against
            // the limit; expressed in the curvature magnitude by folding the
            // branch sign into dz
            let dz = if positive { dz } else { -dz };
            let ratio = gap / dz;
            let bounds_above = tension == (dz > 0.0);
            if bounds_above {
                if ratio <= KAPPA_EPSILON {
                    // the limit is violated for every curvature of the branch
                    return None;
                }
                let closer = match upper {
                    None => true,
                    Some((kappa, distance)) => {
                        ratio < kappa
                            || (ratio - kappa).abs() <= KAPPA_EPSILON
                                && dz.abs() < distance
                    }
                };
                if closer {
                    upper = Some((ratio, dz.abs()));
                }
            } else if ratio > lower {
                lower = ratio;
            }
        }
        let (magnitude, _) = upper?;
        if magnitude < lower {
            return None;
        }
        Some(if positive { magnitude } else { -magnitude })
    }

    /// Admissible neutral-axis range (lower, upper) for a fixed curvature
    ///
    /// Returns `None` when the limits leave no admissible neutral axis, which
    /// means the curvature itself is beyond the failure curvature.
    pub fn neutral_axis_bounds(&self, curvature: f64) -> Option<(f64, f64)> {
        if curvature.abs() < KAPPA_EPSILON {
            return None;
        }
        let mut lower = f64::NEG_INFINITY;
        let mut upper = f64::INFINITY;
        for limit in self.strain_limits() {
            // strain at the limit's depth: kappa * (z - z_n) compared against
            // the limit strain; the inequality direction flips with the signs
            // of both the curvature and the limit
            let bound = limit.position - limit.strain / curvature;
            let tension_side = limit.strain > 0.0;
            let binds_lower = tension_side == (curvature > 0.0);
            if binds_lower {
                lower = lower.max(bound);
            } else {
                upper = upper.min(bound);
            }
        }
        if lower > upper {
            None
        } else {
            Some((lower, upper))
        }
    }

    /// Failure curvature of the cross-section on one branch
    ///
    /// The largest curvature magnitude for which an admissible strain profile
    /// still exists; at that curvature the returned anchor sits exactly at its
    /// limit. `None` when no opposing limits exist on the branch.
    pub fn failure_curvature(&self, positive: bool) -> Option<(f64, StrainPosition)> {
        let mut best: Option<(f64, StrainPosition)> = None;
        for anchor in self.strain_limits() {
            let bounds = self.curvature_bounds(&anchor);
            let kappa = if positive {
                bounds.positive
            } else {
                bounds.negative
            };
            let Some(kappa) = kappa else { continue };
            let better = match best {
                None => true,
                Some((k, _)) => kappa.abs() > k.abs(),
            };
            if better {
                best = Some((kappa, anchor));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::geometry::Rectangle;
    use crate::section::material::{MaterialKind, SectionRole, Steel};
    use crate::section::section::Section;
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
    fn strain_limits_cover_both_edges() {
        let cs = steel_rectangle();
        let limits = cs.strain_limits();
        // compression and tension limit at each of the two edges
        assert_eq!(limits.len(), 4);
        assert!(limits.iter().any(|l| l.strain == 0.15 && l.position == 200.0));
        assert!(limits.iter().any(|l| l.strain == -0.15 && l.position == 0.0));
    }

    #[test]
    fn curvature_bounds_from_opposite_edge() {
        let cs = steel_rectangle();
        // anchor: compression limit at the top edge
        let anchor = StrainPosition::new(-0.15, 0.0, MaterialKind::Steel);
        let bounds = cs.curvature_bounds(&anchor);
        // the bottom tension limit opposes it across the full depth
        assert_relative_eq!(bounds.positive.unwrap(), (0.15 + 0.15) / 200.0);
        // any negative rotation would push the bottom past its compression
        // limit immediately, so no negative bound exists from this anchor
        assert!(bounds.negative.is_none());
    }

    #[test]
    fn failure_curvature_is_symmetric_for_symmetric_section() {
        let cs = steel_rectangle();
        let (kappa_pos, _) = cs.failure_curvature(true).unwrap();
        let (kappa_neg, _) = cs.failure_curvature(false).unwrap();
        assert_relative_eq!(kappa_pos, -kappa_neg, epsilon = 1e-12);
        assert_relative_eq!(kappa_pos, 0.3 / 200.0, epsilon = 1e-12);
    }

    #[test]
    fn neutral_axis_bounds_bracket_the_midpoint() {
        let cs = steel_rectangle();
        let kappa = 1e-4;
        let (lower, upper) = cs.neutral_axis_bounds(kappa).unwrap();
        assert!(lower < 100.0 && 100.0 < upper);
        // at a curvature past failure no neutral axis is admissible
        let (kappa_fail, _) = cs.failure_curvature(true).unwrap();
        assert!(cs.neutral_axis_bounds(kappa_fail * 1.01).is_none());
        // just below failure a thin admissible band remains
        assert!(cs.neutral_axis_bounds(kappa_fail * 0.99).is_some());
    }

    #[test]
    fn bounds_admit_profiles_within_limits() {
        use crate::section::integration::StrainProfile;
        let cs = steel_rectangle();
        let kappa = 5e-4;
        let (lower, upper) = cs.neutral_axis_bounds(kappa).unwrap();
        for z_n in [lower, 0.5 * (lower + upper), upper] {
            assert!(cs.is_admissible(&StrainProfile::linear(kappa, z_n)));
        }
        assert!(!cs.is_admissible(&StrainProfile::linear(kappa, lower - 1.0)));
        assert!(!cs.is_admissible(&StrainProfile::linear(kappa, upper + 1.0)));
    }
}
