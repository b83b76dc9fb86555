//! Moment-curvature curve generation
//!
//! The curve is traced by anchoring the strain profile at every material
//! breakpoint that the failure profile can reach and solving each anchor for
//! axial equilibrium. Anchors are independent, so the batch is mapped in
//! parallel; failed anchors are reported alongside the curve instead of
//! aborting it.

use log::debug;
use rayon::prelude::*;

use crate::results::{FailedAnchor, MKappaCurvePoints, MKappaPoint};
use crate::section::{CrossSection, StrainPosition, StrainProfile};
use crate::solver::mkappa::MKappaByStrainPosition;
use crate::solver::SolverOptions;

/// Anchors closer than this in strain and depth are duplicates
const ANCHOR_MERGE_TOLERANCE: f64 = 1e-12;

/// Generator for the full moment-curvature curve of a cross-section
#[derive(Debug, Clone)]
pub struct MKappaCurve<'a> {
    cross_section: &'a CrossSection,
    include_positive: bool,
    include_negative: bool,
    applied_axial_force: f64,
    options: SolverOptions,
}

impl<'a> MKappaCurve<'a> {
    pub fn new(cross_section: &'a CrossSection) -> Self {
        Self {
            cross_section,
            include_positive: true,
            include_negative: true,
            applied_axial_force: 0.0,
            options: SolverOptions::default(),
        }
    }

    /// Skip the negative-curvature branch
    pub fn positive_only(mut self) -> Self {
        self.include_negative = false;
        self
    }

    /// Skip the positive-curvature branch
    pub fn negative_only(mut self) -> Self {
        self.include_positive = false;
        self
    }

    /// Trace the curve under a constant applied axial force
    pub fn with_axial_force(mut self, applied_axial_force: f64) -> Self {
        self.applied_axial_force = applied_axial_force;
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Compute the curve, solving all anchors of the enabled branches
    pub fn compute(&self) -> MKappaCurvePoints {
        let mut points = vec![MKappaPoint::origin()];
        let mut failures = Vec::new();
        for positive in [true, false] {
            if positive && !self.include_positive {
                continue;
            }
            if !positive && !self.include_negative {
                continue;
            }
            let (branch_points, branch_failures) = self.compute_branch(positive);
            points.extend(branch_points);
            failures.extend(branch_failures);
        }
        MKappaCurvePoints::new(points, failures)
    }

    fn compute_branch(&self, positive: bool) -> (Vec<MKappaPoint>, Vec<FailedAnchor>) {
        let Some((kappa_fail, fail_anchor)) = self.cross_section.failure_curvature(positive)
        else {
            return (Vec::new(), Vec::new());
        };
        let failure_profile = StrainProfile::through(
            kappa_fail,
            fail_anchor.strain,
            fail_anchor.position,
        );
        let anchors = self.anchors(&failure_profile, fail_anchor);
        debug!(
            "solving {} anchors on the {} branch (failure curvature {:.3e})",
            anchors.len(),
            if positive { "positive" } else { "negative" },
            kappa_fail
        );

        let results: Vec<Result<MKappaPoint, FailedAnchor>> = anchors
            .par_iter()
            .map(|&anchor| {
                MKappaByStrainPosition::new(self.cross_section, anchor, positive)
                    .with_axial_force(self.applied_axial_force)
                    .with_options(self.options)
                    .solve()
                    .map_err(|reason| FailedAnchor {
                        strain_position: anchor,
                        reason,
                    })
            })
            .collect();

        let mut points = Vec::new();
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(point) => points.push(point),
                Err(failure) => failures.push(failure),
            }
        }
        debug!(
            "{} points converged, {} anchors failed",
            points.len(),
            failures.len()
        );
        (points, failures)
    }

    /// Material breakpoints reachable under the failure profile, anchored at
    /// the section edges where they become decisive
    fn anchors(
        &self,
        failure_profile: &StrainProfile,
        fail_anchor: StrainPosition,
    ) -> Vec<StrainPosition> {
        let mut anchors = vec![fail_anchor];
        for section in self.cross_section.sections() {
            let kind = section.material.kind();
            for edge in [section.top_edge(), section.bottom_edge()] {
                let strain_at_failure = failure_profile.strain_at(edge);
                for strain in section
                    .material
                    .strains_between(0.0, strain_at_failure)
                {
                    if strain == 0.0 {
                        continue;
                    }
                    anchors.push(StrainPosition::new(strain, edge, kind));
                }
            }
        }
        anchors.sort_by(|a, b| {
            a.strain
                .total_cmp(&b.strain)
                .then(a.position.total_cmp(&b.position))
        });
        anchors.dedup_by(|a, b| {
            (a.strain - b.strain).abs() <= ANCHOR_MERGE_TOLERANCE
                && (a.position - b.position).abs() <= ANCHOR_MERGE_TOLERANCE
        });
        anchors
    }
}
