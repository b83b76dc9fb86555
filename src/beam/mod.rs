//! Single-span beam discretisation and deflection
//!
//! The span is split into equal elements; every node carries the
//! moment-curvature curve of the cross-section scaled to its effective width.
//! Deflections follow from the principle of virtual forces: the curvature
//! belonging to the external moment is integrated against the moment field of
//! a unit load at the query position, trapezoidally over the node grid.

mod slip;

pub use slip::{CompositeBeam, CompositeBeamNode, SlipSolution, SlipSolverOptions};

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};
use crate::loads::Loading;
use crate::math::trapezoidal;
use crate::results::MKappaCurvePoints;
use crate::section::CrossSection;
use crate::solver::{MKappaCurve, SolverOptions};

/// Effective slab widths at one beam position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectiveWidths {
    /// Width effective for bending action
    pub bending: f64,
    /// Width effective for membrane (axial) action
    pub membrane: f64,
}

/// Effective widths at a position along the span
///
/// Per-side share L_e / 8 capped by the physical half width; the bending width
/// is reduced towards the supports by the end factor 0.55 + 0.025 * L_e / b_e
/// (at most 1), ramped linearly over the outer quarter span. Membrane action
/// spreads flatter, so its width skips the end reduction.
pub fn effective_widths(position: f64, span: f64, physical_width: f64) -> EffectiveWidths {
    let side = (span / 8.0).min(physical_width / 2.0);
    let full = 2.0 * side;
    let beta = (0.55 + 0.025 * span / side).min(1.0);
    let distance = position.min(span - position).max(0.0);
    let ramp = (4.0 * distance / span).min(1.0);
    let bending = full * (beta + (1.0 - beta) * ramp);
    EffectiveWidths {
        bending,
        membrane: full,
    }
}

/// One node of the discretised beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamNode {
    pub position: f64,
    pub widths: EffectiveWidths,
    pub curve: MKappaCurvePoints,
}

/// A converged load step of a stepped analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadStep {
    /// Factor applied to the reference loading
    pub factor: f64,
    /// Total applied force at this step
    pub load: f64,
    pub deflection: f64,
}

/// The first step at which the beam ran out of sectional capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedStep {
    pub factor: f64,
    pub reason: String,
}

/// Load-deflection response of a stepped analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadDeflectionCurve {
    pub steps: Vec<LoadStep>,
    /// Set when stepping stopped early; prior steps remain valid
    pub failed: Option<FailedStep>,
}

/// A single-span beam without joint slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    cross_section: CrossSection,
    length: f64,
    element_number: usize,
    loading: Loading,
    nodes: Vec<BeamNode>,
}

impl Beam {
    /// Discretise the span and compute every node's moment-curvature curve
    pub fn new(
        cross_section: CrossSection,
        length: f64,
        element_number: usize,
        loading: Loading,
    ) -> MnKappaResult<Self> {
        Self::with_options(
            cross_section,
            length,
            element_number,
            loading,
            SolverOptions::default(),
        )
    }

    pub fn with_options(
        cross_section: CrossSection,
        length: f64,
        element_number: usize,
        loading: Loading,
        options: SolverOptions,
    ) -> MnKappaResult<Self> {
        if element_number == 0 {
            return Err(MnKappaError::InvalidLoading(
                "beam needs at least one element".to_string(),
            ));
        }
        if (loading.length() - length).abs() > 1e-9 * length.abs().max(1.0) {
            return Err(MnKappaError::InvalidLoading(format!(
                "loading span {} does not match beam length {length}",
                loading.length()
            )));
        }
        let positions = node_positions(length, element_number);
        let slab_width = cross_section.slab_width();
        info!(
            "discretising beam of length {length} into {} nodes",
            positions.len()
        );
        // nodes sharing an effective width share one curve computation
        let scaled: Vec<(EffectiveWidths, CrossSection)> = positions
            .iter()
            .map(|&x| node_cross_section(&cross_section, x, length, slab_width))
            .collect();
        let unique = unique_factors(scaled.iter().map(|(w, _)| w.bending));
        let curves: Vec<MKappaCurvePoints> = unique
            .par_iter()
            .map(|&index| {
                let curve = MKappaCurve::new(&scaled[index].1)
                    .with_options(options)
                    .compute();
                debug!(
                    "width {:.1}: {} curve points, {} failed anchors",
                    scaled[index].0.bending,
                    curve.points().len(),
                    curve.failures().len()
                );
                curve
            })
            .collect();
        let nodes: Vec<BeamNode> = positions
            .iter()
            .zip(&scaled)
            .map(|(&x, (widths, _))| {
                let slot = unique
                    .iter()
                    .position(|&index| {
                        (scaled[index].0.bending - widths.bending).abs() <= WIDTH_MERGE_TOLERANCE
                    })
                    .unwrap_or(0);
                BeamNode {
                    position: x,
                    widths: *widths,
                    curve: curves[slot].clone(),
                }
            })
            .collect();
        Ok(Self {
            cross_section,
            length,
            element_number,
            loading,
            nodes,
        })
    }

    pub fn cross_section(&self) -> &CrossSection {
        &self.cross_section
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn element_number(&self) -> usize {
        self.element_number
    }

    pub fn loading(&self) -> &Loading {
        &self.loading
    }

    pub fn nodes(&self) -> &[BeamNode] {
        &self.nodes
    }

    /// Bending moment of a unit virtual load at `unit_position`
    pub fn virtual_moment(&self, position: f64, unit_position: f64) -> f64 {
        virtual_moment(self.length, position, unit_position)
    }

    /// Deflection at a position under a loading, by virtual forces
    ///
    /// Every node reads its curvature from its own curve at the external
    /// moment; the first node past its capacity fails the evaluation.
    pub fn deflection_at(&self, position: f64, loading: &Loading) -> MnKappaResult<f64> {
        let mut positions = Vec::with_capacity(self.nodes.len());
        let mut integrand = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let moment = loading.moment(node.position);
            let curvature = node
                .curve
                .curvature_at(moment)
                .ok_or(MnKappaError::MomentBeyondCapacity(moment))?;
            positions.push(node.position);
            integrand.push(curvature * self.virtual_moment(node.position, position));
        }
        Ok(trapezoidal(&positions, &integrand))
    }

    /// Mid-span deflection under the beam's own loading
    pub fn deflection(&self) -> MnKappaResult<f64> {
        self.deflection_at(self.length / 2.0, &self.loading)
    }

    /// Step the reference loading by the given factors
    ///
    /// Stepping stops at the first failing factor; converged steps stay valid.
    pub fn load_deflection(&self, position: f64, factors: &[f64]) -> LoadDeflectionCurve {
        let mut steps = Vec::new();
        for &factor in factors {
            let loading = self.loading.scaled(factor);
            match self.deflection_at(position, &loading) {
                Ok(deflection) => steps.push(LoadStep {
                    factor,
                    load: loading.loading(),
                    deflection,
                }),
                Err(error) => {
                    return LoadDeflectionCurve {
                        steps,
                        failed: Some(FailedStep {
                            factor,
                            reason: error.to_string(),
                        }),
                    }
                }
            }
        }
        LoadDeflectionCurve {
            steps,
            failed: None,
        }
    }
}

/// Widths closer than this share one curve computation
pub(crate) const WIDTH_MERGE_TOLERANCE: f64 = 1e-9;

/// Indices of the first occurrence of every distinct value
pub(crate) fn unique_factors(values: impl Iterator<Item = f64>) -> Vec<usize> {
    let values: Vec<f64> = values.collect();
    let mut unique: Vec<usize> = Vec::new();
    for (i, &value) in values.iter().enumerate() {
        if !unique
            .iter()
            .any(|&u| (values[u] - value).abs() <= WIDTH_MERGE_TOLERANCE)
        {
            unique.push(i);
        }
    }
    unique
}

/// Equally spaced node positions 0 = x_0 < ... < x_n = L
pub(crate) fn node_positions(length: f64, element_number: usize) -> Vec<f64> {
    (0..=element_number)
        .map(|i| length * i as f64 / element_number as f64)
        .collect()
}

/// Moment at `position` from a unit load at `unit_position`
pub(crate) fn virtual_moment(length: f64, position: f64, unit_position: f64) -> f64 {
    if position <= unit_position {
        position * (1.0 - unit_position / length)
    } else {
        unit_position * (1.0 - position / length)
    }
}

/// Effective widths and the correspondingly scaled cross-section at a node
pub(crate) fn node_cross_section(
    cross_section: &CrossSection,
    position: f64,
    length: f64,
    slab_width: Option<f64>,
) -> (EffectiveWidths, CrossSection) {
    match slab_width {
        Some(width) if width > 0.0 => {
            let widths = effective_widths(position, length, width);
            let factor = (widths.bending / width).min(1.0);
            (widths, cross_section.with_scaled_slab(factor))
        }
        _ => (
            EffectiveWidths {
                bending: 0.0,
                membrane: 0.0,
            },
            cross_section.clone(),
        ),
    }
}
