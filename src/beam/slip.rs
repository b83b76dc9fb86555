//! Composite beam with joint slip
//!
//! The nodal slip values are the unknowns. From a slip distribution follow the
//! strain differences, the connector shear transmitted into the slab, and via
//! the per-node M-N-kappa-strain-difference surfaces the resisting moments.
//! A damped Gauss-Newton (Levenberg-Marquardt) iteration drives the gap
//! between resisting and external moments to zero at every node.

use log::{debug, info};
use nalgebra::DVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::beam::{
    node_cross_section, node_positions, unique_factors, virtual_moment, EffectiveWidths,
    FailedStep, LoadDeflectionCurve, LoadStep, WIDTH_MERGE_TOLERANCE,
};
use crate::error::{MnKappaError, MnKappaResult};
use crate::loads::{Loading, ShearConnector};
use crate::math::{
    damped_least_squares_step, forward_difference_jacobian, interpolate, trapezoidal,
};
use crate::results::MNKappaSurface;
use crate::section::CrossSection;
use crate::solver::{MNKappaCurve, SolverOptions};

/// Relative share of the peak external moment accepted as residual
const RELATIVE_MOMENT_TOLERANCE: f64 = 1e-5;
/// Nodes this close to the slip-zero crossing get a zero strain difference
const CROSSING_DISTANCE: f64 = 1e-9;
/// Line-search halvings per damping level
const LINE_SEARCH_STEPS: usize = 8;
/// Damping growth cap before the step is declared failed
const MAXIMUM_DAMPING: f64 = 1e10;

/// Options of the Levenberg-Marquardt slip iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipSolverOptions {
    pub max_iterations: usize,
    /// Absolute floor of the moment-residual tolerance
    pub moment_tolerance: f64,
    /// Convergence threshold on the slip update
    pub slip_tolerance: f64,
    /// Initial Levenberg damping
    pub initial_damping: f64,
}

impl Default for SlipSolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            moment_tolerance: 10.0,
            slip_tolerance: 1e-6,
            initial_damping: 1e-3,
        }
    }
}

/// One node of the composite beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBeamNode {
    pub position: f64,
    pub widths: EffectiveWidths,
    pub surface: MNKappaSurface,
}

/// Converged slip state of the beam under one loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlipSolution {
    /// Nodal slip values
    pub slip: Vec<f64>,
    /// Nodal curvatures read from the surfaces
    pub curvatures: Vec<f64>,
    /// Slab axial force at every node
    pub axial_forces: Vec<f64>,
    /// Final infinity norm of the moment residual
    pub residual_norm: f64,
    pub iterations: usize,
}

/// A single-span composite beam whose joint transmits shear through connectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBeam {
    cross_section: CrossSection,
    length: f64,
    element_number: usize,
    loading: Loading,
    connectors: Vec<ShearConnector>,
    nodes: Vec<CompositeBeamNode>,
    slip_options: SlipSolverOptions,
}

impl CompositeBeam {
    /// Discretise the span and compute every node's composite surface
    pub fn new(
        cross_section: CrossSection,
        length: f64,
        element_number: usize,
        loading: Loading,
        connectors: Vec<ShearConnector>,
    ) -> MnKappaResult<Self> {
        Self::with_options(
            cross_section,
            length,
            element_number,
            loading,
            connectors,
            SolverOptions::default(),
            SlipSolverOptions::default(),
        )
    }

    pub fn with_options(
        cross_section: CrossSection,
        length: f64,
        element_number: usize,
        loading: Loading,
        connectors: Vec<ShearConnector>,
        solver_options: SolverOptions,
        slip_options: SlipSolverOptions,
    ) -> MnKappaResult<Self> {
        if !cross_section.is_composite() {
            return Err(MnKappaError::MissingRole("Slab or Girder".to_string()));
        }
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
            "composite beam: {} nodes, {} connectors",
            positions.len(),
            connectors.len()
        );
        // membrane action governs the composite surface; nodes sharing a
        // membrane width share one surface computation
        let widths_and_factors: Vec<(EffectiveWidths, f64)> = positions
            .iter()
            .map(|&x| {
                let (widths, _) = node_cross_section(&cross_section, x, length, slab_width);
                let factor = match slab_width {
                    Some(width) if width > 0.0 => (widths.membrane / width).min(1.0),
                    _ => 1.0,
                };
                (widths, factor)
            })
            .collect();
        let unique = unique_factors(widths_and_factors.iter().map(|(_, f)| *f));
        let surfaces: MnKappaResult<Vec<MNKappaSurface>> = unique
            .par_iter()
            .map(|&index| {
                let scaled = cross_section.with_scaled_slab(widths_and_factors[index].1);
                let surface = MNKappaCurve::new(&scaled)
                    .with_options(solver_options)
                    .compute()?;
                debug!(
                    "membrane factor {:.3}: {} surface points, {} failures",
                    widths_and_factors[index].1,
                    surface.points().len(),
                    surface.failures().len()
                );
                Ok(surface)
            })
            .collect();
        let surfaces = surfaces?;
        let nodes: Vec<CompositeBeamNode> = positions
            .iter()
            .zip(&widths_and_factors)
            .map(|(&x, (widths, factor))| {
                let slot = unique
                    .iter()
                    .position(|&index| {
                        (widths_and_factors[index].1 - factor).abs() <= WIDTH_MERGE_TOLERANCE
                    })
                    .unwrap_or(0);
                CompositeBeamNode {
                    position: x,
                    widths: *widths,
                    surface: surfaces[slot].clone(),
                }
            })
            .collect();
        Ok(Self {
            cross_section,
            length,
            element_number,
            loading,
            connectors,
            nodes,
            slip_options,
        })
    }

    pub fn cross_section(&self) -> &CrossSection {
        &self.cross_section
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn loading(&self) -> &Loading {
        &self.loading
    }

    pub fn nodes(&self) -> &[CompositeBeamNode] {
        &self.nodes
    }

    pub fn connectors(&self) -> &[ShearConnector] {
        &self.connectors
    }

    /// Solve the slip distribution under a loading, starting from zero slip
    pub fn solve_slip(&self, loading: &Loading) -> MnKappaResult<SlipSolution> {
        let zeros = vec![0.0; self.nodes.len()];
        self.solve_slip_from(loading, &zeros)
    }

    /// Solve the slip distribution from a warm start (the previous load step)
    pub fn solve_slip_from(
        &self,
        loading: &Loading,
        initial: &[f64],
    ) -> MnKappaResult<SlipSolution> {
        self.check_capacity(loading)?;
        let tolerance = self
            .slip_options
            .moment_tolerance
            .max(RELATIVE_MOMENT_TOLERANCE * loading.maximum_moment().abs());

        let mut slip = DVector::from_column_slice(initial);
        let mut residual = self
            .residual(loading, &slip)
            .ok_or(MnKappaError::ConvergenceFailed(0))?;
        let mut damping = self.slip_options.initial_damping;
        let mut last_update = f64::INFINITY;

        for iteration in 0..self.slip_options.max_iterations {
            if residual.amax() <= tolerance && last_update <= self.slip_options.slip_tolerance {
                debug!(
                    "slip converged after {iteration} iterations (residual {:.3e})",
                    residual.amax()
                );
                return Ok(self.solution(loading, &slip, &residual, iteration));
            }
            let jacobian =
                forward_difference_jacobian(|s| self.residual(loading, s), &slip, &residual)
                    .ok_or(MnKappaError::ConvergenceFailed(iteration))?;

            // grow the damping until a step reduces the residual
            let mut accepted = false;
            while damping <= MAXIMUM_DAMPING {
                let step = damped_least_squares_step(&jacobian, &residual, damping)
                    .ok_or(MnKappaError::SingularMatrix)?;
                let mut alpha = 1.0;
                for _ in 0..LINE_SEARCH_STEPS {
                    let candidate = &slip - alpha * &step;
                    if let Some(candidate_residual) = self.residual(loading, &candidate) {
                        if candidate_residual.norm() < residual.norm() {
                            last_update = (alpha * &step).amax();
                            slip = candidate;
                            residual = candidate_residual;
                            damping = (damping / 3.0).max(1e-12);
                            accepted = true;
                            break;
                        }
                    }
                    alpha *= 0.5;
                }
                if accepted {
                    break;
                }
                damping *= 2.0;
            }
            if !accepted {
                // the residual could not be reduced at any damping level
                if residual.amax() <= tolerance {
                    return Ok(self.solution(loading, &slip, &residual, iteration));
                }
                return Err(MnKappaError::ConvergenceFailed(iteration));
            }
        }
        if residual.amax() <= tolerance {
            let iterations = self.slip_options.max_iterations;
            return Ok(self.solution(loading, &slip, &residual, iterations));
        }
        Err(MnKappaError::ConvergenceFailed(
            self.slip_options.max_iterations,
        ))
    }

    /// Deflection at a position, accounting for joint slip
    pub fn deflection_at(&self, position: f64, loading: &Loading) -> MnKappaResult<f64> {
        let solution = self.solve_slip(loading)?;
        let positions: Vec<f64> = self.nodes.iter().map(|n| n.position).collect();
        let integrand: Vec<f64> = self
            .nodes
            .iter()
            .zip(&solution.curvatures)
            .map(|(node, &kappa)| kappa * virtual_moment(self.length, node.position, position))
            .collect();
        Ok(trapezoidal(&positions, &integrand))
    }

    /// Step the reference loading by the given factors
    ///
    /// Each converged step warm-starts the next; stepping stops at the first
    /// failed step without poisoning the earlier ones.
    pub fn load_deflection(&self, position: f64, factors: &[f64]) -> LoadDeflectionCurve {
        let mut steps = Vec::new();
        let mut warm_start = vec![0.0; self.nodes.len()];
        for &factor in factors {
            let loading = self.loading.scaled(factor);
            match self.solve_slip_from(&loading, &warm_start) {
                Ok(solution) => {
                    let positions: Vec<f64> =
                        self.nodes.iter().map(|n| n.position).collect();
                    let integrand: Vec<f64> = self
                        .nodes
                        .iter()
                        .zip(&solution.curvatures)
                        .map(|(node, &kappa)| {
                            kappa * virtual_moment(self.length, node.position, position)
                        })
                        .collect();
                    warm_start = solution.slip.clone();
                    steps.push(LoadStep {
                        factor,
                        load: loading.loading(),
                        deflection: trapezoidal(&positions, &integrand),
                    });
                }
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

    /// Reject loadings whose moment exceeds any node's surface outright
    fn check_capacity(&self, loading: &Loading) -> MnKappaResult<()> {
        for node in &self.nodes {
            let moment = loading.moment(node.position);
            if moment > node.surface.maximum_moment() {
                return Err(MnKappaError::MomentBeyondCapacity(moment));
            }
        }
        Ok(())
    }

    /// Moment residual f = M_R - M_E at every node for a slip distribution
    fn residual(&self, loading: &Loading, slip: &DVector<f64>) -> Option<DVector<f64>> {
        let crossing = self.zero_crossing(slip, loading);
        let mut values = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let strain_difference = strain_difference(node.position, slip[i], crossing);
            let axial_force = self.axial_force_at(node.position, slip);
            let (resisting, _) = node.surface.moment_at(axial_force, strain_difference)?;
            values.push(resisting - loading.moment(node.position));
        }
        Some(DVector::from_vec(values))
    }

    /// Slab axial force: connector shear accumulated from the left support
    fn axial_force_at(&self, position: f64, slip: &DVector<f64>) -> f64 {
        self.connectors
            .iter()
            .filter(|c| c.position <= position)
            .map(|c| c.load(self.slip_at(c.position, slip)))
            .sum()
    }

    /// Slip at an arbitrary position, interpolated between nodes
    fn slip_at(&self, position: f64, slip: &DVector<f64>) -> f64 {
        let positions: Vec<f64> = self.nodes.iter().map(|n| n.position).collect();
        for (i, pair) in positions.windows(2).enumerate() {
            if position >= pair[0] && position <= pair[1] {
                return interpolate(
                    position,
                    (pair[0], slip[i]),
                    (pair[1], slip[i + 1]),
                );
            }
        }
        if position < positions[0] {
            slip[0]
        } else {
            slip[slip.len() - 1]
        }
    }

    /// Slip-zero crossing, from a sign change or the loading symmetry
    fn zero_crossing(&self, slip: &DVector<f64>, loading: &Loading) -> f64 {
        for (i, pair) in self.nodes.windows(2).enumerate() {
            let (a, b) = (slip[i], slip[i + 1]);
            if a != 0.0 && b != 0.0 && a.signum() != b.signum() {
                return interpolate(0.0, (a, pair[0].position), (b, pair[1].position));
            }
        }
        loading.position_of_maximum_moment()
    }

    fn solution(
        &self,
        loading: &Loading,
        slip: &DVector<f64>,
        residual: &DVector<f64>,
        iterations: usize,
    ) -> SlipSolution {
        let crossing = self.zero_crossing(slip, loading);
        let mut curvatures = Vec::with_capacity(self.nodes.len());
        let mut axial_forces = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let axial_force = self.axial_force_at(node.position, slip);
            let eps = strain_difference(node.position, slip[i], crossing);
            let kappa = node
                .surface
                .moment_at(axial_force, eps)
                .map(|(_, k)| k)
                .unwrap_or(0.0);
            curvatures.push(kappa);
            axial_forces.push(axial_force);
        }
        SlipSolution {
            slip: slip.iter().copied().collect(),
            curvatures,
            axial_forces,
            residual_norm: residual.amax(),
            iterations,
        }
    }
}

/// Strain difference from the secant of the slip distribution
fn strain_difference(position: f64, slip: f64, crossing: f64) -> f64 {
    let distance = position - crossing;
    if distance.abs() < CROSSING_DISTANCE {
        0.0
    } else {
        slip / distance
    }
}
