//! Single-span loadings
//!
//! Closed-form moment and shear fields for a simply supported span: pin at
//! x = 0, roller at x = L. Loads act downward; sagging moments are positive.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};

/// Uniformly distributed load over the full span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleSpanUniformLoad {
    /// Span length
    pub length: f64,
    /// Load intensity per unit length
    pub load: f64,
}

impl SingleSpanUniformLoad {
    pub fn new(length: f64, load: f64) -> MnKappaResult<Self> {
        if length <= 0.0 {
            return Err(MnKappaError::InvalidLoading(format!(
                "non-positive span length {length}"
            )));
        }
        Ok(Self { length, load })
    }

    /// M_max = w * L^2 / 8 at mid-span
    pub fn maximum_moment(&self) -> f64 {
        self.load * self.length.powi(2) / 8.0
    }

    /// M(x) = w / 2 * x * (L - x)
    pub fn moment(&self, at_position: f64) -> f64 {
        self.load / 2.0 * at_position * (self.length - at_position)
    }

    /// V(x) = w * (L / 2 - x)
    pub fn transversal_shear(&self, at_position: f64) -> f64 {
        self.load * (self.length / 2.0 - at_position)
    }

    /// Total applied force w * L
    pub fn loading(&self) -> f64 {
        self.load * self.length
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            length: self.length,
            load: self.load * factor,
        }
    }
}

/// A concentrated load at a position along the span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleLoad {
    pub position: f64,
    pub value: f64,
}

impl SingleLoad {
    pub fn new(position: f64, value: f64) -> Self {
        Self { position, value }
    }
}

/// One or more concentrated loads on a single span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleSpanSingleLoads {
    pub length: f64,
    pub loads: Vec<SingleLoad>,
}

impl SingleSpanSingleLoads {
    pub fn new(length: f64, loads: Vec<SingleLoad>) -> MnKappaResult<Self> {
        if length <= 0.0 {
            return Err(MnKappaError::InvalidLoading(format!(
                "non-positive span length {length}"
            )));
        }
        for load in &loads {
            if load.position < 0.0 || load.position > length {
                return Err(MnKappaError::InvalidLoading(format!(
                    "load position {} outside span [0, {length}]",
                    load.position
                )));
            }
        }
        Ok(Self { length, loads })
    }

    /// Left support reaction R_A = sum P_i * (L - x_i) / L
    pub fn left_reaction(&self) -> f64 {
        self.loads
            .iter()
            .map(|l| l.value * (self.length - l.position) / self.length)
            .sum()
    }

    /// Right support reaction R_B = sum P_i * x_i / L
    pub fn right_reaction(&self) -> f64 {
        self.loads
            .iter()
            .map(|l| l.value * l.position / self.length)
            .sum()
    }

    /// M(x) = R_A * x - sum_{x_i <= x} P_i * (x - x_i)
    pub fn moment(&self, at_position: f64) -> f64 {
        let mut moment = self.left_reaction() * at_position;
        for load in &self.loads {
            if load.position <= at_position {
                moment -= load.value * (at_position - load.position);
            }
        }
        moment
    }

    /// V(x) = R_A - sum_{x_i < x} P_i
    pub fn transversal_shear(&self, at_position: f64) -> f64 {
        let mut shear = self.left_reaction();
        for load in &self.loads {
            if load.position < at_position {
                shear -= load.value;
            }
        }
        shear
    }

    /// The moment diagram is piecewise linear, so the maximum sits at a load
    pub fn maximum_moment(&self) -> f64 {
        self.loads
            .iter()
            .map(|l| self.moment(l.position))
            .fold(0.0, f64::max)
    }

    /// Total applied force
    pub fn loading(&self) -> f64 {
        self.loads.iter().map(|l| l.value).sum()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            length: self.length,
            loads: self
                .loads
                .iter()
                .map(|l| SingleLoad::new(l.position, l.value * factor))
                .collect(),
        }
    }
}

/// Loading of a single-span beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loading {
    Uniform(SingleSpanUniformLoad),
    SingleLoads(SingleSpanSingleLoads),
}

impl Loading {
    pub fn uniform(length: f64, load: f64) -> MnKappaResult<Self> {
        Ok(Loading::Uniform(SingleSpanUniformLoad::new(length, load)?))
    }

    pub fn single_loads(length: f64, loads: Vec<SingleLoad>) -> MnKappaResult<Self> {
        Ok(Loading::SingleLoads(SingleSpanSingleLoads::new(
            length, loads,
        )?))
    }

    pub fn length(&self) -> f64 {
        match self {
            Loading::Uniform(l) => l.length,
            Loading::SingleLoads(l) => l.length,
        }
    }

    pub fn maximum_moment(&self) -> f64 {
        match self {
            Loading::Uniform(l) => l.maximum_moment(),
            Loading::SingleLoads(l) => l.maximum_moment(),
        }
    }

    pub fn moment(&self, at_position: f64) -> f64 {
        match self {
            Loading::Uniform(l) => l.moment(at_position),
            Loading::SingleLoads(l) => l.moment(at_position),
        }
    }

    pub fn transversal_shear(&self, at_position: f64) -> f64 {
        match self {
            Loading::Uniform(l) => l.transversal_shear(at_position),
            Loading::SingleLoads(l) => l.transversal_shear(at_position),
        }
    }

    pub fn loading(&self) -> f64 {
        match self {
            Loading::Uniform(l) => l.loading(),
            Loading::SingleLoads(l) => l.loading(),
        }
    }

    /// Position where the bending moment is largest
    pub fn position_of_maximum_moment(&self) -> f64 {
        match self {
            Loading::Uniform(l) => l.length / 2.0,
            Loading::SingleLoads(l) => l
                .loads
                .iter()
                .map(|load| (load.position, l.moment(load.position)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(pos, _)| pos)
                .unwrap_or(l.length / 2.0),
        }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Loading::Uniform(l) => Loading::Uniform(l.scaled(factor)),
            Loading::SingleLoads(l) => Loading::SingleLoads(l.scaled(factor)),
        }
    }
}
