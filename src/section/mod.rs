//! Cross-section data model: geometries, materials, sections, integration

mod boundaries;
mod concrete;
mod geometry;
mod integration;
mod material;
mod section;

pub use boundaries::CurvatureBounds;
pub use concrete::{Concrete, ConcreteCompression, ConcreteTension};
pub use geometry::{Circle, Geometry, Rectangle, Trapezoid};
pub use integration::{InternalForces, StrainProfile};
pub use material::{
    Material, MaterialKind, Reinforcement, SectionRole, Steel, StrainPosition, StressStrain,
};
pub use section::{CrossSection, Section};
