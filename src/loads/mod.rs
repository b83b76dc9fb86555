//! Loadings and shear connectors

mod connector;
mod single_span;

pub use connector::{HeadedStud, ShearConnector};
pub use single_span::{Loading, SingleLoad, SingleSpanSingleLoads, SingleSpanUniformLoad};
