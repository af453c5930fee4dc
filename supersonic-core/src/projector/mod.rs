//! Schema-to-schema projection: the single-source and multi-source
//! projectors that expression binding and join operators build on top of.

mod multi;
mod single;

pub use multi::{BoundMultiSourceProjector, MultiSourceProjectorSpec, SourceAttribute};
pub use single::{BoundSingleSourceProjector, SingleSourceProjectorSpec};
