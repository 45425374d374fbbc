//! This module exports the BVH itself, its flat node and leaf records, and
//! the build configuration and statistics types.

mod builder;
mod node;
mod split;
mod traverse;

pub use builder::*;
pub use node::*;
pub use split::{ObjectSplit, SpatialSplit, Split};
