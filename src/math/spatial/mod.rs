// src/math/spatial/mod.rs

pub mod neighbors;
pub mod torus_index;

pub use self::neighbors::{NeighborTable, Neighbour};
pub use self::torus_index::{IndexHit, TorusIndex};
