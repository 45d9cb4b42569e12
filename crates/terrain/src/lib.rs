//! Terrain: a static height field built once at startup and queried by ray casts.
//!
//! # Invariants
//! - Vertex heights are a pure function of horizontal position (`height_at`).
//! - Normals are recomputed from the displaced surface after heights are set.
//! - The surface is immutable after construction; the same geometry is used
//!   for rendering and for ground detection.

mod grid;
mod heightfield;
mod ray;

pub use grid::CellCoord;
pub use heightfield::{Terrain, TerrainConfig, TerrainError, height_at};
pub use ray::{Ray, RayHit};

pub fn crate_info() -> &'static str {
    "realm-terrain v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("terrain"));
    }
}
