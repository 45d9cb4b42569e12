//! Runtime: wires the terrain, the player simulation and a render backend
//! into one frame loop.
//!
//! # Invariants
//! - Input reaches the simulation only through the [`InputQueue`], drained
//!   once per frame in arrival order.
//! - Each frame runs: drain input, step the simulation, pose the camera rig,
//!   draw. Drawing is always last and happens exactly once.
//! - The frame loop never waits on texture loading.
//!
//! [`InputQueue`]: realm_input::InputQueue

mod driver;
mod game;
mod scene;

pub use driver::FrameDriver;
pub use game::{Game, RuntimeError};
pub use scene::{SceneHandles, apply_textures, build_scene};

pub fn crate_info() -> &'static str {
    "realm-runtime v0.1.0"
}
