//! Kernel: the per-frame player update.
//!
//! # Invariants
//! - One call to [`Simulation::step`] is one frame; rates are per frame, not
//!   per second.
//! - Steps run in a fixed order: integrate gravity, reset ground flag, probe
//!   ground, jump, turn, then walk.
//! - The step is pure with respect to its inputs: the same snapshots, ground
//!   and starting state always give the same result.

mod ground;
mod player;
pub mod simulation;

pub use ground::{FlatGround, GroundHit, GroundProbe, NoGround};
pub use player::{JumpTrigger, PlayerConfig, PlayerState};
pub use simulation::{FrameEvent, Simulation};

pub fn crate_info() -> &'static str {
    "realm-kernel v0.1.0"
}
