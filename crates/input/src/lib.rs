//! Input: key/mouse state captured from the platform and read once per frame.
//!
//! # Invariants
//! - The platform layer only pushes [`InputEvent`]s; nothing reads raw
//!   platform events.
//! - The frame loop drains the queue in arrival order, then reads an
//!   immutable [`InputSnapshot`].
//! - Mouse motion rotates the view only while the pointer is locked.
//! - Pitch never leaves `[-(π/2 - margin), π/2 - margin]`.

pub mod action;
mod event;
mod key;
mod look;
mod state;

pub use action::{Action, Bindings, UnknownAction};
pub use event::{InputEvent, InputQueue};
pub use key::{Key, UnknownKey};
pub use look::{CameraOrientation, LookConfig, LookControl};
pub use state::{InputSnapshot, InputState};

pub fn crate_info() -> &'static str {
    "realm-input v0.1.0"
}
