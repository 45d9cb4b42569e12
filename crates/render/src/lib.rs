//! Rendering capability: the scene graph and the backend trait that draws it.
//!
//! # Invariants
//! - Game logic only talks to a [`SceneBackend`]; it never names a concrete
//!   renderer.
//! - The scene graph is the single owner of node transforms. Backends read it
//!   when drawing and never write it.
//! - `draw_frame` is side-effect only. Backend failures are logged, not
//!   returned to the frame loop.

mod camera;
mod material;
mod renderer;
mod scene;

pub use camera::{CameraRig, Projection};
pub use material::{BoundTexture, Material, MaterialId, MeshId, TextureSettings, TextureSlot, Wrap};
pub use renderer::{DebugTextRenderer, SceneBackend, validate_mesh, validate_texture};
pub use scene::{Node, NodeId, NodeKind, RenderError, SceneGraph, SceneLights};

pub fn crate_info() -> &'static str {
    "realm-render v0.1.0"
}
