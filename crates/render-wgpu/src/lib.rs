//! wgpu implementation of [`realm_render::SceneBackend`].
//!
//! Draws every mesh node of the scene graph with one lit pipeline: a colour
//! map, a tangent-space normal map and a roughness map per material, a single
//! directional sun plus ambient light, and a depth buffer.
//!
//! # Invariants
//! - Textures are uploaded with a full mip chain; samplers use trilinear
//!   filtering and the anisotropy the adapter allows.
//! - A material slot with no texture samples a neutral 1x1 placeholder, so
//!   drawing never waits for asset loading.
//! - Failures while drawing are logged and the frame is dropped.

mod backend;
mod gpu;
mod shaders;
mod textures;

pub use backend::WgpuBackend;
pub use gpu::{GpuContext, GpuError};

pub fn crate_info() -> &'static str {
    "realm-render-wgpu v0.1.0"
}
