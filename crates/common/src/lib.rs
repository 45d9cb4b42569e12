//! Shared value types: spatial transforms, CPU-side mesh data, decoded images.

mod types;

pub use types::{MeshData, TextureImage, Transform};

pub fn crate_info() -> &'static str {
    "realm-common v0.1.0"
}
