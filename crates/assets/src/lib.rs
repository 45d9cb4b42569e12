//! Texture loading off the render thread.
//!
//! Files are decoded on a background thread and handed back over a channel.
//! The frame loop polls without blocking; a material simply stays untextured
//! until its images arrive, and a failed load only produces a warning.

mod loader;

pub use loader::{GroundTextures, LoadedTexture, TextureLoader, TextureRequest, load_texture};

use std::path::PathBuf;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("texture not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub fn crate_info() -> &'static str {
    "realm-assets v0.1.0"
}
