//! Game configuration.
//!
//! One YAML file holds every tunable. Any section or field may be omitted;
//! missing values take the built-in defaults, so an empty file and no file
//! behave the same.
//!
//! # Invariants
//! - A `GameConfig` returned by [`GameConfig::load`] has passed
//!   [`GameConfig::validate`].

mod game;

pub use game::{
    AmbientConfig, ConfigError, GameConfig, MaterialConfig, SceneConfig, SunConfig,
    TextureConfig, WindowConfig, srgb_hex_to_linear,
};

pub fn crate_info() -> &'static str {
    "realm-config v0.1.0"
}
