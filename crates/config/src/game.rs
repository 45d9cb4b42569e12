use glam::Vec3;
use realm_assets::GroundTextures;
use realm_input::{Bindings, LookConfig};
use realm_kernel::PlayerConfig;
use realm_render::{Projection, TextureSettings, Wrap};
use realm_terrain::{TerrainConfig, TerrainError};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

/// Errors from loading or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid terrain: {0}")]
    Terrain(#[from] TerrainError),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Convert a `0xRRGGBB` sRGB colour to linear RGB.
pub fn srgb_hex_to_linear(hex: u32) -> Vec3 {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Texture files plus how they are sampled on the terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub files: GroundTextures,
    /// Tiles across the whole terrain, per axis.
    pub repeat: [f32; 2],
    pub wrap: Wrap,
    /// Anisotropic filtering level. Unset means the backend maximum.
    pub anisotropy: Option<u16>,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            files: GroundTextures::default(),
            repeat: [10.0, 10.0],
            wrap: Wrap::Repeat,
            anisotropy: None,
        }
    }
}

impl TextureConfig {
    pub fn settings(&self, max_anisotropy: u16) -> TextureSettings {
        let anisotropy = self
            .anisotropy
            .map_or(max_anisotropy, |a| a.min(max_anisotropy))
            .max(1);
        TextureSettings {
            wrap_u: self.wrap,
            wrap_v: self.wrap,
            repeat: self.repeat,
            anisotropy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 1.0,
            position: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: u32,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            roughness: 1.0,
            metalness: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Clear colour as `0xRRGGBB`.
    pub background: u32,
    pub projection: Projection,
    pub sun: SunConfig,
    pub ambient: AmbientConfig,
    pub terrain_material: MaterialConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background: 0x87ceeb,
            projection: Projection::default(),
            sun: SunConfig::default(),
            ambient: AmbientConfig::default(),
            terrain_material: MaterialConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "silent-realm".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything the game reads at startup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub terrain: TerrainConfig,
    pub player: PlayerConfig,
    pub look: LookConfig,
    /// Replaces the default table as a whole when present.
    pub bindings: Bindings,
    pub textures: TextureConfig,
    pub scene: SceneConfig,
    pub window: WindowConfig,
}

impl GameConfig {
    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;

        let p = &self.player;
        positive("player.height", p.height)?;
        positive("player.gravity", p.gravity)?;
        positive("player.sprint_multiplier", p.sprint_multiplier)?;
        non_negative("player.move_speed", p.move_speed)?;
        non_negative("player.turn_speed", p.turn_speed)?;
        non_negative("player.jump_force", p.jump_force)?;
        non_negative("player.ground_tolerance", p.ground_tolerance)?;
        if !p.spawn.is_finite() {
            return Err(invalid("player.spawn", "must be finite"));
        }

        positive("look.sensitivity", self.look.sensitivity)?;
        let margin = self.look.pitch_margin;
        if !(margin > 0.0 && margin < FRAC_PI_2) {
            return Err(invalid(
                "look.pitch_margin",
                format!("{margin} is outside (0, pi/2)"),
            ));
        }

        let proj = &self.scene.projection;
        if !(proj.fov_y_degrees > 0.0 && proj.fov_y_degrees < 180.0) {
            return Err(invalid(
                "scene.projection.fov_y_degrees",
                format!("{} is outside (0, 180)", proj.fov_y_degrees),
            ));
        }
        positive("scene.projection.near", proj.near)?;
        if !(proj.far > proj.near) {
            return Err(invalid(
                "scene.projection.far",
                format!("{} is not beyond near plane {}", proj.far, proj.near),
            ));
        }

        let [ru, rv] = self.textures.repeat;
        positive("textures.repeat", ru)?;
        positive("textures.repeat", rv)?;
        if self.textures.anisotropy == Some(0) {
            return Err(invalid("textures.anisotropy", "must be at least 1"));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window",
                format!("{}x{} has no area", self.window.width, self.window.height),
            ));
        }
        Ok(())
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be positive")))
    }
}

fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must not be negative")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_input::{Action, Key};
    use realm_kernel::JumpTrigger;

    #[test]
    fn defaults_are_valid() {
        let c = GameConfig::default();
        c.validate().unwrap();
        assert_eq!(c.terrain.size, 200.0);
        assert_eq!(c.terrain.resolution, 200);
        assert_eq!(c.scene.background, 0x87ceeb);
        assert_eq!(c.textures.repeat, [10.0, 10.0]);
        assert_eq!(c.scene.terrain_material.metalness, 0.1);
    }

    #[test]
    fn empty_text_is_default() {
        assert_eq!(GameConfig::from_yaml("").unwrap(), GameConfig::default());
        assert_eq!(GameConfig::from_yaml("  \n").unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let yaml = "
player:
  gravity: 0.02
  jump_trigger: pressed
look:
  sensitivity: 0.004
bindings:
  jump: [J]
";
        let c = GameConfig::from_yaml(yaml).unwrap();
        assert_eq!(c.player.gravity, 0.02);
        assert_eq!(c.player.jump_trigger, JumpTrigger::Pressed);
        assert_eq!(c.player.height, 2.0);
        assert_eq!(c.look.sensitivity, 0.004);
        assert_eq!(c.look.pitch_margin, 0.01);
        assert_eq!(c.bindings.keys_for(Action::Jump), &[Key::J]);
        // A bindings section replaces the whole table.
        assert!(c.bindings.keys_for(Action::Forward).is_empty());
        assert_eq!(c.terrain, TerrainConfig::default());
    }

    #[test]
    fn yaml_roundtrip_preserves_config() {
        let mut c = GameConfig::default();
        c.player.spawn = Vec3::new(5.0, 50.0, -5.0);
        c.textures.anisotropy = Some(4);
        let back = GameConfig::from_yaml(&c.to_yaml().unwrap()).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases: Vec<(&str, &str)> = vec![
            ("terrain: {size: 0}", "terrain"),
            ("terrain: {resolution: 0}", "terrain"),
            ("player: {height: -1}", "player.height"),
            ("player: {gravity: 0}", "player.gravity"),
            ("look: {sensitivity: 0}", "look.sensitivity"),
            ("look: {pitch_margin: 0}", "look.pitch_margin"),
            ("look: {pitch_margin: 2.0}", "look.pitch_margin"),
            ("scene: {projection: {near: 10, far: 5}}", "scene.projection.far"),
            ("textures: {anisotropy: 0}", "textures.anisotropy"),
            ("window: {width: 0}", "window"),
        ];
        for (yaml, field) in cases {
            let err = GameConfig::from_yaml(yaml).unwrap_err();
            assert!(err.to_string().contains(field), "{yaml}: {err}");
        }
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(matches!(
            GameConfig::from_yaml("player: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            GameConfig::from_yaml("player: {gravity: fast}"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("realm.yaml");
        std::fs::write(&path, "terrain:\n  size: 64\n  resolution: 32\n").unwrap();
        let c = GameConfig::load(&path).unwrap();
        assert_eq!(c.terrain.size, 64.0);
        assert_eq!(c.terrain.resolution, 32);

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            GameConfig::load_or_default(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
        assert_eq!(GameConfig::load_or_default(None).unwrap(), GameConfig::default());
    }

    #[test]
    fn texture_settings_cap_anisotropy() {
        let mut t = TextureConfig::default();
        assert_eq!(t.settings(16).anisotropy, 16);
        assert_eq!(t.settings(16).repeat, [10.0, 10.0]);
        assert_eq!(t.settings(16).wrap_u, Wrap::Repeat);
        t.anisotropy = Some(4);
        assert_eq!(t.settings(16).anisotropy, 4);
        assert_eq!(t.settings(2).anisotropy, 2);
        assert_eq!(TextureConfig::default().settings(0).anisotropy, 1);
    }

    #[test]
    fn sky_blue_to_linear() {
        let c = srgb_hex_to_linear(0x87ceeb);
        assert!((c.x - 0.2423).abs() < 1e-3, "{c:?}");
        assert!((c.y - 0.6172).abs() < 1e-3);
        assert!((c.z - 0.8308).abs() < 1e-3);
        assert_eq!(srgb_hex_to_linear(0xffffff), Vec3::ONE);
        assert_eq!(srgb_hex_to_linear(0), Vec3::ZERO);
    }
}
