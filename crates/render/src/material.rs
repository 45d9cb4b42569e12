use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to mesh geometry uploaded to a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Handle to a material registered with a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Which texture map of a material an image feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    Color,
    Normal,
    Roughness,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 3] = [TextureSlot::Color, TextureSlot::Normal, TextureSlot::Roughness];

    /// Only the colour map carries sRGB-encoded data.
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureSlot::Color)
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Color => "color",
            TextureSlot::Normal => "normal",
            TextureSlot::Roughness => "roughness",
        }
    }
}

/// Texture coordinate addressing outside 0..1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wrap {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// Sampling parameters for a bound texture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub wrap_u: Wrap,
    pub wrap_v: Wrap,
    /// UV scale: how many times the image tiles across the mesh.
    pub repeat: [f32; 2],
    /// Anisotropic filtering level; 1 disables it.
    pub anisotropy: u16,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            wrap_u: Wrap::Repeat,
            wrap_v: Wrap::Repeat,
            repeat: [1.0, 1.0],
            anisotropy: 1,
        }
    }
}

/// A texture a backend has accepted for a material slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundTexture {
    pub width: u32,
    pub height: u32,
    pub settings: TextureSettings,
}

/// Physically based surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    /// Filled in by the backend as textures are bound.
    pub textures: BTreeMap<TextureSlot, BoundTexture>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec3::ONE,
            roughness: 1.0,
            metalness: 0.1,
            textures: BTreeMap::new(),
        }
    }
}

impl Material {
    /// UV repeat shared by the bound textures. The colour map wins when they
    /// disagree; untextured materials use 1x1.
    pub fn uv_repeat(&self) -> [f32; 2] {
        TextureSlot::ALL
            .iter()
            .find_map(|slot| self.textures.get(slot))
            .map(|t| t.settings.repeat)
            .unwrap_or([1.0, 1.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_material_defaults() {
        let m = Material::default();
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.1);
        assert!(m.textures.is_empty());
        assert_eq!(m.uv_repeat(), [1.0, 1.0]);
    }

    #[test]
    fn uv_repeat_prefers_color() {
        let mut m = Material::default();
        let bound = |repeat| BoundTexture {
            width: 1,
            height: 1,
            settings: TextureSettings {
                repeat,
                ..TextureSettings::default()
            },
        };
        m.textures.insert(TextureSlot::Roughness, bound([4.0, 4.0]));
        assert_eq!(m.uv_repeat(), [4.0, 4.0]);
        m.textures.insert(TextureSlot::Color, bound([10.0, 10.0]));
        assert_eq!(m.uv_repeat(), [10.0, 10.0]);
    }

    #[test]
    fn only_color_is_srgb() {
        assert!(TextureSlot::Color.is_srgb());
        assert!(!TextureSlot::Normal.is_srgb());
        assert!(!TextureSlot::Roughness.is_srgb());
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let s: TextureSettings =
            serde_json::from_str(r#"{"wrap_u":"clamp_to_edge","repeat":[2,3]}"#).unwrap();
        assert_eq!(s.wrap_u, Wrap::ClampToEdge);
        assert_eq!(s.wrap_v, Wrap::Repeat);
        assert_eq!(s.repeat, [2.0, 3.0]);
    }
}
