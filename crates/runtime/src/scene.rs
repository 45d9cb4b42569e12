use glam::Vec3;
use realm_assets::LoadedTexture;
use realm_common::Transform;
use realm_config::{GameConfig, TextureConfig, srgb_hex_to_linear};
use realm_render::{CameraRig, Material, MaterialId, NodeId, NodeKind, RenderError, SceneBackend};
use realm_terrain::Terrain;

/// Nodes and resources created by [`build_scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub rig: CameraRig,
    pub terrain: NodeId,
    pub terrain_material: MaterialId,
    pub sun: NodeId,
    pub ambient: NodeId,
}

/// Populate `backend` with the lit terrain and a camera rig at the spawn
/// point.
pub fn build_scene<B: SceneBackend + ?Sized>(
    backend: &mut B,
    terrain: &Terrain,
    config: &GameConfig,
) -> Result<SceneHandles, RenderError> {
    let scene_cfg = &config.scene;
    backend.set_background(srgb_hex_to_linear(scene_cfg.background));

    let sun = backend.create_node(
        NodeKind::DirectionalLight {
            color: srgb_hex_to_linear(scene_cfg.sun.color),
            intensity: scene_cfg.sun.intensity,
        },
        Transform::from_position(scene_cfg.sun.position),
    );
    let ambient = backend.create_node(
        NodeKind::AmbientLight {
            color: srgb_hex_to_linear(scene_cfg.ambient.color),
            intensity: scene_cfg.ambient.intensity,
        },
        Transform::default(),
    );

    let mesh = backend.add_mesh(&terrain.mesh_data())?;
    let terrain_material = backend.add_material(Material {
        base_color: Vec3::ONE,
        roughness: scene_cfg.terrain_material.roughness,
        metalness: scene_cfg.terrain_material.metalness,
        ..Material::default()
    });
    let terrain_node = backend.create_node(
        NodeKind::Mesh {
            mesh,
            material: terrain_material,
        },
        Transform::default(),
    );

    let rig = CameraRig::build(
        backend.scene_mut(),
        scene_cfg.projection,
        config.player.spawn,
    )?;

    tracing::info!(
        nodes = backend.scene().len(),
        triangles = terrain.triangle_count(),
        "scene built"
    );
    Ok(SceneHandles {
        rig,
        terrain: terrain_node,
        terrain_material,
        sun,
        ambient,
    })
}

/// Bind whatever textures have finished loading. Failures are logged and
/// leave the slot untextured. Returns how many were bound.
pub fn apply_textures<B: SceneBackend + ?Sized>(
    backend: &mut B,
    material: MaterialId,
    loaded: Vec<LoadedTexture>,
    textures: &TextureConfig,
) -> usize {
    let settings = textures.settings(backend.max_anisotropy());
    let mut bound = 0;
    for texture in loaded {
        let image = match texture.result {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("{} texture unavailable: {e}", texture.slot.name());
                continue;
            }
        };
        match backend.bind_texture(material, texture.slot, &image, settings) {
            Ok(()) => {
                tracing::info!(
                    slot = texture.slot.name(),
                    width = image.width,
                    height = image.height,
                    "texture bound from {}",
                    texture.path.display()
                );
                bound += 1;
            }
            Err(e) => tracing::warn!("{} texture rejected: {e}", texture.slot.name()),
        }
    }
    bound
}
