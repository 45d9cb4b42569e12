use glam::Vec3;
use realm_common::{MeshData, TextureImage, Transform};
use std::fmt::Write as _;

use crate::material::{BoundTexture, Material, MaterialId, MeshId, TextureSettings, TextureSlot};
use crate::scene::{NodeId, NodeKind, RenderError, SceneGraph};

/// Rendering capability injected into the game.
///
/// A backend owns a [`SceneGraph`] plus whatever device resources back its
/// meshes and materials. Scene edits go through the provided methods; the
/// backend reads the graph when asked to draw.
pub trait SceneBackend {
    fn scene(&self) -> &SceneGraph;

    fn scene_mut(&mut self) -> &mut SceneGraph;

    fn create_node(&mut self, kind: NodeKind, transform: Transform) -> NodeId {
        self.scene_mut().add(kind, transform)
    }

    fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), RenderError> {
        self.scene_mut().attach(child, parent)
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), RenderError> {
        self.scene_mut().set_transform(node, transform)
    }

    fn set_background(&mut self, color: Vec3) {
        self.scene_mut().set_background(color);
    }

    /// Upload geometry. Indices must reference existing vertices.
    fn add_mesh(&mut self, mesh: &MeshData) -> Result<MeshId, RenderError>;

    fn add_material(&mut self, material: Material) -> MaterialId;

    fn material(&self, id: MaterialId) -> Option<&Material>;

    /// Replace the image in one slot of `material`.
    fn bind_texture(
        &mut self,
        material: MaterialId,
        slot: TextureSlot,
        image: &TextureImage,
        settings: TextureSettings,
    ) -> Result<(), RenderError>;

    /// Highest anisotropic filtering level the backend supports.
    fn max_anisotropy(&self) -> u16;

    /// Resize the output surface. Camera projections are updated separately.
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the scene as seen from `camera`. Failures are logged by the
    /// backend and never surface to the caller.
    fn draw_frame(&mut self, camera: NodeId);
}

/// Shape checks shared by backends before accepting mesh data.
pub fn validate_mesh(mesh: &MeshData) -> Result<(), RenderError> {
    let n = mesh.positions.len();
    if mesh.normals.len() != n || mesh.uvs.len() != n {
        return Err(RenderError::InvalidMesh(format!(
            "{n} positions, {} normals, {} uvs",
            mesh.normals.len(),
            mesh.uvs.len()
        )));
    }
    if mesh.indices.len() % 3 != 0 {
        return Err(RenderError::InvalidMesh(format!(
            "{} indices is not a whole number of triangles",
            mesh.indices.len()
        )));
    }
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= n) {
        return Err(RenderError::InvalidMesh(format!(
            "index {bad} out of range for {n} vertices"
        )));
    }
    Ok(())
}

pub fn validate_texture(image: &TextureImage) -> Result<(), RenderError> {
    let expected = image.width as usize * image.height as usize * 4;
    if image.width == 0 || image.height == 0 || image.rgba.len() != expected {
        return Err(RenderError::InvalidTexture {
            width: image.width,
            height: image.height,
            len: image.rgba.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
struct MeshStats {
    vertices: usize,
    triangles: usize,
}

/// Headless backend that describes each frame as text.
///
/// Useful for the CLI, logging, and exercising the scene capability in
/// tests without a GPU.
#[derive(Debug)]
pub struct DebugTextRenderer {
    scene: SceneGraph,
    meshes: Vec<MeshStats>,
    materials: Vec<Material>,
    viewport: (u32, u32),
    max_anisotropy: u16,
    frames_drawn: u64,
    last_frame: Option<String>,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            viewport: (1280, 720),
            max_anisotropy: 16,
            frames_drawn: 0,
            last_frame: None,
        }
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Text of the most recent frame.
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn describe(&self, camera: NodeId) -> Result<String, RenderError> {
        let projection = self.scene.projection(camera)?;
        let world = self.scene.world_matrix(camera)?;
        let eye = world.w_axis.truncate();
        let forward = world.transform_vector3(Vec3::NEG_Z).normalize_or_zero();
        let yaw = (-forward.x).atan2(-forward.z);
        let pitch = forward.y.clamp(-1.0, 1.0).asin();

        let mut out = String::new();
        let (w, h) = self.viewport;
        let _ = writeln!(out, "=== Frame {} ({w}x{h}) ===", self.frames_drawn);
        let _ = writeln!(
            out,
            "Nodes: {}  Meshes: {}  Materials: {}",
            self.scene.len(),
            self.meshes.len(),
            self.materials.len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) yaw={:.3} pitch={:.3} fov={:.0}",
            eye.x, eye.y, eye.z, yaw, pitch, projection.fov_y_degrees
        );
        for (node, mesh, material, matrix) in self.scene.mesh_instances() {
            let stats = self
                .meshes
                .get(mesh.0 as usize)
                .ok_or(RenderError::UnknownMesh(mesh))?;
            let mat = self
                .materials
                .get(material.0 as usize)
                .ok_or(RenderError::UnknownMaterial(material))?;
            let p = matrix.w_axis;
            let textures: Vec<&str> = mat.textures.keys().map(|s| s.name()).collect();
            let _ = writeln!(
                out,
                "  mesh {} at ({:.1}, {:.1}, {:.1}): {} verts, {} tris, textures [{}]",
                node.0,
                p.x,
                p.y,
                p.z,
                stats.vertices,
                stats.triangles,
                textures.join(", ")
            );
        }
        Ok(out)
    }
}

impl SceneBackend for DebugTextRenderer {
    fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    fn add_mesh(&mut self, mesh: &MeshData) -> Result<MeshId, RenderError> {
        validate_mesh(mesh)?;
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(MeshStats {
            vertices: mesh.vertex_count(),
            triangles: mesh.triangle_count(),
        });
        Ok(id)
    }

    fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    fn bind_texture(
        &mut self,
        material: MaterialId,
        slot: TextureSlot,
        image: &TextureImage,
        settings: TextureSettings,
    ) -> Result<(), RenderError> {
        validate_texture(image)?;
        let mat = self
            .materials
            .get_mut(material.0 as usize)
            .ok_or(RenderError::UnknownMaterial(material))?;
        mat.textures.insert(
            slot,
            BoundTexture {
                width: image.width,
                height: image.height,
                settings,
            },
        );
        Ok(())
    }

    fn max_anisotropy(&self) -> u16 {
        self.max_anisotropy
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn draw_frame(&mut self, camera: NodeId) {
        self.frames_drawn += 1;
        match self.describe(camera) {
            Ok(text) => self.last_frame = Some(text),
            Err(e) => {
                tracing::warn!("debug frame {} not drawn: {e}", self.frames_drawn);
                self.last_frame = None;
            }
        }
    }
}
