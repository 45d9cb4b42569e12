use glam::{Mat4, Vec3};
use realm_common::Transform;

use crate::camera::Projection;
use crate::material::{MaterialId, MeshId};

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Errors from scene and backend operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("node {0:?} is not a camera")]
    NotACamera(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("mesh data is malformed: {0}")]
    InvalidMesh(String),
    #[error("texture is {width}x{height} but holds {len} bytes")]
    InvalidTexture { width: u32, height: u32, len: usize },
}

/// What a node contributes to the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform pivot.
    Group,
    Camera(Projection),
    Mesh { mesh: MeshId, material: MaterialId },
    /// Shines from the node's world position toward the world origin.
    DirectionalLight { color: Vec3, intensity: f32 },
    AmbientLight { color: Vec3, intensity: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Lighting gathered from the graph, in a form shaders consume directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLights {
    /// Unit vector pointing from the surface toward the light.
    pub sun_direction: Vec3,
    /// Colour times intensity.
    pub sun_color: Vec3,
    pub ambient: Vec3,
}

impl Default for SceneLights {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::Y,
            sun_color: Vec3::ZERO,
            ambient: Vec3::ZERO,
        }
    }
}

/// Retained scene: a forest of nodes with local transforms.
///
/// Nodes without a parent sit at the scene root. Node ids are never reused.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    background: Vec3,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            background: Vec3::ZERO,
        }
    }

    pub fn add(&mut self, kind: NodeKind, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            transform,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, RenderError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(RenderError::UnknownNode(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    /// Move `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), RenderError> {
        self.node_mut(child)?;
        self.node_mut(parent)?;

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(RenderError::Cycle { child, parent });
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }

        if let Some(old) = self.node_mut(child)?.parent.take() {
            self.node_mut(old)?.children.retain(|&c| c != child);
        }
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), RenderError> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    /// Local transform composed with every ancestor's.
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, RenderError> {
        let mut node = self.node(id).ok_or(RenderError::UnknownNode(id))?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.node(parent).ok_or(RenderError::UnknownNode(parent))?;
            matrix = node.transform.matrix() * matrix;
        }
        Ok(matrix)
    }

    pub fn projection(&self, camera: NodeId) -> Result<&Projection, RenderError> {
        match &self.node(camera).ok_or(RenderError::UnknownNode(camera))?.kind {
            NodeKind::Camera(p) => Ok(p),
            _ => Err(RenderError::NotACamera(camera)),
        }
    }

    pub fn projection_mut(&mut self, camera: NodeId) -> Result<&mut Projection, RenderError> {
        match &mut self.node_mut(camera)?.kind {
            NodeKind::Camera(p) => Ok(p),
            _ => Err(RenderError::NotACamera(camera)),
        }
    }

    /// Projection times inverse camera world matrix.
    pub fn view_projection(&self, camera: NodeId) -> Result<Mat4, RenderError> {
        let projection = self.projection(camera)?.matrix();
        let view = self.world_matrix(camera)?.inverse();
        Ok(projection * view)
    }

    /// Every mesh node with its world matrix, in insertion order.
    pub fn mesh_instances(&self) -> Vec<(NodeId, MeshId, MaterialId, Mat4)> {
        self.iter()
            .filter_map(|(id, node)| match node.kind {
                NodeKind::Mesh { mesh, material } => self
                    .world_matrix(id)
                    .ok()
                    .map(|m| (id, mesh, material, m)),
                _ => None,
            })
            .collect()
    }

    /// Sum the light nodes. The first directional light wins the direction.
    pub fn lights(&self) -> SceneLights {
        let mut lights = SceneLights::default();
        let mut have_sun = false;
        for (id, node) in self.iter() {
            match node.kind {
                NodeKind::AmbientLight { color, intensity } => {
                    lights.ambient += color * intensity;
                }
                NodeKind::DirectionalLight { color, intensity } if !have_sun => {
                    let position = self
                        .world_matrix(id)
                        .map(|m| m.w_axis.truncate())
                        .unwrap_or(Vec3::Y);
                    lights.sun_direction = position.try_normalize().unwrap_or(Vec3::Y);
                    lights.sun_color = color * intensity;
                    have_sun = true;
                }
                _ => {}
            }
        }
        lights
    }

    pub fn background(&self) -> Vec3 {
        self.background
    }

    pub fn set_background(&mut self, color: Vec3) {
        self.background = color;
    }
}
