use glam::{Mat4, Quat, Vec3};
use realm_common::Transform;
use realm_input::CameraOrientation;
use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, NodeKind, RenderError, SceneGraph};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with a 0..1 depth range.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Track the viewport's aspect ratio. A zero-sized viewport is ignored.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// First-person camera rig: a yaw pivot carrying a pitch pivot carrying the
/// camera. Yaw turns about world up, pitch about the yawed right axis, so the
/// horizon never rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRig {
    pub yaw: NodeId,
    pub pitch: NodeId,
    pub camera: NodeId,
}

impl CameraRig {
    pub fn build(
        scene: &mut SceneGraph,
        projection: Projection,
        position: Vec3,
    ) -> Result<Self, RenderError> {
        let yaw = scene.add(NodeKind::Group, Transform::from_position(position));
        let pitch = scene.add(NodeKind::Group, Transform::default());
        let camera = scene.add(NodeKind::Camera(projection), Transform::default());
        scene.attach(pitch, yaw)?;
        scene.attach(camera, pitch)?;
        Ok(Self { yaw, pitch, camera })
    }

    /// Place the rig at `position` looking along `orientation`.
    pub fn pose(
        &self,
        scene: &mut SceneGraph,
        position: Vec3,
        orientation: &CameraOrientation,
    ) -> Result<(), RenderError> {
        scene.set_transform(
            self.yaw,
            Transform {
                position,
                rotation: Quat::from_rotation_y(orientation.yaw),
                ..Transform::default()
            },
        )?;
        scene.set_transform(
            self.pitch,
            Transform::from_rotation(Quat::from_rotation_x(orientation.pitch)),
        )
    }

    /// Camera position in world space.
    pub fn eye(&self, scene: &SceneGraph) -> Result<Vec3, RenderError> {
        Ok(scene.world_matrix(self.camera)?.w_axis.truncate())
    }

    /// Unit view direction in world space.
    pub fn forward(&self, scene: &SceneGraph) -> Result<Vec3, RenderError> {
        Ok(scene
            .world_matrix(self.camera)?
            .transform_vector3(Vec3::NEG_Z)
            .normalize_or_zero())
    }
}
