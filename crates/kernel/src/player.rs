use glam::Vec3;
use serde::{Deserialize, Serialize};

/// When a held jump key launches the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpTrigger {
    /// Every grounded frame the key is held. Holding the key hops continuously.
    #[default]
    Held,
    /// Only on the frame the key goes down.
    Pressed,
}

/// Player tuning. Speeds and accelerations are per frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Eye height above the ground point.
    pub height: f32,
    /// Body radius. Not used by ground detection.
    pub radius: f32,
    /// Horizontal distance per frame per held direction key.
    pub move_speed: f32,
    /// Yaw change per frame while a turn key is held (radians).
    pub turn_speed: f32,
    /// Subtracted from vertical velocity every frame.
    pub gravity: f32,
    /// Vertical velocity set by a jump.
    pub jump_force: f32,
    pub sprint_multiplier: f32,
    /// Slack added to `height` when deciding whether the ground is in reach.
    pub ground_tolerance: f32,
    pub spawn: Vec3,
    pub jump_trigger: JumpTrigger,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            height: 2.0,
            radius: 0.4,
            move_speed: 0.05,
            turn_speed: 0.03,
            gravity: 0.01,
            jump_force: 0.2,
            sprint_multiplier: 3.0,
            ground_tolerance: 0.05,
            spawn: Vec3::new(0.0, 100.0, 0.0),
            jump_trigger: JumpTrigger::Held,
        }
    }
}

impl PlayerConfig {
    /// Largest probe distance that still counts as standing.
    pub fn ground_reach(&self) -> f32 {
        self.height + self.ground_tolerance
    }
}

/// Mutable kinematic state of the player. `position` is the eye point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub on_ground: bool,
}

impl PlayerState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            vertical_velocity: 0.0,
            on_ground: false,
        }
    }
}
