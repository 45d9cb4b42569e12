use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

/// View rotation in radians. Yaw turns about +Y, pitch about the local X axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraOrientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraOrientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}

/// Mouse-look tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookConfig {
    /// Radians per unit of raw mouse motion.
    pub sensitivity: f32,
    /// Gap kept between |pitch| and π/2.
    pub pitch_margin: f32,
}

impl Default for LookConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.002,
            pitch_margin: 0.01,
        }
    }
}

/// Applies raw mouse motion to a [`CameraOrientation`] while the pointer is
/// locked.
#[derive(Debug, Clone)]
pub struct LookControl {
    config: LookConfig,
    locked: bool,
}

impl LookControl {
    pub fn new(config: LookConfig) -> Self {
        Self {
            config,
            locked: false,
        }
    }

    pub fn config(&self) -> &LookConfig {
        &self.config
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            tracing::debug!(locked, "pointer lock changed");
        }
        self.locked = locked;
    }

    /// Largest allowed |pitch|.
    pub fn pitch_limit(&self) -> f32 {
        FRAC_PI_2 - self.config.pitch_margin
    }

    /// Rotate by a raw mouse delta. Returns `false` (and leaves the
    /// orientation alone) while the pointer is not locked.
    pub fn apply_motion(&self, orientation: &mut CameraOrientation, dx: f32, dy: f32) -> bool {
        if !self.locked {
            return false;
        }
        orientation.yaw -= dx * self.config.sensitivity;
        orientation.pitch -= dy * self.config.sensitivity;
        let limit = self.pitch_limit();
        orientation.pitch = orientation.pitch.clamp(-limit, limit);
        true
    }
}

impl Default for LookControl {
    fn default() -> Self {
        Self::new(LookConfig::default())
    }
}
