use glam::Vec3;
use realm_terrain::{Ray, Terrain};

/// Where a straight-down probe met the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    /// Distance from the probe origin down to `point`.
    pub distance: f32,
}

/// Something the player can stand on.
pub trait GroundProbe {
    /// Cast straight down from `origin`. `None` means nothing below.
    fn probe(&self, origin: Vec3) -> Option<GroundHit>;
}

impl GroundProbe for Terrain {
    fn probe(&self, origin: Vec3) -> Option<GroundHit> {
        self.raycast(&Ray::down(origin), f32::INFINITY)
            .map(|hit| GroundHit {
                point: hit.point,
                distance: hit.distance,
            })
    }
}

/// An endless horizontal plane at `height`, visible only from above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundProbe for FlatGround {
    fn probe(&self, origin: Vec3) -> Option<GroundHit> {
        (origin.y >= self.height).then(|| GroundHit {
            point: Vec3::new(origin.x, self.height, origin.z),
            distance: origin.y - self.height,
        })
    }
}

/// Nothing to stand on anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGround;

impl GroundProbe for NoGround {
    fn probe(&self, _origin: Vec3) -> Option<GroundHit> {
        None
    }
}
