use realm_input::CameraOrientation;
use realm_kernel::{FrameEvent, Simulation};
use realm_terrain::Terrain;
use serde::Serialize;

/// Read-only views of the running simulation for debug overlays.
pub struct FrameInspector;

impl FrameInspector {
    /// Snapshot the player and view after the latest step.
    pub fn summary(simulation: &Simulation, orientation: &CameraOrientation) -> FrameSummary {
        let player = simulation.player();
        let (landings, jumps) = simulation
            .events()
            .iter()
            .fold((0, 0), |(l, j), event| match event {
                FrameEvent::Landed { .. } => (l + 1, j),
                FrameEvent::Jumped { .. } => (l, j + 1),
            });
        FrameSummary {
            tick: simulation.tick(),
            position: player.position.to_array(),
            vertical_velocity: player.vertical_velocity,
            on_ground: player.on_ground,
            yaw: orientation.yaw,
            pitch: orientation.pitch,
            landings,
            jumps,
        }
    }

    pub fn terrain(terrain: &Terrain) -> TerrainSummary {
        let config = terrain.config();
        let (min_height, max_height) = terrain.height_range();
        TerrainSummary {
            size: config.size,
            resolution: config.resolution,
            vertices: terrain.vertex_count(),
            triangles: terrain.triangle_count(),
            min_height,
            max_height,
        }
    }
}

/// Player state at one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub tick: u64,
    pub position: [f32; 3],
    pub vertical_velocity: f32,
    pub on_ground: bool,
    pub yaw: f32,
    pub pitch: f32,
    /// Landings in the undrained event log.
    pub landings: usize,
    pub jumps: usize,
}

impl std::fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.position;
        write!(
            f,
            "tick={} pos=({x:.2}, {y:.2}, {z:.2}) vy={:.3} {} yaw={:.3} pitch={:.3}",
            self.tick,
            self.vertical_velocity,
            if self.on_ground { "grounded" } else { "airborne" },
            self.yaw,
            self.pitch,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TerrainSummary {
    pub size: f32,
    pub resolution: u32,
    pub vertices: usize,
    pub triangles: usize,
    pub min_height: f32,
    pub max_height: f32,
}

impl std::fmt::Display for TerrainSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Terrain: {}x{} units, {} segments, {} vertices, {} triangles, heights {:.2}..{:.2}",
            self.size,
            self.size,
            self.resolution,
            self.vertices,
            self.triangles,
            self.min_height,
            self.max_height
        )
    }
}
