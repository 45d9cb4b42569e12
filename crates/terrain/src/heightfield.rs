use glam::Vec3;
use realm_common::MeshData;
use serde::{Deserialize, Serialize};

/// Errors from terrain construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    #[error("terrain size must be positive and finite, got {0}")]
    InvalidSize(f32),
    #[error("terrain resolution must be in 1..={max}, got {0}", max = TerrainConfig::MAX_RESOLUTION)]
    InvalidResolution(u32),
}

/// Domain size and grid resolution of the generated terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of the square domain, centred on the origin.
    pub size: f32,
    /// Number of grid segments per axis.
    pub resolution: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            resolution: 200,
        }
    }
}

impl TerrainConfig {
    /// Largest accepted resolution. Keeps vertex indices well inside `u32`
    /// and the vertex buffer in the tens of millions.
    pub const MAX_RESOLUTION: u32 = 4096;

    pub fn validate(&self) -> Result<(), TerrainError> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(TerrainError::InvalidSize(self.size));
        }
        if self.resolution == 0 || self.resolution > Self::MAX_RESOLUTION {
            return Err(TerrainError::InvalidResolution(self.resolution));
        }
        Ok(())
    }

    /// Edge length of one grid segment.
    pub fn segment_size(&self) -> f32 {
        self.size / self.resolution as f32
    }

    pub fn half_size(&self) -> f32 {
        self.size / 2.0
    }

    /// Vertices per grid row.
    pub fn row_len(&self) -> usize {
        self.resolution as usize + 1
    }
}

/// Surface height at horizontal position `(x, z)`: two long waves plus a
/// diagonal hill band.
pub fn height_at(x: f32, z: f32) -> f32 {
    (x * 0.05).sin() * 2.0 + (z * 0.05).cos() * 2.0 + ((x + z) * 0.02).sin() * 4.0
}

/// The generated height field.
///
/// Vertices are stored row by row: row `iy` lies at `z = iy * seg - size / 2`
/// and column `ix` at `x = ix * seg - size / 2`. Each grid cell holds two
/// triangles wound so that their faces point up.
#[derive(Debug, Clone)]
pub struct Terrain {
    config: TerrainConfig,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

impl Terrain {
    /// Build the height field for `config`.
    pub fn generate(config: TerrainConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let _span = tracing::info_span!(
            "terrain_generate",
            size = config.size,
            resolution = config.resolution
        )
        .entered();

        let segments = config.resolution as usize;
        let row = config.row_len();
        let seg = config.segment_size();
        let half = config.half_size();

        let mut positions = Vec::with_capacity(row * row);
        let mut uvs = Vec::with_capacity(row * row);
        for iy in 0..row {
            let z = iy as f32 * seg - half;
            for ix in 0..row {
                let x = ix as f32 * seg - half;
                positions.push(Vec3::new(x, height_at(x, z), z));
                uvs.push([
                    ix as f32 / segments as f32,
                    1.0 - iy as f32 / segments as f32,
                ]);
            }
        }

        let mut indices = Vec::with_capacity(segments * segments * 6);
        for iy in 0..segments {
            for ix in 0..segments {
                let a = (ix + row * iy) as u32;
                let b = (ix + row * (iy + 1)) as u32;
                let c = (ix + 1 + row * (iy + 1)) as u32;
                let d = (ix + 1 + row * iy) as u32;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        let mut terrain = Self {
            config,
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            uvs,
            indices,
        };
        terrain.compute_normals();

        let (lo, hi) = terrain.height_range();
        tracing::debug!(
            vertices = terrain.vertex_count(),
            triangles = terrain.triangle_count(),
            "terrain generated, heights {lo:.2}..{hi:.2}"
        );
        Ok(terrain)
    }

    /// Recompute vertex normals via area-weighted face normal accumulation.
    fn compute_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }

        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let edge1 = self.positions[i1] - p0;
            let edge2 = self.positions[i2] - p0;
            // Length = 2x triangle area
            let face_normal = edge1.cross(edge2);
            for idx in [i0, i1, i2] {
                self.normals[idx] += face_normal;
            }
        }

        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[[f32; 2]] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex at grid column `ix`, row `iy`.
    pub fn vertex(&self, ix: usize, iy: usize) -> Option<Vec3> {
        let row = self.config.row_len();
        if ix >= row || iy >= row {
            return None;
        }
        self.positions.get(iy * row + ix).copied()
    }

    /// Lowest and highest vertex height.
    pub fn height_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)))
    }

    /// Export the surface for upload to a render backend.
    pub fn mesh_data(&self) -> MeshData {
        MeshData {
            positions: self.positions.iter().map(|p| p.to_array()).collect(),
            normals: self.normals.iter().map(|n| n.to_array()).collect(),
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
        }
    }
}
