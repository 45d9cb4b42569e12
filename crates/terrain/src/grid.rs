use glam::Vec2;

use crate::heightfield::{Terrain, TerrainConfig};

/// A cell of the terrain grid: column `x` counts along +X, row `z` along +Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Inclusive rectangle of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellSpan {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellSpan {
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (self.min.z..=self.max.z)
            .flat_map(move |z| (self.min.x..=self.max.x).map(move |x| CellCoord::new(x, z)))
    }
}

/// Cell containing the horizontal point `(x, z)`, or `None` outside the domain.
pub(crate) fn cell_at(config: &TerrainConfig, x: f32, z: f32) -> Option<CellCoord> {
    let half = config.half_size();
    if !(-half..=half).contains(&x) || !(-half..=half).contains(&z) {
        return None;
    }
    let last = config.resolution as i32 - 1;
    Some(CellCoord::new(
        axis_cell(config, x).clamp(0, last),
        axis_cell(config, z).clamp(0, last),
    ))
}

/// Cells under the horizontal segment `a..b`, padded by one cell on each side
/// so that points on shared edges see both neighbours. `None` when the segment
/// misses the domain entirely.
pub(crate) fn cells_under(config: &TerrainConfig, a: Vec2, b: Vec2) -> Option<CellSpan> {
    let half = config.half_size();
    let lo = a.min(b);
    let hi = a.max(b);
    if hi.x < -half || lo.x > half || hi.y < -half || lo.y > half {
        return None;
    }
    let last = config.resolution as i32 - 1;
    let clamp = |c: i32| c.clamp(0, last);
    Some(CellSpan {
        min: CellCoord::new(
            clamp(axis_cell(config, lo.x) - 1),
            clamp(axis_cell(config, lo.y) - 1),
        ),
        max: CellCoord::new(
            clamp(axis_cell(config, hi.x) + 1),
            clamp(axis_cell(config, hi.y) + 1),
        ),
    })
}

/// Triangle indices (into the index buffer, in units of triangles) of a cell.
pub(crate) fn cell_triangles(config: &TerrainConfig, cell: CellCoord) -> [usize; 2] {
    let first = 2 * (cell.z as usize * config.resolution as usize + cell.x as usize);
    [first, first + 1]
}

impl Terrain {
    /// Grid cell under the horizontal point `(x, z)`.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<CellCoord> {
        cell_at(self.config(), x, z)
    }
}

fn axis_cell(config: &TerrainConfig, v: f32) -> i32 {
    ((v + config.half_size()) / config.segment_size()).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TerrainConfig {
        TerrainConfig {
            size: 10.0,
            resolution: 5,
        }
    }

    #[test]
    fn cell_at_maps_corners_and_centre() {
        let c = config();
        assert_eq!(cell_at(&c, -5.0, -5.0), Some(CellCoord::new(0, 0)));
        assert_eq!(cell_at(&c, 5.0, 5.0), Some(CellCoord::new(4, 4)));
        assert_eq!(cell_at(&c, 0.1, -0.1), Some(CellCoord::new(2, 2)));
        assert_eq!(cell_at(&c, 5.1, 0.0), None);
    }

    #[test]
    fn point_span_is_padded() {
        let c = config();
        let p = Vec2::new(0.5, 0.5);
        let span = cells_under(&c, p, p).unwrap();
        assert_eq!(span.min, CellCoord::new(1, 1));
        assert_eq!(span.max, CellCoord::new(3, 3));
        assert_eq!(span.cells().count(), 9);
    }

    #[test]
    fn span_clamps_to_grid() {
        let c = config();
        let span = cells_under(&c, Vec2::new(-100.0, -1.0), Vec2::new(100.0, 1.0)).unwrap();
        assert_eq!(span.min.x, 0);
        assert_eq!(span.max.x, 4);
    }

    #[test]
    fn span_outside_domain_is_none() {
        let c = config();
        assert!(cells_under(&c, Vec2::new(6.0, 0.0), Vec2::new(9.0, 0.0)).is_none());
    }

    #[test]
    fn cell_triangles_are_row_major() {
        let c = config();
        assert_eq!(cell_triangles(&c, CellCoord::new(0, 0)), [0, 1]);
        assert_eq!(cell_triangles(&c, CellCoord::new(1, 0)), [2, 3]);
        assert_eq!(cell_triangles(&c, CellCoord::new(0, 1)), [10, 11]);
    }
}
