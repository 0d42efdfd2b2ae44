use super::mesh::{CellBounds, CellId, Direction, Grid};
use crate::physics::control_volume::ControlVolume;
use glam::DVec2;

/// Uniform `resolution × resolution` grid over the square `[0, scale]²`.
///
/// Cell `(i, j)` is stored row-major at id `j * resolution + i`, with `i`
/// increasing to the right and `j` increasing to the top.
#[derive(Clone, Debug)]
pub struct RegularGrid {
    scale: f64,
    resolution: usize,
    volumes: Vec<ControlVolume>,
}

impl RegularGrid {
    /// Build a grid of rest-state control volumes.
    pub fn new(scale: f64, resolution: usize) -> Self {
        Self {
            scale,
            resolution,
            volumes: vec![ControlVolume::default(); resolution * resolution],
        }
    }

    /// Width of one cell.
    pub fn spacing(&self) -> f64 {
        self.scale / self.resolution as f64
    }

    /// Id of the cell at column `i`, row `j`.
    pub fn cell_at(&self, i: usize, j: usize) -> Option<CellId> {
        (i < self.resolution && j < self.resolution).then(|| CellId(j * self.resolution + i))
    }

    /// Column and row of a cell.
    pub fn index_of(&self, id: CellId) -> (usize, usize) {
        (id.0 % self.resolution, id.0 / self.resolution)
    }

    fn clamp_index(&self, coord: f64) -> usize {
        let h = self.spacing();
        let raw = (coord.clamp(0.0, self.scale) / h).floor();
        (raw as usize).min(self.resolution - 1)
    }
}

impl Grid for RegularGrid {
    fn cell_ids(&self) -> Vec<CellId> {
        (0..self.volumes.len()).map(CellId).collect()
    }

    fn cell_count(&self) -> usize {
        self.volumes.len()
    }

    fn contains(&self, id: CellId) -> bool {
        id.0 < self.volumes.len()
    }

    fn neighbour(&self, id: CellId, direction: Direction) -> Option<CellId> {
        let (i, j) = self.index_of(id);
        match direction {
            Direction::Left => i.checked_sub(1).and_then(|i| self.cell_at(i, j)),
            Direction::Right => self.cell_at(i + 1, j),
            Direction::Top => self.cell_at(i, j + 1),
            Direction::Bottom => j.checked_sub(1).and_then(|j| self.cell_at(i, j)),
        }
    }

    fn coordinates(&self, id: CellId) -> DVec2 {
        let (i, j) = self.index_of(id);
        let h = self.spacing();
        DVec2::new((i as f64 + 0.5) * h, (j as f64 + 0.5) * h)
    }

    fn bounds(&self, id: CellId) -> CellBounds {
        let (i, j) = self.index_of(id);
        let h = self.spacing();
        let min = DVec2::new(i as f64 * h, j as f64 * h);
        CellBounds::new(min, min + DVec2::splat(h))
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn resolution(&self) -> usize {
        self.resolution
    }

    fn nearest_cell(&self, point: DVec2) -> Option<CellId> {
        if self.volumes.is_empty() {
            return None;
        }
        self.cell_at(self.clamp_index(point.x), self.clamp_index(point.y))
    }

    fn volume(&self, id: CellId) -> &ControlVolume {
        &self.volumes[id.0]
    }

    fn volume_mut(&mut self, id: CellId) -> &mut ControlVolume {
        &mut self.volumes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centres_sit_half_a_cell_in() {
        let grid = RegularGrid::new(2.0, 4);
        let id = grid.cell_at(1, 3).unwrap();
        assert_eq!(id, CellId(13));
        assert_eq!(grid.coordinates(id), DVec2::new(0.75, 1.75));
        assert_eq!(grid.index_of(id), (1, 3));
    }

    #[test]
    fn edge_cells_have_no_outward_neighbour() {
        let grid = RegularGrid::new(1.0, 3);
        let corner = grid.cell_at(0, 0).unwrap();
        assert_eq!(grid.neighbour(corner, Direction::Left), None);
        assert_eq!(grid.neighbour(corner, Direction::Bottom), None);
        assert_eq!(grid.neighbour(corner, Direction::Right), grid.cell_at(1, 0));
        assert_eq!(grid.neighbour(corner, Direction::Top), grid.cell_at(0, 1));

        let far = grid.cell_at(2, 2).unwrap();
        assert_eq!(grid.neighbour(far, Direction::Right), None);
        assert_eq!(grid.neighbour(far, Direction::Top), None);
    }

    #[test]
    fn nearest_cell_clamps_outside_points() {
        let grid = RegularGrid::new(10.0, 5);
        assert_eq!(grid.nearest_cell(DVec2::new(-3.0, 4.1)), grid.cell_at(0, 2));
        assert_eq!(grid.nearest_cell(DVec2::new(10.0, 10.0)), grid.cell_at(4, 4));
        assert_eq!(grid.nearest_cell(DVec2::new(5.5, 0.1)), grid.cell_at(2, 0));
    }

    #[test]
    fn empty_grid_has_no_nearest_cell() {
        let grid = RegularGrid::new(1.0, 0);
        assert_eq!(grid.cell_count(), 0);
        assert_eq!(grid.nearest_cell(DVec2::ZERO), None);
    }

    #[test]
    fn bounds_tile_the_domain() {
        let grid = RegularGrid::new(3.0, 3);
        let total: f64 = grid.cell_ids().iter().map(|&id| grid.bounds(id).area()).sum();
        assert!((total - 9.0).abs() < 1e-12);
    }
}
