use crate::physics::control_volume::ControlVolume;
use glam::DVec2;
use std::fmt;

/// Opaque handle to a single control volume inside a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub usize);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The four stencil directions. "Top" is +y, "right" is +x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    /// Distance between two cell centres measured along this direction's axis.
    pub fn axis_distance(self, from: DVec2, to: DVec2) -> f64 {
        match self {
            Direction::Left | Direction::Right => (to.x - from.x).abs(),
            Direction::Top | Direction::Bottom => (to.y - from.y).abs(),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// Axis-aligned physical extent of a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl CellBounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn centre(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn area(&self) -> f64 {
        let s = self.size();
        s.x * s.y
    }

    /// Point of the bounds closest to `p` (`p` itself when inside).
    pub fn closest_point(&self, p: DVec2) -> DVec2 {
        p.clamp(self.min, self.max)
    }
}

/// Spatially indexed container of control volumes.
///
/// The simulator only reads topology through this trait and only writes the
/// contents of cells the grid already holds. Layout and refinement belong to
/// the implementation.
pub trait Grid {
    /// All cells, in a stable order.
    fn cell_ids(&self) -> Vec<CellId>;

    fn cell_count(&self) -> usize;

    fn contains(&self, id: CellId) -> bool;

    /// Adjacent cell in `direction`, or `None` at the domain edge.
    fn neighbour(&self, id: CellId, direction: Direction) -> Option<CellId>;

    /// Physical coordinates of the cell centre.
    fn coordinates(&self, id: CellId) -> DVec2;

    fn bounds(&self, id: CellId) -> CellBounds;

    /// Physical side length of the whole domain.
    fn scale(&self) -> f64;

    /// Nominal number of cells along each axis.
    fn resolution(&self) -> usize;

    /// Cell whose centre is closest to `point`; `None` only for an empty grid.
    fn nearest_cell(&self, point: DVec2) -> Option<CellId>;

    fn volume(&self, id: CellId) -> &ControlVolume;

    fn volume_mut(&mut self, id: CellId) -> &mut ControlVolume;
}
