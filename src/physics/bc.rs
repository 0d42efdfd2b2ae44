use crate::discretization::mesh::{CellId, Direction, Grid};
use crate::physics::FluidProperties;
use crate::physics::control_volume::{ControlVolume, Neighbour, Stencil};

/// Ghost state substituted wherever a cell has no real neighbour.
///
/// The ghost is a static wall: zero velocity, zero pressure, the domain's
/// fluid constants. Its distance is one nominal cell width,
/// `scale / resolution`, independent of the size of the cell asking.
#[derive(Clone, Debug)]
pub struct EdgePolicy {
    pub ghost: ControlVolume,
    pub distance: f64,
}

impl EdgePolicy {
    pub fn static_wall<G: Grid>(grid: &G, properties: FluidProperties) -> Self {
        Self {
            ghost: ControlVolume::at_rest(properties),
            distance: edge_displacement(grid),
        }
    }

    /// Neighbour of `id` in `direction`, or the ghost at a domain edge.
    ///
    /// Real neighbours are placed at the absolute centre offset along the
    /// direction's axis.
    pub fn neighbour<'a, G: Grid>(
        &'a self,
        grid: &'a G,
        id: CellId,
        direction: Direction,
    ) -> Neighbour<'a> {
        match grid.neighbour(id, direction) {
            Some(other) => Neighbour::new(
                grid.volume(other),
                direction.axis_distance(grid.coordinates(id), grid.coordinates(other)),
            ),
            None => Neighbour::new(&self.ghost, self.distance),
        }
    }

    pub fn stencil<'a, G: Grid>(&'a self, grid: &'a G, id: CellId) -> Stencil<'a> {
        Stencil {
            left: self.neighbour(grid, id, Direction::Left),
            right: self.neighbour(grid, id, Direction::Right),
            top: self.neighbour(grid, id, Direction::Top),
            bottom: self.neighbour(grid, id, Direction::Bottom),
        }
    }
}

/// One nominal cell width of the grid.
#[inline]
pub fn edge_displacement<G: Grid>(grid: &G) -> f64 {
    grid.scale() / grid.resolution() as f64
}
