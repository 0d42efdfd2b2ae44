use crate::discretization::generator::RegularGrid;
use crate::discretization::mesh::{CellId, Grid};
use crate::error::{Result, SimulationError};
use crate::numerics::timing::{record_commit, record_compute, record_mask};
use crate::physics::FluidProperties;
use crate::physics::bc::EdgePolicy;
use crate::physics::control_volume::{ControlVolume, StateUpdate};
use crate::physics::obstacle::Obstacle;
use glam::DVec2;

/// Outcome of one successful [`FluidSimulator::step`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Number of steps taken so far, including this one.
    pub step: u64,
    /// Simulated time after this step [s].
    pub elapsed: f64,
    pub cells: usize,
    /// Cells forced to rest by an obstacle.
    pub masked_cells: usize,
}

/// Explicit control-volume flow solver over a grid it owns.
///
/// Every step is Jacobi-style: all next states are computed from the
/// previous step's committed values, staged, and only then committed.
pub struct FluidSimulator<G: Grid = RegularGrid> {
    properties: FluidProperties,
    grid: G,
    obstacles: Vec<Box<dyn Obstacle>>,
    steps: u64,
    elapsed: f64,
}

impl FluidSimulator<RegularGrid> {
    /// Simulator over a square domain of side `simulation_size` split into
    /// `initial_resolution²` equal cells.
    ///
    /// Resolutions whose cell storage would not fit in memory addressing are
    /// rejected as [`SimulationError::InvalidDomain`].
    pub fn new(
        properties: FluidProperties,
        simulation_size: f64,
        initial_resolution: usize,
    ) -> Result<Self> {
        let addressable = initial_resolution
            .checked_mul(initial_resolution)
            .and_then(|cells| cells.checked_mul(std::mem::size_of::<ControlVolume>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !(simulation_size.is_finite() && simulation_size > 0.0)
            || initial_resolution == 0
            || !addressable
        {
            return Err(SimulationError::InvalidDomain {
                size: simulation_size,
                resolution: initial_resolution,
            });
        }
        Self::with_grid(
            properties,
            RegularGrid::new(simulation_size, initial_resolution),
        )
    }
}

impl<G: Grid> FluidSimulator<G> {
    /// Take ownership of `grid` and give every cell the fluid constants.
    pub fn with_grid(properties: FluidProperties, mut grid: G) -> Result<Self> {
        properties.validate()?;
        prepare_grid(&mut grid, properties)?;
        Ok(Self {
            properties,
            grid,
            obstacles: Vec::new(),
            steps: 0,
            elapsed: 0.0,
        })
    }

    pub fn properties(&self) -> FluidProperties {
        self.properties
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Swap in a new grid, returning the old one.
    pub fn replace_grid(&mut self, mut grid: G) -> Result<G> {
        prepare_grid(&mut grid, self.properties)?;
        Ok(std::mem::replace(&mut self.grid, grid))
    }

    pub fn into_grid(self) -> G {
        self.grid
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed
    }

    pub fn volume(&self, id: CellId) -> Result<&ControlVolume> {
        self.check_cell(id)?;
        Ok(self.grid.volume(id))
    }

    pub fn set_pressure(&mut self, id: CellId, pressure: f64) -> Result<()> {
        self.check_cell(id)?;
        self.grid.volume_mut(id).set_pressure(pressure);
        Ok(())
    }

    pub fn set_velocity(&mut self, id: CellId, velocity: DVec2) -> Result<()> {
        self.check_cell(id)?;
        self.grid.volume_mut(id).set_velocity(velocity);
        Ok(())
    }

    /// Store an independent copy of `obstacle`.
    pub fn add_obstacle(&mut self, obstacle: &dyn Obstacle) -> Result<()> {
        if !obstacle.is_valid() {
            return Err(SimulationError::InvalidObstacle(format!("{obstacle:?}")));
        }
        log::trace!("adding obstacle {obstacle:?}");
        self.obstacles.push(obstacle.box_clone());
        Ok(())
    }

    /// Independent copies of the registered obstacles.
    pub fn obstacles(&self) -> Vec<Box<dyn Obstacle>> {
        self.obstacles.clone()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn clear_obstacles(&mut self) {
        self.obstacles.clear();
    }

    /// Whether any registered obstacle overlaps the cell.
    pub fn is_masked(&self, id: CellId) -> bool {
        let bounds = self.grid.bounds(id);
        self.obstacles.iter().any(|o| o.overlaps(&bounds))
    }

    /// Advance every cell by `dt`.
    ///
    /// On [`SimulationError::UnstableStep`] nothing has been committed: the
    /// grid still holds the state from before the call.
    pub fn step(&mut self, dt: f64) -> Result<StepReport> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimulationError::InvalidTimeStep(dt));
        }

        let ids = self.grid.cell_ids();

        for &id in &ids {
            self.grid.volume_mut(id).reset_staging();
        }

        let updates = record_compute(|| self.compute_updates(&ids, dt))?;
        for (&id, &update) in ids.iter().zip(&updates) {
            self.grid.volume_mut(id).stage(update);
        }

        self.check_staged(&ids)?;

        record_commit(|| {
            for &id in &ids {
                self.grid.volume_mut(id).commit();
            }
        });

        let masked_cells = record_mask(|| self.apply_obstacle_mask(&ids));

        self.steps += 1;
        self.elapsed += dt;
        log::debug!(
            "step {} | t = {:.4e} | dt = {:.3e} | cells = {} | masked = {}",
            self.steps,
            self.elapsed,
            dt,
            ids.len(),
            masked_cells
        );

        Ok(StepReport {
            step: self.steps,
            elapsed: self.elapsed,
            cells: ids.len(),
            masked_cells,
        })
    }

    /// Next state of every cell, read from committed values only.
    fn compute_updates(&self, ids: &[CellId], dt: f64) -> Result<Vec<StateUpdate>> {
        let edge = EdgePolicy::static_wall(&self.grid, self.properties);
        ids.iter()
            .map(|&id| {
                let stencil = edge.stencil(&self.grid, id);
                self.grid.volume(id).compute_update(&stencil, dt)
            })
            .collect()
    }

    fn check_staged(&self, ids: &[CellId]) -> Result<()> {
        for &id in ids {
            let staged = self.grid.volume(id).staged();
            if staged.is_finite() || self.is_masked(id) {
                continue;
            }
            log::warn!(
                "step {} diverged at cell {id} ({:?}): p={}, v={}",
                self.steps + 1,
                self.grid.coordinates(id),
                staged.pressure,
                staged.velocity
            );
            return Err(SimulationError::UnstableStep {
                cell: id,
                pressure: staged.pressure,
                velocity: staged.velocity,
            });
        }
        Ok(())
    }

    fn apply_obstacle_mask(&mut self, ids: &[CellId]) -> usize {
        if self.obstacles.is_empty() {
            return 0;
        }
        let mut masked = 0;
        for &id in ids {
            if self.is_masked(id) {
                self.grid.volume_mut(id).rest();
                masked += 1;
            }
        }
        masked
    }

    fn check_cell(&self, id: CellId) -> Result<()> {
        if self.grid.contains(id) {
            Ok(())
        } else {
            Err(SimulationError::UnknownCell(id))
        }
    }
}

fn prepare_grid<G: Grid>(grid: &mut G, properties: FluidProperties) -> Result<()> {
    if grid.cell_count() == 0 {
        return Err(SimulationError::EmptyGrid);
    }
    let (scale, resolution) = (grid.scale(), grid.resolution());
    if !(scale.is_finite() && scale > 0.0) || resolution == 0 {
        return Err(SimulationError::InvalidDomain {
            size: scale,
            resolution,
        });
    }
    for id in grid.cell_ids() {
        let volume = grid.volume_mut(id);
        volume.assign_properties(properties);
        volume.reset_staging();
    }
    Ok(())
}
