use crate::discretization::mesh::{CellId, Direction};
use glam::DVec2;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{direction} neighbour distance must be positive and finite, got {distance}")]
    NonPositiveDistance { direction: Direction, distance: f64 },
    #[error("grid contains no cells")]
    EmptyGrid,
    #[error("cell {0} does not exist in the grid")]
    UnknownCell(CellId),
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),
    /// Raised before commit; the grid still holds the pre-step state.
    #[error("step diverged at cell {cell}: pressure={pressure}, velocity={velocity}")]
    UnstableStep {
        cell: CellId,
        pressure: f64,
        velocity: DVec2,
    },
    #[error("invalid obstacle: {0}")]
    InvalidObstacle(String),
    #[error("invalid fluid properties: {0}")]
    InvalidFluidProperties(String),
    #[error("invalid domain: size={size}, resolution={resolution}")]
    InvalidDomain { size: f64, resolution: usize },
    #[error("invalid streamline: total_length={total_length}, step_spacing={step_spacing}")]
    InvalidStreamline {
        total_length: f64,
        step_spacing: f64,
    },
}

pub type Result<T> = std::result::Result<T, SimulationError>;
