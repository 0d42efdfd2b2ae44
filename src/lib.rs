pub mod config;
pub mod discretization;
pub mod error;
pub mod numerics;
pub mod physics;
pub mod processing;

pub use discretization::generator::RegularGrid;
pub use discretization::mesh::{CellBounds, CellId, Direction, Grid};
pub use error::{Result, SimulationError};
pub use numerics::simulator::{FluidSimulator, StepReport};
pub use physics::FluidProperties;
pub use physics::control_volume::ControlVolume;
pub use physics::obstacle::{Circle, Obstacle, Rectangle};
