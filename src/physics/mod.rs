pub mod bc;
pub mod control_volume;
pub mod obstacle;

use crate::error::{Result, SimulationError};

/// Fluid constants shared by every control volume of one simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidProperties {
    /// Density [kg/m³]
    pub density: f64,
    /// Kinematic viscosity [m²/s]
    pub viscosity: f64,
    /// Speed of sound [m/s]
    pub speed_of_sound: f64,
}

impl Default for FluidProperties {
    fn default() -> Self {
        Self {
            density: 1.0,
            viscosity: 1.0,
            speed_of_sound: 1.0,
        }
    }
}

impl FluidProperties {
    pub fn new(density: f64, viscosity: f64, speed_of_sound: f64) -> Self {
        Self {
            density,
            viscosity,
            speed_of_sound,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(SimulationError::InvalidFluidProperties(format!(
                "density must be positive, got {}",
                self.density
            )));
        }
        if !(self.viscosity.is_finite() && self.viscosity >= 0.0) {
            return Err(SimulationError::InvalidFluidProperties(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }
        if !(self.speed_of_sound.is_finite() && self.speed_of_sound > 0.0) {
            return Err(SimulationError::InvalidFluidProperties(format!(
                "speed of sound must be positive, got {}",
                self.speed_of_sound
            )));
        }
        Ok(())
    }
}
