use crate::discretization::mesh::Grid;
use crate::error::SimulationError;
use crate::numerics::simulator::FluidSimulator;
use crate::physics::FluidProperties;
use crate::physics::obstacle::{Circle, Obstacle, Rectangle};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid scenario: {0}")]
    Simulation(#[from] SimulationError),
}

/// A complete run: fluid, domain, time stepping and initial scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub fluid: FluidConfig,
    pub domain: DomainConfig,
    pub run: RunConfig,
    pub perturbations: Vec<PressurePerturbation>,
    pub obstacles: Vec<ObstacleConfig>,
    pub streamlines: Vec<StreamlineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidConfig {
    pub density: f64,
    pub viscosity: f64,
    pub speed_of_sound: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub size: f64,
    pub resolution: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dt: f64,
    pub steps: u64,
    /// Write a field snapshot every this many steps (0 disables snapshots).
    pub output_every: u64,
    pub output_dir: PathBuf,
    /// How many times a diverging step may halve `dt` before giving up.
    pub max_dt_halvings: u32,
}

/// Sets the pressure of the cell nearest `(x, y)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressurePerturbation {
    pub x: f64,
    pub y: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObstacleConfig {
    Rectangle { min: [f64; 2], max: [f64; 2] },
    Circle { centre: [f64; 2], radius: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamlineConfig {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub spacing: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fluid: FluidConfig::default(),
            domain: DomainConfig::default(),
            run: RunConfig::default(),
            perturbations: vec![PressurePerturbation {
                x: 50.0,
                y: 50.0,
                pressure: 10.0,
            }],
            obstacles: vec![ObstacleConfig::Rectangle {
                min: [90.0, 90.0],
                max: [110.0, 130.0],
            }],
            streamlines: Vec::new(),
        }
    }
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            viscosity: 1.0e-3,
            speed_of_sound: 1.0,
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            size: 200.0,
            resolution: 40,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dt: 1e-5,
            steps: 1000,
            output_every: 100,
            output_dir: PathBuf::from("output"),
            max_dt_halvings: 8,
        }
    }
}

impl ObstacleConfig {
    pub fn to_obstacle(&self) -> Box<dyn Obstacle> {
        match *self {
            ObstacleConfig::Rectangle { min, max } => {
                Box::new(Rectangle::new(DVec2::from(min), DVec2::from(max)))
            }
            ObstacleConfig::Circle { centre, radius } => {
                Box::new(Circle::new(DVec2::from(centre), radius))
            }
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&yaml)?)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Like [`load`](Self::load), but a missing or broken file yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("{} not found; using default scenario", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("{e}; using default scenario");
                Self::default()
            }
        }
    }

    pub fn fluid_properties(&self) -> FluidProperties {
        FluidProperties::new(
            self.fluid.density,
            self.fluid.viscosity,
            self.fluid.speed_of_sound,
        )
    }

    /// Build the simulator and apply obstacles and initial perturbations.
    pub fn build_simulator(&self) -> Result<FluidSimulator, ConfigError> {
        let mut sim = FluidSimulator::new(
            self.fluid_properties(),
            self.domain.size,
            self.domain.resolution,
        )?;
        for obstacle in &self.obstacles {
            sim.add_obstacle(obstacle.to_obstacle().as_ref())?;
        }
        for p in &self.perturbations {
            let cell = sim
                .grid()
                .nearest_cell(DVec2::new(p.x, p.y))
                .ok_or(SimulationError::EmptyGrid)?;
            sim.set_pressure(cell, p.pressure)?;
        }
        Ok(sim)
    }
}
