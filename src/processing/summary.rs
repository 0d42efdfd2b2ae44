use crate::discretization::mesh::Grid;
use crate::numerics::simulator::FluidSimulator;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub struct SimulationSummary {
    // Grid info
    pub num_cells: usize,
    pub domain_size: f64,
    pub resolution: usize,
    pub cell_width: f64,

    // Fluid constants
    pub density: f64,
    pub viscosity: f64,
    pub speed_of_sound: f64,

    // Obstacles
    pub num_obstacles: usize,
    pub masked_cells: usize,

    // Run info
    pub steps: u64,
    pub elapsed: f64,
    pub dt_reductions: Option<u32>,

    // Field statistics
    pub min_pressure: f64,
    pub max_pressure: f64,
    pub mean_pressure: f64,
    pub max_speed: f64,
    pub kinetic_energy: f64,
}

impl SimulationSummary {
    pub fn from_simulator<G: Grid>(sim: &FluidSimulator<G>) -> Self {
        let grid = sim.grid();
        let props = sim.properties();
        let ids = grid.cell_ids();
        let num_cells = ids.len();

        let pressures: Vec<f64> = ids.iter().map(|&id| grid.volume(id).pressure()).collect();
        let min_pressure = pressures.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_pressure = pressures.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean_pressure = pressures.iter().sum::<f64>() / num_cells.max(1) as f64;

        let max_speed = ids
            .iter()
            .map(|&id| grid.volume(id).velocity().length())
            .fold(0.0, f64::max);

        // Sum of 0.5 * rho * |v|^2 * cell area
        let kinetic_energy = ids
            .iter()
            .map(|&id| {
                0.5 * props.density
                    * grid.volume(id).velocity().length_squared()
                    * grid.bounds(id).area()
            })
            .sum();

        let masked_cells = ids.iter().filter(|&&id| sim.is_masked(id)).count();

        Self {
            num_cells,
            domain_size: grid.scale(),
            resolution: grid.resolution(),
            cell_width: grid.scale() / grid.resolution() as f64,
            density: props.density,
            viscosity: props.viscosity,
            speed_of_sound: props.speed_of_sound,
            num_obstacles: sim.obstacle_count(),
            masked_cells,
            steps: sim.steps_taken(),
            elapsed: sim.elapsed_time(),
            dt_reductions: None,
            min_pressure,
            max_pressure,
            mean_pressure,
            max_speed,
            kinetic_energy,
        }
    }

    pub fn add_dt_reductions(&mut self, reductions: u32) {
        self.dt_reductions = Some(reductions);
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut file = File::create(path)?;

        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file, "CONTROL VOLUME FLOW SIMULATION SUMMARY")?;
        writeln!(file, "{}", "=".repeat(60))?;
        writeln!(file)?;

        writeln!(file, "GRID")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Number of cells:     {}", self.num_cells)?;
        writeln!(file, "Domain size:         {:.6e} m", self.domain_size)?;
        writeln!(file, "Resolution:          {} per axis", self.resolution)?;
        writeln!(file, "Nominal cell width:  {:.6e} m", self.cell_width)?;
        writeln!(file)?;

        writeln!(file, "FLUID")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Density:             {:.6e} kg/m³", self.density)?;
        writeln!(file, "Viscosity:           {:.6e} m²/s", self.viscosity)?;
        writeln!(file, "Speed of sound:      {:.6e} m/s", self.speed_of_sound)?;
        writeln!(file)?;

        writeln!(file, "OBSTACLES")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Obstacles:           {}", self.num_obstacles)?;
        writeln!(file, "Masked cells:        {}", self.masked_cells)?;
        writeln!(file)?;

        writeln!(file, "RUN")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(file, "Steps:               {}", self.steps)?;
        writeln!(file, "Simulated time:      {:.6e} s", self.elapsed)?;
        if let Some(reductions) = self.dt_reductions {
            writeln!(file, "dt reductions:       {}", reductions)?;
        }
        writeln!(file)?;

        writeln!(file, "FIELD")?;
        writeln!(file, "{}", "-".repeat(60))?;
        writeln!(
            file,
            "Pressure:            {:.6e} .. {:.6e} Pa (mean {:.6e})",
            self.min_pressure, self.max_pressure, self.mean_pressure
        )?;
        writeln!(file, "Max speed:           {:.6e} m/s", self.max_speed)?;
        writeln!(file, "Kinetic energy:      {:.6e} J/m", self.kinetic_energy)?;
        writeln!(file)?;

        writeln!(file, "{}", "=".repeat(60))?;

        Ok(())
    }

    pub fn print_to_console(&self) {
        println!("\n{}", "=".repeat(60));
        println!("SIMULATION SUMMARY");
        println!("{}", "=".repeat(60));
        println!(
            "Grid:          {} cells ({}²), width {:.3e} m",
            self.num_cells, self.resolution, self.cell_width
        );
        println!(
            "Obstacles:     {} ({} cells masked)",
            self.num_obstacles, self.masked_cells
        );
        println!("Time:          {} steps, t = {:.4e} s", self.steps, self.elapsed);
        println!(
            "Pressure:      [{:.3e}, {:.3e}] Pa",
            self.min_pressure, self.max_pressure
        );
        println!("Max speed:     {:.3e} m/s", self.max_speed);
        println!("{}\n", "=".repeat(60));
    }
}
