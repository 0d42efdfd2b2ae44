use cvflow_rs::config::SimulationConfig;
use cvflow_rs::error::SimulationError;
use cvflow_rs::numerics::simulator::FluidSimulator;
use cvflow_rs::numerics::timing::{finalize_and_print, reset_timing};
use cvflow_rs::processing::csv_writer;
use cvflow_rs::processing::summary::SimulationSummary;
use glam::DVec2;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DEFAULT_SCENARIO: &str = "cvflow.yaml";

fn main() -> ExitCode {
    env_logger::init();

    let scenario = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SCENARIO.to_string());
    let cfg = SimulationConfig::load_or_default(Path::new(&scenario));

    let mut sim = match cfg.build_simulator() {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Failed to set up simulation: {e}");
            return ExitCode::FAILURE;
        }
    };

    let out_dir = cfg.run.output_dir.join("field");
    if let Err(e) = fs::create_dir_all(&out_dir) {
        eprintln!("Failed to create output directory {}: {e}", out_dir.display());
        return ExitCode::FAILURE;
    }

    println!(
        "Running {} steps of dt = {:.3e} s on a {}x{} grid",
        cfg.run.steps, cfg.run.dt, cfg.domain.resolution, cfg.domain.resolution
    );

    reset_timing();
    let outcome = run(&mut sim, &cfg, &out_dir);
    finalize_and_print();

    match outcome {
        Ok(reductions) => {
            write_outputs(&sim, &cfg, Some(reductions));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Simulation stopped after {} steps: {e}", sim.steps_taken());
            write_outputs(&sim, &cfg, None);
            ExitCode::FAILURE
        }
    }
}

/// Step the simulation, halving `dt` whenever a step diverges.
/// Returns how many times `dt` was reduced.
fn run(
    sim: &mut FluidSimulator,
    cfg: &SimulationConfig,
    out_dir: &Path,
) -> Result<u32, SimulationError> {
    let mut dt = cfg.run.dt;
    let mut reductions = 0;
    let mut halvings_this_step = 0;

    while sim.steps_taken() < cfg.run.steps {
        match sim.step(dt) {
            Ok(report) => {
                halvings_this_step = 0;
                if cfg.run.output_every > 0 && report.step % cfg.run.output_every == 0 {
                    println!(
                        "Step {:>6} | t = {:.4e} | dt = {:.3e} | masked = {}",
                        report.step, report.elapsed, dt, report.masked_cells
                    );
                    save_field(sim, out_dir, report.step);
                }
            }
            Err(e @ SimulationError::UnstableStep { .. }) => {
                if halvings_this_step >= cfg.run.max_dt_halvings {
                    return Err(e);
                }
                dt *= 0.5;
                halvings_this_step += 1;
                reductions += 1;
                println!(
                    "Step {:>6} | {e} | retrying with dt = {:.3e}",
                    sim.steps_taken() + 1,
                    dt
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(reductions)
}

fn save_field(sim: &FluidSimulator, out_dir: &Path, step: u64) {
    let path = out_dir.join(format!("field_{step:06}.csv"));
    if let Err(e) = csv_writer::write_field(&path, sim.grid()) {
        log::warn!("failed to write {}: {e}", path.display());
    }
}

fn write_outputs(sim: &FluidSimulator, cfg: &SimulationConfig, reductions: Option<u32>) {
    let base: PathBuf = cfg.run.output_dir.clone();

    for (i, line) in cfg.streamlines.iter().enumerate() {
        let start = DVec2::new(line.x, line.y);
        match sim.trace_streamline(start, line.length, line.spacing) {
            Ok(points) => {
                let path = base.join(format!("streamline_{i}.csv"));
                match csv_writer::write_streamline(&path, &points) {
                    Ok(()) => println!(
                        "Streamline {i}: {} points -> {}",
                        points.len(),
                        path.display()
                    ),
                    Err(e) => log::warn!("failed to write {}: {e}", path.display()),
                }
            }
            Err(e) => log::warn!("streamline {i} from {start:?} failed: {e}"),
        }
    }

    let mut summary = SimulationSummary::from_simulator(sim);
    if let Some(reductions) = reductions {
        summary.add_dt_reductions(reductions);
    }
    let summary_path = base.join("simulation_summary.txt");
    match summary.write_to_file(&summary_path) {
        Ok(()) => println!("Summary saved to {}", summary_path.display()),
        Err(e) => log::warn!("failed to write {}: {e}", summary_path.display()),
    }
    summary.print_to_console();
}
