//! Host loop: builds a simulator from a [`SolverConfig`], steps it until the
//! step budget or the end time runs out and writes the run's files.

use crate::backend::Backend;
use crate::config::{PhysicsKind, SolverConfig};
use crate::error::{SolverError, SolverResult};
use crate::fv_core::mesh::Grid2d;
use crate::fv_core::physics::{ConservationLaw, Euler, ShallowWater};
use crate::output::{cell_dump, field_ranges, write_cell_dump, write_field_csv, RunSummary};
use crate::setups::{make_euler_setup, make_shallow_water_setup, setup_physics};
use crate::simulator::Simulator;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn, Level};

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub summary_path: PathBuf,
    pub field_path: PathBuf,
    pub dumps: Vec<PathBuf>,
    pub inadmissible_cells: usize,
}

pub fn run(config: &SolverConfig) -> SolverResult<RunOutcome> {
    config.validate()?;
    let setup = config.setup_name();
    let expected = setup_physics(setup)?;
    if expected != config.physics {
        return Err(SolverError::PhysicsMismatch {
            setup: setup.to_string(),
            expected: expected.name(),
            found: config.physics.name(),
        });
    }
    let scheme = config.scheme()?;
    let backend = Backend::new(config.backend, config.threads)?;
    std::fs::create_dir_all(&config.output_dir)?;

    info!(
        "Simulation starting with [{}x{}] grid: {} / {} on {:?}",
        config.nx,
        config.ny,
        config.physics.name(),
        setup,
        backend
    );

    match config.physics {
        PhysicsKind::ShallowWater => {
            let init = make_shallow_water_setup(setup)?;
            let law = ShallowWater { g: config.gravity };
            let sim = Simulator::initialize(law, config.nx, config.ny, scheme, backend, init.as_ref())?;
            drive(sim, config)
        }
        PhysicsKind::Euler => {
            let law = Euler {
                gamma: config.gamma,
            };
            let init = make_euler_setup(setup, law, &Grid2d::new(config.nx, config.ny)?)?;
            let sim = Simulator::initialize(law, config.nx, config.ny, scheme, backend, init.as_ref())?;
            drive(sim, config)
        }
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} (eta: {eta}) {msg}",
    )
    .map(|style| style.progress_chars("█░"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

/// True once `time` is within rounding of `end_time`.
fn reached(time: f64, end_time: f64) -> bool {
    end_time - time <= f64::EPSILON * end_time
}

fn drive<L, const D: usize>(
    mut sim: Simulator<L, D>,
    config: &SolverConfig,
) -> SolverResult<RunOutcome>
where
    L: ConservationLaw<D>,
{
    let setup = config.setup_name();
    let mut wall_times = Vec::new();
    let mut dumps = Vec::new();
    let pb = progress_bar(config.max_steps);

    while sim.step_count() < config.max_steps && !reached(sim.time(), config.end_time) {
        let started = Instant::now();
        let step = sim.advance_step_capped(config.end_time - sim.time())?;
        wall_times.push(started.elapsed().as_secs_f64());

        debug!(
            step = step.step,
            dt = step.dt,
            time = step.time,
            max_eigenvalue = step.max_eigenvalue,
            "step complete"
        );
        if tracing::enabled!(Level::DEBUG) {
            for range in field_ranges(sim.law(), sim.mesh(), sim.field()) {
                debug!(component = range.name, min = range.min, max = range.max, "field range");
            }
        }

        if config.dump_every > 0 && step.step % config.dump_every == 0 {
            let path = config
                .output_dir
                .join(format!("{setup}_{}.json", step.step));
            write_cell_dump(&path, &cell_dump(&sim))?;
            dumps.push(path);
        }

        pb.set_position(step.step);
        pb.set_message(format!("t = {:.4}", step.time));
    }
    pb.finish_with_message("simulation complete");

    let inadmissible_cells = sim.count_inadmissible();
    if inadmissible_cells > 0 {
        warn!(cells = inadmissible_cells, "final state has inadmissible cells");
    }

    let mesh = sim.mesh();
    let summary = RunSummary::from_wall_times(&wall_times, mesh.nx(), mesh.ny(), sim.time());
    let summary_path = config.output_dir.join(RunSummary::file_name(
        sim.backend().kind().label(),
        config.physics.label(),
        mesh.nx(),
        mesh.ny(),
    ));
    info!("Saving simulation details as: {}", summary_path.display());
    summary.write(&summary_path)?;

    let field_path = config.output_dir.join(format!("{setup}_final.csv"));
    write_field_csv(&field_path, sim.law(), mesh, sim.field())?;

    info!(
        steps = summary.n,
        time = summary.time,
        average_step_seconds = summary.average_timestep,
        "run finished"
    );
    Ok(RunOutcome {
        summary,
        summary_path,
        field_path,
        dumps,
        inadmissible_cells,
    })
}
