use anyhow::Context;
use clap::{Parser, ValueEnum};
use conserv_solver::config::{PhysicsKind, SolverConfig};
use conserv_solver::{run, BackendKind};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SolverType {
    /// Shallow water equations
    Sw,
    /// Euler equations of gas dynamics
    Euler,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Device {
    /// Single-threaded loop
    Cpu,
    /// Rayon thread pool
    Parallel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Finite-volume solver for shallow water and Euler gas dynamics
#[derive(Parser, Debug)]
#[command(name = "conserv_solver")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// YAML configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Solver type
    #[arg(long = "type", value_enum)]
    solver: Option<SolverType>,

    /// Grid size in x
    #[arg(long)]
    xn: Option<usize>,

    /// Grid size in y
    #[arg(long)]
    yn: Option<usize>,

    /// Maximum number of steps
    #[arg(long)]
    nt: Option<u64>,

    /// Total simulated time
    #[arg(long)]
    time: Option<f64>,

    #[arg(long, value_enum)]
    device: Option<Device>,

    /// Initial condition by name
    #[arg(long)]
    setup: Option<String>,

    /// Write a per-cell JSON dump every N steps
    #[arg(long)]
    dump_every: Option<u64>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SolverConfig::default(),
        };
        if let Some(solver) = self.solver {
            config.physics = match solver {
                SolverType::Sw => PhysicsKind::ShallowWater,
                SolverType::Euler => PhysicsKind::Euler,
            };
        }
        if let Some(device) = self.device {
            config.backend = match device {
                Device::Cpu => BackendKind::Serial,
                Device::Parallel => BackendKind::Parallel,
            };
        }
        if let Some(nx) = self.xn {
            config.nx = nx;
        }
        if let Some(ny) = self.yn {
            config.ny = ny;
        }
        if let Some(nt) = self.nt {
            config.max_steps = nt;
        }
        if let Some(time) = self.time {
            config.end_time = time;
        }
        if let Some(dump_every) = self.dump_every {
            config.dump_every = dump_every;
        }
        if self.setup.is_some() {
            config.setup = self.setup;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.into_config()?;
    match run::run(&config) {
        Ok(outcome) => {
            info!(
                "{} steps, t = {:.4}, average step {:.3} ms",
                outcome.summary.n,
                outcome.summary.time,
                outcome.summary.average_timestep * 1000.0
            );
            Ok(())
        }
        Err(err) => {
            error!("run failed: {err}");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_must_be_known() {
        let cli = Cli::try_parse_from(["conserv_solver", "--log-level", "debug"]).unwrap();
        assert_eq!(Level::from(cli.log_level), Level::DEBUG);
        assert!(Cli::try_parse_from(["conserv_solver", "--log-level", "loud"]).is_err());
        let cli = Cli::try_parse_from(["conserv_solver"]).unwrap();
        assert_eq!(Level::from(cli.log_level), Level::INFO);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "conserv_solver",
            "--type",
            "euler",
            "--xn",
            "32",
            "--device",
            "cpu",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();
        assert_eq!(config.physics, PhysicsKind::Euler);
        assert_eq!(config.nx, 32);
        assert_eq!(config.backend, BackendKind::Serial);
    }
}
