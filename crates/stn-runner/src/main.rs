//! `stn3d`: spatial Tangled Nature model on a periodic cubic lattice.

mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stn_core::{Error, ModelConfig, SeededStream};
use stn_world::{write_initial_state, LogDirectory, Simulation};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "stn3d")]
#[command(author, version, about = "Spatial Tangled Nature model in three dimensions", long_about = None)]
struct Cli {
    /// JSON model configuration (defaults are used for absent fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the run logs
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Random seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Generation budget (overrides the configuration)
    #[arg(short, long)]
    generations: Option<u64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<ModelConfig> {
    let mut config = match &cli.config {
        Some(path) => ModelConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.run.seed = Some(seed);
    }
    if let Some(generations) = cli.generations {
        config.run.generations = generations;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    telemetry::init_telemetry(cli.verbose)?;

    if let Err(err) = config.validate() {
        match err {
            Error::InvalidConfig(errors) => {
                eprintln!("{}", errors);
                error!(violations = errors.len(), "Rejected configuration");
            }
            other => eprintln!("{}", other),
        }
        std::process::exit(1);
    }

    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("failed to create output directory {}", cli.out.display()))?;

    let rng = match config.run.seed {
        Some(seed) => SeededStream::from_seed_u64(seed),
        None => SeededStream::from_entropy(),
    };
    let seed = rng.seed();

    let mut simulation = Simulation::new(&config, rng)?;
    let start = simulation
        .start()
        .context("simulation has no starting coordinate")?;
    write_initial_state(&cli.out, &config, Some(seed), simulation.lattice(), start)
        .context("failed to write initial state log")?;

    println!(
        "Lattice {0}x{0}x{0}, {1} generations, {2} individuals starting at {3} (seed {4})",
        config.lattice.size, config.run.generations, config.run.initial_population, start, seed
    );
    info!(out = %cli.out.display(), seed, "Run started");

    let mut logs = LogDirectory::create(&cli.out, simulation.lattice())
        .context("failed to open generation logs")?;
    let outcome = simulation.run(&mut logs)?;

    println!("{}", outcome);
    Ok(())
}
