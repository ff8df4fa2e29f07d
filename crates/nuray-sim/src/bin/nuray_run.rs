// ─────────────────────────────────────────────────────────────────────
// Nuray — Command-line Runner
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use nuray_detector::{DetectorDescription, RecordedNoiseLibrary};
use nuray_earth::CrossSectionModel;
use nuray_sim::{write_events_file, Cylinder, CylinderGenerator, EnergySpectrum, Simulation};
use nuray_types::config::SimulationConfig;
use nuray_types::error::{NurayError, NurayResult};

#[derive(Parser)]
#[command(name = "nuray-run")]
#[command(about = "Monte Carlo of in-ice radio detection of UHE neutrinos", long_about = None)]
struct Cli {
    /// Simulation config (JSON); missing keys take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detector description (JSON)
    #[arg(short, long)]
    detector: PathBuf,

    /// Number of trajectories to generate
    #[arg(short = 'n', long, default_value_t = 1000)]
    n_events: u64,

    /// Event output, one JSON object per line
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worker threads (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Recorded noise library (JSON) used instead of thermal noise
    #[arg(long, value_name = "FILE")]
    noise_library: Option<PathBuf>,

    /// Cylinder radius [m]
    #[arg(long, default_value_t = 3000.0)]
    r_max: f64,

    /// Bottom of the volume [m]
    #[arg(long, default_value_t = -2700.0, allow_hyphen_values = true)]
    z_min: f64,

    /// Top of the volume [m]
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    z_max: f64,

    /// Fixed neutrino energy [eV]; overrides the power law
    #[arg(long)]
    energy: Option<f64>,

    /// Spectral index of dN/dE ~ E^-gamma
    #[arg(long, default_value_t = 2.0)]
    gamma: f64,

    #[arg(long, default_value_t = 1e17)]
    energy_min: f64,

    #[arg(long, default_value_t = 1e20)]
    energy_max: f64,
}

fn main() -> NurayResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    }
    .resolve()?;
    let detector = DetectorDescription::from_file(&cli.detector)?;
    let noise_library = cli
        .noise_library
        .as_ref()
        .map(RecordedNoiseLibrary::from_file)
        .transpose()?;

    let spectrum = match cli.energy {
        Some(e) => EnergySpectrum::Fixed(e),
        None => EnergySpectrum::PowerLaw {
            gamma: cli.gamma,
            e_min: cli.energy_min,
            e_max: cli.energy_max,
        },
    };
    let generator = CylinderGenerator::new(
        Cylinder {
            r_max: cli.r_max,
            z_min: cli.z_min,
            z_max: cli.z_max,
        },
        spectrum,
        CrossSectionModel::new(config.cross_section),
        config.seed,
    )?;
    let trajectories = generator.generate_batch(cli.n_events);

    let simulation = Simulation::new(config, detector, noise_library)?;
    let start = Instant::now();
    let run = match cli.threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| NurayError::ConfigError(format!("thread pool: {e}")))?
            .install(|| simulation.run(&trajectories))?,
        None => simulation.run(&trajectories)?,
    };
    log::info!("simulated in {:.2} s", start.elapsed().as_secs_f64());

    if let Some(path) = &cli.output {
        let n = write_events_file(path, &run.outcomes)?;
        log::info!("wrote {n} events to {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&run.summary)?);
    Ok(())
}
