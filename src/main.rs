use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use particlebox::core::BoundaryMode;
use particlebox::{Container, SimulationConfig, Trajectory};

/// Run a particle box simulation and write the trajectory as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a JSON configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the trajectory JSON
    #[arg(short, long, default_value = "trajectory.json")]
    output: PathBuf,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the total simulated time
    #[arg(long)]
    time: Option<f64>,

    /// Override the number of particles
    #[arg(long)]
    particles: Option<usize>,

    /// Snap reflected particles back onto the wall margin
    #[arg(long)]
    clamp: bool,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(time) = args.time {
        config.total_time = time;
    }
    if let Some(n) = args.particles {
        config.container.num_particles = n;
    }
    if args.clamp {
        config.boundary = BoundaryMode::ReflectAndClamp;
    }
    Ok(config)
}

/// Buffered JSON write. The final flush is explicit so a failed write is
/// reported instead of being dropped with the buffer.
fn save_trajectory<W: Write>(trajectory: &Trajectory, out: W) -> Result<()> {
    let mut writer = BufWriter::new(out);
    trajectory.write_json(&mut writer)?;
    writer.flush().context("flushing trajectory")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut sim = Container::seeded(&config).context("invalid configuration")?;
    log::info!(
        "Simulating {} particles in {:?} for t = {} (quantum {})",
        sim.num_particles(),
        sim.bounds(),
        config.total_time,
        sim.quantum()
    );

    let trajectory = sim.run(config.total_time).context("simulation failed")?;
    let stats = sim.stats();
    log::info!(
        "Finished {} steps: {} pair collisions, {} wall reflections",
        sim.steps(),
        stats.pair,
        stats.wall_total()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    save_trajectory(&trajectory, file)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("Saved: {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts nothing, so buffered bytes only fail once they are flushed.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn small_trajectory() -> Trajectory {
        let mut t = Trajectory::with_particles(2, 1);
        t.record(0, [1.0, 2.0]);
        t.record(1, [3.0, 4.0]);
        t
    }

    #[test]
    fn save_reports_failed_flush() {
        assert!(save_trajectory(&small_trajectory(), FullDisk).is_err());
    }

    #[test]
    fn save_writes_complete_json() -> Result<()> {
        let mut buf = Vec::new();
        save_trajectory(&small_trajectory(), &mut buf)?;
        let back = Trajectory::from_json(buf.as_slice())?;
        assert_eq!(back, small_trajectory());
        Ok(())
    }
}
