//! Precipitation Simulator CLI
//!
//! Writes a synthetic daily precipitation dataset as JSON.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use precip_simulator::{DatasetGenerator, GeneratorConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "precip-simulator")]
#[command(about = "Generate a synthetic daily precipitation dataset")]
struct Args {
    /// First calendar year
    #[arg(long, default_value = "1990")]
    start_year: i32,

    /// Number of years
    #[arg(long, default_value = "30")]
    years: u32,

    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "data/precipitaciones.json")]
    output: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Multiplier on the seasonal rain swing
    #[arg(long, default_value = "1.0")]
    wet_season_boost: f64,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("precip_simulator=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    info!(
        "Generating {} years from {} (seed: {:?})",
        args.years, args.start_year, args.seed
    );

    let mut generator = DatasetGenerator::new(GeneratorConfig {
        start_year: args.start_year,
        years: args.years,
        wet_season_boost: args.wet_season_boost,
        seed: args.seed,
    })?;
    let records = generator.generate()?;

    if args.output.as_os_str() == "-" {
        let mut out = BufWriter::new(io::stdout().lock());
        serde_json::to_writer_pretty(&mut out, &records)?;
        out.flush()?;
    } else {
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, &records)?;
        out.flush()?;
    }

    info!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(())
}
