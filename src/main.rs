use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use nrgatlas::config::PipelineConfig;
use nrgatlas::pipeline::{self, AssetReport};

#[derive(Parser, Debug)]
#[command(name = "nrgatlas", version)]
#[command(about = "Build an energy-market master table and publication figures from Eurostat CSV", long_about = None)]
struct Cli {
    /// JSON configuration file (defaults apply to every omitted field)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pivot a long CSV into the master feature table
    Build {
        /// Long-format input CSV
        long: PathBuf,
        /// Output master CSV
        master: PathBuf,
    },

    /// Render figures and LaTeX tables from a master table
    Assets {
        /// Master CSV produced by `build`
        master: PathBuf,
        /// Directory for SVG figures
        #[arg(long, default_value = "figures")]
        figures: PathBuf,
        /// Directory for LaTeX tables
        #[arg(long, default_value = "tables")]
        tables: PathBuf,
    },

    /// Build the master table and every asset in one go
    Run {
        /// Long-format input CSV
        long: PathBuf,
        /// Output directory
        #[arg(short, long, default_value = "out")]
        out: PathBuf,
    },

    /// Print a JSON data-quality profile of a long CSV
    Profile {
        /// Long-format input CSV
        long: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Build { long, master } => {
            let table = pipeline::build_master(&long, &config)?;
            pipeline::write_master(&table, &master)?;
            println!("{} rows written to {}", table.len(), master.display());
        }
        Commands::Assets {
            master,
            figures,
            tables,
        } => {
            let table = pipeline::load_master(&master)?;
            let report = pipeline::build_assets(&table, &config, &figures, &tables)?;
            print_report(&report);
        }
        Commands::Run { long, out } => {
            let report = pipeline::run(&long, &out, &config)?;
            print_report(&report);
        }
        Commands::Profile { long } => {
            let profile = pipeline::profile(&long, &config)?;
            let json = serde_json::to_string_pretty(&profile).context("Failed to serialize profile")?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", json).context("Failed to write profile to stdout")?;
        }
    }

    Ok(())
}

fn print_report(report: &AssetReport) {
    for path in &report.written {
        println!("wrote {}", path.display());
    }
    for name in &report.skipped {
        println!("skipped {} (no usable data)", name);
    }
}
