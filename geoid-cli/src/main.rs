use anyhow::Result;
use clap::{Parser, Subcommand};
use geoid::Interpolation;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Geoid height CLI tool
#[derive(Parser)]
#[command(name = "geoid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Geoid grid file (.pgm). Repeat to give fallbacks; the first that exists is used
    #[arg(
        short,
        long = "geoid",
        env = "GEOID_PATH",
        value_delimiter = ':',
        global = true
    )]
    geoid: Vec<PathBuf>,

    /// Interpolation method (linear or cubic)
    #[arg(
        short,
        long,
        env = "GEOID_METHOD",
        default_value = "linear",
        global = true
    )]
    method: Interpolation,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query geoid height for a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add geoid heights to every coordinate in a file
    Batch {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude (CSV only)
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude (CSV only)
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },

    /// Display information about the geoid grid
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query { lat, lon, json } => {
            commands::query::run(cli.geoid, cli.method, lat, lon, json)
        }
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
        } => commands::batch::run(cli.geoid, cli.method, input, output, lat_col, lon_col),
        Commands::Info => commands::info::run(cli.geoid),
    }
}
