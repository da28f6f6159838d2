use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Radio antenna supports CLI tool
#[derive(Parser)]
#[command(name = "antennes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file with the ANFR tables
    #[arg(long, env = "ANTENNES_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Connection pool size
    #[arg(
        long,
        env = "ANTENNES_MAX_CONNECTIONS",
        default_value = "4",
        global = true
    )]
    max_connections: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the search box corners around a center
    Bbox {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Distance to the corners in kilometers
        #[arg(short, long)]
        distance: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Query the supports around a center
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Distance to the corners in kilometers
        #[arg(short, long)]
        distance: f64,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Summarize the supports around every center of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_supports.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,

        /// Column name for the distance in kilometers
        #[arg(long, default_value = "distance")]
        distance_col: String,

        /// Distance used when the distance column is missing
        #[arg(long, default_value = "1.0")]
        distance: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bbox {
            lat,
            lon,
            distance,
            json,
        } => commands::bbox::run(lat, lon, distance, json),
        Commands::Query {
            lat,
            lon,
            distance,
            pretty,
        } => {
            let store = commands::open_store(cli.db, cli.max_connections).await?;
            commands::query::run(&store, lat, lon, distance, pretty).await
        }
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
            distance_col,
            distance,
        } => {
            let store = commands::open_store(cli.db, cli.max_connections).await?;
            let columns = commands::batch::Columns {
                lat: lat_col,
                lon: lon_col,
                distance: distance_col,
            };
            commands::batch::run(&store, &input, output, &columns, distance).await
        }
    }
}
