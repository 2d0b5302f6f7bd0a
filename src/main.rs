//! CLI entry point for the ridership GeoJSON converters.
//!
//! Each subcommand reads one dataset and writes one GeoJSON file. `all` runs
//! the bus, rail and road converters and then combines rail with bus.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ridership_geojson::config::ConverterSettings;
use ridership_geojson::output::{append_record, print_json};
use ridership_geojson::pipeline::{
    BOUNDARY_INPUT, BUS_INPUT, BUS_OUTPUT, COMBINED_OUTPUT, RAIL_INPUT, RAIL_OUTPUT, ROAD_INPUT,
    ROAD_OUTPUT, run_bus, run_combine, run_rail, run_road,
};
use ridership_geojson::stats::ConversionStats;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ridership_geojson")]
#[command(about = "Convert ridership and traffic CSVs into hourly GeoJSON", long_about = None)]
struct Cli {
    /// JSON file overriding converter caps, amplitudes and the synthetic area
    #[arg(long, global = true)]
    config: Option<String>,

    /// Seed for synthetic stop positions (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Base CSV path for run ledgers; each dataset appends to `<stem>_<dataset>.csv`
    #[arg(long, global = true)]
    stats_csv: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert bus stop ridership into Point features
    Bus {
        #[arg(short, long, default_value = BUS_INPUT)]
        input: String,

        #[arg(short, long, default_value = BUS_OUTPUT)]
        output: String,
    },
    /// Convert commuter and light rail stop ridership into Point features
    Rail {
        #[arg(short, long, default_value = RAIL_INPUT)]
        input: String,

        #[arg(short, long, default_value = RAIL_OUTPUT)]
        output: String,
    },
    /// Convert traffic counts into LineString features inside the city boundary
    Road {
        #[arg(short, long, default_value = ROAD_INPUT)]
        input: String,

        /// GeoJSON FeatureCollection whose first feature is the boundary polygon
        #[arg(short, long, default_value = BOUNDARY_INPUT)]
        boundary: String,

        #[arg(short, long, default_value = ROAD_OUTPUT)]
        output: String,
    },
    /// Concatenate two feature collections, first then second
    Combine {
        #[arg(long, default_value = RAIL_OUTPUT)]
        first: String,

        #[arg(long, default_value = BUS_OUTPUT)]
        second: String,

        #[arg(short, long, default_value = COMBINED_OUTPUT)]
        output: String,
    },
    /// Run bus, rail, road and combine with the default file names
    All,
}

/// Colored stderr plus a daily-rolled JSON log. Keep the guard alive for the
/// whole run or buffered file lines are lost.
fn init_logging() -> Result<WorkerGuard> {
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/ridership_geojson.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ridership_geojson.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("ridership_geojson=debug".parse()?),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging()?;

    let cli = Cli::parse();
    let settings = ConverterSettings::load_or_default(cli.config.as_deref())?;
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ledger = cli.stats_csv.as_deref();

    match cli.command {
        Commands::Bus { input, output } => {
            let stats = run_bus(&input, &output, &settings, &mut rng)?;
            println!("Saved {} bus stops to {}", stats.features_written, output);
            record(ledger, &stats)?;
        }
        Commands::Rail { input, output } => {
            let stats = run_rail(&input, &output, &settings, &mut rng)?;
            print_rail_summary(&stats, &output);
            record(ledger, &stats)?;
        }
        Commands::Road {
            input,
            boundary,
            output,
        } => {
            let stats = run_road(&input, &boundary, &output, &settings)?;
            println!(
                "Saved {} roads inside the city boundary to {}",
                stats.features_written, output
            );
            record(ledger, &stats)?;
        }
        Commands::Combine {
            first,
            second,
            output,
        } => {
            let (stats, first_count, second_count) = run_combine(&first, &second, &output)?;
            println!(
                "Combined {} + {} features = {} total in {}",
                first_count, second_count, stats.features_written, output
            );
            record(ledger, &stats)?;
        }
        Commands::All => {
            let bus = run_bus(BUS_INPUT, BUS_OUTPUT, &settings, &mut rng)?;
            println!("Saved {} bus stops to {}", bus.features_written, BUS_OUTPUT);

            let rail = run_rail(RAIL_INPUT, RAIL_OUTPUT, &settings, &mut rng)?;
            print_rail_summary(&rail, RAIL_OUTPUT);

            let road = run_road(ROAD_INPUT, BOUNDARY_INPUT, ROAD_OUTPUT, &settings)?;
            println!(
                "Saved {} roads inside the city boundary to {}",
                road.features_written, ROAD_OUTPUT
            );

            let (combined, rail_count, bus_count) =
                run_combine(RAIL_OUTPUT, BUS_OUTPUT, COMBINED_OUTPUT)?;
            println!(
                "Combined {} rail stops + {} bus stops = {} total transit stops",
                rail_count, bus_count, combined.features_written
            );

            for stats in [&bus, &rail, &road, &combined] {
                record(ledger, stats)?;
            }
        }
    }

    Ok(())
}

fn print_rail_summary(stats: &ConversionStats, output: &str) {
    println!("Saved {} rail stops to {}", stats.features_written, output);
    println!(
        "FrontRunner: {}, TRAX: {}",
        stats.commuter_rail, stats.light_rail
    );
}

/// Logs the run and appends it to the dataset's stats ledger when one was requested.
fn record(ledger: Option<&str>, stats: &ConversionStats) -> Result<()> {
    print_json(stats)?;
    info!(
        dataset = %stats.dataset,
        rows_read = stats.rows_read,
        kept_pct = %format!("{:.1}", stats.kept_pct()),
        hourly_total = stats.hourly_total,
        "Run summary"
    );

    if stats.features_written == 0 {
        warn!(dataset = %stats.dataset, "No features written");
    }

    if let Some(base) = ledger {
        let path = append_record(base, stats)?;
        info!(path = %path.display(), dataset = %stats.dataset, "Stats appended");
    }

    Ok(())
}
