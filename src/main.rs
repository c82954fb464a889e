//! CLI entry point for the band feeder rater.
//!
//! Provides subcommands for scoring an adjudication table, comparing high
//! schools with their feeder middle schools, and emitting chart series.

use anyhow::Result;
use band_feeder_rater::analyzers::aggregate::{ScoreField, Statistic};
use band_feeder_rater::analyzers::objective::ObjectiveVariant;
use band_feeder_rater::config::RaterConfig;
use band_feeder_rater::output::{
    CsvSeriesSink, LogSeriesSink, print_json, write_csv_file, write_score_table,
};
use band_feeder_rater::parser::load_table;
use band_feeder_rater::pipeline::Pipeline;
use band_feeder_rater::series::{self, Chart, SeriesSink};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "band_feeder_rater")]
#[command(
    about = "Score band adjudications and compare high schools with their feeders",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// CSV adjudication table to read
    #[arg(value_name = "INPUT")]
    input: String,

    /// JSON configuration file (falls back to $RATER_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Objective formula override: A, B or C
    #[arg(short, long)]
    variant: Option<ObjectiveVariant>,

    /// Replacement for the SR "not applicable" sentinel
    #[arg(long)]
    na_replacement: Option<f64>,

    /// Replacement for the carried-over sentinel
    #[arg(long)]
    co_replacement: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartKind {
    /// High schools against their pooled feeders
    FeederComparison,
    /// One chart of high schools, one of middle schools
    SchoolLevel,
    /// Relative performance ratios
    Relative,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and score a table, writing the enriched CSV
    Score {
        #[command(flatten)]
        run: RunArgs,

        /// CSV file to write the scored table to
        #[arg(short, long, default_value = "scored.csv")]
        output: String,
    },
    /// Compute high-school performance relative to feeder schools
    Relative {
        #[command(flatten)]
        run: RunArgs,

        /// CSV file to write relative performance entries to
        #[arg(short, long, default_value = "relative_performance.csv")]
        output: String,

        /// Also log the entries as pretty-printed JSON
        #[arg(long)]
        json: bool,
    },
    /// Build chart series and write them as CSV or log them
    Series {
        #[command(flatten)]
        run: RunArgs,

        /// Which chart family to build
        #[arg(long, value_enum, default_value_t = ChartKind::FeederComparison)]
        chart: ChartKind,

        /// Per-year reduction: max, mean or min
        #[arg(short, long, default_value = "max")]
        stat: Statistic,

        /// Score column: objective or normalized
        #[arg(short, long, default_value = "objective")]
        field: ScoreField,

        /// CSV file for the series; logs them when omitted
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/band_feeder_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("band_feeder_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score { run, output } => {
            let pipeline = build_pipeline(&run)?;
            let table = pipeline.score(&load_table(&run.input)?)?;

            write_score_table(&output, &table)?;
            info!(output = %output, records = table.len(), "Scored table written");
        }
        Commands::Relative { run, output, json } => {
            let pipeline = build_pipeline(&run)?;
            let table = pipeline.score(&load_table(&run.input)?)?;
            let entries = pipeline.relative_performance(&table);

            if json {
                print_json(&entries)?;
            }
            write_csv_file(&output, &entries)?;
            info!(output = %output, entries = entries.len(), "Relative performance written");
        }
        Commands::Series {
            run,
            chart,
            stat,
            field,
            output,
        } => {
            let pipeline = build_pipeline(&run)?;
            let table = pipeline.score(&load_table(&run.input)?)?;
            let feeders = &pipeline.config().feeder_map;

            let charts: Vec<Chart> = match chart {
                ChartKind::FeederComparison => {
                    vec![series::feeder_comparison(&table, feeders, field, stat)]
                }
                ChartKind::SchoolLevel => series::school_level(&table, feeders, field, stat).into(),
                ChartKind::Relative => {
                    let entries = pipeline.relative_performance(&table);
                    vec![series::relative_performance_chart(&entries, feeders)]
                }
            };

            match output {
                Some(path) => {
                    let mut sink = CsvSeriesSink::new(File::create(&path)?);
                    render_all(&mut sink, &charts)?;
                    sink.into_inner()?;
                    info!(output = %path, charts = charts.len(), "Series written");
                }
                None => render_all(&mut LogSeriesSink, &charts)?,
            }
        }
    }

    Ok(())
}

/// Loads the configuration, applies CLI overrides and validates it.
fn build_pipeline(run: &RunArgs) -> Result<Pipeline> {
    let config_path = run
        .config
        .clone()
        .or_else(|| std::env::var("RATER_CONFIG").ok());

    let mut config = match config_path {
        Some(path) => {
            info!(path = %path, "Loading configuration");
            RaterConfig::load(&path)?
        }
        None => RaterConfig::default(),
    };

    if let Some(variant) = run.variant {
        config.objective_variant = variant;
    }
    if let Some(value) = run.na_replacement {
        config.na_replacement = value;
    }
    if let Some(value) = run.co_replacement {
        config.carried_over_replacement = value;
    }

    Ok(Pipeline::new(config)?)
}

fn render_all(sink: &mut impl SeriesSink, charts: &[Chart]) -> Result<()> {
    for chart in charts {
        sink.render(chart)?;
    }
    Ok(())
}
