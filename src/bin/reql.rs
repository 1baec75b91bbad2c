//! ReQL evaluation CLI
//!
//! Runs wire-format queries through the term evaluator and prints the
//! response envelope.
//!
//! # Examples
//!
//! ```bash
//! # Validate a value against a schema
//! reql eval '[201, [[200, [{"type": "number"}]], 5]]'
//!
//! # Show the compiled tree with determinism classes
//! reql explain '[201, [[200, ["{}"]], [169]]]'
//!
//! # Read the query from a file and dump metrics afterwards
//! reql --metrics eval --file query.json
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use photondb_reql::config::ReqlConfig;
use photondb_reql::query::{metrics, QueryExecutor};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// PhotonDB ReQL - term evaluation core
#[derive(Parser, Debug)]
#[command(name = "reql")]
#[command(version = photondb_reql::VERSION)]
#[command(about = "Evaluate ReQL wire queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./reql.toml when present)
    #[arg(long, global = true, env = "PHOTONDB_REQL_CONFIG")]
    config: Option<PathBuf>,

    /// Log directory path (overrides the config file)
    #[arg(long, global = true, env = "PHOTONDB_REQL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a query and print the response
    Eval(QueryArgs),

    /// Compile a query and print its term tree
    Explain(QueryArgs),

    /// Show version
    Version,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Query in JSON wire format
    query: Option<String>,

    /// Read the query from a file instead
    #[arg(short, long, conflicts_with = "query")]
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ReqlConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    setup_logging(&cli, &config)?;

    if cli.metrics {
        metrics::init_metrics();
    }

    match &cli.command {
        Commands::Eval(args) => eval_command(&config, args)?,
        Commands::Explain(args) => explain_command(&config, args)?,
        Commands::Version => {
            println!("PhotonDB ReQL {}", photondb_reql::VERSION);
            println!("ReQL protocol {}", config.reql_version);
        }
    }

    if cli.metrics {
        print!("{}", metrics::export_metrics()?);
    }
    Ok(())
}

/// Setup logging with rolling files and console output
fn setup_logging(cli: &Cli, config: &ReqlConfig) -> anyhow::Result<()> {
    let log_dir = cli
        .log_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.log.dir));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "reql.log");

    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.log.level)
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!cli.no_color)
                .pretty(),
        )
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    Ok(())
}

fn read_query(args: &QueryArgs) -> anyhow::Result<serde_json::Value> {
    let text = match (&args.query, &args.file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => read_file(path)?,
        (None, None) => bail!("Expected a query argument or --file"),
    };
    serde_json::from_str(&text).context("Query is not valid JSON")
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn eval_command(config: &ReqlConfig, args: &QueryArgs) -> anyhow::Result<()> {
    let query = read_query(args)?;
    let executor = QueryExecutor::from_config(config);

    info!(reql_version = %config.reql_version, "Evaluating query");
    let response = executor.run(&query);
    println!("{}", serde_json::to_string_pretty(&response.to_json())?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn explain_command(config: &ReqlConfig, args: &QueryArgs) -> anyhow::Result<()> {
    let query = read_query(args)?;
    let executor = QueryExecutor::from_config(config);

    let term = executor.compile(&query)?;
    print!("{}", term.explain());
    Ok(())
}
