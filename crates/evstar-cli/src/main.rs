use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evstar_core::{
    Config, CsvSinkConfig, DataProfile, Diagnostic, DiagnosticCode, PostgresSinkConfig, RunReport, Severity, SinkConfig, Table,
};
use evstar_sink::{connect_sink, load_tables, CsvDirectorySink, LoadReport};
use evstar_source::Extractor;
use evstar_transform::Pipeline;

/// evstar - EV registration extract to star schema
#[derive(Parser)]
#[command(name = "evstar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: evstar.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, transform and load the star schema into the configured sink
    Run {
        /// Output file for the run report (default: [report].path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract and transform without loading
    Transform {
        /// Output file for the run report (default: [report].path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the six tables as CSV files into this directory
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },

    /// Write a starter config file
    InitConfig {
        /// Where to write the config
        #[arg(default_value = "evstar.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Secrets such as the database password may live in .env
    dotenvy::dotenv().ok();

    init_tracing(cli.verbose);

    if let Commands::InitConfig { path, force } = &cli.command {
        return init_config_command(path, *force);
    }

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new("evstar.toml").exists() {
        Config::from_file(Path::new("evstar.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    tracing::debug!(source = ?config.source, transform = ?config.transform, "loaded configuration");

    if cli.verbose {
        eprintln!(
            "{} {} (jurisdiction {})",
            "Source:".cyan(),
            config.resolve(&config.source.path).display(),
            config.source.jurisdiction
        );
    }

    match cli.command {
        Commands::Run { output } => run_command(&config, output, cli.verbose).await,
        Commands::Transform { output, csv_out } => transform_command(&config, output, csv_out, cli.verbose).await,
        Commands::InitConfig { .. } => Ok(()),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run command - extract, transform, load
async fn run_command(config: &Config, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let sink_config = config.sink.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No sink configured in evstar.toml. \
             Add a [sink] section with type = \"postgres\" or type = \"csv\"."
        )
    })?;
    let sink_config = resolve_sink(config, sink_config);

    // Connect first so bad credentials fail before the transform runs
    if verbose {
        eprintln!("{} {} sink...", "Connecting to".cyan(), sink_config.kind());
    }
    let sink = connect_sink(&sink_config).await?;

    let (mut report, tables) = transform(config, verbose)?;

    if verbose {
        eprintln!("{} {} tables into {}...", "Loading".cyan(), tables.len(), sink.name());
    }
    let load = load_tables(sink.as_ref(), &tables).await;
    record_load(&mut report, &load);

    let report_path = output.unwrap_or_else(|| config.resolve(&config.report.path));
    save_report(&report, &report_path, verbose)?;
    print_run_summary(&report);

    if let Some(error) = load.error {
        return Err(error.into());
    }

    Ok(())
}

/// Transform command - extract and transform, optionally dump CSVs
async fn transform_command(
    config: &Config,
    output: Option<PathBuf>,
    csv_out: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let (mut report, tables) = transform(config, verbose)?;

    let load = match csv_out {
        Some(directory) => {
            let sink = CsvDirectorySink::create(&directory)?;
            if verbose {
                eprintln!("{} {}", "Writing tables to:".cyan(), sink.directory().display());
            }
            let load = load_tables(&sink, &tables).await;
            record_load(&mut report, &load);
            Some(load)
        }
        None => None,
    };

    let report_path = output.unwrap_or_else(|| config.resolve(&config.report.path));
    save_report(&report, &report_path, verbose)?;
    print_run_summary(&report);

    if let Some(error) = load.and_then(|l| l.error) {
        return Err(error.into());
    }

    Ok(())
}

/// Init-config command - write a starter config
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    starter_config().save_to_file(path)?;

    println!("{} {}", "✓ Wrote".green(), path.display());
    println!("Set {} or edit [sink] before running `evstar run`.", "EVSTAR_DB_PASSWORD".bold());
    Ok(())
}

fn starter_config() -> Config {
    Config {
        sink: Some(SinkConfig::Postgres(PostgresSinkConfig {
            host: "localhost".to_string(),
            port: 5432,
            database: "ev".to_string(),
            user: "etl".to_string(),
            password: None,
            password_env: Some("EVSTAR_DB_PASSWORD".to_string()),
            schema: "public".to_string(),
            tls: false,
            batch_size: 1000,
        })),
        ..Config::default()
    }
}

/// Relative sink paths are relative to the config file
fn resolve_sink(config: &Config, sink: &SinkConfig) -> SinkConfig {
    match sink {
        SinkConfig::Csv(csv) => SinkConfig::Csv(CsvSinkConfig {
            directory: config.resolve(&csv.directory),
        }),
        other => other.clone(),
    }
}

/// Extract and transform, returning the report so far and the six tables
fn transform(config: &Config, verbose: bool) -> Result<(RunReport, Vec<Table>)> {
    let source_path = config.resolve(&config.source.path);

    if verbose {
        eprintln!("{} {}", "Reading extract from:".cyan(), source_path.display());
    }
    let extract = Extractor::from_config(&config.source)?
        .extract_file(&source_path)
        .with_context(|| format!("Failed to read extract {}", source_path.display()))?;

    if verbose {
        eprintln!("{}", "Transforming...".cyan());
    }
    let star = Pipeline::new(&config.transform)?.run(&extract.table)?;
    let tables = star.tables()?;

    let mut report = RunReport::new();
    report.source = Some(extract.summary());
    if let Some(diagnostic) = extract.filter_diagnostic() {
        report.add_diagnostic(diagnostic);
    }
    for diagnostic in star.diagnostics {
        report.add_diagnostic(diagnostic);
    }
    report.profile = Some(star.profile);
    report.imputation = star.imputation;
    for table in &tables {
        report.add_table(&table.name, table.row_count());
    }

    Ok((report, tables))
}

fn record_load(report: &mut RunReport, load: &LoadReport) {
    for (name, rows) in &load.loaded {
        report.mark_loaded(name);
        report.add_diagnostic(
            Diagnostic::new(
                DiagnosticCode::TableLoaded,
                Severity::Info,
                format!("Replaced {} ({} rows)", name, rows),
            )
            .with_count(*rows),
        );
    }

    if let Some(error) = &load.error {
        report.add_diagnostic(Diagnostic::new(
            DiagnosticCode::LoadFailed,
            Severity::Error,
            error.to_string(),
        ));
    }
}

fn save_report(report: &RunReport, path: &Path, verbose: bool) -> Result<()> {
    report
        .save_to_file(path)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }
    Ok(())
}

/// Print report summary to stdout
fn print_run_summary(report: &RunReport) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "EV Star Schema Run Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    if let Some(source) = &report.source {
        println!("{}", "Source:".bold());
        println!("  Path:     {}", source.path);
        println!("  SHA-256:  {}", source.sha256);
        println!("  Rows:     {} read, {} retained", source.rows_read, source.rows_retained);
        println!();
    }

    if let Some(profile) = &report.profile {
        print_profile(profile);
    }

    if !report.imputation.is_empty() {
        println!("{}", "Imputation:".bold());
        for column in &report.imputation {
            println!(
                "  {:<16} {} zero → null, {} by make/model, {} by make, {} global, {} remaining",
                column.column,
                column.zeros_replaced,
                column.filled_by_make_model,
                column.filled_by_make,
                column.filled_by_global,
                column.remaining
            );
        }
        println!();
    }

    println!("{}", "Tables:".bold());
    for table in &report.tables {
        let status = if table.loaded {
            "loaded".green()
        } else {
            "not loaded".dimmed()
        };
        println!("  {:<24} {:>8} rows  {}", table.name, table.rows, status);
    }
    println!();

    println!("{}", "Summary:".bold());
    println!("  Total diagnostics: {}", report.summary.total);

    if report.has_errors() {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    let notable: Vec<&Diagnostic> = report
        .diagnostics
        .iter()
        .filter(|d| d.severity != Severity::Info)
        .collect();

    if notable.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in notable {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);
            if diag.count > 1 {
                println!("    Rows: {}", diag.count);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn print_profile(profile: &DataProfile) {
    let stat = |v: Option<f64>| v.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string());

    println!("{}", "Profile:".bold());
    println!("  Shape:    {} rows x {} columns", profile.rows, profile.columns);

    for column in &profile.numeric {
        println!(
            "  {:<16} count {}, mean {}, std {}, min {}, 25% {}, 50% {}, 75% {}, max {}",
            column.column,
            column.count,
            stat(column.mean),
            stat(column.std),
            stat(column.min),
            stat(column.p25),
            stat(column.p50),
            stat(column.p75),
            stat(column.max)
        );
    }

    if !profile.model_year.is_empty() {
        let quantiles: Vec<String> = profile
            .model_year
            .iter()
            .map(|q| format!("{:.0}%={}", q.quantile * 100.0, q.value))
            .collect();
        println!("  {:<16} {}", "model_year", quantiles.join(" "));
    }

    for category in &profile.categories {
        println!("  {}:", category.column);
        for entry in &category.counts {
            println!("    {:>8}  {}", entry.count, entry.value);
        }
    }
    println!();
}
