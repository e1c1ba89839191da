//! Activity Baseline - Baseline and Anomaly Scoring Engine
//!
//! The main entry point for ab-core, handling:
//! - Consistency validation of the events/statistics pair
//! - Baseline merging and threshold derivation
//! - Synthetic daily-activity generation
//! - Per-day anomaly scoring in configured or live mode

use ab_common::error::format_error_human;
use ab_common::{OutputFormat, Result, RunId};
use ab_core::baseline::{build_baseline, MergeOutcome};
use ab_core::catalog::EventCatalog;
use ab_core::exit_codes::ExitCode;
use ab_core::generate::{generate_days, DailyRecord};
use ab_core::logging::{init_logging, LogConfig, LogFormat};
use ab_core::recompute::recompute_statistics;
use ab_core::report;
use ab_core::score::{score_run, AnomalyRecord, DayStatus, ScoringMode, ScoringSource};
use ab_core::stats::StatisticsTable;
use ab_core::validate::check_consistency;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Activity Baseline - behavioral baselining and anomaly scoring
#[derive(Parser)]
#[command(name = "ab-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log output format
    #[arg(long, global = true, env = "AB_LOG_FORMAT", default_value = "human")]
    log_format: LogFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the events and statistics files agree
    Validate(InputArgs),

    /// Merge the two sources into a baseline table with its alert threshold
    Baseline(BaselineArgs),

    /// Synthesize a multi-day activity log from the baseline
    Generate(RunArgs),

    /// Full pipeline: generate a run and score every day for anomalies
    Score(ScoreArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Events definition file (name:kind:min:max:weight records)
    #[arg(long, short = 'e')]
    events: PathBuf,

    /// Statistics file (name:mean:std_dev records)
    #[arg(long, short = 's')]
    stats: PathBuf,
}

#[derive(Args, Debug)]
struct BaselineArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory for report artifacts (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Number of days to simulate (at least 2)
    #[arg(long, short = 'd')]
    days: u32,

    /// Seed for the random source; omitted means a fresh one is drawn
    /// and logged for later replay
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for report artifacts (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Statistics source for scoring: the configured baseline, or live
    /// statistics recomputed from the generated log
    #[arg(long, default_value = "configured")]
    mode: ScoringMode,
}

fn main() {
    let cli = Cli::parse();
    let log_config = LogConfig::from_flags(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_format,
        cli.global.no_color,
    );
    init_logging(&log_config);

    let use_color = !cli.global.no_color;
    let code = match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{}", format_error_human(&err, use_color));
            ExitCode::from_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    match &cli.command {
        Commands::Validate(args) => cmd_validate(args, cli.global.format),
        Commands::Baseline(args) => cmd_baseline(args, cli.global.format),
        Commands::Generate(args) => cmd_generate(args, cli.global.format),
        Commands::Score(args) => cmd_score(args, cli.global.format),
    }
}

fn load_inputs(args: &InputArgs) -> Result<(EventCatalog, StatisticsTable)> {
    let catalog = EventCatalog::load(&args.events)?;
    let stats = StatisticsTable::load(&args.stats)?;
    tracing::debug!(
        events = catalog.len(),
        statistics = stats.len(),
        "loaded input sources"
    );
    Ok((catalog, stats))
}

fn cmd_validate(args: &InputArgs, format: OutputFormat) -> Result<ExitCode> {
    let (catalog, stats) = load_inputs(args)?;
    let findings = check_consistency(&catalog, &stats);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&findings)?),
        OutputFormat::Text => {
            if findings.is_empty() {
                println!("No inconsistencies found.");
            } else {
                println!("Inconsistencies found:");
                for finding in &findings {
                    println!("- {finding}");
                }
            }
        }
    }

    if findings.is_empty() {
        Ok(ExitCode::Clean)
    } else {
        Ok(ExitCode::Inconsistent)
    }
}

fn cmd_baseline(args: &BaselineArgs, format: OutputFormat) -> Result<ExitCode> {
    let (catalog, stats) = load_inputs(&args.input)?;
    let outcome = build_baseline(&catalog, &stats);
    let run_id = RunId::new();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            let table = report::render_baseline_table(&outcome.baseline);
            emit(
                args.output.as_deref(),
                &run_id,
                "baseline",
                &table,
            )?;
        }
    }
    Ok(ExitCode::Clean)
}

fn cmd_generate(args: &RunArgs, format: OutputFormat) -> Result<ExitCode> {
    let Some((_, records, run_id)) = gated_run(args)? else {
        return Ok(ExitCode::Inconsistent);
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => {
            let log = report::render_activity_log(&records);
            emit(args.output.as_deref(), &run_id, "activity", &log)?;
        }
    }
    Ok(ExitCode::Clean)
}

fn cmd_score(args: &ScoreArgs, format: OutputFormat) -> Result<ExitCode> {
    let Some((outcome, records, run_id)) = gated_run(&args.run)? else {
        return Ok(ExitCode::Inconsistent);
    };

    let source = match args.mode {
        ScoringMode::Configured => ScoringSource::configured(&outcome.baseline),
        ScoringMode::Live => {
            let live = recompute_statistics(&records)?;
            if let Some(dir) = args.run.output.as_deref() {
                let summary = report::render_statistics_summary(&live);
                write_artifact(dir, &run_id, "statistics", &summary)?;
            }
            ScoringSource::live(&outcome.baseline, &live)
        }
    };

    let scored = score_run(&records, &source);
    let flagged = scored.iter().any(|r| r.status == DayStatus::Flagged);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ScoredRun {
                threshold: source.threshold(),
                mode: args.mode,
                days: &scored,
            })?);
        }
        OutputFormat::Text => {
            if let Some(dir) = args.run.output.as_deref() {
                let log = report::render_activity_log(&records);
                write_artifact(dir, &run_id, "activity", &log)?;
            }
            let rendered =
                report::render_anomaly_report(&scored, source.threshold(), args.mode);
            emit(args.run.output.as_deref(), &run_id, "anomaly", &rendered)?;
        }
    }

    if flagged {
        Ok(ExitCode::DaysFlagged)
    } else {
        Ok(ExitCode::Clean)
    }
}

/// Load, gate on the validator, build the baseline, and generate the run.
///
/// Returns `None` when consistency findings block the run.
fn gated_run(args: &RunArgs) -> Result<Option<(MergeOutcome, Vec<DailyRecord>, RunId)>> {
    let (catalog, stats) = load_inputs(&args.input)?;

    let findings = check_consistency(&catalog, &stats);
    if !findings.is_empty() {
        eprintln!("Inconsistencies found:");
        for finding in &findings {
            eprintln!("- {finding}");
        }
        return Ok(None);
    }

    let outcome = build_baseline(&catalog, &stats);
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        days = args.days,
        threshold = outcome.baseline.threshold(),
        "starting generation run"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let records = generate_days(&outcome.baseline, args.days, &mut rng)?;
    Ok(Some((outcome, records, RunId::new())))
}

/// Write to the output directory when given, else print to stdout.
fn emit(output: Option<&Path>, run_id: &RunId, kind: &str, rendered: &str) -> Result<()> {
    match output {
        Some(dir) => write_artifact(dir, run_id, kind, rendered),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

fn write_artifact(dir: &Path, run_id: &RunId, kind: &str, rendered: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(report::artifact_file_name(kind, run_id));
    std::fs::write(&path, rendered)?;
    tracing::info!(path = %path.display(), "wrote report artifact");
    Ok(())
}

/// JSON payload for a scored run.
#[derive(serde::Serialize)]
struct ScoredRun<'a> {
    threshold: f64,
    mode: ScoringMode,
    days: &'a [AnomalyRecord],
}
