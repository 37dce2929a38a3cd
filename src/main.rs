use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use kira_sepsisrisk::engine::{CancelToken, EngineError, SepsisEngine};
use kira_sepsisrisk::input::validate::validate_columns;
use kira_sepsisrisk::input::{InputError, load_table};
use kira_sepsisrisk::logging::init_logging;
use kira_sepsisrisk::model::analysis::AnalysisReport;
use kira_sepsisrisk::model::record::PatientRecord;
use kira_sepsisrisk::model::thresholds::{ConfigError, ScoringProfile, ThresholdConfig};
use kira_sepsisrisk::pipeline::stage1_normalize::normalize_table;
use kira_sepsisrisk::pipeline::stage5_cohort::{CohortOutput, fit};
use kira_sepsisrisk::pipeline::stage6_output::{RowMode, Stage6Input, write_reports};
use kira_sepsisrisk::report::alerts::{LogNotifier, dispatch_alerts};

#[derive(Debug, Parser)]
#[command(
    name = "kira-sepsisrisk",
    version,
    about = "Heuristic sepsis risk screening for ICU hourly records"
)]
struct Cli {
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides"
    )]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Score a patient table and write risk.tsv, summary.json, report.txt, alerts.txt")]
    Run(RunArgs),
    #[command(about = "Print the default threshold configuration as JSON")]
    Thresholds,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[arg(long, help = "Input table: .csv, .csv.gz, .tsv, .psv, .xlsx, .xlsm, .xls or .ods")]
    input: PathBuf,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, help = "JSON threshold config (default: built-in bounds)")]
    thresholds: Option<PathBuf>,

    #[arg(long = "disable", value_name = "PARAM", help = "Disable the threshold check for a parameter")]
    disable: Vec<String>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_parser = parse_noise, help = "Score perturbation amplitude in [0, 0.5]")]
    noise: Option<f64>,

    #[arg(long, help = "Report only this patient")]
    patient: Option<String>,

    #[arg(long, help = "Write every record to risk.tsv, not only the latest hour")]
    all_hours: bool,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to write reports: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no patient records found in input")]
    NoRecords,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let result = match cli.command {
        Command::Run(args) => run(args),
        Command::Thresholds => print_thresholds(),
    };
    if let Err(err) = result {
        tracing::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn parse_noise(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number: {raw}"))?;
    if !(0.0..=0.5).contains(&value) {
        return Err("noise must be within [0, 0.5]".to_string());
    }
    Ok(value)
}

fn print_thresholds() -> Result<(), RunError> {
    println!("{}", ThresholdConfig::default_v1().to_json_pretty()?);
    Ok(())
}

fn build_engine(args: &RunArgs) -> Result<SepsisEngine, RunError> {
    let mut profile = ScoringProfile::default_v1();
    if let Some(seed) = args.seed {
        profile.seed = seed;
    }
    if let Some(noise) = args.noise {
        profile.noise_amplitude = noise;
    }
    let thresholds = match &args.thresholds {
        Some(path) => ThresholdConfig::load(path)?,
        None => ThresholdConfig::default_v1(),
    };
    let mut engine = SepsisEngine::new(profile, thresholds);
    for param in &args.disable {
        if !engine.thresholds_mut().set_enabled(param, false) {
            tracing::warn!(parameter = %param, "--disable names a parameter with no threshold");
        }
    }
    Ok(engine)
}

fn run(args: RunArgs) -> Result<(), RunError> {
    let table = load_table(&args.input)?;
    let validation = validate_columns(&table.columns);
    let normalized = normalize_table(&table);
    if normalized.records.is_empty() {
        return Err(RunError::NoRecords);
    }

    let engine = build_engine(&args)?;
    let cancel = CancelToken::new();
    let cohort = fit(&engine, &normalized.records, &cancel)?;

    let reports = build_reports(
        &engine,
        &normalized.records,
        &cohort,
        args.patient.as_deref(),
    )?;
    let alerts = dispatch_alerts(&reports, &LogNotifier);

    let input = Stage6Input {
        records: &normalized.records,
        cohort: &cohort,
        reports: &reports,
        alerts: &alerts,
        validation: &validation,
        thresholds: engine.thresholds(),
        profile: engine.profile(),
        input_path: args.input.display().to_string(),
        skipped_rows: normalized.skipped,
        tool_name: "kira-sepsisrisk".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        row_mode: if args.all_hours {
            RowMode::AllHours
        } else {
            RowMode::LatestPerPatient
        },
    };
    write_reports(&input, &args.out)?;
    Ok(())
}

fn build_reports(
    engine: &SepsisEngine,
    records: &[PatientRecord],
    cohort: &CohortOutput,
    patient: Option<&str>,
) -> Result<Vec<AnalysisReport>, RunError> {
    let mut reports = Vec::new();
    match patient {
        Some(id) => {
            let summary = cohort
                .patients
                .iter()
                .find(|p| p.patient_id == id)
                .ok_or_else(|| EngineError::UnknownPatient(id.to_string()))?;
            reports.push(engine.assemble(&records[summary.record_index], id)?);
        }
        None => {
            for p in &cohort.patients {
                if p.assessment.risk_level.is_elevated() {
                    reports.push(engine.assemble(&records[p.record_index], &p.patient_id)?);
                }
            }
        }
    }
    Ok(reports)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
