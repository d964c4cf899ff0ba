// crates/hc_cli/src/main.rs
//
// Wires up exit codes, typed error mapping, logging and the three commands
// (run, baseline, validate). All inputs are local files; output goes to
// stdout, diagnostics to stderr.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad arguments, malformed config or table cells, out-of-range shares.
    pub const VALIDATION: i32 = 2;
    /// Inputs that disagree (missing district columns, zero turnout, ...).
    pub const INTEGRITY: i32 = 3;
    pub const IO: i32 = 4;
}

use std::io::Write;
use std::process::ExitCode;

use serde::Serialize;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use args::{parse_and_validate as parse_cli, BaselineArgs, Command, Format, InputArgs, RunArgs};
use hc_core::rounding::fmt_1dp;
use hc_io::loader::{self, InputDigests, LoadedInputs};
use hc_io::IoError;
use hc_pipeline::{baseline_for, run_scenario, OverrideMode, Percentages, PipelineError, ScenarioRequest};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Integrity(String),
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Integrity(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

impl From<PipelineError> for MainError {
    fn from(e: PipelineError) -> Self {
        map_pipeline_err(e)
    }
}

impl From<IoError> for MainError {
    fn from(e: IoError) -> Self {
        map_pipeline_err(PipelineError::from(e))
    }
}

impl From<args::CliError> for MainError {
    fn from(e: args::CliError) -> Self {
        MainError::Validation(e.to_string())
    }
}

fn main() -> ExitCode {
    let cli = match parse_cli() {
        Ok(c) => c,
        Err(e) => {
            let e = MainError::from(e);
            eprintln!("hc: error: {e}");
            return ExitCode::from(map_error(&e) as u8);
        }
    };
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Run(a) => run(a),
        Command::Baseline(a) => baseline(a),
        Command::Validate(a) => validate(a),
    };

    let rc = match result {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("hc: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// stderr subscriber; RUST_LOG wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn load(a: &InputArgs) -> Result<LoadedInputs, MainError> {
    Ok(loader::load_inputs(a.config.as_deref(), &a.history)?)
}

fn run(a: &RunArgs) -> Result<(), MainError> {
    let inputs = load(&a.inputs)?;
    let req = ScenarioRequest {
        overrides: a.overrides.clone(),
        override_mode: if a.literal_overrides { OverrideMode::Literal } else { OverrideMode::Rebalance },
        projection: a.projection,
    };
    let out = run_scenario(&inputs, &req)?;
    let model = hc_report::build_model(&out, &inputs.config, &inputs.digests, a.per_district);

    if let Some(path) = &a.out {
        hc_io::canonical_json::write_canonical_file(path, &model)?;
        tracing::info!(path = %path.display(), "report written");
    }

    match a.format {
        Format::Text => emit(render_text(&model)?.as_bytes()),
        Format::Json => {
            let mut bytes = render_json(&model)?;
            bytes.push(b'\n');
            emit(&bytes)
        }
    }
}

/// JSON shape of `hc baseline --format json`.
#[derive(Serialize)]
struct BaselineReport<'a> {
    baseline: &'a Percentages,
    integrity: &'a InputDigests,
}

fn baseline(a: &BaselineArgs) -> Result<(), MainError> {
    let inputs = load(&a.inputs)?;
    let pct = baseline_for(&inputs)?;

    match a.format {
        Format::Text => {
            let mut s = String::new();
            for p in inputs.config.tracked_parties.iter().chain(std::iter::once(&inputs.config.others_label)) {
                let v = pct.get(p).copied().unwrap_or(0.0);
                s.push_str(&format!("{:<10} {:>6}\n", p.as_str(), fmt_1dp(v)));
            }
            emit(s.as_bytes())
        }
        Format::Json => {
            let report = BaselineReport { baseline: &pct, integrity: &inputs.digests };
            let mut bytes = hc_io::canonical_json::to_canonical_bytes(&report)?;
            bytes.push(b'\n');
            emit(&bytes)
        }
    }
}

fn validate(a: &InputArgs) -> Result<(), MainError> {
    let inputs = load(a)?;
    // Also proves the table carries votes for the configured districts.
    baseline_for(&inputs)?;
    let cfg = &inputs.config;
    let line = format!(
        "inputs OK: {} districts, {} seats, {} table rows\n",
        cfg.districts.len(),
        cfg.total_seats(),
        inputs.history.rows().len()
    );
    emit(line.as_bytes())
}

fn emit(bytes: &[u8]) -> Result<(), MainError> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)
        .and_then(|_| out.flush())
        .map_err(|e| MainError::Io(format!("stdout: {e}")))
}

#[cfg(feature = "report-text")]
fn render_text(m: &hc_report::ReportModel) -> Result<String, MainError> {
    Ok(hc_report::render_text(m))
}

#[cfg(not(feature = "report-text"))]
fn render_text(_: &hc_report::ReportModel) -> Result<String, MainError> {
    Err(MainError::Validation("text output not compiled in (feature report-text)".into()))
}

#[cfg(feature = "report-json")]
fn render_json(m: &hc_report::ReportModel) -> Result<Vec<u8>, MainError> {
    Ok(hc_report::render_json(m)?)
}

#[cfg(not(feature = "report-json"))]
fn render_json(m: &hc_report::ReportModel) -> Result<Vec<u8>, MainError> {
    Ok(hc_io::canonical_json::to_canonical_bytes(m)?)
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Integrity(_) => INTEGRITY,
        MainError::Io(_) => IO,
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    let msg = e.to_string();
    match e {
        PipelineError::Invalid(_) => MainError::Validation(msg),
        PipelineError::Integrity(_) => MainError::Integrity(msg),
        PipelineError::Io(_) => MainError::Io(msg),
    }
}
