// crates/hc_cli/src/args.rs
//
// Offline CLI argument surface (clap derive) plus the post-parse checks clap
// cannot express:
// - No networked paths (reject any scheme:// like http/https/file)
// - `--set PARTY=PCT` values are parsed here; range and party checks happen in
//   the pipeline so the library and the CLI agree on what is valid.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use hc_core::config::ProjectionMode;
use hc_core::PartyId;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hc",
    version,
    disable_help_subcommand = true,
    about = "Offline D'Hondt seat simulator over historical district results"
)]
pub struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Simulate a scenario and print the seat report.
    Run(RunArgs),
    /// Print the baseline vote shares derived from the history table.
    Baseline(BaselineArgs),
    /// Load and cross-check the inputs without simulating.
    Validate(InputArgs),
}

#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Election configuration JSON (default: bundled 22-district configuration).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Semicolon-delimited historical results (one column per district).
    #[arg(long)]
    pub history: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Override a party's national share, e.g. `--set CH=25.5`. Repeatable, applied in order.
    #[arg(long = "set", value_name = "PARTY=PCT", value_parser = parse_override)]
    pub overrides: Vec<(PartyId, f64)>,

    /// Projection mode (literal | normalized | turnout_preserving). Defaults to the config.
    #[arg(long, value_parser = parse_projection)]
    pub projection: Option<ProjectionMode>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Include the per-district seat breakdown.
    #[arg(long)]
    pub per_district: bool,

    /// Apply `--set` values as-is instead of rebalancing the other parties.
    #[arg(long)]
    pub literal_overrides: bool,

    /// Also write the canonical JSON report to this file (atomic replace).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct BaselineArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

/// Errors surfaced by post-parse validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Entry point used by main.rs. Clap itself exits with status 2 on usage errors.
pub fn parse_and_validate() -> Result<Cli, CliError> {
    let cli = Cli::parse();
    for p in iter_all_paths(&cli.command) {
        ensure_local_path(p)?;
    }
    Ok(cli)
}

/// `PARTY=PCT` → (PartyId, f64).
pub fn parse_override(s: &str) -> Result<(PartyId, f64), String> {
    let (party, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PARTY=PCT, got {s:?}"))?;
    let party = PartyId::new(party.trim()).map_err(|e| e.to_string())?;
    let value = value.trim();
    let pct: f64 = value
        .parse()
        .map_err(|_| format!("percentage for {party} is not a number: {value:?}"))?;
    if !pct.is_finite() {
        return Err(format!("percentage for {party} must be finite"));
    }
    Ok((party, pct))
}

pub fn parse_projection(s: &str) -> Result<ProjectionMode, String> {
    s.parse()
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(cmd: &Command) -> impl Iterator<Item = &Path> {
    let (inputs, out) = match cmd {
        Command::Run(a) => (&a.inputs, a.out.as_deref()),
        Command::Baseline(a) => (&a.inputs, None),
        Command::Validate(a) => (a, None),
    };
    [inputs.config.as_deref(), Some(inputs.history.as_path()), out]
        .into_iter()
        .flatten()
}
