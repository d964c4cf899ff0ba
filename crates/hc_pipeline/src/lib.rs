//! hc_pipeline: scenario orchestration (baseline → overrides → proportions →
//! simulate → majority verdict).
//! I/O-free: inputs arrive already loaded and checked by `hc_io`, math lives in
//! `hc_algo`.

use std::fmt;

use hc_algo::regional::regional_proportions;
use hc_core::config::ProjectionMode;
use hc_core::{PartyId, SimError};
use hc_io::loader::LoadedInputs;
use hc_io::IoError;

pub mod baseline;
pub mod blocks;
pub mod rebalance;
pub mod simulate;

pub use baseline::baseline_percentages;
pub use blocks::{assess_majority, block_seats, single_party_majority, BlockSeats, MajorityVerdict};
pub use rebalance::rebalance;
pub use simulate::{simulate, Percentages, SeatMap, SimulationOptions, SimulationOutcome};

/// Single error surface for callers of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Malformed arguments, percentages, config or table cells.
    Invalid(String),
    /// Inputs that disagree with each other.
    Integrity(String),
    /// Filesystem / parser failures.
    Io(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Invalid(m) => write!(f, "invalid input: {m}"),
            PipelineError::Integrity(m) => write!(f, "data integrity: {m}"),
            PipelineError::Io(m) => write!(f, "io: {m}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<SimError> for PipelineError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidInput(m) => PipelineError::Invalid(m),
            SimError::DataIntegrity(m) => PipelineError::Integrity(m),
        }
    }
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        use PipelineError::*;
        match e {
            IoError::Path(m) => Io(format!("path: {m}")),
            e @ IoError::Csv(_) => Io(e.to_string()),
            IoError::Json { pointer, msg } => Invalid(format!("json {pointer}: {msg}")),
            e @ IoError::Table { .. } => Invalid(e.to_string()),
            IoError::Config(m) => Invalid(format!("config: {m}")),
            IoError::Invalid(m) => Invalid(m),
            IoError::Integrity(m) => Integrity(m),
        }
    }
}

/// How `--set` style overrides are applied on top of the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverrideMode {
    /// Each override rebalances the other parties (total stays 100).
    #[default]
    Rebalance,
    /// Overrides replace single values; nothing else moves.
    Literal,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioRequest {
    /// Applied in order.
    pub overrides: Vec<(PartyId, f64)>,
    pub override_mode: OverrideMode,
    /// `None` uses the configured projection.
    pub projection: Option<ProjectionMode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutput {
    pub baseline: Percentages,
    pub percentages: Percentages,
    pub options: SimulationOptions,
    pub outcome: SimulationOutcome,
    pub verdict: MajorityVerdict,
    pub single_party: Option<(PartyId, u32)>,
}

/// Baseline vector for the loaded inputs.
pub fn baseline_for(inputs: &LoadedInputs) -> Result<Percentages, PipelineError> {
    let roster = inputs.config.roster().map_err(SimError::from)?;
    Ok(baseline_percentages(&inputs.history, &roster, &inputs.config.district_ids())?)
}

/// Apply overrides to a percentage vector.
pub fn apply_overrides(
    start: &Percentages,
    overrides: &[(PartyId, f64)],
    mode: OverrideMode,
) -> Result<Percentages, PipelineError> {
    let mut pct = start.clone();
    for (party, value) in overrides {
        match mode {
            OverrideMode::Rebalance => pct = rebalance(&pct, party, *value)?,
            OverrideMode::Literal => {
                if !pct.contains_key(party) {
                    return Err(PipelineError::Invalid(format!("unknown party {party} in overrides")));
                }
                pct.insert(party.clone(), *value);
            }
        }
    }
    Ok(pct)
}

/// Full pass over loaded inputs.
pub fn run_scenario(inputs: &LoadedInputs, req: &ScenarioRequest) -> Result<ScenarioOutput, PipelineError> {
    let cfg = &inputs.config;
    let roster = cfg.roster().map_err(SimError::from)?;
    let ids = cfg.district_ids();

    let baseline = baseline_percentages(&inputs.history, &roster, &ids)?;
    let percentages = apply_overrides(&baseline, &req.overrides, req.override_mode)?;

    let options = SimulationOptions { projection: req.projection.unwrap_or(cfg.projection) };
    let proportions = regional_proportions(&inputs.history, &roster, &ids)?;
    let outcome = simulate(&percentages, &proportions, &inputs.history, &roster, &cfg.districts, options)?;

    let verdict = assess_majority(&outcome.national, &cfg.blocks, cfg.majority_seats);
    let single_party = single_party_majority(&outcome.national, cfg.majority_seats);
    tracing::info!(
        projection = options.projection.token(),
        overrides = req.overrides.len(),
        majority = verdict.has_majority(),
        "scenario complete"
    );

    Ok(ScenarioOutput { baseline, percentages, options, outcome, verdict, single_party })
}
