//! Loader: configuration → historical table → cross-checks → digests.
//! Returns a `LoadedInputs` for the pipeline. Local files only.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use hc_core::config::ElectionConfig;
use hc_core::{DistrictId, HistoricalVoteTable};
use serde::Serialize;

use crate::{config, hasher, table, IoError, IoResult};

/// SHA-256 provenance of the inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputDigests {
    /// Raw bytes of the history file.
    pub history_sha256: String,
    /// Canonical JSON of the effective configuration.
    pub config_sha256: String,
}

#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub config: ElectionConfig,
    pub history: HistoricalVoteTable,
    pub digests: InputDigests,
}

/// Load the configuration (bundled default when `config_path` is `None`) and
/// the history table, then check that every configured district has a column.
pub fn load_inputs(config_path: Option<&Path>, history_path: &Path) -> IoResult<LoadedInputs> {
    let config = match config_path {
        Some(p) => config::load_config(p)?,
        None => config::check(ElectionConfig::portugal_default())?,
    };

    let bytes = fs::read(history_path)
        .map_err(|e| IoError::Path(format!("{}: {e}", history_path.display())))?;
    let history = table::read_history_bytes(&bytes, &config.label_column)?;

    check_columns(&history, &config.district_ids())?;

    let digests = InputDigests {
        history_sha256: hasher::sha256_hex(&bytes),
        config_sha256: hasher::sha256_canonical(&config)?,
    };
    tracing::info!(
        districts = config.districts.len(),
        rows = history.rows().len(),
        history_sha256 = %digests.history_sha256,
        "inputs loaded"
    );

    Ok(LoadedInputs { config, history, digests })
}

/// Missing configured districts are an integrity error; extra columns are
/// ignored with a warning.
pub fn check_columns(history: &HistoricalVoteTable, districts: &[DistrictId]) -> IoResult<()> {
    let missing: Vec<&str> = districts
        .iter()
        .filter(|d| history.column_index(d).is_none())
        .map(|d| d.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(IoError::Integrity(format!(
            "historical table is missing district column(s): {}",
            missing.join(", ")
        )));
    }

    let configured: BTreeSet<&DistrictId> = districts.iter().collect();
    for c in history.columns() {
        if !configured.contains(c) {
            tracing::warn!(column = %c, "ignoring column not listed in configuration");
        }
    }
    Ok(())
}
