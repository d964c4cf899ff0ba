//! crates/hc_io/src/lib.rs
//! I/O crate for the simulator.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - `table`: semicolon-delimited historical vote table → `HistoricalVoteTable`.
//! - `config`: JSON election configuration → validated `ElectionConfig`.
//! - `canonical_json` / `hasher`: provenance digests for reports.
//! - `loader`: one-shot load of config + history with cross-checks.

#![forbid(unsafe_code)]

use hc_core::SimError;
use thiserror::Error;

/// Unified error for hc_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, read, rename).
    #[error("io/path error: {0}")]
    Path(String),

    /// CSV parsing failures raised by polars.
    #[error("csv error: {0}")]
    Csv(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization errors.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// A cell or header of the vote table that cannot be used.
    #[error("table error at row {row}, column {column:?}: {msg}")]
    Table { row: usize, column: String, msg: String },

    /// Configuration failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Inputs disagree with each other (e.g. a configured district has no column).
    #[error("data integrity: {0}")]
    Integrity(String),

    /// Values outside their domain.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer.
        IoError::Json {
            pointer: "/".to_string(),
            msg: e.to_string(),
        }
    }
}

impl From<SimError> for IoError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::InvalidInput(m) => IoError::Invalid(m),
            SimError::DataIntegrity(m) => IoError::Integrity(m),
        }
    }
}

/* ---------------- Public modules ---------------- */

pub mod canonical_json;
pub mod config;
pub mod hasher;
pub mod loader;
pub mod table;

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, to_canonical_json_bytes};
    pub use crate::config::{load_config, parse_config};
    pub use crate::hasher::{sha256_canonical, sha256_file, sha256_hex};
    pub use crate::loader::{load_inputs, InputDigests, LoadedInputs};
    pub use crate::table::{read_history_bytes, read_history_path, PLACEHOLDER_TOKENS};
}
