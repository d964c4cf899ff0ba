//! JSON configuration loader. Parsing is strict (`deny_unknown_fields` on the
//! core types); every `ConfigIssue` is collected before failing.

use std::fs;
use std::path::Path;

use hc_core::config::ElectionConfig;

use crate::{IoError, IoResult};

/// Read, parse and validate a configuration file.
pub fn load_config(path: &Path) -> IoResult<ElectionConfig> {
    let bytes = fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    parse_config(&bytes)
}

/// Parse and validate configuration bytes.
pub fn parse_config(bytes: &[u8]) -> IoResult<ElectionConfig> {
    let cfg: ElectionConfig = serde_json::from_slice(bytes).map_err(|e| IoError::Json {
        pointer: format!("line {} column {}", e.line(), e.column()),
        msg: e.to_string(),
    })?;
    check(cfg)
}

/// Validate an in-memory configuration (e.g. the bundled default).
pub fn check(cfg: ElectionConfig) -> IoResult<ElectionConfig> {
    let issues = cfg.validate();
    if issues.is_empty() {
        return Ok(cfg);
    }
    let joined = issues
        .iter()
        .map(|i| format!("{}: {}", i.code, i.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(IoError::Config(joined))
}
