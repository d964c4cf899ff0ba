//! render_json.rs: canonical JSON for a report model.
//!
//! Key order is canonical (sorted) regardless of serde_json features, so the
//! bytes for identical inputs are identical across runs.

use serde_json::Value;

use crate::structure::ReportModel;

/// Model as a JSON value (object keys in serde_json's map order).
pub fn render_json_value(m: &ReportModel) -> Result<Value, serde_json::Error> {
    serde_json::to_value(m)
}

/// Canonical compact bytes, no trailing newline.
pub fn render_json(m: &ReportModel) -> Result<Vec<u8>, hc_io::IoError> {
    hc_io::canonical_json::to_canonical_bytes(m)
}
