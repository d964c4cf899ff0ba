//! hc_report: pure offline report model + renderers (JSON/text).
//!
//! - No I/O here. Callers hand over a finished scenario and the input digests.
//! - Percent strings use one-decimal formatting.
//! - Stable section order and field names.

#![deny(unsafe_code)]

pub mod structure;

#[cfg(feature = "render_json")]
pub mod render_json;

#[cfg(feature = "render_text")]
pub mod render_text;

pub use structure::{build_model, ReportModel};

#[cfg(feature = "render_json")]
pub use render_json::{render_json, render_json_value};

#[cfg(feature = "render_text")]
pub use render_text::render_text;

#[cfg(test)]
pub(crate) mod test_support {
    use hc_core::config::ElectionConfig;
    use hc_core::{HistoricalVoteTable, HistoryRow, PartyId};
    use hc_io::loader::{InputDigests, LoadedInputs};
    use hc_pipeline::{run_scenario, ScenarioOutput, ScenarioRequest};

    /// Two districts (N: 3 seats, S: 2), parties A and B, A raised to 60%.
    /// Result: A 4 seats (N 3, S 1), B 1.
    pub fn scenario() -> (ScenarioOutput, ElectionConfig, InputDigests) {
        let config: ElectionConfig = serde_json::from_str(
            r##"{
                "title": "Mini",
                "districts": [{"id": "N", "seats": 3}, {"id": "S", "seats": 2}],
                "tracked_parties": ["A", "B"],
                "majority_seats": 3,
                "blocks": [{"name": "AB", "parties": ["A"]}],
                "party_order": ["B", "A", "Outros"],
                "party_colors": {"B": "#f00"}
            }"##,
        )
        .unwrap();
        let history = HistoricalVoteTable::new(
            config.district_ids(),
            vec![
                HistoryRow { label: "A".into(), votes: vec![60.0, 20.0] },
                HistoryRow { label: "B".into(), votes: vec![20.0, 60.0] },
                HistoryRow { label: "X".into(), votes: vec![20.0, 20.0] },
            ],
        )
        .unwrap();
        let digests = InputDigests { history_sha256: "ab".repeat(32), config_sha256: "cd".repeat(32) };
        let inputs = LoadedInputs { config: config.clone(), history, digests: digests.clone() };
        let req = ScenarioRequest { overrides: vec![(PartyId::new("A").unwrap(), 60.0)], ..Default::default() };
        let out = run_scenario(&inputs, &req).unwrap();
        (out, config, digests)
    }
}
