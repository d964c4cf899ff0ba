//! crates/hc_report/src/structure.rs
//! Report data model + mapper from a finished scenario.
//! No I/O and no recomputation: every figure comes from `ScenarioOutput`.
//! Percentages are pre-formatted one-decimal strings.

use hc_core::config::ElectionConfig;
use hc_core::rounding::fmt_1dp;
use hc_core::{DistrictId, PartyId};
use hc_io::loader::InputDigests;
use hc_pipeline::{BlockSeats, MajorityVerdict, ScenarioOutput};
use serde::Serialize;

// -------------------- Public model root & sections --------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportModel {
    pub cover: Cover,
    pub parties: Vec<PartyRow>,
    pub majority: MajorityBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub districts: Option<Vec<DistrictRow>>,
    pub integrity: Integrity,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Cover {
    pub title: String,
    pub projection: String,   // literal|normalized|turnout_preserving
    pub total_seats: u32,
    pub grid_columns: u32,
}

/// One row per party, in display order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartyRow {
    pub party: PartyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub baseline_pct: String, // "28.8"
    pub pct: String,
    pub seats: u32,
    pub aggregate: bool,
    /// What the aggregate row folds together (aggregate row only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeatCount {
    pub party: PartyId,
    pub seats: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MajorityBlock {
    pub threshold: u32,
    pub blocks: Vec<BlockSeats>,
    pub verdict: MajorityVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_party: Option<SeatCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistrictRow {
    pub district: DistrictId,
    pub seats: u32,
    /// Seat-winning parties only, display order.
    pub allocation: Vec<SeatCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Integrity {
    pub history_sha256: String,
    pub config_sha256: String,
    pub total_turnout: f64,
}

// -------------------- Mapper --------------------

/// Build the report model. `per_district` adds the district breakdown.
pub fn build_model(
    out: &ScenarioOutput,
    cfg: &ElectionConfig,
    digests: &InputDigests,
    per_district: bool,
) -> ReportModel {
    let order = party_order(cfg);
    let pct = |m: &hc_pipeline::Percentages, p: &PartyId| fmt_1dp(m.get(p).copied().unwrap_or(0.0));

    let parties = order
        .iter()
        .map(|p| PartyRow {
            party: p.clone(),
            color: cfg.party_colors.get(p).cloned(),
            baseline_pct: pct(&out.baseline, p),
            pct: pct(&out.percentages, p),
            seats: out.outcome.seats(p),
            aggregate: p == &cfg.others_label,
            note: (p == &cfg.others_label).then(|| aggregate_note(cfg)),
        })
        .collect();

    let districts = per_district.then(|| {
        cfg.districts
            .iter()
            .map(|d| {
                let alloc = out.outcome.per_district.get(&d.id);
                DistrictRow {
                    district: d.id.clone(),
                    seats: d.seats,
                    allocation: order
                        .iter()
                        .filter_map(|p| {
                            let seats = alloc.and_then(|a| a.get(p)).copied().unwrap_or(0);
                            (seats > 0).then(|| SeatCount { party: p.clone(), seats })
                        })
                        .collect(),
                }
            })
            .collect()
    });

    ReportModel {
        cover: Cover {
            title: cfg.title.clone(),
            projection: out.options.projection.token().to_string(),
            total_seats: out.outcome.total_seats(),
            grid_columns: cfg.grid_columns,
        },
        parties,
        majority: MajorityBlock {
            threshold: cfg.majority_seats,
            blocks: hc_pipeline::block_seats(&out.outcome.national, &cfg.blocks),
            verdict: out.verdict.clone(),
            single_party: out.single_party.clone().map(|(party, seats)| SeatCount { party, seats }),
        },
        districts,
        integrity: Integrity {
            history_sha256: digests.history_sha256.clone(),
            config_sha256: digests.config_sha256.clone(),
            total_turnout: out.outcome.total_turnout,
        },
    }
}

/// "other parties + Votos em branco + Votos nulos".
fn aggregate_note(cfg: &ElectionConfig) -> String {
    std::iter::once("other parties")
        .chain(cfg.non_party_votes.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Configured display order, then any roster party it leaves out.
fn party_order(cfg: &ElectionConfig) -> Vec<PartyId> {
    let mut order = cfg.display_order();
    let rest: Vec<PartyId> = cfg
        .tracked_parties
        .iter()
        .chain(std::iter::once(&cfg.others_label))
        .filter(|p| !order.contains(p))
        .cloned()
        .collect();
    order.extend(rest);
    order
}
