//! history.rs: historical district-level vote table.
//!
//! Rows are raw labels from the source table (tracked parties, untracked
//! parties, blank/null ballots). Columns are district labels. Values are
//! already normalized: finite, non-negative. Immutable after construction.

use std::collections::BTreeSet;

use crate::errors::SimError;
use crate::grid::PartyGrid;
use crate::party::{Party, PartyRoster};
use crate::tokens::DistrictId;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub label: String,
    /// One value per table column, in column order.
    pub votes: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HistoricalVoteTable {
    columns: Vec<DistrictId>,
    rows: Vec<HistoryRow>,
}

/// History projected onto a roster and a configured district list.
///
/// `votes` has one row per roster slot (tracked parties, then `Others`) and one
/// column per configured district. Untracked rows are summed into `Others`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedHistory {
    pub votes: PartyGrid,
    /// Per tracked slot: did the party have a row in the table at all.
    pub present: Vec<bool>,
    /// Column sums over every row (tracked + untracked).
    pub district_turnout: Vec<f64>,
}

impl ResolvedHistory {
    pub fn total_turnout(&self) -> f64 {
        self.district_turnout.iter().sum()
    }

    pub fn is_present(&self, p: Party) -> bool {
        match p {
            Party::Tracked(i) => self.present.get(i).copied().unwrap_or(false),
            Party::Others => true,
        }
    }
}

impl HistoricalVoteTable {
    /// Build a table. Fails with `DataIntegrity` on duplicate columns/labels or
    /// ragged rows, and with `InvalidInput` on negative or non-finite votes.
    pub fn new(columns: Vec<DistrictId>, rows: Vec<HistoryRow>) -> Result<Self, SimError> {
        let mut seen_c = BTreeSet::new();
        for c in &columns {
            if !seen_c.insert(c) {
                return Err(SimError::DataIntegrity(format!("duplicate district column {c}")));
            }
        }
        let mut seen_r = BTreeSet::new();
        for r in &rows {
            let label = r.label.trim();
            if label.is_empty() {
                return Err(SimError::DataIntegrity("row with empty label".into()));
            }
            if !seen_r.insert(label) {
                return Err(SimError::DataIntegrity(format!("duplicate row label {label}")));
            }
            if r.votes.len() != columns.len() {
                return Err(SimError::DataIntegrity(format!(
                    "row {label} has {} values, expected {}",
                    r.votes.len(),
                    columns.len()
                )));
            }
            for (c, v) in columns.iter().zip(&r.votes) {
                if !v.is_finite() || *v < 0.0 {
                    return Err(SimError::InvalidInput(format!(
                        "votes for {label} in {c} must be finite and non-negative, got {v}"
                    )));
                }
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[DistrictId] { &self.columns }
    pub fn rows(&self) -> &[HistoryRow] { &self.rows }

    pub fn column_index(&self, d: &DistrictId) -> Option<usize> {
        self.columns.iter().position(|c| c == d)
    }

    pub fn row(&self, label: &str) -> Option<&HistoryRow> {
        self.rows.iter().find(|r| r.label.trim() == label)
    }

    /// Column indices for `districts`, in that order.
    /// Missing configured district → `DataIntegrity`.
    pub fn project(&self, districts: &[DistrictId]) -> Result<Vec<usize>, SimError> {
        districts
            .iter()
            .map(|d| {
                self.column_index(d).ok_or_else(|| {
                    SimError::DataIntegrity(format!("historical table is missing district column {d}"))
                })
            })
            .collect()
    }

    /// Resolve row labels once against `roster` and fold untracked rows into
    /// the aggregate slot.
    pub fn resolve(&self, roster: &PartyRoster, districts: &[DistrictId]) -> Result<ResolvedHistory, SimError> {
        let cols = self.project(districts)?;
        let mut votes = PartyGrid::zeros(roster.len(), districts.len());
        let mut present = vec![false; roster.tracked().len()];
        let mut district_turnout = vec![0.0; districts.len()];
        let others_slot = roster.slot(Party::Others);

        for row in &self.rows {
            let slot = match roster.resolve_tracked_label(&row.label) {
                Some(i) => {
                    present[i] = true;
                    i
                }
                None => others_slot,
            };
            let out = votes.row_mut(slot);
            for (j, &c) in cols.iter().enumerate() {
                out[j] += row.votes[c];
                district_turnout[j] += row.votes[c];
            }
        }

        Ok(ResolvedHistory { votes, present, district_turnout })
    }
}
