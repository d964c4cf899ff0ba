//! Regional distribution models derived from historical district results.
//!
//! Two views of the same resolved history:
//! - `regional_proportions`: per party, the share of *that party's* national
//!   vote coming from each district (rows sum to 1).
//! - `regional_indices`: per party, its share *within* each district divided by
//!   its mean within-district share (1.0 = the party's national average).
//!
//! Row order follows the roster slots (tracked parties, then the aggregate);
//! column order follows the configured district list.

use hc_core::{
    DistrictId, HistoricalVoteTable, Party, PartyDistrictTable, PartyGrid, PartyRoster,
    ResolvedHistory, SimError,
};

/// Party → district fraction in [0,1]; each row sums to 1.
pub type ProportionMatrix = PartyDistrictTable;

/// Party → district regional index (>= 0; 1.0 is neutral).
pub type IndexMatrix = PartyDistrictTable;

/// Build the proportion matrix from the raw table.
///
/// Fails with `DataIntegrity` when a configured district column is missing.
pub fn regional_proportions(
    history: &HistoricalVoteTable,
    roster: &PartyRoster,
    districts: &[DistrictId],
) -> Result<ProportionMatrix, SimError> {
    let resolved = history.resolve(roster, districts)?;
    proportions_from_resolved(&resolved, roster, districts)
}

/// Same as `regional_proportions`, over an already-resolved history.
pub fn proportions_from_resolved(
    resolved: &ResolvedHistory,
    roster: &PartyRoster,
    districts: &[DistrictId],
) -> Result<ProportionMatrix, SimError> {
    check_shape(resolved, roster, districts)?;

    let n = districts.len();
    let uniform = 1.0 / n as f64;
    let mut grid = PartyGrid::zeros(roster.len(), n);

    for party in roster.parties() {
        let slot = roster.slot(party);
        let out = grid.row_mut(slot);

        if !resolved.is_present(party) {
            tracing::debug!(party = %roster.id(party), "no historical row; uniform distribution");
            out.fill(uniform);
            continue;
        }

        let row = resolved.votes.row(slot);
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            for (o, v) in out.iter_mut().zip(row) {
                *o = v / total;
            }
        } else {
            tracing::debug!(party = %roster.id(party), "zero historical votes; uniform distribution");
            out.fill(uniform);
        }
    }

    label(grid, roster, districts)
}

/// Regional index per party and district.
///
/// share(p,d) = votes(p,d) / turnout(d); index = share / mean_d(share).
/// Districts with zero turnout are skipped in the mean; any undefined index
/// (0/0, x/0) is replaced by 1.0. Tracked parties absent from the table get a
/// flat share and therefore index 1.0 everywhere.
pub fn regional_indices(
    resolved: &ResolvedHistory,
    roster: &PartyRoster,
    districts: &[DistrictId],
) -> Result<IndexMatrix, SimError> {
    check_shape(resolved, roster, districts)?;

    let n = districts.len();
    let mut grid = PartyGrid::zeros(roster.len(), n);

    for party in roster.parties() {
        let slot = roster.slot(party);
        let out = grid.row_mut(slot);

        if !resolved.is_present(party) {
            out.fill(1.0);
            continue;
        }

        let shares: Vec<Option<f64>> = resolved
            .votes
            .row(slot)
            .iter()
            .zip(&resolved.district_turnout)
            .map(|(v, t)| if *t > 0.0 { Some(v / t) } else { None })
            .collect();

        let defined: Vec<f64> = shares.iter().flatten().copied().collect();
        let mean = if defined.is_empty() {
            f64::NAN
        } else {
            defined.iter().sum::<f64>() / defined.len() as f64
        };

        for (o, s) in out.iter_mut().zip(&shares) {
            let idx = s.map(|s| s / mean).unwrap_or(f64::NAN);
            *o = if idx.is_finite() { idx } else { 1.0 };
        }
    }

    label(grid, roster, districts)
}

fn check_shape(resolved: &ResolvedHistory, roster: &PartyRoster, districts: &[DistrictId]) -> Result<(), SimError> {
    if districts.is_empty() {
        return Err(SimError::DataIntegrity("no districts configured".into()));
    }
    if resolved.votes.rows() != roster.len()
        || resolved.votes.cols() != districts.len()
        || resolved.district_turnout.len() != districts.len()
        || resolved.present.len() != roster.tracked().len()
    {
        return Err(SimError::DataIntegrity(format!(
            "resolved history is {}x{}, expected {}x{}",
            resolved.votes.rows(),
            resolved.votes.cols(),
            roster.len(),
            districts.len()
        )));
    }
    Ok(())
}

fn label(grid: PartyGrid, roster: &PartyRoster, districts: &[DistrictId]) -> Result<PartyDistrictTable, SimError> {
    PartyDistrictTable::new(roster.ids(), districts.to_vec(), grid)
        .ok_or_else(|| SimError::DataIntegrity("grid shape does not match roster/districts".into()))
}

/// Convenience for callers holding a `Party` instead of a slot.
pub fn row_of<'a>(m: &'a PartyDistrictTable, roster: &PartyRoster, p: Party) -> &'a [f64] {
    m.grid().row(roster.slot(p))
}
