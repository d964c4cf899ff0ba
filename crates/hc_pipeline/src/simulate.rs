//! ElectionSimulator: national percentages → per-district projected votes →
//! per-district D'Hondt → national seat totals.
//!
//! Pure over its inputs: same percentages, matrix, history and districts give
//! the same outcome. Nothing is cached between calls.

use std::collections::{BTreeMap, BTreeSet};

use hc_algo::allocation::allocate_dhondt;
use hc_algo::regional::{regional_indices, ProportionMatrix};
use hc_core::config::{DistrictSeats, ProjectionMode};
use hc_core::{
    DistrictId, HistoricalVoteTable, PartyDistrictTable, PartyGrid, PartyId, PartyRoster,
    ResolvedHistory, SimError,
};

/// Party → national vote share in percent.
pub type Percentages = BTreeMap<PartyId, f64>;
/// Party → seats.
pub type SeatMap = BTreeMap<PartyId, u32>;

/// Distance from 100 tolerated before a literal projection is logged.
const SUM_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationOptions {
    pub projection: ProjectionMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    /// Every roster party, the aggregate included (always 0).
    pub national: SeatMap,
    /// Tracked parties only, per configured district.
    pub per_district: BTreeMap<DistrictId, SeatMap>,
    /// Projected votes, roster slot × configured district.
    pub simulated_votes: PartyDistrictTable,
    /// Historical turnout over every row and configured district.
    pub total_turnout: f64,
}

impl SimulationOutcome {
    pub fn seats(&self, p: &PartyId) -> u32 {
        self.national.get(p).copied().unwrap_or(0)
    }

    pub fn total_seats(&self) -> u32 {
        self.national.values().sum()
    }
}

/// Run one simulation pass.
///
/// Errors:
/// - `InvalidInput`: unknown party, non-finite or out-of-range percentage,
///   zero-sum vector under a normalizing projection.
/// - `DataIntegrity`: configured district missing from `history`, duplicate
///   district, or `proportions` not shaped as roster × districts.
pub fn simulate(
    percentages: &Percentages,
    proportions: &ProportionMatrix,
    history: &HistoricalVoteTable,
    roster: &PartyRoster,
    districts: &[DistrictSeats],
    options: SimulationOptions,
) -> Result<SimulationOutcome, SimError> {
    let pct = dense_percentages(percentages, roster)?;
    let ids = district_ids(districts)?;
    let resolved = history.resolve(roster, &ids)?;
    check_proportions(proportions, roster, &ids)?;

    let sum: f64 = pct.iter().sum();
    let votes = match options.projection {
        ProjectionMode::Literal => {
            if (sum - 100.0).abs() > SUM_TOLERANCE {
                tracing::warn!(sum, "percentages do not sum to 100; projecting them as given");
            }
            project_national(&pct, 1.0, proportions, &resolved)
        }
        ProjectionMode::Normalized => {
            let scale = 100.0 / positive_sum(sum)?;
            project_national(&pct, scale, proportions, &resolved)
        }
        ProjectionMode::TurnoutPreserving => {
            positive_sum(sum)?;
            project_turnout_preserving(&pct, &resolved, roster, &ids)?
        }
    };

    let mut national: SeatMap = roster.ids().into_iter().map(|p| (p, 0)).collect();
    let mut per_district = BTreeMap::new();
    for (j, d) in districts.iter().enumerate() {
        let district_votes: BTreeMap<PartyId, f64> = roster
            .tracked()
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), votes.get(i, j)))
            .collect();
        let seats = allocate_dhondt(d.seats, &district_votes)?;
        for (p, s) in &seats {
            *national.entry(p.clone()).or_insert(0) += s;
        }
        per_district.insert(d.id.clone(), seats);
    }

    let total_turnout = resolved.total_turnout();
    tracing::debug!(
        projection = options.projection.token(),
        pct_sum = sum,
        total_turnout,
        seats = national.values().sum::<u32>(),
        "simulation pass complete"
    );

    let simulated_votes = PartyDistrictTable::new(roster.ids(), ids, votes)
        .ok_or_else(|| SimError::DataIntegrity("simulated vote grid has the wrong shape".into()))?;

    Ok(SimulationOutcome { national, per_district, simulated_votes, total_turnout })
}

/// Percentages in roster slot order; parties not listed are 0.
fn dense_percentages(percentages: &Percentages, roster: &PartyRoster) -> Result<Vec<f64>, SimError> {
    let mut out = vec![0.0; roster.len()];
    for (id, &v) in percentages {
        let party = roster
            .resolve(id)
            .ok_or_else(|| SimError::InvalidInput(format!("unknown party {id} in percentages")))?;
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(SimError::InvalidInput(format!(
                "percentage for {id} must be within [0, 100], got {v}"
            )));
        }
        out[roster.slot(party)] = v;
    }
    Ok(out)
}

fn district_ids(districts: &[DistrictSeats]) -> Result<Vec<DistrictId>, SimError> {
    if districts.is_empty() {
        return Err(SimError::DataIntegrity("no districts configured".into()));
    }
    let mut seen = BTreeSet::new();
    for d in districts {
        if !seen.insert(&d.id) {
            return Err(SimError::DataIntegrity(format!("district {} listed twice", d.id)));
        }
    }
    Ok(districts.iter().map(|d| d.id.clone()).collect())
}

fn check_proportions(m: &ProportionMatrix, roster: &PartyRoster, ids: &[DistrictId]) -> Result<(), SimError> {
    if m.parties() != roster.ids().as_slice() || m.districts() != ids {
        return Err(SimError::DataIntegrity(format!(
            "proportion matrix is {}x{}, expected roster ({}) x configured districts ({})",
            m.parties().len(),
            m.districts().len(),
            roster.len(),
            ids.len()
        )));
    }
    Ok(())
}

fn positive_sum(sum: f64) -> Result<f64, SimError> {
    if sum > 0.0 {
        Ok(sum)
    } else {
        Err(SimError::InvalidInput("percentages sum to zero; nothing to normalize".into()))
    }
}

/// desired(p) = pct(p)·scale/100 · T; votes(p,d) = desired(p) · proportion(p,d).
fn project_national(
    pct: &[f64],
    scale: f64,
    proportions: &ProportionMatrix,
    resolved: &ResolvedHistory,
) -> PartyGrid {
    let t = resolved.total_turnout();
    let g = proportions.grid();
    let mut out = PartyGrid::zeros(g.rows(), g.cols());
    for (s, p) in pct.iter().enumerate() {
        let desired = (p * scale) / 100.0 * t;
        for d in 0..g.cols() {
            out.set(s, d, desired * g.get(s, d));
        }
    }
    out
}

/// Per district: pct(p)·index(p,d), renormalized within the district and
/// scaled by that district's historical turnout.
fn project_turnout_preserving(
    pct: &[f64],
    resolved: &ResolvedHistory,
    roster: &PartyRoster,
    ids: &[DistrictId],
) -> Result<PartyGrid, SimError> {
    let idx = regional_indices(resolved, roster, ids)?;
    let total_pct: f64 = pct.iter().sum();
    let mut out = PartyGrid::zeros(roster.len(), ids.len());

    for (j, d) in ids.iter().enumerate() {
        let turnout = resolved.district_turnout[j];
        let adjusted: Vec<f64> = pct.iter().enumerate().map(|(s, p)| p * idx.grid().get(s, j)).collect();
        let weight: f64 = adjusted.iter().sum();
        if weight <= 0.0 {
            tracing::debug!(district = %d, "regional indices zero out every party; using national shares");
        }
        for (s, a) in adjusted.iter().enumerate() {
            let share = if weight > 0.0 { a / weight } else { pct[s] / total_pct };
            out.set(s, j, turnout * share);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_algo::regional::regional_proportions;
    use hc_core::HistoryRow;

    fn d(s: &str) -> DistrictId { DistrictId::new(s).unwrap() }
    fn p(s: &str) -> PartyId { PartyId::new(s).unwrap() }

    struct Fx {
        history: HistoricalVoteTable,
        roster: PartyRoster,
        districts: Vec<DistrictSeats>,
    }

    /// N: A60 B20 X20 (3 seats); S: A20 B60 X20 (2 seats). T = 200.
    fn fx() -> Fx {
        let history = HistoricalVoteTable::new(
            vec![d("N"), d("S")],
            vec![
                HistoryRow { label: "A".into(), votes: vec![60.0, 20.0] },
                HistoryRow { label: "B".into(), votes: vec![20.0, 60.0] },
                HistoryRow { label: "X".into(), votes: vec![20.0, 20.0] },
            ],
        )
        .unwrap();
        let roster = PartyRoster::new(vec![p("A"), p("B")], p("Outros")).unwrap();
        let districts = vec![
            DistrictSeats { id: d("N"), seats: 3 },
            DistrictSeats { id: d("S"), seats: 2 },
        ];
        Fx { history, roster, districts }
    }

    fn pcts(v: &[(&str, f64)]) -> Percentages {
        v.iter().map(|(k, x)| (p(k), *x)).collect()
    }

    fn run(fx: &Fx, pct: &Percentages, projection: ProjectionMode) -> Result<SimulationOutcome, SimError> {
        let ids: Vec<DistrictId> = fx.districts.iter().map(|d| d.id.clone()).collect();
        let m = regional_proportions(&fx.history, &fx.roster, &ids)?;
        simulate(pct, &m, &fx.history, &fx.roster, &fx.districts, SimulationOptions { projection })
    }

    #[test]
    fn literal_projection_allocates_per_district() {
        let fx = fx();
        // A: 100 votes → N 75, S 25. B: 60 → N 15, S 45.
        let out = run(&fx, &pcts(&[("A", 50.0), ("B", 30.0), ("Outros", 20.0)]), ProjectionMode::Literal).unwrap();
        assert_eq!(out.per_district[&d("N")][&p("A")], 3);
        assert_eq!(out.per_district[&d("S")][&p("A")], 1);
        assert_eq!(out.per_district[&d("S")][&p("B")], 1);
        assert_eq!(out.seats(&p("A")), 4);
        assert_eq!(out.seats(&p("B")), 1);
        assert_eq!(out.seats(&p("Outros")), 0);
        assert_eq!(out.total_seats(), 5);
        assert_eq!(out.total_turnout, 200.0);
        assert_eq!(out.simulated_votes.value(&p("A"), &d("N")), Some(75.0));
        assert!(!out.per_district[&d("N")].contains_key(&p("Outros")));
    }

    #[test]
    fn equal_district_quotients_follow_the_tie_rule() {
        let fx = fx();
        // A: 80 → N 60; B: 80 → N 20. A/3 == B/1 == 20: B (fewer seats) wins.
        let out = run(&fx, &pcts(&[("A", 40.0), ("B", 40.0), ("Outros", 20.0)]), ProjectionMode::Literal).unwrap();
        assert_eq!(out.per_district[&d("N")][&p("A")], 2);
        assert_eq!(out.per_district[&d("N")][&p("B")], 1);
    }

    #[test]
    fn normalized_projection_rescales_to_100() {
        let fx = fx();
        let half = run(&fx, &pcts(&[("A", 25.0), ("B", 15.0), ("Outros", 10.0)]), ProjectionMode::Normalized).unwrap();
        let full = run(&fx, &pcts(&[("A", 50.0), ("B", 30.0), ("Outros", 20.0)]), ProjectionMode::Literal).unwrap();
        assert_eq!(half, full);
    }

    #[test]
    fn turnout_preserving_keeps_district_totals() {
        let fx = fx();
        let out = run(&fx, &pcts(&[("A", 10.0), ("B", 70.0), ("Outros", 20.0)]), ProjectionMode::TurnoutPreserving)
            .unwrap();
        let g = out.simulated_votes.grid();
        assert!((g.col_sum(0) - 100.0).abs() < 1e-9);
        assert!((g.col_sum(1) - 100.0).abs() < 1e-9);
        assert_eq!(out.total_seats(), 5);
        assert_eq!(out.seats(&p("Outros")), 0);
    }

    #[test]
    fn repeated_passes_are_identical() {
        let fx = fx();
        let v = pcts(&[("A", 33.3), ("B", 41.2), ("Outros", 25.5)]);
        for mode in [ProjectionMode::Literal, ProjectionMode::Normalized, ProjectionMode::TurnoutPreserving] {
            assert_eq!(run(&fx, &v, mode).unwrap(), run(&fx, &v, mode).unwrap());
        }
    }

    #[test]
    fn literal_zero_vector_still_fills_every_seat() {
        let fx = fx();
        let out = run(&fx, &Percentages::new(), ProjectionMode::Literal).unwrap();
        assert_eq!(out.total_seats(), 5);
        // All-zero districts: A (lower id) gets the odd seat.
        assert_eq!(out.per_district[&d("N")][&p("A")], 2);
    }

    #[test]
    fn aggregate_never_wins_seats_even_at_100() {
        let fx = fx();
        let all_others = pcts(&[("Outros", 100.0)]);
        for mode in [ProjectionMode::Literal, ProjectionMode::Normalized, ProjectionMode::TurnoutPreserving] {
            let out = run(&fx, &all_others, mode).unwrap();
            assert_eq!(out.seats(&p("Outros")), 0, "{mode:?}");
            assert_eq!(out.total_seats(), 5, "{mode:?}");
            // Tracked parties sit at zero votes; the tie rule spreads the seats.
            assert_eq!(out.seats(&p("A")), 3, "{mode:?}");
            assert_eq!(out.seats(&p("B")), 2, "{mode:?}");
            assert!(out.per_district.values().all(|m| !m.contains_key(&p("Outros"))));
        }
    }

    #[test]
    fn rejects_bad_percentages() {
        let fx = fx();
        let bad = [
            pcts(&[("Z", 1.0)]),
            pcts(&[("A", 100.5)]),
            pcts(&[("A", -0.1)]),
            pcts(&[("A", f64::NAN)]),
        ];
        for v in &bad {
            assert!(matches!(run(&fx, v, ProjectionMode::Literal), Err(SimError::InvalidInput(_))), "{v:?}");
        }
        let zero = pcts(&[("A", 0.0)]);
        assert!(matches!(run(&fx, &zero, ProjectionMode::Normalized), Err(SimError::InvalidInput(_))));
        assert!(matches!(run(&fx, &zero, ProjectionMode::TurnoutPreserving), Err(SimError::InvalidInput(_))));
    }

    #[test]
    fn mismatched_matrix_is_integrity_error() {
        let fx = fx();
        let m = regional_proportions(&fx.history, &fx.roster, &[d("N")]).unwrap();
        let r = simulate(&pcts(&[("A", 50.0)]), &m, &fx.history, &fx.roster, &fx.districts, SimulationOptions::default());
        assert!(matches!(r, Err(SimError::DataIntegrity(_))));
    }

    #[test]
    fn missing_district_column_is_integrity_error() {
        let mut fx = fx();
        let m = regional_proportions(&fx.history, &fx.roster, &[d("N"), d("S")]).unwrap();
        fx.districts.push(DistrictSeats { id: d("Ilhas"), seats: 1 });
        let r = simulate(&pcts(&[("A", 50.0)]), &m, &fx.history, &fx.roster, &fx.districts, SimulationOptions::default());
        assert!(matches!(r, Err(SimError::DataIntegrity(m)) if m.contains("Ilhas")));
    }
}
