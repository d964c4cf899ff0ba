//! Baseline percentages: the historical national share of each tracked party,
//! one decimal, with the aggregate taking the remainder to 100.

use hc_core::rounding::round_1dp;
use hc_core::{DistrictId, HistoricalVoteTable, Party, PartyRoster, SimError};

use crate::simulate::Percentages;

/// Starting vector for a scenario (the "reset" values).
///
/// Tracked parties absent from the table start at 0. The aggregate is
/// `round(100 − Σ tracked)`, floored at 0.
pub fn baseline_percentages(
    history: &HistoricalVoteTable,
    roster: &PartyRoster,
    districts: &[DistrictId],
) -> Result<Percentages, SimError> {
    let resolved = history.resolve(roster, districts)?;
    let total = resolved.total_turnout();
    if total <= 0.0 {
        return Err(SimError::DataIntegrity("historical table has no votes in the configured districts".into()));
    }

    let mut out = Percentages::new();
    let mut tracked_sum = 0.0;
    for (i, id) in roster.tracked().iter().enumerate() {
        let share = round_1dp(resolved.votes.row_sum(roster.slot(Party::Tracked(i))) / total * 100.0);
        tracked_sum += share;
        out.insert(id.clone(), share);
    }
    out.insert(roster.others().clone(), round_1dp(100.0 - tracked_sum).max(0.0));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::{HistoryRow, PartyId};

    fn d(s: &str) -> DistrictId { DistrictId::new(s).unwrap() }
    fn p(s: &str) -> PartyId { PartyId::new(s).unwrap() }

    #[test]
    fn shares_round_and_others_take_the_rest() {
        let t = HistoricalVoteTable::new(
            vec![d("N"), d("S")],
            vec![
                HistoryRow { label: "A".into(), votes: vec![1000.0, 234.0] },
                HistoryRow { label: "B".into(), votes: vec![500.0, 500.0] },
                HistoryRow { label: "X".into(), votes: vec![100.0, 0.0] },
                HistoryRow { label: "Votos nulos".into(), votes: vec![0.0, 66.0] },
            ],
        )
        .unwrap();
        let r = PartyRoster::new(vec![p("A"), p("B"), p("New")], p("Outros")).unwrap();
        let b = baseline_percentages(&t, &r, &[d("N"), d("S")]).unwrap();
        // Total 2400: A 51.416.. → 51.4, B 41.66.. → 41.7.
        assert_eq!(b[&p("A")], 51.4);
        assert_eq!(b[&p("B")], 41.7);
        assert_eq!(b[&p("New")], 0.0);
        assert!((b[&p("Outros")] - 6.9).abs() < 1e-9);
        let sum: f64 = b.values().sum();
        assert!((sum - 100.0).abs() <= 0.05, "{sum}");
    }

    #[test]
    fn empty_history_is_integrity_error() {
        let t = HistoricalVoteTable::new(vec![d("N")], vec![HistoryRow { label: "A".into(), votes: vec![0.0] }])
            .unwrap();
        let r = PartyRoster::new(vec![p("A")], p("Outros")).unwrap();
        assert!(matches!(baseline_percentages(&t, &r, &[d("N")]), Err(SimError::DataIntegrity(_))));
    }
}
