//! Rebalancing: change one party's percentage and move the difference
//! proportionally across every other party so the vector keeps summing to 100.

use hc_core::rounding::round_1dp;
use hc_core::{PartyId, SimError};

use crate::simulate::Percentages;

/// Changes below this are treated as "no change" (values live on a 0.1 grid).
const MIN_DELTA: f64 = 0.001;

/// Set `changed` to `new_value` (rounded to 0.1) and rescale the others.
///
/// - Each other party moves by `delta · own / Σ others`, rounded to 0.1 and
///   floored at 0.
/// - Any residual from 100 goes to the largest other party (first in id order
///   on equal values).
pub fn rebalance(current: &Percentages, changed: &PartyId, new_value: f64) -> Result<Percentages, SimError> {
    let old = *current
        .get(changed)
        .ok_or_else(|| SimError::InvalidInput(format!("cannot rebalance unknown party {changed}")))?;
    if !new_value.is_finite() || !(0.0..=100.0).contains(&new_value) {
        return Err(SimError::InvalidInput(format!(
            "percentage for {changed} must be within [0, 100], got {new_value}"
        )));
    }

    let new_value = round_1dp(new_value);
    let mut out = current.clone();
    out.insert(changed.clone(), new_value);

    let delta = new_value - old;
    let others_sum: f64 = current.iter().filter(|(p, _)| *p != changed).map(|(_, v)| v).sum();
    if delta.abs() > MIN_DELTA && others_sum > 0.0 {
        for (p, v) in out.iter_mut().filter(|(p, _)| *p != changed) {
            let moved = delta * (current[p] / others_sum);
            *v = round_1dp(current[p] - moved).max(0.0);
        }
    }

    let total: f64 = out.values().sum();
    let residual = round_1dp(100.0 - total);
    if residual != 0.0 {
        let largest = out
            .iter()
            .filter(|(p, _)| *p != changed)
            .fold(None::<(&PartyId, f64)>, |best, (p, v)| match best {
                Some((_, bv)) if bv >= *v => best,
                _ => Some((p, *v)),
            })
            .map(|(p, _)| p.clone());
        if let Some(p) = largest {
            if let Some(v) = out.get_mut(&p) {
                *v = round_1dp(*v + residual).max(0.0);
            }
        }
    }

    tracing::debug!(party = %changed, from = old, to = new_value, "percentages rebalanced");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> PartyId { PartyId::new(s).unwrap() }

    fn v(pairs: &[(&str, f64)]) -> Percentages {
        pairs.iter().map(|(k, x)| (p(k), *x)).collect()
    }

    fn sum(m: &Percentages) -> f64 { m.values().sum() }

    #[test]
    fn raising_one_party_shrinks_the_others_proportionally() {
        let cur = v(&[("A", 40.0), ("B", 40.0), ("C", 20.0)]);
        let out = rebalance(&cur, &p("A"), 50.0).unwrap();
        assert_eq!(out[&p("A")], 50.0);
        assert_eq!(out[&p("B")], 33.3);
        assert_eq!(out[&p("C")], 16.7);
        assert!((sum(&out) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn residual_lands_on_the_largest_other_party() {
        let cur = v(&[("A", 10.0), ("B", 30.0), ("C", 30.0), ("D", 30.0)]);
        let out = rebalance(&cur, &p("A"), 11.0).unwrap();
        // Each of B, C, D moves by 1/3 → 29.7 (total 100.1); B absorbs −0.1.
        assert_eq!(out[&p("B")], 29.6);
        assert_eq!(out[&p("C")], 29.7);
        assert_eq!(out[&p("D")], 29.7);
        assert!((sum(&out) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn setting_to_100_zeroes_everyone_else() {
        let cur = v(&[("A", 30.0), ("B", 50.0), ("C", 20.0)]);
        let out = rebalance(&cur, &p("A"), 100.0).unwrap();
        assert_eq!(out[&p("A")], 100.0);
        assert!(out.iter().filter(|(k, _)| k.as_str() != "A").all(|(_, x)| *x == 0.0));
    }

    #[test]
    fn never_negative_and_total_stays_100() {
        let cur = v(&[("A", 0.1), ("B", 0.1), ("C", 99.8)]);
        for target in [0.0, 0.3, 12.34, 55.55, 99.9] {
            let out = rebalance(&cur, &p("C"), target).unwrap();
            assert!(out.values().all(|x| *x >= 0.0), "{out:?}");
            assert!((sum(&out) - 100.0).abs() < 1e-9, "{target}: {out:?}");
        }
    }

    #[test]
    fn rejects_unknown_party_and_out_of_range() {
        let cur = v(&[("A", 50.0), ("B", 50.0)]);
        assert!(matches!(rebalance(&cur, &p("Z"), 1.0), Err(SimError::InvalidInput(_))));
        assert!(matches!(rebalance(&cur, &p("A"), 100.1), Err(SimError::InvalidInput(_))));
        assert!(matches!(rebalance(&cur, &p("A"), f64::NAN), Err(SimError::InvalidInput(_))));
    }
}
