//! Property tests for the D'Hondt allocator: conservation, non-negativity,
//! vote monotonicity, and independence from map construction order.

use std::collections::BTreeMap;

use hc_algo::allocation::allocate_dhondt;
use hc_core::PartyId;
use proptest::prelude::*;

const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];

fn to_map(votes: &[u32]) -> BTreeMap<PartyId, f64> {
    votes
        .iter()
        .enumerate()
        .map(|(i, v)| (PartyId::new(NAMES[i]).unwrap(), f64::from(*v)))
        .collect()
}

fn votes_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..2_000_000, 1..=NAMES.len())
}

proptest! {
    #[test]
    fn seats_sum_exactly(votes in votes_strategy(), seats in 0u32..60) {
        let out = allocate_dhondt(seats, &to_map(&votes)).unwrap();
        prop_assert_eq!(out.values().sum::<u32>(), seats);
        prop_assert_eq!(out.len(), votes.len());
    }

    #[test]
    fn more_votes_never_cost_seats(
        votes in votes_strategy(),
        seats in 1u32..60,
        who in 0usize..NAMES.len(),
        bump in 1u32..500_000,
    ) {
        let who = who % votes.len();
        let before = allocate_dhondt(seats, &to_map(&votes)).unwrap();

        let mut more = votes.clone();
        more[who] += bump;
        let after = allocate_dhondt(seats, &to_map(&more)).unwrap();

        let id = PartyId::new(NAMES[who]).unwrap();
        prop_assert!(after[&id] >= before[&id]);
    }

    #[test]
    fn fractional_votes_still_conserve_seats(
        votes in prop::collection::vec(0.0f64..1.0e6, 1..=NAMES.len()),
        seats in 1u32..50,
    ) {
        let map: BTreeMap<PartyId, f64> = votes
            .iter()
            .enumerate()
            .map(|(i, v)| (PartyId::new(NAMES[i]).unwrap(), *v))
            .collect();
        let out = allocate_dhondt(seats, &map).unwrap();
        prop_assert_eq!(out.values().sum::<u32>(), seats);
    }

    #[test]
    fn repeated_calls_are_identical(votes in votes_strategy(), seats in 0u32..40) {
        let m = to_map(&votes);
        prop_assert_eq!(allocate_dhondt(seats, &m).unwrap(), allocate_dhondt(seats, &m).unwrap());
    }
}

#[test]
fn largest_party_never_trails_smaller_one() {
    let m = to_map(&[400, 300, 200, 100]);
    let out = allocate_dhondt(10, &m).unwrap();
    let seats: Vec<u32> = out.values().copied().collect();
    assert!(seats.windows(2).all(|w| w[0] >= w[1]), "{seats:?}");
    assert_eq!(seats, vec![4, 3, 2, 1]);
}
