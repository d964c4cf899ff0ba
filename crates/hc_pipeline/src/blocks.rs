//! Block / majority assessment over national seat totals.

use std::collections::BTreeSet;

use hc_core::config::Block;
use hc_core::PartyId;
use serde::Serialize;

use crate::simulate::SeatMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSeats {
    pub name: String,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MajorityVerdict {
    /// First block (configured order) reaching the threshold.
    Block { name: String, seats: u32, surplus: u32 },
    /// No block reaches it. `unaligned` lists seat-holding parties outside
    /// every block.
    Hung { blocks: Vec<BlockSeats>, unaligned: Vec<(PartyId, u32)> },
}

impl MajorityVerdict {
    pub fn has_majority(&self) -> bool {
        matches!(self, MajorityVerdict::Block { .. })
    }
}

/// Seats held by each block, in configured order.
pub fn block_seats(national: &SeatMap, blocks: &[Block]) -> Vec<BlockSeats> {
    blocks
        .iter()
        .map(|b| BlockSeats {
            name: b.name.clone(),
            seats: b.parties.iter().map(|p| national.get(p).copied().unwrap_or(0)).sum(),
        })
        .collect()
}

pub fn assess_majority(national: &SeatMap, blocks: &[Block], majority: u32) -> MajorityVerdict {
    let totals = block_seats(national, blocks);
    if let Some(b) = totals.iter().find(|b| b.seats >= majority) {
        return MajorityVerdict::Block { name: b.name.clone(), seats: b.seats, surplus: b.seats - majority };
    }

    let members: BTreeSet<&PartyId> = blocks.iter().flat_map(|b| &b.parties).collect();
    let unaligned = national
        .iter()
        .filter(|(p, s)| **s > 0 && !members.contains(p))
        .map(|(p, s)| (p.clone(), *s))
        .collect();
    MajorityVerdict::Hung { blocks: totals, unaligned }
}

/// A party holding `majority` seats on its own.
pub fn single_party_majority(national: &SeatMap, majority: u32) -> Option<(PartyId, u32)> {
    national
        .iter()
        .find(|(_, s)| **s >= majority)
        .map(|(p, s)| (p.clone(), *s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::config::ElectionConfig;

    fn p(s: &str) -> PartyId { PartyId::new(s).unwrap() }

    fn seats(v: &[(&str, u32)]) -> SeatMap {
        v.iter().map(|(k, s)| (p(k), *s)).collect()
    }

    #[test]
    fn first_block_over_the_line_wins() {
        let cfg = ElectionConfig::portugal_default();
        let n = seats(&[("PSD", 100), ("IL", 20), ("PS", 70), ("CH", 40)]);
        let v = assess_majority(&n, &cfg.blocks, cfg.majority_seats);
        assert_eq!(v, MajorityVerdict::Block { name: "Direita".into(), seats: 120, surplus: 4 });
        assert!(v.has_majority());
    }

    #[test]
    fn exact_threshold_counts_as_majority() {
        let cfg = ElectionConfig::portugal_default();
        let n = seats(&[("PS", 100), ("BE", 10), ("L", 6), ("PSD", 80)]);
        let v = assess_majority(&n, &cfg.blocks, 116);
        assert_eq!(v, MajorityVerdict::Block { name: "Esquerda".into(), seats: 116, surplus: 0 });
    }

    #[test]
    fn hung_parliament_lists_blocks_and_unaligned() {
        let cfg = ElectionConfig::portugal_default();
        let n = seats(&[("PSD", 80), ("IL", 9), ("PS", 78), ("BE", 5), ("CH", 58), ("Outros", 0)]);
        match assess_majority(&n, &cfg.blocks, 116) {
            MajorityVerdict::Hung { blocks, unaligned } => {
                assert_eq!(blocks[0], BlockSeats { name: "Direita".into(), seats: 89 });
                assert_eq!(blocks[1], BlockSeats { name: "Esquerda".into(), seats: 83 });
                assert_eq!(unaligned, vec![(p("CH"), 58)]);
            }
            other => panic!("expected hung, got {other:?}"),
        }
        assert_eq!(single_party_majority(&n, 116), None);
        assert_eq!(single_party_majority(&n, 80), Some((p("PSD"), 80)));
    }
}
