//! D'Hondt (highest averages) allocation for one district.
//!
//! Contract:
//! - Every party contributes quotients v/1, v/2, …, v/seats to a single pool.
//! - The pool is sorted descending; each of the top `seats` entries awards one
//!   seat to its party.
//! - Quotients are compared by cross-multiplication (`v_a·k_b` vs `v_b·k_a`),
//!   so mathematically equal quotients compare equal.
//! - Ties: lower divisor first (the party holding fewer seats so far), then
//!   ascending `PartyId`.
//! - Zero-vote parties still own quotients of 0; they take seats only when
//!   nothing positive is left in the top `seats` entries.
//!
//! Determinism:
//! - Output depends only on the vote map and seat count; no RNG, no hashing.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use hc_core::{PartyId, SimError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// A vote count below zero.
    NegativeVotes(PartyId),
    /// NaN or infinite vote count.
    NonFiniteVotes(PartyId),
    /// `seats > 0` but there is nobody to give them to.
    NoParties,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::NegativeVotes(p) => write!(f, "negative vote count for {p}"),
            AllocError::NonFiniteVotes(p) => write!(f, "non-finite vote count for {p}"),
            AllocError::NoParties => write!(f, "seats to allocate but no parties"),
        }
    }
}

impl std::error::Error for AllocError {}

impl From<AllocError> for SimError {
    fn from(e: AllocError) -> Self {
        SimError::InvalidInput(e.to_string())
    }
}

/// One pooled candidate: `votes / divisor` for `party`.
#[derive(Clone, Copy, Debug)]
struct Quotient<'a> {
    party: &'a PartyId,
    votes: f64,
    divisor: u32,
}

/// Allocate `seats` among `votes` using D'Hondt.
///
/// *Notes*:
/// - If `seats == 0`, returns every party with 0 seats.
/// - The result always contains every input party and sums to `seats`.
pub fn allocate_dhondt(
    seats: u32,
    votes: &BTreeMap<PartyId, f64>,
) -> Result<BTreeMap<PartyId, u32>, AllocError> {
    for (p, &v) in votes {
        if !v.is_finite() {
            return Err(AllocError::NonFiniteVotes(p.clone()));
        }
        if v < 0.0 {
            return Err(AllocError::NegativeVotes(p.clone()));
        }
    }

    let mut alloc: BTreeMap<PartyId, u32> = votes.keys().cloned().map(|p| (p, 0)).collect();
    if seats == 0 {
        return Ok(alloc);
    }
    if votes.is_empty() {
        return Err(AllocError::NoParties);
    }

    // 1) Pool every party's quotient sequence.
    let mut pool: Vec<Quotient<'_>> = Vec::with_capacity(votes.len() * seats as usize);
    for (party, &v) in votes {
        for divisor in 1..=seats {
            pool.push(Quotient { party, votes: v, divisor });
        }
    }

    // 2) Strict total order: quotient desc, divisor asc, party asc.
    pool.sort_by(rank_quotients);

    // 3) Top `seats` entries win one seat each.
    for q in pool.iter().take(seats as usize) {
        if let Some(s) = alloc.get_mut(q.party) {
            *s += 1;
        }
    }

    Ok(alloc)
}

fn rank_quotients(a: &Quotient<'_>, b: &Quotient<'_>) -> Ordering {
    cmp_quotients(b, a)
        .then_with(|| a.divisor.cmp(&b.divisor))
        .then_with(|| a.party.cmp(b.party))
}

/// Compare `a.votes/a.divisor` vs `b.votes/b.divisor` without dividing.
/// Returns `Ordering::Greater` if a's quotient is larger.
fn cmp_quotients(a: &Quotient<'_>, b: &Quotient<'_>) -> Ordering {
    let lhs = a.votes * f64::from(b.divisor);
    let rhs = b.votes * f64::from(a.divisor);
    // Inputs are validated finite; -0.0 and 0.0 must compare equal.
    lhs.partial_cmp(&rhs).unwrap_or(Ordering::Equal)
}
