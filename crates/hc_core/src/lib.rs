//! hc_core: Core types, identifiers, dense party × district grids, configuration.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! simulator (`hc_io`, `hc_algo`, `hc_pipeline`, `hc_report`, `hc_cli`).
//!
//! - Label tokens: `PartyId`, `DistrictId`
//! - Closed party variant: `Party::{Tracked, Others}` resolved once by `PartyRoster`
//! - Dense `PartyGrid` and its labelled form `PartyDistrictTable`
//! - Historical vote table and its roster-resolved form
//! - Error taxonomy: `SimError::{InvalidInput, DataIntegrity}`
//! - Configuration (`config`): districts + seats, tracked parties, blocks, projection mode

#![forbid(unsafe_code)]

pub mod config;
pub mod history;

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken(String),
        DuplicateId(String),
        EmptyRoster,
        OthersIsTracked(String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken(s) => write!(f, "invalid label token: {s:?}"),
                CoreError::DuplicateId(s) => write!(f, "duplicate id: {s}"),
                CoreError::EmptyRoster => write!(f, "roster has no tracked parties"),
                CoreError::OthersIsTracked(s) => {
                    write!(f, "aggregate label {s} is also listed as a tracked party")
                }
            }
        }
    }

    impl std::error::Error for CoreError {}

    /// Error taxonomy surfaced by the engine. Neither class is retryable.
    #[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
    pub enum SimError {
        /// Malformed percentages, negative votes, unknown party identifiers.
        #[error("invalid input: {0}")]
        InvalidInput(String),

        /// Historical table or derived matrix does not match the configured shape.
        #[error("data integrity: {0}")]
        DataIntegrity(String),
    }

    impl From<CoreError> for SimError {
        fn from(e: CoreError) -> Self {
            SimError::InvalidInput(e.to_string())
        }
    }
}

pub mod tokens {
    //! Label tokens (`PartyId`, `DistrictId`).
    //!
    //! Labels come straight from the historical table header and row labels, so
    //! they are Unicode ("Bragança", "Castelo Branco"). Rejected: empty,
    //! surrounding whitespace, control characters, the `;` delimiter, > 64 chars.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    use serde::de::{Error as DeError, Unexpected};
    use serde::{Deserialize, Deserializer, Serialize};

    const TOKEN_MAX_CHARS: usize = 64;

    pub fn is_label(s: &str) -> bool {
        !s.is_empty()
            && s.chars().count() <= TOKEN_MAX_CHARS
            && s.trim() == s
            && !s.chars().any(|c| c.is_control() || c == ';')
    }

    macro_rules! def_token {
        ($name:ident) => {
            /// Ordering is byte-wise lexicographic on the label (used for tie-breaks).
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
            pub struct $name(String);

            impl $name {
                pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
                    let s = s.into();
                    if is_label(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken(s)) }
                }
                pub fn as_str(&self) -> &str { &self.0 }

                /// Build from a compile-time literal already known to be a valid label.
                pub(crate) fn from_static(s: &'static str) -> Self {
                    debug_assert!(is_label(s), "invalid static label {s:?}");
                    Self(s.to_string())
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> { Self::new(s) }
            }

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(d)?;
                    if is_label(&s) {
                        Ok(Self(s))
                    } else {
                        Err(D::Error::invalid_value(
                            Unexpected::Str(&s),
                            &"label without control chars or ';', len 1..=64",
                        ))
                    }
                }
            }
        };
    }

    def_token!(PartyId);
    def_token!(DistrictId);
}

pub mod party {
    //! Closed party variant and the roster that resolves labels into it.

    use std::collections::BTreeMap;

    use crate::errors::CoreError;
    use crate::tokens::PartyId;

    /// A seat-table row: one of the tracked parties or the synthetic aggregate.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
    pub enum Party {
        Tracked(usize),
        Others,
    }

    /// Ordered tracked parties plus the aggregate label. Slot order is the
    /// tracked order followed by `Others` in the last slot.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct PartyRoster {
        tracked: Vec<PartyId>,
        others: PartyId,
        index: BTreeMap<PartyId, Party>,
    }

    impl PartyRoster {
        pub fn new(tracked: Vec<PartyId>, others: PartyId) -> Result<Self, CoreError> {
            if tracked.is_empty() {
                return Err(CoreError::EmptyRoster);
            }
            let mut index = BTreeMap::new();
            for (i, p) in tracked.iter().enumerate() {
                if index.insert(p.clone(), Party::Tracked(i)).is_some() {
                    return Err(CoreError::DuplicateId(p.to_string()));
                }
            }
            if index.contains_key(&others) {
                return Err(CoreError::OthersIsTracked(others.to_string()));
            }
            index.insert(others.clone(), Party::Others);
            Ok(Self { tracked, others, index })
        }

        pub fn tracked(&self) -> &[PartyId] { &self.tracked }
        pub fn others(&self) -> &PartyId { &self.others }

        /// Number of slots (tracked + 1).
        pub fn len(&self) -> usize { self.tracked.len() + 1 }

        pub fn is_empty(&self) -> bool { self.tracked.is_empty() }

        pub fn resolve(&self, id: &PartyId) -> Option<Party> {
            self.index.get(id).copied()
        }

        /// Resolve a raw row label from the historical table. Labels that are not
        /// tracked (including the aggregate label itself) are `None`: they are
        /// folded into `Others` by the regional model.
        pub fn resolve_tracked_label(&self, label: &str) -> Option<usize> {
            let id = PartyId::new(label.trim()).ok()?;
            match self.index.get(&id) {
                Some(Party::Tracked(i)) => Some(*i),
                _ => None,
            }
        }

        pub fn id(&self, p: Party) -> &PartyId {
            match p {
                Party::Tracked(i) => &self.tracked[i],
                Party::Others => &self.others,
            }
        }

        pub fn slot(&self, p: Party) -> usize {
            match p {
                Party::Tracked(i) => i,
                Party::Others => self.tracked.len(),
            }
        }

        /// All parties in slot order (tracked first, `Others` last).
        pub fn parties(&self) -> impl Iterator<Item = Party> + '_ {
            (0..self.tracked.len()).map(Party::Tracked).chain(std::iter::once(Party::Others))
        }

        /// All labels in slot order.
        pub fn ids(&self) -> Vec<PartyId> {
            self.parties().map(|p| self.id(p).clone()).collect()
        }
    }
}

pub mod grid {
    //! Dense row-major party × district tables.

    use std::collections::BTreeMap;

    use crate::tokens::{DistrictId, PartyId};

    /// Row-major `rows × cols` table of `f64`.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PartyGrid {
        rows: usize,
        cols: usize,
        cells: Vec<f64>,
    }

    impl PartyGrid {
        pub fn zeros(rows: usize, cols: usize) -> Self {
            Self { rows, cols, cells: vec![0.0; rows * cols] }
        }

        pub fn rows(&self) -> usize { self.rows }
        pub fn cols(&self) -> usize { self.cols }

        #[inline]
        pub fn get(&self, r: usize, c: usize) -> f64 { self.cells[r * self.cols + c] }

        #[inline]
        pub fn set(&mut self, r: usize, c: usize, v: f64) { self.cells[r * self.cols + c] = v; }

        pub fn row(&self, r: usize) -> &[f64] {
            &self.cells[r * self.cols..(r + 1) * self.cols]
        }

        pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
            &mut self.cells[r * self.cols..(r + 1) * self.cols]
        }

        pub fn row_sum(&self, r: usize) -> f64 { self.row(r).iter().sum() }

        pub fn col_sum(&self, c: usize) -> f64 {
            (0..self.rows).map(|r| self.get(r, c)).sum()
        }

        pub fn total(&self) -> f64 { self.cells.iter().sum() }
    }

    /// A `PartyGrid` with its row labels (roster slot order) and column labels.
    /// Used for the regional proportion matrix and the simulated vote table.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PartyDistrictTable {
        parties: Vec<PartyId>,
        districts: Vec<DistrictId>,
        grid: PartyGrid,
    }

    impl PartyDistrictTable {
        /// Returns `None` when the grid shape does not match the labels.
        pub fn new(parties: Vec<PartyId>, districts: Vec<DistrictId>, grid: PartyGrid) -> Option<Self> {
            if grid.rows() != parties.len() || grid.cols() != districts.len() {
                return None;
            }
            Some(Self { parties, districts, grid })
        }

        pub fn parties(&self) -> &[PartyId] { &self.parties }
        pub fn districts(&self) -> &[DistrictId] { &self.districts }
        pub fn grid(&self) -> &PartyGrid { &self.grid }

        pub fn value(&self, party: &PartyId, district: &DistrictId) -> Option<f64> {
            let r = self.parties.iter().position(|p| p == party)?;
            let c = self.districts.iter().position(|d| d == district)?;
            Some(self.grid.get(r, c))
        }

        /// Keyed view: party → district → value.
        pub fn to_map(&self) -> BTreeMap<PartyId, BTreeMap<DistrictId, f64>> {
            self.parties
                .iter()
                .enumerate()
                .map(|(r, p)| {
                    let row = self
                        .districts
                        .iter()
                        .enumerate()
                        .map(|(c, d)| (d.clone(), self.grid.get(r, c)))
                        .collect();
                    (p.clone(), row)
                })
                .collect()
        }
    }
}

pub mod rounding {
    //! One-decimal helpers for percentage vectors.

    /// Round half away from zero to one decimal place.
    #[inline]
    pub fn round_1dp(x: f64) -> f64 {
        (x * 10.0).round() / 10.0
    }

    /// Render with exactly one decimal (`12.3`), for reports.
    pub fn fmt_1dp(x: f64) -> String {
        format!("{:.1}", round_1dp(x))
    }
}

// Convenience re-exports (downstream crates import these from the crate root)
pub use errors::{CoreError, SimError};
pub use grid::{PartyDistrictTable, PartyGrid};
pub use history::{HistoricalVoteTable, HistoryRow, ResolvedHistory};
pub use party::{Party, PartyRoster};
pub use tokens::{DistrictId, PartyId};
