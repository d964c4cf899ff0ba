// crates/hc_algo/src/lib.rs
#![forbid(unsafe_code)]

// Core IDs and tables
pub use hc_core::{DistrictId, PartyDistrictTable, PartyId, PartyRoster};

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod dhondt;

    pub use dhondt::allocate_dhondt;

    pub use dhondt::AllocError;

    /// Engine boundary name: allocate one district's seats by D'Hondt.
    pub use dhondt::allocate_dhondt as allocate;
}

// ----------------------------- Regional models ---------------------------------------

pub mod regional;

pub use regional::{
    proportions_from_resolved, regional_indices, regional_proportions, IndexMatrix,
    ProportionMatrix,
};
