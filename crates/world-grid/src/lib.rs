//! Fixed-grid spatial index (spec §4.1). O(1) position -> region mapping,
//! O(neighbourhood x occupants) "what is nearby" queries, concurrent readers
//! and writers with no global lock: each region owns a short-lived
//! `parking_lot::Mutex` over its object set and publishes an immutable
//! snapshot through `arc_swap::ArcSwap`.

mod grid;
mod region;

pub use grid::Grid;
pub use region::{Neighbourhood, Region, RegionCoord};
