//! Zone engine (spec §4.3): polygon/cuboid/cylinder containment, per-zone
//! member sets, enter/exit effects, and the coarse secondary grid that keeps
//! containment queries off the full zone list.

mod engine;
mod secondary_grid;
mod shape;
mod zone;

pub use engine::{ZoneEngine, ZoneTransition};
pub use shape::ZoneShape;
pub use zone::{Zone, ZoneId, ZoneKind, ZoneParams};
