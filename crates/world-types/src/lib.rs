//! Core data model shared by every component of the world server: the
//! location/id vocabulary, the tagged `WorldObjectKind` variant (replacing
//! the source's type switches on `WorldObject.Data`, per the redesign notes),
//! `Character`/`Player`/`Npc`, and the shared error taxonomy.

pub mod character;
pub mod error;
pub mod ids;
pub mod location;
pub mod npc;
pub mod player;

pub use character::{Character, SavedCondition, ZoneFlags, MAX_SAVED_CONDITIONS};
pub use error::{WorldError, WorldResult};
pub use ids::{ObjectId, WorldObjectHandle, WorldObjectKind, ITEM_ID_RANGE, NPC_ID_RANGE, PLAYER_ID_RANGE};
pub use location::{Location, WorldExtent, GRID_SHIFT};
pub use npc::Npc;
pub use player::{Player, PrivateStoreType};
