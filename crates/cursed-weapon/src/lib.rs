//! Cursed weapon manager (spec §4.6): drop, activation, kill counter,
//! expiry, and owner-death handling for the world's two forbidden weapons.

mod error;
mod karma;
mod manager;
mod weapon;

pub use error::CursedWeaponError;
pub use karma::KarmaSink;
pub use manager::CursedWeaponManager;
pub use weapon::{CursedWeapon, WeaponConfig, WeaponId, WeaponState};
