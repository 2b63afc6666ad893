use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use world_types::{Location, ObjectId};

use crate::error::CursedWeaponError;
use crate::karma::KarmaSink;
use crate::weapon::{CursedWeapon, WeaponId, WeaponState};

/// Owns both cursed weapons and enforces "a player may hold only one"
/// across them (spec §4.6).
pub struct CursedWeaponManager {
    weapons: HashMap<WeaponId, Arc<CursedWeapon>>,
    holders: RwLock<HashMap<ObjectId, WeaponId>>,
}

impl CursedWeaponManager {
    pub fn new(weapons: Vec<Arc<CursedWeapon>>) -> Self {
        Self {
            weapons: weapons.into_iter().map(|w| (w.id, w)).collect(),
            holders: RwLock::new(HashMap::new()),
        }
    }

    pub fn weapon(&self, id: WeaponId) -> Option<&Arc<CursedWeapon>> {
        self.weapons.get(&id)
    }

    pub fn holder_of(&self, id: WeaponId) -> Option<ObjectId> {
        self.holders.read().iter().find(|(_, w)| **w == id).map(|(p, _)| *p)
    }

    /// Activation entry point. Applies the punitive bump to whatever the
    /// player currently holds (if different) and refuses the new weapon.
    pub fn try_activate(
        &self,
        weapon_id: WeaponId,
        object_id: ObjectId,
        now: Instant,
        sink: &dyn KarmaSink,
    ) -> Result<(), CursedWeaponError> {
        let already_held = self.holders.read().get(&object_id).copied();
        if let Some(held) = already_held {
            if held != weapon_id {
                if let Some(held_weapon) = self.weapons.get(&held) {
                    held_weapon.apply_punitive_bump();
                }
                return Err(CursedWeaponError::AlreadyHoldingAnother);
            }
            return Err(CursedWeaponError::AlreadyActive);
        }

        let weapon = self.weapons.get(&weapon_id).ok_or(CursedWeaponError::NotActivated)?;
        weapon.activate(object_id, now, sink)?;
        self.holders.write().insert(object_id, weapon_id);
        Ok(())
    }

    pub fn drop_it(&self, weapon_id: WeaponId, killer_loc: Location, sink: &dyn KarmaSink, rng: &mut impl Rng) -> Result<(), CursedWeaponError> {
        let weapon = self.weapons.get(&weapon_id).ok_or(CursedWeaponError::NotActivated)?;
        let owner = weapon.owner();
        weapon.drop_it(killer_loc, sink, rng)?;
        if let Some(owner) = owner {
            self.holders.write().remove(&owner);
        }
        Ok(())
    }

    /// One pass of the expiry ticker (spec §4.6): any weapon past its
    /// `end_time` restores its holder and resets.
    pub fn sweep_expired(&self, now: Instant, sink: &dyn KarmaSink) {
        for weapon in self.weapons.values() {
            if weapon.state() == WeaponState::Activated && weapon.is_expired(now) {
                let owner = weapon.owner();
                if let Err(err) = weapon.end_of_life(sink) {
                    log::warn!(target: "cursed_weapon", "end_of_life failed for {:?}: {err}", weapon.id);
                    continue;
                }
                if let Some(owner) = owner {
                    self.holders.write().remove(&owner);
                }
            }
        }
    }

    /// Runs the periodic expiry ticker until `cancel` fires. Interval is
    /// `duration_lost_minutes * 12s` per weapon; the manager uses the
    /// shortest such interval across its weapons (spec §4.6).
    pub async fn run_expiry_ticker(self: Arc<Self>, sink: Arc<dyn KarmaSink>, cancel: CancellationToken) {
        let interval_secs = self
            .weapons
            .values()
            .map(|w| (w.config.duration_lost_minutes as u64 * 12).max(1))
            .min()
            .unwrap_or(60);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = interval.tick() => self.sweep_expired(Instant::now(), sink.as_ref()),
            }
        }
    }
}
