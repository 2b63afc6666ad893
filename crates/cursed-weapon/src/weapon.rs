use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use tokio::time::Instant;

use world_types::{Location, ObjectId};

use crate::error::CursedWeaponError;
use crate::karma::KarmaSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeaponId {
    Zariche,
    Akamanah,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponState {
    Inactive,
    Dropped,
    Activated,
}

/// Tunables for one weapon (spec §4.6; defaults per source where given).
/// `duration_lost_minutes` has no stated default in the source material —
/// fixed here at 5 minutes per kill, recorded as an open-question decision
/// in DESIGN.md.
#[derive(Debug, Clone, Copy)]
pub struct WeaponConfig {
    pub drop_rate: u32,
    pub total_duration: Duration,
    pub disappear_chance: f64,
    pub duration_lost_minutes: u32,
    pub stage_kills: u32,
    pub skill_max_level: u32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            drop_rate: 1,
            total_duration: Duration::from_secs(300 * 60),
            disappear_chance: 0.5,
            duration_lost_minutes: 5,
            stage_kills: 10,
            skill_max_level: 10,
        }
    }
}

struct Inner {
    state: WeaponState,
    location: Option<Location>,
    owner: Option<ObjectId>,
    end_time: Option<Instant>,
    saved_karma: Option<(i64, u32)>,
}

/// One cursed weapon's full mutable state (spec §4.6).
pub struct CursedWeapon {
    pub id: WeaponId,
    pub config: WeaponConfig,
    inner: Mutex<Inner>,
    nb_kills: AtomicU32,
    skill_level: AtomicU32,
}

impl CursedWeapon {
    pub fn new(id: WeaponId, config: WeaponConfig) -> Self {
        Self {
            id,
            config,
            inner: Mutex::new(Inner {
                state: WeaponState::Inactive,
                location: None,
                owner: None,
                end_time: None,
                saved_karma: None,
            }),
            nb_kills: AtomicU32::new(0),
            skill_level: AtomicU32::new(0),
        }
    }

    pub fn state(&self) -> WeaponState {
        self.inner.lock().state
    }

    pub fn owner(&self) -> Option<ObjectId> {
        self.inner.lock().owner
    }

    pub fn nb_kills(&self) -> u32 {
        self.nb_kills.load(Ordering::Relaxed)
    }

    pub fn skill_level(&self) -> u32 {
        self.skill_level.load(Ordering::Relaxed)
    }

    pub fn end_time(&self) -> Option<Instant> {
        self.inner.lock().end_time
    }

    /// Samples the drop roll on a killed monster. A hit only takes effect
    /// if the weapon is currently `Inactive`.
    pub fn check_drop(&self, loc: Location, now: Instant, rng: &mut impl Rng) -> bool {
        let roll = rng.gen_range(0..100_000u32);
        if roll >= self.config.drop_rate {
            return false;
        }
        let mut inner = self.inner.lock();
        if inner.state != WeaponState::Inactive {
            return false;
        }
        inner.state = WeaponState::Dropped;
        inner.location = Some(loc);
        inner.end_time = Some(now + self.config.total_duration);
        true
    }

    pub fn activate(&self, object_id: ObjectId, now: Instant, sink: &dyn KarmaSink) -> Result<(), CursedWeaponError> {
        let mut inner = self.inner.lock();
        if inner.state == WeaponState::Activated {
            return Err(CursedWeaponError::AlreadyActive);
        }
        let saved = sink.karma_and_pk(object_id)?;
        sink.set_karma_and_pk(object_id, 9_999_999, 0)?;
        inner.saved_karma = Some(saved);
        inner.owner = Some(object_id);
        inner.state = WeaponState::Activated;
        if inner.end_time.is_none() {
            inner.end_time = Some(now + self.config.total_duration);
        }
        Ok(())
    }

    /// Punitive bump applied to the currently-held weapon when its owner
    /// tries to pick up the other one (spec §4.6 "wearing two is
    /// forbidden").
    pub fn apply_punitive_bump(&self) {
        let kills = self.nb_kills.fetch_add(self.config.stage_kills, Ordering::AcqRel) + self.config.stage_kills;
        self.recompute_skill_level(kills);
    }

    fn recompute_skill_level(&self, nb_kills: u32) {
        let level = (1 + nb_kills / self.config.stage_kills).min(self.config.skill_max_level);
        self.skill_level.store(level, Ordering::Release);
    }

    /// Each kill the owner lands: bump the kill counter, mirror it onto the
    /// player, shorten the remaining lifetime, and recompute skill level.
    pub fn register_kill(&self, sink: &dyn KarmaSink) -> Result<(), CursedWeaponError> {
        let mut inner = self.inner.lock();
        let owner = inner.owner.ok_or(CursedWeaponError::NotActivated)?;
        sink.bump_pk_kills(owner)?;
        let kills = self.nb_kills.fetch_add(1, Ordering::AcqRel) + 1;
        self.recompute_skill_level(kills);
        if let Some(end_time) = inner.end_time.as_mut() {
            *end_time -= Duration::from_secs(self.config.duration_lost_minutes as u64 * 60);
        }
        Ok(())
    }

    /// Owner died: restore their karma/PK, clear ownership, and either
    /// reset the weapon entirely or drop it at the killer's location.
    pub fn drop_it(&self, killer_loc: Location, sink: &dyn KarmaSink, rng: &mut impl Rng) -> Result<(), CursedWeaponError> {
        let mut inner = self.inner.lock();
        let owner = inner.owner.take().ok_or(CursedWeaponError::NotActivated)?;
        if let Some((karma, pk)) = inner.saved_karma.take() {
            sink.set_karma_and_pk(owner, karma, pk)?;
        }
        if rng.gen_bool(self.config.disappear_chance) {
            inner.state = WeaponState::Inactive;
            inner.location = None;
            inner.end_time = None;
            drop(inner);
            self.nb_kills.store(0, Ordering::Release);
            self.skill_level.store(0, Ordering::Release);
        } else {
            inner.state = WeaponState::Dropped;
            inner.location = Some(killer_loc);
        }
        Ok(())
    }

    /// Expiry ticker fired past `end_time`: restore the current holder and
    /// reset the weapon, whether or not it was ever collected off the
    /// ground again.
    pub fn end_of_life(&self, sink: &dyn KarmaSink) -> Result<(), CursedWeaponError> {
        let mut inner = self.inner.lock();
        if let Some(owner) = inner.owner.take() {
            if let Some((karma, pk)) = inner.saved_karma.take() {
                sink.set_karma_and_pk(owner, karma, pk)?;
            }
        }
        inner.state = WeaponState::Inactive;
        inner.location = None;
        inner.end_time = None;
        drop(inner);
        self.nb_kills.store(0, Ordering::Release);
        self.skill_level.store(0, Ordering::Release);
        Ok(())
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.inner.lock().end_time, Some(end) if now >= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;
    use world_types::WorldResult;

    struct FakeSink(Mutex<HashMap<ObjectId, (i64, u32)>>);

    impl KarmaSink for FakeSink {
        fn karma_and_pk(&self, id: ObjectId) -> WorldResult<(i64, u32)> {
            Ok(*self.0.lock().get(&id).unwrap_or(&(0, 0)))
        }
        fn set_karma_and_pk(&self, id: ObjectId, karma: i64, pk_kills: u32) -> WorldResult<()> {
            self.0.lock().insert(id, (karma, pk_kills));
            Ok(())
        }
        fn bump_pk_kills(&self, id: ObjectId) -> WorldResult<()> {
            let mut map = self.0.lock();
            let entry = map.entry(id).or_insert((0, 0));
            entry.1 += 1;
            Ok(())
        }
    }

    fn loc() -> Location {
        Location::new(0, 0, 0, 0)
    }

    #[test]
    fn activation_snapshots_and_maxes_karma() {
        let sink = FakeSink(Mutex::new(HashMap::from([(1, (500, 3))])));
        let weapon = CursedWeapon::new(WeaponId::Zariche, WeaponConfig::default());
        weapon.activate(1, Instant::now(), &sink).unwrap();
        assert_eq!(weapon.state(), WeaponState::Activated);
        assert_eq!(sink.karma_and_pk(1).unwrap(), (9_999_999, 0));
    }

    #[test]
    fn reactivation_fails() {
        let sink = FakeSink(Mutex::new(HashMap::new()));
        let weapon = CursedWeapon::new(WeaponId::Zariche, WeaponConfig::default());
        weapon.activate(1, Instant::now(), &sink).unwrap();
        assert!(matches!(weapon.activate(2, Instant::now(), &sink), Err(CursedWeaponError::AlreadyActive)));
    }

    #[test]
    fn drop_it_restores_karma_and_resets_or_drops() {
        let sink = FakeSink(Mutex::new(HashMap::from([(1, (500, 3))])));
        let weapon = CursedWeapon::new(WeaponId::Zariche, WeaponConfig::default());
        weapon.activate(1, Instant::now(), &sink).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        weapon.drop_it(loc(), &sink, &mut rng).unwrap();
        assert_eq!(sink.karma_and_pk(1).unwrap(), (500, 3));
        assert!(matches!(weapon.state(), WeaponState::Inactive | WeaponState::Dropped));
    }

    #[test]
    fn kill_counter_advances_skill_level_and_shortens_lifetime() {
        let sink = FakeSink(Mutex::new(HashMap::new()));
        let config = WeaponConfig { stage_kills: 2, skill_max_level: 3, ..WeaponConfig::default() };
        let weapon = CursedWeapon::new(WeaponId::Akamanah, config);
        let start = Instant::now();
        weapon.activate(1, start, &sink).unwrap();
        let end0 = weapon.end_time().unwrap();

        weapon.register_kill(&sink).unwrap();
        weapon.register_kill(&sink).unwrap();
        assert_eq!(weapon.nb_kills(), 2);
        assert_eq!(weapon.skill_level(), 2);
        assert!(weapon.end_time().unwrap() < end0);
        assert_eq!(sink.karma_and_pk(1).unwrap().1, 2);
    }

    #[test]
    fn punitive_bump_raises_kill_count_without_a_kill() {
        let config = WeaponConfig { stage_kills: 10, skill_max_level: 10, ..WeaponConfig::default() };
        let weapon = CursedWeapon::new(WeaponId::Zariche, config);
        weapon.apply_punitive_bump();
        assert_eq!(weapon.nb_kills(), 10);
        assert_eq!(weapon.skill_level(), 2);
    }
}
