use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use admin_console::AdminContext;
use cursed_weapon::KarmaSink;
use duel::ConditionRestorer;
use world_grid::Grid;
use world_types::{
    Character, Location, ObjectId, Player, WorldError, WorldObjectHandle, WorldObjectKind, WorldResult,
    NPC_ID_RANGE,
};

/// The composition root's `AdminContext` implementation. Backs admin
/// commands with the grid and a plain player registry; this is the
/// thinnest thing that can exercise every command, not a game loop — the
/// wire protocol, inventory, and chat are explicit Non-goals (spec §1).
pub struct WorldkeepContext {
    grid: Arc<Grid>,
    players: RwLock<HashMap<ObjectId, Player>>,
    names: RwLock<HashMap<String, ObjectId>>,
    next_npc_id: AtomicU32,
}

impl WorldkeepContext {
    pub fn new(grid: Arc<Grid>) -> Arc<Self> {
        Arc::new(Self {
            grid,
            players: RwLock::new(HashMap::new()),
            names: RwLock::new(HashMap::new()),
            next_npc_id: AtomicU32::new(NPC_ID_RANGE.start),
        })
    }

    pub fn register_player(&self, player: Player) -> WorldResult<()> {
        let handle = WorldObjectHandle::new(player.object_id(), WorldObjectKind::Player, player.character.location);
        self.grid.add(handle).map_err(|_| WorldError::OutOfBounds)?;
        self.names.write().insert(player.name.clone(), player.object_id());
        self.players.write().insert(player.object_id(), player);
        Ok(())
    }

    fn with_player_mut<T>(&self, target: ObjectId, f: impl FnOnce(&mut Player) -> T) -> WorldResult<T> {
        let mut players = self.players.write();
        let player = players
            .get_mut(&target)
            .ok_or(WorldError::NotFound { kind: "player", id: target })?;
        Ok(f(player))
    }
}

impl AdminContext for WorldkeepContext {
    fn resolve_target(&self, name_or_id: &str) -> Option<ObjectId> {
        if let Ok(id) = name_or_id.parse::<ObjectId>() {
            return Some(id);
        }
        self.names.read().get(name_or_id).copied()
    }

    fn kick(&self, target: ObjectId) -> WorldResult<()> {
        self.with_player_mut(target, |_| ())?;
        log::info!(target: "admin", "kick {target}");
        Ok(())
    }

    fn ban(&self, target: ObjectId, duration_minutes: Option<u32>) -> WorldResult<()> {
        self.with_player_mut(target, |_| ())?;
        log::info!(target: "admin", "ban {target} for {duration_minutes:?} minutes");
        Ok(())
    }

    fn kill(&self, target: ObjectId) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.character.hp = 0)
    }

    fn res(&self, target: ObjectId) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.character.hp = p.character.max_hp)
    }

    fn heal(&self, target: ObjectId) -> WorldResult<()> {
        self.with_player_mut(target, |p| {
            p.character.hp = p.character.max_hp;
            p.character.mp = p.character.max_mp;
            p.character.cp = p.character.max_cp;
        })
    }

    fn info(&self, target: ObjectId) -> WorldResult<String> {
        self.with_player_mut(target, |p| {
            format!(
                "{} (id {}): level {}, hp {}/{}, karma {}",
                p.name, target, p.level, p.character.hp, p.character.max_hp, p.karma
            )
        })
    }

    fn jail(&self, target: ObjectId, duration_minutes: Option<u32>) -> WorldResult<()> {
        self.with_player_mut(target, |p| {
            p.character.zone_flags.set(world_types::ZoneFlags::JAIL);
        })?;
        log::info!(target: "admin", "jail {target} for {duration_minutes:?} minutes");
        Ok(())
    }

    fn announce(&self, message: &str) -> WorldResult<()> {
        log::info!(target: "admin", "[announce] {message}");
        Ok(())
    }

    fn spawn(&self, npc_id: u32, location: Location) -> WorldResult<ObjectId> {
        let object_id = self.next_npc_id.fetch_add(1, Ordering::AcqRel);
        if !NPC_ID_RANGE.contains(&object_id) {
            return Err(WorldError::OutOfBounds);
        }
        let _ = npc_id; // the catalogue of NPC templates is content data (Non-goal, spec §1)
        let handle = WorldObjectHandle::new(object_id, WorldObjectKind::Npc, location);
        self.grid.add(handle).map_err(|_| WorldError::OutOfBounds)?;
        Ok(object_id)
    }

    fn delete(&self, target: ObjectId) -> WorldResult<()> {
        if self.players.write().remove(&target).is_none() && self.grid.get_npc(target).is_none() {
            return Err(WorldError::NotFound { kind: "object", id: target });
        }
        self.grid.remove(target);
        Ok(())
    }

    fn set_invisible(&self, target: ObjectId, value: bool) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.invisible = value)
    }

    fn set_invulnerable(&self, target: ObjectId, value: bool) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.invulnerable = value)
    }

    fn set_speed(&self, target: ObjectId, value: u16) -> WorldResult<()> {
        // Movement speed isn't part of the core data model (spec §3 lists
        // no such field); acknowledge the target exists and log the
        // intent for whatever session layer owns it.
        self.with_player_mut(target, |_| ())?;
        log::info!(target: "admin", "speed {target} -> {value}");
        Ok(())
    }

    fn teleport(&self, target: ObjectId, location: Location) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.character.location = location)?;
        self.grid.move_to(target, location).map_err(|_| WorldError::OutOfBounds)
    }

    fn set_level(&self, target: ObjectId, level: u8) -> WorldResult<()> {
        self.with_player_mut(target, |p| p.level = level)
    }

    fn give_item(&self, target: ObjectId, item_id: u32, count: i64) -> WorldResult<()> {
        self.with_player_mut(target, |_| ())?;
        log::info!(target: "admin", "give {count}x item {item_id} to {target}");
        Ok(())
    }

    fn set_last_admin_message(&self, caller: ObjectId, message: String) {
        let mut players = self.players.write();
        if let Some(player) = players.get_mut(&caller) {
            player.last_admin_message = Some(message);
        }
    }
}

impl ConditionRestorer for WorldkeepContext {
    fn restore_condition(&self, object_id: ObjectId, hp: i32, mp: i32, cp: i32, location: Location) -> WorldResult<()> {
        self.with_player_mut(object_id, |p| {
            p.character.hp = hp;
            p.character.mp = mp;
            p.character.cp = cp;
            p.character.location = location;
        })?;
        self.grid.move_to(object_id, location).map_err(|_| WorldError::OutOfBounds)
    }
}

impl KarmaSink for WorldkeepContext {
    fn karma_and_pk(&self, id: ObjectId) -> WorldResult<(i64, u32)> {
        self.with_player_mut(id, |p| (p.karma, p.pk_kills))
    }

    fn set_karma_and_pk(&self, id: ObjectId, karma: i64, pk_kills: u32) -> WorldResult<()> {
        self.with_player_mut(id, |p| {
            p.karma = karma;
            p.pk_kills = pk_kills;
        })
    }

    fn bump_pk_kills(&self, id: ObjectId) -> WorldResult<()> {
        self.with_player_mut(id, |p| p.pk_kills += 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_types::{PrivateStoreType, WorldExtent};

    fn test_player(object_id: ObjectId, name: &str) -> Player {
        Player {
            character: Character::new(object_id, WorldObjectKind::Player, Location::default(), 100, 100, 100),
            name: name.to_string(),
            character_id: object_id,
            account_id: 1,
            class_id: 1,
            race_id: 1,
            level: 1,
            experience: 0,
            cursed_weapon_id: None,
            karma: 0,
            pk_kills: 0,
            private_store_type: PrivateStoreType::None,
            private_store_message: String::new(),
            sell_list: Vec::new(),
            buy_list: Vec::new(),
            party_id: None,
            target_id: None,
            access_level: 0,
            invisible: false,
            invulnerable: false,
            last_admin_message: None,
        }
    }

    #[test]
    fn kill_and_res_round_trip_hp() {
        let grid = Arc::new(Grid::new(WorldExtent::STANDARD));
        let ctx = WorldkeepContext::new(grid);
        ctx.register_player(test_player(1, "Bob")).unwrap();

        ctx.kill(1).unwrap();
        assert_eq!(ctx.with_player_mut(1, |p| p.character.hp).unwrap(), 0);

        ctx.res(1).unwrap();
        assert_eq!(ctx.with_player_mut(1, |p| p.character.hp).unwrap(), 100);
    }

    #[test]
    fn resolve_target_accepts_either_id_or_name() {
        let grid = Arc::new(Grid::new(WorldExtent::STANDARD));
        let ctx = WorldkeepContext::new(grid);
        ctx.register_player(test_player(9, "Alice")).unwrap();

        assert_eq!(ctx.resolve_target("9"), Some(9));
        assert_eq!(ctx.resolve_target("Alice"), Some(9));
        assert_eq!(ctx.resolve_target("Nobody"), None);
    }

    #[test]
    fn last_admin_message_is_recorded_on_the_caller() {
        let grid = Arc::new(Grid::new(WorldExtent::STANDARD));
        let ctx = WorldkeepContext::new(grid);
        ctx.register_player(test_player(1, "Bob")).unwrap();
        ctx.set_last_admin_message(1, "did a thing".to_string());
        assert_eq!(
            ctx.with_player_mut(1, |p| p.last_admin_message.clone()).unwrap(),
            Some("did a thing".to_string())
        );
    }
}
