use std::collections::HashMap;

use crate::command::{parse, ParsedCommand};
use crate::context::AdminContext;
use crate::error::AdminCommandError;
use crate::handlers;

type Handler = fn(&ParsedCommand, &dyn AdminContext) -> Result<String, AdminCommandError>;

/// The fixed registry of admin commands (spec §4.10 / §6 — exactly these
/// sixteen, no more).
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert("kick", handlers::kick);
        handlers.insert("ban", handlers::ban);
        handlers.insert("kill", handlers::kill);
        handlers.insert("res", handlers::res);
        handlers.insert("heal", handlers::heal);
        handlers.insert("info", handlers::info);
        handlers.insert("jail", handlers::jail);
        handlers.insert("announce", handlers::announce);
        handlers.insert("spawn", handlers::spawn);
        handlers.insert("delete", handlers::delete);
        handlers.insert("invisible", handlers::invisible);
        handlers.insert("invul", handlers::invul);
        handlers.insert("speed", handlers::speed);
        handlers.insert("teleport", handlers::teleport);
        handlers.insert("setlevel", handlers::setlevel);
        handlers.insert("give_item", handlers::give_item);
        Self { handlers }
    }

    /// Parses and dispatches a raw `//name args...` line. Every outcome,
    /// success or failure, is recorded as the caller's last admin message
    /// (spec §6) before being returned.
    pub fn dispatch(&self, line: &str, caller: u32, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
        let result = self.dispatch_inner(line, ctx);
        let message = match &result {
            Ok(ok) => ok.clone(),
            Err(err) => err.to_string(),
        };
        match &result {
            Ok(_) => log::info!(target: "admin", "{caller} ran {line:?}"),
            Err(err) => log::warn!(target: "admin", "{caller} ran {line:?}: {err}"),
        }
        ctx.set_last_admin_message(caller, message);
        result
    }

    fn dispatch_inner(&self, line: &str, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
        let parsed = parse(line)?;
        let handler = self
            .handlers
            .get(parsed.name.as_str())
            .ok_or_else(|| AdminCommandError::UnknownCommand(parsed.name.clone()))?;
        handler(&parsed, ctx)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap as StdHashMap;
    use world_types::{Location, ObjectId, WorldError, WorldResult};

    struct FakeContext {
        players: Mutex<StdHashMap<String, ObjectId>>,
        last_message: Mutex<Option<String>>,
        kicked: Mutex<Vec<ObjectId>>,
    }

    impl FakeContext {
        fn new() -> Self {
            let mut players = StdHashMap::new();
            players.insert("Bob".to_string(), 7);
            Self {
                players: Mutex::new(players),
                last_message: Mutex::new(None),
                kicked: Mutex::new(Vec::new()),
            }
        }
    }

    impl AdminContext for FakeContext {
        fn resolve_target(&self, name_or_id: &str) -> Option<ObjectId> {
            if let Ok(id) = name_or_id.parse() {
                return Some(id);
            }
            self.players.lock().get(name_or_id).copied()
        }

        fn kick(&self, target: ObjectId) -> WorldResult<()> {
            self.kicked.lock().push(target);
            Ok(())
        }

        fn ban(&self, _target: ObjectId, _duration_minutes: Option<u32>) -> WorldResult<()> {
            Ok(())
        }

        fn kill(&self, _target: ObjectId) -> WorldResult<()> {
            Ok(())
        }

        fn res(&self, _target: ObjectId) -> WorldResult<()> {
            Ok(())
        }

        fn heal(&self, _target: ObjectId) -> WorldResult<()> {
            Ok(())
        }

        fn info(&self, target: ObjectId) -> WorldResult<String> {
            Ok(format!("object {target}"))
        }

        fn jail(&self, _target: ObjectId, _duration_minutes: Option<u32>) -> WorldResult<()> {
            Ok(())
        }

        fn announce(&self, _message: &str) -> WorldResult<()> {
            Ok(())
        }

        fn spawn(&self, _npc_id: u32, _location: Location) -> WorldResult<ObjectId> {
            Ok(12345)
        }

        fn delete(&self, target: ObjectId) -> WorldResult<()> {
            if target == 404 {
                return Err(WorldError::NotFound { kind: "object", id: target });
            }
            Ok(())
        }

        fn set_invisible(&self, _target: ObjectId, _value: bool) -> WorldResult<()> {
            Ok(())
        }

        fn set_invulnerable(&self, _target: ObjectId, _value: bool) -> WorldResult<()> {
            Ok(())
        }

        fn set_speed(&self, _target: ObjectId, _value: u16) -> WorldResult<()> {
            Ok(())
        }

        fn teleport(&self, _target: ObjectId, _location: Location) -> WorldResult<()> {
            Ok(())
        }

        fn set_level(&self, _target: ObjectId, _level: u8) -> WorldResult<()> {
            Ok(())
        }

        fn give_item(&self, _target: ObjectId, _item_id: u32, _count: i64) -> WorldResult<()> {
            Ok(())
        }

        fn set_last_admin_message(&self, _caller: ObjectId, message: String) {
            *self.last_message.lock() = Some(message);
        }
    }

    #[test]
    fn kick_by_name_resolves_and_dispatches() {
        let registry = CommandRegistry::new();
        let ctx = FakeContext::new();
        let result = registry.dispatch("//kick Bob", 1, &ctx).unwrap();
        assert_eq!(result, "kicked 7");
        assert_eq!(*ctx.kicked.lock(), vec![7]);
        assert_eq!(*ctx.last_message.lock(), Some("kicked 7".to_string()));
    }

    #[test]
    fn unknown_command_is_reported_and_still_recorded() {
        let registry = CommandRegistry::new();
        let ctx = FakeContext::new();
        let err = registry.dispatch("//frobnicate Bob", 1, &ctx).unwrap_err();
        assert!(matches!(err, AdminCommandError::UnknownCommand(_)));
        assert!(ctx.last_message.lock().as_deref().unwrap().contains("frobnicate"));
    }

    #[test]
    fn missing_target_surfaces_a_readable_error() {
        let registry = CommandRegistry::new();
        let ctx = FakeContext::new();
        let err = registry.dispatch("//kick Nobody", 1, &ctx).unwrap_err();
        assert_eq!(err, AdminCommandError::TargetNotFound("Nobody".to_string()));
    }

    #[test]
    fn a_domain_error_is_wrapped_and_surfaced() {
        let registry = CommandRegistry::new();
        let ctx = FakeContext::new();
        let err = registry.dispatch("//delete 404", 1, &ctx).unwrap_err();
        assert!(matches!(err, AdminCommandError::World(_)));
    }

    #[test]
    fn announce_joins_remaining_args_as_one_message() {
        let registry = CommandRegistry::new();
        let ctx = FakeContext::new();
        let result = registry.dispatch(r#"//announce server restarting soon"#, 1, &ctx).unwrap();
        assert_eq!(result, "announcement sent");
    }
}
