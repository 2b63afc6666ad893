use world_types::Location;

use crate::command::ParsedCommand;
use crate::context::AdminContext;
use crate::error::AdminCommandError;

fn resolve(cmd: &ParsedCommand, ctx: &dyn AdminContext, index: usize) -> Result<u32, AdminCommandError> {
    let raw = cmd.required_arg(index, "target")?;
    ctx.resolve_target(raw).ok_or_else(|| AdminCommandError::TargetNotFound(raw.to_string()))
}

fn parse_u32(value: &str, name: &'static str) -> Result<u32, AdminCommandError> {
    value
        .parse()
        .map_err(|_| AdminCommandError::InvalidArgument { name, value: value.to_string() })
}

fn parse_i64(value: &str, name: &'static str) -> Result<i64, AdminCommandError> {
    value
        .parse()
        .map_err(|_| AdminCommandError::InvalidArgument { name, value: value.to_string() })
}

fn optional_minutes(cmd: &ParsedCommand, index: usize) -> Result<Option<u32>, AdminCommandError> {
    match cmd.arg(index) {
        None => Ok(None),
        Some(raw) => Ok(Some(parse_u32(raw, "duration_minutes")?)),
    }
}

pub fn kick(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    ctx.kick(target)?;
    Ok(format!("kicked {target}"))
}

pub fn ban(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let minutes = optional_minutes(cmd, 1)?;
    ctx.ban(target, minutes)?;
    Ok(format!("banned {target}"))
}

pub fn kill(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    ctx.kill(target)?;
    Ok(format!("killed {target}"))
}

pub fn res(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    ctx.res(target)?;
    Ok(format!("resurrected {target}"))
}

pub fn heal(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    ctx.heal(target)?;
    Ok(format!("healed {target}"))
}

pub fn info(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    Ok(ctx.info(target)?)
}

pub fn jail(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let minutes = optional_minutes(cmd, 1)?;
    ctx.jail(target, minutes)?;
    Ok(format!("jailed {target}"))
}

pub fn announce(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    if cmd.args.is_empty() {
        return Err(AdminCommandError::MissingArgument("message"));
    }
    let message = cmd.args.join(" ");
    ctx.announce(&message)?;
    Ok("announcement sent".to_string())
}

pub fn spawn(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let npc_id = parse_u32(cmd.required_arg(0, "npc_id")?, "npc_id")?;
    let x = parse_i64(cmd.required_arg(1, "x")?, "x")? as i32;
    let y = parse_i64(cmd.required_arg(2, "y")?, "y")? as i32;
    let z = parse_i64(cmd.required_arg(3, "z")?, "z")? as i32;
    let object_id = ctx.spawn(npc_id, Location::new(x, y, z, 0))?;
    Ok(format!("spawned {npc_id} as {object_id}"))
}

pub fn delete(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    ctx.delete(target)?;
    Ok(format!("deleted {target}"))
}

pub fn invisible(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let value = match cmd.arg(1) {
        None => true,
        Some(raw) => parse_bool(raw)?,
    };
    ctx.set_invisible(target, value)?;
    Ok(format!("set invisible={value} on {target}"))
}

pub fn invul(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let value = match cmd.arg(1) {
        None => true,
        Some(raw) => parse_bool(raw)?,
    };
    ctx.set_invulnerable(target, value)?;
    Ok(format!("set invulnerable={value} on {target}"))
}

pub fn speed(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let value: u16 = cmd
        .required_arg(1, "speed")?
        .parse()
        .map_err(|_| AdminCommandError::InvalidArgument { name: "speed", value: cmd.args[1].clone() })?;
    ctx.set_speed(target, value)?;
    Ok(format!("set speed={value} on {target}"))
}

pub fn teleport(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let x = parse_i64(cmd.required_arg(1, "x")?, "x")? as i32;
    let y = parse_i64(cmd.required_arg(2, "y")?, "y")? as i32;
    let z = parse_i64(cmd.required_arg(3, "z")?, "z")? as i32;
    ctx.teleport(target, Location::new(x, y, z, 0))?;
    Ok(format!("teleported {target}"))
}

pub fn setlevel(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let level: u8 = cmd
        .required_arg(1, "level")?
        .parse()
        .map_err(|_| AdminCommandError::InvalidArgument { name: "level", value: cmd.args[1].clone() })?;
    ctx.set_level(target, level)?;
    Ok(format!("set level={level} on {target}"))
}

pub fn give_item(cmd: &ParsedCommand, ctx: &dyn AdminContext) -> Result<String, AdminCommandError> {
    let target = resolve(cmd, ctx, 0)?;
    let item_id = parse_u32(cmd.required_arg(1, "item_id")?, "item_id")?;
    let count = match cmd.arg(2) {
        None => 1,
        Some(raw) => parse_i64(raw, "count")?,
    };
    ctx.give_item(target, item_id, count)?;
    Ok(format!("gave {count}x item {item_id} to {target}"))
}

fn parse_bool(raw: &str) -> Result<bool, AdminCommandError> {
    match raw {
        "1" | "true" | "on" => Ok(true),
        "0" | "false" | "off" => Ok(false),
        other => Err(AdminCommandError::InvalidArgument { name: "flag", value: other.to_string() }),
    }
}
