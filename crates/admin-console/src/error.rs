use thiserror::Error;

use world_types::WorldError;

#[derive(Debug, Error, PartialEq)]
pub enum AdminCommandError {
    #[error("the input does not start with '/' or '//'")]
    MissingPrefix,
    #[error("empty command")]
    EmptyCommand,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid value for '{name}': {value}")]
    InvalidArgument { name: &'static str, value: String },
    #[error("target not found: {0}")]
    TargetNotFound(String),
    #[error("{0}")]
    World(String),
}

impl From<WorldError> for AdminCommandError {
    fn from(err: WorldError) -> Self {
        AdminCommandError::World(err.to_string())
    }
}
