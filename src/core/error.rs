use thiserror::Error;

use crate::core::types::UnitTag;

#[derive(Error, Debug)]
pub enum HivemindError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Observation error: {0}")]
    Observation(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("World query failed: {0}")]
    World(#[from] WorldError),
}

/// Failure reading live state from the game world
///
/// Any of these aborts the current allocation pass; the next pass retries
/// against fresh state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    #[error("World state unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitTag),
}

/// Immediate rejection of a single unit command
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Stale unit reference: {0}")]
    StaleUnit(UnitTag),

    #[error("Command for {worker} rejected: {reason}")]
    Rejected { worker: UnitTag, reason: String },
}

pub type Result<T> = std::result::Result<T, HivemindError>;
