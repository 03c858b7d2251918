pub mod config;
pub mod error;
pub mod types;

pub use config::{load_economy_config, EconomyConfig};
pub use error::{CommandError, HivemindError, Result, WorldError};
pub use types::{GameTime, UnitTag, Vec2};
