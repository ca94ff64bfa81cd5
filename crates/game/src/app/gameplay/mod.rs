//! Cat-arena gameplay: the player and enemy behaviour machines, claw combat,
//! invulnerability windows, power-up buffs, and the level that ties them to a
//! shared timer.

pub mod buffs;
pub mod claw;
pub mod combat;
pub mod config;
pub mod direction;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod level;
pub mod movement;
pub mod player;

pub use buffs::{PowerUpKind, StatBuff};
pub use combat::{damage, HitOutcome};
pub use config::{ConfigError, GameConfig, CONFIG_PATH_ENV_VAR};
pub use direction::Direction;
pub use enemy::{Enemy, EnemyKind, EnemyStateKey};
pub use entity::{ActorId, EntityBody};
pub use events::LevelEvent;
pub use level::{Level, LevelError};
pub use player::{Player, PlayerStateKey};
