use pounce_engine::{Tilemap, TilemapError, Vec2};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{ConfigError, EnemyKind, GameConfig, Level, LevelError};
use super::loop_runner::{InputScript, LoopConfig};

const ARENA_WIDTH_TILES: u32 = 24;
const ARENA_HEIGHT_TILES: u32 = 16;
const PLAYER_SPAWN_TILE: Vec2 = Vec2::new(4.0, 4.0);
const ENEMY_SPAWN_TILES: [(EnemyKind, Vec2); 3] = [
    (EnemyKind::Black, Vec2::new(14.0, 5.0)),
    (EnemyKind::Red, Vec2::new(9.0, 11.0)),
    (EnemyKind::Hairless, Vec2::new(19.0, 12.0)),
];
/// Crates (tile id 2) scattered through the arena.
const OBSTACLE_TILES: [(u32, u32); 6] = [(8, 4), (8, 5), (8, 6), (15, 9), (16, 9), (17, 9)];

#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build arena: {0}")]
    Arena(#[from] TilemapError),
    #[error(transparent)]
    Level(#[from] LevelError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) level: Level,
    pub(crate) script: InputScript,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Pounce Startup ===");

    let game_config = GameConfig::load_from_env()?;
    let level = build_arena(game_config)?;
    Ok(AppWiring {
        config: LoopConfig::from_env(),
        level,
        script: InputScript::demo(),
    })
}

/// Walled demo arena with a few crates, the player, and one enemy of each
/// listed breed.
pub(crate) fn build_arena(config: GameConfig) -> Result<Level, StartupError> {
    let mut map = Tilemap::walled(ARENA_WIDTH_TILES, ARENA_HEIGHT_TILES, config.tile_size)?;
    for (x, y) in OBSTACLE_TILES {
        map.set_tile(x, y, 2);
    }
    let mut level = Level::new(config, map, PLAYER_SPAWN_TILE)?;
    for (kind, tile) in ENEMY_SPAWN_TILES {
        level.spawn_enemy(kind, tile)?;
    }
    Ok(level)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_arena_spawns_every_listed_enemy() {
        let config = GameConfig {
            rng_seed: Some(1),
            ..GameConfig::default()
        };

        let level = build_arena(config).expect("arena");

        assert_eq!(level.enemies().len(), ENEMY_SPAWN_TILES.len());
        assert!(!level.player().body.is_dead);
    }
}
