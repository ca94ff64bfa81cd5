use pounce_engine::{
    InputSnapshot, RenderList, StateKey, TileCollision, Tilemap, Timer, Vec2,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::{debug, info, trace};

use super::buffs::{apply_buff, clear_buffs, expire_buff, PowerUpKind};
use super::combat::{
    apply_invulnerability_signal, cancel_invulnerability, resolve_hit, HitOutcome,
};
use super::config::{ConfigError, GameConfig};
use super::enemy::{Enemy, EnemyEnv, EnemyKind};
use super::entity::{ActorBuildError, ActorId, EntityBody};
use super::events::{LevelEvent, TimerEvent, TimerEventKind};
use super::movement::is_valid_position;
use super::player::Player;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build {actor}: {source}")]
    Build {
        actor: ActorId,
        #[source]
        source: ActorBuildError,
    },
    #[error("{actor} cannot stand at tile ({x}, {y})")]
    SpawnBlocked { actor: ActorId, x: f32, y: f32 },
    #[error("tilemap tile size {map} does not match configured tile size {config}")]
    TileSizeMismatch { map: f32, config: f32 },
}

/// One playable map: the player, the enemies hunting them, and the shared
/// timer whose fired events are routed back to the actors each frame.
#[derive(Debug)]
pub struct Level {
    config: GameConfig,
    map: Tilemap,
    player: Player,
    player_spawn: Vec2,
    enemies: Vec<Enemy>,
    timer: Timer<TimerEvent>,
    rng: StdRng,
    next_enemy_id: u32,
}

impl Level {
    pub fn new(config: GameConfig, map: Tilemap, player_spawn: Vec2) -> Result<Self, LevelError> {
        config.validate()?;
        if map.tile_size() != config.tile_size {
            return Err(LevelError::TileSizeMismatch {
                map: map.tile_size(),
                config: config.tile_size,
            });
        }
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player = Player::spawn(&config, &map, player_spawn).map_err(|source| {
            LevelError::Build {
                actor: ActorId::Player,
                source,
            }
        })?;
        ensure_standable(&player.body, &map, config.player.edge_inset, player_spawn)?;

        info!(
            width = map.width_tiles(),
            height = map.height_tiles(),
            seeded = config.rng_seed.is_some(),
            "level_ready"
        );
        Ok(Self {
            config,
            map,
            player,
            player_spawn,
            enemies: Vec::new(),
            timer: Timer::new(),
            rng,
            next_enemy_id: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &Tilemap {
        &self.map
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemy(&self, id: ActorId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id() == id)
    }

    pub fn enemy_mut(&mut self, id: ActorId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id() == id)
    }

    pub fn timer(&self) -> &Timer<TimerEvent> {
        &self.timer
    }

    /// Sprite center the enemies perceive, or `None` once the player is dead.
    pub fn player_target(&self) -> Option<Vec2> {
        (!self.player.body.is_dead).then(|| self.player.body.sprite_center())
    }

    pub fn spawn_enemy(
        &mut self,
        kind: EnemyKind,
        tile_position: Vec2,
    ) -> Result<ActorId, LevelError> {
        // Ids are never reused, so timers left by a failed spawn stay stale.
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        let actor = ActorId::Enemy(id);
        let target = self.player_target();
        let mut env = EnemyEnv {
            map: &self.map,
            timer: &mut self.timer,
            rng: &mut self.rng,
            config: &self.config,
            target,
        };
        let enemy = Enemy::spawn(id, kind, tile_position, &mut env)
            .map_err(|source| LevelError::Build { actor, source })?;
        let inset = self.config.enemy.edge_inset;
        ensure_standable(&enemy.body, &self.map, inset, tile_position)?;

        debug!(
            actor = %actor,
            kind = kind.name(),
            x = tile_position.x,
            y = tile_position.y,
            "enemy_spawned"
        );
        self.enemies.push(enemy);
        Ok(actor)
    }

    pub fn spawn_random_enemy(&mut self, tile_position: Vec2) -> Result<ActorId, LevelError> {
        let kind = EnemyKind::random(&mut self.rng);
        self.spawn_enemy(kind, tile_position)
    }

    /// Grants the configured power-up to `actor`. Returns `false` if the actor
    /// is gone or dead.
    pub fn apply_power_up(&mut self, actor: ActorId, kind: PowerUpKind) -> bool {
        let preset = self.config.power_ups.preset(kind);
        let Some(body) = find_body(&mut self.player, &mut self.enemies, actor) else {
            return false;
        };
        if body.is_dead {
            return false;
        }
        apply_buff(body, preset.buff, preset.duration, &mut self.timer);
        true
    }

    pub fn respawn_player(&mut self) {
        self.player
            .respawn(self.player_spawn, &self.map, &self.config, &mut self.timer);
        info!(x = self.player_spawn.x, y = self.player_spawn.y, "player_respawned");
    }

    /// Advances the level by `dt` seconds.
    ///
    /// Fired timer events are routed first, then the player acts, then every
    /// enemy against the player's new position. Claws are resolved after all
    /// movement, and enemies killed this frame are removed last.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) -> Vec<LevelEvent> {
        let mut events = Vec::new();

        let target = self.player_target();
        for fired in self.timer.update(dt) {
            self.route_timer_event(fired, target, &mut events);
        }

        if let Some(state) = self.player.update(dt, input, &self.map, &self.config) {
            events.push(LevelEvent::StateChanged {
                actor: ActorId::Player,
                state: state.name(),
            });
        }

        let target = self.player_target();
        let mut env = EnemyEnv {
            map: &self.map,
            timer: &mut self.timer,
            rng: &mut self.rng,
            config: &self.config,
            target,
        };
        for enemy in &mut self.enemies {
            if let Some(state) = enemy.update(dt, &mut env) {
                events.push(LevelEvent::StateChanged {
                    actor: enemy.id(),
                    state: state.name(),
                });
            }
        }

        self.resolve_combat(&mut events);
        self.remove_dead_enemies();
        events
    }

    pub fn render(&self, out: &mut RenderList) {
        let target = self.player_target();
        for enemy in &self.enemies {
            enemy.render(out, &self.config, target);
        }
        self.player.render(out, &self.config);
    }

    fn route_timer_event(
        &mut self,
        event: TimerEvent,
        target: Option<Vec2>,
        events: &mut Vec<LevelEvent>,
    ) {
        match event.kind {
            TimerEventKind::Invulnerability { signal, generation } => {
                let Some(body) = find_body(&mut self.player, &mut self.enemies, event.actor) else {
                    trace!(actor = %event.actor, "timer_event_for_missing_actor");
                    return;
                };
                let tuning = &self.config.invulnerability;
                apply_invulnerability_signal(body, signal, generation, tuning);
            }
            TimerEventKind::BuffExpired { buff_id } => {
                let Some(body) = find_body(&mut self.player, &mut self.enemies, event.actor) else {
                    trace!(actor = %event.actor, "timer_event_for_missing_actor");
                    return;
                };
                if expire_buff(body, buff_id).is_some() {
                    events.push(LevelEvent::BuffExpired { actor: event.actor });
                }
            }
            TimerEventKind::State(signal) => {
                let Some(enemy) = self
                    .enemies
                    .iter_mut()
                    .find(|enemy| enemy.id() == event.actor)
                else {
                    trace!(actor = %event.actor, "timer_event_for_missing_actor");
                    return;
                };
                let mut env = EnemyEnv {
                    map: &self.map,
                    timer: &mut self.timer,
                    rng: &mut self.rng,
                    config: &self.config,
                    target,
                };
                if let Some(state) = enemy.on_state_timer(signal, &mut env) {
                    events.push(LevelEvent::StateChanged {
                        actor: event.actor,
                        state: state.name(),
                    });
                }
            }
        }
    }

    fn resolve_combat(&mut self, events: &mut Vec<LevelEvent>) {
        let tuning = &self.config.invulnerability;
        for enemy in &mut self.enemies {
            if let Some(outcome) =
                resolve_hit(&mut self.player.body, &mut enemy.body, &mut self.timer, tuning)
            {
                record_hit(outcome, events);
            }
            if let Some(outcome) =
                resolve_hit(&mut enemy.body, &mut self.player.body, &mut self.timer, tuning)
            {
                record_hit(outcome, events);
            }
        }
    }

    fn remove_dead_enemies(&mut self) {
        let timer = &mut self.timer;
        self.enemies.retain_mut(|enemy| {
            if !enemy.body.is_dead {
                return true;
            }
            cancel_invulnerability(&mut enemy.body, timer);
            clear_buffs(&mut enemy.body, timer);
            debug!(actor = %enemy.id(), "enemy_removed");
            false
        });
    }
}

fn record_hit(outcome: HitOutcome, events: &mut Vec<LevelEvent>) {
    events.push(LevelEvent::HitLanded(outcome));
    if outcome.fatal {
        events.push(LevelEvent::ActorDied {
            actor: outcome.defender,
        });
    }
}

fn find_body<'a>(
    player: &'a mut Player,
    enemies: &'a mut [Enemy],
    actor: ActorId,
) -> Option<&'a mut EntityBody> {
    match actor {
        ActorId::Player => Some(&mut player.body),
        ActorId::Enemy(_) => enemies
            .iter_mut()
            .find(|enemy| enemy.id() == actor)
            .map(|enemy| &mut enemy.body),
    }
}

fn ensure_standable(
    body: &EntityBody,
    map: &Tilemap,
    inset: f32,
    tile_position: Vec2,
) -> Result<(), LevelError> {
    if is_valid_position(body, body.canvas_position, map, inset) {
        return Ok(());
    }
    Err(LevelError::SpawnBlocked {
        actor: body.id,
        x: tile_position.x,
        y: tile_position.y,
    })
}
