use std::convert::Infallible;

use pounce_engine::{
    Animation, InputAction, InputSnapshot, OverlayColor, RenderList, State, StateKey,
    StateMachine, StateOverlay, TileCollision, Timer, Vec2,
};
use tracing::{debug, trace};

use super::buffs::clear_buffs;
use super::claw::{ClawSwing, SwingPhase};
use super::combat::cancel_invulnerability;
use super::config::{build_animations, GameConfig, PlayerTuning};
use super::direction::{Direction, DirectionTable};
use super::entity::{ActorBuildError, ActorId, EntityBody, SheetKind, SheetPair, Stats};
use super::events::TimerEvent;
use super::movement::attempt_step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStateKey {
    Idling,
    Walking,
    Running,
    Attacking,
}

impl StateKey for PlayerStateKey {
    const ALL: &'static [Self] = &[
        PlayerStateKey::Idling,
        PlayerStateKey::Walking,
        PlayerStateKey::Running,
        PlayerStateKey::Attacking,
    ];

    fn transitions(self) -> &'static [Self] {
        use PlayerStateKey::*;
        match self {
            Idling => &[Walking, Running, Attacking],
            Walking => &[Idling, Running, Attacking],
            Running => &[Idling, Walking, Attacking],
            Attacking => &[Idling],
        }
    }

    fn name(self) -> &'static str {
        match self {
            PlayerStateKey::Idling => "idling",
            PlayerStateKey::Walking => "walking",
            PlayerStateKey::Running => "running",
            PlayerStateKey::Attacking => "attacking",
        }
    }
}

/// Everything a player state may touch during one frame.
pub struct PlayerCtx<'a> {
    pub body: &'a mut EntityBody,
    pub running: &'a mut bool,
    pub input: &'a InputSnapshot,
    pub map: &'a dyn TileCollision,
    pub config: &'a GameConfig,
}

impl<'a> PlayerCtx<'a> {
    fn tuning(&self) -> &'a PlayerTuning {
        &self.config.player
    }

    fn toggle_run_if_pressed(&mut self) {
        if self.input.is_pressed(InputAction::ToggleRun) {
            *self.running = !*self.running;
            debug!(running = *self.running, "run_toggled");
        }
    }

    fn attack_pressed(&self) -> bool {
        self.input.is_pressed(InputAction::Attack)
    }

    fn gait(&self) -> Gait {
        if *self.running {
            Gait::Run
        } else {
            Gait::Walk
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gait {
    Walk,
    Run,
}

impl Gait {
    fn key(self) -> PlayerStateKey {
        match self {
            Gait::Walk => PlayerStateKey::Walking,
            Gait::Run => PlayerStateKey::Running,
        }
    }

    fn speed(self, tuning: &PlayerTuning) -> f32 {
        match self {
            Gait::Walk => tuning.walk_speed,
            Gait::Run => tuning.run_speed,
        }
    }

    fn sheet(self) -> SheetKind {
        match self {
            Gait::Walk => SheetKind::Walking,
            Gait::Run => SheetKind::Running,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PlayerState {
    Idling(DirectionTable<Animation>),
    Moving {
        gait: Gait,
        animations: DirectionTable<Animation>,
    },
    Attacking(ClawSwing),
}

impl PlayerState {
    pub fn animation(&self, facing: Direction) -> &Animation {
        match self {
            PlayerState::Idling(animations) | PlayerState::Moving { animations, .. } => {
                &animations[facing]
            }
            PlayerState::Attacking(swing) => swing.animation(facing),
        }
    }

    pub fn animation_mut(&mut self, facing: Direction) -> &mut Animation {
        match self {
            PlayerState::Idling(animations) | PlayerState::Moving { animations, .. } => {
                &mut animations[facing]
            }
            PlayerState::Attacking(swing) => swing.animation_mut(facing),
        }
    }
}

impl<'a> State<PlayerCtx<'a>> for PlayerState {
    type Key = PlayerStateKey;
    type Signal = Infallible;

    fn enter(&mut self, ctx: &mut PlayerCtx<'a>) {
        match self {
            PlayerState::Idling(animations) => {
                ctx.body.speed = 0.0;
                ctx.body.sheet = SheetKind::Walking;
                animations[ctx.body.facing].refresh();
            }
            PlayerState::Moving { gait, animations } => {
                ctx.body.speed = gait.speed(ctx.tuning());
                ctx.body.sheet = gait.sheet();
                animations[ctx.body.facing].refresh();
            }
            PlayerState::Attacking(swing) => swing.enter(ctx.body),
        }
    }

    fn exit(&mut self, ctx: &mut PlayerCtx<'a>) {
        match self {
            PlayerState::Idling(_) => {}
            PlayerState::Moving { .. } => ctx.body.sheet = SheetKind::Walking,
            PlayerState::Attacking(swing) => swing.exit(ctx.body),
        }
    }

    fn update(&mut self, dt: f32, ctx: &mut PlayerCtx<'a>) -> Option<PlayerStateKey> {
        match self {
            PlayerState::Idling(_) => {
                ctx.toggle_run_if_pressed();
                if ctx.attack_pressed() {
                    return Some(PlayerStateKey::Attacking);
                }
                let direction = Direction::from_input(ctx.input)?;
                ctx.body.facing = direction;
                Some(ctx.gait().key())
            }
            PlayerState::Moving { gait, .. } => {
                if ctx.attack_pressed() {
                    return Some(PlayerStateKey::Attacking);
                }
                ctx.toggle_run_if_pressed();
                let Some(direction) = Direction::from_input(ctx.input) else {
                    return Some(PlayerStateKey::Idling);
                };
                if ctx.gait() != *gait {
                    return Some(ctx.gait().key());
                }
                ctx.body.facing = direction;
                let distance = ctx.body.effective_speed() * dt;
                let inset = ctx.tuning().edge_inset;
                if !attempt_step(ctx.body, direction, distance, ctx.map, inset) {
                    trace!(direction = direction.name(), "player_move_blocked");
                }
                None
            }
            PlayerState::Attacking(swing) => match swing.update(ctx.body, &ctx.config.claw) {
                SwingPhase::Finished => Some(PlayerStateKey::Idling),
                SwingPhase::Swinging => None,
            },
        }
    }
}

impl StateOverlay<EntityBody> for PlayerState {
    fn render(&self, body: &EntityBody, out: &mut RenderList) -> bool {
        match self {
            PlayerState::Attacking(_) if body.is_attacking() => {
                out.hitbox(body.claw_hitbox, OverlayColor::Claw);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct Player {
    pub body: EntityBody,
    running: bool,
    machine: StateMachine<PlayerStateKey, PlayerState>,
}

impl Player {
    pub fn spawn(
        config: &GameConfig,
        map: &dyn TileCollision,
        tile_position: Vec2,
    ) -> Result<Self, ActorBuildError> {
        let tuning = &config.player;
        let body = EntityBody::new(
            ActorId::Player,
            tile_position,
            config.tile_size,
            tuning.shape,
            Stats::new(tuning.health, tuning.strength, tuning.defense),
            SheetPair::parse(&tuning.sheets)?,
        );

        let animations = &tuning.animations;
        let mut machine = StateMachine::new();
        machine.add(
            PlayerStateKey::Idling,
            PlayerState::Idling(build_animations(&animations.idle)?),
        )?;
        machine.add(
            PlayerStateKey::Walking,
            PlayerState::Moving {
                gait: Gait::Walk,
                animations: build_animations(&animations.walk)?,
            },
        )?;
        machine.add(
            PlayerStateKey::Running,
            PlayerState::Moving {
                gait: Gait::Run,
                animations: build_animations(&animations.run)?,
            },
        )?;
        machine.add(
            PlayerStateKey::Attacking,
            PlayerState::Attacking(ClawSwing::new(build_animations(&animations.attack)?)),
        )?;

        let mut player = Self {
            body,
            running: false,
            machine,
        };
        let input = InputSnapshot::empty();
        let mut ctx = PlayerCtx {
            body: &mut player.body,
            running: &mut player.running,
            input: &input,
            map,
            config,
        };
        player.machine.start(PlayerStateKey::Idling, &mut ctx)?;
        Ok(player)
    }

    pub fn state(&self) -> Option<PlayerStateKey> {
        self.machine.current_key()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.machine
            .current_state()
            .map(|state| state.animation(self.body.facing))
    }

    /// Runs one frame of behaviour, then advances the active animation and
    /// re-derives the body hitbox. Dead players do nothing.
    pub fn update(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        map: &dyn TileCollision,
        config: &GameConfig,
    ) -> Option<PlayerStateKey> {
        if self.body.is_dead {
            return None;
        }
        let mut ctx = PlayerCtx {
            body: &mut self.body,
            running: &mut self.running,
            input,
            map,
            config,
        };
        let changed = self.machine.update(dt, &mut ctx);

        let facing = self.body.facing;
        if let Some(state) = self.machine.current_state_mut() {
            let animation = state.animation_mut(facing);
            animation.update(dt);
            self.body.current_frame = animation.current_frame();
        }
        self.body.sync_body_hitbox();
        changed
    }

    /// Revives the player at `tile_position`: full health, no pending
    /// invulnerability or buffs, back in Idling.
    pub fn respawn(
        &mut self,
        tile_position: Vec2,
        map: &dyn TileCollision,
        config: &GameConfig,
        timer: &mut Timer<TimerEvent>,
    ) {
        cancel_invulnerability(&mut self.body, timer);
        clear_buffs(&mut self.body, timer);
        self.body.stats.health = self.body.stats.total_health;
        self.body.is_dead = false;
        self.body
            .set_canvas_position((tile_position * config.tile_size).floor());
        self.running = false;

        let input = InputSnapshot::empty();
        let mut ctx = PlayerCtx {
            body: &mut self.body,
            running: &mut self.running,
            input: &input,
            map,
            config,
        };
        self.machine.change(PlayerStateKey::Idling, &mut ctx);
        self.body.deactivate_claw();
        self.body.sync_body_hitbox();
    }

    pub fn render(&self, out: &mut RenderList, config: &GameConfig) {
        out.sprite(
            self.body.sheet_key(),
            self.body.current_frame,
            self.body.render_origin(),
            self.body.shape.render_scale,
            self.body.alpha,
        );
        if config.debug_overlays {
            out.hitbox(self.body.hitbox, OverlayColor::Body);
            self.machine.render(&self.body, out);
        }
    }
}
