use pounce_engine::{
    Animation, Circle, OverlayColor, RenderList, State, StateKey, StateMachine, StateOverlay,
    TileCollision, Timer, Vec2,
};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::trace;

use super::claw::{ClawSwing, SwingPhase};
use super::config::{build_animations, EnemyTuning, GameConfig, SheetNames};
use super::direction::{Direction, DirectionTable};
use super::entity::{ActorBuildError, ActorId, EntityBody, SheetKind, SheetPair, Stats};
use super::events::{StateTimer, StateTimerKind, TimerEvent, TimerEventKind};
use super::movement::attempt_step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyStateKey {
    Idling,
    Walking,
    Chasing,
    Attacking,
}

impl StateKey for EnemyStateKey {
    const ALL: &'static [Self] = &[
        EnemyStateKey::Idling,
        EnemyStateKey::Walking,
        EnemyStateKey::Chasing,
        EnemyStateKey::Attacking,
    ];

    fn transitions(self) -> &'static [Self] {
        use EnemyStateKey::*;
        match self {
            Idling => &[Walking, Chasing],
            Walking => &[Idling, Chasing],
            Chasing => &[Walking, Attacking],
            Attacking => &[Idling],
        }
    }

    fn name(self) -> &'static str {
        match self {
            EnemyStateKey::Idling => "idling",
            EnemyStateKey::Walking => "walking",
            EnemyStateKey::Chasing => "chasing",
            EnemyStateKey::Attacking => "attacking",
        }
    }
}

/// Cat breed; picks the sprite sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Black,
    Blue,
    Hairless,
    Orange,
    Purple,
    Red,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 6] = [
        EnemyKind::Black,
        EnemyKind::Blue,
        EnemyKind::Hairless,
        EnemyKind::Orange,
        EnemyKind::Purple,
        EnemyKind::Red,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Black => "black",
            EnemyKind::Blue => "blue",
            EnemyKind::Hairless => "hairless",
            EnemyKind::Orange => "orange",
            EnemyKind::Purple => "purple",
            EnemyKind::Red => "red",
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn sheet_names(self) -> SheetNames {
        SheetNames::cat(self.name())
    }
}

/// Level services an enemy borrows for one frame.
pub struct EnemyEnv<'a> {
    pub map: &'a dyn TileCollision,
    pub timer: &'a mut Timer<TimerEvent>,
    pub rng: &'a mut StdRng,
    pub config: &'a GameConfig,
    /// Player sprite center, or `None` when there is nobody to chase.
    pub target: Option<Vec2>,
}

pub struct EnemyCtx<'a> {
    pub body: &'a mut EntityBody,
    pub map: &'a dyn TileCollision,
    pub timer: &'a mut Timer<TimerEvent>,
    pub rng: &'a mut StdRng,
    pub config: &'a GameConfig,
    pub target: Option<Vec2>,
}

impl<'a> EnemyCtx<'a> {
    fn tuning(&self) -> &'a EnemyTuning {
        &self.config.enemy
    }

    fn delta_to_target(&self) -> Option<Vec2> {
        self.target.map(|target| target - self.body.sprite_center())
    }

    fn target_perceived(&self) -> bool {
        self.delta_to_target()
            .is_some_and(|delta| delta.length() <= self.tuning().perception_radius)
    }

    fn random_facing(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    fn schedule(&mut self, seconds: f32, generation: u64, kind: StateTimerKind) {
        self.timer.wait(
            seconds,
            TimerEvent {
                actor: self.body.id,
                kind: TimerEventKind::State(StateTimer { generation, kind }),
            },
        );
    }

    fn step(&mut self, direction: Direction, dt: f32) -> bool {
        let distance = self.body.effective_speed() * dt;
        let inset = self.config.enemy.edge_inset;
        attempt_step(self.body, direction, distance, self.map, inset)
    }
}

#[derive(Debug, Clone)]
pub enum EnemyState {
    Idling {
        animations: DirectionTable<Animation>,
        generation: u64,
    },
    Walking {
        animations: DirectionTable<Animation>,
        generation: u64,
    },
    Chasing {
        animations: DirectionTable<Animation>,
        direction_cooldown: f32,
        attack_cooldown: f32,
        /// Side stepped to while the forward move is blocked; held until the
        /// forward move clears.
        unstick: Option<Direction>,
    },
    Attacking(ClawSwing),
}

impl EnemyState {
    pub fn animation(&self, facing: Direction) -> &Animation {
        match self {
            EnemyState::Idling { animations, .. }
            | EnemyState::Walking { animations, .. }
            | EnemyState::Chasing { animations, .. } => &animations[facing],
            EnemyState::Attacking(swing) => swing.animation(facing),
        }
    }

    pub fn animation_mut(&mut self, facing: Direction) -> &mut Animation {
        match self {
            EnemyState::Idling { animations, .. }
            | EnemyState::Walking { animations, .. }
            | EnemyState::Chasing { animations, .. } => &mut animations[facing],
            EnemyState::Attacking(swing) => swing.animation_mut(facing),
        }
    }
}

impl<'a> State<EnemyCtx<'a>> for EnemyState {
    type Key = EnemyStateKey;
    type Signal = StateTimer;

    fn enter(&mut self, ctx: &mut EnemyCtx<'a>) {
        match self {
            EnemyState::Idling {
                animations,
                generation,
            } => {
                ctx.body.speed = 0.0;
                ctx.body.sheet = SheetKind::Walking;
                animations[ctx.body.facing].refresh();
                *generation += 1;
                let seconds = ctx.tuning().idle_duration.sample(ctx.rng);
                ctx.schedule(seconds, *generation, StateTimerKind::IdleElapsed);
            }
            EnemyState::Walking {
                animations,
                generation,
            } => {
                ctx.body.speed = ctx.tuning().wander_speed;
                ctx.body.facing = ctx.random_facing();
                animations[ctx.body.facing].refresh();
                *generation += 1;
                let seconds = ctx.tuning().walk_duration.sample(ctx.rng);
                ctx.schedule(seconds, *generation, StateTimerKind::WalkElapsed);
            }
            EnemyState::Chasing {
                direction_cooldown,
                attack_cooldown,
                unstick,
                ..
            } => {
                ctx.body.speed = ctx.tuning().chase_speed;
                *direction_cooldown = 0.0;
                *attack_cooldown = ctx.tuning().attack_cooldown;
                *unstick = None;
            }
            EnemyState::Attacking(swing) => swing.enter(ctx.body),
        }
    }

    fn exit(&mut self, ctx: &mut EnemyCtx<'a>) {
        if let EnemyState::Attacking(swing) = self {
            swing.exit(ctx.body);
        }
    }

    fn update(&mut self, dt: f32, ctx: &mut EnemyCtx<'a>) -> Option<EnemyStateKey> {
        match self {
            EnemyState::Idling { .. } => ctx
                .target_perceived()
                .then_some(EnemyStateKey::Chasing),
            EnemyState::Walking { .. } => {
                if ctx.target_perceived() {
                    return Some(EnemyStateKey::Chasing);
                }
                let facing = ctx.body.facing;
                if !ctx.step(facing, dt) {
                    ctx.body.facing = ctx.random_facing();
                    trace!(actor = %ctx.body.id, facing = ctx.body.facing.name(), "enemy_turned");
                }
                None
            }
            EnemyState::Chasing {
                direction_cooldown,
                attack_cooldown,
                unstick,
                ..
            } => {
                let Some(delta) = ctx.delta_to_target() else {
                    return Some(EnemyStateKey::Walking);
                };
                let distance = delta.length();
                if distance > ctx.tuning().perception_radius {
                    return Some(EnemyStateKey::Walking);
                }

                *attack_cooldown -= dt;
                if distance <= ctx.tuning().attack_range {
                    ctx.body.facing = Direction::toward(delta);
                    return (*attack_cooldown <= 0.0).then_some(EnemyStateKey::Attacking);
                }

                *direction_cooldown -= dt;
                if *direction_cooldown <= 0.0 {
                    ctx.body.facing = Direction::toward(delta);
                    *direction_cooldown = ctx.tuning().direction_update_interval;
                }

                let facing = ctx.body.facing;
                if ctx.step(facing, dt) {
                    *unstick = None;
                    return None;
                }
                let side = unstick
                    .filter(|side| side.is_horizontal() != facing.is_horizontal())
                    .unwrap_or_else(|| facing.perpendicular_toward(delta));
                if ctx.step(side, dt) {
                    *unstick = Some(side);
                } else {
                    *unstick = None;
                    trace!(actor = %ctx.body.id, "enemy_chase_blocked");
                }
                None
            }
            EnemyState::Attacking(swing) => match swing.update(ctx.body, &ctx.config.claw) {
                SwingPhase::Finished => Some(EnemyStateKey::Idling),
                SwingPhase::Swinging => None,
            },
        }
    }

    fn signal(&mut self, signal: &StateTimer, ctx: &mut EnemyCtx<'a>) -> Option<EnemyStateKey> {
        match (self, signal.kind) {
            (EnemyState::Idling { generation, .. }, StateTimerKind::IdleElapsed)
                if *generation == signal.generation =>
            {
                Some(EnemyStateKey::Walking)
            }
            (EnemyState::Walking { generation, .. }, StateTimerKind::WalkElapsed)
                if *generation == signal.generation =>
            {
                if ctx.rng.gen::<f32>() < ctx.tuning().idle_chance {
                    return Some(EnemyStateKey::Idling);
                }
                ctx.body.facing = ctx.random_facing();
                *generation += 1;
                let seconds = ctx.tuning().walk_duration.sample(ctx.rng);
                ctx.schedule(seconds, *generation, StateTimerKind::WalkElapsed);
                None
            }
            _ => {
                trace!(actor = %ctx.body.id, ?signal, "stale_state_timer");
                None
            }
        }
    }
}

impl StateOverlay<EntityBody> for EnemyState {
    fn render(&self, body: &EntityBody, out: &mut RenderList) -> bool {
        match self {
            EnemyState::Attacking(_) if body.is_attacking() => {
                out.hitbox(body.claw_hitbox, OverlayColor::Claw);
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct Enemy {
    pub body: EntityBody,
    pub kind: EnemyKind,
    machine: StateMachine<EnemyStateKey, EnemyState>,
}

impl Enemy {
    pub fn spawn(
        id: u32,
        kind: EnemyKind,
        tile_position: Vec2,
        env: &mut EnemyEnv<'_>,
    ) -> Result<Self, ActorBuildError> {
        let config = env.config;
        let tuning = &config.enemy;
        let body = EntityBody::new(
            ActorId::Enemy(id),
            tile_position,
            config.tile_size,
            tuning.shape,
            Stats::new(tuning.health, tuning.strength, tuning.defense),
            SheetPair::parse(&kind.sheet_names())?,
        );

        let animations = &tuning.animations;
        let mut machine = StateMachine::new();
        machine.add(
            EnemyStateKey::Idling,
            EnemyState::Idling {
                animations: build_animations(&animations.idle)?,
                generation: 0,
            },
        )?;
        machine.add(
            EnemyStateKey::Walking,
            EnemyState::Walking {
                animations: build_animations(&animations.walk)?,
                generation: 0,
            },
        )?;
        machine.add(
            EnemyStateKey::Chasing,
            EnemyState::Chasing {
                animations: build_animations(&animations.chase)?,
                direction_cooldown: 0.0,
                attack_cooldown: 0.0,
                unstick: None,
            },
        )?;
        machine.add(
            EnemyStateKey::Attacking,
            EnemyState::Attacking(ClawSwing::new(build_animations(&animations.attack)?)),
        )?;

        let mut enemy = Self {
            body,
            kind,
            machine,
        };
        let mut ctx = enemy_ctx(&mut enemy.body, env);
        enemy.machine.start(EnemyStateKey::Idling, &mut ctx)?;
        Ok(enemy)
    }

    pub fn id(&self) -> ActorId {
        self.body.id
    }

    pub fn state(&self) -> Option<EnemyStateKey> {
        self.machine.current_key()
    }

    pub fn current_animation(&self) -> Option<&Animation> {
        self.machine
            .current_state()
            .map(|state| state.animation(self.body.facing))
    }

    /// Runs one frame of behaviour, then advances the active animation and
    /// re-derives the body hitbox. Dead enemies do nothing.
    pub fn update(&mut self, dt: f32, env: &mut EnemyEnv<'_>) -> Option<EnemyStateKey> {
        if self.body.is_dead {
            return None;
        }
        let mut ctx = enemy_ctx(&mut self.body, env);
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

    /// Delivers a fired state timer to the active state.
    pub fn on_state_timer(
        &mut self,
        signal: StateTimer,
        env: &mut EnemyEnv<'_>,
    ) -> Option<EnemyStateKey> {
        if self.body.is_dead {
            return None;
        }
        let mut ctx = enemy_ctx(&mut self.body, env);
        self.machine.signal(&signal, &mut ctx)
    }

    /// Draws the sprite, plus body, claw and perception outlines when debug
    /// overlays are on. The perception circle turns to the alert color while
    /// `target` is inside it.
    pub fn render(&self, out: &mut RenderList, config: &GameConfig, target: Option<Vec2>) {
        out.sprite(
            self.body.sheet_key(),
            self.body.current_frame,
            self.body.render_origin(),
            self.body.shape.render_scale,
            self.body.alpha,
        );
        if !config.debug_overlays {
            return;
        }
        out.hitbox(self.body.hitbox, OverlayColor::Body);
        self.machine.render(&self.body, out);

        let center = self.body.sprite_center();
        let radius = config.enemy.perception_radius;
        let color = if target.is_some_and(|target| target.distance(center) <= radius) {
            OverlayColor::PerceptionAlert
        } else {
            OverlayColor::Perception
        };
        out.circle(Circle::new(center, radius), color);
    }
}

fn enemy_ctx<'a>(body: &'a mut EntityBody, env: &'a mut EnemyEnv<'_>) -> EnemyCtx<'a> {
    EnemyCtx {
        body,
        map: env.map,
        timer: &mut *env.timer,
        rng: &mut *env.rng,
        config: env.config,
        target: env.target,
    }
}
