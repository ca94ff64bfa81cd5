use std::env;
use std::time::Duration;

use pounce_engine::{InputAction, InputTracker, RenderList};
use tracing::{debug, info, warn};

use super::gameplay::{ActorId, Level, LevelEvent};

pub const FRAMES_ENV_VAR: &str = "CLAWS_FRAMES";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    /// Simulated wall-clock time between rendered frames.
    pub frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub frames: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            frame_delta: Duration::from_micros(16_667),
            max_ticks_per_frame: 5,
            frames: 600,
        }
    }
}

impl LoopConfig {
    /// Defaults with the frame count taken from `CLAWS_FRAMES` when it is set
    /// and parses.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let frames = resolve_frame_count(defaults.frames);
        Self { frames, ..defaults }
    }
}

/// Held actions over runs of ticks. Past the last step nothing is held.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone)]
struct ScriptStep {
    ticks: u32,
    held: Vec<InputAction>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hold(mut self, ticks: u32, held: &[InputAction]) -> Self {
        self.steps.push(ScriptStep {
            ticks,
            held: held.to_vec(),
        });
        self
    }

    pub fn idle(self, ticks: u32) -> Self {
        self.hold(ticks, &[])
    }

    pub fn total_ticks(&self) -> u32 {
        self.steps.iter().map(|step| step.ticks).sum()
    }

    pub fn held_at(&self, tick: u32) -> &[InputAction] {
        let mut start = 0u32;
        for step in &self.steps {
            let end = start.saturating_add(step.ticks);
            if tick < end {
                return &step.held;
            }
            start = end;
        }
        &[]
    }

    /// A short patrol: walk, swing, run a lap, swing again, then rest.
    pub fn demo() -> Self {
        use InputAction::*;
        Self::new()
            .hold(45, &[MoveRight])
            .hold(1, &[Attack])
            .idle(20)
            .hold(1, &[ToggleRun, MoveDown])
            .hold(40, &[MoveDown])
            .hold(50, &[MoveLeft])
            .hold(1, &[Attack])
            .idle(20)
            .hold(40, &[MoveUp])
            .hold(1, &[ToggleRun])
            .idle(30)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u32,
    pub ticks: u32,
    pub hits: u32,
    pub deaths: u32,
    pub respawns: u32,
    pub draw_commands: usize,
}

/// Drives `level` at a fixed timestep without a window, feeding input from
/// `script`. The player is respawned whenever they die.
pub fn run_headless(level: &mut Level, config: &LoopConfig, script: &InputScript) -> RunSummary {
    let target_tps = config.target_tps.max(1);
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / f64::from(target_tps));
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    info!(
        target_tps,
        max_ticks_per_frame,
        frames = config.frames,
        script_ticks = script.total_ticks(),
        "headless_run_start"
    );

    let mut tracker = InputTracker::new();
    let mut accumulator = Duration::ZERO;
    let mut summary = RunSummary::default();
    let mut render_list = RenderList::new();

    'frames: for _ in 0..config.frames {
        accumulator = accumulator.saturating_add(config.frame_delta);
        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            let input = tracker.advance(script.held_at(summary.ticks));
            if input.quit_requested() {
                info!(reason = "scripted_quit", "shutdown_requested");
                break 'frames;
            }
            let events = level.update(fixed_dt_seconds, &input);
            summary.ticks += 1;
            record_events(level, &events, &mut summary);
        }
        accumulator = step_plan.remaining_accumulator;
        if !step_plan.dropped_backlog.is_zero() {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        render_list.clear();
        level.render(&mut render_list);
        summary.draw_commands = render_list.len();
        summary.frames += 1;
    }

    info!(
        frames = summary.frames,
        ticks = summary.ticks,
        hits = summary.hits,
        deaths = summary.deaths,
        enemies_left = level.enemies().len(),
        "headless_run_finished"
    );
    summary
}

fn record_events(level: &mut Level, events: &[LevelEvent], summary: &mut RunSummary) {
    for event in events {
        match event {
            LevelEvent::StateChanged { actor, state } => {
                debug!(actor = %actor, state = *state, "state_changed");
            }
            LevelEvent::HitLanded(hit) => {
                summary.hits += 1;
                info!(
                    attacker = %hit.attacker,
                    defender = %hit.defender,
                    damage = hit.damage,
                    remaining = hit.remaining_health,
                    "hit"
                );
            }
            LevelEvent::ActorDied { actor } => {
                summary.deaths += 1;
                if *actor == ActorId::Player {
                    level.respawn_player();
                    summary.respawns += 1;
                }
            }
            LevelEvent::BuffExpired { actor } => debug!(actor = %actor, "buff_expired"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn resolve_frame_count(default_frames: u32) -> u32 {
    match env::var(FRAMES_ENV_VAR) {
        Ok(value) => match value.parse::<u32>() {
            Ok(frames) => frames,
            Err(_) => {
                warn!(
                    env_var = FRAMES_ENV_VAR,
                    value = value.as_str(),
                    "invalid frame-count env var value; falling back to default"
                );
                default_frames
            }
        },
        Err(env::VarError::NotPresent) => default_frames,
        Err(err) => {
            warn!(
                env_var = FRAMES_ENV_VAR,
                error = %err,
                "unable to read frame-count env var; falling back to default"
            );
            default_frames
        }
    }
}

#[cfg(test)]
mod tests {
    use pounce_engine::{Tilemap, Vec2};

    use super::*;
    use crate::app::gameplay::{EnemyKind, GameConfig, PlayerStateKey};

    fn demo_level() -> Level {
        let config = GameConfig {
            rng_seed: Some(5),
            ..GameConfig::default()
        };
        let map = Tilemap::walled(20, 15, config.tile_size).expect("map");
        Level::new(config, map, Vec2::new(4.0, 4.0)).expect("level")
    }

    #[test]
    fn plan_sim_steps_runs_whole_ticks_and_keeps_remainder() {
        let fixed_dt = Duration::from_millis(10);
        let plan = plan_sim_steps(Duration::from_millis(25), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(5));
        assert!(plan.dropped_backlog.is_zero());
    }

    #[test]
    fn plan_sim_steps_drops_backlog_past_tick_cap() {
        let fixed_dt = Duration::from_millis(10);
        let plan = plan_sim_steps(Duration::from_millis(100), fixed_dt, 3);
        assert_eq!(plan.ticks_to_run, 3);
        assert!(plan.remaining_accumulator.is_zero());
        assert_eq!(plan.dropped_backlog, Duration::from_millis(70));
    }

    #[test]
    fn script_holds_each_step_for_its_ticks() {
        let script = InputScript::new()
            .hold(2, &[InputAction::MoveLeft])
            .idle(1)
            .hold(1, &[InputAction::Attack]);

        assert_eq!(script.total_ticks(), 4);
        assert_eq!(script.held_at(0), &[InputAction::MoveLeft]);
        assert_eq!(script.held_at(1), &[InputAction::MoveLeft]);
        assert!(script.held_at(2).is_empty());
        assert_eq!(script.held_at(3), &[InputAction::Attack]);
        assert!(script.held_at(4).is_empty());
    }

    #[test]
    fn headless_run_advances_one_tick_per_frame() {
        let mut level = demo_level();
        level
            .spawn_enemy(EnemyKind::Red, Vec2::new(12.0, 9.0))
            .expect("spawn enemy");
        let config = LoopConfig {
            frame_delta: Duration::from_millis(20),
            target_tps: 50,
            frames: 30,
            ..LoopConfig::default()
        };

        let summary = run_headless(&mut level, &config, &InputScript::demo());

        assert_eq!(summary.frames, 30);
        assert_eq!(summary.ticks, 30);
        assert!(summary.draw_commands >= 2);
    }

    #[test]
    fn headless_run_stops_on_scripted_quit() {
        let mut level = demo_level();
        let script = InputScript::new()
            .hold(3, &[InputAction::MoveRight])
            .hold(1, &[InputAction::Quit]);
        let config = LoopConfig {
            frame_delta: Duration::from_millis(20),
            target_tps: 50,
            frames: 100,
            ..LoopConfig::default()
        };

        let summary = run_headless(&mut level, &config, &script);

        assert_eq!(summary.ticks, 3);
        assert_eq!(level.player().state(), Some(PlayerStateKey::Walking));
    }
}
