use super::combat::{HitOutcome, InvulnerabilitySignal};
use super::entity::ActorId;

/// Payload scheduled on the level timer and routed back to `actor` when it
/// fires. Every variant carries enough to tell whether it is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub actor: ActorId,
    pub kind: TimerEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    Invulnerability {
        signal: InvulnerabilitySignal,
        generation: u64,
    },
    State(StateTimer),
    BuffExpired {
        buff_id: u64,
    },
}

/// Wake-up for a behaviour state. `generation` is the state's entry count at
/// scheduling time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTimer {
    pub generation: u64,
    pub kind: StateTimerKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTimerKind {
    IdleElapsed,
    WalkElapsed,
}

/// What happened during one [`Level::update`](super::level::Level::update).
#[derive(Debug, Clone, PartialEq)]
pub enum LevelEvent {
    StateChanged {
        actor: ActorId,
        state: &'static str,
    },
    HitLanded(HitOutcome),
    ActorDied {
        actor: ActorId,
    },
    BuffExpired {
        actor: ActorId,
    },
}
