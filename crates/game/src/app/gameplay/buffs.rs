use pounce_engine::{Timer, TimerId};
use serde::Deserialize;
use tracing::debug;

use super::entity::EntityBody;
use super::events::{TimerEvent, TimerEventKind};

/// Temporary stat change granted by a power-up.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "stat", rename_all = "snake_case")]
pub enum StatBuff {
    Strength { amount: u32 },
    Defense { amount: u32 },
    Speed { amount: f32 },
}

/// Power-up pickups; each maps to a configured [`StatBuff`] and duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Attack,
    Defense,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveBuff {
    id: u64,
    buff: StatBuff,
    task: TimerId,
}

/// Buffs currently applied to one body, each with the timer entry that will
/// revert it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffLedger {
    next_id: u64,
    active: Vec<ActiveBuff>,
}

impl BuffLedger {
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

fn apply_stat(body: &mut EntityBody, buff: StatBuff) {
    match buff {
        StatBuff::Strength { amount } => {
            body.stats.strength = body.stats.strength.saturating_add(amount);
        }
        StatBuff::Defense { amount } => {
            body.stats.defense = body.stats.defense.saturating_add(amount);
        }
        StatBuff::Speed { amount } => body.speed_bonus += amount,
    }
}

fn revert_stat(body: &mut EntityBody, buff: StatBuff) {
    match buff {
        StatBuff::Strength { amount } => {
            body.stats.strength = body.stats.strength.saturating_sub(amount);
        }
        StatBuff::Defense { amount } => {
            body.stats.defense = body.stats.defense.saturating_sub(amount);
        }
        StatBuff::Speed { amount } => body.speed_bonus -= amount,
    }
}

/// Applies `buff` now and schedules its revert after `duration` seconds.
pub fn apply_buff(
    body: &mut EntityBody,
    buff: StatBuff,
    duration: f32,
    timer: &mut Timer<TimerEvent>,
) -> TimerId {
    let id = body.buffs.next_id;
    body.buffs.next_id += 1;
    apply_stat(body, buff);
    let task = timer.wait(
        duration,
        TimerEvent {
            actor: body.id,
            kind: TimerEventKind::BuffExpired { buff_id: id },
        },
    );
    body.buffs.active.push(ActiveBuff { id, buff, task });
    debug!(actor = %body.id, ?buff, duration, "buff_applied");
    task
}

/// Reverts the buff with `buff_id`. Returns `None` if it was already removed.
pub fn expire_buff(body: &mut EntityBody, buff_id: u64) -> Option<StatBuff> {
    let index = body.buffs.active.iter().position(|active| active.id == buff_id)?;
    let active = body.buffs.active.remove(index);
    revert_stat(body, active.buff);
    debug!(actor = %body.id, buff = ?active.buff, "buff_expired");
    Some(active.buff)
}

/// Cancels and reverts every active buff.
pub fn clear_buffs(body: &mut EntityBody, timer: &mut Timer<TimerEvent>) {
    let active = std::mem::take(&mut body.buffs.active);
    for entry in active {
        timer.cancel(entry.task);
        revert_stat(body, entry.buff);
    }
}
