use pounce_engine::Timer;
use tracing::{debug, info};

use super::config::InvulnerabilityTuning;
use super::entity::{ActorId, EntityBody};
use super::events::{TimerEvent, TimerEventKind};

/// Damage dealt by an attacker with `strength` to a defender with `defense`.
/// Every landed hit deals at least 1.
pub fn damage(strength: u32, defense: u32) -> u32 {
    let raw = i64::from(strength) + 1 - i64::from(defense);
    u32::try_from(raw.max(1)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvulnerabilitySignal {
    Flicker,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub attacker: ActorId,
    pub defender: ActorId,
    pub damage: u32,
    pub remaining_health: u32,
    pub fatal: bool,
}

/// Lands `attacker`'s claw on `defender` if it is out and overlaps the
/// defender's body.
///
/// A landed hit retracts the claw so one swing damages at most once, and opens
/// the defender's invulnerability window.
pub fn resolve_hit(
    attacker: &mut EntityBody,
    defender: &mut EntityBody,
    timer: &mut Timer<TimerEvent>,
    tuning: &InvulnerabilityTuning,
) -> Option<HitOutcome> {
    if attacker.is_dead || defender.is_dead || defender.is_invulnerable() {
        return None;
    }
    if !attacker.is_attacking() || !attacker.claw_hitbox.overlaps(&defender.hitbox) {
        return None;
    }
    let dealt = receive_damage(
        defender,
        damage(attacker.stats.strength, defender.stats.defense),
        timer,
        tuning,
    );
    attacker.deactivate_claw();
    let outcome = HitOutcome {
        attacker: attacker.id,
        defender: defender.id,
        damage: dealt,
        remaining_health: defender.stats.health,
        fatal: defender.is_dead,
    };
    debug!(
        attacker = %outcome.attacker,
        defender = %outcome.defender,
        damage = outcome.damage,
        remaining = outcome.remaining_health,
        "hit_landed"
    );
    Some(outcome)
}

/// Subtracts `amount` from health, clamped at zero. Dead or invulnerable bodies
/// take nothing. Any damage taken opens an invulnerability window, fatal hits
/// included. Returns the damage actually taken.
pub fn receive_damage(
    body: &mut EntityBody,
    amount: u32,
    timer: &mut Timer<TimerEvent>,
    tuning: &InvulnerabilityTuning,
) -> u32 {
    if body.is_dead || body.is_invulnerable() {
        return 0;
    }
    let taken = amount.min(body.stats.health);
    body.stats.health -= taken;
    if taken > 0 {
        begin_invulnerability(body, timer, tuning);
    }
    if body.stats.health == 0 {
        body.is_dead = true;
        info!(actor = %body.id, "actor_died");
    }
    taken
}

/// Opens a fresh invulnerability window, replacing any window in progress.
pub fn begin_invulnerability(
    body: &mut EntityBody,
    timer: &mut Timer<TimerEvent>,
    tuning: &InvulnerabilityTuning,
) {
    if let Some(task) = body.invulnerability.task.take() {
        timer.cancel(task);
    }
    let generation = body.invulnerability.generation.wrapping_add(1);
    let event = |signal| TimerEvent {
        actor: body.id,
        kind: TimerEventKind::Invulnerability { signal, generation },
    };
    let task = timer.add_task(
        Some(event(InvulnerabilitySignal::Flicker)),
        tuning.flicker_interval,
        tuning.duration,
        Some(event(InvulnerabilitySignal::End)),
    );
    body.invulnerability.generation = generation;
    body.invulnerability.active = true;
    body.invulnerability.task = Some(task);
    body.alpha = tuning.dim_alpha;
}

/// Applies a flicker tick or the end of the window. Signals from an older
/// window (or after cancellation) are ignored and return `false`.
pub fn apply_invulnerability_signal(
    body: &mut EntityBody,
    signal: InvulnerabilitySignal,
    generation: u64,
    tuning: &InvulnerabilityTuning,
) -> bool {
    if !body.invulnerability.active || body.invulnerability.generation != generation {
        return false;
    }
    match signal {
        InvulnerabilitySignal::Flicker => {
            body.alpha = if body.alpha < 1.0 { 1.0 } else { tuning.dim_alpha };
        }
        InvulnerabilitySignal::End => {
            body.invulnerability.active = false;
            body.invulnerability.task = None;
            body.alpha = 1.0;
        }
    }
    true
}

/// Ends any window immediately, e.g. when the actor is reset or dies.
pub fn cancel_invulnerability(body: &mut EntityBody, timer: &mut Timer<TimerEvent>) {
    if let Some(task) = body.invulnerability.task.take() {
        timer.cancel(task);
    }
    body.invulnerability.generation = body.invulnerability.generation.wrapping_add(1);
    body.invulnerability.active = false;
    body.alpha = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_is_strength_plus_one_minus_defense() {
        assert_eq!(damage(1, 0), 2);
        assert_eq!(damage(3, 1), 3);
    }

    #[test]
    fn damage_never_drops_below_one() {
        assert_eq!(damage(1, 5), 1);
        assert_eq!(damage(0, u32::MAX), 1);
        assert_eq!(damage(2, 3), 1);
        assert_eq!(damage(u32::MAX, 0), u32::MAX);
    }
}
