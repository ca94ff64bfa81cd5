use pounce_engine::{Animation, Hitbox, Vec2};
use serde::Deserialize;

use super::direction::{Direction, DirectionTable};
use super::entity::{EntityBody, SheetKind};

/// Size of the attack box and its per-direction nudge away from the default
/// placement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClawProfile {
    /// Extent along the facing axis.
    pub reach: f32,
    /// Extent across the facing axis when striking up or down.
    pub claw_width: f32,
    /// Extent across the facing axis when striking left or right.
    pub claw_height: f32,
    pub offsets: DirectionTable<Vec2>,
}

impl Default for ClawProfile {
    fn default() -> Self {
        Self {
            reach: 20.0,
            claw_width: 20.0,
            claw_height: 20.0,
            offsets: DirectionTable::new(
                Vec2::new(-9.0, 15.0),
                Vec2::new(-9.0, -20.0),
                Vec2::new(6.0, -2.0),
                Vec2::new(-25.0, -2.0),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    /// The box ends where the sprite starts.
    Before,
    /// The box starts where the sprite ends.
    After,
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    horizontal: bool,
    side: Side,
}

const PLACEMENTS: DirectionTable<Placement> = DirectionTable::new(
    Placement {
        horizontal: false,
        side: Side::Before,
    },
    Placement {
        horizontal: false,
        side: Side::After,
    },
    Placement {
        horizontal: true,
        side: Side::Before,
    },
    Placement {
        horizontal: true,
        side: Side::After,
    },
);

/// Attack box for a sprite drawn at `origin` with `sprite_size`, facing
/// `direction`.
///
/// The box sits flush against the facing edge of the sprite, centered on the
/// other axis, then moves by the profile's offset for that direction.
pub fn claw_hitbox(
    profile: &ClawProfile,
    origin: Vec2,
    sprite_size: Vec2,
    direction: Direction,
) -> Hitbox {
    let placement = PLACEMENTS[direction];
    let offset = profile.offsets[direction];
    let flush = |start: f32, extent: f32| match placement.side {
        Side::Before => start - profile.reach,
        Side::After => start + extent,
    };

    let (x, y, width, height) = if placement.horizontal {
        (
            flush(origin.x, sprite_size.x),
            origin.y + (sprite_size.y - profile.claw_height) / 2.0,
            profile.reach,
            profile.claw_height,
        )
    } else {
        (
            origin.x + (sprite_size.x - profile.claw_width) / 2.0,
            flush(origin.y, sprite_size.y),
            profile.claw_width,
            profile.reach,
        )
    };
    Hitbox::new(x + offset.x, y + offset.y, width, height)
}

/// How far a swing has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingPhase {
    Swinging,
    Finished,
}

/// One claw swing: a play-once animation per direction, with the claw box
/// raised at the halfway frame and cleared on exit.
///
/// Player and enemy attack states both drive one of these.
#[derive(Debug, Clone)]
pub struct ClawSwing {
    animations: DirectionTable<Animation>,
    hitbox_activated: bool,
}

impl ClawSwing {
    pub fn new(animations: DirectionTable<Animation>) -> Self {
        Self {
            animations,
            hitbox_activated: false,
        }
    }

    pub fn animation(&self, direction: Direction) -> &Animation {
        &self.animations[direction]
    }

    pub fn animation_mut(&mut self, direction: Direction) -> &mut Animation {
        &mut self.animations[direction]
    }

    pub fn enter(&mut self, body: &mut EntityBody) {
        body.sheet = SheetKind::Running;
        self.hitbox_activated = false;
        self.animations[body.facing].refresh();
    }

    pub fn update(&mut self, body: &mut EntityBody, profile: &ClawProfile) -> SwingPhase {
        let animation = &mut self.animations[body.facing];
        if animation.is_done() {
            animation.refresh();
            return SwingPhase::Finished;
        }
        if animation.is_halfway_done() && !self.hitbox_activated {
            body.activate_claw(claw_hitbox(
                profile,
                body.render_origin(),
                body.sprite_size(),
                body.facing,
            ));
            self.hitbox_activated = true;
        }
        SwingPhase::Swinging
    }

    pub fn exit(&mut self, body: &mut EntityBody) {
        body.deactivate_claw();
        body.sheet = SheetKind::Walking;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Vec2 = Vec2::new(100.0, 200.0);
    const SPRITE: Vec2 = Vec2::new(54.0, 54.0);

    fn unshifted() -> ClawProfile {
        ClawProfile {
            offsets: DirectionTable::from_fn(|_| Vec2::ZERO),
            ..ClawProfile::default()
        }
    }

    #[test]
    fn area_is_reach_times_cross_extent() {
        let profile = ClawProfile {
            reach: 24.0,
            claw_width: 10.0,
            claw_height: 14.0,
            ..ClawProfile::default()
        };
        for direction in Direction::ALL {
            let claw = claw_hitbox(&profile, ORIGIN, SPRITE, direction);
            let cross = if direction.is_horizontal() { 14.0 } else { 10.0 };
            assert_eq!(claw.area(), 24.0 * cross, "{direction:?}");
            assert!(claw.is_active());
        }
    }

    #[test]
    fn offset_moves_box_by_exactly_the_table_entry() {
        let profile = ClawProfile::default();
        let base = unshifted();
        for direction in Direction::ALL {
            let shifted = claw_hitbox(&profile, ORIGIN, SPRITE, direction);
            let plain = claw_hitbox(&base, ORIGIN, SPRITE, direction);
            assert_eq!(
                shifted.position - plain.position,
                profile.offsets[direction],
                "{direction:?}"
            );
            assert_eq!(shifted.dimensions, plain.dimensions);
        }
    }

    #[test]
    fn unshifted_box_is_flush_with_facing_edge() {
        let base = unshifted();
        let left = claw_hitbox(&base, ORIGIN, SPRITE, Direction::Left);
        assert_eq!(left.right(), ORIGIN.x);
        assert_eq!(left.center().y, ORIGIN.y + SPRITE.y / 2.0);

        let right = claw_hitbox(&base, ORIGIN, SPRITE, Direction::Right);
        assert_eq!(right.position.x, ORIGIN.x + SPRITE.x);

        let up = claw_hitbox(&base, ORIGIN, SPRITE, Direction::Up);
        assert_eq!(up.bottom(), ORIGIN.y);
        assert_eq!(up.center().x, ORIGIN.x + SPRITE.x / 2.0);

        let down = claw_hitbox(&base, ORIGIN, SPRITE, Direction::Down);
        assert_eq!(down.position.y, ORIGIN.y + SPRITE.y);
    }

    #[test]
    fn default_left_claw_matches_hand_computed_box() {
        let claw = claw_hitbox(
            &ClawProfile::default(),
            Vec2::new(0.0, 0.0),
            Vec2::new(40.0, 40.0),
            Direction::Left,
        );
        assert_eq!(claw, Hitbox::new(-14.0, 8.0, 20.0, 20.0));
    }
}
