use std::fmt;

use pounce_engine::{
    AnimationError, Hitbox, SpriteKey, SpriteKeyError, StateMachineError, TimerId, Vec2,
};
use serde::Deserialize;
use thiserror::Error;

use super::buffs::BuffLedger;
use super::config::SheetNames;
use super::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorId {
    Player,
    Enemy(u32),
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorId::Player => f.write_str("player"),
            ActorId::Enemy(id) => write!(f, "enemy#{id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ActorBuildError {
    #[error("invalid animation: {0}")]
    Animation(#[from] AnimationError),
    #[error("invalid sprite sheet: {0}")]
    Sprite(#[from] SpriteKeyError),
    #[error("invalid state machine: {0}")]
    StateMachine(#[from] StateMachineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total_health: u32,
    pub health: u32,
    pub strength: u32,
    pub defense: u32,
}

impl Stats {
    pub fn new(total_health: u32, strength: u32, defense: u32) -> Self {
        Self {
            total_health,
            health: total_health,
            strength,
            defense,
        }
    }
}

/// Sprite and body-hitbox layout relative to the canvas position.
///
/// The sprite is drawn at `floor(canvas + render_offset)` and spans
/// `frame_size * render_scale`; the body hitbox sits `hitbox_offset` from that
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BodyShape {
    pub frame_size: Vec2,
    pub render_scale: f32,
    pub render_offset: Vec2,
    pub hitbox_offset: Vec2,
    pub hitbox_size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Walking,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetPair {
    pub walking: SpriteKey,
    pub running: SpriteKey,
}

impl SheetPair {
    pub fn parse(names: &SheetNames) -> Result<Self, SpriteKeyError> {
        Ok(Self {
            walking: SpriteKey::parse(&names.walking)?,
            running: SpriteKey::parse(&names.running)?,
        })
    }

    pub fn get(&self, kind: SheetKind) -> &SpriteKey {
        match kind {
            SheetKind::Walking => &self.walking,
            SheetKind::Running => &self.running,
        }
    }
}

/// Damage-immunity window. `generation` moves on every start and cancel, so
/// flicker or end events scheduled for an older window are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invulnerability {
    pub active: bool,
    pub generation: u64,
    pub task: Option<TimerId>,
}

/// Shared data record for every actor. Behaviour lives in the actor's state
/// machine; this is what those states read and write.
#[derive(Debug, Clone)]
pub struct EntityBody {
    pub id: ActorId,
    pub tile_position: Vec2,
    pub canvas_position: Vec2,
    pub facing: Direction,
    pub speed: f32,
    pub speed_bonus: f32,
    pub stats: Stats,
    pub shape: BodyShape,
    pub hitbox: Hitbox,
    pub claw_hitbox: Hitbox,
    pub is_dead: bool,
    pub alpha: f32,
    pub sheets: SheetPair,
    pub sheet: SheetKind,
    pub current_frame: usize,
    pub invulnerability: Invulnerability,
    pub buffs: BuffLedger,
    tile_size: f32,
}

impl EntityBody {
    pub fn new(
        id: ActorId,
        tile_position: Vec2,
        tile_size: f32,
        shape: BodyShape,
        stats: Stats,
        sheets: SheetPair,
    ) -> Self {
        let mut body = Self {
            id,
            tile_position,
            canvas_position: (tile_position * tile_size).floor(),
            facing: Direction::Down,
            speed: 0.0,
            speed_bonus: 0.0,
            stats,
            shape,
            hitbox: Hitbox::default(),
            claw_hitbox: Hitbox::default(),
            is_dead: false,
            alpha: 1.0,
            sheets,
            sheet: SheetKind::Walking,
            current_frame: 0,
            invulnerability: Invulnerability::default(),
            buffs: BuffLedger::default(),
            tile_size,
        };
        body.sync_body_hitbox();
        body
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerability.active
    }

    pub fn effective_speed(&self) -> f32 {
        (self.speed + self.speed_bonus).max(0.0)
    }

    pub fn set_canvas_position(&mut self, position: Vec2) {
        self.canvas_position = position;
        self.tile_position = Vec2::new(
            (position.x / self.tile_size).floor(),
            (position.y / self.tile_size).floor(),
        );
    }

    /// Top-left of the drawn sprite.
    pub fn render_origin(&self) -> Vec2 {
        (self.canvas_position + self.shape.render_offset).floor()
    }

    pub fn sprite_size(&self) -> Vec2 {
        self.shape.frame_size * self.shape.render_scale
    }

    pub fn sprite_center(&self) -> Vec2 {
        self.render_origin() + self.sprite_size() * 0.5
    }

    /// Body hitbox the entity would have at `canvas`.
    pub fn body_hitbox_at(&self, canvas: Vec2) -> Hitbox {
        let origin = (canvas + self.shape.render_offset).floor() + self.shape.hitbox_offset;
        Hitbox::new(
            origin.x,
            origin.y,
            self.shape.hitbox_size.x,
            self.shape.hitbox_size.y,
        )
    }

    pub fn sync_body_hitbox(&mut self) {
        self.hitbox = self.body_hitbox_at(self.canvas_position);
    }

    pub fn is_attacking(&self) -> bool {
        self.claw_hitbox.is_active()
    }

    pub fn activate_claw(&mut self, claw: Hitbox) {
        self.claw_hitbox = claw;
    }

    pub fn deactivate_claw(&mut self) {
        self.claw_hitbox.clear();
    }

    /// The claw while it is out, the body otherwise.
    pub fn collision_hitbox(&self) -> &Hitbox {
        if self.is_attacking() {
            &self.claw_hitbox
        } else {
            &self.hitbox
        }
    }

    pub fn collides_with(&self, other: &Hitbox) -> bool {
        self.collision_hitbox().overlaps(other)
    }

    pub fn sheet_key(&self) -> &SpriteKey {
        self.sheets.get(self.sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_body(tile: Vec2) -> EntityBody {
        let shape = BodyShape {
            frame_size: Vec2::new(32.0, 32.0),
            render_scale: 1.0,
            render_offset: Vec2::ZERO,
            hitbox_offset: Vec2::new(6.0, 6.0),
            hitbox_size: Vec2::new(20.0, 20.0),
        };
        let sheets = SheetPair::parse(&SheetNames::cat("black")).expect("sheets");
        EntityBody::new(ActorId::Enemy(0), tile, 32.0, shape, Stats::new(6, 1, 0), sheets)
    }

    #[test]
    fn new_body_places_canvas_and_hitbox_from_tile() {
        let body = test_body(Vec2::new(2.0, 3.0));
        assert_eq!(body.canvas_position, Vec2::new(64.0, 96.0));
        assert_eq!(body.hitbox, Hitbox::new(70.0, 102.0, 20.0, 20.0));
        assert!(!body.is_attacking());
    }

    #[test]
    fn set_canvas_position_updates_tile_position() {
        let mut body = test_body(Vec2::new(1.0, 1.0));
        body.set_canvas_position(Vec2::new(95.5, 40.0));
        assert_eq!(body.tile_position, Vec2::new(2.0, 1.0));
        assert_eq!(
            body.hitbox.position,
            Vec2::new(38.0, 38.0),
            "hitbox waits for sync"
        );
        body.sync_body_hitbox();
        assert_eq!(body.hitbox.position, Vec2::new(101.0, 46.0));
    }

    #[test]
    fn collision_hitbox_prefers_active_claw() {
        let mut body = test_body(Vec2::new(1.0, 1.0));
        let claw = Hitbox::new(100.0, 100.0, 20.0, 20.0);
        let near_claw = Hitbox::new(110.0, 110.0, 4.0, 4.0);
        assert!(!body.collides_with(&near_claw));

        body.activate_claw(claw);
        assert!(body.is_attacking());
        assert!(body.collides_with(&near_claw));
        assert!(!body.collides_with(&body.hitbox));

        body.deactivate_claw();
        assert_eq!(body.claw_hitbox.area(), 0.0);
        assert!(body.collides_with(&body.hitbox));
    }

    #[test]
    fn sprite_center_uses_scaled_size() {
        let mut body = test_body(Vec2::ZERO);
        body.shape.render_scale = 2.0;
        assert_eq!(body.sprite_size(), Vec2::new(64.0, 64.0));
        assert_eq!(body.sprite_center(), Vec2::new(32.0, 32.0));
    }
}
