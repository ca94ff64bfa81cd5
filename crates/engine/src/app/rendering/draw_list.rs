use crate::app::geometry::{Circle, Hitbox, Vec2};
use crate::sprite_keys::SpriteKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayColor {
    Body,
    Claw,
    Perception,
    PerceptionAlert,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        sheet: SpriteKey,
        frame: usize,
        position: Vec2,
        scale: f32,
        alpha: f32,
    },
    HitboxOutline {
        hitbox: Hitbox,
        color: OverlayColor,
    },
    CircleOutline {
        circle: Circle,
        color: OverlayColor,
    },
}

/// Draw commands collected for one frame, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderList {
    commands: Vec<DrawCommand>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn sprite(
        &mut self,
        sheet: &SpriteKey,
        frame: usize,
        position: Vec2,
        scale: f32,
        alpha: f32,
    ) {
        self.push(DrawCommand::Sprite {
            sheet: sheet.clone(),
            frame,
            position,
            scale,
            alpha,
        });
    }

    pub fn hitbox(&mut self, hitbox: Hitbox, color: OverlayColor) {
        if hitbox.is_active() {
            self.push(DrawCommand::HitboxOutline { hitbox, color });
        }
    }

    pub fn circle(&mut self, circle: Circle, color: OverlayColor) {
        self.push(DrawCommand::CircleOutline { circle, color });
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_hitboxes_are_skipped() {
        let mut out = RenderList::new();
        out.hitbox(Hitbox::default(), OverlayColor::Claw);
        assert!(out.is_empty());
        out.hitbox(Hitbox::new(0.0, 0.0, 2.0, 2.0), OverlayColor::Claw);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn commands_keep_submission_order() {
        let sheet = SpriteKey::parse("cat/orange/walk").expect("key");
        let mut out = RenderList::new();
        out.sprite(&sheet, 3, Vec2::new(1.0, 2.0), 1.7, 1.0);
        out.circle(Circle::new(Vec2::ZERO, 4.0), OverlayColor::Perception);
        assert!(matches!(out.commands()[0], DrawCommand::Sprite { frame: 3, .. }));
        assert!(matches!(out.commands()[1], DrawCommand::CircleOutline { .. }));
        out.clear();
        assert!(out.is_empty());
    }
}
