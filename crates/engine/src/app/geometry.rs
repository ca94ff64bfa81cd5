use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn floor(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
///
/// A zero width or height marks the box as inactive; attack boxes sit in that
/// state whenever no swing is live.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Hitbox {
    pub position: Vec2,
    pub dimensions: Vec2,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut hitbox = Self::default();
        hitbox.set(x, y, width, height);
        hitbox
    }

    pub fn set(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.position = Vec2::new(x, y);
        self.dimensions = Vec2::new(width.max(0.0), height.max(0.0));
    }

    pub fn clear(&mut self) {
        self.set(0.0, 0.0, 0.0, 0.0);
    }

    pub fn is_active(&self) -> bool {
        self.dimensions.x > 0.0 && self.dimensions.y > 0.0
    }

    pub fn width(&self) -> f32 {
        self.dimensions.x
    }

    pub fn height(&self) -> f32 {
        self.dimensions.y
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.dimensions.x
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.dimensions.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.position.x + self.dimensions.x / 2.0,
            self.position.y + self.dimensions.y / 2.0,
        )
    }

    pub fn area(&self) -> f32 {
        self.dimensions.x * self.dimensions.y
    }

    /// Separating-axis test. Shared edges count as contact.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.position.x <= other.right()
            && other.position.x <= self.right()
            && self.position.y <= other.bottom()
            && other.position.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    pub fn overlaps_hitbox(&self, hitbox: &Hitbox) -> bool {
        let closest_x = self.center.x.clamp(hitbox.position.x, hitbox.right());
        let closest_y = self.center.y.clamp(hitbox.position.y, hitbox.bottom());
        let dx = self.center.x - closest_x;
        let dy = self.center.y - closest_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_symmetric_across_sample_pairs() {
        let boxes = [
            Hitbox::new(0.0, 0.0, 10.0, 10.0),
            Hitbox::new(5.0, 5.0, 10.0, 10.0),
            Hitbox::new(10.0, 0.0, 4.0, 4.0),
            Hitbox::new(20.0, 20.0, 1.0, 1.0),
            Hitbox::new(-3.0, 2.0, 2.5, 30.0),
            Hitbox::new(3.0, 3.0, 1.0, 1.0),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.overlaps(b), b.overlaps(a), "a={a:?} b={b:?}");
            }
        }
    }

    #[test]
    fn shared_edge_counts_as_overlap() {
        let left = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let right = Hitbox::new(10.0, 0.0, 10.0, 10.0);
        let below = Hitbox::new(0.0, 10.0, 10.0, 10.0);
        assert!(left.overlaps(&right));
        assert!(left.overlaps(&below));
    }

    #[test]
    fn separated_boxes_do_not_overlap() {
        let a = Hitbox::new(0.0, 0.0, 10.0, 10.0);
        let b = Hitbox::new(10.5, 0.0, 10.0, 10.0);
        let c = Hitbox::new(0.0, 10.01, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn contained_box_overlaps() {
        let outer = Hitbox::new(0.0, 0.0, 100.0, 100.0);
        let inner = Hitbox::new(40.0, 40.0, 5.0, 5.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn cleared_hitbox_is_inactive() {
        let mut hitbox = Hitbox::new(4.0, 4.0, 8.0, 8.0);
        assert!(hitbox.is_active());
        hitbox.clear();
        assert!(!hitbox.is_active());
        assert_eq!(hitbox.area(), 0.0);

        hitbox.set(1.0, 1.0, 8.0, 0.0);
        assert!(!hitbox.is_active());
    }

    #[test]
    fn negative_dimensions_clamp_to_zero() {
        let hitbox = Hitbox::new(0.0, 0.0, -5.0, 3.0);
        assert_eq!(hitbox.width(), 0.0);
        assert!(!hitbox.is_active());
    }

    #[test]
    fn circle_hits_rect_via_closest_point() {
        let rect = Hitbox::new(10.0, 10.0, 10.0, 10.0);
        assert!(Circle::new(Vec2::new(15.0, 15.0), 1.0).overlaps_hitbox(&rect));
        assert!(Circle::new(Vec2::new(5.0, 15.0), 5.0).overlaps_hitbox(&rect));
        assert!(!Circle::new(Vec2::new(5.0, 15.0), 4.9).overlaps_hitbox(&rect));
        // Corner case uses the diagonal distance.
        assert!(!Circle::new(Vec2::new(7.0, 7.0), 4.0).overlaps_hitbox(&rect));
        assert!(Circle::new(Vec2::new(7.0, 7.0), 4.5).overlaps_hitbox(&rect));
    }

    #[test]
    fn vec2_distance_and_floor() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(Vec2::new(1.7, -0.2).floor(), Vec2::new(1.0, -1.0));
        assert_eq!(a + b * 2.0, Vec2::new(6.0, 8.0));
    }
}
