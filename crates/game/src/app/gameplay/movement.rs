use pounce_engine::{TileCollision, Vec2};

use super::direction::Direction;
use super::entity::EntityBody;

/// Whether `body` may stand with its canvas position at `canvas`.
///
/// The candidate body hitbox must lie inside the world, and the tiles under
/// its vertical midline must be passable at the left, center and right sample
/// points (`inset` pixels in from each side). A hitbox exactly one tile wide
/// only samples its center.
pub fn is_valid_position(
    body: &EntityBody,
    canvas: Vec2,
    map: &dyn TileCollision,
    inset: f32,
) -> bool {
    let hitbox = body.body_hitbox_at(canvas);
    let world = map.world_size_px();
    if hitbox.position.x < 0.0
        || hitbox.position.y < 0.0
        || hitbox.right() > world.x
        || hitbox.bottom() > world.y
    {
        return false;
    }

    let center = hitbox.center();
    let row = map.tile_coord(center.y);
    let center_column = map.tile_coord(center.x);
    if hitbox.width() == map.tile_size() {
        return map.is_passable(center_column, row);
    }

    let inset = inset.clamp(0.0, hitbox.width() / 2.0);
    let left_column = map.tile_coord(hitbox.position.x + inset);
    let right_column = map.tile_coord(hitbox.right() - inset);
    [left_column, center_column, right_column]
        .into_iter()
        .all(|column| map.is_passable(column, row))
}

/// Moves `body` by `distance` toward `direction` if the destination is valid.
/// A rejected step leaves the body untouched.
pub fn attempt_step(
    body: &mut EntityBody,
    direction: Direction,
    distance: f32,
    map: &dyn TileCollision,
    inset: f32,
) -> bool {
    let candidate = body.canvas_position + direction.step(distance);
    if !is_valid_position(body, candidate, map, inset) {
        return false;
    }
    body.set_canvas_position(candidate);
    true
}

#[cfg(test)]
mod tests {
    use pounce_engine::Tilemap;

    use super::*;
    use crate::app::gameplay::config::SheetNames;
    use crate::app::gameplay::entity::{ActorId, BodyShape, SheetPair, Stats};

    fn body_at(tile: Vec2, hitbox_width: f32) -> EntityBody {
        let shape = BodyShape {
            frame_size: Vec2::new(32.0, 32.0),
            render_scale: 1.0,
            render_offset: Vec2::ZERO,
            hitbox_offset: Vec2::new((32.0 - hitbox_width) / 2.0, 8.0),
            hitbox_size: Vec2::new(hitbox_width, 16.0),
        };
        let sheets = SheetPair::parse(&SheetNames::cat("orange")).expect("sheets");
        EntityBody::new(ActorId::Player, tile, 32.0, shape, Stats::new(6, 1, 0), sheets)
    }

    #[test]
    fn step_into_open_floor_moves_body() {
        let map = Tilemap::walled(6, 6, 32.0).expect("map");
        let mut body = body_at(Vec2::new(2.0, 2.0), 20.0);
        assert!(attempt_step(&mut body, Direction::Right, 10.0, &map, 2.0));
        assert_eq!(body.canvas_position, Vec2::new(74.0, 64.0));
    }

    #[test]
    fn blocked_step_leaves_position_unchanged() {
        let mut map = Tilemap::empty(6, 6, 32.0).expect("map");
        map.set_tile(3, 2, 1);
        let mut body = body_at(Vec2::new(2.0, 2.0), 20.0);
        let before = body.canvas_position;
        assert!(!attempt_step(&mut body, Direction::Right, 16.0, &map, 2.0));
        assert_eq!(body.canvas_position, before);
        assert_eq!(body.tile_position, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn leaving_the_world_is_rejected() {
        let map = Tilemap::empty(4, 4, 32.0).expect("map");
        let mut body = body_at(Vec2::new(0.0, 0.0), 20.0);
        assert!(!attempt_step(&mut body, Direction::Left, 7.0, &map, 2.0));
        assert!(!attempt_step(&mut body, Direction::Up, 9.0, &map, 2.0));
        assert!(attempt_step(&mut body, Direction::Left, 6.0, &map, 2.0));
    }

    #[test]
    fn inset_lets_edge_graze_a_wall() {
        let mut map = Tilemap::empty(6, 6, 32.0).expect("map");
        map.set_tile(3, 2, 1);
        let body = body_at(Vec2::new(2.0, 2.0), 20.0);
        // hitbox spans 70..90; moving 8px puts its right edge 2px into the wall.
        let candidate = body.canvas_position + Direction::Right.step(8.0);
        assert!(!is_valid_position(&body, candidate, &map, 0.0));
        assert!(is_valid_position(&body, candidate, &map, 4.0));
    }

    #[test]
    fn single_tile_wide_hitbox_samples_center_only() {
        let mut map = Tilemap::empty(6, 6, 32.0).expect("map");
        map.set_tile(3, 2, 1);
        let body = body_at(Vec2::new(2.0, 2.0), 32.0);
        let candidate = body.canvas_position + Direction::Right.step(4.0);
        assert!(is_valid_position(&body, candidate, &map, 0.0));
    }
}
