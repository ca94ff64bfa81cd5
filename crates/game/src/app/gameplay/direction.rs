use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use pounce_engine::{InputAction, InputSnapshot, Vec2};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Resolution order when several movement keys are held at once.
const INPUT_PRIORITY: [(InputAction, Direction); 4] = [
    (InputAction::MoveDown, Direction::Down),
    (InputAction::MoveRight, Direction::Right),
    (InputAction::MoveUp, Direction::Up),
    (InputAction::MoveLeft, Direction::Left),
];

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Highest-priority held movement direction, if any.
    pub fn from_input(input: &InputSnapshot) -> Option<Direction> {
        INPUT_PRIORITY
            .iter()
            .find(|(action, _)| input.is_down(*action))
            .map(|(_, direction)| *direction)
    }

    /// Dominant-axis rule: horizontal when `|dx| > |dy|`, vertical otherwise
    /// (ties go vertical).
    pub fn toward(delta: Vec2) -> Direction {
        if delta.x.abs() > delta.y.abs() {
            Self::horizontal_toward(delta.x)
        } else {
            Self::vertical_toward(delta.y)
        }
    }

    /// The axis `self` does not move along, signed toward `delta`.
    pub fn perpendicular_toward(self, delta: Vec2) -> Direction {
        if self.is_horizontal() {
            Self::vertical_toward(delta.y)
        } else {
            Self::horizontal_toward(delta.x)
        }
    }

    fn horizontal_toward(dx: f32) -> Direction {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    fn vertical_toward(dy: f32) -> Direction {
        if dy > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Unit vector in screen space (y grows downward).
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    pub fn step(self, distance: f32) -> Vec2 {
        self.unit() * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DirectionTableError {
    #[error("direction table is missing an entry for {direction:?}")]
    MissingDirection { direction: Direction },
}

/// Exactly one value per [`Direction`].
///
/// Deserializes from a map keyed by direction name and refuses maps with a
/// direction missing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "HashMap<Direction, T>")]
pub struct DirectionTable<T> {
    entries: [T; 4],
}

impl<T> DirectionTable<T> {
    pub const fn new(up: T, down: T, left: T, right: T) -> Self {
        Self {
            entries: [up, down, left, right],
        }
    }

    pub fn from_fn(mut f: impl FnMut(Direction) -> T) -> Self {
        Self::new(
            f(Direction::Up),
            f(Direction::Down),
            f(Direction::Left),
            f(Direction::Right),
        )
    }

    pub fn try_from_map(mut map: HashMap<Direction, T>) -> Result<Self, DirectionTableError> {
        let mut take = |direction| {
            map.remove(&direction)
                .ok_or(DirectionTableError::MissingDirection { direction })
        };
        Ok(Self::new(
            take(Direction::Up)?,
            take(Direction::Down)?,
            take(Direction::Left)?,
            take(Direction::Right)?,
        ))
    }

    pub fn get(&self, direction: Direction) -> &T {
        &self.entries[direction.index()]
    }

    pub fn get_mut(&mut self, direction: Direction) -> &mut T {
        &mut self.entries[direction.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL.into_iter().map(move |direction| (direction, self.get(direction)))
    }

    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(Direction, &T) -> Result<U, E>,
    ) -> Result<DirectionTable<U>, E> {
        Ok(DirectionTable::new(
            f(Direction::Up, self.get(Direction::Up))?,
            f(Direction::Down, self.get(Direction::Down))?,
            f(Direction::Left, self.get(Direction::Left))?,
            f(Direction::Right, self.get(Direction::Right))?,
        ))
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.entries.iter_mut().for_each(&mut f);
    }
}

impl<T> TryFrom<HashMap<Direction, T>> for DirectionTable<T> {
    type Error = DirectionTableError;

    fn try_from(map: HashMap<Direction, T>) -> Result<Self, Self::Error> {
        Self::try_from_map(map)
    }
}

impl<T> Index<Direction> for DirectionTable<T> {
    type Output = T;

    fn index(&self, direction: Direction) -> &T {
        self.get(direction)
    }
}

impl<T> IndexMut<Direction> for DirectionTable<T> {
    fn index_mut(&mut self, direction: Direction) -> &mut T {
        self.get_mut(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_priority_is_down_right_up_left() {
        let all = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveDown, true);
        assert_eq!(Direction::from_input(&all), Some(Direction::Down));

        let up_left_right = all.with_action_down(InputAction::MoveDown, false);
        assert_eq!(Direction::from_input(&up_left_right), Some(Direction::Right));

        let up_left = up_left_right.with_action_down(InputAction::MoveRight, false);
        assert_eq!(Direction::from_input(&up_left), Some(Direction::Up));

        let left = up_left.with_action_down(InputAction::MoveUp, false);
        assert_eq!(Direction::from_input(&left), Some(Direction::Left));

        assert_eq!(Direction::from_input(&InputSnapshot::empty()), None);
    }

    #[test]
    fn toward_uses_dominant_axis() {
        assert_eq!(Direction::toward(Vec2::new(10.0, 3.0)), Direction::Right);
        assert_eq!(Direction::toward(Vec2::new(-10.0, 3.0)), Direction::Left);
        assert_eq!(Direction::toward(Vec2::new(2.0, 9.0)), Direction::Down);
        assert_eq!(Direction::toward(Vec2::new(2.0, -9.0)), Direction::Up);
        assert_eq!(Direction::toward(Vec2::new(5.0, 5.0)), Direction::Down);
    }

    #[test]
    fn perpendicular_points_at_target_on_other_axis() {
        let delta = Vec2::new(30.0, -4.0);
        assert_eq!(Direction::Right.perpendicular_toward(delta), Direction::Up);
        assert_eq!(Direction::Down.perpendicular_toward(delta), Direction::Right);
    }

    #[test]
    fn step_scales_unit_vector() {
        assert_eq!(Direction::Up.step(5.0), Vec2::new(0.0, -5.0));
        assert_eq!(Direction::Right.step(2.5), Vec2::new(2.5, 0.0));
    }

    #[test]
    fn try_from_map_requires_every_direction() {
        let mut map = HashMap::new();
        map.insert(Direction::Up, 1);
        map.insert(Direction::Down, 2);
        map.insert(Direction::Right, 4);
        let err = DirectionTable::try_from_map(map.clone()).expect_err("left missing");
        assert_eq!(
            err,
            DirectionTableError::MissingDirection {
                direction: Direction::Left
            }
        );

        map.insert(Direction::Left, 3);
        let table = DirectionTable::try_from_map(map).expect("complete");
        assert_eq!(table[Direction::Left], 3);
        assert_eq!(table[Direction::Right], 4);
    }

    #[test]
    fn deserializes_from_named_keys() {
        let table: DirectionTable<u8> =
            serde_json::from_str(r#"{"up":0,"down":8,"left":12,"right":4}"#).expect("table");
        assert_eq!(table[Direction::Down], 8);

        let missing = serde_json::from_str::<DirectionTable<u8>>(r#"{"up":0,"down":8}"#);
        assert!(missing.is_err());
    }
}
