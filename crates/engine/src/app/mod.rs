mod animation;
mod geometry;
mod input;
mod rendering;
mod state_machine;
mod tilemap;
mod timer;

pub use animation::{Animation, AnimationError};
pub use geometry::{Circle, Hitbox, Vec2};
pub use input::{InputAction, InputSnapshot, InputTracker};
pub use rendering::{DrawCommand, OverlayColor, RenderList};
pub use state_machine::{State, StateKey, StateMachine, StateMachineError, StateOverlay};
pub use tilemap::{Tile, TileCollision, Tilemap, TilemapError};
pub use timer::{Timer, TimerId};
