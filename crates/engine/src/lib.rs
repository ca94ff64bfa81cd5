//! Frame-driven building blocks for tile-map action games: shapes and overlap
//! tests, a game-clock timer, animation playheads, input snapshots, a
//! collision tile layer and a generic per-entity state machine.

pub mod app;
mod sprite_keys;

pub use app::{
    Animation, AnimationError, Circle, DrawCommand, Hitbox, InputAction, InputSnapshot,
    InputTracker, OverlayColor, RenderList, State, StateKey, StateMachine, StateMachineError,
    StateOverlay, Tile, TileCollision, Tilemap, TilemapError, Timer, TimerId, Vec2,
};
pub use sprite_keys::{SpriteKey, SpriteKeyError};
