//! Behaviour and melee combat for a tile-map cat brawler, driven headless on
//! top of `pounce_engine`.

pub mod app;

pub use app::gameplay;
