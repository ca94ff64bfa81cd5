use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use pounce_engine::{Animation, AnimationError, SpriteKey, Vec2};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use super::buffs::{PowerUpKind, StatBuff};
use super::claw::ClawProfile;
use super::direction::{Direction, DirectionTable};
use super::entity::BodyShape;

pub const CONFIG_PATH_ENV_VAR: &str = "CLAWS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config json at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
}

/// One sprite-sheet animation: frame indices, seconds per frame and an
/// optional pass count (`None` loops).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationSpec {
    pub frames: Vec<usize>,
    pub interval: f32,
    #[serde(default)]
    pub cycles: Option<u32>,
}

impl AnimationSpec {
    pub fn looping(frames: impl Into<Vec<usize>>, interval: f32) -> Self {
        Self {
            frames: frames.into(),
            interval,
            cycles: None,
        }
    }

    pub fn once(frames: impl Into<Vec<usize>>, interval: f32) -> Self {
        Self {
            frames: frames.into(),
            interval,
            cycles: Some(1),
        }
    }

    pub fn build(&self) -> Result<Animation, AnimationError> {
        Animation::new(self.frames.clone(), self.interval, self.cycles)
    }
}

pub type DirectionalAnimations = DirectionTable<AnimationSpec>;

pub fn build_animations(
    specs: &DirectionalAnimations,
) -> Result<DirectionTable<Animation>, AnimationError> {
    specs.try_map(|_, spec| spec.build())
}

/// `len` consecutive looping frames per direction, starting at the given
/// sheet indices (up, down, left, right).
fn strip(starts: [usize; 4], len: usize, interval: f32) -> DirectionalAnimations {
    let [up, down, left, right] = starts;
    let make = |start: usize| {
        let frames: Vec<usize> = (start..start + len).collect();
        AnimationSpec::looping(frames, interval)
    };
    DirectionTable::new(make(up), make(down), make(left), make(right))
}

/// Closed range of seconds, sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DurationRange {
    pub min: f32,
    pub max: f32,
}

impl DurationRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Sprite-sheet names, checked with [`SpriteKey::parse`] during validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetNames {
    pub walking: String,
    pub running: String,
}

impl SheetNames {
    pub fn cat(color: &str) -> Self {
        Self {
            walking: format!("cat/{color}/walk"),
            running: format!("cat/{color}/run"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerAnimations {
    pub idle: DirectionalAnimations,
    pub walk: DirectionalAnimations,
    pub run: DirectionalAnimations,
    pub attack: DirectionalAnimations,
}

impl Default for PlayerAnimations {
    fn default() -> Self {
        let idle = DirectionTable::new(
            AnimationSpec::looping([0], 1.0),
            AnimationSpec::looping([8], 1.0),
            AnimationSpec::looping([12], 1.0),
            AnimationSpec::looping([4], 1.0),
        );
        let attack = DirectionTable::new(
            AnimationSpec::once([4, 5, 6, 7, 0, 1], 0.05),
            AnimationSpec::once([20, 21, 22, 23, 16, 17], 0.05),
            AnimationSpec::once([28, 29, 30, 31, 24, 25], 0.05),
            AnimationSpec::once([12, 13, 14, 15, 8, 7], 0.05),
        );
        Self {
            idle,
            walk: strip([0, 8, 12, 4], 4, 0.1),
            run: strip([0, 16, 24, 8], 8, 0.05),
            attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerTuning {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub health: u32,
    pub strength: u32,
    pub defense: u32,
    /// Horizontal inset of the outer tile samples when validating a move.
    pub edge_inset: f32,
    pub shape: BodyShape,
    pub sheets: SheetNames,
    pub animations: PlayerAnimations,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 100.0,
            run_speed: 200.0,
            health: 6,
            strength: 1,
            defense: 0,
            edge_inset: 6.0,
            shape: BodyShape {
                frame_size: Vec2::new(32.0, 32.0),
                render_scale: 1.7,
                render_offset: Vec2::new(0.0, -24.0),
                hitbox_offset: Vec2::new(8.5, 20.0),
                hitbox_size: Vec2::new(20.0, 12.0),
            },
            sheets: SheetNames::cat("orange"),
            animations: PlayerAnimations::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyAnimations {
    pub idle: DirectionalAnimations,
    pub walk: DirectionalAnimations,
    pub chase: DirectionalAnimations,
    pub attack: DirectionalAnimations,
}

impl Default for EnemyAnimations {
    fn default() -> Self {
        Self {
            idle: strip([0, 8, 12, 4], 1, 1.0),
            walk: strip([0, 8, 12, 4], 4, 0.15),
            chase: strip([0, 8, 12, 4], 4, 0.08),
            attack: PlayerAnimations::default().attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnemyTuning {
    pub wander_speed: f32,
    pub chase_speed: f32,
    pub perception_radius: f32,
    pub attack_range: f32,
    /// Seconds a chaser spends in range before it strikes.
    pub attack_cooldown: f32,
    pub direction_update_interval: f32,
    pub idle_duration: DurationRange,
    pub walk_duration: DurationRange,
    /// Chance that an elapsed walk ends in Idling instead of a new heading.
    pub idle_chance: f32,
    pub health: u32,
    pub strength: u32,
    pub defense: u32,
    pub edge_inset: f32,
    pub shape: BodyShape,
    pub animations: EnemyAnimations,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            wander_speed: 40.0,
            chase_speed: 80.0,
            perception_radius: 150.0,
            attack_range: 40.0,
            attack_cooldown: 0.8,
            direction_update_interval: 0.2,
            idle_duration: DurationRange::new(1.0, 3.0),
            walk_duration: DurationRange::new(2.0, 5.0),
            idle_chance: 0.3,
            health: 6,
            strength: 1,
            defense: 0,
            edge_inset: 2.0,
            shape: BodyShape {
                frame_size: Vec2::new(32.0, 32.0),
                render_scale: 1.7,
                render_offset: Vec2::new(0.0, -16.0),
                hitbox_offset: Vec2::new(6.0, 22.0),
                hitbox_size: Vec2::new(20.0, 20.0),
            },
            animations: EnemyAnimations::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvulnerabilityTuning {
    pub duration: f32,
    pub flicker_interval: f32,
    /// Alpha of the dim half of the flicker; the bright half is fully opaque.
    pub dim_alpha: f32,
}

impl Default for InvulnerabilityTuning {
    fn default() -> Self {
        Self {
            duration: 0.5,
            flicker_interval: 0.08,
            dim_alpha: 0.3,
        }
    }
}

/// A stat change together with how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuffPreset {
    pub buff: StatBuff,
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PowerUpTuning {
    pub attack: BuffPreset,
    pub defense: BuffPreset,
    pub speed: BuffPreset,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            attack: BuffPreset {
                buff: StatBuff::Strength { amount: 1 },
                duration: 10.0,
            },
            defense: BuffPreset {
                buff: StatBuff::Defense { amount: 1 },
                duration: 10.0,
            },
            speed: BuffPreset {
                buff: StatBuff::Speed { amount: 100.0 },
                duration: 15.0,
            },
        }
    }
}

impl PowerUpTuning {
    pub fn preset(&self, kind: PowerUpKind) -> BuffPreset {
        match kind {
            PowerUpKind::Attack => self.attack,
            PowerUpKind::Defense => self.defense,
            PowerUpKind::Speed => self.speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub tile_size: f32,
    pub debug_overlays: bool,
    pub rng_seed: Option<u64>,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub claw: ClawProfile,
    pub invulnerability: InvulnerabilityTuning,
    pub power_ups: PowerUpTuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_size: 32.0,
            debug_overlays: false,
            rng_seed: None,
            player: PlayerTuning::default(),
            enemy: EnemyTuning::default(),
            claw: ClawProfile::default(),
            invulnerability: InvulnerabilityTuning::default(),
            power_ups: PowerUpTuning::default(),
        }
    }
}

impl GameConfig {
    /// Reads the file named by `CLAWS_CONFIG`, or returns the defaults when the
    /// variable is unset.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_PATH_ENV_VAR) {
            Some(path) => Self::load_from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&raw)
    }

    pub fn parse_json(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let config: Self = serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                path,
                source: error.into_inner(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("tile_size", self.tile_size)?;

        let player = &self.player;
        positive("player.walk_speed", player.walk_speed)?;
        positive("player.run_speed", player.run_speed)?;
        at_least_one("player.health", player.health)?;
        non_negative("player.edge_inset", player.edge_inset)?;
        validate_shape("player.shape", &player.shape)?;
        validate_sheet("player.sheets.walking", &player.sheets.walking)?;
        validate_sheet("player.sheets.running", &player.sheets.running)?;
        validate_animations("player.animations.idle", &player.animations.idle)?;
        validate_animations("player.animations.walk", &player.animations.walk)?;
        validate_animations("player.animations.run", &player.animations.run)?;
        validate_attack("player.animations.attack", &player.animations.attack)?;

        let enemy = &self.enemy;
        positive("enemy.wander_speed", enemy.wander_speed)?;
        positive("enemy.chase_speed", enemy.chase_speed)?;
        positive("enemy.perception_radius", enemy.perception_radius)?;
        non_negative("enemy.attack_range", enemy.attack_range)?;
        non_negative("enemy.attack_cooldown", enemy.attack_cooldown)?;
        positive(
            "enemy.direction_update_interval",
            enemy.direction_update_interval,
        )?;
        validate_range("enemy.idle_duration", enemy.idle_duration)?;
        validate_range("enemy.walk_duration", enemy.walk_duration)?;
        if !(0.0..=1.0).contains(&enemy.idle_chance) {
            return Err(expected_actual(
                "enemy.idle_chance",
                "value in [0, 1]",
                enemy.idle_chance,
            ));
        }
        at_least_one("enemy.health", enemy.health)?;
        non_negative("enemy.edge_inset", enemy.edge_inset)?;
        validate_shape("enemy.shape", &enemy.shape)?;
        validate_animations("enemy.animations.idle", &enemy.animations.idle)?;
        validate_animations("enemy.animations.walk", &enemy.animations.walk)?;
        validate_animations("enemy.animations.chase", &enemy.animations.chase)?;
        validate_attack("enemy.animations.attack", &enemy.animations.attack)?;

        positive("claw.reach", self.claw.reach)?;
        positive("claw.claw_width", self.claw.claw_width)?;
        positive("claw.claw_height", self.claw.claw_height)?;

        positive("invulnerability.duration", self.invulnerability.duration)?;
        positive(
            "invulnerability.flicker_interval",
            self.invulnerability.flicker_interval,
        )?;
        if !(0.0..=1.0).contains(&self.invulnerability.dim_alpha) {
            return Err(expected_actual(
                "invulnerability.dim_alpha",
                "value in [0, 1]",
                self.invulnerability.dim_alpha,
            ));
        }

        positive("power_ups.attack.duration", self.power_ups.attack.duration)?;
        positive("power_ups.defense.duration", self.power_ups.defense.duration)?;
        positive("power_ups.speed.duration", self.power_ups.speed.duration)?;
        Ok(())
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_string(),
        message: message.into(),
    }
}

fn expected_actual(path: &str, expected: impl Display, actual: impl Display) -> ConfigError {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

fn positive(path: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(expected_actual(path, "positive finite number", value))
    }
}

fn non_negative(path: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(expected_actual(path, "non-negative finite number", value))
    }
}

fn at_least_one(path: &str, value: u32) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(expected_actual(path, "at least 1", value))
    }
}

fn validate_range(path: &str, range: DurationRange) -> Result<(), ConfigError> {
    non_negative(&format!("{path}.min"), range.min)?;
    non_negative(&format!("{path}.max"), range.max)?;
    if range.min > range.max {
        return Err(expected_actual(
            path,
            format!("min <= max ({})", range.max),
            range.min,
        ));
    }
    Ok(())
}

fn validate_sheet(path: &str, name: &str) -> Result<(), ConfigError> {
    SpriteKey::parse(name)
        .map(|_| ())
        .map_err(|error| validation_err(path, error.to_string()))
}

fn validate_shape(path: &str, shape: &BodyShape) -> Result<(), ConfigError> {
    positive(&format!("{path}.frame_size.x"), shape.frame_size.x)?;
    positive(&format!("{path}.frame_size.y"), shape.frame_size.y)?;
    positive(&format!("{path}.render_scale"), shape.render_scale)?;
    positive(&format!("{path}.hitbox_size.x"), shape.hitbox_size.x)?;
    positive(&format!("{path}.hitbox_size.y"), shape.hitbox_size.y)?;
    Ok(())
}

fn validate_animations(path: &str, specs: &DirectionalAnimations) -> Result<(), ConfigError> {
    for (direction, spec) in specs.iter() {
        spec.build()
            .map_err(|error| validation_err(&direction_path(path, direction), error.to_string()))?;
    }
    Ok(())
}

/// Attack animations must play a finite number of times or the swing never
/// finishes.
fn validate_attack(path: &str, specs: &DirectionalAnimations) -> Result<(), ConfigError> {
    validate_animations(path, specs)?;
    for (direction, spec) in specs.iter() {
        if spec.cycles.is_none() {
            return Err(validation_err(
                &format!("{}.cycles", direction_path(path, direction)),
                "attack animation must not loop",
            ));
        }
    }
    Ok(())
}

fn direction_path(path: &str, direction: Direction) -> String {
    format!("{path}.{}", direction.name())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_validate() {
        GameConfig::default().validate().expect("defaults are valid");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = GameConfig::parse_json("{}").expect("parse");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = GameConfig::parse_json(
            r#"{ "rng_seed": 7, "enemy": { "perception_radius": 90.0 } }"#,
        )
        .expect("parse");
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.enemy.perception_radius, 90.0);
        assert_eq!(config.enemy.chase_speed, 80.0);
        assert_eq!(config.player.run_speed, 200.0);
    }

    #[test]
    fn parse_error_names_field_path() {
        let err = GameConfig::parse_json(r#"{ "enemy": { "chase_speed": "fast" } }"#)
            .expect_err("bad type");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, "enemy.chase_speed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = GameConfig::parse_json(r#"{ "player": { "jump_height": 3 } }"#)
            .expect_err("unknown field");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_direction_in_animation_table_is_rejected() {
        let raw = r#"{ "player": { "animations": { "idle": {
            "up": { "frames": [0], "interval": 1.0 },
            "down": { "frames": [8], "interval": 1.0 },
            "left": { "frames": [12], "interval": 1.0 }
        } } } }"#;
        let err = GameConfig::parse_json(raw).expect_err("right missing");
        let message = err.to_string();
        assert!(message.contains("player.animations.idle"), "{message}");
    }

    #[test]
    fn non_positive_speed_is_invalid() {
        let err = GameConfig::parse_json(r#"{ "player": { "walk_speed": 0.0 } }"#)
            .expect_err("zero speed");
        match err {
            ConfigError::Invalid { path, .. } => assert_eq!(path, "player.walk_speed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn inverted_range_is_invalid() {
        let err = GameConfig::parse_json(
            r#"{ "enemy": { "walk_duration": { "min": 5.0, "max": 2.0 } } }"#,
        )
        .expect_err("inverted");
        match err {
            ConfigError::Invalid { path, .. } => assert_eq!(path, "enemy.walk_duration"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn looping_attack_animation_is_invalid() {
        let mut config = GameConfig::default();
        config.enemy.animations.attack[Direction::Left].cycles = None;
        let err = config.validate().expect_err("looping attack");
        match err {
            ConfigError::Invalid { path, .. } => {
                assert_eq!(path, "enemy.animations.attack.left.cycles")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "debug_overlays": true, "tile_size": 16.0 }}"#).expect("write");
        let config = GameConfig::load_from_path(file.path()).expect("load");
        assert!(config.debug_overlays);
        assert_eq!(config.tile_size, 16.0);
    }

    #[test]
    fn load_from_missing_path_reports_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.json");
        let err = GameConfig::load_from_path(&missing).expect_err("missing file");
        match err {
            ConfigError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duration_range_samples_inside_bounds() {
        use rand::SeedableRng;

        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let range = DurationRange::new(1.0, 3.0);
        for _ in 0..100 {
            let value = range.sample(&mut rng);
            assert!((1.0..=3.0).contains(&value));
        }
        assert_eq!(DurationRange::new(2.0, 2.0).sample(&mut rng), 2.0);
    }
}
