use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    #[error("animation needs at least one frame")]
    NoFrames,
    #[error("animation interval must be positive and finite, got {interval}")]
    InvalidInterval { interval: f32 },
    #[error("animation cycle count must be at least 1")]
    ZeroCycles,
}

/// Frame-index playhead over a sprite sheet.
///
/// `cycles` of `None` loops forever; `Some(n)` stops on the last frame after
/// `n` full passes and reports [`Animation::is_done`].
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    frames: Arc<[usize]>,
    interval: f32,
    cycles: Option<u32>,
    timer: f32,
    position: usize,
    completed_cycles: u32,
}

impl Animation {
    pub fn new(
        frames: impl Into<Vec<usize>>,
        interval: f32,
        cycles: Option<u32>,
    ) -> Result<Self, AnimationError> {
        let frames: Vec<usize> = frames.into();
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        if !interval.is_finite() || interval <= 0.0 {
            return Err(AnimationError::InvalidInterval { interval });
        }
        if cycles == Some(0) {
            return Err(AnimationError::ZeroCycles);
        }
        Ok(Self {
            frames: frames.into(),
            interval,
            cycles,
            timer: 0.0,
            position: 0,
            completed_cycles: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_done() || (self.frames.len() == 1 && self.cycles.is_none()) {
            return;
        }
        self.timer += dt;
        while self.timer >= self.interval {
            self.timer -= self.interval;
            self.position += 1;
            if self.position < self.frames.len() {
                continue;
            }
            self.completed_cycles = self.completed_cycles.saturating_add(1);
            if self.is_done() {
                self.position = self.frames.len() - 1;
                self.timer = 0.0;
                return;
            }
            self.position = 0;
        }
    }

    pub fn current_frame(&self) -> usize {
        self.frames[self.position]
    }

    pub fn is_done(&self) -> bool {
        self.cycles
            .is_some_and(|cycles| self.completed_cycles >= cycles)
    }

    /// True once the playhead has reached the middle frame of the current
    /// pass, or once the animation has finished.
    pub fn is_halfway_done(&self) -> bool {
        self.is_done() || self.position >= self.frames.len() / 2
    }

    pub fn refresh(&mut self) {
        self.timer = 0.0;
        self.position = 0;
        self.completed_cycles = 0;
    }
}
