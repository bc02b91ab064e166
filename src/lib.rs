//! Office Arcade - a grid of small office-themed minigames
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session lifecycle, entities, spawning, collisions, input)
//! - `games`: Per-game rules plugged into the shared loop
//! - `renderer`: Draw lists and the Canvas 2D painter
//! - `platform`: Key-value storage and frame scheduling
//! - `host`: Mounting games into the host shell and reporting rewards

pub mod games;
pub mod highscores;
pub mod host;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use games::GameId;
pub use highscores::HighScores;
pub use host::{Cabinet, HostShell, Progression};
pub use settings::{ConfigError, DifficultyPreset, MountConfig, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the frame rate the games are tuned for)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation ticks per wall-clock second
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Percent-space play surface used by the pointer games
    pub const PERCENT_MIN: f32 = 0.0;
    pub const PERCENT_MAX: f32 = 100.0;

    /// Secondary meter bounds (stress, burnout, ...)
    pub const METER_MIN: f32 = 0.0;
    pub const METER_MAX: f32 = 100.0;
}

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// The 0..100 percent-space square
    pub const fn percent() -> Self {
        Self::new(
            Vec2::new(consts::PERCENT_MIN, consts::PERCENT_MIN),
            Vec2::new(consts::PERCENT_MAX, consts::PERCENT_MAX),
        )
    }

    /// Rectangle from origin with the given pixel size
    pub const fn sized(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// Rectangle of `size` centred on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Clamp a point into the rectangle
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Shrink by a margin on every side (never inverts)
    pub fn inset(&self, margin: f32) -> Self {
        let center = self.center();
        let min = (self.min + Vec2::splat(margin)).min(center);
        let max = (self.max - Vec2::splat(margin)).max(center);
        Self::new(min, max)
    }
}

/// Clamp a value into the secondary meter range
#[inline]
pub fn clamp_meter(value: f32) -> f32 {
    if value.is_nan() {
        return consts::METER_MIN;
    }
    value.clamp(consts::METER_MIN, consts::METER_MAX)
}

/// Convert a duration in seconds to whole simulation ticks
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs.max(0.0) * consts::TICKS_PER_SECOND as f32).round() as u64
}

/// Convert a per-frame speed from the 60 fps games into units per second
#[inline]
pub fn per_frame(units: f32) -> f32 {
    units * consts::TICKS_PER_SECOND as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_clamp_and_contains() {
        let r = Rect::percent();
        assert_eq!(r.clamp(Vec2::new(-5.0, 140.0)), Vec2::new(0.0, 100.0));
        assert!(r.contains(Vec2::new(100.0, 0.0)));
        assert!(!r.contains(Vec2::new(100.1, 50.0)));
    }

    #[test]
    fn test_inset_never_inverts() {
        let r = Rect::sized(10.0, 10.0).inset(20.0);
        assert!(r.min.x <= r.max.x && r.min.y <= r.max.y);
    }

    #[test]
    fn test_clamp_meter_handles_nan() {
        assert_eq!(clamp_meter(f32::NAN), 0.0);
        assert_eq!(clamp_meter(130.0), 100.0);
        assert_eq!(clamp_meter(-4.0), 0.0);
    }

    #[test]
    fn test_time_conversions() {
        assert_eq!(secs_to_ticks(0.8), 48);
        assert_eq!(secs_to_ticks(-1.0), 0);
        assert_eq!(per_frame(1.2), 72.0);
    }
}
