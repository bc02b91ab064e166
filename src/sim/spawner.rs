//! Rate-limited entity spawning with a difficulty curve
//!
//! The spawner only decides *whether*, *what* and *where*. The game rules turn
//! a roll into a concrete entity (speed, hitbox, ttl).

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// What the difficulty level is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyBasis {
    /// Cumulative score
    Score,
    /// Whole seconds since the session started
    ElapsedSecs,
}

/// Step function from score/time to a difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyCurve {
    pub basis: DifficultyBasis,
    /// Basis units per level (0 disables levelling)
    pub step: u64,
    pub max_level: u32,
}

impl DifficultyCurve {
    /// No levelling
    pub const FLAT: DifficultyCurve = DifficultyCurve {
        basis: DifficultyBasis::Score,
        step: 0,
        max_level: 0,
    };

    pub fn level(&self, score: u64, elapsed_secs: u32) -> u32 {
        if self.step == 0 {
            return 0;
        }
        let value = match self.basis {
            DifficultyBasis::Score => score,
            DifficultyBasis::ElapsedSecs => u64::from(elapsed_secs),
        };
        (value / self.step).min(u64::from(self.max_level)) as u32
    }
}

/// Where new entities may appear
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub region: Rect,
    /// Minimum distance to live entities (0 allows overlap)
    pub min_gap: f32,
    /// Resample attempts before accepting an overlapping position
    pub retries: u8,
}

impl Placement {
    pub fn anywhere(region: Rect) -> Self {
        Self {
            region,
            min_gap: 0.0,
            retries: 0,
        }
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> Vec2 {
        let r = &self.region;
        Vec2::new(
            rng.random_range(r.min.x..=r.max.x),
            rng.random_range(r.min.y..=r.max.y),
        )
    }

    /// Pick a position, resampling while it crowds an existing entity
    pub fn choose<R: Rng>(&self, occupied: &[Vec2], rng: &mut R) -> Vec2 {
        let mut pos = self.sample(rng);
        if self.min_gap <= 0.0 {
            return pos;
        }
        let gap_sq = self.min_gap * self.min_gap;
        for _ in 0..self.retries {
            if occupied.iter().all(|o| o.distance_squared(pos) >= gap_sq) {
                return pos;
            }
            pos = self.sample(rng);
        }
        pos
    }
}

/// Spawner tuning for one game
#[derive(Debug, Clone)]
pub struct SpawnerConfig<K> {
    /// Base ticks between spawns at level 0
    pub interval_ticks: u64,
    /// Extra random ticks added to each gap (0..=jitter)
    pub jitter_ticks: u64,
    /// Floor for the interval as levels shrink it
    pub min_interval_ticks: u64,
    /// Ticks removed from the interval per level
    pub shrink_per_level: u64,
    /// Live population cap
    pub max_population: usize,
    /// Weighted kind catalog
    pub table: Vec<(K, u32)>,
    pub placement: Placement,
    pub curve: DifficultyCurve,
}

/// Result of a successful spawn roll
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRoll<K> {
    pub kind: K,
    pub pos: Vec2,
    pub level: u32,
}

/// Spawn scheduler state
#[derive(Debug, Clone)]
pub struct Spawner<K> {
    config: SpawnerConfig<K>,
    weights: Option<WeightedIndex<u32>>,
    last_spawn: Option<u64>,
    next_gap: u64,
    level: u32,
}

impl<K: Clone> Spawner<K> {
    pub fn new(config: SpawnerConfig<K>) -> Self {
        let weights = match WeightedIndex::new(config.table.iter().map(|(_, w)| *w)) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Spawn table unusable ({e}), spawner disabled");
                None
            }
        };
        let next_gap = config.interval_ticks;
        Self {
            config,
            weights,
            last_spawn: None,
            next_gap,
            level: 0,
        }
    }

    pub fn config(&self) -> &SpawnerConfig<K> {
        &self.config
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Forget spawn history and level
    pub fn reset(&mut self) {
        self.last_spawn = None;
        self.next_gap = self.config.interval_ticks;
        self.level = 0;
    }

    /// Recompute the level; returns the new level when it changed
    pub fn update_level(&mut self, score: u64, elapsed_secs: u32) -> Option<u32> {
        let level = self.config.curve.level(score, elapsed_secs);
        if level != self.level {
            log::debug!("Difficulty level {} -> {}", self.level, level);
            self.level = level;
            return Some(level);
        }
        None
    }

    /// Interval at the current level, before jitter
    pub fn interval(&self) -> u64 {
        let shrink = self.config.shrink_per_level.saturating_mul(u64::from(self.level));
        self.config
            .interval_ticks
            .saturating_sub(shrink)
            .max(self.config.min_interval_ticks)
    }

    /// Produce at most one spawn roll for this tick
    pub fn try_spawn<R: Rng>(
        &mut self,
        now: u64,
        occupied: &[Vec2],
        rng: &mut R,
    ) -> Option<SpawnRoll<K>> {
        if let Some(last) = self.last_spawn {
            if now.saturating_sub(last) < self.next_gap {
                return None;
            }
        }
        if occupied.len() >= self.config.max_population {
            return None;
        }
        let weights = self.weights.as_ref()?;
        let kind = self.config.table[weights.sample(rng)].0.clone();
        let pos = self.config.placement.choose(occupied, rng);

        self.last_spawn = Some(now);
        let jitter = if self.config.jitter_ticks > 0 {
            rng.random_range(0..=self.config.jitter_ticks)
        } else {
            0
        };
        self.next_gap = self.interval() + jitter;

        Some(SpawnRoll {
            kind,
            pos,
            level: self.level,
        })
    }
}
