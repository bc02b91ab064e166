//! Game state: one session plus the entities, player and spawner it owns
//!
//! Everything the loop mutates lives here so a tick is a single `&mut` pass.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityStore};
use super::rules::{Player, Rules};
use super::session::{Session, TerminationReason};
use super::spawner::Spawner;

/// Something that happened during a tick (for HUD flashes, sounds, tests)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: EntityId },
    /// Player collided with the entity
    Caught { id: EntityId },
    Tapped { id: EntityId },
    Exited { id: EntityId },
    Expired { id: EntityId },
    LevelUp { level: u32 },
    /// Memory match: a face-down card was turned over
    Revealed { card: usize },
    /// Memory match: a pending pair resolved
    Paired { first: usize, second: usize },
    Mismatched { first: usize, second: usize },
    Ended { reason: TerminationReason },
}

/// RNG state wrapper for reproducible runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    /// Sessions started so far; mixes into the per-session stream
    pub runs: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, runs: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed.wrapping_add(self.runs.wrapping_mul(0x9E37_79B9_7F4A_7C15)))
    }
}

/// Complete state of one mounted game
#[derive(Debug, Clone)]
pub struct GameState<R: Rules> {
    pub rules: R,
    pub session: Session,
    pub entities: EntityStore<R::Kind>,
    pub player: Player,
    pub spawner: Spawner<R::Kind>,
    pub rng_state: RngState,
    pub rng: Pcg32,
}

impl<R: Rules> GameState<R> {
    /// Create an Idle game with the given seed
    pub fn new(rules: R, seed: u64) -> Self {
        let session = Session::new(rules.session_config());
        let spawner = Spawner::new(rules.spawner_config());
        let player = rules.player_start();
        let rng_state = RngState::new(seed);
        Self {
            rng: rng_state.to_rng(),
            rules,
            session,
            entities: EntityStore::new(),
            player,
            spawner,
            rng_state,
        }
    }

    /// Start a session; restarts when already Active
    pub fn start(&mut self) {
        self.clear_run();
        self.rng_state.runs += 1;
        self.rng = self.rng_state.to_rng();
        self.session.start();
        log::info!("{} started (seed {})", self.rules.name(), self.rng_state.seed);
    }

    /// Back to Idle with every counter and entity cleared
    pub fn reset(&mut self) {
        self.clear_run();
        self.session.reset();
    }

    /// Force the session into a terminal state without a reward
    pub fn abort(&mut self) {
        self.session.abort();
    }

    fn clear_run(&mut self) {
        self.entities.clear();
        self.spawner.reset();
        self.rules.reset();
        self.player = self.rules.player_start();
    }

    /// Complete the session if a termination predicate holds
    pub fn check_termination(&mut self) -> Option<TerminationReason> {
        let reason = self.session.check_termination()?;
        let rules = &self.rules;
        self.session
            .complete(reason, |s| rules.reward(s))
            .map(|_| reason)
    }

    /// Positions of every live entity
    pub fn occupied(&self) -> Vec<Vec2> {
        self.entities.iter().map(|e| e.pos).collect()
    }
}
