//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod entity;
pub mod input;
pub mod rules;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::FrameClock;
pub use collision::{Hitbox, clamp_in, fully_outside, overlaps, reflect_in};
pub use entity::{Boundary, Entity, EntityId, EntitySpec, EntityStore};
pub use input::{Direction, InputAdapter, InputEvent, InputMode, Key, TickInput};
pub use rules::{Effect, Player, Rules, TickContext};
pub use session::{Meter, Session, SessionConfig, SessionStatus, TerminationReason};
pub use spawner::{DifficultyBasis, DifficultyCurve, Placement, SpawnRoll, Spawner, SpawnerConfig};
pub use state::{GameEvent, GameState, RngState};
pub use tick::tick;
