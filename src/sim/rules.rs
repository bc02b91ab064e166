//! The seam between the shared loop and a concrete game
//!
//! A game supplies its bounds, tuning and the effect of each entity kind;
//! `tick` does the rest.

use std::fmt;

use glam::Vec2;
use rand_pcg::Pcg32;

use super::collision::Hitbox;
use super::entity::{Boundary, Entity, EntitySpec, EntityStore};
use super::input::{InputMode, TickInput};
use super::session::{Session, SessionConfig};
use super::spawner::{SpawnRoll, SpawnerConfig};
use crate::Rect;

/// Score/meter consequences of an interaction, applied atomically with removal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Effect {
    /// Signed score change (negative values are explicit penalties)
    pub score: i64,
    /// Signed meter change
    pub meter: f32,
    /// Ends the session as a collision
    pub fatal: bool,
}

impl Effect {
    pub const NONE: Effect = Effect {
        score: 0,
        meter: 0.0,
        fatal: false,
    };

    pub fn score(points: i64) -> Self {
        Self {
            score: points,
            ..Self::NONE
        }
    }

    pub fn meter(delta: f32) -> Self {
        Self {
            meter: delta,
            ..Self::NONE
        }
    }

    pub fn fatal() -> Self {
        Self {
            fatal: true,
            ..Self::NONE
        }
    }

    pub fn and_meter(mut self, delta: f32) -> Self {
        self.meter += delta;
        self
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    pub fn apply(&self, session: &mut Session) {
        if self.score > 0 {
            session.add_score(self.score.unsigned_abs());
        } else if self.score < 0 {
            session.penalize(self.score.unsigned_abs());
        }
        if self.meter != 0.0 {
            session.shift_meter(self.meter);
        }
        if self.fatal {
            session.mark_fatal();
        }
    }
}

/// The player-controlled entity (or catch zone)
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// `None` for pointer-only games with no body
    pub hitbox: Option<Hitbox>,
}

impl Player {
    pub fn at(pos: Vec2, hitbox: Hitbox) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            hitbox: Some(hitbox),
        }
    }

    /// Player without a collision body
    pub fn pointer() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            hitbox: None,
        }
    }
}

/// Mutable view handed to `Rules::on_tick`
pub struct TickContext<'a, K> {
    pub session: &'a mut Session,
    pub entities: &'a mut EntityStore<K>,
    pub player: &'a mut Player,
    pub rng: &'a mut Pcg32,
    pub now: u64,
    pub dt: f32,
    pub level: u32,
}

/// Game-specific behaviour plugged into the shared loop
pub trait Rules {
    /// Entity catalog of the game (a sum type matched exhaustively)
    type Kind: Clone + fmt::Debug;

    fn name(&self) -> &'static str;

    /// Play surface in world units
    fn bounds(&self) -> Rect;

    fn input_mode(&self) -> InputMode;

    fn session_config(&self) -> SessionConfig;

    fn spawner_config(&self) -> SpawnerConfig<Self::Kind>;

    fn player_start(&self) -> Player;

    /// Clear game-specific state for a fresh session
    fn reset(&mut self) {}

    /// Apply this tick's intents to the player
    fn steer(&mut self, player: &mut Player, input: &TickInput, dt: f32);

    /// Move an entity (scripted paths override this)
    fn advance(&mut self, entity: &mut Entity<Self::Kind>, dt: f32) {
        entity.integrate(dt);
    }

    fn boundary(&self, kind: &Self::Kind) -> Boundary;

    /// Turn a spawn roll into a concrete entity
    fn build(&mut self, roll: SpawnRoll<Self::Kind>, rng: &mut Pcg32) -> EntitySpec<Self::Kind>;

    /// Player touched the entity
    fn on_collision(&mut self, kind: &Self::Kind, now: u64) -> Effect;

    /// Entity left the bounds
    fn on_exit(&mut self, _kind: &Self::Kind, _now: u64) -> Effect {
        Effect::NONE
    }

    /// Entity ttl ran out
    fn on_expire(&mut self, _kind: &Self::Kind, _now: u64) -> Effect {
        Effect::NONE
    }

    /// Entity was tapped/clicked; `None` leaves it in play
    fn on_tap(&mut self, _kind: &Self::Kind, _now: u64) -> Option<Effect> {
        None
    }

    /// Per-tick bookkeeping: scripted spawns, survival score, speed ramps
    fn on_tick(&mut self, _ctx: TickContext<'_, Self::Kind>) {}

    /// Final reward from the ended session
    fn reward(&self, session: &Session) -> u32;
}
