//! The arcade's games
//!
//! Entity games (catcher, racer, runner, slapper) are `Rules` implementations
//! driven by the shared loop through `Arcade`. Memory match has no moving
//! entities and implements `ArcadeGame` directly.

pub mod arcade;
pub mod catcher;
pub mod memory;
pub mod racer;
pub mod runner;
pub mod slapper;

pub use arcade::Arcade;
pub use catcher::ChaiCatcher;
pub use memory::MemoryMatch;
pub use racer::LaneRacer;
pub use runner::Runner;
pub use slapper::Slapper;

use serde::{Deserialize, Serialize};

use crate::renderer::DrawList;
use crate::settings::{ConfigError, MountConfig, Settings};
use crate::sim::{GameEvent, InputEvent, Session};

/// Object-safe surface of a mounted game
pub trait ArcadeGame {
    fn id(&self) -> GameId;

    /// Begin a session (restarts an active one)
    fn start(&mut self);

    /// Back to Idle
    fn reset(&mut self);

    /// End the session without a reward
    fn abort(&mut self);

    fn session(&self) -> &Session;

    /// On-screen size of the play surface in pixels
    fn set_surface(&mut self, width: f32, height: f32);

    fn input(&mut self, event: InputEvent);

    /// Forget held keys (focus lost)
    fn release_input(&mut self);

    /// Run exactly one fixed tick
    fn step(&mut self) -> Vec<GameEvent>;

    fn draw(&self) -> DrawList;

    /// Reward of the last completed session, handed out once
    fn take_reward(&mut self) -> Option<u32>;

    fn is_paused(&self) -> bool;

    fn set_paused(&mut self, paused: bool);
}

/// Mountable games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameId {
    ChaiCatcher,
    LaneRacer,
    Runner,
    Slapper,
    MemoryMatch,
}

impl GameId {
    pub const ALL: [GameId; 5] = [
        GameId::ChaiCatcher,
        GameId::LaneRacer,
        GameId::Runner,
        GameId::Slapper,
        GameId::MemoryMatch,
    ];

    /// Stable identifier used for storage keys and DOM ids
    pub fn slug(&self) -> &'static str {
        match self {
            GameId::ChaiCatcher => "chai-catcher",
            GameId::LaneRacer => "lane-racer",
            GameId::Runner => "runner",
            GameId::Slapper => "slapper",
            GameId::MemoryMatch => "memory-match",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GameId::ChaiCatcher => "Chai Catcher",
            GameId::LaneRacer => "Lane Racer",
            GameId::Runner => "Runner",
            GameId::Slapper => "Slap the Notification",
            GameId::MemoryMatch => "Memory Match",
        }
    }

    pub fn from_slug(slug: &str) -> Option<GameId> {
        GameId::ALL.into_iter().find(|g| g.slug() == slug)
    }

    /// Build an Idle instance of the game
    ///
    /// `fallback_seed` is used when the config carries no seed; the stored
    /// difficulty applies unless the config overrides it.
    pub fn mount(
        &self,
        config: &MountConfig,
        fallback_seed: u64,
        settings: &Settings,
    ) -> Result<Box<dyn ArcadeGame>, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or(fallback_seed);
        let preset = config.difficulty_or(settings);
        log::info!("Mounting {} ({}, seed {})", self.name(), preset.as_str(), seed);

        let game: Box<dyn ArcadeGame> = match self {
            GameId::ChaiCatcher => Box::new(Arcade::new(*self, ChaiCatcher::new(preset), seed)),
            GameId::LaneRacer => Box::new(Arcade::new(*self, LaneRacer::new(preset), seed)),
            GameId::Runner => Box::new(Arcade::new(*self, Runner::new(preset), seed)),
            GameId::Slapper => Box::new(Arcade::new(*self, Slapper::new(preset), seed)),
            GameId::MemoryMatch => Box::new(MemoryMatch::new(
                config.pairs.unwrap_or(memory::DEFAULT_PAIRS),
                config.duration_secs.unwrap_or(memory::DEFAULT_DURATION_SECS),
                seed,
            )),
        };
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DifficultyPreset;
    use crate::sim::SessionStatus;

    #[test]
    fn test_slug_roundtrip() {
        for id in GameId::ALL {
            assert_eq!(GameId::from_slug(id.slug()), Some(id));
        }
        assert_eq!(GameId::from_slug("solitaire"), None);
    }

    #[test]
    fn test_mount_is_idle() {
        for id in GameId::ALL {
            let game = id
                .mount(&MountConfig::with_seed(3), 0, &Settings::default())
                .unwrap();
            assert_eq!(game.id(), id);
            assert_eq!(game.session().status(), SessionStatus::Idle);
        }
    }

    #[test]
    fn test_mount_rejects_bad_config() {
        let config = MountConfig {
            pairs: Some(40),
            ..Default::default()
        };
        assert!(GameId::MemoryMatch.mount(&config, 0, &Settings::default()).is_err());
    }

    #[test]
    fn test_every_game_survives_idle_ticks() {
        let hard = Settings {
            difficulty: DifficultyPreset::Hard,
            ..Default::default()
        };
        for id in GameId::ALL {
            let mut game = id
                .mount(&MountConfig::with_seed(11), 0, &hard)
                .unwrap();
            game.start();
            for _ in 0..600 {
                game.step();
            }
            let _ = game.draw();
            if game.session().status() == SessionStatus::Ended {
                assert!(game.take_reward().is_some());
            }
        }
    }
}
