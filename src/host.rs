//! Host integration: a mounted game inside the arcade shell
//!
//! The `Cabinet` owns the frame clock and frame tickets, reports each
//! completed session's reward to the shell exactly once and keeps the
//! per-game leaderboard up to date.

use crate::games::{ArcadeGame, GameId};
use crate::highscores::HighScores;
use crate::platform::{FrameGuard, FrameTicket, KeyValueStore};
use crate::renderer::DrawList;
use crate::settings::{ConfigError, MountConfig, Settings};
use crate::sim::{FrameClock, GameEvent, InputEvent, Session};

/// Callbacks into the surrounding application
pub trait HostShell {
    /// A session finished with a reward (once per session)
    fn on_complete(&mut self, game: GameId, reward: u32);

    /// The player left the game
    fn on_exit(&mut self, game: GameId);
}

/// Cumulative reward counter kept by the shell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progression {
    total: u64,
    sessions: u32,
    exits: u32,
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Completed sessions reported so far
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn exits(&self) -> u32 {
        self.exits
    }
}

impl HostShell for Progression {
    fn on_complete(&mut self, game: GameId, reward: u32) {
        self.total = self.total.saturating_add(u64::from(reward));
        self.sessions += 1;
        log::info!("{} complete: +{} (total {})", game.name(), reward, self.total);
    }

    fn on_exit(&mut self, game: GameId) {
        self.exits += 1;
        log::info!("Left {}", game.name());
    }
}

/// A game mounted in the shell with its clock, frame tickets and scores
pub struct Cabinet<S: KeyValueStore> {
    game: Box<dyn ArcadeGame>,
    clock: FrameClock,
    frames: FrameGuard,
    scores: HighScores,
    settings: Settings,
    store: S,
}

impl<S: KeyValueStore> Cabinet<S> {
    /// Mount `id`; settings and the leaderboard are read from `store`
    pub fn mount(
        id: GameId,
        config: &MountConfig,
        store: S,
        fallback_seed: u64,
    ) -> Result<Self, ConfigError> {
        let settings = Settings::load(&store);
        let game = id.mount(config, fallback_seed, &settings)?;
        let scores = HighScores::load(&store, id.slug());
        if let Some(best) = scores.top_score() {
            log::info!("{} best so far: {}", id.name(), best);
        }
        Ok(Self {
            game,
            clock: FrameClock::new(),
            frames: FrameGuard::new(),
            scores,
            settings,
            store,
        })
    }

    pub fn id(&self) -> GameId {
        self.game.id()
    }

    pub fn session(&self) -> &Session {
        self.game.session()
    }

    pub fn best(&self) -> Option<u64> {
        self.scores.top_score()
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn is_paused(&self) -> bool {
        self.game.is_paused()
    }

    /// Start or restart the session
    ///
    /// Returns the outstanding frame handle, which the caller should cancel.
    pub fn start(&mut self) -> Option<i32> {
        let stale = self.frames.invalidate();
        self.clock.reset();
        self.game.start();
        stale
    }

    /// Whether another animation frame should be requested
    ///
    /// Paused sessions are still Active and keep the loop alive.
    pub fn wants_frame(&self) -> bool {
        self.game.session().is_active()
    }

    /// Ticket to pass along with the next frame request
    pub fn ticket(&self) -> FrameTicket {
        self.frames.ticket()
    }

    /// Record the handle of the frame request just made
    pub fn arm(&mut self, handle: i32) {
        self.frames.arm(handle);
    }

    /// Run the ticks due at `time_ms` and report a finished session
    ///
    /// `wall_ms` timestamps leaderboard entries. Returns `None` when the
    /// ticket is stale, in which case nothing ticks.
    pub fn frame<H: HostShell>(
        &mut self,
        ticket: FrameTicket,
        time_ms: f64,
        wall_ms: f64,
        host: &mut H,
    ) -> Option<Vec<GameEvent>> {
        if !self.frames.accepts(ticket) {
            return None;
        }
        let mut events = Vec::new();
        for _ in 0..self.clock.frame(time_ms) {
            if !self.game.session().is_active() {
                break;
            }
            events.extend(self.game.step());
        }
        self.report(wall_ms, host);
        Some(events)
    }

    fn report<H: HostShell>(&mut self, wall_ms: f64, host: &mut H) {
        let Some(reward) = self.game.take_reward() else {
            return;
        };
        let id = self.game.id();
        host.on_complete(id, reward);

        let score = self.game.session().score();
        if let Some(rank) = self.scores.add_score(score, reward, wall_ms) {
            log::info!("New #{} score for {}: {}", rank, id.name(), score);
            self.scores.save(&mut self.store, id.slug());
        }
    }

    pub fn input(&mut self, event: InputEvent) {
        self.game.input(event);
    }

    pub fn set_surface(&mut self, width: f32, height: f32) {
        self.game.set_surface(width, height);
    }

    /// Pause or resume; held keys are dropped either way
    pub fn set_paused(&mut self, paused: bool) {
        if !self.game.session().is_active() {
            return;
        }
        self.game.release_input();
        self.game.set_paused(paused);
        if !paused {
            self.clock.reset();
        }
    }

    /// Leave the game: abort the session, drop outstanding frames, tell the shell
    ///
    /// Returns the outstanding frame handle, which the caller should cancel.
    pub fn exit<H: HostShell>(&mut self, host: &mut H) -> Option<i32> {
        self.game.abort();
        let stale = self.frames.invalidate();
        host.on_exit(self.game.id());
        stale
    }

    pub fn draw(&self) -> DrawList {
        let mut list = self.game.draw();
        if let Some(best) = self.best() {
            list.hud("best", "Best", best);
        }
        if self.settings.show_fps {
            list.hud("fps", "FPS", self.fps());
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use crate::sim::{SessionStatus, TerminationReason};

    #[derive(Default)]
    struct Recorder {
        completed: Vec<(GameId, u32)>,
        exits: Vec<GameId>,
    }

    impl HostShell for Recorder {
        fn on_complete(&mut self, game: GameId, reward: u32) {
            self.completed.push((game, reward));
        }

        fn on_exit(&mut self, game: GameId) {
            self.exits.push(game);
        }
    }

    fn cabinet(id: GameId, config: MountConfig) -> Cabinet<MemoryStore> {
        Cabinet::mount(id, &config, MemoryStore::new(), 0).unwrap()
    }

    /// Feed `frames` animation frames 100 ms apart (six ticks each)
    fn pump(cab: &mut Cabinet<MemoryStore>, host: &mut Recorder, start_ms: f64, frames: u32) {
        for i in 0..frames {
            let ticket = cab.ticket();
            cab.frame(ticket, start_ms + f64::from(i) * 100.0, 1_700_000_000_000.0, host);
        }
    }

    #[test]
    fn test_reward_reported_exactly_once() {
        let config = MountConfig {
            seed: Some(1),
            duration_secs: Some(2),
            ..Default::default()
        };
        let mut cab = cabinet(GameId::MemoryMatch, config);
        let mut host = Recorder::default();
        cab.start();
        pump(&mut cab, &mut host, 0.0, 60);

        assert_eq!(cab.session().termination(), Some(TerminationReason::Time));
        assert_eq!(host.completed, vec![(GameId::MemoryMatch, 4)]);
        // Zero score never makes the leaderboard
        assert!(cab.high_scores().is_empty());
    }

    #[test]
    fn test_crash_records_high_score() {
        let mut cab = cabinet(GameId::LaneRacer, MountConfig::with_seed(1));
        let mut host = Recorder::default();
        cab.start();
        pump(&mut cab, &mut host, 0.0, 2000);

        assert_eq!(cab.session().status(), SessionStatus::Ended);
        assert!(!cab.wants_frame());
        assert_eq!(host.completed.len(), 1);
        let score = cab.session().score();
        assert_eq!(cab.best(), Some(score));
        let saved = HighScores::load(cab.store(), GameId::LaneRacer.slug());
        assert_eq!(saved.top_score(), Some(score));
    }

    #[test]
    fn test_exit_aborts_and_drops_frames() {
        let mut cab = cabinet(GameId::Runner, MountConfig::with_seed(2));
        let mut host = Recorder::default();
        cab.start();
        pump(&mut cab, &mut host, 0.0, 3);
        let ticks = cab.session().elapsed_ticks();

        let ticket = cab.ticket();
        cab.arm(41);
        assert_eq!(cab.exit(&mut host), Some(41));
        assert_eq!(host.exits, vec![GameId::Runner]);
        assert_eq!(cab.session().termination(), Some(TerminationReason::Exit));

        assert!(cab.frame(ticket, 1000.0, 0.0, &mut host).is_none());
        assert_eq!(cab.session().elapsed_ticks(), ticks);
        assert!(host.completed.is_empty());
    }

    #[test]
    fn test_restart_invalidates_old_frames() {
        let mut cab = cabinet(GameId::Runner, MountConfig::with_seed(2));
        let mut host = Recorder::default();
        cab.start();
        let old = cab.ticket();
        cab.start();
        assert!(cab.frame(old, 0.0, 0.0, &mut host).is_none());
        assert_eq!(cab.session().elapsed_ticks(), 0);
        assert!(cab.frame(cab.ticket(), 0.0, 0.0, &mut host).is_some());
        assert_eq!(cab.session().elapsed_ticks(), 1);
    }

    #[test]
    fn test_paused_game_does_not_tick() {
        let mut cab = cabinet(GameId::ChaiCatcher, MountConfig::with_seed(5));
        let mut host = Recorder::default();
        cab.start();
        cab.set_paused(true);
        pump(&mut cab, &mut host, 0.0, 20);
        assert_eq!(cab.session().elapsed_ticks(), 0);
        assert!(cab.wants_frame());

        cab.set_paused(false);
        pump(&mut cab, &mut host, 5000.0, 1);
        assert_eq!(cab.session().elapsed_ticks(), 1);
    }

    #[test]
    fn test_mount_reads_best_and_settings() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        scores.add_score(420, 420, 0.0);
        scores.save(&mut store, GameId::Runner.slug());
        let settings = Settings {
            show_fps: true,
            ..Default::default()
        };
        settings.save(&mut store);

        let cab = Cabinet::mount(GameId::Runner, &MountConfig::default(), store, 9).unwrap();
        assert_eq!(cab.best(), Some(420));
        let list = cab.draw();
        assert_eq!(list.hud_value("best"), Some("420"));
        assert!(list.hud_value("fps").is_some());
    }

    #[test]
    fn test_progression_accumulates() {
        let mut progress = Progression::new();
        progress.on_complete(GameId::Slapper, 120);
        progress.on_complete(GameId::Runner, 30);
        progress.on_exit(GameId::Runner);
        assert_eq!(progress.total(), 150);
        assert_eq!(progress.sessions(), 2);
        assert_eq!(progress.exits(), 1);
    }
}
