//! Session lifecycle: Idle -> Active -> Ended, score, secondary meter and countdown
//!
//! A session is one play-through. It owns every counter that decides how a run
//! ends; entities and spawning live next to it in `GameState`.

use serde::{Deserialize, Serialize};

use crate::clamp_meter;
use crate::consts::METER_MAX;

/// Lifecycle status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Not started (or reset)
    #[default]
    Idle,
    /// Loop is running
    Active,
    /// Terminal outcome reached
    Ended,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    /// Countdown reached zero
    Time,
    /// Secondary meter reached its failure bound
    Meter,
    /// Score reached the win threshold (or the board was cleared)
    Win,
    /// Fatal collision with an obstacle
    Collision,
    /// Player left for the catalog
    Exit,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Time => "time",
            TerminationReason::Meter => "meter",
            TerminationReason::Win => "win",
            TerminationReason::Collision => "collision",
            TerminationReason::Exit => "exit",
        }
    }
}

/// Secondary meter (stress, burnout, ...), always within [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Meter(f32);

impl Meter {
    pub fn new(value: f32) -> Self {
        Self(clamp_meter(value))
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.0
    }

    /// Apply a signed change, clamping the result
    pub fn shift(&mut self, delta: f32) {
        self.0 = clamp_meter(self.0 + delta);
    }

    pub fn set(&mut self, value: f32) {
        self.0 = clamp_meter(value);
    }
}

/// Per-game session parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown length; `None` for untimed games
    pub duration_secs: Option<u32>,
    /// Meter value at start
    pub meter_start: f32,
    /// Meter value that ends the session; `None` if the meter never fails
    pub meter_fail: Option<f32>,
    /// Score that wins the session
    pub win_score: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: None,
            meter_start: 0.0,
            meter_fail: Some(METER_MAX),
            win_score: None,
        }
    }
}

/// One play-through of a game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    config: SessionConfig,
    status: SessionStatus,
    score: u64,
    meter: Meter,
    /// Simulation ticks since start
    elapsed_ticks: u64,
    /// Whole seconds elapsed since start
    elapsed_secs: u32,
    /// Seconds left on the countdown (timed games only)
    time_remaining: Option<u32>,
    /// Set when a fatal collision happened this tick
    fatal: bool,
    /// Forced win (e.g. board cleared), independent of the score threshold
    cleared: bool,
    termination: Option<TerminationReason>,
    reward: Option<u32>,
    /// Reward waiting to be reported to the host
    #[serde(skip)]
    unreported: Option<u32>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let meter = Meter::new(config.meter_start);
        let time_remaining = config.duration_secs;
        Self {
            config,
            status: SessionStatus::Idle,
            score: 0,
            meter,
            elapsed_ticks: 0,
            elapsed_secs: 0,
            time_remaining,
            fatal: false,
            cleared: false,
            termination: None,
            reward: None,
            unreported: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration; takes effect on the next reset/start
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn meter(&self) -> f32 {
        self.meter.value()
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn time_remaining(&self) -> Option<u32> {
        self.time_remaining
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Reward computed at completion (stays readable after reporting)
    pub fn reward(&self) -> Option<u32> {
        self.reward
    }

    /// Clear every counter back to the initial values and go Idle
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    /// Start (or hard-restart) the session
    pub fn start(&mut self) {
        if self.status == SessionStatus::Active {
            log::info!("Restarting active session (score {})", self.score);
        }
        self.reset();
        self.status = SessionStatus::Active;
    }

    /// Add points; ignored unless Active
    pub fn add_score(&mut self, points: u64) {
        if self.is_active() {
            self.score = self.score.saturating_add(points);
        }
    }

    /// Explicit penalty subtraction; ignored unless Active
    pub fn penalize(&mut self, points: u64) {
        if self.is_active() {
            self.score = self.score.saturating_sub(points);
        }
    }

    /// Signed meter change, clamped to [0, 100]; ignored unless Active
    pub fn shift_meter(&mut self, delta: f32) {
        if self.is_active() {
            self.meter.shift(delta);
        }
    }

    /// Record a fatal collision; the session ends at the next termination check
    pub fn mark_fatal(&mut self) {
        if self.is_active() {
            self.fatal = true;
        }
    }

    /// Record that the win condition was met outside the score threshold
    pub fn mark_cleared(&mut self) {
        if self.is_active() {
            self.cleared = true;
        }
    }

    /// Advance the tick counter; returns true when a whole second elapsed
    pub fn advance_tick(&mut self, ticks_per_second: u64) -> bool {
        if !self.is_active() {
            return false;
        }
        self.elapsed_ticks += 1;
        if ticks_per_second > 0 && self.elapsed_ticks.is_multiple_of(ticks_per_second) {
            self.second_elapsed();
            return true;
        }
        false
    }

    /// One countdown second passed
    pub fn second_elapsed(&mut self) {
        if !self.is_active() {
            return;
        }
        self.elapsed_secs += 1;
        if let Some(left) = self.time_remaining.as_mut() {
            *left = left.saturating_sub(1);
        }
    }

    /// Evaluate termination predicates in fixed priority order
    pub fn check_termination(&self) -> Option<TerminationReason> {
        if !self.is_active() {
            return None;
        }
        if self.time_remaining == Some(0) {
            return Some(TerminationReason::Time);
        }
        if let Some(bound) = self.config.meter_fail {
            if self.meter.value() >= bound {
                return Some(TerminationReason::Meter);
            }
        }
        if self.cleared || self.config.win_score.is_some_and(|win| self.score >= win) {
            return Some(TerminationReason::Win);
        }
        if self.fatal {
            return Some(TerminationReason::Collision);
        }
        None
    }

    /// End the session and compute the reward once
    ///
    /// Returns the reward on the Active -> Ended transition, `None` on any
    /// later call.
    pub fn complete<F>(&mut self, reason: TerminationReason, reward: F) -> Option<u32>
    where
        F: FnOnce(&Session) -> u32,
    {
        if !self.is_active() {
            log::debug!("Ignoring complete({}) on {:?} session", reason.as_str(), self.status);
            return None;
        }
        let points = reward(self);
        self.status = SessionStatus::Ended;
        self.termination = Some(reason);
        self.reward = Some(points);
        self.unreported = Some(points);
        log::info!(
            "Session ended ({}): score {}, meter {:.0}, reward {}",
            reason.as_str(),
            self.score,
            self.meter.value(),
            points
        );
        Some(points)
    }

    /// Force an Active session into Ended without a reward
    pub fn abort(&mut self) {
        if self.is_active() {
            self.status = SessionStatus::Ended;
            self.termination = Some(TerminationReason::Exit);
            log::info!("Session aborted at score {}", self.score);
        }
    }

    /// Take the reward for reporting; yields it exactly once per session
    pub fn take_reward(&mut self) -> Option<u32> {
        self.unreported.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timed(secs: u32) -> SessionConfig {
        SessionConfig {
            duration_secs: Some(secs),
            meter_fail: None,
            ..Default::default()
        }
    }

    #[test]
    fn test_start_transitions_to_active() {
        let mut session = Session::new(SessionConfig::default());
        assert_eq!(session.status(), SessionStatus::Idle);
        session.start();
        assert_eq!(session.status(), SessionStatus::Active);
    }

    #[test]
    fn test_score_frozen_outside_active() {
        let mut session = Session::new(SessionConfig::default());
        session.add_score(10);
        assert_eq!(session.score(), 0);

        session.start();
        session.add_score(10);
        session.complete(TerminationReason::Win, |s| s.score() as u32);
        session.add_score(10);
        session.penalize(5);
        assert_eq!(session.score(), 10);
    }

    #[test]
    fn test_penalty_saturates() {
        let mut session = Session::new(SessionConfig::default());
        session.start();
        session.add_score(3);
        session.penalize(10);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_timed_session_ends_with_time() {
        let mut session = Session::new(timed(30));
        session.start();
        for _ in 0..29 {
            session.second_elapsed();
            assert_eq!(session.check_termination(), None);
        }
        session.second_elapsed();
        let reason = session.check_termination();
        assert_eq!(reason, Some(TerminationReason::Time));
        session.complete(TerminationReason::Time, |_| 0);
        assert_eq!(session.status(), SessionStatus::Ended);
        assert_eq!(session.termination().map(|r| r.as_str()), Some("time"));
    }

    #[test]
    fn test_termination_priority_order() {
        let mut session = Session::new(SessionConfig {
            duration_secs: Some(1),
            meter_start: 95.0,
            meter_fail: Some(100.0),
            win_score: Some(10),
        });
        session.start();
        session.add_score(10);
        session.shift_meter(10.0);
        session.mark_fatal();
        session.second_elapsed();
        assert_eq!(session.check_termination(), Some(TerminationReason::Time));

        let mut session = Session::new(SessionConfig {
            meter_start: 95.0,
            win_score: Some(10),
            ..Default::default()
        });
        session.start();
        session.add_score(10);
        session.shift_meter(10.0);
        assert_eq!(session.check_termination(), Some(TerminationReason::Meter));
    }

    #[test]
    fn test_complete_is_guarded() {
        let mut session = Session::new(SessionConfig::default());
        session.start();
        session.add_score(7);
        let mut calls = 0;
        let first = session.complete(TerminationReason::Win, |s| {
            calls += 1;
            s.score() as u32 * 2
        });
        let second = session.complete(TerminationReason::Meter, |_| {
            calls += 1;
            99
        });
        assert_eq!(first, Some(14));
        assert_eq!(second, None);
        assert_eq!(calls, 1);
        assert_eq!(session.termination(), Some(TerminationReason::Win));
        assert_eq!(session.take_reward(), Some(14));
        assert_eq!(session.take_reward(), None);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = Session::new(timed(30));
        session.start();
        session.add_score(40);
        session.second_elapsed();
        session.reset();
        let once = serde_json::to_string(&session).unwrap();
        session.reset();
        let twice = serde_json::to_string(&session).unwrap();
        assert_eq!(once, twice);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.time_remaining(), Some(30));
    }

    #[test]
    fn test_restart_while_active_clears_counters() {
        let mut session = Session::new(SessionConfig::default());
        session.start();
        session.add_score(50);
        session.shift_meter(40.0);
        session.start();
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.score(), 0);
        assert_eq!(session.meter(), 0.0);
    }

    #[test]
    fn test_abort_reports_no_reward() {
        let mut session = Session::new(SessionConfig::default());
        session.start();
        session.add_score(20);
        session.abort();
        assert_eq!(session.termination(), Some(TerminationReason::Exit));
        assert_eq!(session.take_reward(), None);
        assert_eq!(session.complete(TerminationReason::Win, |_| 1), None);
    }

    #[test]
    fn test_advance_tick_counts_seconds() {
        let mut session = Session::new(timed(2));
        session.start();
        let seconds = (0..120).filter(|_| session.advance_tick(60)).count();
        assert_eq!(seconds, 2);
        assert_eq!(session.time_remaining(), Some(0));
    }

    proptest! {
        #[test]
        fn prop_meter_stays_in_bounds(start in -50.0f32..150.0, deltas in prop::collection::vec(-80.0f32..80.0, 0..64)) {
            let mut session = Session::new(SessionConfig {
                meter_start: start,
                meter_fail: None,
                ..Default::default()
            });
            session.start();
            prop_assert!((0.0..=100.0).contains(&session.meter()));
            for delta in deltas {
                session.shift_meter(delta);
                prop_assert!((0.0..=100.0).contains(&session.meter()));
            }
        }
    }
}
