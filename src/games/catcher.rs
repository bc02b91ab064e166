//! Chai catcher: a cup follows the pointer along the bottom of the screen
//!
//! Catch chai to raise the score and calm down, dodge distractions that add
//! stress. A boss drops in near the end of the run.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DrawList, Paint, Shape};
use crate::settings::DifficultyPreset;
use crate::sim::{
    Boundary, DifficultyBasis, DifficultyCurve, Effect, Entity, EntitySpec, Hitbox, InputMode,
    Placement, Player, Rules, Session, SessionConfig, SpawnRoll, SpawnerConfig, TickContext,
    TickInput,
};
use crate::{Rect, per_frame, secs_to_ticks};

/// Cup x range
const PLAYER_MIN_X: f32 = 5.0;
const PLAYER_MAX_X: f32 = 95.0;
/// Catch zone: x within this of the cup, y in 80..95
const CATCH_HALF_WIDTH: f32 = 8.0;
const CATCH_TOP: f32 = 80.0;
const CATCH_BOTTOM: f32 = 95.0;

const SPAWN_INTERVAL_SECS: f32 = 0.8;
const SPAWN_SHRINK_SECS: f32 = 0.1;
const SPAWN_FLOOR_SECS: f32 = 0.4;
const SCORE_PER_LEVEL: u64 = 50;
const CHAI_WEIGHT: u32 = 60;
const DISTRACTION_WEIGHT: u32 = 40;
/// Fall speed range, percent per frame
const FALL_MIN: f32 = 0.7;
const FALL_MAX: f32 = 1.2;

const CHAI_POINTS: i64 = 10;
const CHAI_CALM: f32 = -10.0;
const DISTRACTION_STRESS: f32 = 15.0;
const MISSED_CHAI_STRESS: f32 = 12.0;
const STRESS_START: f32 = 50.0;
const WIN_SCORE: u64 = 200;

const BOSS_SCORE: u64 = 180;
const BOSS_X: f32 = 50.0;
const BOSS_FALL: f32 = 1.2;
/// Boss is caught when the cup is within this of its x
const BOSS_CATCH_RANGE: f32 = 12.0;
const BOSS_POINTS: i64 = 20;
const BOSS_RESPAWN_SECS: f32 = 10.0;

/// Labels of the things that get in the way of a tea break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distraction {
    ClientCall,
    Escalation,
    UrgentEmail,
    SlackPing,
    Meeting,
    Emergency,
}

impl Distraction {
    pub const ALL: [Distraction; 6] = [
        Distraction::ClientCall,
        Distraction::Escalation,
        Distraction::UrgentEmail,
        Distraction::SlackPing,
        Distraction::Meeting,
        Distraction::Emergency,
    ];

    pub fn icon(&self) -> &'static str {
        match self {
            Distraction::ClientCall => "📞",
            Distraction::Escalation => "🚨",
            Distraction::UrgentEmail => "📧",
            Distraction::SlackPing => "💬",
            Distraction::Meeting => "📅",
            Distraction::Emergency => "🔥",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Distraction::ClientCall => "Client Call",
            Distraction::Escalation => "Escalation",
            Distraction::UrgentEmail => "Urgent Email",
            Distraction::SlackPing => "Slack Ping",
            Distraction::Meeting => "Meeting",
            Distraction::Emergency => "Emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Falling {
    Chai,
    Distraction(Distraction),
    Boss,
}

/// Boss lifecycle within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BossState {
    /// Not yet earned
    Waiting,
    Falling,
    /// Missed; drops again at the given tick
    Respawn { due: u64 },
    Caught,
}

#[derive(Debug, Clone)]
pub struct ChaiCatcher {
    preset: DifficultyPreset,
    boss: BossState,
}

impl ChaiCatcher {
    pub fn new(preset: DifficultyPreset) -> Self {
        Self {
            preset,
            boss: BossState::Waiting,
        }
    }

    fn fall_speed(&self, per_frame_units: f32) -> f32 {
        per_frame(per_frame_units) * self.preset.speed_scale()
    }
}

impl Rules for ChaiCatcher {
    type Kind = Falling;

    fn name(&self) -> &'static str {
        "chai-catcher"
    }

    fn bounds(&self) -> Rect {
        Rect::percent()
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Follow
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: None,
            meter_start: STRESS_START,
            meter_fail: Some(100.0),
            win_score: Some(WIN_SCORE),
        }
    }

    fn spawner_config(&self) -> SpawnerConfig<Falling> {
        let interval = self.preset.scale_interval(secs_to_ticks(SPAWN_INTERVAL_SECS));
        let floor = self.preset.scale_interval(secs_to_ticks(SPAWN_FLOOR_SECS));
        let shrink = secs_to_ticks(SPAWN_SHRINK_SECS);
        SpawnerConfig {
            interval_ticks: interval,
            jitter_ticks: 0,
            min_interval_ticks: floor,
            shrink_per_level: shrink,
            max_population: 64,
            table: vec![
                (Falling::Chai, CHAI_WEIGHT),
                (Falling::Distraction(Distraction::ClientCall), DISTRACTION_WEIGHT),
            ],
            placement: Placement::anywhere(Rect::new(Vec2::new(10.0, 0.0), Vec2::new(90.0, 0.0))),
            curve: DifficultyCurve {
                basis: DifficultyBasis::Score,
                step: SCORE_PER_LEVEL,
                max_level: (interval.saturating_sub(floor) / shrink.max(1)) as u32,
            },
        }
    }

    fn player_start(&self) -> Player {
        let zone_height = CATCH_BOTTOM - CATCH_TOP;
        Player::at(
            Vec2::new(50.0, CATCH_TOP + zone_height * 0.5),
            Hitbox::aabb(CATCH_HALF_WIDTH * 2.0, zone_height),
        )
    }

    fn reset(&mut self) {
        self.boss = BossState::Waiting;
    }

    fn steer(&mut self, player: &mut Player, input: &TickInput, _dt: f32) {
        if let Some(target) = input.target {
            player.pos.x = target.x.clamp(PLAYER_MIN_X, PLAYER_MAX_X);
        }
    }

    fn boundary(&self, _kind: &Falling) -> Boundary {
        Boundary::DeleteOnExit
    }

    fn build(&mut self, roll: SpawnRoll<Falling>, rng: &mut Pcg32) -> EntitySpec<Falling> {
        let kind = match roll.kind {
            Falling::Distraction(_) => {
                Falling::Distraction(Distraction::ALL[rng.random_range(0..Distraction::ALL.len())])
            }
            other => other,
        };
        let speed = self.fall_speed(rng.random_range(FALL_MIN..=FALL_MAX));
        EntitySpec::at(kind, roll.pos).with_vel(Vec2::new(0.0, speed))
    }

    fn on_collision(&mut self, kind: &Falling, _now: u64) -> Effect {
        match kind {
            Falling::Chai => Effect::score(CHAI_POINTS).and_meter(CHAI_CALM),
            Falling::Distraction(_) => Effect::meter(DISTRACTION_STRESS),
            Falling::Boss => {
                log::info!("Boss caught");
                self.boss = BossState::Caught;
                Effect::score(BOSS_POINTS)
            }
        }
    }

    fn on_exit(&mut self, kind: &Falling, now: u64) -> Effect {
        match kind {
            Falling::Chai => Effect::meter(MISSED_CHAI_STRESS),
            Falling::Distraction(_) => Effect::NONE,
            Falling::Boss => {
                self.boss = BossState::Respawn {
                    due: now + secs_to_ticks(BOSS_RESPAWN_SECS),
                };
                Effect::NONE
            }
        }
    }

    fn on_tick(&mut self, ctx: TickContext<'_, Falling>) {
        let drop_boss = match self.boss {
            BossState::Waiting => ctx.session.score() >= BOSS_SCORE,
            BossState::Respawn { due } => ctx.now >= due,
            BossState::Falling | BossState::Caught => false,
        };
        if drop_boss {
            let speed = self.fall_speed(BOSS_FALL);
            let id = ctx.entities.spawn(
                EntitySpec::at(Falling::Boss, Vec2::new(BOSS_X, 0.0))
                    .with_vel(Vec2::new(0.0, speed))
                    .with_hitbox(Hitbox::aabb((BOSS_CATCH_RANGE - CATCH_HALF_WIDTH) * 2.0, 0.0)),
                ctx.now,
            );
            self.boss = BossState::Falling;
            log::info!("Boss dropped (entity {})", id);
        }
    }

    fn reward(&self, session: &Session) -> u32 {
        let calm = (100.0 - session.meter()).max(0.0).floor() as u32;
        (session.score() as u32).saturating_mul(2).saturating_add(calm)
    }
}

impl Paint for ChaiCatcher {
    fn backdrop(&self, list: &mut DrawList) {
        list.clear(Color::rgb(0x3b2f2f));
        list.rect(
            Rect::new(Vec2::new(0.0, CATCH_TOP), Vec2::new(100.0, CATCH_BOTTOM)),
            Color::rgb(0xf59e0b).with_alpha(0x20),
        );
    }

    fn entity(&self, entity: &Entity<Falling>, list: &mut DrawList) {
        let size = Vec2::splat(8.0);
        match entity.kind {
            Falling::Chai => list.glyph(
                Rect::centered(entity.pos, size),
                "☕",
                Shape::Circle,
                Color::rgb(0xd97706),
            ),
            Falling::Distraction(d) => list.glyph(
                Rect::centered(entity.pos, size),
                d.icon(),
                Shape::Circle,
                Color::rgb(0xdc2626),
            ),
            Falling::Boss => {
                list.glyph(
                    Rect::centered(entity.pos, Vec2::splat(16.0)),
                    "💀",
                    Shape::Rect,
                    Color::rgb(0x6b7280),
                );
                list.text(entity.pos + Vec2::new(0.0, 10.0), "Boss", 4.0, Color::rgb(0xfde047));
            }
        }
    }

    fn player(&self, player: &Player, list: &mut DrawList) {
        list.image(
            Rect::centered(player.pos, Vec2::new(CATCH_HALF_WIDTH * 2.0, CATCH_BOTTOM - CATCH_TOP)),
            "assets/chai-cup.png",
            Shape::Rect,
            Color::rgb(0xfbbf24),
        );
    }

    fn hud(&self, session: &Session, list: &mut DrawList) {
        list.hud("score", "Score", session.score());
        list.hud("meter", "Stress", format!("{:.0}%", session.meter()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SIM_DT, TICKS_PER_SECOND};
    use crate::sim::{GameEvent, GameState, SessionStatus, TerminationReason, tick};

    fn running() -> GameState<ChaiCatcher> {
        let mut state = GameState::new(ChaiCatcher::new(DifficultyPreset::Normal), 1);
        state.start();
        state
    }

    fn idle_tick(state: &mut GameState<ChaiCatcher>) -> Vec<GameEvent> {
        tick(state, &TickInput::default(), SIM_DT)
    }

    fn follow(x: f32) -> TickInput {
        TickInput {
            target: Some(Vec2::new(x, 50.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_chai_in_zone_caught_once() {
        let mut state = running();
        let id = state
            .entities
            .spawn(EntitySpec::at(Falling::Chai, Vec2::new(50.0, 94.0)), 0);
        let events = idle_tick(&mut state);
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Caught { .. }))
                .count(),
            1
        );
        assert!(state.entities.get(id).is_none());
        assert_eq!(state.session.score(), 10);
        assert_eq!(state.session.meter(), 40.0);

        idle_tick(&mut state);
        assert_eq!(state.session.score(), 10);
    }

    #[test]
    fn test_cup_is_clamped() {
        let mut state = running();
        tick(&mut state, &follow(-30.0), SIM_DT);
        assert_eq!(state.player.pos.x, PLAYER_MIN_X);
        tick(&mut state, &follow(300.0), SIM_DT);
        assert_eq!(state.player.pos.x, PLAYER_MAX_X);
    }

    #[test]
    fn test_distraction_and_missed_chai_add_stress() {
        let mut state = running();
        state.entities.spawn(
            EntitySpec::at(Falling::Distraction(Distraction::Meeting), Vec2::new(50.0, 85.0)),
            0,
        );
        state.entities.spawn(
            EntitySpec::at(Falling::Chai, Vec2::new(10.0, 99.5)).with_vel(Vec2::new(0.0, 60.0)),
            0,
        );
        idle_tick(&mut state);
        assert_eq!(state.session.meter(), 50.0 + 15.0 + 12.0);
        assert_eq!(state.session.score(), 0);
    }

    #[test]
    fn test_spawns_are_rate_limited() {
        let mut state = running();
        let mut spawned = 0;
        for _ in 0..TICKS_PER_SECOND * 4 {
            state.session.shift_meter(-100.0);
            spawned += idle_tick(&mut state)
                .iter()
                .filter(|e| matches!(e, GameEvent::Spawned { .. }))
                .count();
        }
        // One on the first tick, then every 48 ticks
        assert_eq!(spawned, 5);
    }

    #[test]
    fn test_boss_drops_after_threshold_and_pays_out() {
        let mut state = running();
        state.session.add_score(180);
        idle_tick(&mut state);
        assert_eq!(state.entities.count_where(|k| *k == Falling::Boss), 1);

        // Park the cup under the boss and wait for it
        let mut boss_caught = false;
        for _ in 0..200 {
            tick(&mut state, &follow(45.0), SIM_DT);
            if state.session.score() >= 200 {
                boss_caught = true;
                break;
            }
        }
        assert!(boss_caught);
        assert_eq!(state.session.status(), SessionStatus::Ended);
        assert_eq!(state.session.termination(), Some(TerminationReason::Win));
    }

    #[test]
    fn test_missed_boss_respawns_after_ten_seconds() {
        let mut state = running();
        state.rules.on_exit(&Falling::Boss, 0);
        for _ in 1..secs_to_ticks(BOSS_RESPAWN_SECS) {
            state.entities.clear();
            idle_tick(&mut state);
            assert_eq!(state.entities.count_where(|k| *k == Falling::Boss), 0);
        }
        state.entities.clear();
        idle_tick(&mut state);
        assert_eq!(state.entities.count_where(|k| *k == Falling::Boss), 1);
    }

    #[test]
    fn test_caught_boss_never_returns() {
        let mut state = running();
        state.rules.on_collision(&Falling::Boss, 0);
        state.session.add_score(190);
        for _ in 0..10 {
            state.entities.clear();
            idle_tick(&mut state);
        }
        assert_eq!(state.entities.count_where(|k| *k == Falling::Boss), 0);
    }

    #[test]
    fn test_reward_formula() {
        let mut state = running();
        state.session.add_score(120);
        state.session.shift_meter(20.0);
        assert_eq!(state.rules.reward(&state.session), 240 + 30);
        state.session.shift_meter(100.0);
        assert_eq!(state.rules.reward(&state.session), 240);
    }

    #[test]
    fn test_stress_maxed_ends_with_meter() {
        let mut state = running();
        state.session.shift_meter(45.0);
        state.entities.spawn(
            EntitySpec::at(Falling::Distraction(Distraction::SlackPing), Vec2::new(50.0, 88.0)),
            0,
        );
        let events = idle_tick(&mut state);
        assert!(events.contains(&GameEvent::Ended {
            reason: TerminationReason::Meter
        }));
        assert_eq!(state.session.take_reward(), Some(0));
    }
}
