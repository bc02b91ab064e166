//! Runner: a stick figure jumps over (or ducks under) incoming obstacles
//!
//! The world scrolls left a little faster every frame. Ground obstacles have
//! to be jumped, sky boxes have to be stayed under.

use std::f32::consts::PI;

use glam::Vec2;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DrawList, Paint, Shape};
use crate::settings::DifficultyPreset;
use crate::sim::{
    Boundary, DifficultyCurve, Effect, Entity, EntitySpec, Hitbox, InputMode, Placement, Player,
    Rules, Session, SessionConfig, SpawnRoll, SpawnerConfig, TickContext, TickInput,
};
use crate::{Rect, per_frame, secs_to_ticks};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 400.0;
const GROUND_Y: f32 = 300.0;

const PLAYER_SIZE: Vec2 = Vec2::new(24.0, 48.0);
const PLAYER_START_X: f32 = 100.0;
/// Allowed range of the player's left edge
const PLAYER_MIN_X: f32 = 20.0;
const PLAYER_MAX_X: f32 = WIDTH - PLAYER_SIZE.x - 20.0;
/// Lateral speed, px per frame
const PLAYER_SPEED: f32 = 5.0;

const JUMP_PEAK: f32 = 120.0;
const JUMP_SECS: f32 = 2.0;

/// World scroll speed, px per frame
const SPEED_START: f32 = 1.5;
const SPEED_GAIN: f32 = 0.001;
const SPEED_MAX: f32 = 6.0;

const SPAWN_MIN_SECS: f32 = 2.2;
const SPAWN_JITTER_SECS: f32 = 1.5;
const SKY_RAISE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstacle {
    Zigzag,
    Box,
    SkyBox,
}

impl Obstacle {
    pub fn size(&self) -> Vec2 {
        match self {
            Obstacle::Zigzag => Vec2::splat(35.0),
            Obstacle::Box => Vec2::splat(40.0),
            Obstacle::SkyBox => Vec2::splat(50.0),
        }
    }

    /// y of the obstacle's bottom edge
    fn bottom(&self) -> f32 {
        match self {
            Obstacle::SkyBox => GROUND_Y - SKY_RAISE,
            Obstacle::Zigzag | Obstacle::Box => GROUND_Y,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    preset: DifficultyPreset,
    /// Progress through the current jump (0..1), `None` on the ground
    jump: Option<f32>,
    /// Scroll speed in px per frame
    speed: f32,
}

impl Runner {
    pub fn new(preset: DifficultyPreset) -> Self {
        Self {
            preset,
            jump: None,
            speed: SPEED_START,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    fn standing_y() -> f32 {
        GROUND_Y - PLAYER_SIZE.y * 0.5
    }

    fn jump_step() -> f32 {
        1.0 / secs_to_ticks(JUMP_SECS) as f32
    }
}

impl Rules for Runner {
    type Kind = Obstacle;

    fn name(&self) -> &'static str {
        "runner"
    }

    fn bounds(&self) -> Rect {
        Rect::sized(WIDTH, HEIGHT)
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Hold
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: None,
            meter_start: 0.0,
            meter_fail: None,
            win_score: None,
        }
    }

    fn spawner_config(&self) -> SpawnerConfig<Obstacle> {
        let interval = self.preset.scale_interval(secs_to_ticks(SPAWN_MIN_SECS));
        SpawnerConfig {
            interval_ticks: interval,
            jitter_ticks: secs_to_ticks(SPAWN_JITTER_SECS),
            min_interval_ticks: interval,
            shrink_per_level: 0,
            max_population: 16,
            table: vec![(Obstacle::Zigzag, 1), (Obstacle::Box, 1), (Obstacle::SkyBox, 1)],
            placement: Placement::anywhere(Rect::new(Vec2::new(WIDTH, 0.0), Vec2::new(WIDTH, 0.0))),
            curve: DifficultyCurve::FLAT,
        }
    }

    fn player_start(&self) -> Player {
        Player::at(
            Vec2::new(PLAYER_START_X + PLAYER_SIZE.x * 0.5, Self::standing_y()),
            Hitbox::aabb(PLAYER_SIZE.x, PLAYER_SIZE.y),
        )
    }

    fn reset(&mut self) {
        self.jump = None;
        self.speed = SPEED_START;
    }

    fn steer(&mut self, player: &mut Player, input: &TickInput, _dt: f32) {
        let half = PLAYER_SIZE.x * 0.5;
        let left = player.pos.x - half + input.axis.x * PLAYER_SPEED;
        player.pos.x = left.clamp(PLAYER_MIN_X, PLAYER_MAX_X) + half;

        if input.activate && self.jump.is_none() {
            self.jump = Some(0.0);
        }
        if let Some(progress) = self.jump {
            let next = progress + Self::jump_step();
            if next >= 1.0 {
                self.jump = None;
                player.pos.y = Self::standing_y();
            } else {
                self.jump = Some(next);
                player.pos.y = Self::standing_y() - (next * PI).sin() * JUMP_PEAK;
            }
        }
    }

    fn advance(&mut self, entity: &mut Entity<Obstacle>, dt: f32) {
        entity.vel = Vec2::new(-per_frame(self.speed) * self.preset.speed_scale(), 0.0);
        entity.integrate(dt);
    }

    fn boundary(&self, _kind: &Obstacle) -> Boundary {
        Boundary::DeleteOnExit
    }

    fn build(&mut self, roll: SpawnRoll<Obstacle>, _rng: &mut Pcg32) -> EntitySpec<Obstacle> {
        let size = roll.kind.size();
        let center = Vec2::new(roll.pos.x + size.x * 0.5, roll.kind.bottom() - size.y * 0.5);
        EntitySpec::at(roll.kind, center).with_hitbox(Hitbox::aabb(size.x, size.y))
    }

    fn on_collision(&mut self, kind: &Obstacle, _now: u64) -> Effect {
        log::info!("Ran into {:?} at speed {:.2}", kind, self.speed);
        Effect::fatal()
    }

    fn on_tick(&mut self, ctx: TickContext<'_, Obstacle>) {
        ctx.session.add_score(1);
        self.speed = (self.speed + SPEED_GAIN).min(SPEED_MAX);
    }

    fn reward(&self, session: &Session) -> u32 {
        u32::try_from(session.score()).unwrap_or(u32::MAX)
    }
}

impl Paint for Runner {
    fn backdrop(&self, list: &mut DrawList) {
        list.clear(Color::rgb(0xe0f2fe));
        list.rect(
            Rect::new(Vec2::new(0.0, GROUND_Y), Vec2::new(WIDTH, HEIGHT)),
            Color::rgb(0x65a30d),
        );
    }

    fn entity(&self, entity: &Entity<Obstacle>, list: &mut DrawList) {
        let rect = Rect::centered(entity.pos, entity.kind.size());
        match entity.kind {
            Obstacle::Zigzag => list.glyph(rect, "⚡", Shape::Rect, Color::rgb(0xeab308)),
            Obstacle::Box => list.rect(rect, Color::rgb(0x92400e)),
            Obstacle::SkyBox => list.rect(rect, Color::rgb(0x7c3aed)),
        }
    }

    fn player(&self, player: &Player, list: &mut DrawList) {
        let top = player.pos.y - PLAYER_SIZE.y * 0.5;
        let x = player.pos.x;
        list.circle(Vec2::new(x, top + 10.0), 8.0, Color::BLACK);
        list.rect(
            Rect::new(Vec2::new(x - 2.0, top + 18.0), Vec2::new(x + 2.0, top + 35.0)),
            Color::BLACK,
        );
        let legs = if self.is_jumping() { 43.0 } else { 47.0 };
        list.rect(
            Rect::new(Vec2::new(x - 5.0, top + 35.0), Vec2::new(x + 5.0, top + legs)),
            Color::BLACK,
        );
    }

    fn hud(&self, session: &Session, list: &mut DrawList) {
        list.hud("score", "Score", session.score());
        list.hud("speed", "Speed", format!("{:.1}", self.speed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::{GameEvent, GameState, TerminationReason, tick};

    fn running() -> GameState<Runner> {
        let mut state = GameState::new(Runner::new(DifficultyPreset::Normal), 8);
        state.start();
        state
    }

    fn obstacle(kind: Obstacle, left: f32) -> EntitySpec<Obstacle> {
        let size = kind.size();
        EntitySpec::at(kind, Vec2::new(left + size.x * 0.5, kind.bottom() - size.y * 0.5))
            .with_hitbox(Hitbox::aabb(size.x, size.y))
    }

    fn jump() -> TickInput {
        TickInput {
            activate: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_obstacle_arrives_at_right_edge() {
        let mut state = running();
        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::Spawned { .. })));
        let spawned = state.entities.iter().next().unwrap();
        let left = spawned.pos.x - spawned.kind.size().x * 0.5;
        assert_eq!(left, WIDTH);
    }

    #[test]
    fn test_lateral_movement_is_bounded() {
        let mut state = running();
        let left = TickInput {
            axis: Vec2::NEG_X,
            ..Default::default()
        };
        for _ in 0..100 {
            state.entities.clear();
            tick(&mut state, &left, SIM_DT);
        }
        assert_eq!(state.player.pos.x, PLAYER_MIN_X + PLAYER_SIZE.x * 0.5);
    }

    #[test]
    fn test_jump_arc_peaks_and_lands() {
        let mut state = running();
        state.entities.clear();
        tick(&mut state, &jump(), SIM_DT);
        assert!(state.rules.is_jumping());
        let mut highest = state.player.pos.y;
        for _ in 0..130 {
            state.entities.clear();
            // Extra presses mid-air are ignored
            tick(&mut state, &jump(), SIM_DT);
            highest = highest.min(state.player.pos.y);
            if !state.rules.is_jumping() {
                break;
            }
        }
        assert!(!state.rules.is_jumping());
        assert_eq!(state.player.pos.y, Runner::standing_y());
        assert!((Runner::standing_y() - highest - JUMP_PEAK).abs() < 0.5);
    }

    #[test]
    fn test_box_on_the_ground_ends_run() {
        let mut state = running();
        let player_left = state.player.pos.x - PLAYER_SIZE.x * 0.5;
        state.entities.spawn(obstacle(Obstacle::Box, player_left + 10.0), 0);
        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::Ended {
            reason: TerminationReason::Collision
        }));
    }

    #[test]
    fn test_sky_box_passes_overhead() {
        let mut state = running();
        let player_left = state.player.pos.x - PLAYER_SIZE.x * 0.5;
        state.entities.spawn(obstacle(Obstacle::SkyBox, player_left), 0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.session.is_active());
    }

    #[test]
    fn test_speed_ramps_to_cap() {
        let mut state = running();
        for _ in 0..10 {
            state.entities.clear();
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!((state.rules.speed() - (SPEED_START + 10.0 * SPEED_GAIN)).abs() < 1e-4);
        assert_eq!(state.session.score(), 10);

        state.rules.speed = SPEED_MAX;
        state.entities.clear();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.rules.speed(), SPEED_MAX);
    }
}
