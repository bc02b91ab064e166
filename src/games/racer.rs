//! Lane racer: dodge trucks by switching between three lanes
//!
//! Trucks scroll down at a speed that ramps up every few seconds. Survival
//! earns a point per tick; one crash ends the run.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DrawList, Paint, Shape};
use crate::settings::DifficultyPreset;
use crate::sim::{
    Boundary, DifficultyBasis, DifficultyCurve, Direction, Effect, Entity, EntitySpec, Hitbox,
    InputMode, Placement, Player, Rules, Session, SessionConfig, SpawnRoll, SpawnerConfig,
    TickContext, TickInput,
};
use crate::{Rect, per_frame};

const WIDTH: f32 = 400.0;
const HEIGHT: f32 = 600.0;
/// Lane left edges: 15%, 45% and 75% of the width
const LANE_X: [f32; 3] = [60.0, 180.0, 300.0];
const START_LANE: usize = 1;
const CAR_SIZE: Vec2 = Vec2::new(40.0, 80.0);
const TRUCK_SIZE: Vec2 = Vec2::new(40.0, 80.0);
/// Gap between the car and the bottom edge
const CAR_MARGIN: f32 = 20.0;

/// Truck speed in px per frame
const SPEED_START: f32 = 8.0;
const SPEED_MAX: f32 = 20.0;
const SPEED_STEP_SECS: u64 = 5;
const MAX_TRUCKS: usize = 2;
/// Vertical distance between consecutive trucks, in truck heights
const TRUCK_SPACING: f32 = 3.0;

const MIN_KMPH: f32 = 60.0;
const MAX_KMPH: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traffic {
    Truck,
}

#[derive(Debug, Clone)]
pub struct LaneRacer {
    preset: DifficultyPreset,
    lane: usize,
    /// Current truck speed in px per frame
    speed: f32,
}

impl LaneRacer {
    pub fn new(preset: DifficultyPreset) -> Self {
        Self {
            preset,
            lane: START_LANE,
            speed: SPEED_START,
        }
    }

    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Centre x of a lane
    fn lane_center(lane: usize) -> f32 {
        LANE_X[lane.min(LANE_X.len() - 1)] + CAR_SIZE.x * 0.5
    }

    /// Speedometer reading for the HUD
    pub fn kmph(&self) -> u32 {
        let t = (self.speed.min(SPEED_MAX) - SPEED_START) / (SPEED_MAX - SPEED_START);
        (MIN_KMPH + t * (MAX_KMPH - MIN_KMPH)).round() as u32
    }

    fn spawn_y() -> f32 {
        -TRUCK_SIZE.y * 0.5
    }
}

impl Rules for LaneRacer {
    type Kind = Traffic;

    fn name(&self) -> &'static str {
        "lane-racer"
    }

    fn bounds(&self) -> Rect {
        Rect::sized(WIDTH, HEIGHT)
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Lanes
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: None,
            meter_start: 0.0,
            meter_fail: None,
            win_score: None,
        }
    }

    /// Trucks are placed by distance in `on_tick`; the spawner only tracks
    /// the speed level.
    fn spawner_config(&self) -> SpawnerConfig<Traffic> {
        SpawnerConfig {
            interval_ticks: 1,
            jitter_ticks: 0,
            min_interval_ticks: 1,
            shrink_per_level: 0,
            max_population: 0,
            table: vec![(Traffic::Truck, 1)],
            placement: Placement::anywhere(Rect::sized(WIDTH, 0.0)),
            curve: DifficultyCurve {
                basis: DifficultyBasis::ElapsedSecs,
                step: SPEED_STEP_SECS,
                max_level: (SPEED_MAX - SPEED_START) as u32,
            },
        }
    }

    fn player_start(&self) -> Player {
        Player::at(
            Vec2::new(
                Self::lane_center(START_LANE),
                HEIGHT - CAR_MARGIN - CAR_SIZE.y * 0.5,
            ),
            Hitbox::aabb(CAR_SIZE.x, CAR_SIZE.y),
        )
    }

    fn reset(&mut self) {
        self.lane = START_LANE;
        self.speed = SPEED_START;
    }

    fn steer(&mut self, player: &mut Player, input: &TickInput, _dt: f32) {
        match input.step {
            Some(Direction::Left) => self.lane = self.lane.saturating_sub(1),
            Some(Direction::Right) => self.lane = (self.lane + 1).min(LANE_X.len() - 1),
            _ => {}
        }
        player.pos.x = Self::lane_center(self.lane);
    }

    fn advance(&mut self, entity: &mut Entity<Traffic>, dt: f32) {
        entity.vel = Vec2::new(0.0, per_frame(self.speed) * self.preset.speed_scale());
        entity.integrate(dt);
    }

    fn boundary(&self, _kind: &Traffic) -> Boundary {
        Boundary::DeleteOnExit
    }

    fn build(&mut self, roll: SpawnRoll<Traffic>, _rng: &mut Pcg32) -> EntitySpec<Traffic> {
        EntitySpec::at(roll.kind, roll.pos).with_hitbox(Hitbox::aabb(TRUCK_SIZE.x, TRUCK_SIZE.y))
    }

    fn on_collision(&mut self, _kind: &Traffic, _now: u64) -> Effect {
        log::info!("Crash at {} kmph", self.kmph());
        Effect::fatal()
    }

    fn on_tick(&mut self, ctx: TickContext<'_, Traffic>) {
        ctx.session.add_score(1);
        self.speed = (SPEED_START + ctx.level as f32).min(SPEED_MAX);

        if ctx.entities.len() >= MAX_TRUCKS {
            return;
        }
        let spacing = TRUCK_SPACING * TRUCK_SIZE.y;
        let highest = ctx
            .entities
            .iter()
            .map(|e| e.pos.y)
            .fold(f32::INFINITY, f32::min);
        if highest - Self::spawn_y() < spacing {
            return;
        }
        let lane = ctx.rng.random_range(0..LANE_X.len());
        let roll = SpawnRoll {
            kind: Traffic::Truck,
            pos: Vec2::new(Self::lane_center(lane), Self::spawn_y()),
            level: ctx.level,
        };
        let spec = self.build(roll, ctx.rng);
        ctx.entities.spawn(spec, ctx.now);
    }

    fn reward(&self, session: &Session) -> u32 {
        u32::try_from(session.score()).unwrap_or(u32::MAX)
    }
}

impl Paint for LaneRacer {
    fn backdrop(&self, list: &mut DrawList) {
        list.clear(Color::rgb(0x222222));
        list.rect(
            Rect::new(Vec2::new(WIDTH * 0.1, 0.0), Vec2::new(WIDTH * 0.9, HEIGHT)),
            Color::rgb(0x555555),
        );
        for x in [WIDTH * 0.35, WIDTH * 0.65] {
            for dash in 0..15 {
                let y = dash as f32 * 40.0;
                list.rect(
                    Rect::new(Vec2::new(x - 2.0, y), Vec2::new(x + 2.0, y + 20.0)),
                    Color::WHITE,
                );
            }
        }
    }

    fn entity(&self, entity: &Entity<Traffic>, list: &mut DrawList) {
        list.image(
            Rect::centered(entity.pos, TRUCK_SIZE),
            "assets/truck.png",
            Shape::Rect,
            Color::rgb(0xff3333),
        );
    }

    fn player(&self, player: &Player, list: &mut DrawList) {
        list.image(
            Rect::centered(player.pos, CAR_SIZE),
            "assets/car.png",
            Shape::Rect,
            Color::rgb(0x00aaff),
        );
    }

    fn hud(&self, session: &Session, list: &mut DrawList) {
        list.hud("score", "Score", session.score());
        list.hud("speed", "Speed", format!("{} kmph", self.kmph()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SIM_DT, TICKS_PER_SECOND};
    use crate::sim::{GameEvent, GameState, SessionStatus, TerminationReason, tick};

    fn running() -> GameState<LaneRacer> {
        let mut state = GameState::new(LaneRacer::new(DifficultyPreset::Normal), 4);
        state.start();
        state
    }

    fn step(dir: Direction) -> TickInput {
        TickInput {
            step: Some(dir),
            ..Default::default()
        }
    }

    #[test]
    fn test_lane_changes_are_bounded() {
        let mut state = running();
        tick(&mut state, &step(Direction::Left), SIM_DT);
        tick(&mut state, &step(Direction::Left), SIM_DT);
        assert_eq!(state.rules.lane(), 0);
        assert_eq!(state.player.pos.x, 80.0);
        for _ in 0..4 {
            tick(&mut state, &step(Direction::Right), SIM_DT);
        }
        assert_eq!(state.rules.lane(), 2);
        assert_eq!(state.player.pos.x, 320.0);
    }

    #[test]
    fn test_score_counts_ticks_and_trucks_are_spaced() {
        let mut state = running();
        for _ in 0..30 {
            state.entities.retain_mut(|e| e.pos.y < 300.0);
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.session.score(), 30);
        let ys: Vec<f32> = state.entities.iter().map(|e| e.pos.y).collect();
        assert!(ys.len() <= MAX_TRUCKS);
        if let [a, b] = ys.as_slice() {
            assert!((a - b).abs() >= TRUCK_SPACING * TRUCK_SIZE.y - 1.0);
        }
    }

    #[test]
    fn test_speed_ramps_every_five_seconds() {
        let mut state = running();
        for _ in 0..TICKS_PER_SECOND * 11 {
            state.entities.clear();
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        // The level picked up at the end of a tick applies from the next one
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.rules.speed, 10.0);
        assert_eq!(state.rules.kmph(), 75);
    }

    #[test]
    fn test_same_lane_truck_crashes() {
        let mut state = running();
        let car = state.player.pos;
        state.entities.spawn(
            EntitySpec::at(Traffic::Truck, car - Vec2::new(0.0, 70.0))
                .with_hitbox(Hitbox::aabb(TRUCK_SIZE.x, TRUCK_SIZE.y)),
            0,
        );
        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::Ended {
            reason: TerminationReason::Collision
        }));
        assert_eq!(state.session.status(), SessionStatus::Ended);
        assert_eq!(state.session.take_reward(), Some(1));
    }

    #[test]
    fn test_other_lane_truck_passes() {
        let mut state = running();
        let car = state.player.pos;
        state.entities.spawn(
            EntitySpec::at(Traffic::Truck, Vec2::new(LaneRacer::lane_center(0), car.y))
                .with_hitbox(Hitbox::aabb(TRUCK_SIZE.x, TRUCK_SIZE.y)),
            0,
        );
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.session.is_active());
    }
}
