//! Runtime wrapper that drives any `Rules` game through the shared loop

use super::{ArcadeGame, GameId};
use crate::consts::SIM_DT;
use crate::renderer::{DrawList, Paint};
use crate::sim::{GameEvent, GameState, InputAdapter, InputEvent, Session, tick};

/// A mounted entity game: state, input and pause flag
#[derive(Debug, Clone)]
pub struct Arcade<R: Paint> {
    id: GameId,
    state: GameState<R>,
    input: InputAdapter,
    paused: bool,
}

impl<R: Paint> Arcade<R> {
    pub fn new(id: GameId, rules: R, seed: u64) -> Self {
        let input = InputAdapter::new(rules.input_mode(), rules.bounds());
        Self {
            id,
            state: GameState::new(rules, seed),
            input,
            paused: false,
        }
    }

    pub fn state(&self) -> &GameState<R> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState<R> {
        &mut self.state
    }
}

impl<R: Paint> ArcadeGame for Arcade<R> {
    fn id(&self) -> GameId {
        self.id
    }

    fn start(&mut self) {
        self.paused = false;
        self.input.release_all();
        self.input.snapshot();
        self.state.start();
    }

    fn reset(&mut self) {
        self.paused = false;
        self.state.reset();
    }

    fn abort(&mut self) {
        self.state.abort();
    }

    fn session(&self) -> &Session {
        &self.state.session
    }

    fn set_surface(&mut self, width: f32, height: f32) {
        self.input.set_surface(width, height);
    }

    fn input(&mut self, event: InputEvent) {
        self.input.handle(event);
    }

    fn release_input(&mut self) {
        self.input.release_all();
    }

    fn step(&mut self) -> Vec<GameEvent> {
        let input = self.input.snapshot();
        if input.pause && self.state.session.is_active() {
            self.set_paused(!self.paused);
        }
        if self.paused {
            return Vec::new();
        }
        tick(&mut self.state, &input, SIM_DT)
    }

    fn draw(&self) -> DrawList {
        let rules = &self.state.rules;
        let mut list = DrawList::new(rules.bounds());
        rules.backdrop(&mut list);
        for entity in self.state.entities.iter() {
            rules.entity(entity, &mut list);
        }
        rules.player(&self.state.player, &mut list);
        rules.hud(&self.state.session, &mut list);
        list
    }

    fn take_reward(&mut self) -> Option<u32> {
        self.state.session.take_reward()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            log::info!("{} {}", self.id.name(), if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }
}
