//! Memory match: flip two cards at a time and find every pair before the
//! countdown runs out
//!
//! No moving entities, so this game drives its own `Session` instead of going
//! through `tick`. Flip-back and match resolution are due ticks checked at the
//! top of each step.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::{ArcadeGame, GameId};
use crate::consts::TICKS_PER_SECOND;
use crate::renderer::{Color, DrawList, Shape};
use crate::sim::{
    GameEvent, InputAdapter, InputEvent, InputMode, RngState, Session, SessionConfig,
    TerminationReason,
};
use crate::{Rect, secs_to_ticks};

pub const DEFAULT_PAIRS: usize = 8;
pub const DEFAULT_DURATION_SECS: u32 = 120;

const MATCH_DELAY_SECS: f32 = 0.5;
const MISMATCH_DELAY_SECS: f32 = 1.0;

const MATCH_POINTS: u64 = 100;

const GRID_MARGIN: f32 = 4.0;
const GRID_GAP: f32 = 2.0;

const FACES: [&str; 18] = [
    "🐱", "🐶", "🐸", "🐯", "🦁", "🐼", "🐨", "🐵", "🦊", "🐰", "🐻", "🐷", "🐮", "🐔", "🐧", "🐙",
    "🦄", "🐢",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub face: u8,
    pub state: CardState,
}

impl Card {
    pub fn glyph(&self) -> &'static str {
        FACES[usize::from(self.face) % FACES.len()]
    }
}

/// Two revealed cards waiting to be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingPair {
    first: usize,
    second: usize,
    matched: bool,
    due: u64,
}

#[derive(Debug, Clone)]
pub struct MemoryMatch {
    pairs: usize,
    session: Session,
    cards: Vec<Card>,
    /// Revealed but unresolved cards, in reveal order
    revealed: Vec<usize>,
    pending: Option<PendingPair>,
    matches: u32,
    moves: u32,
    rng_state: RngState,
    rng: Pcg32,
    input: InputAdapter,
    paused: bool,
}

impl MemoryMatch {
    pub fn new(pairs: usize, duration_secs: u32, seed: u64) -> Self {
        let pairs = pairs.clamp(1, FACES.len());
        let rng_state = RngState::new(seed);
        let mut game = Self {
            pairs,
            session: Session::new(SessionConfig {
                duration_secs: Some(duration_secs),
                meter_start: 0.0,
                meter_fail: None,
                win_score: None,
            }),
            cards: Vec::new(),
            revealed: Vec::new(),
            pending: None,
            matches: 0,
            moves: 0,
            rng: rng_state.to_rng(),
            rng_state,
            input: InputAdapter::new(InputMode::Tap, Rect::percent()),
            paused: false,
        };
        game.deal();
        game
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    /// A pair is revealed and waiting for its delay
    pub fn is_resolving(&self) -> bool {
        self.pending.is_some()
    }

    fn deal(&mut self) {
        self.cards = (0..self.pairs)
            .flat_map(|face| {
                let card = Card {
                    face: face as u8,
                    state: CardState::Hidden,
                };
                [card, card]
            })
            .collect();
        self.cards.shuffle(&mut self.rng);
        self.revealed.clear();
        self.pending = None;
        self.matches = 0;
        self.moves = 0;
    }

    fn grid(&self) -> (usize, usize) {
        let count = self.cards.len().max(1);
        let cols = (count as f32).sqrt().ceil() as usize;
        (cols, count.div_ceil(cols))
    }

    /// Where card `index` sits in percent space
    pub fn card_rect(&self, index: usize) -> Rect {
        let (cols, rows) = self.grid();
        let span = 100.0 - 2.0 * GRID_MARGIN;
        let w = (span - GRID_GAP * (cols - 1) as f32) / cols as f32;
        let h = (span - GRID_GAP * (rows - 1) as f32) / rows as f32;
        let (col, row) = ((index % cols) as f32, (index / cols) as f32);
        let min = Vec2::new(
            GRID_MARGIN + col * (w + GRID_GAP),
            GRID_MARGIN + row * (h + GRID_GAP),
        );
        Rect::new(min, min + Vec2::new(w, h))
    }

    pub fn card_at(&self, point: Vec2) -> Option<usize> {
        (0..self.cards.len()).find(|&i| self.card_rect(i).contains(point))
    }

    /// Turn a face-down card over
    ///
    /// Ignored unless the session is running, the card is hidden and no pair
    /// is waiting to resolve.
    pub fn reveal(&mut self, index: usize) -> bool {
        if !self.session.is_active() || self.paused || self.pending.is_some() {
            return false;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if card.state != CardState::Hidden {
            return false;
        }
        card.state = CardState::Revealed;
        self.revealed.push(index);

        if let [first, second] = self.revealed[..] {
            let matched = self.cards[first].face == self.cards[second].face;
            let delay = if matched {
                MATCH_DELAY_SECS
            } else {
                MISMATCH_DELAY_SECS
            };
            self.moves += 1;
            self.pending = Some(PendingPair {
                first,
                second,
                matched,
                due: self.session.elapsed_ticks() + secs_to_ticks(delay),
            });
        }
        true
    }

    fn resolve_pending(&mut self, events: &mut Vec<GameEvent>) {
        let Some(pair) = self.pending else {
            return;
        };
        if self.session.elapsed_ticks() < pair.due {
            return;
        }
        self.pending = None;
        self.revealed.clear();

        let state = if pair.matched {
            CardState::Matched
        } else {
            CardState::Hidden
        };
        self.cards[pair.first].state = state;
        self.cards[pair.second].state = state;

        let (first, second) = (pair.first, pair.second);
        if pair.matched {
            self.matches += 1;
            let left = u64::from(self.session.time_remaining().unwrap_or(0));
            self.session.add_score(MATCH_POINTS + left);
            events.push(GameEvent::Paired { first, second });
            if self.matches as usize == self.pairs {
                self.session.mark_cleared();
            }
        } else {
            events.push(GameEvent::Mismatched { first, second });
        }
    }

    fn reward_for(&self, reason: TerminationReason) -> u32 {
        let left = i64::from(self.session.time_remaining().unwrap_or(0));
        match reason {
            TerminationReason::Win => {
                (200 + 5 * left - 2 * i64::from(self.moves)).max(100) as u32
            }
            TerminationReason::Time => {
                20 * self.matches + 2 * self.session.elapsed_secs()
            }
            _ => 0,
        }
    }
}

impl ArcadeGame for MemoryMatch {
    fn id(&self) -> GameId {
        GameId::MemoryMatch
    }

    fn start(&mut self) {
        self.rng_state.runs += 1;
        self.rng = self.rng_state.to_rng();
        self.deal();
        self.paused = false;
        self.input.release_all();
        self.input.snapshot();
        self.session.start();
        log::info!("memory-match started ({} pairs)", self.pairs);
    }

    fn reset(&mut self) {
        self.deal();
        self.paused = false;
        self.session.reset();
    }

    fn abort(&mut self) {
        self.session.abort();
    }

    fn session(&self) -> &Session {
        &self.session
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
        let mut events = Vec::new();
        let input = self.input.snapshot();
        if input.pause && self.session.is_active() {
            self.set_paused(!self.paused);
        }
        if self.paused || !self.session.is_active() {
            return events;
        }

        self.session.advance_tick(TICKS_PER_SECOND);

        if let Some(card) = input
            .activate_at
            .filter(|_| input.activate)
            .and_then(|at| self.card_at(at))
        {
            if self.reveal(card) {
                events.push(GameEvent::Revealed { card });
            }
        }

        self.resolve_pending(&mut events);

        if let Some(reason) = self.session.check_termination() {
            let reward = self.reward_for(reason);
            if self.session.complete(reason, |_| reward).is_some() {
                events.push(GameEvent::Ended { reason });
            }
        }
        events
    }

    fn draw(&self) -> DrawList {
        let mut list = DrawList::new(Rect::percent());
        list.clear(Color::rgb(0x1e3a8a));
        for (i, card) in self.cards.iter().enumerate() {
            let rect = self.card_rect(i);
            match card.state {
                CardState::Hidden => {
                    list.rect(rect, Color::rgb(0x3b82f6));
                    list.text(rect.center(), "?", 6.0, Color::WHITE);
                }
                CardState::Revealed => {
                    list.glyph(rect, card.glyph(), Shape::Rect, Color::WHITE);
                }
                CardState::Matched => {
                    list.glyph(rect, card.glyph(), Shape::Rect, Color::rgb(0x86efac));
                }
            }
        }
        list.hud("score", "Score", self.session.score());
        list.hud(
            "time",
            "Time",
            format!("{}s", self.session.time_remaining().unwrap_or(0)),
        );
        list.hud("moves", "Moves", self.moves);
        list.hud("matches", "Pairs", format!("{}/{}", self.matches, self.pairs));
        list
    }

    fn take_reward(&mut self) -> Option<u32> {
        self.session.take_reward()
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_paused(&mut self, paused: bool) {
        if paused != self.paused {
            log::info!("memory-match {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }
}
