//! Input adapter: device events in, per-tick intents out
//!
//! Mouse, touch and keyboard events are folded into a `TickInput` that the
//! loop reads once per tick.

use std::collections::{BTreeSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;

/// Logical keys the games care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Space / Enter
    Action,
    /// Escape
    Pause,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Key> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "ArrowUp" | "w" | "W" => Some(Key::Up),
            "ArrowDown" | "s" | "S" => Some(Key::Down),
            " " | "Space" | "Spacebar" | "Enter" => Some(Key::Action),
            "Escape" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Discrete direction command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn from_key(key: Key) -> Option<Direction> {
        match key {
            Key::Left => Some(Direction::Left),
            Key::Right => Some(Direction::Right),
            Key::Up => Some(Direction::Up),
            Key::Down => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_vec(&self) -> Vec2 {
        match self {
            Direction::Left => Vec2::NEG_X,
            Direction::Right => Vec2::X,
            Direction::Up => Vec2::NEG_Y,
            Direction::Down => Vec2::Y,
        }
    }
}

/// How a game consumes input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Player follows the pointer (drag-to-follow)
    Follow,
    /// One discrete step per key press or touch button
    Lanes,
    /// Held keys steer continuously, Action triggers once per press
    Hold,
    /// Clicks/taps activate whatever is under the pointer
    Tap,
}

/// Raw device event, in surface pixel coordinates for pointers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Mouse move or touch move
    PointerMove { x: f32, y: f32 },
    /// Mouse down or touch start
    PointerDown { x: f32, y: f32 },
    KeyDown(Key),
    KeyUp(Key),
    /// On-screen direction button (touch controls)
    Button(Direction),
}

/// Intents for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Latest pointer position in world space
    pub target: Option<Vec2>,
    /// Discrete step command (one per press)
    pub step: Option<Direction>,
    /// Continuous steering axis from held keys, components in -1..=1
    pub axis: Vec2,
    /// One-shot activate (click/tap/space)
    pub activate: bool,
    /// Where the activation happened, for tap games
    pub activate_at: Option<Vec2>,
    /// Pause toggle
    pub pause: bool,
}

/// Folds device events into `TickInput`
#[derive(Debug, Clone)]
pub struct InputAdapter {
    mode: InputMode,
    world: Rect,
    /// Surface size in pixels
    surface: Vec2,
    held: BTreeSet<Key>,
    /// Unconsumed step presses, one released per tick
    steps: VecDeque<Direction>,
    pending: TickInput,
}

impl InputAdapter {
    /// Presses beyond this between ticks are dropped
    const MAX_QUEUED_STEPS: usize = 4;

    pub fn new(mode: InputMode, world: Rect) -> Self {
        Self {
            mode,
            world,
            surface: world.size(),
            held: BTreeSet::new(),
            steps: VecDeque::new(),
            pending: TickInput::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Update the on-screen size of the play surface
    pub fn set_surface(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.surface = Vec2::new(width, height);
        }
    }

    /// Surface pixels to world space, clamped to the play area
    pub fn to_world(&self, x: f32, y: f32) -> Vec2 {
        let x = if x.is_finite() { x } else { 0.0 };
        let y = if y.is_finite() { y } else { 0.0 };
        let frac = Vec2::new(x, y) / self.surface.max(Vec2::ONE);
        self.world.clamp(self.world.min + frac * self.world.size())
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Feed one device event
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.pending.target = Some(self.to_world(x, y));
            }
            InputEvent::PointerDown { x, y } => {
                let at = self.to_world(x, y);
                self.pending.target = Some(at);
                if matches!(self.mode, InputMode::Tap | InputMode::Hold) {
                    self.pending.activate = true;
                    self.pending.activate_at = Some(at);
                }
            }
            InputEvent::KeyDown(key) => {
                // Auto-repeat: already held keys never re-trigger one-shots
                if !self.held.insert(key) {
                    return;
                }
                match key {
                    Key::Pause => self.pending.pause = true,
                    Key::Action => {
                        self.pending.activate = true;
                    }
                    _ => {
                        if self.mode == InputMode::Lanes {
                            if let Some(dir) = Direction::from_key(key) {
                                self.queue_step(dir);
                            }
                        }
                    }
                }
            }
            InputEvent::KeyUp(key) => {
                self.held.remove(&key);
            }
            InputEvent::Button(dir) => self.queue_step(dir),
        }
    }

    fn queue_step(&mut self, dir: Direction) {
        if self.steps.len() < Self::MAX_QUEUED_STEPS {
            self.steps.push_back(dir);
        }
    }

    /// Drop held keys and queued steps (e.g. on window blur)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.steps.clear();
    }

    fn axis(&self) -> Vec2 {
        if self.mode != InputMode::Hold {
            return Vec2::ZERO;
        }
        let mut axis = Vec2::ZERO;
        for key in &self.held {
            if let Some(dir) = Direction::from_key(*key) {
                axis += dir.as_vec();
            }
        }
        axis.clamp(Vec2::NEG_ONE, Vec2::ONE)
    }

    /// Read this tick's intents; one-shot fields are cleared afterwards
    pub fn snapshot(&mut self) -> TickInput {
        let mut input = self.pending.clone();
        input.axis = self.axis();
        input.step = self.steps.pop_front();

        self.pending.activate = false;
        self.pending.activate_at = None;
        self.pending.pause = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_maps_to_percent_space() {
        let mut input = InputAdapter::new(InputMode::Follow, Rect::percent());
        input.set_surface(400.0, 200.0);
        input.handle(InputEvent::PointerMove { x: 100.0, y: 150.0 });
        assert_eq!(input.snapshot().target, Some(Vec2::new(25.0, 75.0)));
    }

    #[test]
    fn test_pointer_outside_surface_is_clamped() {
        let mut input = InputAdapter::new(InputMode::Follow, Rect::percent());
        input.set_surface(100.0, 100.0);
        input.handle(InputEvent::PointerMove { x: -40.0, y: 9000.0 });
        assert_eq!(input.snapshot().target, Some(Vec2::new(0.0, 100.0)));
        input.handle(InputEvent::PointerMove { x: f32::NAN, y: 50.0 });
        assert_eq!(input.snapshot().target, Some(Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn test_lane_step_once_per_press() {
        let mut input = InputAdapter::new(InputMode::Lanes, Rect::sized(400.0, 600.0));
        input.handle(InputEvent::KeyDown(Key::Left));
        assert_eq!(input.snapshot().step, Some(Direction::Left));
        // held key auto-repeats
        input.handle(InputEvent::KeyDown(Key::Left));
        assert_eq!(input.snapshot().step, None);
        input.handle(InputEvent::KeyUp(Key::Left));
        input.handle(InputEvent::KeyDown(Key::Left));
        assert_eq!(input.snapshot().step, Some(Direction::Left));
    }

    #[test]
    fn test_quick_presses_carry_over_to_next_tick() {
        let mut input = InputAdapter::new(InputMode::Lanes, Rect::sized(400.0, 600.0));
        for _ in 0..2 {
            input.handle(InputEvent::KeyDown(Key::Left));
            input.handle(InputEvent::KeyUp(Key::Left));
        }
        input.handle(InputEvent::Button(Direction::Right));
        assert_eq!(input.snapshot().step, Some(Direction::Left));
        assert_eq!(input.snapshot().step, Some(Direction::Left));
        assert_eq!(input.snapshot().step, Some(Direction::Right));
        assert_eq!(input.snapshot().step, None);
    }

    #[test]
    fn test_step_queue_is_bounded() {
        let mut input = InputAdapter::new(InputMode::Lanes, Rect::sized(400.0, 600.0));
        for _ in 0..10 {
            input.handle(InputEvent::Button(Direction::Up));
        }
        let steps = (0..10).filter(|_| input.snapshot().step.is_some()).count();
        assert_eq!(steps, 4);
    }

    #[test]
    fn test_hold_gives_continuous_axis() {
        let mut input = InputAdapter::new(InputMode::Hold, Rect::sized(800.0, 400.0));
        input.handle(InputEvent::KeyDown(Key::Right));
        for _ in 0..3 {
            let tick = input.snapshot();
            assert_eq!(tick.axis, Vec2::X);
            assert_eq!(tick.step, None);
        }
        input.handle(InputEvent::KeyDown(Key::Left));
        assert_eq!(input.snapshot().axis, Vec2::ZERO);
    }

    #[test]
    fn test_action_is_one_shot() {
        let mut input = InputAdapter::new(InputMode::Hold, Rect::sized(800.0, 400.0));
        input.handle(InputEvent::KeyDown(Key::Action));
        assert!(input.snapshot().activate);
        input.handle(InputEvent::KeyDown(Key::Action));
        assert!(!input.snapshot().activate);
    }

    #[test]
    fn test_tap_records_position() {
        let mut input = InputAdapter::new(InputMode::Tap, Rect::percent());
        input.set_surface(200.0, 200.0);
        input.handle(InputEvent::PointerDown { x: 20.0, y: 40.0 });
        let tick = input.snapshot();
        assert!(tick.activate);
        assert_eq!(tick.activate_at, Some(Vec2::new(10.0, 20.0)));
        assert!(!input.snapshot().activate);
    }

    #[test]
    fn test_dom_key_mapping() {
        assert_eq!(Key::from_dom("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_dom(" "), Some(Key::Action));
        assert_eq!(Key::from_dom("q"), None);
    }
}
