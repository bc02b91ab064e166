//! Slap the notification: tap pop-ups before they pile up
//!
//! Every unslapped notification that times out adds burnout.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::renderer::{Color, DrawList, Paint, Shape};
use crate::settings::DifficultyPreset;
use crate::sim::{
    Boundary, DifficultyBasis, DifficultyCurve, Effect, Entity, EntitySpec, Hitbox, InputMode, Placement, Player,
    Rules, Session, SessionConfig, SpawnRoll, SpawnerConfig, TickInput,
};
use crate::{Rect, secs_to_ticks};

const SPAWN_SECS: f32 = 1.2;
const SPAWN_SHRINK_SECS: f32 = 0.1;
const SPAWN_FLOOR_SECS: f32 = 0.5;
const SCORE_PER_LEVEL: u64 = 40;
const LIFETIME_SECS: f32 = 3.0;
/// Minimum distance between live notifications
const MIN_GAP: f32 = 8.0;
const PLACEMENT_RETRIES: u8 = 6;
/// Notifications keep this far from the edges
const EDGE_MARGIN: f32 = 6.0;
/// Tappable size, percent of the play area
const NOTE_SIZE: Vec2 = Vec2::new(14.0, 8.0);

const SLAP_POINTS: i64 = 10;
const SLAP_RELIEF: f32 = -3.0;
const EXPIRE_BURNOUT: f32 = 5.0;
const WIN_SCORE: u64 = 300;
/// Slapped messages shown in the HUD
const RECENT_LEN: usize = 3;

const MESSAGES: [&str; 12] = [
    "Hiiiii 😄",
    "Hey There",
    "Hello Ji",
    "Yo Bro",
    "Salaam Dost",
    "Hy Buddy",
    "Stay Blessed 🙌",
    "Keep Smiling 🙂",
    "Shine Bright",
    "Be Strong 💪",
    "Good Morning 🌞",
    "Start Fresh",
];

/// Where a notification claims to come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Slack,
    WhatsApp,
}

impl Channel {
    fn color(&self) -> Color {
        match self {
            Channel::Email => Color::rgb(0xef4444),
            Channel::Slack => Color::rgb(0xa855f7),
            Channel::WhatsApp => Color::rgb(0x22c55e),
        }
    }
}

/// A pop-up with its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    message: u8,
}

impl Notification {
    pub fn message(&self) -> &'static str {
        MESSAGES[usize::from(self.message) % MESSAGES.len()]
    }
}

#[derive(Debug, Clone)]
pub struct Slapper {
    preset: DifficultyPreset,
    recent: Vec<&'static str>,
}

impl Slapper {
    pub fn new(preset: DifficultyPreset) -> Self {
        Self {
            preset,
            recent: Vec::new(),
        }
    }

    /// Most recently slapped messages, newest first
    pub fn recent(&self) -> &[&'static str] {
        &self.recent
    }
}

impl Rules for Slapper {
    type Kind = Notification;

    fn name(&self) -> &'static str {
        "slapper"
    }

    fn bounds(&self) -> Rect {
        Rect::percent()
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Tap
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: None,
            meter_start: 0.0,
            meter_fail: Some(100.0),
            win_score: Some(WIN_SCORE),
        }
    }

    fn spawner_config(&self) -> SpawnerConfig<Notification> {
        let interval = self.preset.scale_interval(secs_to_ticks(SPAWN_SECS));
        let floor = self.preset.scale_interval(secs_to_ticks(SPAWN_FLOOR_SECS));
        let shrink = secs_to_ticks(SPAWN_SHRINK_SECS);
        SpawnerConfig {
            interval_ticks: interval,
            jitter_ticks: 0,
            min_interval_ticks: floor,
            shrink_per_level: shrink,
            max_population: 32,
            table: vec![
                (
                    Notification {
                        channel: Channel::Email,
                        message: 0,
                    },
                    1,
                ),
                (
                    Notification {
                        channel: Channel::Slack,
                        message: 0,
                    },
                    1,
                ),
                (
                    Notification {
                        channel: Channel::WhatsApp,
                        message: 0,
                    },
                    1,
                ),
            ],
            placement: Placement {
                region: Rect::percent().inset(EDGE_MARGIN),
                min_gap: MIN_GAP,
                retries: PLACEMENT_RETRIES,
            },
            curve: DifficultyCurve {
                basis: DifficultyBasis::Score,
                step: SCORE_PER_LEVEL,
                max_level: (interval.saturating_sub(floor) / shrink.max(1)) as u32,
            },
        }
    }

    fn player_start(&self) -> Player {
        Player::pointer()
    }

    fn reset(&mut self) {
        self.recent.clear();
    }

    fn steer(&mut self, player: &mut Player, input: &TickInput, _dt: f32) {
        if let Some(target) = input.target {
            player.pos = target;
        }
    }

    fn boundary(&self, _kind: &Notification) -> Boundary {
        Boundary::Clamp
    }

    fn build(&mut self, roll: SpawnRoll<Notification>, rng: &mut Pcg32) -> EntitySpec<Notification> {
        let kind = Notification {
            message: rng.random_range(0..MESSAGES.len() as u8),
            ..roll.kind
        };
        EntitySpec::at(kind, roll.pos)
            .with_hitbox(Hitbox::aabb(NOTE_SIZE.x, NOTE_SIZE.y))
            .with_ttl(secs_to_ticks(LIFETIME_SECS) as u32)
    }

    fn on_collision(&mut self, _kind: &Notification, _now: u64) -> Effect {
        // The pointer has no body
        Effect::NONE
    }

    fn on_expire(&mut self, _kind: &Notification, _now: u64) -> Effect {
        Effect::meter(EXPIRE_BURNOUT)
    }

    fn on_tap(&mut self, kind: &Notification, _now: u64) -> Option<Effect> {
        self.recent.insert(0, kind.message());
        self.recent.truncate(RECENT_LEN);
        Some(Effect::score(SLAP_POINTS).and_meter(SLAP_RELIEF))
    }

    fn reward(&self, session: &Session) -> u32 {
        let calm = (100.0 - session.meter()).max(0.0).floor() as u32;
        let points = (session.score() as f64 * 1.5).floor() as u32;
        points.saturating_add(calm)
    }
}

impl Paint for Slapper {
    fn backdrop(&self, list: &mut DrawList) {
        list.clear(Color::rgb(0x0f172a));
    }

    fn entity(&self, entity: &Entity<Notification>, list: &mut DrawList) {
        let rect = Rect::centered(entity.pos, NOTE_SIZE);
        list.rect(rect, entity.kind.channel.color().with_alpha(0x40));
        list.text(entity.pos, entity.kind.message(), 2.5, entity.kind.channel.color());
    }

    fn player(&self, player: &Player, list: &mut DrawList) {
        list.glyph(
            Rect::centered(player.pos, Vec2::splat(6.0)),
            "🖐",
            Shape::Circle,
            Color::rgb(0xfbbf24).with_alpha(0x80),
        );
    }

    fn hud(&self, session: &Session, list: &mut DrawList) {
        list.hud("score", "Score", session.score());
        list.hud("meter", "Burnout", format!("{:.0}%", session.meter()));
        list.hud("recent", "Slapped", self.recent.join(" · "));
    }
}
