//! Rendering module
//!
//! Games describe a frame as a `DrawList` in world units; the Canvas 2D
//! painter (wasm only) scales it onto the page. Building the list is pure so
//! it can be inspected in tests.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasPainter;

use glam::Vec2;
use serde::Serialize;

use crate::Rect;
use crate::sim::{Entity, Player, Rules, Session};

/// RGBA colour packed as 0xRRGGBBAA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color::rgb(0x000000);
    pub const WHITE: Color = Color::rgb(0xffffff);

    /// Opaque colour from 0xRRGGBB
    pub const fn rgb(hex: u32) -> Self {
        Color((hex << 8) | 0xff)
    }

    pub const fn with_alpha(self, alpha: u8) -> Self {
        Color((self.0 & 0xffff_ff00) | alpha as u32)
    }

    /// CSS colour string for the canvas
    pub fn to_css(self) -> String {
        let [r, g, b, a] = self.0.to_be_bytes();
        format!("rgba({r},{g},{b},{:.3})", f32::from(a) / 255.0)
    }
}

/// Plain shape a sprite falls back to when its image is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    Rect,
    Circle,
}

/// One drawing operation in world units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCmd {
    Clear(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        pos: Vec2,
        text: String,
        /// Font size in world units
        size: f32,
        color: Color,
    },
    /// Image (or emoji glyph) with a solid fallback
    Sprite {
        rect: Rect,
        image: Option<&'static str>,
        glyph: Option<String>,
        fallback: Shape,
        color: Color,
    },
}

/// One HUD value (score, stress, time left, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudItem {
    /// DOM id suffix: `hud-{key}`
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Everything needed to paint one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawList {
    /// World space the commands are expressed in
    pub world: Rect,
    pub cmds: Vec<DrawCmd>,
    pub hud: Vec<HudItem>,
}

impl DrawList {
    pub fn new(world: Rect) -> Self {
        Self {
            world,
            cmds: Vec::new(),
            hud: Vec::new(),
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.cmds.push(DrawCmd::Clear(color));
    }

    pub fn rect(&mut self, rect: Rect, color: Color) {
        self.cmds.push(DrawCmd::Rect { rect, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: Color) {
        self.cmds.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size,
            color,
        });
    }

    /// Emoji/text sprite drawn over a coloured fallback shape
    pub fn glyph(&mut self, rect: Rect, glyph: impl Into<String>, fallback: Shape, color: Color) {
        self.cmds.push(DrawCmd::Sprite {
            rect,
            image: None,
            glyph: Some(glyph.into()),
            fallback,
            color,
        });
    }

    /// Image sprite; painted as `fallback` until the image has loaded
    pub fn image(&mut self, rect: Rect, image: &'static str, fallback: Shape, color: Color) {
        self.cmds.push(DrawCmd::Sprite {
            rect,
            image: Some(image),
            glyph: None,
            fallback,
            color,
        });
    }

    pub fn hud(&mut self, key: &'static str, label: &'static str, value: impl ToString) {
        self.hud.push(HudItem {
            key,
            label,
            value: value.to_string(),
        });
    }

    /// HUD value by key
    pub fn hud_value(&self, key: &str) -> Option<&str> {
        self.hud.iter().find(|h| h.key == key).map(|h| h.value.as_str())
    }
}

/// How a game looks; paired with its `Rules`
pub trait Paint: Rules {
    /// Background and static scenery
    fn backdrop(&self, list: &mut DrawList) {
        list.clear(Color::rgb(0x1e1e2e));
    }

    fn entity(&self, entity: &Entity<Self::Kind>, list: &mut DrawList);

    fn player(&self, player: &Player, list: &mut DrawList);

    /// HUD lines; score is always first
    fn hud(&self, session: &Session, list: &mut DrawList) {
        list.hud("score", "Score", session.score());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css() {
        assert_eq!(Color::rgb(0xff8000).to_css(), "rgba(255,128,0,1.000)");
        assert_eq!(Color::BLACK.with_alpha(0).to_css(), "rgba(0,0,0,0.000)");
    }

    #[test]
    fn test_hud_lookup() {
        let mut list = DrawList::new(Rect::percent());
        list.hud("score", "Score", 40);
        list.hud("stress", "Stress", "55%");
        assert_eq!(list.hud_value("stress"), Some("55%"));
        assert_eq!(list.hud_value("time"), None);
    }
}
