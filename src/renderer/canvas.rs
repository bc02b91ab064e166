//! Canvas 2D painter for draw lists

use std::collections::HashMap;
use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{Color, DrawCmd, DrawList, Shape};
use crate::Rect;

/// Paints `DrawList`s onto a canvas, scaling world units to pixels
pub struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: HashMap<&'static str, HtmlImageElement>,
}

impl CanvasPainter {
    /// Returns `None` when the canvas has no 2D context
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self {
            canvas,
            ctx,
            images: HashMap::new(),
        })
    }

    /// Match the backing store to the element size and device pixel ratio
    pub fn resize(&self, dpr: f64) {
        let width = (f64::from(self.canvas.client_width()) * dpr) as u32;
        let height = (f64::from(self.canvas.client_height()) * dpr) as u32;
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            log::debug!("Canvas resized to {}x{}", width, height);
        }
    }

    /// Start loading an image; sprites use their fallback until it arrives
    pub fn preload(&mut self, src: &'static str) {
        if self.images.contains_key(src) {
            return;
        }
        match HtmlImageElement::new() {
            Ok(img) => {
                img.set_src(src);
                self.images.insert(src, img);
            }
            Err(e) => log::warn!("Could not create image for {src}: {e:?}"),
        }
    }

    fn loaded(&self, src: &str) -> Option<&HtmlImageElement> {
        self.images
            .get(src)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    pub fn paint(&self, list: &DrawList) {
        let size = list.world.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let sx = f64::from(self.canvas.width()) / f64::from(size.x);
        let sy = f64::from(self.canvas.height()) / f64::from(size.y);
        let ctx = &self.ctx;
        let _ = ctx.set_transform(
            sx,
            0.0,
            0.0,
            sy,
            -f64::from(list.world.min.x) * sx,
            -f64::from(list.world.min.y) * sy,
        );

        for cmd in &list.cmds {
            match cmd {
                DrawCmd::Clear(color) => {
                    ctx.set_fill_style_str(&color.to_css());
                    self.fill_rect(&list.world);
                }
                DrawCmd::Rect { rect, color } => {
                    ctx.set_fill_style_str(&color.to_css());
                    self.fill_rect(rect);
                }
                DrawCmd::Circle {
                    center,
                    radius,
                    color,
                } => {
                    ctx.set_fill_style_str(&color.to_css());
                    self.fill_circle(f64::from(center.x), f64::from(center.y), f64::from(*radius));
                }
                DrawCmd::Text {
                    pos,
                    text,
                    size,
                    color,
                } => {
                    self.text(text, f64::from(pos.x), f64::from(pos.y), *size, *color);
                }
                DrawCmd::Sprite {
                    rect,
                    image,
                    glyph,
                    fallback,
                    color,
                } => {
                    if let Some(img) = image.and_then(|src| self.loaded(src)) {
                        let s = rect.size();
                        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                            img,
                            f64::from(rect.min.x),
                            f64::from(rect.min.y),
                            f64::from(s.x),
                            f64::from(s.y),
                        );
                        continue;
                    }
                    ctx.set_fill_style_str(&color.to_css());
                    match fallback {
                        Shape::Rect => self.fill_rect(rect),
                        Shape::Circle => {
                            let c = rect.center();
                            let r = rect.size().min_element() * 0.5;
                            self.fill_circle(f64::from(c.x), f64::from(c.y), f64::from(r));
                        }
                    }
                    if let Some(glyph) = glyph {
                        let c = rect.center();
                        let h = rect.size().y * 0.8;
                        self.text(glyph, f64::from(c.x), f64::from(c.y), h, Color::WHITE);
                    }
                }
            }
        }

        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
    }

    fn fill_rect(&self, rect: &Rect) {
        let s = rect.size();
        self.ctx.fill_rect(
            f64::from(rect.min.x),
            f64::from(rect.min.y),
            f64::from(s.x),
            f64::from(s.y),
        );
    }

    fn fill_circle(&self, x: f64, y: f64, r: f64) {
        self.ctx.begin_path();
        if self.ctx.arc(x, y, r.max(0.0), 0.0, TAU).is_ok() {
            self.ctx.fill();
        }
    }

    fn text(&self, text: &str, x: f64, y: f64, size: f32, color: Color) {
        let ctx = &self.ctx;
        ctx.set_font(&format!("{:.1}px sans-serif", size.max(1.0)));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.set_fill_style_str(&color.to_css());
        let _ = ctx.fill_text(text, x, y);
    }
}
