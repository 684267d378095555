//! Drawing primitives.
//!
//! Game code draws in logical playfield coordinates (400×600 by default) on
//! a [`Surface`]. [`TerminalSurface`] rasterizes onto a half-block pixel
//! buffer sized to the terminal.

mod font;
mod pixel;
mod terminal;

pub use font::{GLYPH_H, GLYPH_W, text_width};
pub use pixel::PixelBuf;
pub use terminal::{TerminalGuard, TerminalSurface};

use serde::Deserialize;

use crate::assets::Sprite;
use crate::error::Result;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Blend from `a` to `b`; `t_256` runs from 0 (all `a`) to 256 (all `b`).
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const LIGHT_GREY: Rgb = Rgb(200, 200, 200);
pub const RED: Rgb = Rgb(200, 0, 0);
pub const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Geometry ────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Large,
}

/// A 2D target the game draws on once per tick, then presents.
pub trait Surface {
    /// Logical size of the playfield.
    fn size(&self) -> (f64, f64);

    fn clear(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb);

    /// Draw `sprite` stretched over `dest`, blending by its alpha.
    fn blit(&mut self, sprite: &Sprite, dest: Rect);

    /// Text horizontally centred on `cx`, top edge at `y`.
    fn draw_text(&mut self, text: &str, cx: f64, y: f64, size: TextSize, color: Rgb);

    /// Text with its left edge at `x`.
    fn draw_text_at(&mut self, text: &str, x: f64, y: f64, size: TextSize, color: Rgb);

    fn present(&mut self) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Clear(Rgb),
        Rect(Rect, Rgb),
        Circle { cx: f64, cy: f64, radius: f64 },
        Blit(Rect),
        Text(String, Rgb),
        Present,
    }

    /// Surface that remembers what was drawn.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    DrawOp::Text(t, _) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn has_text(&self, needle: &str) -> bool {
            self.texts().iter().any(|t| t.contains(needle))
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (f64, f64) {
            (400.0, 600.0)
        }

        fn clear(&mut self, color: Rgb) {
            self.ops.push(DrawOp::Clear(color));
        }

        fn fill_rect(&mut self, rect: Rect, color: Rgb) {
            self.ops.push(DrawOp::Rect(rect, color));
        }

        fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, _color: Rgb) {
            self.ops.push(DrawOp::Circle { cx, cy, radius });
        }

        fn blit(&mut self, _sprite: &Sprite, dest: Rect) {
            self.ops.push(DrawOp::Blit(dest));
        }

        fn draw_text(&mut self, text: &str, _cx: f64, _y: f64, _size: TextSize, color: Rgb) {
            self.ops.push(DrawOp::Text(text.to_string(), color));
        }

        fn draw_text_at(&mut self, text: &str, _x: f64, _y: f64, _size: TextSize, color: Rgb) {
            self.ops.push(DrawOp::Text(text.to_string(), color));
        }

        fn present(&mut self) -> Result<()> {
            self.ops.push(DrawOp::Present);
            Ok(())
        }
    }
}
