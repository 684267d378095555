use std::io::{self, Stdout, Write, stdout};

use crossterm::{cursor, execute, terminal};

use super::font::{self, GLYPH_H};
use super::{PixelBuf, Rect, Rgb, SHADOW, Surface, TextSize};
use crate::assets::Sprite;
use crate::error::{Error, Result};

/// Raw mode + alternate screen for as long as it lives.
pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().map_err(Error::Terminal)?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )
        .map_err(Error::Terminal)?;
        Ok(Self { active: true })
    }

    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            stdout(),
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

/// [`Surface`] backed by a [`PixelBuf`] the size of the terminal. Logical
/// coordinates are stretched independently on each axis to fill it.
pub struct TerminalSurface<W: Write = Stdout> {
    buf: PixelBuf,
    out: W,
    logical_w: f64,
    logical_h: f64,
}

impl TerminalSurface<Stdout> {
    /// Sized to the current terminal.
    pub fn stdout(logical_w: f64, logical_h: f64) -> Result<Self> {
        let (cols, rows) = terminal::size().map_err(Error::Terminal)?;
        Ok(Self::new(stdout(), cols, rows, logical_w, logical_h))
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, cols: u16, rows: u16, logical_w: f64, logical_h: f64) -> Self {
        Self {
            buf: PixelBuf::new(cols as usize, rows as usize * 2),
            out,
            logical_w,
            logical_h,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf.resize(cols as usize, rows as usize * 2);
    }

    pub fn pixels(&self) -> &PixelBuf {
        &self.buf
    }

    fn scale(&self) -> (f64, f64) {
        (
            self.buf.width() as f64 / self.logical_w,
            self.buf.height() as f64 / self.logical_h,
        )
    }

    fn to_device(&self, x: f64, y: f64) -> (i32, i32) {
        let (sx, sy) = self.scale();
        ((x * sx).round() as i32, (y * sy).round() as i32)
    }

    /// Device-space rectangle, at least one pixel on each side.
    fn device_rect(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let (x0, y0) = self.to_device(rect.x, rect.y);
        let (x1, y1) = self.to_device(rect.x + rect.w, rect.y + rect.h);
        (x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))
    }

    fn glyph_scale(&self, size: TextSize) -> i32 {
        match size {
            TextSize::Small => 1,
            TextSize::Large if self.buf.width() >= 160 => 2,
            TextSize::Large => 1,
        }
    }

    fn text(&mut self, text: &str, x: i32, y: i32, size: TextSize, color: Rgb) {
        let scale = self.glyph_scale(size);
        let buf = &mut self.buf;
        if size == TextSize::Large {
            font::for_each_pixel(text, x + 1, y + 1, scale, |px, py| buf.set(px, py, SHADOW));
        }
        font::for_each_pixel(text, x, y, scale, |px, py| buf.set(px, py, color));
    }
}

impl<W: Write> Surface for TerminalSurface<W> {
    fn size(&self) -> (f64, f64) {
        (self.logical_w, self.logical_h)
    }

    fn clear(&mut self, color: Rgb) {
        self.buf.fill(color);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (x, y, w, h) = self.device_rect(rect);
        self.buf.fill_rect(x, y, w, h, color);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let (sx, sy) = self.scale();
        let rx = (radius * sx).max(1.0);
        let ry = (radius * sy).max(1.0);
        let (dcx, dcy) = (cx * sx, cy * sy);
        for py in (dcy - ry).floor() as i32..=(dcy + ry).ceil() as i32 {
            for px in (dcx - rx).floor() as i32..=(dcx + rx).ceil() as i32 {
                let nx = (px as f64 + 0.5 - dcx) / rx;
                let ny = (py as f64 + 0.5 - dcy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.buf.set(px, py, color);
                }
            }
        }
    }

    fn blit(&mut self, sprite: &Sprite, dest: Rect) {
        let (x0, y0, w, h) = self.device_rect(dest);
        for dy in 0..h {
            let v = (dy as u64 * sprite.height() as u64 / h as u64) as u32;
            for dx in 0..w {
                let u = (dx as u64 * sprite.width() as u64 / w as u64) as u32;
                let (color, alpha) = sprite.pixel(u, v);
                if alpha > 0 {
                    self.buf.blend(x0 + dx, y0 + dy, color, alpha);
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, cx: f64, y: f64, size: TextSize, color: Rgb) {
        let scale = self.glyph_scale(size);
        let (dcx, dy) = self.to_device(cx, y);
        let x = dcx - font::text_width(text, scale) / 2;
        self.text(text, x, dy, size, color);
    }

    fn draw_text_at(&mut self, text: &str, x: f64, y: f64, size: TextSize, color: Rgb) {
        let (dx, dy) = self.to_device(x, y);
        // Keep text anchored near the bottom edge fully on screen.
        let max_y = self.buf.height() as i32 - GLYPH_H * self.glyph_scale(size);
        self.text(text, dx, dy.min(max_y), size, color);
    }

    fn present(&mut self) -> Result<()> {
        self.buf.render(&mut self.out).map_err(Error::Terminal)
    }
}
