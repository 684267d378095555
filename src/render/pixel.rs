use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use super::Rgb;

/// Pixel buffer rendered with half-block characters: each terminal cell
/// shows two vertically stacked pixels (foreground = top, background =
/// bottom), so the pixel height is twice the row count.
pub struct PixelBuf {
    w: usize,
    h: usize,
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![Rgb(0, 0, 0); w * h],
        }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, Rgb(0, 0, 0));
    }

    pub fn fill(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    /// Blend `c` over the existing pixel; `alpha` is 0..=255.
    pub fn blend(&mut self, x: i32, y: i32, c: Rgb, alpha: u8) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            let i = y as usize * self.w + x as usize;
            self.px[i] = Rgb::lerp(self.px[i], c, alpha as u16 + (alpha >> 7) as u16);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.w as i32);
        let y1 = (y + h).min(self.h as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.px[py as usize * self.w + px as usize] = c;
            }
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut fg: Option<Rgb> = None;
        let mut bg: Option<Rgb> = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    set_background(out, &mut bg, top)?;
                    queue!(out, style::Print(' '))?;
                } else {
                    if fg != Some(top) {
                        queue!(out, style::SetForegroundColor(term_color(top)))?;
                        fg = Some(top);
                    }
                    set_background(out, &mut bg, bot)?;
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                fg = None;
                bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

fn set_background(out: &mut impl Write, current: &mut Option<Rgb>, c: Rgb) -> io::Result<()> {
    if *current != Some(c) {
        queue!(out, style::SetBackgroundColor(term_color(c)))?;
        *current = Some(c);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, Rgb(1, 1, 1));
        buf.set(4, 0, Rgb(1, 1, 1));
        buf.set(1, 2, Rgb(9, 9, 9));
        assert_eq!(buf.get(1, 2), Rgb(9, 9, 9));
        assert!(buf.px.iter().filter(|&&p| p == Rgb(1, 1, 1)).count() == 0);
    }

    #[test]
    fn fill_rect_clips() {
        let mut buf = PixelBuf::new(4, 4);
        buf.fill_rect(-2, -2, 4, 4, Rgb(5, 5, 5));
        assert_eq!(buf.get(0, 0), Rgb(5, 5, 5));
        assert_eq!(buf.get(1, 1), Rgb(5, 5, 5));
        assert_eq!(buf.get(2, 2), Rgb(0, 0, 0));
    }

    #[test]
    fn blend_full_and_none() {
        let mut buf = PixelBuf::new(1, 1);
        buf.blend(0, 0, Rgb(255, 255, 255), 0);
        assert_eq!(buf.get(0, 0), Rgb(0, 0, 0));
        buf.blend(0, 0, Rgb(255, 255, 255), 255);
        assert_eq!(buf.get(0, 0), Rgb(255, 255, 255));
    }

    #[test]
    fn renders_half_blocks() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, Rgb(255, 0, 0));
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('\u{2580}'));
        assert!(text.contains(' '));
    }
}
