//! 3×5 bitmap font: digits, upper-case letters and a little punctuation.
//! Lower-case input is drawn upper-case; anything else is blank.

pub const GLYPH_W: i32 = 3;
pub const GLYPH_H: i32 = 5;
/// Horizontal advance per character, in glyph pixels.
const ADVANCE: i32 = GLYPH_W + 1;

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
const LETTERS: [[u8; 15]; 26] = [
    [0,1,0, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // A
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,1,0], // B
    [0,1,1, 1,0,0, 1,0,0, 1,0,0, 0,1,1], // C
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,1,0], // D
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1], // E
    [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,0,0], // F
    [0,1,1, 1,0,0, 1,0,1, 1,0,1, 0,1,1], // G
    [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1], // H
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 1,1,1], // I
    [0,0,1, 0,0,1, 0,0,1, 1,0,1, 0,1,0], // J
    [1,0,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // K
    [1,0,0, 1,0,0, 1,0,0, 1,0,0, 1,1,1], // L
    [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1], // M
    [1,1,0, 1,0,1, 1,0,1, 1,0,1, 1,0,1], // N
    [0,1,0, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // O
    [1,1,0, 1,0,1, 1,1,0, 1,0,0, 1,0,0], // P
    [0,1,0, 1,0,1, 1,0,1, 1,1,0, 0,1,1], // Q
    [1,1,0, 1,0,1, 1,1,0, 1,0,1, 1,0,1], // R
    [0,1,1, 1,0,0, 0,1,0, 0,0,1, 1,1,0], // S
    [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0], // T
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // U
    [1,0,1, 1,0,1, 1,0,1, 1,0,1, 0,1,0], // V
    [1,0,1, 1,0,1, 1,1,1, 1,1,1, 1,0,1], // W
    [1,0,1, 1,0,1, 0,1,0, 1,0,1, 1,0,1], // X
    [1,0,1, 1,0,1, 0,1,0, 0,1,0, 0,1,0], // Y
    [1,1,1, 0,0,1, 0,1,0, 1,0,0, 1,1,1], // Z
];

#[rustfmt::skip]
const COLON: [u8; 15] = [0,0,0, 0,1,0, 0,0,0, 0,1,0, 0,0,0];
#[rustfmt::skip]
const DASH:  [u8; 15] = [0,0,0, 0,0,0, 1,1,1, 0,0,0, 0,0,0];
#[rustfmt::skip]
const DOT:   [u8; 15] = [0,0,0, 0,0,0, 0,0,0, 0,0,0, 0,1,0];
#[rustfmt::skip]
const BANG:  [u8; 15] = [0,1,0, 0,1,0, 0,1,0, 0,0,0, 0,1,0];

pub(crate) fn glyph(ch: char) -> Option<&'static [u8; 15]> {
    match ch.to_ascii_uppercase() {
        d @ '0'..='9' => Some(&DIGITS[(d as u8 - b'0') as usize]),
        c @ 'A'..='Z' => Some(&LETTERS[(c as u8 - b'A') as usize]),
        ':' => Some(&COLON),
        '-' => Some(&DASH),
        '.' => Some(&DOT),
        '!' => Some(&BANG),
        _ => None,
    }
}

/// Width in device pixels of `text` drawn at `scale` device pixels per glyph
/// pixel.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - 1) * scale
    }
}

/// Walk the lit pixels of `text` laid out from `(x, y)`, each glyph pixel a
/// `scale`×`scale` block.
pub(crate) fn for_each_pixel(
    text: &str,
    x: i32,
    y: i32,
    scale: i32,
    mut put: impl FnMut(i32, i32),
) {
    for (i, ch) in text.chars().enumerate() {
        let Some(bits) = glyph(ch) else { continue };
        let gx = x + i as i32 * ADVANCE * scale;
        for row in 0..GLYPH_H {
            for col in 0..GLYPH_W {
                if bits[(row * GLYPH_W + col) as usize] == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        put(gx + col * scale + dx, y + row * scale + dy);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("7", 1), 3);
        assert_eq!(text_width("42", 1), 7);
        assert_eq!(text_width("42", 2), 14);
    }

    #[test]
    fn case_insensitive_and_blank_for_unknown() {
        assert_eq!(glyph('a'), glyph('A'));
        assert!(glyph(' ').is_none());
        assert!(glyph('~').is_none());
    }

    #[test]
    fn pixels_stay_inside_the_text_box() {
        let mut count = 0;
        for_each_pixel("GAME OVER", 10, 20, 2, |x, y| {
            count += 1;
            assert!(x >= 10 && x < 10 + text_width("GAME OVER", 2));
            assert!(y >= 20 && y < 20 + GLYPH_H * 2);
        });
        assert!(count > 0);
    }
}
