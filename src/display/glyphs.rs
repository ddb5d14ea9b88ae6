use image::{Rgba, RgbaImage};

// ── Built-in digit bitmaps ───────────────────────────────────────────────────

const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

/// 3×5 bitmaps for the digits 0-9. One byte per row, bit 2 is the leftmost
/// column. Kept tiny on purpose: numeric mod items only need legible digits
/// at tile scale, not a text stack.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

fn glyph_pixel(digit: usize, gx: u32, gy: u32) -> bool {
    DIGITS[digit][gy as usize] & (1 << (GLYPH_W - 1 - gx)) != 0
}

// ── Numeric painting ─────────────────────────────────────────────────────────

/// Paint `value` in decimal onto a buffer surface, digits side by side,
/// scaled to fill the logical `w × h` area at the given dpi.
///
/// Pure: identical parameters paint identical pixels, as required of buffer
/// generators.
pub fn paint_number(surface: &mut RgbaImage, w: u32, h: u32, dpi: f32, value: u32, color: Rgba<u8>) {
    let digits: Vec<usize> = value
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();

    let pw = ((w as f32 * dpi).round() as u32).min(surface.width());
    let ph = ((h as f32 * dpi).round() as u32).min(surface.height());
    if pw == 0 || ph == 0 {
        return;
    }
    let cell_w = pw / digits.len() as u32;
    if cell_w == 0 {
        return;
    }

    for (i, &digit) in digits.iter().enumerate() {
        let x0 = i as u32 * cell_w;
        for py in 0..ph {
            let gy = (py * GLYPH_H / ph).min(GLYPH_H - 1);
            for px in 0..cell_w {
                let gx = (px * GLYPH_W / cell_w).min(GLYPH_W - 1);
                if glyph_pixel(digit, gx, gy) {
                    surface.put_pixel(x0 + px, py, color);
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn painted(value: u32, w: u32, h: u32, dpi: f32) -> RgbaImage {
        let pw = ((w as f32 * dpi).round() as u32).max(1);
        let ph = ((h as f32 * dpi).round() as u32).max(1);
        let mut surface = RgbaImage::new(pw, ph);
        paint_number(&mut surface, w, h, dpi, value, WHITE);
        surface
    }

    #[test]
    fn every_digit_bitmap_has_five_rows_of_three_columns() {
        for row in DIGITS.iter().flatten() {
            assert!(*row <= 0b111);
        }
    }

    #[test]
    fn painting_writes_some_pixels() {
        let img = painted(8, 12, 12, 1.0);
        assert!(img.pixels().any(|p| p.0[3] != 0));
    }

    #[test]
    fn painting_is_deterministic() {
        let a = painted(255, 24, 12, 2.0);
        let b = painted(255, 24, 12, 2.0);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn different_values_paint_different_pixels() {
        let a = painted(0, 12, 12, 1.0);
        let b = painted(8, 12, 12, 1.0);
        assert_ne!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn eight_fills_its_center_where_zero_does_not() {
        // Row 2 of '0' is 101, of '8' is 111: the middle column differs.
        let zero = painted(0, 12, 20, 1.0);
        let eight = painted(8, 12, 20, 1.0);
        // Logical center maps to glyph (1, 2).
        assert_eq!(zero.get_pixel(6, 10).0[3], 0);
        assert_eq!(*eight.get_pixel(6, 10), WHITE);
    }

    #[test]
    fn zero_sized_request_paints_nothing() {
        let mut surface = RgbaImage::new(4, 4);
        paint_number(&mut surface, 0, 0, 1.0, 7, WHITE);
        assert!(surface.pixels().all(|p| p.0[3] == 0));
    }
}
