use std::collections::HashMap;
use std::rc::Rc;

use image::RgbaImage;

// ── DPI smoothing ────────────────────────────────────────────────────────────

/// Quantize a raw device-pixel ratio to a coarse step so continuous zooming
/// cannot mint an unbounded number of buffer-cache keys.
///
/// Ratios below 1 snap to halves, ratios at or above 1 snap to quarters;
/// the result is clamped to `[0.5, 4.0]`. Quantization is idempotent.
pub fn smoothen_dpi(dpi: f32) -> f32 {
    let dpi = dpi.clamp(0.5, 4.0);
    if dpi < 1.0 {
        (dpi * 2.0).round() / 2.0
    } else {
        (dpi * 4.0).round() / 4.0
    }
}

fn dpi_key(dpi: f32) -> u32 {
    (smoothen_dpi(dpi) * 100.0).round() as u32
}

// ── BufferCache ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BufferKey {
    key: String,
    sub_key: String,
    dpi_q: u32,
}

/// Memoized raster surfaces keyed by (semantic key, sub-key, pixel density).
///
/// Used for procedurally painted imagery: color swatches, numeric glyphs.
/// Generation must be a pure function of its parameters — identical
/// parameters must paint identical pixels, since results are reused for the
/// lifetime of the cache. There is no eviction; callers keep the key space
/// bounded (the dpi component is quantized by [`smoothen_dpi`]).
#[derive(Default)]
pub struct BufferCache {
    entries: HashMap<BufferKey, Rc<RgbaImage>>,
}

impl BufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached surface for `(key, sub_key, dpi)`, painting it on
    /// first access.
    ///
    /// On a miss a surface of `round(w·dpi) × round(h·dpi)` pixels is
    /// allocated and `redraw(surface, w, h, dpi)` paints it synchronously;
    /// on a hit `redraw` is not invoked.
    pub fn get_for_key(
        &mut self,
        key: &str,
        sub_key: &str,
        w: u32,
        h: u32,
        dpi: f32,
        redraw: impl FnOnce(&mut RgbaImage, u32, u32, f32),
    ) -> Rc<RgbaImage> {
        let dpi = smoothen_dpi(dpi);
        let entry_key = BufferKey {
            key: key.to_string(),
            sub_key: sub_key.to_string(),
            dpi_q: dpi_key(dpi),
        };
        if let Some(surface) = self.entries.get(&entry_key) {
            return Rc::clone(surface);
        }

        let pw = ((w as f32 * dpi).round() as u32).max(1);
        let ph = ((h as f32 * dpi).round() as u32).max(1);
        let mut surface = RgbaImage::new(pw, ph);
        redraw(&mut surface, w, h, dpi);

        let surface = Rc::new(surface);
        self.entries.insert(entry_key, Rc::clone(&surface));
        surface
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
