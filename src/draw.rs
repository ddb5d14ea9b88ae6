use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::sprite::{AtlasSprite, ResolutionScale, SpriteAtlasLink};

/// World-space edge length of one tile in logical pixels.
pub const TILE_SIZE: f32 = 32.0;

// ── DrawParameters ───────────────────────────────────────────────────────────

/// Per-frame draw parameters supplied by the render surface collaborator.
///
/// `target` is addressed in logical pixels; `dpi` only selects the backing
/// resolution of procedurally generated buffers, which are scaled back down
/// to their logical size when drawn.
pub struct DrawParameters<'a> {
    pub target: &'a mut RgbaImage,
    pub zoom: f32,
    pub dpi: f32,
}

// ── Blitting ─────────────────────────────────────────────────────────────────

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src.0[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = src;
        return;
    }
    let da = 255 - sa;
    for c in 0..3 {
        dst.0[c] = ((src.0[c] as u32 * sa + dst.0[c] as u32 * da) / 255) as u8;
    }
    dst.0[3] = (sa + dst.0[3] as u32 * da / 255).min(255) as u8;
}

/// Copy a source-image region onto `target`, scaled to an arbitrary
/// destination rectangle and clipped to the target bounds.
///
/// Nearest-neighbour sampling, alpha-over blending.
pub fn draw_image_clipped(
    target: &mut RgbaImage,
    src: &RgbaImage,
    src_x: u32,
    src_y: u32,
    src_w: u32,
    src_h: u32,
    dst_x: f32,
    dst_y: f32,
    dst_w: f32,
    dst_h: f32,
) {
    if src_w == 0 || src_h == 0 || dst_w <= 0.0 || dst_h <= 0.0 {
        return;
    }
    let (tw, th) = target.dimensions();

    let x0 = dst_x.floor().max(0.0) as u32;
    let y0 = dst_y.floor().max(0.0) as u32;
    let x1 = ((dst_x + dst_w).ceil().max(0.0) as u32).min(tw);
    let y1 = ((dst_y + dst_h).ceil().max(0.0) as u32).min(th);

    for ty in y0..y1 {
        for tx in x0..x1 {
            // Map the target pixel center back into the source region.
            let u = (tx as f32 + 0.5 - dst_x) / dst_w;
            let v = (ty as f32 + 0.5 - dst_y) / dst_h;
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }
            let sx = src_x + ((u * src_w as f32) as u32).min(src_w - 1);
            let sy = src_y + ((v * src_h as f32) as u32).min(src_h - 1);
            if sx >= src.width() || sy >= src.height() {
                continue;
            }
            let px = *src.get_pixel(sx, sy);
            blend(target.get_pixel_mut(tx, ty), px);
        }
    }
}

/// Draw one atlas link centered at `center`, scaled so the link's logical
/// frame covers `size × size` logical pixels. Pack offsets shift the stored
/// region inside the frame; full-image links have zero offsets.
pub fn draw_link_centered(params: &mut DrawParameters<'_>, link: &SpriteAtlasLink, center: Vec2, size: f32) {
    if link.w == 0 || link.h == 0 {
        return;
    }
    let scale_x = size / link.w as f32;
    let scale_y = size / link.h as f32;
    let dst_x = center.x - size / 2.0 + link.pack_offset_x as f32 * scale_x;
    let dst_y = center.y - size / 2.0 + link.pack_offset_y as f32 * scale_y;
    draw_image_clipped(
        params.target,
        &link.image,
        link.packed_x,
        link.packed_y,
        link.packed_w,
        link.packed_h,
        dst_x,
        dst_y,
        link.packed_w as f32 * scale_x,
        link.packed_h as f32 * scale_y,
    );
}

/// Draw a sprite centered at `center`, picking the resolution tier that
/// matches the current zoom. Valid in every load state — placeholder links
/// draw the same way final content does.
pub fn draw_sprite_centered(params: &mut DrawParameters<'_>, sprite: &AtlasSprite, center: Vec2, size: f32) {
    let scale = ResolutionScale::for_zoom(params.zoom);
    draw_link_centered(params, sprite.link(scale), center, size);
}

/// Draw a generated buffer centered at `center`, scaled down from its
/// dpi-sized backing store to `size × size` logical pixels.
pub fn draw_buffer_centered(params: &mut DrawParameters<'_>, buffer: &RgbaImage, center: Vec2, size: f32) {
    let (bw, bh) = buffer.dimensions();
    draw_image_clipped(
        params.target,
        buffer,
        0,
        0,
        bw,
        bh,
        center.x - size / 2.0,
        center.y - size / 2.0,
        size,
        size,
    );
}

// ── Tests ────────────────────────────────────────────────────────────────────
