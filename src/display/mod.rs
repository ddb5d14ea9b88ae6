pub mod glyphs;

use std::rc::Rc;

use glam::Vec2;
use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::buffer::BufferCache;
use crate::draw::{self, DrawParameters, TILE_SIZE};
use crate::mods::ModItem;

// ── DisplayColor ─────────────────────────────────────────────────────────────

/// Wire-network color values a display can show.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisplayColor {
    /// Sentinel: carries no color, renders as nothing on a display.
    Uncolored,
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Cyan,
    White,
}

impl DisplayColor {
    /// The fixed color a truthy boolean value lights up as.
    pub const LIT: Self = Self::White;

    pub const ALL: [DisplayColor; 8] = [
        Self::Uncolored,
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Purple,
        Self::Cyan,
        Self::White,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Uncolored => "uncolored",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    pub fn rgba(self) -> Rgba<u8> {
        Rgba(match self {
            Self::Uncolored => [170, 170, 170, 255],
            Self::Red => [255, 102, 106, 255],
            Self::Green => [120, 255, 102, 255],
            Self::Blue => [102, 167, 255, 255],
            Self::Yellow => [252, 245, 42, 255],
            Self::Purple => [221, 102, 255, 255],
            Self::Cyan => [135, 255, 245, 255],
            Self::White => [255, 255, 255, 255],
        })
    }
}

// ── NetworkValue ─────────────────────────────────────────────────────────────

/// A shape value draws itself; rendering is delegated to this capability.
pub trait ShapeDraw {
    fn draw_centered(&self, params: &mut DrawParameters<'_>, center: Vec2, diameter: f32);
}

pub type ShapeValue = Rc<dyn ShapeDraw>;

/// The current value carried on a logic-wire group, produced by the external
/// simulation collaborator and consumed read-only here.
///
/// `Custom` carries a mod-contributed item kind; it resolves itself to one of
/// the built-in kinds through [`ModItem::display_value`].
#[derive(Clone)]
pub enum NetworkValue {
    Boolean(bool),
    Color(DisplayColor),
    Shape(ShapeValue),
    Custom(Rc<dyn ModItem>),
}

/// What a display actually renders after value resolution.
#[derive(Clone)]
pub enum DisplayedValue {
    Color(DisplayColor),
    Shape(ShapeValue),
}

#[derive(Debug, Error)]
pub enum DisplayError {
    /// The collaborator supplying network values broke its contract.
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Map a network value to what a display should render, if anything.
///
/// Booleans light up as the fixed [`DisplayColor::LIT`] token when true and
/// render nothing when false; the uncolored sentinel renders nothing; shapes
/// pass through unchanged. Custom mod items resolve through their own
/// [`ModItem::display_value`] hook — an item that resolves to yet another
/// custom item is a contract breach and faults immediately.
pub fn resolve_display_value(value: &NetworkValue) -> Result<Option<DisplayedValue>, DisplayError> {
    match value {
        NetworkValue::Boolean(true) => Ok(Some(DisplayedValue::Color(DisplayColor::LIT))),
        NetworkValue::Boolean(false) => Ok(None),
        NetworkValue::Color(DisplayColor::Uncolored) => Ok(None),
        NetworkValue::Color(color) => Ok(Some(DisplayedValue::Color(*color))),
        NetworkValue::Shape(shape) => Ok(Some(DisplayedValue::Shape(Rc::clone(shape)))),
        NetworkValue::Custom(item) => match item.display_value() {
            None => Ok(None),
            Some(NetworkValue::Custom(_)) => Err(DisplayError::InvariantViolation(
                "mod item resolved its display value to another mod item",
            )),
            Some(inner) => resolve_display_value(&inner),
        },
    }
}

// ── Color swatch generation ──────────────────────────────────────────────────

const SWATCH_SIZE: u32 = 65;
const SWATCH_MARGIN: f32 = 3.0;
const SWATCH_RADIUS: f32 = 3.0;

/// Paint a rounded-rectangle color swatch. Pure: identical parameters always
/// paint identical pixels.
pub fn paint_color_swatch(surface: &mut RgbaImage, w: u32, h: u32, dpi: f32, color: DisplayColor) {
    let rgba = color.rgba();
    let (pw, ph) = surface.dimensions();
    for py in 0..ph {
        for px in 0..pw {
            // Work in logical coordinates so the shape is dpi-independent.
            let lx = (px as f32 + 0.5) / dpi;
            let ly = (py as f32 + 0.5) / dpi;
            if inside_rounded_rect(lx, ly, SWATCH_MARGIN, SWATCH_MARGIN,
                w as f32 - 2.0 * SWATCH_MARGIN,
                h as f32 - 2.0 * SWATCH_MARGIN,
                SWATCH_RADIUS)
            {
                surface.put_pixel(px, py, rgba);
            }
        }
    }
}

fn inside_rounded_rect(x: f32, y: f32, rx: f32, ry: f32, rw: f32, rh: f32, radius: f32) -> bool {
    if x < rx || y < ry || x >= rx + rw || y >= ry + rh {
        return false;
    }
    // Corner circles.
    let cx = x.clamp(rx + radius, rx + rw - radius);
    let cy = y.clamp(ry + radius, ry + rh - radius);
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= radius * radius
}

// ── DisplaySystem ────────────────────────────────────────────────────────────

/// Per-frame renderer for display-bearing entities.
///
/// Resolves the entity's network value and draws it centered on the tile:
/// colors via a cached rounded-rect swatch, shapes via their own draw
/// capability. Invoked only for entities that currently carry a non-empty
/// value.
#[derive(Default)]
pub struct DisplaySystem {
    buffers: BufferCache,
}

impl DisplaySystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `value` centered at `center` (logical pixels) on the target
    /// surface. Values that resolve to nothing draw nothing.
    pub fn draw(
        &mut self,
        params: &mut DrawParameters<'_>,
        center: Vec2,
        value: &NetworkValue,
    ) -> Result<(), DisplayError> {
        let Some(resolved) = resolve_display_value(value)? else {
            return Ok(());
        };
        match resolved {
            DisplayedValue::Color(color) => {
                let swatch = self.buffers.get_for_key(
                    "display-color",
                    color.id(),
                    SWATCH_SIZE,
                    SWATCH_SIZE,
                    params.dpi,
                    |surface, w, h, dpi| paint_color_swatch(surface, w, h, dpi, color),
                );
                draw::draw_buffer_centered(params, &swatch, center, TILE_SIZE);
            }
            DisplayedValue::Shape(shape) => {
                shape.draw_centered(params, center, TILE_SIZE);
            }
        }
        Ok(())
    }

    /// Generated-surface cache, exposed for diagnostics.
    pub fn buffers(&self) -> &BufferCache {
        &self.buffers
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
