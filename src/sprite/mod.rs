pub mod cache;
pub mod loader;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

// ── ResolutionScale ──────────────────────────────────────────────────────────

/// A supported pixel-density tier at which a sprite may be rendered.
///
/// Every sprite carries one atlas link per tier, so the renderer can pick a
/// cheaper backing image when zoomed far out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionScale {
    Quarter,
    Half,
    Full,
}

impl ResolutionScale {
    pub const ALL: [ResolutionScale; 3] = [Self::Quarter, Self::Half, Self::Full];
    pub const COUNT: usize = Self::ALL.len();

    /// Density factor relative to full resolution.
    pub fn factor(self) -> f32 {
        match self {
            Self::Quarter => 0.25,
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }

    /// Pick the cheapest tier that still looks sharp at the given zoom level.
    pub fn for_zoom(zoom: f32) -> Self {
        if zoom < 0.35 {
            Self::Quarter
        } else if zoom < 0.75 {
            Self::Half
        } else {
            Self::Full
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

// ── SpriteAtlasLink ──────────────────────────────────────────────────────────

/// Immutable descriptor locating a sprite's pixels inside a backing image
/// for blit-style drawing.
///
/// `packed_x/y/w/h` is the pixel region actually stored in the backing image;
/// `pack_offset_x/y` shifts that region inside the logical `w × h` frame
/// (non-zero only for trimmed sheet sprites — externally loaded sprites are
/// always full-image, zero-offset links).
#[derive(Clone, Debug)]
pub struct SpriteAtlasLink {
    pub image: Arc<RgbaImage>,
    pub pack_offset_x: u32,
    pub pack_offset_y: u32,
    pub packed_x: u32,
    pub packed_y: u32,
    pub packed_w: u32,
    pub packed_h: u32,
    pub w: u32,
    pub h: u32,
}

impl SpriteAtlasLink {
    /// Link covering an entire backing image as one sprite frame.
    pub fn full_image(image: Arc<RgbaImage>, w: u32, h: u32) -> Self {
        Self {
            image,
            pack_offset_x: 0,
            pack_offset_y: 0,
            packed_x: 0,
            packed_y: 0,
            packed_w: w,
            packed_h: h,
            w,
            h,
        }
    }
}

// ── LinkTable ────────────────────────────────────────────────────────────────

/// One drawable link per supported resolution scale.
///
/// Tables are only ever replaced wholesale — a consumer never observes a
/// table with some scales upgraded and others not.
#[derive(Clone, Debug)]
pub struct LinkTable {
    links: [SpriteAtlasLink; ResolutionScale::COUNT],
}

impl LinkTable {
    /// Build a table where every scale references the same whole image.
    /// Loaded-from-URL sprites are never packed into a shared sheet, so all
    /// tiers share one backing image and differ only at draw time.
    pub fn full_image(image: Arc<RgbaImage>, w: u32, h: u32) -> Self {
        let link = SpriteAtlasLink::full_image(image, w, h);
        Self { links: [link.clone(), link.clone(), link] }
    }

    pub fn get(&self, scale: ResolutionScale) -> &SpriteAtlasLink {
        &self.links[scale.index()]
    }
}

// ── LoadState / AtlasSprite ──────────────────────────────────────────────────

/// Lifecycle of a sprite's backing content.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Real content not yet delivered; links point at the loading placeholder.
    Loading,
    /// Links reference the decoded asset.
    Ready,
    /// Fetch or decode failed; links point at the failure placeholder.
    /// Terminal — never retried.
    Failed,
}

/// A named sprite with one drawable link per resolution scale.
///
/// Shared by reference with every holder once returned from the cache.
/// Always drawable: a full link table exists from construction onward.
#[derive(Debug)]
pub struct AtlasSprite {
    id: String,
    pub(crate) state: LoadState,
    pub(crate) links: LinkTable,
}

impl AtlasSprite {
    pub(crate) fn new_loading(id: String, links: LinkTable) -> Self {
        Self { id, state: LoadState::Loading, links }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn link(&self, scale: ResolutionScale) -> &SpriteAtlasLink {
        self.links.get(scale)
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }
}

/// The shared cell handed out by the sprite cache. Only the asset loader
/// mutates the contents, and only by swapping in a complete link table.
pub type SharedSprite = Rc<RefCell<AtlasSprite>>;

// ── Placeholder art ──────────────────────────────────────────────────────────

/// Always-available fallback link tables shown while real content is loading
/// (gray checker) or after a load has permanently failed (magenta checker).
#[derive(Debug)]
pub(crate) struct PlaceholderArt {
    pub(crate) loading: LinkTable,
    pub(crate) failed: LinkTable,
}

const PLACEHOLDER_SIZE: u32 = 32;

impl PlaceholderArt {
    pub(crate) fn new() -> Self {
        let loading = checker_image(Rgba([90, 90, 90, 255]), Rgba([140, 140, 140, 255]));
        let failed = checker_image(Rgba([0, 0, 0, 255]), Rgba([255, 0, 255, 255]));
        Self {
            loading: LinkTable::full_image(Arc::new(loading), PLACEHOLDER_SIZE, PLACEHOLDER_SIZE),
            failed: LinkTable::full_image(Arc::new(failed), PLACEHOLDER_SIZE, PLACEHOLDER_SIZE),
        }
    }
}

/// 4×4 checkerboard of 8 px cells used for placeholder tiles.
fn checker_image(a: Rgba<u8>, b: Rgba<u8>) -> RgbaImage {
    let cell = PLACEHOLDER_SIZE / 4;
    RgbaImage::from_fn(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b }
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
