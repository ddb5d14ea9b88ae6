pub mod buffer;
pub mod display;
pub mod draw;
pub mod mods;
pub mod sprite;

pub use buffer::BufferCache;
pub use display::{DisplayColor, DisplaySystem, NetworkValue, resolve_display_value};
pub use draw::{DrawParameters, TILE_SIZE};
pub use mods::{DEFAULT_VARIANT, ExternalSpriteMeta, ModBuilding, ModItem, ModRegistry};
pub use sprite::cache::{SpriteKey, SpriteKeyCache, SpriteKind};
pub use sprite::loader::FetchSource;
pub use sprite::{AtlasSprite, LoadState, ResolutionScale, SharedSprite, SpriteAtlasLink};
