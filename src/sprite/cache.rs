use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use thiserror::Error;

use super::loader::{AssetLoader, FetchSource};
use super::{AtlasSprite, SharedSprite};
use crate::mods::{DEFAULT_VARIANT, ExternalSpriteMeta, ModBuilding};

// ── SpriteKey ────────────────────────────────────────────────────────────────

/// Which declared asset of a building a sprite represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    /// The sprite drawn for the placed building.
    Normal,
    /// The translucent variant shown while planning a placement.
    Blueprint,
}

impl SpriteKind {
    fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Blueprint => "blueprint",
        }
    }
}

/// Structured composite cache key: (owner identity, variant identity,
/// rotation index, sprite kind). Collision-free across all mods sharing a
/// process, unlike concatenated strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpriteKey {
    pub building: String,
    pub variant: String,
    pub rotation: u32,
    pub kind: SpriteKind,
}

impl SpriteKey {
    pub fn new(building: &str, variant: &str, rotation: u32, kind: SpriteKind) -> Self {
        Self {
            building: building.to_string(),
            variant: variant.to_string(),
            rotation,
            kind,
        }
    }

    /// Human-readable sprite id; the default variant is elided.
    pub fn sprite_id(&self) -> String {
        let mut id = self.building.clone();
        if self.variant != DEFAULT_VARIANT {
            id.push('-');
            id.push_str(&self.variant);
        }
        id.push('-');
        id.push_str(&self.rotation.to_string());
        if self.kind != SpriteKind::Normal {
            id.push('-');
            id.push_str(self.kind.label());
        }
        id
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sprite_id())
    }
}

// ── SpriteKeyCache ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SpriteError {
    /// The calling collaborator declared no sprite metadata for this key.
    /// A configuration fault — nothing is cached for the key.
    #[error("no sprite meta declared for '{key}'")]
    MissingSpriteMeta { key: SpriteKey },
}

/// Memoizes [`AtlasSprite`] cells by composite key, lazily triggering the
/// asset loader on first miss.
///
/// A key maps to at most one sprite for the lifetime of the cache; entries
/// are never evicted. Call [`SpriteKeyCache::pump`] once per frame so
/// finished loads get published.
pub struct SpriteKeyCache {
    sprites: HashMap<SpriteKey, SharedSprite>,
    loader: AssetLoader,
}

impl SpriteKeyCache {
    pub fn new(fetch: Arc<dyn FetchSource>) -> Self {
        Self { sprites: HashMap::new(), loader: AssetLoader::new(fetch) }
    }

    /// Return the cached sprite for `key`, or create it.
    ///
    /// On a miss the sprite is handed back immediately with placeholder
    /// links; the cache entry is inserted *before* the fetch starts, which is
    /// what guarantees at-most-one fetch per key even under re-entrant calls.
    /// `meta` is only consulted on a miss; returning `None` from it fails
    /// fast without caching anything.
    pub fn get_or_create(
        &mut self,
        key: SpriteKey,
        meta: impl FnOnce() -> Option<ExternalSpriteMeta>,
    ) -> Result<SharedSprite, SpriteError> {
        if let Some(sprite) = self.sprites.get(&key) {
            return Ok(Rc::clone(sprite));
        }

        let meta = meta().ok_or_else(|| SpriteError::MissingSpriteMeta { key: key.clone() })?;
        log::debug!("sprite cache miss: {key}");

        let sprite = Rc::new(RefCell::new(AtlasSprite::new_loading(
            key.sprite_id(),
            self.loader.loading_links().clone(),
        )));
        self.sprites.insert(key.clone(), Rc::clone(&sprite));
        self.loader.begin_load(key, meta, Rc::clone(&sprite));
        Ok(sprite)
    }

    /// Sprite lookup driven by a building's declared metadata.
    pub fn building_sprite(
        &mut self,
        building: &dyn ModBuilding,
        rotation: u32,
        variant: &str,
        kind: SpriteKind,
    ) -> Result<SharedSprite, SpriteError> {
        let key = SpriteKey::new(building.id(), variant, rotation, kind);
        self.get_or_create(key, || building.sprite_meta(rotation, variant, kind))
    }

    /// Publish any finished loads into their sprites.
    pub fn pump(&mut self) {
        self.loader.pump();
    }

    /// Number of fetches still in flight.
    pub fn pending_loads(&self) -> usize {
        self.loader.pending_loads()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_id_elides_default_variant_and_normal_kind() {
        let key = SpriteKey::new("byte_gate", DEFAULT_VARIANT, 0, SpriteKind::Normal);
        assert_eq!(key.sprite_id(), "byte_gate-0");
    }

    #[test]
    fn sprite_id_spells_out_variant_rotation_and_kind() {
        let key = SpriteKey::new("byte_gate", "ORGate", 2, SpriteKind::Blueprint);
        assert_eq!(key.sprite_id(), "byte_gate-ORGate-2-blueprint");
    }

    #[test]
    fn keys_differing_only_in_kind_are_distinct() {
        let normal = SpriteKey::new("b", DEFAULT_VARIANT, 0, SpriteKind::Normal);
        let blueprint = SpriteKey::new("b", DEFAULT_VARIANT, 0, SpriteKind::Blueprint);
        assert_ne!(normal, blueprint);
    }

    #[test]
    fn structured_keys_avoid_concatenation_collisions() {
        // "a-b" + default rotation 0 vs "a" + variant "b" rotation 0 would
        // collide under naive string concatenation.
        let a = SpriteKey::new("a-b", DEFAULT_VARIANT, 0, SpriteKind::Normal);
        let b = SpriteKey::new("a", "b", 0, SpriteKind::Normal);
        assert_ne!(a, b);
    }
}
