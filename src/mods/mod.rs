use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;
use thiserror::Error;

use crate::display::{DisplayColor, NetworkValue};
use crate::sprite::cache::SpriteKind;

/// Variant id every building implicitly has.
pub const DEFAULT_VARIANT: &str = "default";

// ── Declarative metadata ─────────────────────────────────────────────────────

/// A not-yet-loaded external asset: where to fetch it and the pixel extent
/// its atlas links will claim once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExternalSpriteMeta {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VariantTranslation {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BuildingTranslations {
    /// Keyed by variant id; must cover [`DEFAULT_VARIANT`] and every variant
    /// the building declares.
    pub variants: HashMap<String, VariantTranslation>,
    /// User-facing label for the keybinding entry.
    pub keybinding_label: String,
}

// ── Capability traits ────────────────────────────────────────────────────────

/// Read-only capability set every mod-contributed building exposes.
///
/// All of this is declarative: the core derives cache keys from it and pulls
/// [`ExternalSpriteMeta`] out of it, but never mutates it. Omitting a
/// required method is a compile error, not a runtime fault.
pub trait ModBuilding {
    fn id(&self) -> &str;

    /// Extra variant ids beyond the implicit default.
    fn variants(&self) -> Vec<String> {
        Vec::new()
    }

    fn keybinding(&self) -> &str;

    fn translations(&self) -> BuildingTranslations;

    /// Sprite meta for one (rotation, variant, kind) combination, or `None`
    /// if the combination is not declared.
    fn sprite_meta(&self, rotation: u32, variant: &str, kind: SpriteKind) -> Option<ExternalSpriteMeta>;
}

/// A mod-contributed network item kind.
pub trait ModItem {
    /// Stable id of this item kind, unique per process.
    fn item_type(&self) -> &'static str;

    /// How the item reads as a boolean on wire crossings.
    fn as_boolean(&self) -> bool;

    /// The built-in renderable this item maps to on a display; `None` means
    /// nothing to render. Must not resolve to another custom item.
    fn display_value(&self) -> Option<NetworkValue> {
        Some(NetworkValue::Color(DisplayColor::LIT))
    }
}

/// Parses an item of one registered kind from its copyable string code.
pub type ItemParser = Box<dyn Fn(&str) -> Option<Rc<dyn ModItem>>>;

// ── Registry ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModError {
    #[error("building '{0}' is already registered")]
    DuplicateBuilding(String),
    #[error("item type '{0}' is already registered")]
    DuplicateItem(String),
    #[error("building '{building}' has no translation for variant '{variant}'")]
    MissingTranslation { building: String, variant: String },
    #[error("building '{building}' declares no {kind:?} sprite meta for variant '{variant}'")]
    MissingSpriteMeta {
        building: String,
        variant: String,
        kind: SpriteKind,
    },
}

/// Explicit registry of mod-contributed types, constructed at startup and
/// passed by reference to the systems that need lookup.
///
/// Registration validates the declarative surface up front so malformed mod
/// metadata fails at load time, not at render time.
#[derive(Default)]
pub struct ModRegistry {
    buildings: HashMap<String, Box<dyn ModBuilding>>,
    item_parsers: HashMap<&'static str, ItemParser>,
}

impl ModRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_building(&mut self, building: Box<dyn ModBuilding>) -> Result<(), ModError> {
        validate_building(&*building)?;
        let id = building.id().to_string();
        if self.buildings.contains_key(&id) {
            return Err(ModError::DuplicateBuilding(id));
        }
        self.buildings.insert(id, building);
        Ok(())
    }

    pub fn building(&self, id: &str) -> Option<&dyn ModBuilding> {
        self.buildings.get(id).map(|b| &**b)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &dyn ModBuilding> {
        self.buildings.values().map(|b| &**b)
    }

    pub fn register_item_parser(
        &mut self,
        item_type: &'static str,
        parser: ItemParser,
    ) -> Result<(), ModError> {
        if self.item_parsers.contains_key(item_type) {
            return Err(ModError::DuplicateItem(item_type.to_string()));
        }
        self.item_parsers.insert(item_type, parser);
        Ok(())
    }

    /// Parse an item of a registered kind from its string code.
    pub fn parse_item(&self, item_type: &str, code: &str) -> Option<Rc<dyn ModItem>> {
        self.item_parsers.get(item_type).and_then(|parse| parse(code))
    }
}

/// Every variant needs a translation and, at rotation 0, a sprite meta for
/// each sprite kind. Rotations beyond 0 stay optional — buildings with a
/// single orientation only declare the one.
fn validate_building(building: &dyn ModBuilding) -> Result<(), ModError> {
    let translations = building.translations();
    let mut variants = vec![DEFAULT_VARIANT.to_string()];
    variants.extend(building.variants());

    for variant in &variants {
        if !translations.variants.contains_key(variant) {
            return Err(ModError::MissingTranslation {
                building: building.id().to_string(),
                variant: variant.clone(),
            });
        }
        for kind in [SpriteKind::Normal, SpriteKind::Blueprint] {
            if building.sprite_meta(0, variant, kind).is_none() {
                return Err(ModError::MissingSpriteMeta {
                    building: building.id().to_string(),
                    variant: variant.clone(),
                    kind,
                });
            }
        }
    }
    Ok(())
}
