use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use crossbeam_channel::{Receiver, Sender, unbounded};
use image::RgbaImage;
use thiserror::Error;

use super::cache::SpriteKey;
use super::{LinkTable, LoadState, PlaceholderArt, SharedSprite};
use crate::mods::ExternalSpriteMeta;

// ── Fetch capability ─────────────────────────────────────────────────────────

/// External collaborator that resolves a URL to a self-contained `data:` URI.
///
/// The indirection lets externally-sourced and built-in assets flow through
/// the same in-memory representation. Implementations run on a worker thread
/// and may block; a call that never returns simply leaves the sprite on its
/// loading placeholder forever.
pub trait FetchSource: Send + Sync + 'static {
    fn fetch_as_data_uri(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("fetch failed for {url}: {reason}")]
    Failed { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed data URI")]
    BadDataUri,
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Extract the encoded payload bytes from a base64 `data:` URI.
pub(crate) fn decode_data_uri(uri: &str) -> Result<Vec<u8>, AssetError> {
    let rest = uri.strip_prefix("data:").ok_or(AssetError::BadDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(AssetError::BadDataUri)?;
    if !header.ends_with(";base64") {
        return Err(AssetError::BadDataUri);
    }
    BASE64.decode(payload.trim()).map_err(|_| AssetError::BadDataUri)
}

// ── AssetLoader ──────────────────────────────────────────────────────────────

struct Completion {
    key: SpriteKey,
    result: Result<RgbaImage, AssetError>,
}

/// Resolves declarative external-asset descriptors into decoded images and
/// publishes per-resolution links into target sprites.
///
/// Fetch + decode run on spawned worker threads; publication happens only in
/// [`AssetLoader::pump`] on the thread that owns the sprite cells, as a single
/// whole-table swap per sprite. Consumers must tolerate reading the loading
/// placeholder for an unbounded number of frames.
pub struct AssetLoader {
    fetch: Arc<dyn FetchSource>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    /// Sprites with an outstanding fetch, by key. Keyed entries are inserted
    /// into the cache before any async work starts, so a key can never have
    /// more than one fetch in flight.
    pending: HashMap<SpriteKey, (SharedSprite, ExternalSpriteMeta)>,
    art: PlaceholderArt,
}

impl AssetLoader {
    pub fn new(fetch: Arc<dyn FetchSource>) -> Self {
        let (tx, rx) = unbounded();
        Self { fetch, tx, rx, pending: HashMap::new(), art: PlaceholderArt::new() }
    }

    /// The link table newly created sprites start out with.
    pub(crate) fn loading_links(&self) -> &LinkTable {
        &self.art.loading
    }

    /// Number of fetches still in flight.
    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Kick off fetch + decode for one sprite. The sprite keeps serving its
    /// placeholder links until a later `pump()` call publishes the result.
    pub(crate) fn begin_load(&mut self, key: SpriteKey, meta: ExternalSpriteMeta, sprite: SharedSprite) {
        self.pending.insert(key.clone(), (sprite, meta.clone()));
        let fetch = Arc::clone(&self.fetch);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = fetch
                .fetch_as_data_uri(&meta.url)
                .map_err(AssetError::from)
                .and_then(|uri| decode_data_uri(&uri))
                .and_then(|bytes| Ok(image::load_from_memory(&bytes)?.to_rgba8()));
            // The receiver is gone only if the loader itself was dropped.
            let _ = tx.send(Completion { key, result });
        });
    }

    /// Drain finished loads and publish them into their target sprites.
    /// Must be called once per frame by the host loop.
    ///
    /// Each publication replaces the whole link table in one step — a reader
    /// never observes a table with some scales upgraded and others not. A
    /// failed load is logged once and leaves the sprite on a terminal failure
    /// placeholder; it is never retried.
    pub fn pump(&mut self) {
        while let Ok(done) = self.rx.try_recv() {
            let Some((sprite, meta)) = self.pending.remove(&done.key) else {
                continue;
            };
            match done.result {
                Ok(img) => {
                    let table = LinkTable::full_image(Arc::new(img), meta.width, meta.height);
                    let mut s = sprite.borrow_mut();
                    s.links = table;
                    s.state = LoadState::Ready;
                }
                Err(e) => {
                    log::warn!("asset load failed for '{}' ({}): {e}", done.key, meta.url);
                    let mut s = sprite.borrow_mut();
                    s.links = self.art.failed.clone();
                    s.state = LoadState::Failed;
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_data_uri_roundtrips_base64_payload() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
        assert_eq!(decode_data_uri(&uri).unwrap(), b"hello");
    }

    #[test]
    fn decode_data_uri_rejects_missing_scheme() {
        assert!(matches!(decode_data_uri("image/png;base64,aGk="), Err(AssetError::BadDataUri)));
    }

    #[test]
    fn decode_data_uri_rejects_non_base64_encoding() {
        assert!(matches!(decode_data_uri("data:text/plain,hello"), Err(AssetError::BadDataUri)));
    }

    #[test]
    fn decode_data_uri_rejects_invalid_payload() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,!!not-base64!!"),
            Err(AssetError::BadDataUri)
        ));
    }
}
