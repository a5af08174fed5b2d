//! Locally renderable previews of uploaded images.
//!
//! A [`PreviewHandle`] is the only owner of its registry entry. Dropping the
//! handle releases the entry, after which [`PreviewRegistry::resolve`] no
//! longer finds it. Items hold their handle for as long as they live in the
//! store, so removal or a bulk clear is what frees the preview.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewId(Uuid);

impl std::fmt::Display for PreviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "preview:{}", self.0)
    }
}

/// Bytes and MIME type a front end needs to draw the image.
#[derive(Debug, Clone)]
pub struct PreviewResource {
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: RwLock<HashMap<PreviewId, PreviewResource>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a preview for `source` and hands back its owning handle.
    pub fn create(self: &Arc<Self>, source: &SourceFile) -> PreviewHandle {
        let id = PreviewId(Uuid::new_v4());
        let resource = PreviewResource {
            mime_type: sniff_mime(source),
            bytes: Arc::clone(&source.bytes),
        };

        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, resource);

        PreviewHandle {
            id,
            registry: Arc::clone(self),
        }
    }

    pub fn resolve(&self, id: PreviewId) -> Option<PreviewResource> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    /// Number of previews not yet released.
    pub fn live_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, id: PreviewId) {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            tracing::debug!(preview = %id, "Released preview");
        }
    }
}

/// Content sniffing first, file extension second.
fn sniff_mime(source: &SourceFile) -> String {
    if let Some(kind) = infer::get(&source.bytes) {
        return kind.mime_type().to_string();
    }
    source
        .file_name
        .as_deref()
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Owning reference to a registered preview. Not `Clone`: there is exactly
/// one owner, and its drop is the single release.
#[derive(Debug)]
pub struct PreviewHandle {
    id: PreviewId,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    pub fn id(&self) -> PreviewId {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
