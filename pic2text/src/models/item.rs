use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PreviewHandle, PreviewId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid item id '{s}': {e}"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Pending,
    Processing,
    Done,
    Error,
}

impl ItemStatus {
    /// Forward-only lifecycle. Terminal items may be resubmitted, which sends
    /// them back to `Processing`; nothing ever returns to `Pending`.
    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (_, Self::Processing) | (Self::Processing, Self::Done | Self::Error)
        )
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "done" => Ok(Self::Done),
            "error" => Ok(Self::Error),
            _ => Err(format!("Unknown item status: {s}")),
        }
    }
}

/// An image the user picked: its raw bytes and, when known, its file name.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: Option<String>,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
        }
    }

    pub fn anonymous(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            file_name: None,
            bytes: bytes.into(),
        }
    }

    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        Ok(Self {
            file_name,
            bytes: bytes.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One uploaded image and its processing state. Owned by the store.
#[derive(Debug)]
pub struct OcrItem {
    pub id: ItemId,
    pub source: SourceFile,
    pub preview: PreviewHandle,
    pub status: ItemStatus,
    pub original_text: String,
    pub translated_text: Option<String>,
    /// Bumped on every move into `Processing`; completions carry the value
    /// they were started with.
    pub submission: u64,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OcrItem {
    pub fn new(source: SourceFile, preview: PreviewHandle) -> Self {
        let now = Utc::now();
        Self {
            id: ItemId::new(),
            source,
            preview,
            status: ItemStatus::Pending,
            original_text: String::new(),
            translated_text: Some(String::new()),
            submission: 0,
            added_at: now,
            updated_at: now,
        }
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        ItemSnapshot {
            id: self.id,
            file_name: self.source.file_name.clone(),
            size_bytes: self.source.len(),
            preview: self.preview.id(),
            status: self.status,
            original_text: self.original_text.clone(),
            translated_text: self.translated_text.clone(),
            added_at: self.added_at,
            updated_at: self.updated_at,
        }
    }
}

/// Read-only copy of an item for rendering. Carries the preview id, never
/// the owning handle.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub file_name: Option<String>,
    pub size_bytes: usize,
    pub preview: PreviewId,
    pub status: ItemStatus,
    pub original_text: String,
    /// `None` once extraction has failed.
    pub translated_text: Option<String>,
    pub added_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ItemSnapshot {
    pub fn translated(&self) -> &str {
        self.translated_text.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        use ItemStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Done));
        assert!(Processing.can_transition_to(Error));
        assert!(Done.can_transition_to(Processing));
        assert!(Error.can_transition_to(Processing));

        assert!(!Pending.can_transition_to(Done));
        assert!(!Pending.can_transition_to(Error));
        assert!(!Done.can_transition_to(Pending));
        assert!(!Error.can_transition_to(Pending));
        assert!(!Done.can_transition_to(Error));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ["pending", "processing", "done", "error"] {
            let parsed: ItemStatus = status.parse().unwrap();
            assert_eq!(parsed.to_string(), status);
        }
        assert!("queued".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_item_ids_are_unique() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().parse::<ItemId>().unwrap(), a);
    }

    #[tokio::test]
    async fn test_source_file_read_keeps_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, b"bytes").unwrap();

        let source = SourceFile::read(&path).await.unwrap();
        assert_eq!(source.file_name.as_deref(), Some("receipt.png"));
        assert_eq!(source.len(), 5);
    }
}
