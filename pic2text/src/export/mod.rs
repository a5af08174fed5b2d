//! Getting text out of the app: clipboard copies and `.txt` downloads.

mod clipboard;
mod download;

pub use clipboard::{ClipboardPort, SystemClipboard};
pub use download::{DirectoryDownloads, DownloadSink};

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::error::{Pic2TextError, Result};

const FALLBACK_STEM: &str = "output";
const TRANSLATED_SUFFIX: &str = "-translated";

/// Which of an item's two texts is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Original,
    Translated,
}

impl std::str::FromStr for TextKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "translated" => Ok(Self::Translated),
            _ => Err(format!("Unknown text kind: {s}")),
        }
    }
}

/// Export name for an item's text, without the `.txt` extension.
///
/// `scan.jpeg` gives `scan` / `scan-translated`; no name (or a name that is
/// nothing but an extension) gives `output` / `output-translated`.
pub fn export_file_stem(source_name: Option<&str>, kind: TextKind) -> String {
    let stem = source_name
        .map(|name| match name.rsplit_once('.') {
            Some((stem, ext)) if !ext.is_empty() => stem,
            _ => name,
        })
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_STEM);

    match kind {
        TextKind::Original => stem.to_string(),
        TextKind::Translated => format!("{stem}{TRANSLATED_SUFFIX}"),
    }
}

#[derive(Clone)]
pub struct ExportAdapter {
    clipboard: Arc<dyn ClipboardPort>,
    downloads: Arc<dyn DownloadSink>,
}

impl ExportAdapter {
    pub fn new(clipboard: Arc<dyn ClipboardPort>, downloads: Arc<dyn DownloadSink>) -> Self {
        Self {
            clipboard,
            downloads,
        }
    }

    /// Copies `text` to the clipboard. Empty text is ignored.
    pub async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let clipboard = Arc::clone(&self.clipboard);
        let text = text.to_string();
        tokio::task::spawn_blocking(move || clipboard.write_text(&text))
            .await
            .map_err(|e| Pic2TextError::Clipboard(format!("Clipboard task failed: {e}")))??;

        info!("Copied text to clipboard");
        Ok(())
    }

    /// Saves `text` as `<suggested_name>.txt`. Empty text is ignored and
    /// returns `None`.
    pub async fn download_as_file(
        &self,
        text: &str,
        suggested_name: &str,
    ) -> Result<Option<PathBuf>> {
        if text.is_empty() {
            return Ok(None);
        }

        let downloads = Arc::clone(&self.downloads);
        let file_name = format!("{suggested_name}.txt");
        let contents = text.as_bytes().to_vec();
        let path = tokio::task::spawn_blocking(move || downloads.deliver(&file_name, &contents))
            .await
            .map_err(|e| Pic2TextError::Download(format!("Download task failed: {e}")))??;

        info!(path = %path.display(), "Text downloaded");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
        deny: bool,
    }

    impl ClipboardPort for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<()> {
            if self.deny {
                return Err(Pic2TextError::Clipboard("permission denied".to_string()));
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl DownloadSink for RecordingSink {
        fn deliver(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
            self.delivered
                .lock()
                .unwrap()
                .push((file_name.to_string(), contents.to_vec()));
            Ok(PathBuf::from(file_name))
        }
    }

    fn adapter(
        clipboard: Arc<RecordingClipboard>,
        sink: Arc<RecordingSink>,
    ) -> ExportAdapter {
        ExportAdapter::new(clipboard, sink)
    }

    #[test]
    fn test_export_file_stem() {
        assert_eq!(export_file_stem(Some("scan.jpeg"), TextKind::Original), "scan");
        assert_eq!(
            export_file_stem(Some("scan.jpeg"), TextKind::Translated),
            "scan-translated"
        );
        assert_eq!(export_file_stem(None, TextKind::Original), "output");
        assert_eq!(
            export_file_stem(None, TextKind::Translated),
            "output-translated"
        );
    }

    #[test]
    fn test_export_file_stem_edge_cases() {
        assert_eq!(
            export_file_stem(Some("archive.tar.gz"), TextKind::Original),
            "archive.tar"
        );
        assert_eq!(export_file_stem(Some("README"), TextKind::Original), "README");
        assert_eq!(export_file_stem(Some(".png"), TextKind::Original), "output");
        assert_eq!(export_file_stem(Some(""), TextKind::Translated), "output-translated");
    }

    #[tokio::test]
    async fn test_empty_text_is_noop() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let sink = Arc::new(RecordingSink::default());
        let export = adapter(clipboard.clone(), sink.clone());

        export.copy_to_clipboard("").await.unwrap();
        assert_eq!(export.download_as_file("", "x").await.unwrap(), None);

        assert!(clipboard.writes.lock().unwrap().is_empty());
        assert!(sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_writes_text() {
        let clipboard = Arc::new(RecordingClipboard::default());
        let export = adapter(clipboard.clone(), Arc::new(RecordingSink::default()));

        export.copy_to_clipboard("hello").await.unwrap();
        assert_eq!(*clipboard.writes.lock().unwrap(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_clipboard_denial_surfaces() {
        let clipboard = Arc::new(RecordingClipboard {
            deny: true,
            ..Default::default()
        });
        let export = adapter(clipboard, Arc::new(RecordingSink::default()));

        let err = export.copy_to_clipboard("hello").await.unwrap_err();
        assert!(matches!(err, Pic2TextError::Clipboard(_)));
    }

    #[tokio::test]
    async fn test_download_appends_txt() {
        let sink = Arc::new(RecordingSink::default());
        let export = adapter(Arc::new(RecordingClipboard::default()), sink.clone());

        let path = export.download_as_file("hola", "scan-translated").await.unwrap();
        assert_eq!(path, Some(PathBuf::from("scan-translated.txt")));
        assert_eq!(
            *sink.delivered.lock().unwrap(),
            vec![("scan-translated.txt".to_string(), b"hola".to_vec())]
        );
    }
}
