#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use pic2text::config::ProcessingConfig;
use pic2text::extraction::{Extraction, ExtractionError, Extractor};
use pic2text::models::{ItemId, ItemStatus, Language, SourceFile};
use pic2text::processing::ProcessingController;
use pic2text::store::ItemStore;

pub type Reply = Result<Extraction, ExtractionError>;

/// Extractor whose calls block until the test releases them, one gate per
/// call, keyed by file name.
pub struct GatedExtractor {
    started: mpsc::UnboundedSender<String>,
    gates: Mutex<HashMap<String, VecDeque<oneshot::Receiver<Reply>>>>,
}

impl GatedExtractor {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<String>) {
        let (started, rx) = mpsc::unbounded_channel();
        let extractor = Arc::new(Self {
            started,
            gates: Mutex::new(HashMap::new()),
        });
        (extractor, rx)
    }

    /// Prepares the next call for `file_name`; the returned sender resolves it.
    pub fn gate(&self, file_name: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .entry(file_name.to_string())
            .or_default()
            .push_back(rx);
        tx
    }
}

#[async_trait]
impl Extractor for GatedExtractor {
    async fn extract(&self, source: &SourceFile, _language: Language) -> Reply {
        let name = source.file_name.clone().unwrap_or_default();
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| panic!("no gate prepared for {name}"));
        let _ = self.started.send(name);
        gate.await
            .unwrap_or_else(|_| Err(ExtractionError::Transport("gate dropped".to_string())))
    }
}

pub fn ok(original: &str, translated: &str) -> Reply {
    Ok(Extraction {
        original: original.to_string(),
        translated: translated.to_string(),
    })
}

pub fn controller_with(extractor: Arc<dyn Extractor>, guard_duplicates: bool) -> ProcessingController {
    let config = ProcessingConfig {
        language: Language::Hindi,
        guard_duplicates,
    };
    ProcessingController::new(Arc::new(ItemStore::new()), extractor, &config)
}

pub fn image(name: &str) -> SourceFile {
    SourceFile::new(name, name.as_bytes().to_vec())
}

/// Polls the store until the item reaches `status`, failing after a second.
pub async fn wait_for_status(store: &ItemStore, id: &ItemId, status: ItemStatus) {
    let reached = tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            if store.get(id).map(|item| item.status) == Some(status) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "item {id} never reached {status}");
}

/// Waits for `count` extraction calls to have started.
pub async fn wait_started(rx: &mut mpsc::UnboundedReceiver<String>, count: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let name = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("extraction never started")
            .expect("extractor dropped");
        names.push(name);
    }
    names
}
