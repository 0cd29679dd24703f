use std::collections::BTreeMap;

use bytes::Bytes;
use sha2::{Digest, Sha256};

const URL_PREFIX: &str = "blob:texify/";
const JOURNAL_LIMIT: usize = 256;

/// Bytes held behind a revocable artifact URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Bytes,
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactEvent {
    Created(String),
    Revoked(String),
}

/// In-memory registry of URL-addressable blobs.
///
/// Every URL handed out by [`ArtifactStore::create`] stays resolvable until it
/// is passed to [`ArtifactStore::revoke`]. URLs are never reused, even after
/// revocation, so a stale handle can never alias newer bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactStore {
    next_seq: u64,
    blobs: BTreeMap<String, Blob>,
    journal: Vec<ArtifactEvent>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, data: Bytes, mime: impl Into<String>) -> String {
        self.next_seq += 1;
        let url = format!("{URL_PREFIX}{}-{}", self.next_seq, short_hash(&data));
        self.blobs.insert(
            url.clone(),
            Blob {
                data,
                mime: mime.into(),
            },
        );
        self.record(ArtifactEvent::Created(url.clone()));
        url
    }

    /// Releases the blob behind `url`. Returns false if it was not live.
    pub fn revoke(&mut self, url: &str) -> bool {
        if self.blobs.remove(url).is_some() {
            self.record(ArtifactEvent::Revoked(url.to_string()));
            true
        } else {
            false
        }
    }

    pub fn get(&self, url: &str) -> Option<&Blob> {
        self.blobs.get(url)
    }

    pub fn live_count(&self) -> usize {
        self.blobs.len()
    }

    /// Chronological create/revoke history, most recent last.
    pub fn journal(&self) -> &[ArtifactEvent] {
        &self.journal
    }

    fn record(&mut self, event: ArtifactEvent) {
        if self.journal.len() == JOURNAL_LIMIT {
            self.journal.remove(0);
        }
        self.journal.push(event);
    }
}

fn short_hash(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
