use chrono::{DateTime, Utc};

use crate::models::capture::{Artifact, CaptureKind, CapturedPair};

/// A pair kept on the client because cloud sync is off.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalCapture {
    /// Generated UUID v4, independent of the pair's own id.
    pub id: String,
    pub title: String,
    pub kind: CaptureKind,
    pub landscape: Artifact,
    pub portrait: Artifact,
    pub created_at: DateTime<Utc>,
}

/// In-memory, newest-last list of locally kept pairs.
#[derive(Debug, Default)]
pub struct LocalCaptureList {
    entries: Vec<LocalCapture>,
}

impl LocalCaptureList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair under a fresh id and timestamp.
    pub fn push(&mut self, pair: CapturedPair, title: impl Into<String>) -> &LocalCapture {
        let index = self.entries.len();
        self.entries.push(LocalCapture {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            kind: pair.kind,
            landscape: pair.landscape,
            portrait: pair.portrait,
            created_at: Utc::now(),
        });
        &self.entries[index]
    }

    pub fn list(&self) -> &[LocalCapture] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&LocalCapture> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<LocalCapture> {
        let index = self.entries.iter().position(|c| c.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
