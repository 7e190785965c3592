use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use dual_capture_core::{CaptureError, CaptureKind, CaptureRecord, CaptureStore, NewCapture};

const DEMO_VIDEO_URL: &str = "https://files.vidstack.io/sprite-fight/720p.mp4";
const DEMO_PHOTO_LANDSCAPE_URL: &str = "https://images.unsplash.com/photo-1542385151-efd9000785a0?w=1600&q=80";
const DEMO_PHOTO_PORTRAIT_URL: &str = "https://images.unsplash.com/photo-1542385151-efd9000785a0?w=900&q=80";

struct Inner {
    records: Vec<CaptureRecord>,
    next_id: i64,
}

/// In-memory capture records with serial ids starting at 1.
///
/// Cheap to clone; clones share the same records.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records: Vec::new(),
                next_id: 1,
            })),
        }
    }

    pub fn list_captures(&self) -> Vec<CaptureRecord> {
        self.inner.lock().records.clone()
    }

    pub fn get_capture(&self, id: i64) -> Option<CaptureRecord> {
        self.inner.lock().records.iter().find(|r| r.id == id).cloned()
    }

    /// Append a record. Wire bodies are checked by `NewCapture::from_json`
    /// before they get here; empty strings are accepted.
    pub fn create_capture(&self, capture: NewCapture) -> Result<CaptureRecord, CaptureError> {
        let mut inner = self.inner.lock();
        let record = CaptureRecord {
            id: inner.next_id,
            title: capture.title,
            kind: capture.kind,
            landscape_url: capture.landscape_url,
            portrait_url: capture.portrait_url,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.records.push(record.clone());
        log::debug!("Stored capture {} ({})", record.id, record.kind.as_str());
        Ok(record)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert one demo video and one demo photo if nothing is stored yet.
    /// Returns how many records were added.
    pub fn seed_demo(&self) -> Result<usize, CaptureError> {
        if !self.is_empty() {
            return Ok(0);
        }
        let demos = [
            NewCapture {
                title: "Test Video Capture".into(),
                kind: CaptureKind::Video,
                landscape_url: DEMO_VIDEO_URL.into(),
                portrait_url: DEMO_VIDEO_URL.into(),
            },
            NewCapture {
                title: "Test Photo Capture".into(),
                kind: CaptureKind::Photo,
                landscape_url: DEMO_PHOTO_LANDSCAPE_URL.into(),
                portrait_url: DEMO_PHOTO_PORTRAIT_URL.into(),
            },
        ];
        let count = demos.len();
        for demo in demos {
            self.create_capture(demo)?;
        }
        log::info!("Seeded {} demo captures", count);
        Ok(count)
    }
}

impl CaptureStore for MemoryStorage {
    async fn list(&self) -> Result<Vec<CaptureRecord>, CaptureError> {
        Ok(self.list_captures())
    }

    async fn get(&self, id: i64) -> Result<Option<CaptureRecord>, CaptureError> {
        Ok(self.get_capture(id))
    }

    async fn create(&self, capture: NewCapture) -> Result<CaptureRecord, CaptureError> {
        self.create_capture(capture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(title: &str) -> NewCapture {
        NewCapture {
            title: title.into(),
            kind: CaptureKind::Video,
            landscape_url: "file:///l.webm".into(),
            portrait_url: "file:///p.webm".into(),
        }
    }

    #[test]
    fn ids_are_serial_and_order_is_kept() {
        let storage = MemoryStorage::new();
        let a = storage.create_capture(capture("a")).unwrap();
        let b = storage.create_capture(capture("b")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let titles: Vec<_> = storage.list_captures().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(storage.get_capture(2).unwrap().title, "b");
        assert!(storage.get_capture(3).is_none());
    }

    #[test]
    fn clones_share_records() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        clone.create_capture(capture("shared")).unwrap();
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn seed_only_when_empty() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.seed_demo().unwrap(), 2);
        assert_eq!(storage.seed_demo().unwrap(), 0);

        let records = storage.list_captures();
        assert_eq!(records[0].kind, CaptureKind::Video);
        assert_eq!(records[0].landscape_url, records[0].portrait_url);
        assert_eq!(records[1].kind, CaptureKind::Photo);
        assert!(records[1].portrait_url.contains("w=900"));
    }

    #[tokio::test]
    async fn store_contract() {
        let storage = MemoryStorage::new();
        let record = CaptureStore::create(&storage, capture("x")).await.unwrap();
        assert_eq!(CaptureStore::get(&storage, record.id).await.unwrap(), Some(record.clone()));
        assert_eq!(CaptureStore::list(&storage).await.unwrap(), vec![record]);
    }
}
