//! The event collection document and its append operation.

use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::EventRecord;
use crate::storage::ObjectStore;

/// Subject line attached to every event announcement.
pub const ANNOUNCEMENT_SUBJECT: &str = "New Event Announcement";

const CONTENT_TYPE_JSON: &str = "application/json";

/// Append attempts before giving up on a contended document.
const MAX_APPEND_ATTEMPTS: u32 = 3;

/// The shared collection document: a JSON array of [`EventRecord`] values at
/// a fixed key, rewritten wholesale on every append.
///
/// The document must already exist at the key; it is never created or deleted
/// here.
pub struct EventLog {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl EventLog {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Fetch and decode the current collection, along with the version tag
    /// the read observed.
    pub async fn load(&self) -> Result<(Vec<EventRecord>, Option<String>)> {
        let object = self.store.get(&self.key).await?;
        let events: Vec<EventRecord> = serde_json::from_slice(&object.body)?;
        Ok((events, object.etag))
    }

    /// Append `record` to the end of the collection and return the collection
    /// as stored.
    ///
    /// The write is guarded by the tag observed at read time: an append that
    /// races another writer re-reads and retries instead of overwriting the
    /// other writer's record. Insertion order is arrival order; duplicates
    /// are kept.
    pub async fn append(&self, record: &EventRecord) -> Result<Vec<EventRecord>> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let (mut events, etag) = self.load().await?;
            events.push(record.clone());

            let body = serde_json::to_string_pretty(&events)?;
            match self
                .store
                .put(&self.key, Bytes::from(body), CONTENT_TYPE_JSON, etag.as_deref())
                .await
            {
                Ok(()) => return Ok(events),
                Err(Error::Conflict(reason)) if attempts < MAX_APPEND_ATTEMPTS => {
                    warn!(
                        key = %self.key,
                        attempt = attempts,
                        "Append lost conditional write, retrying: {}",
                        reason
                    );
                }
                Err(Error::Conflict(reason)) => {
                    return Err(Error::Storage(format!(
                        "Gave up appending to {} after {} attempts: {}",
                        self.key, attempts, reason
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Plain-text announcement for a newly submitted event.
pub fn announcement_message(record: &EventRecord) -> String {
    format!(
        "New Event: {} on {}\n{}",
        record.title, record.date, record.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoredObject;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory store with the same conditional-write semantics as S3.
    struct MemoryStore {
        object: Mutex<(Bytes, u64)>,
    }

    impl MemoryStore {
        fn with_document(body: &str) -> Self {
            Self {
                object: Mutex::new((Bytes::from(body.to_string()), 1)),
            }
        }

        fn document(&self) -> String {
            let guard = self.object.lock().unwrap();
            String::from_utf8(guard.0.to_vec()).unwrap()
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get(&self, _key: &str) -> Result<StoredObject> {
            let guard = self.object.lock().unwrap();
            Ok(StoredObject {
                body: guard.0.clone(),
                etag: Some(guard.1.to_string()),
            })
        }

        async fn put(
            &self,
            key: &str,
            body: Bytes,
            _content_type: &str,
            if_match: Option<&str>,
        ) -> Result<()> {
            let mut guard = self.object.lock().unwrap();
            if let Some(expected) = if_match {
                if expected != guard.1.to_string() {
                    return Err(Error::Conflict(format!(
                        "{} changed underneath the writer",
                        key
                    )));
                }
            }
            guard.0 = body;
            guard.1 += 1;
            Ok(())
        }
    }

    /// Wrapper that sneaks a rival append in between the caller's read and
    /// write, once.
    struct ContendedStore {
        inner: MemoryStore,
        rival: Mutex<Option<EventRecord>>,
    }

    #[async_trait]
    impl ObjectStore for ContendedStore {
        async fn get(&self, key: &str) -> Result<StoredObject> {
            self.inner.get(key).await
        }

        async fn put(
            &self,
            key: &str,
            body: Bytes,
            content_type: &str,
            if_match: Option<&str>,
        ) -> Result<()> {
            let rival = self.rival.lock().unwrap().take();
            if let Some(rival) = rival {
                let current = self.inner.get(key).await?;
                let mut events: Vec<EventRecord> = serde_json::from_slice(&current.body)?;
                events.push(rival);
                let rewritten = serde_json::to_string_pretty(&events)?;
                self.inner
                    .put(key, Bytes::from(rewritten), content_type, None)
                    .await?;
            }
            self.inner.put(key, body, content_type, if_match).await
        }
    }

    fn record(title: &str) -> EventRecord {
        EventRecord {
            title: title.to_string(),
            date: "2024-05-01".to_string(),
            description: "Monthly sync".to_string(),
        }
    }

    #[tokio::test]
    async fn append_to_empty_collection() {
        let store = Arc::new(MemoryStore::with_document("[]"));
        let log = EventLog::new(store.clone(), "events.json");

        let stored = log.append(&record("Meetup")).await.unwrap();

        assert_eq!(stored, vec![record("Meetup")]);
        assert_eq!(
            store.document(),
            serde_json::to_string_pretty(&vec![record("Meetup")]).unwrap()
        );
    }

    #[tokio::test]
    async fn append_preserves_existing_records() {
        let existing = serde_json::to_string_pretty(&vec![record("First")]).unwrap();
        let store = Arc::new(MemoryStore::with_document(&existing));
        let log = EventLog::new(store, "events.json");

        let stored = log.append(&record("Second")).await.unwrap();

        assert_eq!(stored, vec![record("First"), record("Second")]);
    }

    #[tokio::test]
    async fn duplicate_appends_are_kept() {
        let store = Arc::new(MemoryStore::with_document("[]"));
        let log = EventLog::new(store, "events.json");

        log.append(&record("Meetup")).await.unwrap();
        let stored = log.append(&record("Meetup")).await.unwrap();

        assert_eq!(stored, vec![record("Meetup"), record("Meetup")]);
    }

    #[tokio::test]
    async fn append_survives_concurrent_writer() {
        let store = Arc::new(ContendedStore {
            inner: MemoryStore::with_document("[]"),
            rival: Mutex::new(Some(record("Rival"))),
        });
        let log = EventLog::new(store.clone(), "events.json");

        let stored = log.append(&record("Meetup")).await.unwrap();

        // The rival record landed first; neither append was lost.
        assert_eq!(stored, vec![record("Rival"), record("Meetup")]);
        assert_eq!(
            store.inner.document(),
            serde_json::to_string_pretty(&stored).unwrap()
        );
    }

    #[tokio::test]
    async fn append_gives_up_on_persistent_conflict() {
        struct AlwaysConflicting;

        #[async_trait]
        impl ObjectStore for AlwaysConflicting {
            async fn get(&self, _key: &str) -> Result<StoredObject> {
                Ok(StoredObject {
                    body: Bytes::from_static(b"[]"),
                    etag: Some("1".to_string()),
                })
            }

            async fn put(
                &self,
                key: &str,
                _body: Bytes,
                _content_type: &str,
                _if_match: Option<&str>,
            ) -> Result<()> {
                Err(Error::Conflict(format!("{} always contended", key)))
            }
        }

        let log = EventLog::new(Arc::new(AlwaysConflicting), "events.json");
        let err = log.append(&record("Meetup")).await.unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn corrupt_document_is_serialization_error() {
        let store = Arc::new(MemoryStore::with_document("not an array"));
        let log = EventLog::new(store, "events.json");

        let err = log.append(&record("Meetup")).await.unwrap_err();

        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn announcement_message_interpolates_fields() {
        let message = announcement_message(&record("Meetup"));
        assert_eq!(message, "New Event: Meetup on 2024-05-01\nMonthly sync");
    }
}
