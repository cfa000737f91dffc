//! Process-local note collection.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use notegraph_core::{NoteInDb, NoteRecord, NoteStore, Result};

#[derive(Debug)]
struct Collection {
    next_id: i64,
    notes: BTreeMap<i64, NoteRecord>,
}

/// In-memory implementation of [`NoteStore`].
///
/// Ids start at 1 and are never reused. Contents are lost when the process
/// exits.
#[derive(Debug)]
pub struct InMemoryNoteStore {
    inner: RwLock<Collection>,
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collection {
                next_id: 1,
                notes: BTreeMap::new(),
            }),
        }
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.inner.read().await.notes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn to_public(id: i64, record: &NoteRecord) -> NoteInDb {
    record.note.clone().with_id(id)
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn insert(&self, record: NoteRecord) -> Result<NoteInDb> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let stored = to_public(id, &record);
        inner.notes.insert(id, record);

        debug!(
            subsystem = "db",
            component = "memory_notes",
            op = "insert",
            note_id = id,
            "Note inserted"
        );
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<NoteInDb>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notes
            .iter()
            .map(|(id, record)| to_public(*id, record))
            .collect())
    }

    async fn fetch(&self, id: i64) -> Result<Option<NoteInDb>> {
        let inner = self.inner.read().await;
        Ok(inner.notes.get(&id).map(|record| to_public(id, record)))
    }

    async fn update(&self, id: i64, record: NoteRecord) -> Result<u64> {
        let mut inner = self.inner.write().await;
        match inner.notes.get_mut(&id) {
            Some(existing) => {
                *existing = record;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        Ok(self.inner.read().await.notes.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notegraph_core::{Note, Vector};

    fn record(title: &str) -> NoteRecord {
        NoteRecord::new(
            Note {
                title: title.to_string(),
                content: format!("{} body", title),
                google_doc_id: None,
            },
            Vector::from(vec![0.1; 4]),
        )
    }

    #[tokio::test]
    async fn test_ids_are_sequential_from_one() {
        let store = InMemoryNoteStore::new();
        let a = store.insert(record("a")).await.unwrap();
        let b = store.insert(record("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_returns_inserted_fields() {
        let store = InMemoryNoteStore::new();
        let created = store.insert(record("groceries")).await.unwrap();
        let fetched = store.fetch(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.content, "groceries body");
        assert!(store.fetch(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let store = InMemoryNoteStore::new();
        for title in ["c", "a", "b"] {
            store.insert(record(title)).await.unwrap();
        }
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_missing_id_creates_nothing() {
        let store = InMemoryNoteStore::new();
        assert_eq!(store.update(42, record("ghost")).await.unwrap(), 0);
        assert!(store.is_empty().await);
        assert!(!store.exists(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let store = InMemoryNoteStore::new();
        let created = store.insert(record("draft")).await.unwrap();
        assert_eq!(store.update(created.id, record("final")).await.unwrap(), 1);

        let fetched = store.fetch(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "final");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused() {
        let store = InMemoryNoteStore::new();
        store.insert(record("a")).await.unwrap();
        store.update(1, record("a2")).await.unwrap();
        let b = store.insert(record("b")).await.unwrap();
        assert_eq!(b.id, 2);
    }
}
