//! Note CRUD over the vector-store collection.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use notegraph_core::{
    EmbeddingBackend, Error, Note, NoteInDb, NoteRecord, NoteStore, Result, Vector,
};

/// What `update` does when no note has the requested id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdatePolicy {
    /// Write blindly and echo the payload back with the requested id, even if
    /// nothing matched. No record is created.
    #[default]
    Permissive,
    /// Fail with `NoteNotFound`.
    Strict,
}

/// Note operations over an injected store and embedding backend.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    embedder: Arc<dyn EmbeddingBackend>,
    policy: UpdatePolicy,
}

impl NoteService {
    pub fn new(
        store: Arc<dyn NoteStore>,
        embedder: Arc<dyn EmbeddingBackend>,
        policy: UpdatePolicy,
    ) -> Self {
        Self {
            store,
            embedder,
            policy,
        }
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub async fn create(&self, note: Note) -> Result<NoteInDb> {
        note.validate()?;
        let start = Instant::now();

        let embedding = self.embed(&note).await?;
        let stored = self.store.insert(NoteRecord::new(note, embedding)).await?;

        info!(
            subsystem = "api",
            component = "notes",
            op = "create",
            note_id = stored.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note created"
        );
        Ok(stored)
    }

    pub async fn list(&self) -> Result<Vec<NoteInDb>> {
        let notes = self.store.list().await?;
        debug!(
            subsystem = "api",
            component = "notes",
            op = "list",
            result_count = notes.len(),
            "Notes listed"
        );
        Ok(notes)
    }

    pub async fn get(&self, id: i64) -> Result<NoteInDb> {
        self.store.fetch(id).await?.ok_or(Error::NoteNotFound(id))
    }

    /// Overwrite the note with `id`.
    ///
    /// Under [`UpdatePolicy::Permissive`] a missing id is not detected by the
    /// caller: the response is the submitted payload with `id` attached.
    pub async fn update(&self, id: i64, note: Note) -> Result<NoteInDb> {
        note.validate()?;

        if self.policy == UpdatePolicy::Strict && !self.store.exists(id).await? {
            return Err(Error::NoteNotFound(id));
        }

        let embedding = self.embed(&note).await?;
        let matched = self
            .store
            .update(id, NoteRecord::new(note.clone(), embedding))
            .await?;

        if matched == 0 {
            if self.policy == UpdatePolicy::Strict {
                return Err(Error::NoteNotFound(id));
            }
            warn!(
                subsystem = "api",
                component = "notes",
                op = "update",
                note_id = id,
                rows_affected = matched,
                "Update matched no note; returning submitted payload"
            );
        } else {
            info!(
                subsystem = "api",
                component = "notes",
                op = "update",
                note_id = id,
                rows_affected = matched,
                "Note updated"
            );
        }
        Ok(note.with_id(id))
    }

    async fn embed(&self, note: &Note) -> Result<Vector> {
        self.embedder
            .embed_texts(&[note.embedding_text()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Embedding backend returned no vectors".to_string()))
    }
}
