//! Note collection backed by a pgvector table.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::{debug, info};

use notegraph_core::defaults::{CONTENT_MAX_LEN, GOOGLE_DOC_ID_MAX_LEN, TITLE_MAX_LEN};
use notegraph_core::{Error, NoteInDb, NoteRecord, NoteStore, Result};

use crate::validation::validate_collection_name;

/// Statements for one collection, rendered once at construction.
#[derive(Debug, Clone)]
struct CollectionSql {
    create_table: String,
    create_index: String,
    insert: String,
    list: String,
    fetch: String,
    update: String,
    exists: String,
}

impl CollectionSql {
    fn new(collection: &str, dimension: usize) -> Self {
        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {collection} (
                    id BIGSERIAL PRIMARY KEY,
                    title VARCHAR({TITLE_MAX_LEN}) NOT NULL,
                    content VARCHAR({CONTENT_MAX_LEN}) NOT NULL,
                    embedding vector({dimension}) NOT NULL,
                    google_doc_id VARCHAR({GOOGLE_DOC_ID_MAX_LEN})
                )"
            ),
            create_index: format!(
                "CREATE INDEX IF NOT EXISTS {collection}_embedding_hnsw
                 ON {collection} USING hnsw (embedding vector_cosine_ops)"
            ),
            insert: format!(
                "INSERT INTO {collection} (title, content, embedding, google_doc_id)
                 VALUES ($1, $2, $3, $4)
                 RETURNING id"
            ),
            list: format!(
                "SELECT id, title, content, google_doc_id
                 FROM {collection}
                 ORDER BY id"
            ),
            fetch: format!(
                "SELECT id, title, content, google_doc_id
                 FROM {collection}
                 WHERE id = $1"
            ),
            update: format!(
                "UPDATE {collection}
                 SET title = $2, content = $3, embedding = $4, google_doc_id = $5
                 WHERE id = $1"
            ),
            exists: format!("SELECT EXISTS(SELECT 1 FROM {collection} WHERE id = $1)"),
        }
    }
}

/// PostgreSQL implementation of [`NoteStore`].
///
/// Notes live in a single table named after the collection, with the embedding
/// in a `vector(D)` column indexed by HNSW under cosine distance.
pub struct PgNoteStore {
    pool: Pool<Postgres>,
    collection: String,
    dimension: usize,
    sql: CollectionSql,
}

impl PgNoteStore {
    /// Create a store for `collection` with embeddings of `dimension` components.
    ///
    /// The name is validated here; nothing touches the database until
    /// [`ensure_collection`](Self::ensure_collection).
    pub fn new(pool: Pool<Postgres>, collection: &str, dimension: usize) -> Result<Self> {
        validate_collection_name(collection)?;
        if dimension == 0 {
            return Err(Error::Config(
                "Embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            pool,
            collection: collection.to_string(),
            dimension,
            sql: CollectionSql::new(collection, dimension),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Create the extension, table and index if missing, then check that an
    /// existing table has the configured embedding dimension.
    pub async fn ensure_collection(&self) -> Result<()> {
        let start = Instant::now();

        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        sqlx::query(&self.sql.create_table)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        sqlx::query(&self.sql.create_index)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        // pgvector stores the declared dimension as the column typmod.
        let declared: i32 = sqlx::query_scalar(
            "SELECT atttypmod FROM pg_attribute
             WHERE attrelid = to_regclass($1) AND attname = 'embedding'",
        )
        .bind(&self.collection)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        if declared != self.dimension as i32 {
            return Err(Error::Config(format!(
                "Collection '{}' stores {}-dimensional embeddings but the embedder produces {}",
                self.collection, declared, self.dimension
            )));
        }

        info!(
            subsystem = "db",
            component = "notes",
            op = "ensure_collection",
            collection = %self.collection,
            dimension = self.dimension,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note collection ready"
        );
        Ok(())
    }

    fn check_dimension(&self, record: &NoteRecord) -> Result<()> {
        let got = record.embedding.as_slice().len();
        if got != self.dimension {
            return Err(Error::Embedding(format!(
                "Expected {}-dimensional embedding, got {}",
                self.dimension, got
            )));
        }
        Ok(())
    }
}

/// Decode a note row. A table whose columns do not decode as the expected
/// types (an existing table with another schema) is a database error.
fn row_to_note(row: PgRow) -> Result<NoteInDb> {
    Ok(NoteInDb {
        id: row.try_get("id").map_err(Error::Database)?,
        title: row.try_get("title").map_err(Error::Database)?,
        content: row.try_get("content").map_err(Error::Database)?,
        google_doc_id: row.try_get("google_doc_id").map_err(Error::Database)?,
    })
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn insert(&self, record: NoteRecord) -> Result<NoteInDb> {
        self.check_dimension(&record)?;
        let start = Instant::now();

        let id: i64 = sqlx::query_scalar(&self.sql.insert)
            .bind(&record.note.title)
            .bind(&record.note.content)
            .bind(&record.embedding)
            .bind(&record.note.google_doc_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Note inserted"
        );
        Ok(record.note.with_id(id))
    }

    async fn list(&self) -> Result<Vec<NoteInDb>> {
        let rows = sqlx::query(&self.sql.list)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "list",
            result_count = rows.len(),
            "Notes listed"
        );
        rows.into_iter().map(row_to_note).collect()
    }

    async fn fetch(&self, id: i64) -> Result<Option<NoteInDb>> {
        let row = sqlx::query(&self.sql.fetch)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.map(row_to_note).transpose()
    }

    async fn update(&self, id: i64, record: NoteRecord) -> Result<u64> {
        self.check_dimension(&record)?;

        let result = sqlx::query(&self.sql.update)
            .bind(id)
            .bind(&record.note.title)
            .bind(&record.note.content)
            .bind(&record.embedding)
            .bind(&record.note.google_doc_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "update",
            note_id = id,
            rows_affected = result.rows_affected(),
            "Note update applied"
        );
        Ok(result.rows_affected())
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(&self.sql.exists)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }
}
