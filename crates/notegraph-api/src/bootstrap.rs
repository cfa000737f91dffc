//! Wiring configured components into [`AppState`].

use std::sync::Arc;

use tracing::info;

use notegraph_core::{EmbeddingBackend, Error, NoteStore, Result};
use notegraph_crypto::{Argon2PasswordHasher, HmacTokenSigner};
use notegraph_db::{create_pool_with_options, InMemoryNoteStore, InMemoryUserStore, PgNoteStore, PoolConfig};

use crate::config::{ApiConfig, NoteStoreKind};
use crate::services::{AuthService, NoteService};
use crate::state::{build_rate_limiter, AppState};

/// Build the application state described by `config`.
///
/// Fails if the embedder cannot produce vectors of the configured dimension or
/// the note collection cannot be opened with that dimension.
pub async fn build_state(config: &ApiConfig) -> Result<AppState> {
    let signer = Arc::new(HmacTokenSigner::new(
        config.secret_key.as_bytes(),
        config.token_lifetime()?,
    )?);
    let auth = AuthService::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(Argon2PasswordHasher::default()),
        signer.clone(),
        signer,
    );

    let embedder = config.embedding.build()?;
    check_embedder(embedder.as_ref(), config.embedding.dimension).await?;

    let store = open_note_store(config, embedder.dimension()).await?;
    let notes = NoteService::new(store, embedder, config.update_policy);

    let mut state = AppState::new(auth, notes);
    if let Some(rate_limit) = &config.rate_limit {
        state = state.with_rate_limiter(build_rate_limiter(rate_limit)?);
        info!(
            requests = rate_limit.requests,
            period_secs = rate_limit.period_secs,
            "Rate limiting enabled"
        );
    }
    Ok(state)
}

/// Embed a probe text and compare its length to the collection dimension.
async fn check_embedder(embedder: &dyn EmbeddingBackend, expected: usize) -> Result<()> {
    let probe = embedder
        .embed_texts(&["notegraph dimension probe".to_string()])
        .await?;
    let got = probe.first().map(|v| v.as_slice().len()).unwrap_or(0);
    if got != expected {
        return Err(Error::Config(format!(
            "Embedding model '{}' produces {}-dimensional vectors but EMBEDDING_DIM is {}",
            embedder.model_name(),
            got,
            expected
        )));
    }
    Ok(())
}

async fn open_note_store(config: &ApiConfig, dimension: usize) -> Result<Arc<dyn NoteStore>> {
    match config.note_store {
        NoteStoreKind::Memory => {
            info!(
                subsystem = "api",
                component = "bootstrap",
                "Using in-memory note collection; notes are lost on restart"
            );
            Ok(Arc::new(InMemoryNoteStore::new()))
        }
        NoteStoreKind::Pgvector => {
            let pool = create_pool_with_options(config.connect_options()?, PoolConfig::default())
                .await?;
            let store = PgNoteStore::new(pool, &config.collection, dimension)?;
            store.ensure_collection().await?;
            Ok(Arc::new(store))
        }
    }
}
