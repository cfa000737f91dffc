//! Service configuration from the environment.

use std::net::SocketAddr;

use chrono::{Duration, Utc};
use sqlx::postgres::PgConnectOptions;
use zeroize::Zeroizing;

use notegraph_core::defaults::{
    ACCESS_TOKEN_EXPIRE_MINUTES, NOTE_COLLECTION, RATE_LIMIT_PERIOD_SECS, RATE_LIMIT_REQUESTS,
    SERVER_PORT,
};
use notegraph_core::{Error, Result};
use notegraph_inference::EmbeddingConfig;

use crate::services::UpdatePolicy;

/// Where notes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStoreKind {
    /// PostgreSQL + pgvector collection.
    Pgvector,
    /// Process-local collection, lost on restart.
    Memory,
}

/// Vector store connection parts, used when `DATABASE_URL` is unset.
#[derive(Clone, PartialEq, Eq)]
pub struct VectorDbConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for VectorDbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorDbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// CORS origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// Global rate limit: `requests` per `period_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub period_secs: u64,
}

/// Complete service configuration.
pub struct ApiConfig {
    pub secret_key: Zeroizing<String>,
    pub token_expire_minutes: i64,
    pub host: String,
    pub port: u16,
    pub note_store: NoteStoreKind,
    pub database_url: Option<String>,
    pub vector_db: VectorDbConfig,
    pub collection: String,
    pub embedding: EmbeddingConfig,
    pub update_policy: UpdatePolicy,
    pub allowed_origins: AllowedOrigins,
    pub rate_limit: Option<RateLimitConfig>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("secret_key", &"[REDACTED]")
            .field("token_expire_minutes", &self.token_expire_minutes)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("note_store", &self.note_store)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("vector_db", &self.vector_db)
            .field("collection", &self.collection)
            .field("embedding", &self.embedding)
            .field("update_policy", &self.update_policy)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl ApiConfig {
    /// Load from the process environment.
    ///
    /// A missing or empty `SECRET_KEY` is an error; there is no fallback key.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .map(Zeroizing::new)
            .ok_or_else(|| {
                Error::Config("SECRET_KEY must be set to a non-empty value".to_string())
            })?;

        let token_expire_minutes = parse_or(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        token_lifetime(token_expire_minutes)?;

        let note_store = match lookup("NOTE_STORE")
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("pgvector") | Some("postgres") => NoteStoreKind::Pgvector,
            Some("memory") => NoteStoreKind::Memory,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Unknown NOTE_STORE '{}' (expected 'pgvector' or 'memory')",
                    other
                )))
            }
        };

        let vector_db = VectorDbConfig {
            host: lookup("VECTOR_DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_or(&lookup, "VECTOR_DB_PORT", 5432)?,
            name: lookup("VECTOR_DB_NAME").unwrap_or_else(|| "notegraph".to_string()),
            user: lookup("VECTOR_DB_USER").unwrap_or_else(|| "notegraph".to_string()),
            password: lookup("VECTOR_DB_PASSWORD").unwrap_or_default(),
        };

        let update_policy = if parse_bool(&lookup, "STRICT_NOTE_UPDATES")? {
            UpdatePolicy::Strict
        } else {
            UpdatePolicy::Permissive
        };

        let rate_limit = if parse_bool(&lookup, "RATE_LIMIT_ENABLED")? {
            let requests: u32 = parse_or(&lookup, "RATE_LIMIT_REQUESTS", RATE_LIMIT_REQUESTS as u32)?;
            let period_secs: u64 =
                parse_or(&lookup, "RATE_LIMIT_PERIOD_SECS", RATE_LIMIT_PERIOD_SECS)?;
            if requests == 0 || period_secs == 0 {
                return Err(Error::Config(
                    "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
                ));
            }
            Some(RateLimitConfig {
                requests,
                period_secs,
            })
        } else {
            None
        };

        Ok(Self {
            secret_key,
            token_expire_minutes,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", SERVER_PORT)?,
            note_store,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            vector_db,
            collection: lookup("VECTOR_COLLECTION").unwrap_or_else(|| NOTE_COLLECTION.to_string()),
            embedding: EmbeddingConfig::from_lookup(&lookup)?,
            update_policy,
            allowed_origins: parse_origins(lookup("ALLOWED_ORIGINS")),
            rate_limit,
        })
    }

    /// Lifetime of issued access tokens.
    pub fn token_lifetime(&self) -> Result<Duration> {
        token_lifetime(self.token_expire_minutes)
    }

    /// Listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid HOST/PORT: {}", e)))
    }

    /// Connect options for the vector store, from `DATABASE_URL` when set,
    /// otherwise from the `VECTOR_DB_*` parts.
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        if let Some(url) = &self.database_url {
            return url.parse().map_err(Error::Database);
        }
        let mut options = PgConnectOptions::new()
            .host(&self.vector_db.host)
            .port(self.vector_db.port)
            .database(&self.vector_db.name)
            .username(&self.vector_db.user);
        if !self.vector_db.password.is_empty() {
            options = options.password(&self.vector_db.password);
        }
        Ok(options)
    }
}

/// Token lifetime for `minutes`, which must be positive and leave expiry
/// timestamps representable.
fn token_lifetime(minutes: i64) -> Result<Duration> {
    if minutes <= 0 {
        return Err(Error::Config(
            "ACCESS_TOKEN_EXPIRE_MINUTES must be positive".to_string(),
        ));
    }
    Duration::try_minutes(minutes)
        .filter(|lifetime| Utc::now().checked_add_signed(*lifetime).is_some())
        .ok_or_else(|| {
            Error::Config(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES is too large: {}",
                minutes
            ))
        })
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(Error::Config(format!("Invalid {} '{}'", key, other))),
    }
}

fn parse_origins(raw: Option<String>) -> AllowedOrigins {
    let Some(raw) = raw else {
        return AllowedOrigins::Any;
    };
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}
