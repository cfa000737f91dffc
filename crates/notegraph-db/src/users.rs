//! Process-lifetime user table.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use notegraph_core::{Error, Result, UserInDb, UserStore};

/// In-memory implementation of [`UserStore`].
///
/// Registrations live as long as the process. The existence check and insert
/// run under one write lock, so concurrent registrations of the same username
/// have exactly one winner.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserInDb>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, username: &str) -> Result<Option<UserInDb>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: UserInDb) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(Error::Conflict(format!(
                "Username '{}' already registered",
                user.username
            )));
        }
        debug!(
            subsystem = "db",
            component = "users",
            op = "insert",
            username = %user.username,
            "User registered"
        );
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn contains(&self, username: &str) -> Result<bool> {
        Ok(self.users.read().await.contains_key(username))
    }
}
