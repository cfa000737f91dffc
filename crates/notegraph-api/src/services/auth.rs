//! Registration, login and bearer-token authentication.

use std::sync::Arc;

use tracing::{debug, info, warn};

use notegraph_core::{
    AccessToken, Error, PasswordHasher, Result, TokenSigner, TokenVerifier, User, UserInDb,
    UserStore,
};

pub const INVALID_CREDENTIALS: &str = "Could not validate credentials";
pub const INCORRECT_LOGIN: &str = "Incorrect username or password";
pub const USERNAME_TAKEN: &str = "Username already registered";

/// Auth operations over injected store, hasher and token capabilities.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        Self {
            users,
            hasher,
            signer,
            verifier,
        }
    }

    /// Register a new user. Only the salted hash of `password` is stored.
    pub async fn register(&self, user: User, password: &str) -> Result<User> {
        if user.username.trim().is_empty() {
            return Err(Error::InvalidInput("Username must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(Error::InvalidInput("Password must not be empty".to_string()));
        }
        // Skip the hash cost for names that are obviously taken; the insert
        // below still decides races.
        if self.users.contains(&user.username).await? {
            return Err(Error::Conflict(USERNAME_TAKEN.to_string()));
        }

        let hashed_password = self.hash(password).await?;
        let record = UserInDb {
            username: user.username.clone(),
            email: user.email.clone(),
            hashed_password,
        };
        self.users.insert(record).await.map_err(|e| match e {
            Error::Conflict(_) => Error::Conflict(USERNAME_TAKEN.to_string()),
            other => other,
        })?;

        info!(
            subsystem = "api",
            component = "auth",
            op = "register",
            username = %user.username,
            "User registered"
        );
        Ok(user)
    }

    /// Exchange credentials for a signed bearer token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        let Some(user) = self.users.get(username).await? else {
            debug!(
                subsystem = "api",
                component = "auth",
                op = "login",
                username = %username,
                "Unknown username"
            );
            return Err(Error::Unauthorized(INCORRECT_LOGIN.to_string()));
        };

        if !self.verify(password, &user.hashed_password).await? {
            warn!(
                subsystem = "api",
                component = "auth",
                op = "login",
                username = %username,
                "Password mismatch"
            );
            return Err(Error::Unauthorized(INCORRECT_LOGIN.to_string()));
        }

        let token = self.signer.sign(&user.username)?;
        info!(
            subsystem = "api",
            component = "auth",
            op = "login",
            username = %username,
            "Access token issued"
        );
        Ok(AccessToken::bearer(token))
    }

    /// Resolve a bearer token to a registered user.
    ///
    /// Malformed, forged and expired tokens, and tokens whose subject is not
    /// registered, all fail with the same `Unauthorized` message.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(
                subsystem = "api",
                component = "auth",
                op = "authenticate",
                error = %e,
                "Token rejected"
            );
            match e {
                Error::Unauthorized(_) => Error::Unauthorized(INVALID_CREDENTIALS.to_string()),
                other => other,
            }
        })?;

        match self.users.get(&claims.sub).await? {
            Some(user) => Ok(user.to_user()),
            None => {
                debug!(
                    subsystem = "api",
                    component = "auth",
                    op = "authenticate",
                    username = %claims.sub,
                    "Token subject is not a registered user"
                );
                Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    async fn hash(&self, password: &str) -> Result<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify(&self, password: &str, hashed: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hashed = hashed.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed))
            .await
            .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))?
    }
}
