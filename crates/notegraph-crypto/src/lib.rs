//! # notegraph-crypto
//!
//! Credential primitives for notegraph.
//!
//! - **Password hashing**: Argon2id, PHC string format, random 16-byte salt
//! - **Access tokens**: compact JWS signed with HMAC-SHA256 (`HS256`),
//!   claims `sub` and `exp`
//!
//! Both implement the capability traits from `notegraph-core`
//! (`PasswordHasher`, `TokenSigner`, `TokenVerifier`).
//!
//! ## Example
//!
//! ```rust
//! use chrono::Duration;
//! use notegraph_core::{TokenSigner, TokenVerifier};
//! use notegraph_crypto::HmacTokenSigner;
//!
//! let signer = HmacTokenSigner::new(b"change-me", Duration::minutes(30)).unwrap();
//! let token = signer.sign("alice").unwrap();
//! assert_eq!(signer.verify(&token).unwrap().sub, "alice");
//! ```

pub mod error;
pub mod password;
pub mod token;

pub use error::{CryptoError, CryptoResult};
pub use password::{Argon2PasswordHasher, PasswordParams};
pub use token::HmacTokenSigner;
