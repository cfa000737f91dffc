//! HS256 compact access tokens.
//!
//! ```text
//! base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))
//! ```
//!
//! Segments are unpadded base64url, so tokens issued by any standard HS256
//! JWT library with the same secret verify here and vice versa.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use notegraph_core::defaults::TOKEN_ALGORITHM;
use notegraph_core::TokenClaims;

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    typ: Option<String>,
}

/// Signs and verifies access tokens with a symmetric key.
pub struct HmacTokenSigner {
    key: Zeroizing<Vec<u8>>,
    lifetime: Duration,
}

impl std::fmt::Debug for HmacTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenSigner")
            .field("key", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl HmacTokenSigner {
    /// Create a signer. An empty secret is rejected, as is a lifetime that is
    /// not positive or would put expiry beyond what a timestamp can hold.
    pub fn new(secret: &[u8], lifetime: Duration) -> CryptoResult<Self> {
        if secret.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        if lifetime <= Duration::zero() || Utc::now().checked_add_signed(lifetime).is_none() {
            return Err(CryptoError::InvalidLifetime(format!(
                "{} minutes",
                lifetime.num_minutes()
            )));
        }
        Ok(Self {
            key: Zeroizing::new(secret.to_vec()),
            lifetime,
        })
    }

    /// Lifetime applied to newly issued tokens.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    fn mac(&self) -> CryptoResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(&self.key).map_err(|_| CryptoError::EmptySecret)
    }

    /// Issue a token for `subject` as if signed at `issued_at`.
    pub fn sign_at(&self, subject: &str, issued_at: DateTime<Utc>) -> CryptoResult<String> {
        let header = TokenHeader {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };
        let expires_at = issued_at.checked_add_signed(self.lifetime).ok_or_else(|| {
            CryptoError::InvalidLifetime(format!(
                "expiry overflows when issued at {}",
                issued_at
            ))
        })?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify a token against the clock value `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> CryptoResult<TokenClaims> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(CryptoError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ));
        };

        let header: TokenHeader = serde_json::from_slice(&decode_segment(header_b64)?)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(CryptoError::UnsupportedAlgorithm(header.alg));
        }

        let signature = decode_segment(signature_b64)?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CryptoError::InvalidSignature)?;

        let claims: TokenClaims = serde_json::from_slice(&decode_segment(claims_b64)?)?;
        if now.timestamp() >= claims.exp {
            debug!(
                subsystem = "crypto",
                component = "token",
                exp = claims.exp,
                "Rejected expired token"
            );
            return Err(CryptoError::TokenExpired);
        }

        Ok(claims)
    }
}

fn decode_segment(segment: &str) -> CryptoResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| CryptoError::MalformedToken(e.to_string()))
}

impl notegraph_core::TokenSigner for HmacTokenSigner {
    fn sign(&self, subject: &str) -> notegraph_core::Result<String> {
        Ok(self.sign_at(subject, Utc::now())?)
    }
}

impl notegraph_core::TokenVerifier for HmacTokenSigner {
    fn verify(&self, token: &str) -> notegraph_core::Result<TokenClaims> {
        Ok(self.verify_at(token, Utc::now())?)
    }
}
