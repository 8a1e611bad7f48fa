//! Signed, expiring mute-link tokens.
//!
//! A [`MuteTokenCodec`] turns an `(email, paper_id)` pair into an opaque,
//! URL-safe string that can later be verified without any server-side
//! session state. The token carries its issuance time and an HMAC-SHA256
//! signature over the whole encoded payload:
//!
//! ```text
//! base64url({"email":..,"paper_id":..,"iat":..}) "." base64url(hmac)
//! ```
//!
//! The signature is checked before the payload is decoded, so a tampered or
//! foreign token is always rejected as [`MuteTokenError::InvalidSignature`]
//! and never partially decoded.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::types::{PaperId, Timestamp};

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default token lifetime: 30 days.
pub const DEFAULT_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Separates the encoded payload from the encoded signature.
const SEPARATOR: char = '.';

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Reasons a mute token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MuteTokenError {
    /// The token is malformed or was not signed with this process's secret.
    #[error("Mute token signature is invalid")]
    InvalidSignature,

    /// The signature is valid but the token is older than the configured TTL.
    #[error("Mute token has expired")]
    Expired,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Signing secret and lifetime for mute tokens.
///
/// Loaded once at start-up and handed to [`MuteTokenCodec::new`].
#[derive(Clone)]
pub struct MuteTokenConfig {
    /// HMAC-SHA256 key. Tokens minted under another secret never verify.
    pub secret: String,
    /// Maximum token age accepted by [`MuteTokenCodec::verify`].
    pub ttl: Duration,
}

impl MuteTokenConfig {
    /// Config with the given secret and the default 30-day TTL.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
        }
    }

    /// Override the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl fmt::Debug for MuteTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MuteTokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A verified `(email, paper)` pair recovered from a mute token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutedPaper {
    pub email: String,
    pub paper_id: PaperId,
    pub issued_at: Timestamp,
}

#[derive(Serialize, Deserialize)]
struct TokenPayload {
    email: String,
    paper_id: PaperId,
    /// Issuance time as Unix seconds.
    iat: i64,
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// Mints and verifies mute tokens under a single process-wide secret.
#[derive(Clone)]
pub struct MuteTokenCodec {
    mac: HmacSha256,
    ttl: Duration,
}

impl MuteTokenCodec {
    pub fn new(config: &MuteTokenConfig) -> Self {
        let mac = HmacSha256::new_from_slice(config.secret.as_bytes())
            .expect("HMAC accepts any key length");
        Self {
            mac,
            ttl: config.ttl,
        }
    }

    /// The maximum accepted token age.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `(email, paper_id)` issued now.
    pub fn mint(&self, email: &str, paper_id: &str) -> String {
        self.mint_at(email, paper_id, Utc::now())
    }

    /// Mint a token with an explicit issuance time.
    pub fn mint_at(&self, email: &str, paper_id: &str, issued_at: Timestamp) -> String {
        let payload = TokenPayload {
            email: email.to_string(),
            paper_id: paper_id.to_string(),
            iat: issued_at.timestamp(),
        };
        let json = serde_json::to_vec(&payload).expect("token payload is always serializable");
        let encoded = URL_SAFE_NO_PAD.encode(json);
        let signature = URL_SAFE_NO_PAD.encode(self.sign(&encoded));
        format!("{encoded}{SEPARATOR}{signature}")
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<MutedPaper, MuteTokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as of `now`.
    ///
    /// A token exactly `ttl` old is still accepted; one second more is
    /// [`MuteTokenError::Expired`].
    pub fn verify_at(&self, token: &str, now: Timestamp) -> Result<MutedPaper, MuteTokenError> {
        let (encoded, signature) = token
            .split_once(SEPARATOR)
            .ok_or(MuteTokenError::InvalidSignature)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| MuteTokenError::InvalidSignature)?;

        let mut mac = self.mac.clone();
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| MuteTokenError::InvalidSignature)?;

        // Only authenticated bytes reach the decoder.
        let json = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| MuteTokenError::InvalidSignature)?;
        let payload: TokenPayload =
            serde_json::from_slice(&json).map_err(|_| MuteTokenError::InvalidSignature)?;
        let issued_at = Utc
            .timestamp_opt(payload.iat, 0)
            .single()
            .ok_or(MuteTokenError::InvalidSignature)?;

        if now.signed_duration_since(issued_at) > self.ttl {
            return Err(MuteTokenError::Expired);
        }

        Ok(MutedPaper {
            email: payload.email,
            paper_id: payload.paper_id,
            issued_at,
        })
    }

    fn sign(&self, encoded: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(encoded.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

impl fmt::Debug for MuteTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MuteTokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
