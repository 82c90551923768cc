//! Signed bearer tokens proving user identity.
//!
//! A token is two base64url segments, `payload.signature`: the payload is
//! the claims JSON, the signature an HMAC-SHA256 over the encoded payload
//! with the server-held secret. Verification is stateless: no store lookup,
//! just signature + expiry. Valid iff the signature matches and
//! `now < expires_at`.

use crate::user::PublicUser;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Tokens expire 7 days after issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing token")]
    Missing,
    #[error("Invalid token")]
    Malformed,
    #[error("Invalid token")]
    BadSignature,
    #[error("Invalid token")]
    Expired,
}

/// Claims embedded in every token. `iat`/`exp` are epoch seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn public_user(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Issues and verifies signed tokens with a server-held secret.
pub struct AccessGate {
    secret: Vec<u8>,
}

impl AccessGate {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    pub fn issue(&self, user: &PublicUser) -> String {
        self.issue_at(user, Utc::now())
    }

    fn issue_at(&self, user: &PublicUser, issued_at: DateTime<Utc>) -> String {
        let claims = Claims {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        // Claims is a plain struct of strings and ints; serialization cannot fail.
        let payload = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).expect("claims serialize to JSON"));
        let signature = URL_SAFE_NO_PAD.encode(self.sign(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.secret).expect("hmac key")
    }
}
