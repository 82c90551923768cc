//! Registration, login, and the bearer-token request guard.
//!
//! Every ownership-scoped handler takes an [`AuthUser`] argument; extraction
//! runs before the handler body, so an invalid token short-circuits the
//! request before any inference, enrichment, or store access happens.

use crate::error::ApiError;
use crate::store::RegisterError;
use crate::SharedState;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::Json;
use nereus_core::{Claims, PublicUser, TokenError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (name, email, password) = match (req.name, req.email, req.password) {
        (Some(n), Some(e), Some(p)) if !n.is_empty() && !e.is_empty() && !p.is_empty() => {
            (n, e, p)
        }
        _ => return Err(ApiError::InvalidInput("Missing fields".to_string())),
    };

    let user = state
        .users
        .register(&name, &email, &password)
        .map_err(|e: RegisterError| ApiError::Conflict(e.to_string()))?;
    tracing::info!("registered user {} ({})", user.id, user.email);

    let public = user.public();
    Ok(Json(AuthResponse {
        token: state.gate.issue(&public),
        user: public,
    }))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = req
        .email
        .zip(req.password)
        .and_then(|(email, password)| state.users.authenticate(&email, &password))
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let public = user.public();
    Ok(Json(AuthResponse {
        token: state.gate.issue(&public),
        user: public,
    }))
}

/// Verified request identity. Stateless: the claims come straight out of the
/// token, no store lookup.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let token = header.strip_prefix("Bearer ").unwrap_or(header);
        if token.is_empty() {
            return Err(ApiError::from(TokenError::Missing));
        }
        let claims = state.gate.verify(token)?;
        Ok(AuthUser(claims))
    }
}
