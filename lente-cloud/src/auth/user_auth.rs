//! User JWT authentication
//!
//! Tokens are issued by the back office (HS256, shared secret) and carry
//! the user id and the organization the session is bound to.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};

use crate::monitoring::{EventKind, SecurityEvent, Severity};
use crate::state::AppState;

/// JWT claims for back-office users
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: String,
    /// Organization ID
    pub org: String,
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated user identity extracted from JWT
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub user_id: String,
    pub org_id: String,
    pub email: String,
}

impl From<UserClaims> for UserIdentity {
    fn from(claims: UserClaims) -> Self {
        Self {
            user_id: claims.sub,
            org_id: claims.org,
            email: claims.email,
        }
    }
}

/// Issue a JWT the way the login service does
///
/// Tokens are minted elsewhere; this only feeds the auth tests.
#[cfg(test)]
pub(crate) fn create_token(
    user_id: &str,
    org_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    const JWT_EXPIRY_HOURS: i64 = 12;

    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        org: org_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry
pub fn decode_token(token: &str, secret: &str) -> Result<UserClaims, AppError> {
    jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::invalid_token("Invalid token"),
        }
    })
}

/// Middleware that verifies the bearer JWT on every `/api/` route
///
/// Injects [`UserIdentity`] into the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight and non-API routes pass through
    if request.method() == http::Method::OPTIONS || !request.uri().path().starts_with("/api/") {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::not_authenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::invalid_token("Invalid Authorization format"))?;

    let claims = match decode_token(token, &state.jwt_secret) {
        Ok(claims) => claims,
        Err(err) => {
            state
                .monitor
                .record(
                    SecurityEvent::new(
                        EventKind::InvalidToken,
                        Severity::Medium,
                        err.message.clone(),
                    )
                    .subject(client_ip(&request))
                    .path(request.uri().path()),
                )
                .await;
            return Err(err);
        }
    };

    request.extensions_mut().insert(UserIdentity::from(claims));

    Ok(next.run(request).await)
}

/// X-Forwarded-For first (load balancer), then the peer address
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        let ip = first.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}
