//! Admin session verification.
//!
//! Admin routes require a session token that the identity provider resolves to explicit
//! admin claims. Token comparison is constant-time to mitigate timing attacks.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::config::AdminSession;
use crate::errors::AppError;

/// Cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "__session";
/// Header alternative to the cookie for API clients.
pub const SESSION_HEADER: &str = "x-admin-session";

/// Identity of a verified admin, attached to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminClaims {
    pub admin_id: String,
}

/// Resolves session tokens to admin claims.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Option<AdminClaims>;
}

/// Verifies tokens against a fixed list of configured admin sessions.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionVerifier {
    sessions: Vec<AdminSession>,
}

impl StaticSessionVerifier {
    pub fn new(sessions: Vec<AdminSession>) -> Self {
        Self { sessions }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionVerifier {
    async fn verify(&self, token: &str) -> Option<AdminClaims> {
        // Compare against every session so timing does not reveal the match position.
        let mut matched = None;
        for session in &self.sessions {
            if constant_time_compare(token, &session.token) && matched.is_none() {
                matched = Some(AdminClaims {
                    admin_id: session.admin_id.clone(),
                });
            }
        }
        matched
    }
}

/// Admin authentication layer. On success the request carries [`AdminClaims`].
pub async fn admin_auth_layer(
    verifier: Arc<dyn SessionVerifier>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(request.headers()) else {
        return AppError::Unauthorized("Admin session required".to_string()).into_response();
    };

    match verifier.verify(&token).await {
        Some(claims) => {
            tracing::debug!(admin_id = %claims.admin_id, "Admin session verified");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        None => {
            tracing::warn!("Rejected invalid admin session");
            AppError::Unauthorized("Invalid or expired admin session".to_string()).into_response()
        }
    }
}

/// Find the session token in the cookie, the session header or a bearer token.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string());

    let from_header = || {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
    };

    let from_bearer = || {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_string())
    };

    from_cookie
        .or_else(from_header)
        .or_else(from_bearer)
        .filter(|token| !token.is_empty())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
