//! Bearer-token middleware and authenticated-user extractors.
//!
//! Requests pass through an allow-list before the token check:
//! - `OPTIONS` (CORS preflight), `/health`, and `/uploads/*` are always open
//! - registration and login are open
//! - pets and postings allow anonymous `GET`s
//!
//! On public paths a provided token is still parsed best-effort so handlers
//! can personalize responses (`is_mine`); an invalid token there is ignored
//! rather than rejected. Everywhere else a missing or invalid token is a 401.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

use super::error::ApiError;

/// Authenticated user id, inserted into request extensions by the middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("authentication required"))
    }
}

/// Authenticated user id when present; `None` on anonymous requests
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<i64>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<AuthUser>().map(|u| u.0)))
    }
}

/// Token-validating middleware with the public-path allow-list.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // CORS preflight never carries credentials
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path().to_owned();
    let token = bearer_token(&req);

    if is_public(req.method(), &path) {
        // Best-effort identity on public paths
        if let Some(token) = token {
            if let Ok(claims) = state.tokens.verify(&token) {
                if let Ok(id) = claims.user_id() {
                    req.extensions_mut().insert(AuthUser(id));
                }
            }
        }
        return Ok(next.run(req).await);
    }

    let token =
        token.ok_or_else(|| ApiError::unauthorized("authorization header missing or invalid"))?;

    let claims = state
        .tokens
        .verify(&token)
        .map_err(|e| ApiError::unauthorized(format!("invalid token: {}", e)))?;

    let user_id = claims
        .user_id()
        .map_err(|e| ApiError::unauthorized(format!("invalid token: {}", e)))?;

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

/// Pull the bearer token out of the Authorization header, if any.
fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_owned)
}

/// Paths reachable without a token.
fn is_public(method: &Method, path: &str) -> bool {
    if path == "/health" || path.starts_with("/uploads/") {
        return true;
    }

    if path == "/api/usuarios/login" || path == "/api/usuarios/registro" {
        return true;
    }

    // Read-only public access to the classifieds surface
    if method == Method::GET
        && (path.starts_with("/api/publicaciones") || path.starts_with("/api/mascotas"))
    {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_and_uploads_are_public() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::GET, "/uploads/mascotas/x.jpg"));
    }

    #[test]
    fn login_and_registration_are_public() {
        assert!(is_public(&Method::POST, "/api/usuarios/login"));
        assert!(is_public(&Method::POST, "/api/usuarios/registro"));
    }

    #[test]
    fn pet_and_posting_reads_are_public() {
        assert!(is_public(&Method::GET, "/api/mascotas"));
        assert!(is_public(&Method::GET, "/api/mascotas/5"));
        assert!(is_public(&Method::GET, "/api/publicaciones"));
        assert!(is_public(&Method::GET, "/api/publicaciones/9"));
    }

    #[test]
    fn writes_require_auth() {
        assert!(!is_public(&Method::POST, "/api/mascotas"));
        assert!(!is_public(&Method::PUT, "/api/mascotas/5"));
        assert!(!is_public(&Method::DELETE, "/api/publicaciones/9"));
        assert!(!is_public(&Method::POST, "/api/avistamientos"));
    }

    #[test]
    fn user_endpoints_require_auth() {
        assert!(!is_public(&Method::GET, "/api/usuarios"));
        assert!(!is_public(&Method::GET, "/api/usuarios/1"));
        assert!(!is_public(&Method::GET, "/api/avistamientos"));
    }
}
