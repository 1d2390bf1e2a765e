use axum::http::HeaderMap;

use crate::services::auth::{
    locator::TokenLocator,
    principal::{AnonymousPrincipal, Identity, Principal},
    verifier::{AuthFailure, TokenVerifier},
};

/// Single entry point for request authentication.
///
/// - no token            → `Ok(Identity::Anonymous)` (endpoint policy decides)
/// - token, bad/expired  → `Err(AuthFailure)` (HTTP layer answers 401)
/// - token, verified     → `Ok(Identity::Authenticated)`
///
/// Holds no per-request state; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AuthGate {
    locator: TokenLocator,
    verifier: TokenVerifier,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            locator: TokenLocator,
            verifier,
        }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthFailure> {
        let Some(token) = self.locator.locate(headers) else {
            tracing::debug!("no access token in cookie or Authorization header");
            return Ok(Identity::Anonymous(AnonymousPrincipal));
        };

        let claims = match self.verifier.verify(&token) {
            Ok(claims) => claims,
            Err(failure) => {
                tracing::warn!(source = ?token.source(), reason = %failure, "authentication failed");
                return Err(failure);
            }
        };

        let expires_at = claims.exp;
        let principal = Principal::from_claims(claims);
        tracing::debug!(
            expires_at,
            user_id = %principal.id(),
            username = principal.username().unwrap_or("-"),
            source = ?token.source(),
            "request authenticated"
        );

        Ok(principal.into())
    }
}
