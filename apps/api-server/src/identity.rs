//! Caller identity resolution.
//!
//! The bearer token is resolved once per request and, when valid, the
//! identity is injected into the GraphQL request data. Owner-scoped mutations
//! perform an explicit login check at the top of the handler instead of
//! relying on transport-level middleware.

use actix_web::{HttpRequest, http::header};

use scribe_core::ports::{TokenClaims, TokenScope, TokenService};

/// Authenticated caller identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: uuid::Uuid,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// Resolve the caller identity from the Authorization header, if any.
///
/// A missing, malformed or invalid token yields `None`; the request proceeds
/// unauthenticated and mutations reject it at their login check.
pub fn identity_from_request(
    req: &HttpRequest,
    token_service: &dyn TokenService,
) -> Option<Identity> {
    let header_value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header_value.strip_prefix("Bearer ")?;

    match token_service.verify(token, TokenScope::Session) {
        Ok(claims) => Some(claims.into()),
        Err(e) => {
            tracing::debug!("Rejected bearer token: {}", e);
            None
        }
    }
}
