use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use domain::Id;

/// The id of the user whose bearer credential was accepted by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AuthenticatedUser(pub Id);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // `require_auth` stores the resolved user in the request extensions. A
    // handler mounted without that middleware always rejects.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
    }
}

/// Extracts the credential from an `Authorization: Bearer <credential>` header.
pub(crate) fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.trim().split_once(' ')?;

    if scheme.eq_ignore_ascii_case("bearer") && !credential.trim().is_empty() {
        Some(credential.trim())
    } else {
        None
    }
}
