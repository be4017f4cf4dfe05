use crate::extractors::authenticated_user::{bearer_credential, AuthenticatedUser};
use crate::{AppState, Error};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::jwt;
use log::*;

/// Authentication middleware that returns 401 Unauthorized for requests
/// without a valid bearer credential.
///
/// On success the resolved user is stored in the request extensions for the
/// `AuthenticatedUser` extractor.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let authenticated =
        bearer_credential(request.headers()).map(|c| jwt::authenticate(app_state.config(), c));

    match authenticated {
        Some(Ok(user_id)) => {
            // User is authenticated, continue to the handler
            request.extensions_mut().insert(AuthenticatedUser(user_id));
            next.run(request).await
        }
        Some(Err(e)) => {
            debug!("Rejected request to {}: {e:?}", request.uri().path());
            Error::from(e).into_response()
        }
        None => {
            debug!("Missing bearer credential for {}", request.uri().path());
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}
