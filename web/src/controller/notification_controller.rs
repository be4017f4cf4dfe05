use crate::controller::ApiResponse;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::{error::Error as DomainError, notification as NotificationApi, Id};

use log::*;

/// GET all notifications of the authenticated user, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Successfully retrieved the caller's notifications", body = [domain::notifications::Model]),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Notifications for User: {user_id}");

    let notifications = NotificationApi::find_by_recipient(app_state.db_conn_ref(), user_id).await?;

    debug!(
        "Found {} notifications for user {user_id}",
        notifications.len()
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notifications)))
}

/// PUT mark one of the authenticated user's notifications as read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    params(
        ("id" = sea_orm::prelude::Uuid, Path, description = "Id of the notification to mark as read"),
    ),
    responses(
        (status = 200, description = "Notification is marked as read", body = domain::notifications::Model),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found for the caller"),
        (status = 405, description = "Method not allowed")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn mark_read(
    AuthenticatedUser(user_id): AuthenticatedUser,
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT mark Notification {id} as read for User: {user_id}");

    // A malformed id can't name one of the caller's notifications
    let id = Id::parse_str(&id).map_err(|_| DomainError::not_found())?;

    let notification = NotificationApi::mark_read(app_state.db_conn_ref(), id, user_id).await?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), notification)))
}
