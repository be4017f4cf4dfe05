use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    EntityErrorKind::Unauthenticated => {
                        (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                    }
                    EntityErrorKind::DbTransaction => {
                        error!("Database error: {:?}", self.0.source);
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                    EntityErrorKind::Other(message) => {
                        error!("Entity error: {message}");
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                },
                InternalErrorKind::Config => {
                    error!("Server is missing required configuration");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
                InternalErrorKind::Other(message) => {
                    error!("Internal error: {message}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network => {
                    (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
                }
                ExternalErrorKind::Other(message) => {
                    error!("External error: {message}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_for(error_kind: DomainErrorKind) -> StatusCode {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .into_response()
        .status()
    }

    fn entity(kind: EntityErrorKind) -> DomainErrorKind {
        DomainErrorKind::Internal(InternalErrorKind::Entity(kind))
    }

    #[test]
    fn entity_errors_map_to_client_statuses() {
        assert_eq!(
            status_for(entity(EntityErrorKind::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(entity(EntityErrorKind::Unauthenticated)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn server_side_failures_map_to_5xx() {
        assert_eq!(
            status_for(entity(EntityErrorKind::DbTransaction)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(DomainErrorKind::Internal(InternalErrorKind::Config)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(DomainErrorKind::External(ExternalErrorKind::Network)),
            StatusCode::BAD_GATEWAY
        );
    }
}
