use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::NotificationDispatcher;
use events::EventPublisher;
use log::*;
use push::ConnectionRegistry;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

mod controller;
mod error;
mod extractors;
mod middleware;
mod router;
mod ws;

#[cfg(test)]
#[cfg(feature = "mock")]
mod test_support;

pub use error::{Error, Result};

/// Web-level state handed to every handler: the infrastructure state from
/// `service` plus the components of the notification fan-out, all shared
/// across requests.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub connection_registry: Arc<ConnectionRegistry>,
    /// Entry point for subsystems mounted alongside these routes that need
    /// to notify one user directly. None of the handlers here produce
    /// notifications themselves.
    pub notification_dispatcher: NotificationDispatcher,
    /// Entry point for course, quiz and badge actions. Publishing a
    /// `DomainEvent` here notifies every user it names.
    pub event_publisher: EventPublisher,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        connection_registry: Arc<ConnectionRegistry>,
        notification_dispatcher: NotificationDispatcher,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            service_state,
            connection_registry,
            notification_dispatcher,
            event_publisher,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let host = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{host}:{}", config.port);

    info!(
        "Server starting... listening for connections on http://{server_url} ({} environment)",
        config.runtime_env()
    );

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();
    debug!("Allowed CORS origins: {:?}", allowed_origins);

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let listener = TcpListener::bind(&server_url).await?;

    axum::serve(
        listener,
        router::define_routes(app_state).layer(cors_layer),
    )
    .await
}
