//! Builders shared by the router and push channel tests.

use crate::AppState;
use domain::{emails::DisabledEmailSink, Id, NotificationDispatcher, NotificationEventHandler};
use events::EventPublisher;
use jsonwebtoken::{encode, EncodingKey, Header};
use push::ConnectionRegistry;
use sea_orm::DatabaseConnection;
use serde_json::json;
use service::config::Config;
use std::sync::Arc;

pub(crate) const JWT_SECRET: &str = "web-test-secret";

pub(crate) fn app_state(db: DatabaseConnection) -> AppState {
    let config = Config::default().set_jwt_secret(JWT_SECRET.to_string());
    let db = Arc::new(db);
    let registry = Arc::new(ConnectionRegistry::new());
    let dispatcher = NotificationDispatcher::new(
        db.clone(),
        Arc::new(DisabledEmailSink),
        registry.clone(),
        &config,
    );

    let publisher = EventPublisher::new().with_handler(Arc::new(NotificationEventHandler::new(
        dispatcher.clone(),
    )));

    AppState::new(
        service::AppState::new(config, &db),
        registry,
        dispatcher,
        publisher,
    )
}

pub(crate) fn token_for(user_id: Id) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &json!({ "sub": user_id, "exp": exp }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub(crate) fn bearer_for(user_id: Id) -> String {
    format!("Bearer {}", token_for(user_id))
}
