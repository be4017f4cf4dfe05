//! Notification fan-out for the LMS platform.
//!
//! The domain layer sits between the web layer and `entity_api`. It owns the
//! [`dispatcher::NotificationDispatcher`], which fans one event out to the
//! durable store, outbound email and live push channels, and the read side the
//! REST API uses.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{notifications, users, Id, RelatedEntityId};

pub mod dispatcher;
pub mod emails;
pub mod error;
pub mod jwt;
pub mod notification;
pub mod notification_event_handler;

pub mod gateway;

pub use dispatcher::NotificationDispatcher;
pub use notification_event_handler::NotificationEventHandler;
