//! Outbound mail for notifications.
//!
//! Delivery is best effort: callers log a failed send and move on. There is no
//! retry and no dead-letter queue.

use crate::error::Error;
use async_trait::async_trait;
use log::*;

/// A transport capable of sending one plain-text email.
#[async_trait]
pub trait EmailSink: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), Error>;
}

/// Sink used when no mail provider is configured. Every send succeeds
/// without leaving the process.
#[derive(Debug, Default)]
pub struct DisabledEmailSink;

#[async_trait]
impl EmailSink for DisabledEmailSink {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), Error> {
        debug!("Email delivery disabled, dropping \"{subject}\" for {to}");
        Ok(())
    }
}
