//! Fan-out of one notification event to every sink.
//!
//! A call to [`NotificationDispatcher::notify`] runs three steps in order:
//!
//! 1. Persist the notification row. This is the only step whose failure is
//!    returned to the caller; if it fails nothing else runs.
//! 2. Resolve the recipient's email address and hand the send off to a
//!    detached task. The caller never waits on the mail provider and never
//!    sees its failures.
//! 3. Broadcast an envelope to every push channel the recipient has open on
//!    this instance. Channel failures are logged by the registry.
//!
//! Every call creates exactly one row; there is no deduplication.

use crate::emails::EmailSink;
use crate::error::Error;
use crate::notifications::Model;
use crate::{Id, RelatedEntityId};
use entity_api::{notification, user};
use log::*;
use push::{ConnectionRegistry, Envelope};
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct NotificationDispatcher {
    db: Arc<DatabaseConnection>,
    mailer: Arc<dyn EmailSink>,
    registry: Arc<ConnectionRegistry>,
    email_subject: String,
}

impl NotificationDispatcher {
    pub fn new(
        db: Arc<DatabaseConnection>,
        mailer: Arc<dyn EmailSink>,
        registry: Arc<ConnectionRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            db,
            mailer,
            registry,
            email_subject: config.notification_email_subject().to_string(),
        }
    }

    /// Records a notification for `recipient_id` and delivers it by email and
    /// push.
    ///
    /// Fails with `NotFound` when the recipient does not exist, or with the
    /// persistence error if the row could not be stored. Delivery failures are
    /// only logged.
    pub async fn notify(
        &self,
        recipient_id: Id,
        message: impl Into<String>,
        related_entity: Option<String>,
        related_entity_id: Option<RelatedEntityId>,
    ) -> Result<Model, Error> {
        let notification = notification::create(
            self.db.as_ref(),
            recipient_id,
            message.into(),
            related_entity,
            related_entity_id,
        )
        .await
        .map_err(|e| {
            let err = Error::from(e);
            if err.is_not_found() {
                warn!("Cannot notify unknown recipient {recipient_id}");
            } else {
                error!("Failed to persist notification for {recipient_id}: {err:?}");
            }
            err
        })?;

        self.send_email(&notification).await;

        let envelope = Envelope::notification(
            notification.message.clone(),
            notification.related_entity.clone(),
            notification.related_entity_id,
        );
        self.registry.broadcast(recipient_id, &envelope);

        Ok(notification)
    }

    async fn send_email(&self, notification: &Model) {
        let recipient = match user::find_by_id(self.db.as_ref(), notification.recipient_id).await
        {
            Ok(recipient) => recipient,
            Err(e) => {
                warn!(
                    "Skipping email for notification {}, recipient lookup failed: {e:?}",
                    notification.id
                );
                return;
            }
        };

        let mailer = Arc::clone(&self.mailer);
        let subject = self.email_subject.clone();
        let body = notification.message.clone();
        let notification_id = notification.id;

        tokio::spawn(async move {
            match mailer.send(&recipient.email, &subject, &body).await {
                Ok(()) => debug!("Emailed notification {notification_id} to {}", recipient.email),
                Err(e) => warn!(
                    "Failed to email notification {notification_id} to {}: {e:?}",
                    recipient.email
                ),
            }
        });
    }
}
