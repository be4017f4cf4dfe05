//! Durable storage for notification records.
//!
//! Rows are created once per dispatched event and afterwards only ever
//! transition from unread to read. Ownership is part of every query that
//! touches a single row, so a user probing someone else's notification id
//! sees exactly the same `RecordNotFound` as for an id that does not exist.

use super::error::Error;
use entity::notifications::{ActiveModel, Column, Entity, Model};
use entity::{users, Id, RelatedEntityId};
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{Set, Unchanged},
    ConnectionTrait, QueryOrder,
};

/// Persists a new, unread notification for `recipient_id`.
///
/// Fails with `RecordNotFound` if the recipient does not exist.
pub async fn create(
    db: &impl ConnectionTrait,
    recipient_id: Id,
    message: String,
    related_entity: Option<String>,
    related_entity_id: Option<RelatedEntityId>,
) -> Result<Model, Error> {
    if users::Entity::find_by_id(recipient_id).one(db).await?.is_none() {
        debug!("Notification recipient {recipient_id} not found");
        return Err(Error::record_not_found());
    }

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        recipient_id: Set(recipient_id),
        message: Set(message),
        is_read: Set(false),
        related_entity: Set(related_entity),
        related_entity_id: Set(related_entity_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    let notification = active_model.insert(db).await?;
    debug!(
        "Created notification {} for recipient {}",
        notification.id, recipient_id
    );

    Ok(notification)
}

/// All notifications owned by `recipient_id`, read and unread, newest first.
pub async fn find_by_recipient(
    db: &impl ConnectionTrait,
    recipient_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::RecipientId.eq(recipient_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?)
}

/// Marks the notification `id` owned by `recipient_id` as read.
///
/// Calling this on an already-read notification returns it unchanged.
pub async fn mark_read(
    db: &impl ConnectionTrait,
    id: Id,
    recipient_id: Id,
) -> Result<Model, Error> {
    let notification = Entity::find_by_id(id)
        .filter(Column::RecipientId.eq(recipient_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            debug!("Notification {id} not found for recipient {recipient_id}");
            Error::record_not_found()
        })?;

    if notification.is_read {
        return Ok(notification);
    }

    let active_model = ActiveModel {
        id: Unchanged(notification.id),
        recipient_id: Unchanged(notification.recipient_id),
        message: Unchanged(notification.message),
        is_read: Set(true),
        related_entity: Unchanged(notification.related_entity),
        related_entity_id: Unchanged(notification.related_entity_id),
        created_at: Unchanged(notification.created_at),
        updated_at: Set(chrono::Utc::now().into()),
    };

    Ok(active_model.update(db).await?)
}
