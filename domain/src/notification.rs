//! Read side of notifications, consumed by the REST layer. The recipient id
//! always comes from the authenticated caller.

use crate::error::Error;
use crate::notifications::Model;
use crate::Id;
use entity_api::notification;
use sea_orm::DatabaseConnection;

/// The caller's notifications, read and unread, newest first.
pub async fn find_by_recipient(
    db: &DatabaseConnection,
    recipient_id: Id,
) -> Result<Vec<Model>, Error> {
    Ok(notification::find_by_recipient(db, recipient_id).await?)
}

/// Marks one of the caller's notifications as read. A notification owned by
/// someone else is reported as not found.
pub async fn mark_read(db: &DatabaseConnection, id: Id, recipient_id: Id) -> Result<Model, Error> {
    Ok(notification::mark_read(db, id, recipient_id).await?)
}
