use super::error::Error;
use entity::users::{Entity, Model};
use entity::Id;
use log::*;
use sea_orm::{entity::prelude::*, ConnectionTrait};

/// Looks up a user by id, failing with `RecordNotFound` when no such user exists.
pub async fn find_by_id(db: &impl ConnectionTrait, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id).one(db).await?.ok_or_else(|| {
        debug!("User with id {id} not found");
        Error::record_not_found()
    })
}
