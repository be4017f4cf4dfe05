//! SeaORM Entity for the notifications table.
//! One row per delivered notification event; rows are never deleted.

use crate::{Id, RelatedEntityId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::notifications::Model)]
#[sea_orm(schema_name = "lms_platform", table_name = "notifications")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,

    /// The single user that owns this notification
    #[schema(value_type = uuid::Uuid)]
    pub recipient_id: Id,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Flips from false to true exactly once, never back
    #[serde(default)]
    pub is_read: bool,

    /// Free-text tag naming the kind of record that triggered the event,
    /// e.g. "Course", "Module", "Quiz"
    pub related_entity: Option<String>,

    pub related_entity_id: Option<RelatedEntityId>,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
