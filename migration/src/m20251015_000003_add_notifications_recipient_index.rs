use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Serves the per-recipient, newest-first listing and the ownership
        // filter on mark-as-read
        manager
            .create_index(
                Index::create()
                    .name("notifications_recipient_id_created_at")
                    .table((Alias::new("lms_platform"), Alias::new("notifications")))
                    .col(Alias::new("recipient_id"))
                    .col((Alias::new("created_at"), IndexOrder::Desc))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("notifications_recipient_id_created_at")
                    .table((Alias::new("lms_platform"), Alias::new("notifications")))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
