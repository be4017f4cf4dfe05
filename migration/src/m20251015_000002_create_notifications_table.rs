use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per notification event. Rows are never deleted by the
        // application; they go away only with their recipient.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS lms_platform.notifications (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                recipient_id UUID NOT NULL REFERENCES lms_platform.users(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                is_read BOOLEAN NOT NULL DEFAULT FALSE,

                -- What triggered the notification, e.g. ('Module', 42)
                related_entity VARCHAR(255),
                related_entity_id BIGINT,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        // Set ownership to lms user for proper permissions
        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE lms_platform.notifications OWNER TO lms")
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS lms_platform.notifications")
            .await?;

        Ok(())
    }
}
