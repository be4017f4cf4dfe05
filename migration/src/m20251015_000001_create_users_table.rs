use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Accounts are owned by the identity service. When it shares this
        // database the table already exists and is left untouched.
        let create_table_sql = r#"
            CREATE TABLE IF NOT EXISTS lms_platform.users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                user_name VARCHAR(255) NOT NULL,
                email VARCHAR(255) NOT NULL,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                CONSTRAINT users_email_unique UNIQUE(email)
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS lms_platform.users")
            .await?;

        Ok(())
    }
}
