use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the platform's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS lms_platform;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO lms_platform, public;")
            .await?;

        // Grant the base DB user that executes all platform queries access to the schema
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE lms TO lms;
                    GRANT ALL ON SCHEMA lms_platform TO lms;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA lms_platform GRANT ALL ON TABLES TO lms;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA lms_platform GRANT ALL ON SEQUENCES TO lms;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA lms_platform REVOKE ALL ON SEQUENCES FROM lms;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA lms_platform REVOKE ALL ON TABLES FROM lms;
                    REVOKE ALL ON SCHEMA lms_platform FROM lms;
                    REVOKE ALL PRIVILEGES ON DATABASE lms FROM lms;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS lms_platform CASCADE;")
            .await?;

        Ok(())
    }
}
