use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS meeting_notes;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO meeting_notes, public;")
            .await?;

        // The application connects as the meeting_notes role
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE meeting_notes TO meeting_notes;
                    GRANT ALL ON SCHEMA meeting_notes TO meeting_notes;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes GRANT ALL ON TABLES TO meeting_notes;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes GRANT ALL ON SEQUENCES TO meeting_notes;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes GRANT ALL ON FUNCTIONS TO meeting_notes;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes REVOKE ALL ON FUNCTIONS FROM meeting_notes;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes REVOKE ALL ON SEQUENCES FROM meeting_notes;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA meeting_notes REVOKE ALL ON TABLES FROM meeting_notes;
                    REVOKE ALL ON SCHEMA meeting_notes FROM meeting_notes;
                    REVOKE ALL PRIVILEGES ON DATABASE meeting_notes FROM meeting_notes;
                END $$;
            "#)
            .await?;

        // CASCADE removes every object in the schema
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS meeting_notes CASCADE;")
            .await?;

        Ok(())
    }
}
