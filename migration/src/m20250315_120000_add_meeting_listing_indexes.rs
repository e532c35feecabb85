use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Meeting lists are always scoped by user and ordered newest first
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS meetings_user_id_created_at_idx
                 ON meeting_notes.meetings (user_id, created_at DESC)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS meetings_project_id_idx
                 ON meeting_notes.meetings (project_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS meeting_tags_tag_id_idx
                 ON meeting_notes.meeting_tags (tag_id)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "DROP INDEX IF EXISTS meeting_notes.meeting_tags_tag_id_idx;
                 DROP INDEX IF EXISTS meeting_notes.meetings_project_id_idx;
                 DROP INDEX IF EXISTS meeting_notes.meetings_user_id_created_at_idx;",
            )
            .await?;

        Ok(())
    }
}
