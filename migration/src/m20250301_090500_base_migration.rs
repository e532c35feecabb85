use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Executed in order; each entry depends only on the ones before it.
const UP_STATEMENTS: [&str; 13] = [
    "CREATE TYPE meeting_notes.meeting_status AS ENUM (
        'pending',
        'transcribing',
        'analyzing',
        'completed',
        'failed'
    )",
    "CREATE TYPE meeting_notes.meeting_language AS ENUM (
        'en', 'de', 'fr', 'es', 'it', 'pt', 'nl'
    )",
    "CREATE TYPE meeting_notes.credential_key AS ENUM (
        'assembly_ai',
        'gemini'
    )",
    "CREATE TABLE meeting_notes.users (
        id UUID PRIMARY KEY,
        email VARCHAR(255) NOT NULL UNIQUE,
        display_name VARCHAR(255),
        password VARCHAR(255) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE meeting_notes.projects (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES meeting_notes.users (id) ON DELETE CASCADE,
        name VARCHAR(255) NOT NULL,
        color VARCHAR(16) NOT NULL,
        icon VARCHAR(64),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT projects_user_id_name_key UNIQUE (user_id, name)
    )",
    "CREATE TABLE meeting_notes.tags (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES meeting_notes.users (id) ON DELETE CASCADE,
        name VARCHAR(255) NOT NULL,
        color VARCHAR(16) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT tags_user_id_name_key UNIQUE (user_id, name)
    )",
    "CREATE TABLE meeting_notes.meetings (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL REFERENCES meeting_notes.users (id) ON DELETE CASCADE,
        project_id UUID REFERENCES meeting_notes.projects (id) ON DELETE SET NULL,
        title VARCHAR(255) NOT NULL,
        description TEXT,
        language meeting_notes.meeting_language NOT NULL DEFAULT 'en',
        status meeting_notes.meeting_status NOT NULL DEFAULT 'pending',
        duration_seconds DOUBLE PRECISION,
        storage_path VARCHAR(1024) NOT NULL,
        original_filename VARCHAR(255) NOT NULL,
        file_size_bytes BIGINT NOT NULL,
        processing_error TEXT,
        ai_instructions TEXT,
        is_favorite BOOLEAN NOT NULL DEFAULT false,
        processed_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE meeting_notes.transcripts (
        id UUID PRIMARY KEY,
        meeting_id UUID NOT NULL UNIQUE REFERENCES meeting_notes.meetings (id) ON DELETE CASCADE,
        full_text TEXT NOT NULL,
        raw_response JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE meeting_notes.speakers (
        id UUID PRIMARY KEY,
        meeting_id UUID NOT NULL REFERENCES meeting_notes.meetings (id) ON DELETE CASCADE,
        speaker_index INTEGER NOT NULL,
        label VARCHAR(255),
        CONSTRAINT speakers_meeting_id_speaker_index_key UNIQUE (meeting_id, speaker_index)
    )",
    "CREATE TABLE meeting_notes.utterances (
        id UUID PRIMARY KEY,
        transcript_id UUID NOT NULL REFERENCES meeting_notes.transcripts (id) ON DELETE CASCADE,
        speaker_id UUID NOT NULL REFERENCES meeting_notes.speakers (id) ON DELETE CASCADE,
        sequence INTEGER NOT NULL,
        text TEXT NOT NULL,
        start_seconds DOUBLE PRECISION NOT NULL,
        end_seconds DOUBLE PRECISION NOT NULL,
        confidence DOUBLE PRECISION NOT NULL,
        CONSTRAINT utterances_transcript_id_sequence_key UNIQUE (transcript_id, sequence)
    )",
    "CREATE TABLE meeting_notes.analyses (
        id UUID PRIMARY KEY,
        meeting_id UUID NOT NULL UNIQUE REFERENCES meeting_notes.meetings (id) ON DELETE CASCADE,
        summary TEXT NOT NULL,
        topics JSONB NOT NULL DEFAULT '[]',
        key_points JSONB NOT NULL DEFAULT '[]',
        action_items JSONB NOT NULL DEFAULT '[]',
        meeting_document TEXT NOT NULL DEFAULT '',
        speaker_names JSONB NOT NULL DEFAULT '[]',
        raw_response TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE meeting_notes.meeting_tags (
        meeting_id UUID NOT NULL REFERENCES meeting_notes.meetings (id) ON DELETE CASCADE,
        tag_id UUID NOT NULL REFERENCES meeting_notes.tags (id) ON DELETE CASCADE,
        PRIMARY KEY (meeting_id, tag_id)
    )",
    "CREATE TABLE meeting_notes.settings (
        id UUID PRIMARY KEY,
        key meeting_notes.credential_key NOT NULL UNIQUE,
        encrypted_value TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

const DOWN_STATEMENTS: [&str; 13] = [
    "DROP TABLE IF EXISTS meeting_notes.settings",
    "DROP TABLE IF EXISTS meeting_notes.meeting_tags",
    "DROP TABLE IF EXISTS meeting_notes.analyses",
    "DROP TABLE IF EXISTS meeting_notes.utterances",
    "DROP TABLE IF EXISTS meeting_notes.speakers",
    "DROP TABLE IF EXISTS meeting_notes.transcripts",
    "DROP TABLE IF EXISTS meeting_notes.meetings",
    "DROP TABLE IF EXISTS meeting_notes.tags",
    "DROP TABLE IF EXISTS meeting_notes.projects",
    "DROP TABLE IF EXISTS meeting_notes.users",
    "DROP TYPE IF EXISTS meeting_notes.credential_key",
    "DROP TYPE IF EXISTS meeting_notes.meeting_language",
    "DROP TYPE IF EXISTS meeting_notes.meeting_status",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for statement in UP_STATEMENTS {
            manager.get_connection().execute_unprepared(statement).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for statement in DOWN_STATEMENTS {
            manager.get_connection().execute_unprepared(statement).await?;
        }
        Ok(())
    }
}
