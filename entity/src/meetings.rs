//! SeaORM Entity for meetings table.
//! A meeting owns one uploaded audio file and, once processed, its transcript and analysis.

use crate::language::Language;
use crate::meeting_status::MeetingStatus;
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::meetings::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "meetings")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[serde(skip_deserializing)]
    pub user_id: Id,

    #[schema(value_type = Option<Uuid>)]
    pub project_id: Option<Id>,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    /// Language the meeting is analyzed in; replaced by the detected language after transcription
    pub language: Language,

    #[serde(skip_deserializing)]
    pub status: MeetingStatus,

    /// Length of the audio in seconds, known once transcription completes
    #[serde(skip_deserializing)]
    pub duration_seconds: Option<f64>,

    /// Location of the uploaded audio file on disk
    #[serde(skip)]
    pub storage_path: String,

    #[serde(skip_deserializing)]
    pub original_filename: String,

    #[serde(skip_deserializing)]
    pub file_size_bytes: i64,

    /// Message of the error that failed the last processing run
    #[serde(skip_deserializing)]
    #[sea_orm(column_type = "Text")]
    pub processing_error: Option<String>,

    /// Optional free text that steers the analysis model
    #[sea_orm(column_type = "Text")]
    pub ai_instructions: Option<String>,

    #[serde(default)]
    pub is_favorite: bool,

    #[serde(skip_deserializing)]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub processed_at: Option<DateTimeWithTimeZone>,

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
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,

    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Projects,

    #[sea_orm(has_one = "super::transcripts::Entity")]
    Transcripts,

    #[sea_orm(has_one = "super::analyses::Entity")]
    Analyses,

    #[sea_orm(has_many = "super::speakers::Entity")]
    Speakers,

    #[sea_orm(has_many = "super::meeting_tags::Entity")]
    MeetingTags,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl Related<super::analyses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Analyses.def()
    }
}

impl Related<super::speakers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Speakers.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::meeting_tags::Relation::Tags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::meeting_tags::Relation::Meetings.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
