//! SeaORM Entity for utterances table.
//! Ordered speech segments of a transcript, each attributed to one speaker.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::utterances::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "utterances")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[schema(value_type = Uuid)]
    pub transcript_id: Id,

    #[schema(value_type = Uuid)]
    pub speaker_id: Id,

    /// Position of the utterance within the provider result
    pub sequence: i32,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Offset from the start of the recording, in seconds
    pub start_seconds: f64,

    pub end_seconds: f64,

    /// Provider confidence score (0.0 - 1.0)
    pub confidence: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transcripts::Entity",
        from = "Column::TranscriptId",
        to = "super::transcripts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transcripts,

    #[sea_orm(
        belongs_to = "super::speakers::Entity",
        from = "Column::SpeakerId",
        to = "super::speakers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Speakers,
}

impl Related<super::transcripts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transcripts.def()
    }
}

impl Related<super::speakers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Speakers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
