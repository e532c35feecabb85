//! SeaORM Entity for analyses table.
//! Holds the LLM generated summary and structured notes for a meeting.

use crate::analysis_items::{ActionItems, KeyPoints, SpeakerNames, Topics};
use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::analyses::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "analyses")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub topics: Topics,

    #[sea_orm(column_type = "JsonBinary")]
    pub key_points: KeyPoints,

    #[sea_orm(column_type = "JsonBinary")]
    pub action_items: ActionItems,

    /// Long-form meeting document in Markdown
    #[sea_orm(column_type = "Text")]
    pub meeting_document: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub speaker_names: SpeakerNames,

    /// Untouched model output kept for auditing
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub raw_response: String,

    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meetings::Entity",
        from = "Column::MeetingId",
        to = "super::meetings::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Meetings,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
