//! SeaORM Entity for transcripts table.
//! One transcript per meeting, replaced wholesale when the meeting is reprocessed.

use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = entity::transcripts::Model)]
#[sea_orm(schema_name = "meeting_notes", table_name = "transcripts")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key)]
    pub id: Id,

    #[sea_orm(unique)]
    #[schema(value_type = Uuid)]
    pub meeting_id: Id,

    /// Concatenated text of every utterance
    #[sea_orm(column_type = "Text")]
    pub full_text: String,

    /// Untouched provider response kept for auditing
    #[serde(skip_serializing)]
    #[schema(value_type = Object)]
    pub raw_response: Json,

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

    #[sea_orm(has_many = "super::utterances::Entity")]
    Utterances,
}

impl Related<super::meetings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Meetings.def()
    }
}

impl Related<super::utterances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Utterances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
