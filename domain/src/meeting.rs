use crate::error::{EntityErrorKind, Error, InternalErrorKind};
use crate::meetings::Model;
use crate::{project, tag, tags, upload, Id};
use chrono::{DateTime, FixedOffset};
use entity::language::Language;
use entity::meeting_status::MeetingStatus;
use entity_api::{meeting, meeting_tag, IntoQueryFilterMap, IntoUpdateMap};
use log::*;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use utoipa::ToSchema;

/// User supplied metadata accompanying an audio upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMeeting {
    pub title: Option<String>,
    pub description: Option<String>,
    pub language: Option<Language>,
    pub project_id: Option<Id>,
    pub ai_instructions: Option<String>,
}

/// An uploaded audio file held in memory until it is validated and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A meeting together with the tags attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MeetingWithTags {
    #[serde(flatten)]
    pub meeting: Model,
    pub tags: Vec<tags::Model>,
}

/// Processing progress of a meeting, polled by clients while a run is in flight.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProcessingStatus {
    #[schema(value_type = Uuid)]
    pub id: Id,
    pub status: MeetingStatus,
    pub processing_error: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub processed_at: Option<DateTime<FixedOffset>>,
}

impl From<&Model> for ProcessingStatus {
    fn from(meeting: &Model) -> Self {
        ProcessingStatus {
            id: meeting.id,
            status: meeting.status,
            processing_error: meeting.processing_error.clone(),
            processed_at: meeting.processed_at,
        }
    }
}

/// Validates and stores an uploaded recording, then inserts its meeting in `pending`.
///
/// The stored file is removed again if the meeting row cannot be written.
pub async fn create(
    db: &DatabaseConnection,
    config: &Config,
    user_id: Id,
    new_meeting: NewMeeting,
    audio: AudioUpload,
) -> Result<Model, Error> {
    let extension = upload::validate(
        &audio.filename,
        audio.bytes.len() as u64,
        config.max_upload_bytes,
    )?;

    if let Some(project_id) = new_meeting.project_id {
        project::find_by_id_for_user(db, user_id, project_id).await?;
    }

    let storage_path = upload::store(config.upload_dir(), &extension, &audio.bytes).await?;

    let title = new_meeting
        .title
        .map(|title| title.trim().to_owned())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| default_title(&audio.filename));

    let now = chrono::Utc::now();
    let meeting_model = Model {
        id: Id::new_v4(),
        user_id,
        project_id: new_meeting.project_id,
        title,
        description: new_meeting.description,
        language: new_meeting.language.unwrap_or_default(),
        status: MeetingStatus::Pending,
        duration_seconds: None,
        storage_path: storage_path.to_string_lossy().into_owned(),
        original_filename: audio.filename,
        file_size_bytes: audio.bytes.len() as i64,
        processing_error: None,
        ai_instructions: new_meeting
            .ai_instructions
            .filter(|instructions| !instructions.trim().is_empty()),
        is_favorite: false,
        processed_at: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    match meeting::create(db, meeting_model).await {
        Ok(meeting) => {
            info!("Created meeting {} for user {user_id}", meeting.id);
            Ok(meeting)
        }
        Err(e) => {
            warn!("Meeting insert failed, discarding stored audio: {e:?}");
            upload::remove(&storage_path).await?;
            Err(e.into())
        }
    }
}

/// Title used when the upload did not name the meeting: the file name without its
/// extension.
pub fn default_title(filename: &str) -> String {
    let stem = std::path::Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .trim();
    if stem.is_empty() {
        "Untitled meeting".to_owned()
    } else {
        stem.to_owned()
    }
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Ok(meeting::find_by_id(db, id).await?)
}

pub async fn find_by(
    db: &DatabaseConnection,
    params: impl IntoQueryFilterMap,
) -> Result<Vec<Model>, Error> {
    Ok(meeting::find_by(db, params.into_query_filter_map()).await?)
}

/// Looks a meeting up on behalf of `user_id`. Meetings of other users read as not found.
pub async fn find_by_id_for_user(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
) -> Result<Model, Error> {
    let meeting = meeting::find_by_id(db, id).await?;
    if meeting.user_id != user_id {
        debug!("User {user_id} requested meeting {id} owned by another user");
        return Err(Error::not_found());
    }
    Ok(meeting)
}

pub async fn find_with_tags(db: &DatabaseConnection, meeting: Model) -> Result<MeetingWithTags, Error> {
    let tags = tag::find_by_meeting(db, meeting.id).await?;
    Ok(MeetingWithTags { meeting, tags })
}

pub async fn update(
    db: &DatabaseConnection,
    user_id: Id,
    id: Id,
    params: impl IntoUpdateMap,
) -> Result<Model, Error> {
    let update_map = params.into_update_map();
    if let Some(sea_orm::Value::Uuid(Some(project_id))) = update_map.get("project_id") {
        project::find_by_id_for_user(db, user_id, **project_id).await?;
    }
    Ok(meeting::update(db, id, update_map).await?)
}

/// Deletes a meeting with everything derived from it, then its audio file.
pub async fn delete(db: &DatabaseConnection, meeting: Model) -> Result<(), Error> {
    meeting::delete_by_id(db, meeting.id).await?;
    upload::remove(std::path::Path::new(&meeting.storage_path)).await?;
    info!("Deleted meeting {}", meeting.id);
    Ok(())
}

/// Replaces the tags of a meeting. Every tag must belong to `user_id`.
pub async fn set_tags(
    db: &DatabaseConnection,
    user_id: Id,
    meeting_id: Id,
    tag_ids: Vec<Id>,
) -> Result<Vec<tags::Model>, Error> {
    let owned: Vec<Id> = tag::find_by_user(db, user_id)
        .await?
        .into_iter()
        .map(|tag| tag.id)
        .collect();

    if let Some(foreign) = tag_ids.iter().find(|id| !owned.contains(id)) {
        warn!("Refusing to attach tag {foreign} not owned by user {user_id}");
        return Err(Error {
            source: None,
            error_kind: crate::error::DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        });
    }

    meeting_tag::replace_for_meeting(db, meeting_id, tag_ids).await?;
    Ok(tag::find_by_meeting(db, meeting_id).await?)
}
