//! CRUD and processing state operations for the meetings table, including the single
//! transaction that stores a finished processing run.

use super::error::{EntityApiErrorKind, Error};
use crate::mutate::{self, UpdateMap};
use crate::query;
use crate::QueryFilterMap;
use entity::analysis_items::{ActionItems, KeyPoints, SpeakerNames, Topics};
use entity::language::Language;
use entity::meeting_status::MeetingStatus;
use entity::meetings::{ActiveModel, Column, Entity, Model};
use entity::{analyses, speakers, transcripts, utterances, Id};
use log::*;
use sea_orm::{
    entity::prelude::*,
    ActiveValue::Set,
    DatabaseConnection, IntoActiveModel, Order, TransactionTrait,
};
use std::collections::HashMap;

/// Utterance rows per INSERT. Each row binds 8 parameters and Postgres caps a statement
/// at 65,535 of them, so a long recording is written in several statements.
const UTTERANCE_INSERT_BATCH_SIZE: usize = 1000;

/// Inserts a freshly uploaded meeting. The meeting always starts out `Pending`.
pub async fn create(db: &DatabaseConnection, meeting_model: Model) -> Result<Model, Error> {
    debug!(
        "New meeting to be inserted for user {}: {}",
        meeting_model.user_id, meeting_model.title
    );

    let now = chrono::Utc::now();

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user_id: Set(meeting_model.user_id),
        project_id: Set(meeting_model.project_id),
        title: Set(meeting_model.title),
        description: Set(meeting_model.description),
        language: Set(meeting_model.language),
        status: Set(MeetingStatus::Pending),
        duration_seconds: Set(None),
        storage_path: Set(meeting_model.storage_path),
        original_filename: Set(meeting_model.original_filename),
        file_size_bytes: Set(meeting_model.file_size_bytes),
        processing_error: Set(None),
        ai_instructions: Set(meeting_model.ai_instructions),
        is_favorite: Set(meeting_model.is_favorite),
        processed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Ok(active_model.insert(db).await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Id) -> Result<Model, Error> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(Error::not_found)
}

/// Lists meetings matching `query_filter_map`, newest first.
pub async fn find_by(
    db: &DatabaseConnection,
    query_filter_map: QueryFilterMap,
) -> Result<Vec<Model>, Error> {
    query::find_by::<Entity, Column>(db, query_filter_map, Column::CreatedAt, Order::Desc).await
}

/// Applies the user editable fields present in `update_map`.
pub async fn update(
    db: &DatabaseConnection,
    id: Id,
    mut update_map: UpdateMap,
) -> Result<Model, Error> {
    let existing = find_by_id(db, id).await?;

    // Columns owned by the processing pipeline or fixed at upload time
    for column in [
        Column::Id,
        Column::UserId,
        Column::Status,
        Column::DurationSeconds,
        Column::StoragePath,
        Column::OriginalFilename,
        Column::FileSizeBytes,
        Column::ProcessingError,
        Column::ProcessedAt,
        Column::CreatedAt,
    ] {
        update_map.remove(&column.to_string());
    }
    update_map.insert(
        Column::UpdatedAt.to_string(),
        Some(Value::from(DateTimeWithTimeZone::from(chrono::Utc::now()))),
    );

    mutate::update::<ActiveModel, Column>(db, existing.into_active_model(), update_map).await
}

pub async fn delete_by_id(db: &DatabaseConnection, id: Id) -> Result<(), Error> {
    let result = Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found());
    }
    Ok(())
}

/// Atomically moves a `Pending` or `Failed` meeting to `Transcribing`, clearing any
/// previous processing error.
///
/// Returns `true` when this caller won the claim. Returns `false` when the meeting is
/// missing or its status was not claimable at the time of the update, so two
/// concurrent callers can never both start a run.
pub async fn claim_for_processing(db: &impl ConnectionTrait, id: Id) -> Result<bool, Error> {
    let result = Entity::update_many()
        .set(ActiveModel {
            status: Set(MeetingStatus::Transcribing),
            processing_error: Set(None),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        })
        .filter(Column::Id.eq(id))
        .filter(Column::Status.is_in(MeetingStatus::claimable()))
        .exec(db)
        .await?;

    debug!(
        "Claim of meeting {id} for processing affected {} row(s)",
        result.rows_affected
    );
    Ok(result.rows_affected == 1)
}

pub async fn update_status(
    db: &impl ConnectionTrait,
    id: Id,
    status: MeetingStatus,
) -> Result<(), Error> {
    debug!("Updating meeting {id} status to {status}");

    let result = Entity::update_many()
        .set(ActiveModel {
            status: Set(status),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        })
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotUpdated,
        });
    }
    Ok(())
}

/// Marks a meeting `Failed` and records the message of the error that stopped the run.
pub async fn mark_failed(
    db: &impl ConnectionTrait,
    id: Id,
    processing_error: String,
) -> Result<(), Error> {
    Entity::update_many()
        .set(ActiveModel {
            status: Set(MeetingStatus::Failed),
            processing_error: Set(Some(processing_error)),
            updated_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        })
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// One utterance of a finished transcription, attributed by speaker index.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUtterance {
    pub speaker_index: i32,
    pub text: String,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAnalysis {
    pub summary: String,
    pub topics: Topics,
    pub key_points: KeyPoints,
    pub action_items: ActionItems,
    pub meeting_document: String,
    pub speaker_names: SpeakerNames,
    pub raw_response: String,
}

/// Everything a successful processing run produces for one meeting.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessingResults {
    pub full_text: String,
    pub raw_transcript: Json,
    pub utterances: Vec<NewUtterance>,
    /// Sorted distinct speaker indices
    pub speaker_indices: Vec<i32>,
    pub duration_seconds: f64,
    pub language: Language,
    pub analysis: NewAnalysis,
}

/// Replaces any previous transcript, speakers, utterances and analysis of the meeting with
/// `results` and flips the meeting to `Completed`, all inside one transaction.
///
/// Speakers are labeled with the names the analysis inferred for them.
pub async fn save_results(
    db: &impl TransactionTrait,
    meeting_id: Id,
    results: ProcessingResults,
) -> Result<(), Error> {
    let txn = db.begin().await?;
    let now = chrono::Utc::now();

    // Utterances cascade from both transcripts and speakers
    transcripts::Entity::delete_many()
        .filter(transcripts::Column::MeetingId.eq(meeting_id))
        .exec(&txn)
        .await?;
    speakers::Entity::delete_many()
        .filter(speakers::Column::MeetingId.eq(meeting_id))
        .exec(&txn)
        .await?;
    analyses::Entity::delete_many()
        .filter(analyses::Column::MeetingId.eq(meeting_id))
        .exec(&txn)
        .await?;

    let speaker_ids: HashMap<i32, Id> = results
        .speaker_indices
        .iter()
        .map(|index| (*index, Id::new_v4()))
        .collect();

    let speaker_models: Vec<speakers::ActiveModel> = results
        .speaker_indices
        .iter()
        .map(|index| speakers::ActiveModel {
            id: Set(speaker_ids[index]),
            meeting_id: Set(meeting_id),
            speaker_index: Set(*index),
            label: Set(results
                .analysis
                .speaker_names
                .name_for(*index)
                .map(str::to_owned)),
        })
        .collect();
    if !speaker_models.is_empty() {
        speakers::Entity::insert_many(speaker_models)
            .exec_without_returning(&txn)
            .await?;
    }

    let transcript_id = Id::new_v4();
    transcripts::Entity::insert(transcripts::ActiveModel {
        id: Set(transcript_id),
        meeting_id: Set(meeting_id),
        full_text: Set(results.full_text),
        raw_response: Set(results.raw_transcript),
        created_at: Set(now.into()),
    })
    .exec_without_returning(&txn)
    .await?;

    let mut utterance_models = Vec::with_capacity(results.utterances.len());
    for (sequence, utterance) in results.utterances.into_iter().enumerate() {
        let speaker_id = speaker_ids
            .get(&utterance.speaker_index)
            .copied()
            .ok_or(Error {
                source: None,
                error_kind: EntityApiErrorKind::ValidationError,
            })?;
        utterance_models.push(utterances::ActiveModel {
            id: Set(Id::new_v4()),
            transcript_id: Set(transcript_id),
            speaker_id: Set(speaker_id),
            sequence: Set(sequence as i32),
            text: Set(utterance.text),
            start_seconds: Set(utterance.start_seconds),
            end_seconds: Set(utterance.end_seconds),
            confidence: Set(utterance.confidence),
        });
    }
    for batch in utterance_models.chunks(UTTERANCE_INSERT_BATCH_SIZE) {
        utterances::Entity::insert_many(batch.to_vec())
            .exec_without_returning(&txn)
            .await?;
    }

    let analysis = results.analysis;
    analyses::Entity::insert(analyses::ActiveModel {
        id: Set(Id::new_v4()),
        meeting_id: Set(meeting_id),
        summary: Set(analysis.summary),
        topics: Set(analysis.topics),
        key_points: Set(analysis.key_points),
        action_items: Set(analysis.action_items),
        meeting_document: Set(analysis.meeting_document),
        speaker_names: Set(analysis.speaker_names),
        raw_response: Set(analysis.raw_response),
        created_at: Set(now.into()),
    })
    .exec_without_returning(&txn)
    .await?;

    Entity::update_many()
        .set(ActiveModel {
            status: Set(MeetingStatus::Completed),
            duration_seconds: Set(Some(results.duration_seconds)),
            language: Set(results.language),
            processing_error: Set(None),
            processed_at: Set(Some(now.into())),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .filter(Column::Id.eq(meeting_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!("Stored processing results for meeting {meeting_id}");
    Ok(())
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use entity::analysis_items::{SpeakerName, Topic};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn results() -> ProcessingResults {
        ProcessingResults {
            full_text: "Hi, I'm Ada. Hello Ada.".to_owned(),
            raw_transcript: serde_json::json!({"id": "abc"}),
            utterances: vec![
                NewUtterance {
                    speaker_index: 0,
                    text: "Hi, I'm Ada.".to_owned(),
                    start_seconds: 0.0,
                    end_seconds: 1.5,
                    confidence: 0.9,
                },
                NewUtterance {
                    speaker_index: 1,
                    text: "Hello Ada.".to_owned(),
                    start_seconds: 1.5,
                    end_seconds: 2.5,
                    confidence: 0.8,
                },
            ],
            speaker_indices: vec![0, 1],
            duration_seconds: 2.5,
            language: Language::En,
            analysis: NewAnalysis {
                summary: "Greetings".to_owned(),
                topics: Topics(vec![Topic {
                    title: "Intro".to_owned(),
                    description: "Introductions".to_owned(),
                    importance: 3,
                }]),
                key_points: KeyPoints::default(),
                action_items: ActionItems::default(),
                meeting_document: "# Intro".to_owned(),
                speaker_names: SpeakerNames(vec![SpeakerName {
                    speaker_index: 0,
                    name: "Ada".to_owned(),
                }]),
                raw_response: "{}".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn claim_for_processing_reports_whether_a_row_changed() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(1), exec(0)])
            .into_connection();

        assert!(claim_for_processing(&db, Id::new_v4()).await?);
        assert!(!claim_for_processing(&db, Id::new_v4()).await?);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("transcribing"));
        assert!(log.contains("IN"));
        Ok(())
    }

    #[tokio::test]
    async fn update_status_fails_for_a_missing_meeting() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0)])
            .into_connection();

        let result = update_status(&db, Id::new_v4(), MeetingStatus::Analyzing).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::RecordNotUpdated
        );
    }

    #[tokio::test]
    async fn save_results_replaces_previous_rows_in_one_transaction() -> Result<(), Error> {
        // three deletes, speakers, transcript, utterances, analysis, meeting update
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                exec(1),
                exec(2),
                exec(1),
                exec(2),
                exec(1),
                exec(2),
                exec(1),
                exec(1),
            ])
            .into_connection();

        save_results(&db, Id::new_v4(), results()).await?;

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1, "all writes belong to a single transaction");

        let statements = format!("{:?}", log[0]);
        let delete = statements.find("DELETE FROM").unwrap();
        let insert = statements.find("INSERT INTO").unwrap();
        let completed = statements.find("completed").unwrap();
        assert!(delete < insert && insert < completed);
        assert!(statements.contains("Ada"));
        Ok(())
    }

    #[tokio::test]
    async fn save_results_splits_long_transcripts_into_several_inserts() -> Result<(), Error> {
        let mut long = results();
        long.utterances = (0..2500)
            .map(|i| NewUtterance {
                speaker_index: i % 2,
                text: format!("Sentence {i}"),
                start_seconds: i as f64,
                end_seconds: i as f64 + 1.0,
                confidence: 0.9,
            })
            .collect();

        // three deletes, speakers, transcript, three utterance batches, analysis, meeting update
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                exec(1),
                exec(2),
                exec(1),
                exec(2),
                exec(1),
                exec(1000),
                exec(1000),
                exec(500),
                exec(1),
                exec(1),
            ])
            .into_connection();

        save_results(&db, Id::new_v4(), long).await?;

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1, "all batches belong to a single transaction");

        let utterance_inserts: Vec<_> = log[0]
            .statements()
            .iter()
            .filter(|statement| statement.sql.starts_with(r#"INSERT INTO "utterances""#))
            .collect();
        assert_eq!(utterance_inserts.len(), 3);
        for statement in utterance_inserts {
            let binds = statement.values.as_ref().map_or(0, |values| values.0.len());
            assert!(binds <= 8 * UTTERANCE_INSERT_BATCH_SIZE, "{binds} parameters");
        }
        Ok(())
    }

    #[tokio::test]
    async fn save_results_rolls_back_when_an_utterance_has_no_speaker() {
        let mut bad = results();
        bad.utterances[1].speaker_index = 7;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([exec(0), exec(0), exec(0), exec(2), exec(1)])
            .into_connection();

        let result = save_results(&db, Id::new_v4(), bad).await;
        assert_eq!(
            result.unwrap_err().error_kind,
            EntityApiErrorKind::ValidationError
        );

        let statements = format!("{:?}", db.into_transaction_log());
        assert!(!statements.contains("completed"));
    }
}
