//! Background processing of uploaded meetings.
//!
//! A run moves a meeting through `pending -> transcribing -> analyzing -> completed`.
//! Starting a run is a compare-and-swap on the meeting status, so at most one run per
//! meeting is ever in flight. Every error raised during a run is caught in [`run`], the
//! only place that marks a meeting `failed`. Results are written in a single transaction,
//! so a failed run never leaves partial transcript or analysis rows behind.

use crate::error::{Error, ProcessingErrorKind};
use crate::gateway::{assembly_ai, gemini};
use crate::{meetings, setting, Id};
use entity::credential_key::CredentialKey;
use entity::meeting_status::MeetingStatus;
use entity_api::meeting::{self, NewAnalysis, NewUtterance, ProcessingResults};
use entity_api::analysis_items::{ActionItems, KeyPoints, SpeakerNames, Topics};
use log::*;
use meeting_ai::traits::{analysis, transcription};
use meeting_ai::types::analysis::{Analysis, Request};
use meeting_ai::types::transcription::Transcription;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::path::Path;
use std::sync::Arc;

/// Atomically moves a `pending` or `failed` meeting to `transcribing`.
///
/// A meeting that is already completed or currently being processed is rejected and
/// left untouched.
pub async fn claim(db: &DatabaseConnection, meeting_id: Id) -> Result<(), Error> {
    if meeting::claim_for_processing(db, meeting_id).await? {
        info!("Claimed meeting {meeting_id} for processing");
        return Ok(());
    }

    let meeting = meeting::find_by_id(db, meeting_id).await?;
    let kind = if meeting.status == MeetingStatus::Completed {
        ProcessingErrorKind::AlreadyProcessed
    } else {
        if !meeting.status.is_in_progress() {
            // Another caller claimed the meeting and let it go again between the claim
            // and this read
            debug!("Meeting {meeting_id} changed status while being claimed");
        }
        ProcessingErrorKind::AlreadyInProgress
    };
    warn!(
        "Refusing to process meeting {meeting_id} in status {}: {kind}",
        meeting.status
    );
    Err(Error::processing(kind))
}

/// Drives a claimed meeting through transcription and analysis and stores the results.
///
/// Never fails: any error marks the meeting `failed` with the error's message. Returns
/// the status the meeting ended up in.
pub async fn run(
    db: &DatabaseConnection,
    transcriber: &dyn transcription::Provider,
    analyzer: &dyn analysis::Provider,
    meeting: &meetings::Model,
) -> MeetingStatus {
    match execute(db, transcriber, analyzer, meeting).await {
        Ok(()) => {
            info!("Meeting {} processed successfully", meeting.id);
            MeetingStatus::Completed
        }
        Err(e) => {
            let message = e.message();
            error!("Processing meeting {} failed: {message}", meeting.id);
            if let Err(mark_err) = meeting::mark_failed(db, meeting.id, message).await {
                error!(
                    "Could not mark meeting {} as failed: {mark_err}",
                    meeting.id
                );
            }
            MeetingStatus::Failed
        }
    }
}

async fn execute(
    db: &DatabaseConnection,
    transcriber: &dyn transcription::Provider,
    analyzer: &dyn analysis::Provider,
    meeting: &meetings::Model,
) -> Result<(), Error> {
    debug!("Transcribing meeting {}", meeting.id);
    let transcription = transcriber
        .transcribe(Path::new(&meeting.storage_path))
        .await?;

    meeting::update_status(db, meeting.id, MeetingStatus::Analyzing).await?;

    debug!(
        "Analyzing meeting {} ({} utterances, {} speakers)",
        meeting.id,
        transcription.utterances.len(),
        transcription.speakers.len()
    );
    let analysis = analyzer
        .analyze(Request {
            transcript_text: transcription.speaker_prefixed_text(),
            language: transcription.language,
            custom_instructions: meeting.ai_instructions.clone(),
        })
        .await?;

    meeting::save_results(db, meeting.id, to_processing_results(transcription, analysis)).await?;
    Ok(())
}

/// Claims a meeting and runs it to completion on the current task.
pub async fn process_meeting(
    db: &DatabaseConnection,
    transcriber: &dyn transcription::Provider,
    analyzer: &dyn analysis::Provider,
    meeting_id: Id,
) -> Result<MeetingStatus, Error> {
    claim(db, meeting_id).await?;
    let meeting = meeting::find_by_id(db, meeting_id).await?;
    Ok(run(db, transcriber, analyzer, &meeting).await)
}

/// Validates ownership, claims the meeting and spawns the run in the background.
///
/// Returns as soon as the claim succeeded; progress is observable through the meeting
/// status.
pub async fn start_processing(
    db: Arc<DatabaseConnection>,
    config: &Config,
    user_id: Id,
    meeting_id: Id,
) -> Result<(), Error> {
    let meeting = meeting::find_by_id(&db, meeting_id).await?;
    if meeting.user_id != user_id {
        return Err(Error::not_found());
    }

    claim(&db, meeting_id).await?;

    let config = config.clone();
    tokio::spawn(async move {
        let db = db.as_ref();
        match build_providers(db, &config).await {
            Ok((transcriber, analyzer)) => {
                run(db, &transcriber, &analyzer, &meeting).await;
            }
            Err(e) => {
                let message = e.message();
                error!("Could not prepare providers for meeting {meeting_id}: {message}");
                if let Err(mark_err) = meeting::mark_failed(db, meeting_id, message).await {
                    error!("Could not mark meeting {meeting_id} as failed: {mark_err}");
                }
            }
        }
    });

    Ok(())
}

/// Builds the provider clients with the API keys currently stored in settings. Missing
/// keys are passed on as `None` and surface as credential errors inside the run.
async fn build_providers(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<(assembly_ai::AssemblyAiClient, gemini::GeminiClient), Error> {
    let assembly_ai_key = setting::get_api_key(db, config, CredentialKey::AssemblyAi).await?;
    let gemini_key = setting::get_api_key(db, config, CredentialKey::Gemini).await?;

    Ok((
        assembly_ai::client_from_config(config, assembly_ai_key)?,
        gemini::client_from_config(config, gemini_key)?,
    ))
}

/// Combines a transcription and its analysis into the rows stored for a meeting.
pub fn to_processing_results(
    transcription: Transcription,
    analysis: Analysis,
) -> ProcessingResults {
    ProcessingResults {
        full_text: transcription.full_text,
        raw_transcript: transcription.raw_response,
        utterances: transcription
            .utterances
            .into_iter()
            .map(|u| NewUtterance {
                speaker_index: u.speaker_index,
                text: u.text,
                start_seconds: u.start_seconds,
                end_seconds: u.end_seconds,
                confidence: u.confidence,
            })
            .collect(),
        speaker_indices: transcription.speakers,
        duration_seconds: transcription.duration_seconds,
        language: transcription.language,
        analysis: NewAnalysis {
            summary: analysis.summary,
            topics: Topics(analysis.topics),
            key_points: KeyPoints(analysis.key_points),
            action_items: ActionItems(analysis.action_items),
            meeting_document: analysis.meeting_document,
            speaker_names: SpeakerNames(analysis.speaker_names),
            raw_response: analysis.raw_response,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use entity::analysis_items::SpeakerName;
    use entity::language::Language;
    use meeting_ai::types::transcription::Utterance;
    use mockall::mock;

    mock! {
        pub Transcriber {}

        #[async_trait]
        impl transcription::Provider for Transcriber {
            async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, meeting_ai::Error>;
        }
    }

    mock! {
        pub Analyzer {}

        #[async_trait]
        impl analysis::Provider for Analyzer {
            async fn analyze(&self, request: Request) -> Result<Analysis, meeting_ai::Error>;
        }
    }

    fn sample_transcription() -> Transcription {
        Transcription {
            utterances: vec![
                Utterance {
                    speaker_index: 0,
                    text: "Hi, I'm Ada.".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 1.5,
                    confidence: 0.9,
                },
                Utterance {
                    speaker_index: 1,
                    text: "Welcome, Ada.".to_string(),
                    start_seconds: 1.5,
                    end_seconds: 3.0,
                    confidence: 0.8,
                },
            ],
            speakers: vec![0, 1],
            duration_seconds: 3.0,
            full_text: "Hi, I'm Ada. Welcome, Ada.".to_string(),
            language: Language::De,
            raw_response: serde_json::json!({"id": "tr_1"}),
        }
    }

    fn sample_analysis() -> Analysis {
        Analysis {
            summary: "Introductions".to_string(),
            speaker_names: vec![SpeakerName {
                speaker_index: 0,
                name: "Ada".to_string(),
            }],
            meeting_document: "# Intro".to_string(),
            raw_response: "{}".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn processing_results_keep_utterance_order_and_speaker_names() {
        let results = to_processing_results(sample_transcription(), sample_analysis());

        assert_eq!(results.speaker_indices, vec![0, 1]);
        assert_eq!(results.utterances[1].text, "Welcome, Ada.");
        assert_eq!(results.language, Language::De);
        assert_eq!(results.analysis.speaker_names.name_for(0), Some("Ada"));
        assert_eq!(results.raw_transcript["id"], "tr_1");
    }

    #[cfg(feature = "mock")]
    mod mock_db {
        use super::*;
        use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

        fn exec(rows_affected: u64) -> MockExecResult {
            MockExecResult {
                last_insert_id: 0,
                rows_affected,
            }
        }

        fn meeting_in(status: MeetingStatus) -> meetings::Model {
            let now = chrono::Utc::now().fixed_offset();
            meetings::Model {
                id: Id::new_v4(),
                user_id: Id::new_v4(),
                project_id: None,
                title: "Weekly sync".to_string(),
                description: None,
                language: Language::En,
                status,
                duration_seconds: None,
                storage_path: "/uploads/weekly.mp3".to_string(),
                original_filename: "weekly.mp3".to_string(),
                file_size_bytes: 1024,
                processing_error: None,
                ai_instructions: Some("Focus on decisions".to_string()),
                is_favorite: false,
                processed_at: None,
                created_at: now,
                updated_at: now,
            }
        }

        fn succeeding_providers() -> (MockTranscriber, MockAnalyzer) {
            let mut transcriber = MockTranscriber::new();
            transcriber
                .expect_transcribe()
                .withf(|path| path == Path::new("/uploads/weekly.mp3"))
                .times(1)
                .returning(|_| Ok(sample_transcription()));

            let mut analyzer = MockAnalyzer::new();
            analyzer
                .expect_analyze()
                .withf(|request| {
                    request.transcript_text.starts_with("[Speaker 0]: Hi, I'm Ada.")
                        && request.language == Language::De
                        && request.custom_instructions.as_deref() == Some("Focus on decisions")
                })
                .times(1)
                .returning(|_| Ok(sample_analysis()));

            (transcriber, analyzer)
        }

        #[tokio::test]
        async fn successful_run_moves_through_every_status_in_order() -> Result<(), Error> {
            let meeting = meeting_in(MeetingStatus::Pending);
            let (transcriber, analyzer) = succeeding_providers();

            // claim, analyzing, then the eight statements of the results transaction
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .append_query_results([vec![meeting.clone()]])
                .append_exec_results((0..8).map(|_| exec(1)))
                .into_connection();

            let status = process_meeting(&db, &transcriber, &analyzer, meeting.id).await?;
            assert_eq!(status, MeetingStatus::Completed);

            let log = format!("{:?}", db.into_transaction_log());
            let transcribing = log.find("transcribing").unwrap();
            let analyzing = log.find("analyzing").unwrap();
            let completed = log.find("completed").unwrap();
            assert!(transcribing < analyzing && analyzing < completed);
            assert!(log.contains("Ada"));
            Ok(())
        }

        #[tokio::test]
        async fn transcription_failure_marks_failed_without_writing_results() {
            let meeting = meeting_in(MeetingStatus::Transcribing);
            let mut transcriber = MockTranscriber::new();
            transcriber.expect_transcribe().returning(|_| {
                Err(meeting_ai::Error::Transcription(
                    "Audio file is too short".to_string(),
                ))
            });
            let mut analyzer = MockAnalyzer::new();
            analyzer.expect_analyze().never();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .into_connection();

            let status = run(&db, &transcriber, &analyzer, &meeting).await;
            assert_eq!(status, MeetingStatus::Failed);

            let log = format!("{:?}", db.into_transaction_log());
            assert!(log.contains("failed"));
            assert!(log.contains("Transcription failed: Audio file is too short"));
            assert!(!log.contains("INSERT INTO"));
            assert!(!log.contains("analyzing"));
        }

        #[tokio::test]
        async fn analysis_failure_marks_failed_without_writing_results() {
            let meeting = meeting_in(MeetingStatus::Transcribing);
            let mut transcriber = MockTranscriber::new();
            transcriber
                .expect_transcribe()
                .returning(|_| Ok(sample_transcription()));
            let mut analyzer = MockAnalyzer::new();
            analyzer.expect_analyze().returning(|_| {
                Err(meeting_ai::Error::Provider("429: quota exhausted".to_string()))
            });

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .into_connection();

            let status = run(&db, &transcriber, &analyzer, &meeting).await;
            assert_eq!(status, MeetingStatus::Failed);

            let log = format!("{:?}", db.into_transaction_log());
            assert!(log.contains("quota exhausted"));
            assert!(!log.contains("INSERT INTO"));
            assert!(!log.contains("DELETE FROM"));
        }

        #[tokio::test]
        async fn missing_credentials_fail_the_run() {
            let meeting = meeting_in(MeetingStatus::Transcribing);
            let mut transcriber = MockTranscriber::new();
            transcriber.expect_transcribe().returning(|_| {
                Err(meeting_ai::Error::Credential(
                    "AssemblyAI API key is not configured".to_string(),
                ))
            });
            let analyzer = MockAnalyzer::new();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1)])
                .into_connection();

            assert_eq!(
                run(&db, &transcriber, &analyzer, &meeting).await,
                MeetingStatus::Failed
            );
            let log = format!("{:?}", db.into_transaction_log());
            assert!(log.contains("Missing credentials: AssemblyAI API key is not configured"));
        }

        #[tokio::test]
        async fn failed_meetings_can_be_processed_again() -> Result<(), Error> {
            let meeting = meeting_in(MeetingStatus::Failed);
            let (transcriber, analyzer) = succeeding_providers();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1)])
                .append_query_results([vec![meeting.clone()]])
                .append_exec_results((0..8).map(|_| exec(1)))
                .into_connection();

            let status = process_meeting(&db, &transcriber, &analyzer, meeting.id).await?;
            assert_eq!(status, MeetingStatus::Completed);

            // Stale rows from the failed attempt are deleted before new ones are written
            let log = format!("{:?}", db.into_transaction_log());
            assert!(log.find("DELETE FROM").unwrap() < log.find("INSERT INTO").unwrap());
            Ok(())
        }

        #[tokio::test]
        async fn completed_meetings_are_not_processed_again() {
            let meeting = meeting_in(MeetingStatus::Completed);
            let mut transcriber = MockTranscriber::new();
            transcriber.expect_transcribe().never();
            let mut analyzer = MockAnalyzer::new();
            analyzer.expect_analyze().never();

            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .append_query_results([vec![meeting.clone()]])
                .into_connection();

            let err = process_meeting(&db, &transcriber, &analyzer, meeting.id)
                .await
                .unwrap_err();

            assert_eq!(err.message(), "Meeting has already been processed");
        }

        #[tokio::test]
        async fn meetings_in_flight_are_not_claimed_twice() {
            for status in [MeetingStatus::Transcribing, MeetingStatus::Analyzing] {
                let meeting = meeting_in(status);
                let db = MockDatabase::new(DatabaseBackend::Postgres)
                    .append_exec_results([exec(0)])
                    .append_query_results([vec![meeting.clone()]])
                    .into_connection();

                let err = claim(&db, meeting.id).await.unwrap_err();

                assert_eq!(
                    err.error_kind,
                    crate::error::DomainErrorKind::Internal(
                        crate::error::InternalErrorKind::Processing(
                            ProcessingErrorKind::AlreadyInProgress
                        )
                    )
                );
                assert_eq!(err.message(), "Meeting is already being processed");
            }
        }
    }
}
