//! AssemblyAI API client for transcription services.
//!
//! This module provides an HTTP client for the AssemblyAI v2 API. A transcription is a
//! three step exchange: the audio bytes are uploaded, a transcript job is created for
//! the returned upload URL, and the job is polled until it completes or fails.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use entity::language::Language;
use log::*;
use meeting_ai::traits::transcription::Provider;
use meeting_ai::types::transcription::{ms_to_seconds, SpeakerIndexer, Transcription, Utterance};
use meeting_ai::Error as ProviderError;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 1200;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

/// Request to create a new transcription
#[derive(Debug, Serialize)]
pub struct CreateTranscriptRequest {
    pub audio_url: String,
    pub speaker_labels: bool,
    pub language_detection: bool,
}

/// Transcript job as returned by both the create and the get endpoints
#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    pub id: String,
    pub status: TranscriptStatus,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub utterances: Option<Vec<AssemblyUtterance>>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Length of the audio in seconds
    #[serde(default)]
    pub audio_duration: Option<f64>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Transcript processing status
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

/// Utterance (speaker segment) with timing in milliseconds
#[derive(Debug, Deserialize, Clone)]
pub struct AssemblyUtterance {
    pub text: String,
    pub start: i64,
    pub end: i64,
    pub confidence: f64,
    pub speaker: String,
}

/// Client for the AssemblyAI transcription API.
pub struct AssemblyAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl AssemblyAiClient {
    /// Create a new AssemblyAI client. A missing `api_key` is not an error until a
    /// transcription is requested.
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        })
    }

    /// Overrides how often and how many times a transcript job is polled.
    pub fn with_polling(mut self, poll_interval: Duration, max_poll_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_poll_attempts = max_poll_attempts.max(1);
        self
    }

    fn auth_header(&self) -> Result<HeaderValue, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Credential("AssemblyAI API key is not configured".to_string())
        })?;

        let mut header_value = HeaderValue::from_str(api_key).map_err(|e| {
            warn!("Failed to create auth header: {:?}", e);
            ProviderError::Credential("AssemblyAI API key has an invalid format".to_string())
        })?;
        header_value.set_sensitive(true);
        Ok(header_value)
    }

    /// Upload raw audio bytes, returning the private URL AssemblyAI stores them under
    pub async fn upload_audio(&self, audio: Vec<u8>) -> Result<String, ProviderError> {
        let url = format!("{}/upload", self.base_url);
        debug!("Uploading {} bytes of audio to AssemblyAI", audio.len());

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth_header()?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(audio)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to upload audio to AssemblyAI: {:?}", e);
                ProviderError::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let upload: UploadResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse AssemblyAI upload response: {:?}", e);
                ProviderError::Upload("Invalid response from AssemblyAI".to_string())
            })?;
            Ok(upload.upload_url)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI upload API: {} {}", status, error_text);
            Err(ProviderError::Upload(format!("{status}: {error_text}")))
        }
    }

    /// Create a new transcription job with speaker labels and language detection
    pub async fn create_transcript(
        &self,
        audio_url: &str,
    ) -> Result<TranscriptResponse, ProviderError> {
        let url = format!("{}/transcript", self.base_url);
        let request = CreateTranscriptRequest {
            audio_url: audio_url.to_string(),
            speaker_labels: true,
            language_detection: true,
        };

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth_header()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to create AssemblyAI transcript: {:?}", e);
                ProviderError::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let transcript: TranscriptResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse AssemblyAI response: {:?}", e);
                ProviderError::JobCreation("Invalid response from AssemblyAI".to_string())
            })?;
            info!("Created AssemblyAI transcript with ID: {}", transcript.id);
            Ok(transcript)
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI transcript API: {} {}", status, error_text);
            Err(ProviderError::JobCreation(format!("{status}: {error_text}")))
        }
    }

    /// Get the current state of a transcript job together with the untouched JSON body
    pub async fn get_transcript(
        &self,
        transcript_id: &str,
    ) -> Result<(TranscriptResponse, Value), ProviderError> {
        let url = format!("{}/transcript/{}", self.base_url, transcript_id);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth_header()?)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get AssemblyAI transcript: {:?}", e);
                ProviderError::Network(e.to_string())
            })?;

        if response.status().is_success() {
            let raw: Value = response.json().await.map_err(|e| {
                warn!("Failed to read AssemblyAI response: {:?}", e);
                ProviderError::Network(e.to_string())
            })?;
            let transcript: TranscriptResponse =
                serde_json::from_value(raw.clone()).map_err(|e| {
                    warn!("Failed to parse AssemblyAI response: {:?}", e);
                    ProviderError::Provider("Invalid response from AssemblyAI".to_string())
                })?;
            Ok((transcript, raw))
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("AssemblyAI API: {} {}", status, error_text);
            Err(ProviderError::Provider(format!("{status}: {error_text}")))
        }
    }

    /// Polls the job until it completes, fails, or the attempt budget is spent.
    async fn wait_for_completion(
        &self,
        transcript_id: &str,
    ) -> Result<(TranscriptResponse, Value), ProviderError> {
        for attempt in 1..=self.max_poll_attempts {
            let (transcript, raw) = self.get_transcript(transcript_id).await?;
            match transcript.status {
                TranscriptStatus::Completed => {
                    info!("AssemblyAI transcript {transcript_id} completed after {attempt} poll(s)");
                    return Ok((transcript, raw));
                }
                TranscriptStatus::Error => {
                    let message = transcript
                        .error
                        .unwrap_or_else(|| "unknown error".to_string());
                    warn!("AssemblyAI transcript {transcript_id} failed: {message}");
                    return Err(ProviderError::Transcription(message));
                }
                TranscriptStatus::Queued | TranscriptStatus::Processing => {
                    trace!("AssemblyAI transcript {transcript_id} still {:?}", transcript.status);
                    if attempt < self.max_poll_attempts {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        Err(ProviderError::Timeout(format!(
            "transcript {transcript_id} was not finished after {} status checks",
            self.max_poll_attempts
        )))
    }
}

#[async_trait]
impl Provider for AssemblyAiClient {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, ProviderError> {
        // Fail on missing credentials before touching the file
        self.auth_header()?;

        let audio = tokio::fs::read(audio_path).await?;
        let upload_url = self.upload_audio(audio).await?;
        let job = self.create_transcript(&upload_url).await?;
        let (transcript, raw) = self.wait_for_completion(&job.id).await?;

        Ok(to_transcription(transcript, raw))
    }
}

/// Maps a completed AssemblyAI transcript onto the provider independent result.
pub fn to_transcription(transcript: TranscriptResponse, raw_response: Value) -> Transcription {
    let mut indexer = SpeakerIndexer::new();
    let mut utterances: Vec<Utterance> = transcript
        .utterances
        .unwrap_or_default()
        .into_iter()
        .map(|u| Utterance {
            speaker_index: indexer.index_for(&u.speaker),
            text: u.text,
            start_seconds: ms_to_seconds(u.start),
            end_seconds: ms_to_seconds(u.end),
            confidence: u.confidence,
        })
        .collect();

    let text = transcript.text.unwrap_or_default();
    let duration_seconds = transcript
        .audio_duration
        .or_else(|| utterances.last().map(|u| u.end_seconds))
        .unwrap_or_default();

    if utterances.is_empty() && !text.trim().is_empty() {
        utterances.push(Utterance {
            speaker_index: indexer.index_for("A"),
            text: text.clone(),
            start_seconds: 0.0,
            end_seconds: duration_seconds,
            confidence: transcript.confidence.unwrap_or_default(),
        });
    }

    let full_text = if text.trim().is_empty() {
        utterances
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        text
    };

    Transcription {
        speakers: indexer.speakers(),
        utterances,
        duration_seconds,
        full_text,
        language: Language::from_code(transcript.language_code.as_deref()),
        raw_response,
    }
}

/// Builds the client from configuration and an optional stored API key.
pub fn client_from_config(
    config: &service::config::Config,
    api_key: Option<String>,
) -> Result<AssemblyAiClient, Error> {
    let client = AssemblyAiClient::new(api_key, config.assembly_ai_base_url()).map_err(|e| {
        warn!("Failed to build AssemblyAI client: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })?;
    Ok(client.with_polling(
        Duration::from_secs(config.transcription_poll_interval_secs),
        config.transcription_max_poll_attempts,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;
    use std::path::PathBuf;

    async fn setup_test_server() -> ServerGuard {
        Server::new_async().await
    }

    fn test_client(server: &ServerGuard, api_key: Option<&str>) -> AssemblyAiClient {
        AssemblyAiClient::new(api_key.map(str::to_string), &server.url())
            .expect("client builds")
            .with_polling(Duration::ZERO, 3)
    }

    fn write_audio_file() -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}.mp3", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"ID3 fake audio").expect("temp file is writable");
        path
    }

    fn completed_body() -> Value {
        json!({
            "id": "tr_1",
            "status": "completed",
            "text": "Hi, I'm Ada. Hello Ada. Let's begin.",
            "confidence": 0.93,
            "audio_duration": 12.0,
            "language_code": "en_us",
            "utterances": [
                {"speaker": "B", "text": "Hi, I'm Ada.", "start": 0, "end": 1500, "confidence": 0.9},
                {"speaker": "A", "text": "Hello Ada.", "start": 1500, "end": 3000, "confidence": 0.95},
                {"speaker": "B", "text": "Let's begin.", "start": 3000, "end": 4250, "confidence": 0.92}
            ]
        })
    }

    #[tokio::test]
    async fn test_transcribe_uploads_creates_and_polls() {
        let mut server = setup_test_server().await;
        let audio_path = write_audio_file();

        let upload = server
            .mock("POST", "/upload")
            .match_header("authorization", "test_key")
            .match_body("ID3 fake audio")
            .with_status(200)
            .with_body(json!({"upload_url": "https://cdn.example/audio"}).to_string())
            .create_async()
            .await;
        let create = server
            .mock("POST", "/transcript")
            .match_header("authorization", "test_key")
            .match_body(Matcher::Json(json!({
                "audio_url": "https://cdn.example/audio",
                "speaker_labels": true,
                "language_detection": true
            })))
            .with_status(200)
            .with_body(json!({"id": "tr_1", "status": "queued"}).to_string())
            .create_async()
            .await;
        let poll = server
            .mock("GET", "/transcript/tr_1")
            .with_status(200)
            .with_body(completed_body().to_string())
            .create_async()
            .await;

        let transcription = test_client(&server, Some("test_key"))
            .transcribe(&audio_path)
            .await
            .expect("transcription succeeds");

        upload.assert_async().await;
        create.assert_async().await;
        poll.assert_async().await;
        let _ = std::fs::remove_file(audio_path);

        let indices: Vec<i32> = transcription
            .utterances
            .iter()
            .map(|u| u.speaker_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 0]);
        assert_eq!(transcription.speakers, vec![0, 1]);
        assert_eq!(transcription.utterances[2].start_seconds, 3.0);
        assert_eq!(transcription.utterances[2].end_seconds, 4.25);
        assert_eq!(transcription.duration_seconds, 12.0);
        assert_eq!(transcription.language, Language::En);
        assert_eq!(transcription.raw_response["id"], "tr_1");
    }

    #[tokio::test]
    async fn test_transcribe_without_api_key_fails_with_credential_error() {
        let server = setup_test_server().await;
        let result = test_client(&server, None)
            .transcribe(Path::new("/does/not/matter.mp3"))
            .await;

        assert!(matches!(result, Err(ProviderError::Credential(_))));
    }

    #[tokio::test]
    async fn test_rejected_upload_fails_with_upload_error() {
        let mut server = setup_test_server().await;
        let audio_path = write_audio_file();

        let _upload = server
            .mock("POST", "/upload")
            .with_status(401)
            .with_body("Invalid API key")
            .create_async()
            .await;

        let result = test_client(&server, Some("bad_key"))
            .transcribe(&audio_path)
            .await;
        let _ = std::fs::remove_file(audio_path);

        match result {
            Err(ProviderError::Upload(message)) => assert!(message.contains("Invalid API key")),
            other => panic!("Expected upload error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_job_fails_with_job_creation_error() {
        let mut server = setup_test_server().await;

        let _create = server
            .mock("POST", "/transcript")
            .with_status(400)
            .with_body("audio_url is unreachable")
            .create_async()
            .await;

        let result = test_client(&server, Some("test_key"))
            .create_transcript("https://cdn.example/audio")
            .await;

        assert!(matches!(result, Err(ProviderError::JobCreation(_))));
    }

    #[tokio::test]
    async fn test_failed_job_reports_provider_message() {
        let mut server = setup_test_server().await;

        let _poll = server
            .mock("GET", "/transcript/tr_err")
            .with_status(200)
            .with_body(
                json!({"id": "tr_err", "status": "error", "error": "Audio file is too short"})
                    .to_string(),
            )
            .create_async()
            .await;

        let result = test_client(&server, Some("test_key"))
            .wait_for_completion("tr_err")
            .await;

        match result {
            Err(ProviderError::Transcription(message)) => {
                assert_eq!(message, "Audio file is too short")
            }
            other => panic!("Expected transcription error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_polling_stops_after_max_attempts() {
        let mut server = setup_test_server().await;

        let poll = server
            .mock("GET", "/transcript/tr_slow")
            .with_status(200)
            .with_body(json!({"id": "tr_slow", "status": "processing"}).to_string())
            .expect(3)
            .create_async()
            .await;

        let result = test_client(&server, Some("test_key"))
            .wait_for_completion("tr_slow")
            .await;

        poll.assert_async().await;
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_returned_without_a_trailing_sleep() {
        let mut server = setup_test_server().await;

        let poll = server
            .mock("GET", "/transcript/tr_slow")
            .with_status(200)
            .with_body(json!({"id": "tr_slow", "status": "queued"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let started = std::time::Instant::now();
        let result = test_client(&server, Some("test_key"))
            .with_polling(Duration::from_secs(30), 1)
            .wait_for_completion("tr_slow")
            .await;

        poll.assert_async().await;
        assert!(matches!(result, Err(ProviderError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_text_without_utterances_becomes_one_segment() {
        let transcript: TranscriptResponse = serde_json::from_value(json!({
            "id": "tr_2",
            "status": "completed",
            "text": "Bonjour à tous.",
            "confidence": 0.8,
            "language_code": "fr",
            "utterances": null
        }))
        .unwrap();

        let transcription = to_transcription(transcript, Value::Null);

        assert_eq!(transcription.utterances.len(), 1);
        assert_eq!(transcription.utterances[0].speaker_index, 0);
        assert_eq!(transcription.speakers, vec![0]);
        assert_eq!(transcription.language, Language::Fr);
        assert_eq!(transcription.full_text, "Bonjour à tous.");
    }

    #[test]
    fn test_duration_falls_back_to_last_utterance() {
        let mut body = completed_body();
        body["audio_duration"] = Value::Null;
        body["language_code"] = json!("xx");
        let transcript: TranscriptResponse = serde_json::from_value(body).unwrap();

        let transcription = to_transcription(transcript, Value::Null);

        assert_eq!(transcription.duration_seconds, 4.25);
        assert_eq!(transcription.language, Language::En);
    }
}
