//! Transcription provider trait.

use crate::types::transcription::Transcription;
use crate::Error;
use async_trait::async_trait;
use std::path::Path;

/// Abstraction for speech-to-text transcription services.
///
/// Implementations take a local audio file all the way to a finished transcript:
/// upload, job creation and waiting for completion all happen inside one call.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Transcribe the audio file at `audio_path` with speaker diarization and
    /// automatic language detection.
    ///
    /// Speaker indices in the result are dense, zero-based and assigned in order of
    /// first appearance. They are only stable within a single call.
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, Error>;
}
