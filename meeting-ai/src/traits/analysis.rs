//! AI analysis provider trait.

use crate::types::analysis::{Analysis, Request};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM-powered meeting transcript analysis.
///
/// Implementations turn a transcript into a summary, topics, key points, action items,
/// inferred speaker names and a long-form meeting document.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Analyze the transcript described by `request`.
    ///
    /// A malformed model response is not an error: implementations fall back to a
    /// summary-only [`Analysis`] so a finished transcription is never thrown away.
    async fn analyze(&self, request: Request) -> Result<Analysis, Error>;
}
