//! Meeting AI abstraction layer for transcription and analysis providers.
//!
//! This crate provides trait-based abstractions for the meeting processing workflow:
//! - Speech-to-text transcription with speaker diarization
//! - LLM-powered summarization and note extraction
//!
//! The design is provider-agnostic: the processing pipeline only talks to the
//! [`traits::transcription::Provider`] and [`traits::analysis::Provider`] traits, so
//! AssemblyAI or Gemini can be swapped for another vendor without touching it.
//! Parsing of untrusted model output also lives here, in [`types::analysis`].

pub mod error;
pub mod prompt;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::analysis::Analysis;
pub use types::transcription::Transcription;
