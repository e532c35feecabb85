//! Error types for meeting AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// Provider implementations map their native failures onto these variants. The
/// processing pipeline stores the `Display` form of the error on the failed meeting,
/// so messages are written for the person who triggered the run.
#[derive(Debug)]
pub enum Error {
    /// No API key is configured for the provider.
    Credential(String),

    /// The audio upload was rejected by the provider.
    Upload(String),

    /// The provider refused to create a transcription job.
    JobCreation(String),

    /// The transcription job finished with an error status.
    Transcription(String),

    /// The transcription job did not finish within the polling budget.
    Timeout(String),

    /// The model response did not contain a usable JSON object. Analysis clients
    /// degrade on this error instead of returning it.
    AnalysisParse(String),

    /// Any other non-success response from a provider.
    Provider(String),

    /// Connection failures, DNS failures or unreadable response bodies.
    Network(String),

    /// The audio file could not be read.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Credential(msg) => write!(f, "Missing credentials: {}", msg),
            Error::Upload(msg) => write!(f, "Audio upload failed: {}", msg),
            Error::JobCreation(msg) => write!(f, "Could not start transcription: {}", msg),
            Error::Transcription(msg) => write!(f, "Transcription failed: {}", msg),
            Error::Timeout(msg) => write!(f, "Transcription timed out: {}", msg),
            Error::AnalysisParse(msg) => write!(f, "Could not parse analysis: {}", msg),
            Error::Provider(msg) => write!(f, "Provider error: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Io(err) => write!(f, "Could not read audio file: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_provider_message() {
        let err = Error::Transcription("audio too short".to_string());
        assert_eq!(err.to_string(), "Transcription failed: audio too short");
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&err).is_some());
    }
}
