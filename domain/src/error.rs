//! Error types for the `domain` layer.
use crate::encryption::EncryptionError;
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use meeting_ai::Error as MeetingAiError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Each layer is free to define its own
/// error kinds to whatever richeness needed at that layer. Ultimately the various `error_kind`s are used
/// by `web` to return appropriate HTTP status codes and messages to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}
/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Encryption,
    Processing(ProcessingErrorKind),
    Upload(UploadErrorKind),
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    Conflict,
    DbTransaction,
    Other(String),
}

/// Reasons a processing run may not be started.
#[derive(Debug, PartialEq)]
pub enum ProcessingErrorKind {
    AlreadyProcessed,
    AlreadyInProgress,
}

impl fmt::Display for ProcessingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProcessingErrorKind::AlreadyProcessed => write!(f, "Meeting has already been processed"),
            ProcessingErrorKind::AlreadyInProgress => {
                write!(f, "Meeting is already being processed")
            }
        }
    }
}

/// Reasons an uploaded audio file is rejected.
#[derive(Debug, PartialEq)]
pub enum UploadErrorKind {
    Empty,
    TooLarge { max_bytes: u64 },
    UnsupportedType(String),
}

impl fmt::Display for UploadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UploadErrorKind::Empty => write!(f, "The uploaded file is empty"),
            UploadErrorKind::TooLarge { max_bytes } => {
                write!(f, "The uploaded file exceeds the limit of {max_bytes} bytes")
            }
            UploadErrorKind::UnsupportedType(extension) => {
                write!(f, "Unsupported audio file type: {extension}")
            }
        }
    }
}

/// Enum representing the various kinds of external errors that can occur in the `domain`` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A transcription or analysis provider rejected a request or failed a job
    Provider(String),
    Other(String),
}

impl Error {
    pub fn processing(kind: ProcessingErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Processing(kind)),
        }
    }

    pub fn upload(kind: UploadErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Upload(kind)),
        }
    }

    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound,
            )),
        }
    }

    /// A message fit for end users, preferring the description of the underlying error.
    pub fn message(&self) -> String {
        match (&self.error_kind, &self.source) {
            (DomainErrorKind::Internal(InternalErrorKind::Processing(kind)), _) => kind.to_string(),
            (DomainErrorKind::Internal(InternalErrorKind::Upload(kind)), _) => kind.to_string(),
            (_, Some(source)) => source.to_string(),
            (DomainErrorKind::Internal(InternalErrorKind::Other(message)), None)
            | (DomainErrorKind::External(ExternalErrorKind::Provider(message)), None)
            | (DomainErrorKind::External(ExternalErrorKind::Other(message)), None) => {
                message.clone()
            }
            (error_kind, None) => format!("{error_kind:?}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api`` layer to the `domain`` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                EntityErrorKind::Invalid
            }
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            EntityApiErrorKind::RecordAlreadyExists => EntityErrorKind::Conflict,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<MeetingAiError> for Error {
    fn from(err: MeetingAiError) -> Self {
        let error_kind = match &err {
            MeetingAiError::Credential(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            MeetingAiError::Network(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            MeetingAiError::Io(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
            MeetingAiError::Upload(_)
            | MeetingAiError::JobCreation(_)
            | MeetingAiError::Transcription(_)
            | MeetingAiError::Timeout(_)
            | MeetingAiError::AnalysisParse(_)
            | MeetingAiError::Provider(_) => {
                DomainErrorKind::External(ExternalErrorKind::Provider(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<EncryptionError> for Error {
    fn from(err: EncryptionError) -> Self {
        let error_kind = match err {
            EncryptionError::NoKeyConfigured | EncryptionError::InvalidKey => {
                InternalErrorKind::Config
            }
            _ => InternalErrorKind::Encryption,
        };
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(error_kind),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "File system error".to_string(),
            )),
        }
    }
}
