use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Processing status of a meeting through its lifecycle.
///
/// `Pending -> Transcribing -> Analyzing -> Completed`, with any step able to
/// fall through to `Failed`. A failed meeting may be claimed for processing again.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_status")]
pub enum MeetingStatus {
    /// Uploaded and waiting to be processed
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    /// Audio is with the transcription provider
    #[sea_orm(string_value = "transcribing")]
    Transcribing,
    /// Transcript is with the analysis provider
    #[sea_orm(string_value = "analyzing")]
    Analyzing,
    /// Transcript and analysis are stored
    #[sea_orm(string_value = "completed")]
    Completed,
    /// The last processing attempt failed; see `processing_error`
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl MeetingStatus {
    /// Statuses from which a meeting may be claimed for a processing run.
    pub fn claimable() -> [MeetingStatus; 2] {
        [MeetingStatus::Pending, MeetingStatus::Failed]
    }

    /// True while a processing run owns the meeting.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, MeetingStatus::Transcribing | MeetingStatus::Analyzing)
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeetingStatus::Pending => write!(fmt, "pending"),
            MeetingStatus::Transcribing => write!(fmt, "transcribing"),
            MeetingStatus::Analyzing => write!(fmt, "analyzing"),
            MeetingStatus::Completed => write!(fmt, "completed"),
            MeetingStatus::Failed => write!(fmt, "failed"),
        }
    }
}

impl std::str::FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MeetingStatus::Pending),
            "transcribing" => Ok(MeetingStatus::Transcribing),
            "analyzing" => Ok(MeetingStatus::Analyzing),
            "completed" => Ok(MeetingStatus::Completed),
            "failed" => Ok(MeetingStatus::Failed),
            other => Err(format!("unknown meeting status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn only_pending_and_failed_are_claimable() {
        let claimable = MeetingStatus::claimable();
        assert!(claimable.contains(&MeetingStatus::Pending));
        assert!(claimable.contains(&MeetingStatus::Failed));
        assert!(!claimable.contains(&MeetingStatus::Completed));
        assert!(!claimable.contains(&MeetingStatus::Transcribing));
    }

    #[test]
    fn transcribing_and_analyzing_are_in_progress() {
        assert!(MeetingStatus::Transcribing.is_in_progress());
        assert!(MeetingStatus::Analyzing.is_in_progress());
        assert!(!MeetingStatus::Pending.is_in_progress());
        assert!(!MeetingStatus::Completed.is_in_progress());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for status in MeetingStatus::iter() {
            assert_eq!(status.to_string().parse::<MeetingStatus>(), Ok(status));
        }
    }
}
