use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Languages a meeting can be transcribed and analyzed in.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "meeting_language")]
pub enum Language {
    #[sea_orm(string_value = "en")]
    #[default]
    En,
    #[sea_orm(string_value = "de")]
    De,
    #[sea_orm(string_value = "fr")]
    Fr,
    #[sea_orm(string_value = "es")]
    Es,
    #[sea_orm(string_value = "it")]
    It,
    #[sea_orm(string_value = "pt")]
    Pt,
    #[sea_orm(string_value = "nl")]
    Nl,
}

impl Language {
    /// Maps a provider language code such as `en_us` or `de` onto a supported
    /// language by its two letter prefix. Unknown or missing codes fall back to English.
    pub fn from_code(code: Option<&str>) -> Language {
        let Some(code) = code else {
            return Language::default();
        };
        let prefix: String = code
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .take(2)
            .collect::<String>()
            .to_lowercase();

        Language::iter()
            .find(|language| language.code() == prefix)
            .unwrap_or_default()
    }

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Nl => "nl",
        }
    }

    /// English name of the language, used when instructing the analysis model.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::De => "German",
            Language::Fr => "French",
            Language::Es => "Spanish",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::Nl => "Dutch",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_matches_regional_variants_by_prefix() {
        assert_eq!(Language::from_code(Some("en_us")), Language::En);
        assert_eq!(Language::from_code(Some("de")), Language::De);
        assert_eq!(Language::from_code(Some("PT-BR")), Language::Pt);
    }

    #[test]
    fn from_code_falls_back_to_english() {
        assert_eq!(Language::from_code(None), Language::En);
        assert_eq!(Language::from_code(Some("ja")), Language::En);
        assert_eq!(Language::from_code(Some("")), Language::En);
    }
}
