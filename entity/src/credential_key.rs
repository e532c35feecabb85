use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Third-party credentials the settings store knows how to hold.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Hash, EnumIter, Deserialize, Serialize, DeriveActiveEnum, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credential_key")]
pub enum CredentialKey {
    /// AssemblyAI speech-to-text API key
    #[sea_orm(string_value = "assembly_ai")]
    AssemblyAi,
    /// Google Gemini API key
    #[sea_orm(string_value = "gemini")]
    Gemini,
}

impl std::fmt::Display for CredentialKey {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKey::AssemblyAi => write!(fmt, "assembly_ai"),
            CredentialKey::Gemini => write!(fmt, "gemini"),
        }
    }
}

impl std::str::FromStr for CredentialKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assembly_ai" => Ok(CredentialKey::AssemblyAi),
            "gemini" => Ok(CredentialKey::Gemini),
            other => Err(format!("unknown credential key: {other}")),
        }
    }
}
