//! Encrypted storage of the third-party API keys the processing pipeline needs.
//!
//! Keys are sealed with the deployment-wide `ENCRYPTION_KEY` before they reach the
//! database and are only ever returned in plain text to the pipeline. A missing key is
//! a normal state that reads as "not configured".

use crate::encryption::Cipher;
use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use entity::credential_key::CredentialKey;
use entity_api::setting;
use log::*;
use sea_orm::strum::IntoEnumIterator;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use service::config::Config;
use utoipa::ToSchema;

/// Visible characters at the end of a masked key
const MASK_VISIBLE_CHARS: usize = 4;

/// What the settings page may know about a stored credential.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CredentialStatus {
    pub key: CredentialKey,
    pub configured: bool,
    /// The key with all but its last characters hidden, ex. `****c3f9`
    pub masked_value: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Returns the plain text API key stored under `key`, if any.
pub async fn get_api_key(
    db: &DatabaseConnection,
    config: &Config,
    key: CredentialKey,
) -> Result<Option<String>, Error> {
    let Some(stored) = setting::find_by_key(db, key).await? else {
        debug!("No {key} credential configured");
        return Ok(None);
    };

    let cipher = Cipher::from_config(config.encryption_key().as_deref())?;
    Ok(Some(cipher.open(&stored.encrypted_value)?))
}

/// Encrypts and stores `value` under `key`, replacing any previous value.
pub async fn set_api_key(
    db: &DatabaseConnection,
    config: &Config,
    key: CredentialKey,
    value: &str,
) -> Result<(), Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        });
    }

    let cipher = Cipher::from_config(config.encryption_key().as_deref())?;
    setting::upsert(db, key, cipher.seal(value)?).await?;
    info!("Stored {key} credential");
    Ok(())
}

/// Removes the credential stored under `key`. Removing an absent key is not an error.
pub async fn delete_api_key(db: &DatabaseConnection, key: CredentialKey) -> Result<(), Error> {
    if setting::delete_by_key(db, key).await? {
        info!("Removed {key} credential");
    }
    Ok(())
}

/// Reports every known credential, configured or not, with its value masked.
pub async fn find_all_status(
    db: &DatabaseConnection,
    config: &Config,
) -> Result<Vec<CredentialStatus>, Error> {
    let stored = setting::find_all(db).await?;
    let cipher = Cipher::from_config(config.encryption_key().as_deref()).ok();

    Ok(CredentialKey::iter()
        .map(|key| match stored.iter().find(|s| s.key == key) {
            Some(setting) => {
                let masked_value = cipher
                    .as_ref()
                    .and_then(|cipher| match cipher.open(&setting.encrypted_value) {
                        Ok(plain) => Some(mask_secret(&plain)),
                        Err(e) => {
                            warn!("Stored {key} credential cannot be decrypted: {e}");
                            None
                        }
                    });
                CredentialStatus {
                    key,
                    configured: true,
                    masked_value,
                    updated_at: Some(setting.updated_at),
                }
            }
            None => CredentialStatus {
                key,
                configured: false,
                masked_value: None,
                updated_at: None,
            },
        })
        .collect())
}

/// Hides all but the last few characters of a secret. Short secrets are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= MASK_VISIBLE_CHARS * 2 {
        return "*".repeat(8);
    }
    let visible: String = chars[chars.len() - MASK_VISIBLE_CHARS..].iter().collect();
    format!("****{visible}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_secret_keeps_the_last_four_characters() {
        assert_eq!(mask_secret("sk-1234567890abcdef"), "****cdef");
    }

    #[test]
    fn mask_secret_hides_short_secrets_entirely() {
        assert_eq!(mask_secret("abc"), "********");
        assert_eq!(mask_secret("12345678"), "********");
    }

    #[cfg(feature = "mock")]
    mod mock {
        use super::super::*;
        use entity::{settings, Id};
        use sea_orm::{DatabaseBackend, MockDatabase};

        const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

        fn config() -> Config {
            Config::from_env().set_encryption_key(Some(TEST_KEY.to_string()))
        }

        fn stored(key: CredentialKey, plain: &str) -> settings::Model {
            let now = chrono::Utc::now();
            settings::Model {
                id: Id::new_v4(),
                key,
                encrypted_value: Cipher::from_hex(TEST_KEY).unwrap().seal(plain).unwrap(),
                created_at: now.into(),
                updated_at: now.into(),
            }
        }

        #[tokio::test]
        async fn get_api_key_decrypts_the_stored_value() -> Result<(), Error> {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![stored(CredentialKey::Gemini, "gem-secret-key")]])
                .into_connection();

            let value = get_api_key(&db, &config(), CredentialKey::Gemini).await?;

            assert_eq!(value.as_deref(), Some("gem-secret-key"));
            Ok(())
        }

        #[tokio::test]
        async fn get_api_key_reads_missing_values_as_none() -> Result<(), Error> {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<settings::Model>::new()])
                .into_connection();

            let value = get_api_key(&db, &config(), CredentialKey::AssemblyAi).await?;

            assert_eq!(value, None);
            Ok(())
        }

        #[tokio::test]
        async fn set_api_key_requires_an_encryption_key() {
            let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
            let config = Config::from_env().set_encryption_key(None);

            let result = set_api_key(&db, &config, CredentialKey::Gemini, "value").await;

            assert_eq!(
                result.unwrap_err().error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Config)
            );
        }

        #[tokio::test]
        async fn status_lists_every_credential_with_masked_values() -> Result<(), Error> {
            let db = MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![stored(
                    CredentialKey::AssemblyAi,
                    "aai-0000-1111-2222",
                )]])
                .into_connection();

            let statuses = find_all_status(&db, &config()).await?;

            assert_eq!(statuses.len(), 2);
            let assembly_ai = statuses
                .iter()
                .find(|s| s.key == CredentialKey::AssemblyAi)
                .unwrap();
            assert!(assembly_ai.configured);
            assert_eq!(assembly_ai.masked_value.as_deref(), Some("****2222"));
            let gemini = statuses
                .iter()
                .find(|s| s.key == CredentialKey::Gemini)
                .unwrap();
            assert!(!gemini.configured);
            assert_eq!(gemini.masked_value, None);
            Ok(())
        }
    }
}
