use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::users::Model;
use email_address::EmailAddress;
use log::*;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;

pub use entity_api::user::{find_by_email, find_by_id, AuthSession, Backend, Credentials};

/// Passwords shorter than this are rejected at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Creates an account after validating the address and password. An address that is
/// already registered is a conflict.
pub async fn register(db: &DatabaseConnection, registration: Registration) -> Result<Model, Error> {
    let email = registration.email.trim().to_lowercase();
    validate(&email, &registration.password)?;

    if find_by_email(db, &email).await?.is_some() {
        warn!("Registration attempted for existing address {email}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Conflict,
            )),
        });
    }

    let now = chrono::Utc::now();
    let user = entity_api::user::create(
        db,
        Model {
            id: crate::Id::new_v4(),
            email,
            display_name: registration
                .display_name
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
            password: registration.password,
            created_at: now.into(),
            updated_at: now.into(),
        },
    )
    .await?;

    info!("Registered user {}", user.id);
    Ok(user)
}

fn validate(email: &str, password: &str) -> Result<(), Error> {
    let invalid = || Error {
        source: None,
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid)),
    };

    if EmailAddress::from_str(email).is_err() {
        debug!("Rejected registration with malformed address");
        return Err(invalid());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        debug!("Rejected registration with a short password");
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_well_formed_registration() {
        assert!(validate("ada@example.com", "correct horse").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses_and_short_passwords() {
        assert!(validate("ada.example.com", "correct horse").is_err());
        assert!(validate("ada@example.com", "short").is_err());
    }

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn existing_addresses_conflict() {
        use sea_orm::{DatabaseBackend, MockDatabase};

        let now = chrono::Utc::now();
        let existing = Model {
            id: crate::Id::new_v4(),
            email: "ada@example.com".to_owned(),
            display_name: None,
            password: "hash".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing]])
            .into_connection();

        let err = register(
            &db,
            Registration {
                email: " Ada@Example.com".to_owned(),
                password: "correct horse".to_owned(),
                display_name: None,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Conflict))
        );
    }
}
