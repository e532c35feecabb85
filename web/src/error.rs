use std::error::Error as StdError;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
    UploadErrorKind,
};
use domain::rate_limit::RateLimited;

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by the web layer itself, before a request reaches the domain.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The request is malformed, ex. a multipart body without a file part
    BadRequest(String),
    Forbidden,
    PayloadTooLarge,
    RateLimited(RateLimited),
}

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::Web(WebErrorKind::BadRequest(message.into()))
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Web(web_error_kind) => web_error_response(web_error_kind),
            Error::Domain(domain_error) => domain_error_response(domain_error),
        }
    }
}

fn web_error_response(web_error_kind: WebErrorKind) -> Response {
    match web_error_kind {
        WebErrorKind::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        WebErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN").into_response(),
        WebErrorKind::PayloadTooLarge => {
            (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD TOO LARGE").into_response()
        }
        WebErrorKind::RateLimited(rate_limited) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(
                header::RETRY_AFTER,
                rate_limited.retry_after_secs().to_string(),
            )],
            rate_limited.to_string(),
        )
            .into_response(),
    }
}

fn domain_error_response(domain_error: DomainError) -> Response {
    let message = domain_error.message();
    match domain_error.error_kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
                EntityErrorKind::Invalid => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                }
                EntityErrorKind::Unauthenticated => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED").into_response()
                }
                EntityErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT").into_response(),
                EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                    error!("Database error: {message}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            InternalErrorKind::Processing(_) => (StatusCode::CONFLICT, message).into_response(),
            InternalErrorKind::Upload(upload_error_kind) => match upload_error_kind {
                UploadErrorKind::Empty => (StatusCode::BAD_REQUEST, message).into_response(),
                UploadErrorKind::TooLarge { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, message).into_response()
                }
                UploadErrorKind::UnsupportedType(_) => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, message).into_response()
                }
            },
            InternalErrorKind::Config
            | InternalErrorKind::Encryption
            | InternalErrorKind::Other(_) => {
                error!("Internal error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network | ExternalErrorKind::Provider(_) => {
                warn!("Upstream error: {message}");
                (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response()
            }
            ExternalErrorKind::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        },
    }
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

impl From<WebErrorKind> for Error {
    fn from(kind: WebErrorKind) -> Self {
        Error::Web(kind)
    }
}

impl From<RateLimited> for Error {
    fn from(rate_limited: RateLimited) -> Self {
        Error::Web(WebErrorKind::RateLimited(rate_limited))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::error::ProcessingErrorKind;
    use std::time::Duration;

    #[test]
    fn processing_conflicts_map_to_409() {
        let response = Error::from(DomainError::processing(ProcessingErrorKind::AlreadyInProgress))
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn rejected_uploads_map_to_their_own_status_codes() {
        let too_large =
            Error::from(DomainError::upload(UploadErrorKind::TooLarge { max_bytes: 10 }));
        assert_eq!(too_large.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let unsupported = Error::from(DomainError::upload(UploadErrorKind::UnsupportedType(
            "txt".to_string(),
        )));
        assert_eq!(
            unsupported.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );

        let empty = Error::from(DomainError::upload(UploadErrorKind::Empty));
        assert_eq!(empty.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_requests_carry_retry_after() {
        let response = Error::from(RateLimited {
            retry_after: Duration::from_millis(12_300),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "13");
    }

    #[test]
    fn missing_records_map_to_404() {
        let response = Error::from(DomainError::not_found()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn provider_failures_map_to_bad_gateway() {
        let response = Error::from(DomainError {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(
                "quota exhausted".to_string(),
            )),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
