use crate::extractors::RejectionType;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use log::*;
use semver::Version;
use service::config::ApiVersion;

/// Rejects requests whose `x-version` header does not name a supported API version.
pub(crate) struct CompareApiVersion(pub Version);

#[async_trait]
impl<S> FromRequestParts<S> for CompareApiVersion
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(ApiVersion::field_name()) else {
            debug!("Request is missing the {} header", ApiVersion::field_name());
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", ApiVersion::field_name()),
            ));
        };

        let version_str = header.to_str().map_err(|_| {
            (
                StatusCode::BAD_REQUEST,
                format!("Malformed {} header", ApiVersion::field_name()),
            )
        })?;

        if !ApiVersion::versions().contains(&version_str) {
            warn!("Request asked for unsupported API version {version_str}");
            return Err((
                StatusCode::BAD_REQUEST,
                format!("Unsupported API version: {version_str}"),
            ));
        }

        Version::parse(version_str)
            .map(CompareApiVersion)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(version: Option<&str>) -> Result<CompareApiVersion, RejectionType> {
        let mut builder = Request::builder().uri("/meetings");
        if let Some(version) = version {
            builder = builder.header(ApiVersion::field_name(), version);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CompareApiVersion::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn accepts_the_default_version() {
        let CompareApiVersion(version) = extract(Some(ApiVersion::default_version()))
            .await
            .unwrap();
        assert_eq!(version.to_string(), ApiVersion::default_version());
    }

    #[tokio::test]
    async fn rejects_missing_and_unknown_versions() {
        assert_eq!(extract(None).await.err().unwrap().0, StatusCode::BAD_REQUEST);
        assert_eq!(
            extract(Some("9.9.9")).await.err().unwrap().0,
            StatusCode::BAD_REQUEST
        );
    }
}
