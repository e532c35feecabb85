use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateParams {
    /// The plain text API key. It is encrypted before it is stored.
    pub value: String,
}
