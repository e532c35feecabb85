use serde::Deserialize;
use utoipa::ToSchema;

/// New label for a speaker. An empty or missing label resets it to `Speaker N`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateParams {
    pub label: Option<String>,
}

impl UpdateParams {
    pub fn into_label(self) -> Option<String> {
        self.label
            .map(|label| label.trim().to_owned())
            .filter(|label| !label.is_empty())
    }
}
