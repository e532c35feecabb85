use domain::export::ExportFormat;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct ExportParams {
    /// `markdown` (default) or `html`
    pub(crate) format: Option<ExportFormat>,
}
