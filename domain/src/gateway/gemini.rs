//! Google Gemini API client for meeting transcript analysis.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use log::*;
use meeting_ai::prompt::build_analysis_prompt;
use meeting_ai::traits::analysis::Provider;
use meeting_ai::types::analysis::{parse_analysis_response, Analysis, Request};
use meeting_ai::Error as ProviderError;
use serde::{Deserialize, Serialize};

/// Low temperature keeps the JSON structure stable between runs
const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it produced any.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: &str, model: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Sends `prompt` to the model and returns the raw text it answered with.
    pub async fn generate(&self, prompt: String) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Credential("Gemini API key is not configured".to_string()))?;

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json".to_string(),
            },
        };

        debug!("Requesting analysis from Gemini model {}", self.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // Never log the request itself, its URL carries the key
                warn!("Failed to reach Gemini: {:?}", e.without_url());
                ProviderError::Network("Could not reach Gemini".to_string())
            })?;

        if response.status().is_success() {
            let body: GenerateContentResponse = response.json().await.map_err(|e| {
                warn!("Failed to parse Gemini response: {:?}", e.without_url());
                ProviderError::Provider("Invalid response from Gemini".to_string())
            })?;
            body.text().ok_or_else(|| {
                warn!("Gemini returned no text");
                ProviderError::Provider("Gemini returned an empty response".to_string())
            })
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini API: {} {}", status, error_text);
            Err(ProviderError::Provider(format!("{status}: {error_text}")))
        }
    }
}

#[async_trait]
impl Provider for GeminiClient {
    async fn analyze(&self, request: Request) -> Result<Analysis, ProviderError> {
        let prompt = build_analysis_prompt(&request);
        let raw_response = self.generate(prompt).await?;

        let analysis = parse_analysis_response(&raw_response);
        info!(
            "Gemini analysis produced {} topics, {} key points and {} action items",
            analysis.topics.len(),
            analysis.key_points.len(),
            analysis.action_items.len()
        );
        Ok(analysis)
    }
}

/// Builds the client from configuration and an optional stored API key.
pub fn client_from_config(
    config: &service::config::Config,
    api_key: Option<String>,
) -> Result<GeminiClient, Error> {
    GeminiClient::new(api_key, config.gemini_base_url(), config.gemini_model()).map_err(|e| {
        warn!("Failed to build Gemini client: {:?}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    })
}
