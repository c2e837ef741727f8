use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shortlist_core::category::CategorySet;
use shortlist_core::config::AnalyzerSettings;
use shortlist_core::error::{Error, Result};
use shortlist_core::traits::QueryExtractor;
use shortlist_core::types::RawExtraction;

use crate::payload::parse_extraction;
use crate::prompt::build_prompt;

/// Blocking client for the Gemini `generateContent` endpoint.
///
/// One attempt per query under a fixed timeout; no retries.
///
/// Built on `reqwest::blocking`: create, use and drop it off the async
/// runtime, e.g. inside `tokio::task::spawn_blocking`.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    categories: CategorySet,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient").field("url", &self.url).finish_non_exhaustive()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, api_key: &str, timeout: Duration, categories: CategorySet) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        let url = format!("{}/v1beta/models/{}:generateContent", endpoint.trim_end_matches('/'), model);
        Ok(Self { client, url, api_key: api_key.to_string(), categories })
    }

    /// Client configured from settings, or `None` when the API key
    /// environment variable is unset or blank.
    pub fn from_settings(settings: &AnalyzerSettings, categories: CategorySet) -> anyhow::Result<Option<Self>> {
        let key = std::env::var(&settings.api_key_env).unwrap_or_default();
        if key.trim().is_empty() {
            warn!(var = %settings.api_key_env, "API key not set; query analysis runs in fallback mode");
            return Ok(None);
        }
        let timeout = Duration::from_secs(settings.timeout_secs);
        Self::new(&settings.endpoint, &settings.model, key.trim(), timeout, categories).map(Some)
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature: 0.0, response_mime_type: "application/json" },
        };
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| Error::Extraction(format!("service call failed: {e}")))?;
        let parsed: GenerateResponse =
            response.json().map_err(|e| Error::Extraction(format!("unreadable service response: {e}")))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(Error::Extraction("service returned no text".to_string()));
        }
        Ok(text)
    }
}

impl QueryExtractor for GeminiClient {
    fn extract(&self, query: &str) -> Result<RawExtraction> {
        let prompt = build_prompt(query, &self.categories);
        let text = self.generate(&prompt)?;
        debug!(chars = text.len(), "extraction response received");
        parse_extraction(&text)
    }
}
