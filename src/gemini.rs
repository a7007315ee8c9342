/*!
    Gemini API client module.

    This module provides the `TextGenerator` trait, the "send a prompt, get text back" capability the
    resolver depends on, and `GeminiClient`, its implementation over the Gemini `generateContent`
    REST endpoint. Requests are authenticated with a single static API key.
*/

use crate::error::{AppError, AppResult};
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Anything that turns a text prompt into a text completion.
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, with all of its parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

///
/// Client for the Gemini text generation API.
///
pub struct GeminiClient {
    /// Reqwest HTTP client for making API requests.
    client: Client,
    /// Gemini API key sent with every request.
    api_key: String,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// Scheme and host of the API, without a trailing slash.
    pub base_url: String,
}

impl GeminiClient {
    /// Create a new GeminiClient against the public Gemini endpoint.
    ///
    /// # Arguments
    /// * `api_key` - Gemini API key.
    /// * `model` - Name of the model to query.
    /// * `timeout` - Upper bound for a single request.
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_key: &str,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("apkmirror-mapper")
            .build()?;
        Ok(GeminiClient {
            client,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn send_post(&self, url: &str, body: serde_json::Value) -> AppResult<String> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("POST {} timed out: {}", url, e);
                } else if e.is_connect() {
                    error!("POST {} could not connect: {}", url, e);
                } else {
                    error!("POST {} failed: {}", url, e);
                }
                AppError::from(e)
            })?;

        let status = response.status();
        debug!("POST {} returned status: {}", url, status);
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            error!("POST {} failed with status {}: {}", url, status, text);
            Err(AppError::GeminiApi {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let body = json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });
        let raw = self.send_post(&self.endpoint(), body).await?;
        debug!("Raw Gemini response: {}", raw);
        let parsed: GenerateContentResponse = serde_json::from_str(&raw)?;
        parsed.into_text().ok_or(AppError::EmptyCompletion)
    }
}
