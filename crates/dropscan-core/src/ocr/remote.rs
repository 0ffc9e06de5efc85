//! Remote generative backend.
//!
//! Sends each preprocessed region crop plus an instruction prompt to a
//! Gemini-style `generateContent` endpoint and reads back the generated
//! text. Network and model failures are logged and recovered as empty
//! text for that region; the batch is never aborted and no retry happens
//! here - retrying is the caller's decision.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::error;

use crate::config::OcrSettings;
use crate::error::OcrError;

use super::OcrBackend;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Prompt-driven backend talking to a remote generative model.
///
/// Carries its API key per instance, so concurrent requests with
/// different credentials never interfere.
pub struct GenerativeBackend {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    prompt: String,
    endpoint: String,
}

impl GenerativeBackend {
    /// Create a backend bound to one API key.
    pub fn new(api_key: &str, settings: &OcrSettings) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.to_string(),
            model: settings.remote_model.clone(),
            prompt: settings.remote_prompt.clone(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Override the API base URL. Used by tests and self-hosted gateways.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn call_model(&self, crop: &GrayImage) -> Result<String, OcrError> {
        let mut png = Vec::new();
        crop.write_to(
            &mut std::io::Cursor::new(&mut png),
            image::ImageFormat::Png,
        )
        .map_err(|e| OcrError::RemoteCall(format!("png encode: {e}")))?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "parts": [
                    { "inline_data": { "mime_type": "image/png", "data": BASE64.encode(&png) } },
                    { "text": self.prompt },
                ]
            }]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| OcrError::RemoteCall(e.to_string()))?
            .error_for_status()
            .map_err(|e| OcrError::RemoteCall(e.to_string()))?;

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| OcrError::RemoteCall(format!("invalid response: {e}")))?;

        Ok(parsed.first_text().unwrap_or_default())
    }
}

impl OcrBackend for GenerativeBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn extract_region_text(&self, crop: &GrayImage) -> Result<String, OcrError> {
        match self.call_model(crop) {
            Ok(text) => Ok(text),
            Err(e) => {
                error!("Generative OCR request failed: {}", e);
                Ok(String::new())
            }
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<String> {
        self.candidates
            .first()?
            .content
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
            .map(|t| t.trim().to_string())
    }
}
