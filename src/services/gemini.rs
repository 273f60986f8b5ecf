// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gemini API client for food recognition and symptom analysis.
//!
//! Handles:
//! - Text-only generation (nutrition estimates, symptom analysis)
//! - Multimodal generation with an inline JPEG part (food photos)
//! - Extracting a JSON object from free-text model output

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

/// Vision model used to enumerate food items on a plate.
pub const VISION_MODEL: &str = "gemini-2.5-flash";
/// Text model used for nutrition estimates and symptom analysis.
pub const TEXT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key,
        }
    }

    /// Generate from a text-only prompt.
    pub async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, AppError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        self.generate(model, body).await
    }

    /// Generate from a JPEG image plus an instruction prompt.
    pub async fn generate_vision(
        &self,
        model: &str,
        prompt: &str,
        jpeg_bytes: &[u8],
    ) -> Result<String, AppError> {
        let body = json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "image/jpeg",
                            "data": STANDARD.encode(jpeg_bytes),
                        }
                    },
                    { "text": prompt }
                ]
            }]
        });
        self.generate(model, body).await
    }

    /// POST a generateContent request and pull out the first candidate's text.
    async fn generate(&self, model: &str, body: serde_json::Value) -> Result<String, AppError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Gemini(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, model, "Gemini request failed");
            return Err(AppError::Gemini(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gemini(format!("JSON parse error: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::Gemini("Empty response from model".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Extract a JSON object from free-text model output.
///
/// Models are asked for bare JSON but regularly wrap it in markdown fences
/// or surround it with prose. Strips a ```/```json fence if present, then
/// slices from the first `{` to the last `}`.
pub fn extract_json_block(raw: &str) -> Option<String> {
    let mut text = raw;

    if let Some(fenced) = text.split("```").nth(1) {
        text = fenced.strip_prefix("json").unwrap_or(fenced).trim();
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(text[start..=end].to_string())
}
