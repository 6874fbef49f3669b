//! Live adapter for the Gemini `generateContent` API.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::StylistError;
use crate::ports::encoded_image::ImageFuture;
use crate::ports::idea_generator::IdeasFuture;
use crate::ports::{
    EditRequest, EncodedImage, IdeaGenerator, IdeaRequest, ImageEditor, ImageSynthesizer,
    OutfitDescription, SynthesisRequest,
};
use crate::prompts::{flat_lay_prompt, ideas_response_schema, STYLIST_PROMPT};

/// Default Gemini REST endpoint for model calls.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini client implementing every stylist port.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key and endpoint base.
    #[must_use]
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map_or_else(|| GEMINI_API_BASE.to_string(), |u| u.trim_end_matches('/').to_string());
        Self { client: Client::new(), api_key, base_url }
    }

    /// POST a `generateContent` body and parse the response envelope.
    async fn generate_content(
        &self,
        model: &str,
        body: &serde_json::Value,
    ) -> Result<(GeminiResponse, String), StylistError> {
        let url = format!("{}/{model}:generateContent", self.base_url);
        debug!(%model, "Calling generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!(%model, status = status.as_u16(), bytes = response_text.len(), "Gemini responded");

        if !status.is_success() {
            return Err(StylistError::Api { status: status.as_u16(), message: response_text });
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            StylistError::Api { status: 200, message: format!("Failed to parse response: {e}") }
        })?;
        Ok((parsed, response_text))
    }
}

impl IdeaGenerator for GeminiClient {
    fn generate_ideas(&self, request: &IdeaRequest) -> IdeasFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "contents": [{
                    "parts": [
                        inline_part(&request.image),
                        {"text": STYLIST_PROMPT}
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": ideas_response_schema()
                }
            });

            let (parsed, _) = self.generate_content(&request.model, &body).await?;
            let text = parsed.text();
            parse_ideas(text.trim())
        })
    }
}

impl ImageSynthesizer for GeminiClient {
    fn synthesize(&self, request: &SynthesisRequest) -> ImageFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let mut generation_config = serde_json::json!({ "responseModalities": ["IMAGE"] });
            if let Some(ref ratio) = request.aspect_ratio {
                generation_config["imageConfig"] = serde_json::json!({ "aspectRatio": ratio });
            }

            let body = serde_json::json!({
                "contents": [{
                    "parts": [{"text": flat_lay_prompt(&request.description)}]
                }],
                "generationConfig": generation_config
            });

            let (parsed, response_text) = self.generate_content(&request.model, &body).await?;
            parsed.first_image()?.ok_or_else(|| {
                StylistError::GenerationFailed(format!("No image in response. Body: {}", truncate(&response_text)))
            })
        })
    }
}

impl ImageEditor for GeminiClient {
    fn edit(&self, request: &EditRequest) -> ImageFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::json!({
                "contents": [{
                    "parts": [
                        inline_part(&request.image),
                        {"text": request.instruction}
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            });

            let (parsed, response_text) = self.generate_content(&request.model, &body).await?;
            parsed.first_image()?.ok_or_else(|| {
                StylistError::EditFailed(format!("No image in response. Body: {}", truncate(&response_text)))
            })
        })
    }
}

/// Build an `inlineData` request part for an image.
fn inline_part(image: &EncodedImage) -> serde_json::Value {
    serde_json::json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": image.to_base64()
        }
    })
}

/// Parse the structured idea list, refusing anything that doesn't match the schema.
fn parse_ideas(text: &str) -> Result<Vec<OutfitDescription>, StylistError> {
    serde_json::from_str(text).map_err(|e| {
        StylistError::MalformedResponse(format!("{e}. Body: {}", truncate(text)))
    })
}

fn truncate(text: &str) -> String {
    if text.len() > 500 {
        let mut end = 500;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

impl GeminiResponse {
    /// Concatenated text of every part of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }

    /// The first inline image across all candidates, decoded.
    fn first_image(&self) -> Result<Option<EncodedImage>, StylistError> {
        let inline = self
            .candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .find_map(|p| p.inline_data.as_ref());

        let Some(inline) = inline else {
            return Ok(None);
        };
        let data = base64::engine::general_purpose::STANDARD.decode(&inline.data).map_err(|e| {
            StylistError::Api { status: 200, message: format!("Failed to decode base64: {e}") }
        })?;
        Ok(Some(EncodedImage { data, mime_type: inline.mime_type.clone() }))
    }
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

#[derive(Deserialize, Default)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}
