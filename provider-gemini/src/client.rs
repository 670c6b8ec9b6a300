//! Gemini API client implementation
//!
//! Implements the `SongIdeaSource` trait over the `generateContent` REST
//! endpoint with a constrained JSON response schema.

use async_trait::async_trait;
use core_library::generate::{IdeaSourceError, SongIdea, SongIdeaSource};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{GeminiError, Result};

/// Gemini API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for playlist generation
const MODEL: &str = "gemini-2.5-flash";

/// Request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini API client
///
/// Asks the model for song title/artist pairs matching a prompt. The response
/// is constrained to a JSON schema, then parsed defensively: models
/// occasionally wrap JSON in markdown code fences despite the schema.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client using the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
        })
    }

    /// Override the API base URL (local test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[instrument(skip(self))]
    async fn request_ideas(&self, prompt: &str, count: usize) -> Result<Vec<SongIdea>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let body = json!({
            "contents": [{
                "parts": [{ "text": instruction(prompt, count) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "songs": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "title": { "type": "STRING" },
                                    "artist": { "type": "STRING" }
                                },
                                "required": ["title", "artist"]
                            }
                        }
                    },
                    "required": ["songs"]
                }
            }
        });

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generateContent failed");
            return Err(GeminiError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;
        let ideas = parse_ideas(&payload)?;
        debug!(ideas = ideas.len(), "generateContent succeeded");
        Ok(ideas)
    }
}

#[async_trait]
impl SongIdeaSource for GeminiClient {
    async fn song_ideas(
        &self,
        prompt: &str,
        count: usize,
    ) -> std::result::Result<Vec<SongIdea>, IdeaSourceError> {
        Ok(self.request_ideas(prompt, count).await?)
    }
}

fn instruction(prompt: &str, count: usize) -> String {
    format!(
        "Create a playlist of {count} songs for the following prompt: \"{prompt}\". \
         Provide only song titles and artist names."
    )
}

// ============================================================================
// Response Parsing
// ============================================================================

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

#[derive(Debug, Deserialize)]
struct IdeaList {
    songs: Vec<SongIdea>,
}

/// Extracts the song list from the first candidate's text part.
fn parse_ideas(response: &GenerateContentResponse) -> Result<Vec<SongIdea>> {
    let text = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .and_then(|c| c.parts.first())
        .and_then(|p| p.text.as_deref())
        .ok_or(GeminiError::EmptyResponse)?;

    let list: IdeaList = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| GeminiError::Parse(e.to_string()))?;
    Ok(list.songs)
}

/// Strips a surrounding markdown code fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = inner.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence, if any.
    match inner.split_once('\n') {
        Some((first_line, rest)) if !first_line.trim().contains('{') => rest.trim(),
        _ => inner.trim(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_text(text: &str) -> GenerateContentResponse {
        serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }] }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn parses_a_schema_conformant_response() {
        let response = response_with_text(
            r#"{"songs": [{"title": "Neon Rain", "artist": "Midnight Circuit"}]}"#,
        );
        let ideas = parse_ideas(&response).unwrap();
        assert_eq!(
            ideas,
            vec![SongIdea {
                title: "Neon Rain".to_string(),
                artist: "Midnight Circuit".to_string(),
            }]
        );
    }

    #[test]
    fn tolerates_code_fenced_json() {
        let fenced = "```json\n{\"songs\": [{\"title\": \"Afterglow\", \"artist\": \"Velvet Static\"}]}\n```";
        let response = response_with_text(fenced);
        let ideas = parse_ideas(&response).unwrap();
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "Afterglow");
    }

    #[test]
    fn tolerates_a_fence_without_language_tag() {
        let fenced = "```\n{\"songs\": []}\n```";
        let response = response_with_text(fenced);
        assert!(parse_ideas(&response).unwrap().is_empty());
    }

    #[test]
    fn missing_candidates_is_an_empty_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            parse_ideas(&response),
            Err(GeminiError::EmptyResponse)
        ));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let response = response_with_text("not json at all");
        assert!(matches!(parse_ideas(&response), Err(GeminiError::Parse(_))));
    }

    #[test]
    fn instruction_embeds_prompt_and_count() {
        let text = instruction("late night coding", 8);
        assert!(text.contains("8 songs"));
        assert!(text.contains("\"late night coding\""));
    }
}
