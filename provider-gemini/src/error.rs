//! Error types for the Gemini provider

use core_library::generate::IdeaSourceError;
use thiserror::Error;

/// Gemini provider errors
#[derive(Error, Debug)]
pub enum GeminiError {
    /// Request never reached the API or the transport failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API request returned an error status
    #[error("Gemini API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// Failed to parse the model response
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    /// The response carried no candidates or no text
    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Result type for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

impl From<GeminiError> for IdeaSourceError {
    fn from(error: GeminiError) -> Self {
        IdeaSourceError(error.to_string())
    }
}
