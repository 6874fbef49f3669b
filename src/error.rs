//! Unified error type for stylist.

use thiserror::Error;

/// Errors that can occur while styling an outfit session.
#[derive(Debug, Error)]
pub enum StylistError {
    /// The generation service returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The uploaded file could not be read or encoded.
    #[error("Could not read image: {0}")]
    Encoding(String),

    /// The idea generator returned text that does not match the outfit schema.
    #[error("Received an invalid format from the AI stylist: {0}")]
    MalformedResponse(String),

    /// The synthesizer response carried no image.
    #[error("Could not generate outfit image: {0}")]
    GenerationFailed(String),

    /// The editor response carried no image.
    #[error("Could not edit outfit image: {0}")]
    EditFailed(String),

    /// No API key configured for the generation service.
    #[error("No API key for Gemini. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },
}
