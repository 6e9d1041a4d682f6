//! Error types for the lectern domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them.

use thiserror::Error;

/// The top-level error type for all lectern operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Prompt errors ---
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    // --- Lesson errors ---
    #[error("Lesson error: {0}")]
    Lesson(#[from] LessonError),

    // --- Artifact errors ---
    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the chat-completion provider.
///
/// Every variant is an upstream failure as far as the model fallback policy
/// is concerned.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum PromptError {
    /// The system prompt template is required; boundaries are not.
    #[error("Prompt file not found: {file}. Make sure the file exists in {dir}")]
    TemplateMissing { file: String, dir: String },

    #[error("Error loading prompt {file}: {reason}")]
    Io { file: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Lesson with ID {0} not found")]
    NotFound(u32),
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Invalid artifact id: {0}")]
    InvalidId(String),

    #[error("Artifact storage error: {0}")]
    Io(String),

    #[error("Artifact encoding error: {0}")]
    Encoding(String),
}

impl From<std::io::Error> for ArtifactError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
