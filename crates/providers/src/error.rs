//! Errors surfaced by the completion gateway.

use lectern_core::error::{PromptError, ProviderError};

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The system prompt could not be assembled; no model was called.
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// The selected model is the fallback model, so there was nothing to retry.
    #[error("Model {model} failed and no fallback remains. Please try again later.")]
    ModelFailed {
        model: String,
        #[source]
        source: ProviderError,
    },

    #[error(
        "Both primary ({primary}) and fallback ({fallback}) models failed. Please try again later."
    )]
    AllModelsFailed {
        primary: String,
        fallback: String,
        primary_error: ProviderError,
        fallback_error: ProviderError,
    },
}

impl From<CompletionError> for lectern_core::Error {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Prompt(e) => lectern_core::Error::Prompt(e),
            CompletionError::ModelFailed { source, .. } => lectern_core::Error::Provider(source),
            other => lectern_core::Error::Internal(other.to_string()),
        }
    }
}
