//! Model fallback: one retry against a fallback model, with per-attempt timeouts.
//!
//! When the selected model fails (timeout, rate limit, HTTP error, malformed
//! payload), the same conversation is sent once more to the fallback model.
//! There is no further retry and no backoff: at most two attempts per call.

use crate::error::CompletionError;
use lectern_core::error::ProviderError;
use lectern_core::provider::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs completion attempts against one provider, falling back to a
/// configured model once.
pub struct ModelFallback {
    provider: Arc<dyn lectern_core::Provider>,
    fallback_model: String,
    timeout: Duration,
}

impl ModelFallback {
    pub fn new(provider: Arc<dyn lectern_core::Provider>, fallback_model: impl Into<String>) -> Self {
        Self {
            provider,
            fallback_model: fallback_model.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fallback_model(&self) -> &str {
        &self.fallback_model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Complete against `selected`, then once against the fallback model.
    ///
    /// `make_request` builds the request for a given model id, so each
    /// attempt carries that model's own sampling parameters.
    pub async fn complete<F>(
        &self,
        selected: &str,
        make_request: F,
    ) -> Result<ProviderResponse, CompletionError>
    where
        F: Fn(&str) -> ProviderRequest,
    {
        let primary_error = match self.attempt(make_request(selected)).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        warn!(model = %selected, error = %primary_error, "Primary model failed");

        if selected == self.fallback_model {
            return Err(CompletionError::ModelFailed {
                model: selected.to_string(),
                source: primary_error,
            });
        }

        info!(model = %self.fallback_model, "Attempting fallback model");
        match self.attempt(make_request(&self.fallback_model)).await {
            Ok(response) => Ok(response),
            Err(fallback_error) => {
                error!(
                    model = %self.fallback_model,
                    error = %fallback_error,
                    "Fallback model also failed"
                );
                Err(CompletionError::AllModelsFailed {
                    primary: selected.to_string(),
                    fallback: self.fallback_model.clone(),
                    primary_error,
                    fallback_error,
                })
            }
        }
    }

    /// One bounded call. A timeout is an ordinary failure.
    async fn attempt(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        match tokio::time::timeout(self.timeout, self.provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(format!(
                "Model '{}' timed out after {}s",
                model,
                self.timeout.as_secs()
            ))),
        }
    }
}
