//! Completion gateway: the chat call behind `/chat`.
//!
//! Builds the message sequence (assembled system prompt, history, current
//! message), resolves per-model sampling parameters, runs the request
//! through [`ModelFallback`], and prices the result with the actually-used
//! model's row. Stateless per call apart from the prompt cache.

use crate::error::CompletionError;
use crate::fallback::ModelFallback;
use lectern_config::AppConfig;
use lectern_core::message::{ChatMessage, ChatTurn, Role};
use lectern_core::{ModelProfile, PromptAssembler, Provider, ProviderRequest};
use lectern_telemetry::{Cost, PricingTable, TokenUsage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One chat call.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: String,
    /// Output of the context builder
    pub context: String,
    pub history: Vec<ChatTurn>,
    /// `None` selects the default model
    pub model: Option<String>,
    /// Data URLs attached to the current message
    pub images: Vec<String>,
}

impl ChatInput {
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
            ..Default::default()
        }
    }
}

/// Outcome of a successful chat call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    pub response: String,
    pub model_used: String,
    pub tokens: TokenUsage,
    pub cost: Cost,
    /// Characters in the context string
    pub context_length: usize,
}

pub struct CompletionGateway {
    fallback: ModelFallback,
    prompts: Arc<PromptAssembler>,
    models: Vec<ModelProfile>,
    pricing: PricingTable,
    default_model: String,
}

impl CompletionGateway {
    pub fn new(
        provider: Arc<dyn Provider>,
        prompts: Arc<PromptAssembler>,
        default_model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        Self {
            fallback: ModelFallback::new(provider, fallback_model),
            prompts,
            models: Vec::new(),
            pricing: PricingTable::default(),
            default_model: default_model.into(),
        }
    }

    /// Gateway with the catalog, model ids and timeout from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        prompts: Arc<PromptAssembler>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            provider,
            prompts,
            &config.default_model,
            &config.fallback_model,
        )
        .with_models(config.models.clone())
        .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_models(mut self, models: Vec<ModelProfile>) -> Self {
        self.pricing = PricingTable::from_profiles(&models);
        self.models = models;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fallback = self.fallback.with_timeout(timeout);
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn fallback_model(&self) -> &str {
        self.fallback.fallback_model()
    }

    pub fn models(&self) -> &[ModelProfile] {
        &self.models
    }

    /// Send one chat turn, retrying once against the fallback model.
    pub async fn chat(&self, input: &ChatInput) -> Result<CompletionResult, CompletionError> {
        let selected = input
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.default_model);

        let system_prompt = self.prompts.build_full_prompt(&input.context)?;
        let messages = build_messages(&system_prompt, input);

        debug!(
            context_chars = input.context.chars().count(),
            messages = messages.len(),
            "Prepared chat messages"
        );

        let response = self
            .fallback
            .complete(selected, |model| {
                let profile = ModelProfile::lookup(&self.models, model);
                info!(model, provider = self.fallback.provider_name(), "Sending chat request");
                ProviderRequest {
                    model: model.to_string(),
                    messages: messages.clone(),
                    temperature: profile.temperature,
                    max_tokens: Some(profile.max_tokens),
                    top_p: Some(profile.top_p),
                }
            })
            .await?;

        let tokens = response
            .usage
            .map(TokenUsage::from)
            .unwrap_or_default();
        let cost = Cost::compute(&tokens, &self.pricing.pricing_for(&response.model));

        info!(
            model = %response.model,
            total = tokens.total,
            input = tokens.input,
            output = tokens.output,
            cost_usd = cost.usd,
            "Received response"
        );

        Ok(CompletionResult {
            response: response.content,
            model_used: response.model,
            tokens,
            cost,
            context_length: input.context.chars().count(),
        })
    }
}

/// System prompt, then each history turn, then the current message.
fn build_messages(system_prompt: &str, input: &ChatInput) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(input.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(input.history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::with_images(
        Role::User,
        &input.message,
        &input.images,
    ));
    messages
}
