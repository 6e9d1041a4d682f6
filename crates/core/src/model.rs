//! Static per-model sampling and pricing profiles.

use serde::{Deserialize, Serialize};

/// One row of the model catalog. Read-only for the process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    /// Provider model id, e.g. "x-ai/grok-4-fast"
    pub id: String,

    /// Display name
    #[serde(alias = "display_name")]
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Maximum context window in tokens
    pub context_length: u64,

    /// Human-readable context size ("1M", "200K")
    #[serde(default)]
    pub context_display: String,

    /// USD per million input tokens
    pub input_cost_per_1m: f64,

    /// USD per million output tokens
    pub output_cost_per_1m: f64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_top_p() -> f32 {
    1.0
}

impl ModelProfile {
    /// The permissive profile used for a model id that is not in the
    /// catalog: default sampling, zero prices.
    pub fn fallback_for(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            context_length: 0,
            context_display: String::new(),
            input_cost_per_1m: 0.0,
            output_cost_per_1m: 0.0,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }

    /// Find `id` in `catalog`, falling back to [`ModelProfile::fallback_for`].
    pub fn lookup(catalog: &[ModelProfile], id: &str) -> Self {
        catalog
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .unwrap_or_else(|| Self::fallback_for(id))
    }
}
