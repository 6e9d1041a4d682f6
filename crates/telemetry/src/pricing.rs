//! Pricing table built from the model catalog.
//!
//! Prices are in USD per 1 million tokens. Each model has an input and
//! output price. A model that is not in the table costs nothing.

use lectern_core::ModelProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-million-token pricing for a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Price per 1M input tokens in USD.
    pub input_per_m: f64,
    /// Price per 1M output tokens in USD.
    pub output_per_m: f64,
}

impl ModelPricing {
    /// Create a new pricing entry.
    pub fn new(input_per_m: f64, output_per_m: f64) -> Self {
        Self {
            input_per_m,
            output_per_m,
        }
    }

    /// Pricing of a catalog row.
    pub fn of(profile: &ModelProfile) -> Self {
        Self::new(profile.input_cost_per_1m, profile.output_cost_per_1m)
    }

    /// USD cost for the given token counts.
    pub fn cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 * self.input_per_m + output_tokens as f64 * self.output_per_m)
            / 1_000_000.0
    }
}

/// Pricing table keyed by model id, built once from the catalog.
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    prices: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Build a table from catalog rows.
    pub fn from_profiles(profiles: &[ModelProfile]) -> Self {
        let prices = profiles
            .iter()
            .map(|p| (p.id.clone(), ModelPricing::of(p)))
            .collect();
        Self { prices }
    }

    /// Look up pricing for a model. Returns None if not found.
    pub fn get(&self, model: &str) -> Option<ModelPricing> {
        self.prices.get(model).copied()
    }

    /// Pricing for a model, free if it is not in the table. Matching is
    /// exact: OpenRouter ids are already canonical.
    pub fn pricing_for(&self, model: &str) -> ModelPricing {
        self.get(model).unwrap_or_else(|| {
            tracing::debug!(model, "No pricing for model, cost is zero");
            ModelPricing::new(0.0, 0.0)
        })
    }
}
