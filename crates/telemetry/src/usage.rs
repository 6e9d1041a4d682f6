//! Token counts and monetary cost of one completion.

use crate::pricing::ModelPricing;
use lectern_core::Usage;
use serde::{Deserialize, Serialize};

/// Static conversion rate used for the RUB figure. Not a live exchange rate.
pub const USD_TO_RUB: f64 = 90.0;

/// Token breakdown for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u32,
    pub output: u32,
    pub total: u32,
}

impl TokenUsage {
    /// Build from provider counters; a missing total becomes `input + output`.
    pub fn new(input: u32, output: u32, total: Option<u32>) -> Self {
        Self {
            input,
            output,
            total: total.unwrap_or_else(|| input.saturating_add(output)),
        }
    }
}

impl From<Usage> for TokenUsage {
    fn from(u: Usage) -> Self {
        Self {
            input: u.prompt_tokens,
            output: u.completion_tokens,
            total: u.total_tokens,
        }
    }
}

/// Cost of one completion in USD and RUB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub usd: f64,
    pub rub: f64,
}

impl Cost {
    pub fn from_usd(usd: f64) -> Self {
        Self {
            usd,
            rub: usd * USD_TO_RUB,
        }
    }

    /// Cost of `tokens` at `pricing`, the actually-used model's row.
    pub fn compute(tokens: &TokenUsage, pricing: &ModelPricing) -> Self {
        Self::from_usd(pricing.cost(tokens.input, tokens.output))
    }
}

/// Pre-flight estimate for a lesson selection: the context's token count
/// priced once as input and once as output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextEstimate {
    pub estimated_tokens: usize,
    pub estimated_cost_input: f64,
    pub estimated_cost_output: f64,
}

impl ContextEstimate {
    pub fn new(estimated_tokens: usize, pricing: &ModelPricing) -> Self {
        let millions = estimated_tokens as f64 / 1_000_000.0;
        Self {
            estimated_tokens,
            estimated_cost_input: millions * pricing.input_per_m,
            estimated_cost_output: millions * pricing.output_per_m,
        }
    }
}
