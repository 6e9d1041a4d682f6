//! Token usage, per-model pricing, and cost accounting for lectern.
//!
//! Turns provider-reported usage counters into the `{input, output, total}`
//! token breakdown and the USD/RUB cost pair returned to callers, and
//! computes the rough size/cost estimate shown before a chat is sent.

pub mod pricing;
pub mod usage;

pub use pricing::{ModelPricing, PricingTable};
pub use usage::{ContextEstimate, Cost, TokenUsage, USD_TO_RUB};
