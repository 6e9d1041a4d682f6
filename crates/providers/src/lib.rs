//! Chat-completion providers for lectern.
//!
//! All providers implement the `lectern_core::Provider` trait. The
//! [`CompletionGateway`] drives one provider through the model fallback
//! policy and turns its usage counters into token and cost figures.

pub mod completion;
pub mod error;
pub mod fallback;
pub mod openai_compat;

pub use completion::{ChatInput, CompletionGateway, CompletionResult};
pub use error::CompletionError;
pub use fallback::ModelFallback;
pub use openai_compat::OpenAiCompatProvider;
