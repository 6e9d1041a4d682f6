//! # Lectern Core
//!
//! Domain types, traits, and error definitions for the lectern lesson
//! assistant. This crate has **no framework dependencies**: it defines the
//! model that the store, provider and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`lesson`]: immutable lesson records and their summaries
//! - [`message`]: conversation turns and provider-facing chat messages
//! - [`model`]: static per-model sampling and pricing profiles
//! - [`artifact`]: user-authored artifacts persisted by the artifact store
//! - [`provider`]: the `Provider` trait over chat-completion backends
//! - [`prompt`]: system prompt assembly from template files

pub mod artifact;
pub mod error;
pub mod lesson;
pub mod message;
pub mod model;
pub mod prompt;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use artifact::{Artifact, ArtifactKind, ArtifactMeta, NewArtifact};
pub use error::{Error, Result};
pub use lesson::{Lesson, LessonCategory, LessonId, LessonSummary};
pub use message::{ChatMessage, ChatTurn, ContentPart, MessageContent, Role, TurnRole};
pub use model::ModelProfile;
pub use prompt::PromptAssembler;
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
