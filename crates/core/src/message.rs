//! Conversation turns and chat messages.
//!
//! A [`ChatTurn`] is what the caller sends as history: plain text plus any
//! attached images as data URLs. A [`ChatMessage`] is what goes to the
//! provider, where a turn with images becomes multi-part content.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions (prompt template plus lesson context)
    System,
}

/// Who authored a caller-supplied turn. System turns are never accepted
/// from callers; the system message is always the assembled prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl From<TurnRole> for Role {
    fn from(role: TurnRole) -> Self {
        match role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        }
    }
}

/// One prior turn supplied by the caller. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
    /// Data URLs (`data:image/png;base64,...`), possibly empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<String>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            images: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            images: Vec::new(),
        }
    }

    /// Attach images to this turn.
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A message in the provider's chat-completion format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(content.into()),
        }
    }

    /// Render text plus images: plain content when there are no images,
    /// otherwise one text part followed by one image part per image.
    pub fn with_images(role: Role, text: &str, images: &[String]) -> Self {
        let content = if images.is_empty() {
            MessageContent::Text(text.to_string())
        } else {
            let mut parts = Vec::with_capacity(images.len() + 1);
            parts.push(ContentPart::Text {
                text: text.to_string(),
            });
            parts.extend(images.iter().map(|url| ContentPart::ImageUrl {
                image_url: ImageUrl { url: url.clone() },
            }));
            MessageContent::Parts(parts)
        };
        Self { role, content }
    }
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        Self::with_images(turn.role.into(), &turn.content, &turn.images)
    }
}

/// Plain string content or structured multi-part content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}
