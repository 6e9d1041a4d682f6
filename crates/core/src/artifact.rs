//! Artifact records: user-authored snippets persisted by the artifact store.

use serde::{Deserialize, Serialize};

/// What an artifact holds. Determines which sibling files exist on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    #[default]
    Markdown,
    Code,
    Images,
    Plot,
    Calculator,
    ReactComponent,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Code => "code",
            Self::Images => "images",
            Self::Plot => "plot",
            Self::Calculator => "calculator",
            Self::ReactComponent => "react-component",
        }
    }

    /// Parse a stored type name. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "markdown" => Some(Self::Markdown),
            "code" => Some(Self::Code),
            "images" => Some(Self::Images),
            "plot" => Some(Self::Plot),
            "calculator" => Some(Self::Calculator),
            "react-component" => Some(Self::ReactComponent),
            _ => None,
        }
    }

    /// Kinds whose structured `config` is persisted and returned.
    pub fn carries_config(&self) -> bool {
        matches!(self, Self::Plot | Self::Calculator | Self::ReactComponent)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A full artifact as returned by create and read-by-id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Markdown body; absent for `images`, whose body is generated.
    pub content_markdown: Option<String>,
    /// Raw HTML payload (`code` only)
    pub html: Option<String>,
    /// Relative asset paths, `assets/{id}-{n}.{ext}` (`images` only)
    pub images: Option<Vec<String>>,
    pub config: Option<serde_json::Value>,
    pub source: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// The listing view of an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Option<Vec<String>>,
}

/// A create request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewArtifact {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    #[serde(default, alias = "contentMarkdown")]
    pub content_markdown: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    /// Data URLs; only used for `images`
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl NewArtifact {
    pub fn new(kind: ArtifactKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.content_markdown = Some(markdown.into());
        self
    }
}
