//! Artifact header encoding.
//!
//! Current files use TOML front matter:
//!
//! ```text
//! +++
//! schema_version = 1
//! id = "20250101120000-a1b2c3"
//! title = "CSS cheat sheet"
//! type = "markdown"
//! source = "lesson 3"
//! tags = ["css", "a, b", "---"]
//! created_at = "2025-01-01T12:00:00Z"
//! updated_at = "2025-01-01T12:00:00Z"
//! +++
//!
//! body...
//! ```
//!
//! Older files use a `---` block of `key: value` lines with list values
//! written as `[a, b]`. Those are still read, never written.

use lectern_core::error::ArtifactError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const SCHEMA_VERSION: u32 = 1;

const TOML_DELIMITER: &str = "+++";
const LEGACY_DELIMITER: &str = "---";

/// The on-disk TOML header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub schema_version: u32,
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Structured config, serialized as compact JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_json: Option<String>,
}

/// Header fields as read back from either format. Every field is optional
/// because legacy headers may carry any subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub id: Option<String>,
    pub title: Option<String>,
    pub kind: Option<String>,
    pub source: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub config: Option<serde_json::Value>,
    /// Unrecognized legacy `key: value` pairs (e.g. `componentId`)
    pub extra: BTreeMap<String, String>,
}

/// A parsed artifact file.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// `None` when the file has no parsable header
    pub header: Option<Header>,
    pub body: String,
}

/// Render a header and body into file contents.
pub fn render(front: &FrontMatter, body: &str) -> Result<String, ArtifactError> {
    let toml = toml::to_string(front).map_err(|e| ArtifactError::Encoding(e.to_string()))?;
    Ok(format!("{TOML_DELIMITER}\n{toml}{TOML_DELIMITER}\n\n{body}"))
}

/// Parse file contents. Never fails: an unparsable header leaves the whole
/// text as the body.
pub fn parse(text: &str) -> Document {
    if let Some(doc) = parse_toml(text) {
        return doc;
    }
    if let Some(doc) = parse_legacy(text) {
        return doc;
    }
    Document {
        header: None,
        body: text.to_string(),
    }
}

fn parse_toml(text: &str) -> Option<Document> {
    let rest = strip_delimiter_line(text, TOML_DELIMITER)?;

    let mut offset = 0;
    let mut close = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == TOML_DELIMITER {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (start, end) = close?;

    let front: FrontMatter = match toml::from_str(&rest[..start]) {
        Ok(front) => front,
        Err(e) => {
            warn!(error = %e, "Unparsable artifact front matter");
            return None;
        }
    };

    let config = front.config_json.as_deref().and_then(|json| {
        serde_json::from_str(json)
            .map_err(|e| warn!(error = %e, "Ignoring invalid artifact config_json"))
            .ok()
    });

    let header = Header {
        id: Some(front.id),
        title: Some(front.title),
        kind: Some(front.kind),
        source: Some(front.source).filter(|s| !s.is_empty()),
        tags: Some(front.tags),
        created_at: Some(front.created_at),
        updated_at: Some(front.updated_at),
        config,
        extra: BTreeMap::new(),
    };

    Some(Document {
        header: Some(header),
        body: strip_blank_line(&rest[end..]).to_string(),
    })
}

fn strip_delimiter_line<'a>(text: &'a str, delimiter: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(delimiter)?;
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

/// Drop the single blank line written between header and body.
fn strip_blank_line(s: &str) -> &str {
    s.strip_prefix("\r\n")
        .or_else(|| s.strip_prefix('\n'))
        .unwrap_or(s)
}

enum LegacyValue {
    Text(String),
    List(Vec<String>),
}

/// `---` / `key: value` / `---`. The block ends at the next `---`
/// anywhere in the text.
fn parse_legacy(text: &str) -> Option<Document> {
    if !text.starts_with(LEGACY_DELIMITER) {
        return None;
    }
    let mut parts = text.splitn(3, LEGACY_DELIMITER);
    let _ = parts.next()?;
    let meta = parts.next()?;
    let body = parts.next()?;

    let mut values: BTreeMap<String, LegacyValue> = BTreeMap::new();
    for raw in meta.trim().lines() {
        let Some((key, value)) = raw.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let parsed = match value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            Some(inner) => LegacyValue::List(
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            None => LegacyValue::Text(value.to_string()),
        };
        values.insert(key.trim().to_string(), parsed);
    }

    if values.is_empty() {
        return None;
    }

    let mut header = Header::default();
    for (key, value) in values {
        match (key.as_str(), value) {
            ("tags", LegacyValue::List(items)) => header.tags = Some(items),
            ("id", LegacyValue::Text(v)) => header.id = Some(v),
            ("title", LegacyValue::Text(v)) => header.title = Some(v),
            ("type", LegacyValue::Text(v)) => header.kind = Some(v),
            ("source", LegacyValue::Text(v)) => header.source = Some(v),
            ("created_at", LegacyValue::Text(v)) => header.created_at = Some(v),
            ("updated_at", LegacyValue::Text(v)) => header.updated_at = Some(v),
            (_, LegacyValue::Text(v)) => {
                header.extra.insert(key, v);
            }
            (_, LegacyValue::List(_)) => {}
        }
    }

    Some(Document {
        header: Some(header),
        body: body.trim_start_matches('\n').to_string(),
    })
}
