//! The artifact store: create, list and read artifacts under one directory.

use crate::header::{self, FrontMatter, Header, SCHEMA_VERSION};
use crate::images::decode_data_url;
use chrono::{DateTime, Utc};
use lectern_core::error::ArtifactError;
use lectern_core::{Artifact, ArtifactKind, ArtifactMeta, NewArtifact};
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Documentation files that live next to artifacts but are not artifacts.
pub const RESERVED_FILES: [&str; 2] = ["ARTIFACTS_SPEC.md", "artifacts.md"];

const ASSETS_DIR: &str = "assets";

/// File-backed artifact storage. Artifacts are written once and never
/// updated or deleted.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    assets_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let assets_dir = dir.join(ASSETS_DIR);
        Self { dir, assets_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Create the storage directory if needed.
    pub fn ensure_dirs(&self) -> Result<(), ArtifactError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Persist a new artifact and return the stored record.
    ///
    /// Image payloads that fail to decode or write are logged and skipped;
    /// the artifact is still created with the images that succeeded.
    pub fn create(&self, request: NewArtifact) -> Result<Artifact, ArtifactError> {
        self.ensure_dirs()?;

        let now = Utc::now();
        let id = generate_id(now);
        let timestamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let kind = request.kind;

        let title = single_line(&request.title);
        let source = request
            .source
            .as_deref()
            .map(single_line)
            .filter(|s| !s.is_empty());
        let tags: Vec<String> = request
            .tags
            .unwrap_or_default()
            .iter()
            .map(|t| single_line(t))
            .collect();

        let saved_images = match (kind, request.images.as_deref()) {
            (ArtifactKind::Images, Some(images)) => self.save_images(&id, images),
            _ => Vec::new(),
        };

        let body = match kind {
            ArtifactKind::Code => request
                .content_markdown
                .clone()
                .unwrap_or_else(|| "Code artifact".to_string()),
            ArtifactKind::Images if !saved_images.is_empty() => {
                let mut lines = vec!["# Images".to_string(), String::new()];
                lines.extend(saved_images.iter().map(|rel| format!("![image]({rel})")));
                lines.join("\n")
            }
            ArtifactKind::Images => request
                .content_markdown
                .clone()
                .unwrap_or_else(|| "Images artifact".to_string()),
            _ => request.content_markdown.clone().unwrap_or_default(),
        };

        let html = match kind {
            ArtifactKind::Code => request.html.clone(),
            _ => None,
        };
        if let Some(html) = html.as_deref()
            && !html.is_empty()
        {
            fs::write(self.html_path(&id), html)?;
        }

        let config = request.config.filter(|_| kind.carries_config());
        let config_json = config
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ArtifactError::Encoding(e.to_string()))?;

        let front = FrontMatter {
            schema_version: SCHEMA_VERSION,
            id: id.clone(),
            title: title.clone(),
            kind: kind.as_str().to_string(),
            source: source.clone().unwrap_or_default(),
            tags: tags.clone(),
            created_at: timestamp.clone(),
            updated_at: timestamp.clone(),
            config_json,
        };
        fs::write(self.markdown_path(&id), header::render(&front, &body)?)?;

        info!(id = %id, kind = %kind, images = saved_images.len(), "Created artifact");

        Ok(Artifact {
            id,
            title,
            kind,
            content_markdown: (kind != ArtifactKind::Images).then_some(body),
            html,
            images: (kind == ArtifactKind::Images).then_some(saved_images),
            config,
            source,
            tags: Some(tags),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        })
    }

    /// Metadata for every artifact file, ordered by file name. Files that
    /// cannot be read are logged and left out.
    pub fn list(&self) -> Result<Vec<ArtifactMeta>, ArtifactError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable artifact directory entry");
                    None
                }
            })
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".md") && !RESERVED_FILES.contains(&name.as_str()))
            .collect();
        names.sort();

        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let stem = name.trim_end_matches(".md");
            let text = match fs::read_to_string(self.dir.join(&name)) {
                Ok(text) => text,
                Err(e) => {
                    error!(file = %name, error = %e, "Failed to read artifact");
                    continue;
                }
            };

            let meta = match header::parse(&text).header {
                Some(header) => ArtifactMeta {
                    id: header.id.clone().unwrap_or_else(|| stem.to_string()),
                    title: header.title.clone().unwrap_or_else(|| stem.to_string()),
                    kind: resolve_kind(&header, stem),
                    created_at: header.created_at.unwrap_or_default(),
                    updated_at: header.updated_at.unwrap_or_default(),
                    tags: header.tags,
                },
                None => ArtifactMeta {
                    id: stem.to_string(),
                    title: stem.to_string(),
                    kind: ArtifactKind::Markdown,
                    created_at: String::new(),
                    updated_at: String::new(),
                    tags: None,
                },
            };
            items.push(meta);
        }

        debug!(count = items.len(), "Listed artifacts");
        Ok(items)
    }

    /// Read one artifact, reattaching its HTML or image siblings.
    pub fn get(&self, id: &str) -> Result<Artifact, ArtifactError> {
        validate_id(id)?;

        let text = match fs::read_to_string(self.markdown_path(id)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArtifactError::NotFound(id.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let doc = header::parse(&text);
        let header = doc.header.unwrap_or_default();
        let kind = resolve_kind(&header, id);

        let html = match kind {
            ArtifactKind::Code => self.read_html(id)?,
            _ => None,
        };
        let images = match kind {
            ArtifactKind::Images => Some(self.image_paths(id)?),
            _ => None,
        };
        let config = match kind {
            ArtifactKind::ReactComponent if header.config.is_none() => {
                Some(legacy_component_config(&header, id))
            }
            k if k.carries_config() => header.config.clone(),
            _ => None,
        };

        Ok(Artifact {
            id: header.id.unwrap_or_else(|| id.to_string()),
            title: header.title.unwrap_or_else(|| id.to_string()),
            kind,
            content_markdown: (kind != ArtifactKind::Images).then_some(doc.body),
            html,
            images,
            config,
            source: header.source.filter(|s| !s.is_empty()),
            tags: header.tags,
            created_at: header.created_at.unwrap_or_default(),
            updated_at: header.updated_at.unwrap_or_default(),
        })
    }

    fn markdown_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.md"))
    }

    fn html_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.html"))
    }

    fn read_html(&self, id: &str) -> Result<Option<String>, ArtifactError> {
        match fs::read_to_string(self.html_path(id)) {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// `assets/{id}-*` files, sorted by name.
    fn image_paths(&self, id: &str) -> Result<Vec<String>, ArtifactError> {
        let entries = match fs::read_dir(&self.assets_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let prefix = format!("{id}-");
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with(&prefix))
            .collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| format!("{ASSETS_DIR}/{name}"))
            .collect())
    }

    /// Decode and write each data URL as `assets/{id}-{n}.{ext}`, numbering
    /// from 1. A failed image keeps its number.
    fn save_images(&self, id: &str, images: &[String]) -> Vec<String> {
        let mut saved = Vec::new();
        for (idx, url) in images.iter().enumerate() {
            let idx = idx + 1;
            let image = match decode_data_url(url) {
                Ok(Some(image)) => image,
                Ok(None) => {
                    debug!(artifact = %id, index = idx, "Skipping non-data image URL");
                    continue;
                }
                Err(e) => {
                    error!(artifact = %id, index = idx, error = %e, "Failed to decode image");
                    continue;
                }
            };

            let filename = format!("{id}-{idx}.{}", image.ext);
            let written = fs::create_dir_all(&self.assets_dir)
                .and_then(|_| fs::write(self.assets_dir.join(&filename), &image.bytes));
            match written {
                Ok(()) => saved.push(format!("{ASSETS_DIR}/{filename}")),
                Err(e) => {
                    error!(artifact = %id, index = idx, error = %e, "Failed to save image");
                }
            }
        }
        saved
    }
}

/// `YYYYMMDDHHMMSS-` plus six hex characters.
fn generate_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), &suffix[..6])
}

fn validate_id(id: &str) -> Result<(), ArtifactError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ArtifactError::InvalidId(id.to_string()))
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

fn resolve_kind(header: &Header, id: &str) -> ArtifactKind {
    match header.kind.as_deref() {
        None => ArtifactKind::Markdown,
        Some(name) => ArtifactKind::parse(name).unwrap_or_else(|| {
            warn!(artifact = %id, kind = %name, "Unknown artifact type, reading as markdown");
            ArtifactKind::Markdown
        }),
    }
}

/// Component config carried as flat `componentId` / `props*` header keys.
fn legacy_component_config(header: &Header, id: &str) -> serde_json::Value {
    let extra = &header.extra;
    let timestamp = extra
        .get("propsTimestamp")
        .and_then(|v| v.trim().parse::<i64>().ok());
    json!({
        "type": ArtifactKind::ReactComponent.as_str(),
        "id": extra.get("componentId").map(String::as_str).unwrap_or(id),
        "props": {
            "title": extra.get("propsTitle"),
            "message": extra.get("propsMessage"),
            "timestamp": timestamp,
        }
    })
}
