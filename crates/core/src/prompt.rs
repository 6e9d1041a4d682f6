//! Prompt assembly: system prompt construction from template files.
//!
//! Two files live in the prompts directory:
//!
//! 1. **`system_prompt.md`** (required): the tutor persona, with a
//!    `{context}` placeholder where the selected lessons go
//! 2. **`boundaries.md`** (optional): knowledge boundaries, substituted at a
//!    `{boundaries}` placeholder or appended as a trailing section
//!
//! File contents are cached after the first read. [`PromptAssembler::clear_cache`]
//! forces the next call to re-read from disk.

use crate::error::PromptError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, error, info, warn};

pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.md";
pub const BOUNDARIES_FILE: &str = "boundaries.md";

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const BOUNDARIES_PLACEHOLDER: &str = "{boundaries}";

/// Loads prompt templates from a directory and assembles the system prompt.
#[derive(Debug)]
pub struct PromptAssembler {
    dir: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl PromptAssembler {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        info!(dir = %dir.display(), "Prompt assembler initialized");
        Self {
            dir,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build the complete system prompt for `context`.
    ///
    /// Placeholders are substituted in a single pass over the template, so
    /// lesson text that happens to contain `{boundaries}` is left alone.
    pub fn build_full_prompt(&self, context: &str) -> Result<String, PromptError> {
        let template = self.load(SYSTEM_PROMPT_FILE)?;
        let boundaries = self.load_boundaries();

        let mut prompt = substitute(&template, context, boundaries.as_deref().unwrap_or(""));

        if let Some(boundaries) = boundaries
            && !template.contains(BOUNDARIES_PLACEHOLDER)
        {
            prompt.push_str("\n\n---\n## Knowledge Boundaries\n\n");
            prompt.push_str(&boundaries);
        }

        debug!(chars = prompt.len(), "Built full prompt");
        Ok(prompt)
    }

    /// Check that the required template is readable.
    pub fn check(&self) -> Result<(), PromptError> {
        self.load(SYSTEM_PROMPT_FILE).map(|_| ())
    }

    /// Drop cached file contents so the next build re-reads from disk.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
        info!("Prompt cache cleared");
    }

    /// Boundaries are optional: a missing or unreadable file is logged and
    /// treated as absent. An empty file counts as absent too.
    fn load_boundaries(&self) -> Option<String> {
        match self.load(BOUNDARIES_FILE) {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(PromptError::TemplateMissing { .. }) => {
                warn!("{BOUNDARIES_FILE} not found; proceeding without boundaries section");
                None
            }
            Err(e) => {
                error!(error = %e, "Error loading {BOUNDARIES_FILE}");
                None
            }
        }
    }

    fn load(&self, file: &str) -> Result<String, PromptError> {
        if let Ok(cache) = self.cache.read()
            && let Some(content) = cache.get(file)
        {
            debug!(file, "Loading prompt from cache");
            return Ok(content.clone());
        }

        let path = self.dir.join(file);
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PromptError::TemplateMissing {
                    file: file.to_string(),
                    dir: self.dir.display().to_string(),
                }
            } else {
                PromptError::Io {
                    file: file.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        info!(file, chars = content.len(), "Loaded prompt");
        // Redundant inserts under a race store identical content.
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(file.to_string(), content.clone());
        }
        Ok(content)
    }
}

fn substitute(template: &str, context: &str, boundaries: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + boundaries.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix(BOUNDARIES_PLACEHOLDER) {
            out.push_str(boundaries);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}
