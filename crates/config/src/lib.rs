//! Configuration loading, validation, and management for lectern.
//!
//! Loads configuration from `$LECTERN_CONFIG` or `./lectern.toml` with
//! environment variable overrides. Validates all settings at startup.

use lectern_core::ModelProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LECTERN_CONFIG";

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "lectern.toml";

/// The root configuration structure.
///
/// Maps directly to `lectern.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OpenRouter API key. Required before serving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model used when a request names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model retried once when the selected model fails
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,

    /// Timeout for one outbound completion call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sent as `HTTP-Referer` for OpenRouter attribution
    #[serde(default = "default_app_referer")]
    pub app_referer: String,

    /// Sent as `X-Title` for OpenRouter attribution
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Content and storage directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Model catalog
    #[serde(default = "default_models")]
    pub models: Vec<ModelProfile>,
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_model() -> String {
    "google/gemini-2.5-flash-preview-09-2025".into()
}
fn default_fallback_model() -> String {
    "x-ai/grok-4-fast".into()
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_app_referer() -> String {
    "https://github.com/ai-learning-agent".into()
}
fn default_app_title() -> String {
    "AI Learning Agent".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .field("default_model", &self.default_model)
            .field("fallback_model", &self.fallback_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("app_referer", &self.app_referer)
            .field("app_title", &self.app_title)
            .field("server", &self.server)
            .field("paths", &self.paths)
            .field("models", &self.models)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployed frontend origin, always allowed by CORS
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Additional CORS origins (local dev servers by default)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Maximum request body size; images arrive inline as data URLs
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8000
}
fn default_frontend_url() -> String {
    "http://localhost:5173".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".into(),
        "http://localhost:5174".into(),
        "http://localhost:3000".into(),
    ]
}
fn default_body_limit_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            allowed_origins: default_allowed_origins(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ServerConfig {
    /// Allowed origins plus the frontend URL, without duplicates.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = self.allowed_origins.clone();
        if !self.frontend_url.is_empty() && !origins.contains(&self.frontend_url) {
            origins.push(self.frontend_url.clone());
        }
        origins
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the course tree (`course/module/lesson.md`)
    #[serde(default = "default_lessons_dir")]
    pub lessons_dir: PathBuf,

    /// Holds `system_prompt.md` and optional `boundaries.md`
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,

    /// Artifact markdown files; images go to `assets/` beneath it
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

fn default_lessons_dir() -> PathBuf {
    PathBuf::from("data/lessons")
}
fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}
fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("docs/artifacts")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lessons_dir: default_lessons_dir(),
            prompts_dir: default_prompts_dir(),
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    id: &str,
    name: &str,
    description: &str,
    context_length: u64,
    context_display: &str,
    input_cost_per_1m: f64,
    output_cost_per_1m: f64,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
) -> ModelProfile {
    ModelProfile {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        context_length,
        context_display: context_display.into(),
        input_cost_per_1m,
        output_cost_per_1m,
        temperature,
        max_tokens,
        top_p,
    }
}

/// The built-in catalog.
pub fn default_models() -> Vec<ModelProfile> {
    vec![
        profile(
            "google/gemini-2.5-flash-preview-09-2025",
            "Gemini 2.5 Flash Preview",
            "Latest Gemini, fast & cost-effective (default)",
            1_000_000,
            "1M",
            0.075,
            0.30,
            0.7,
            4000,
            1.0,
        ),
        profile(
            "x-ai/grok-4-fast",
            "Grok 4 Fast",
            "2M context, auto-cache, affordable pricing",
            2_000_000,
            "2M",
            0.05,
            0.15,
            0.7,
            4000,
            1.0,
        ),
        profile(
            "openai/gpt-4.1-mini",
            "GPT-4.1 Mini",
            "Compact OpenAI model, balanced performance",
            1_000_000,
            "1M",
            0.15,
            0.60,
            0.6,
            3000,
            0.95,
        ),
        profile(
            "anthropic/claude-sonnet-4.5",
            "Claude Sonnet 4.5",
            "Best reasoning & code, premium quality",
            200_000,
            "200K",
            3.0,
            15.0,
            0.5,
            8000,
            0.95,
        ),
    ]
}

impl AppConfig {
    /// Load configuration from `$LECTERN_CONFIG`, else `./lectern.toml`.
    ///
    /// Environment variables override the file (highest priority):
    /// `OPENROUTER_API_KEY`, `OPENROUTER_API_BASE`, `DEFAULT_MODEL`,
    /// `FALLBACK_MODEL`, `HOST`, `PORT`, `FRONTEND_URL`, `LESSONS_DIR`,
    /// `PROMPTS_DIR`, `ARTIFACTS_DIR`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, usually the process environment.
    /// Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENROUTER_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(base) = get("OPENROUTER_API_BASE") {
            self.api_base = base;
        }
        if let Some(model) = get("DEFAULT_MODEL") {
            self.default_model = model;
        }
        if let Some(model) = get("FALLBACK_MODEL") {
            self.fallback_model = model;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{port}'"))
            })?;
        }
        if let Some(url) = get("FRONTEND_URL") {
            self.server.frontend_url = url;
        }
        if let Some(dir) = get("LESSONS_DIR") {
            self.paths.lessons_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("PROMPTS_DIR") {
            self.paths.prompts_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("ARTIFACTS_DIR") {
            self.paths.artifacts_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.default_model.trim().is_empty() || self.fallback_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model and fallback_model must not be empty".into(),
            ));
        }

        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate model id '{}'",
                    model.id
                )));
            }
            if !(0.0..=2.0).contains(&model.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': temperature must be between 0.0 and 2.0",
                    model.id
                )));
            }
            if !(model.top_p > 0.0 && model.top_p <= 1.0) {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': top_p must be in (0.0, 1.0]",
                    model.id
                )));
            }
            if model.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': max_tokens must be > 0",
                    model.id
                )));
            }
            let prices_ok = [model.input_cost_per_1m, model.output_cost_per_1m]
                .iter()
                .all(|p| p.is_finite() && *p >= 0.0);
            if !prices_ok {
                return Err(ConfigError::ValidationError(format!(
                    "model '{}': prices must be non-negative",
                    model.id
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The API key, or the startup error that prevents serving.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Catalog profile for `id`, or the permissive default profile.
    pub fn model(&self, id: &str) -> ModelProfile {
        ModelProfile::lookup(&self.models, id)
    }

    /// Catalog profile for `id`, only if it is in the catalog.
    pub fn known_model(&self, id: &str) -> Option<&ModelProfile> {
        self.models.iter().find(|m| m.id == id)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            default_model: default_model(),
            fallback_model: default_fallback_model(),
            request_timeout_secs: default_request_timeout_secs(),
            app_referer: default_app_referer(),
            app_title: default_app_title(),
            server: ServerConfig::default(),
            paths: PathsConfig::default(),
            models: default_models(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("OPENROUTER_API_KEY is required. Get your key at https://openrouter.ai")]
    MissingApiKey,
}

impl From<ConfigError> for lectern_core::Error {
    fn from(e: ConfigError) -> Self {
        lectern_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.request_timeout_secs, 60);
        assert_eq!(config.models.len(), 4);
        assert_eq!(config.default_model, "google/gemini-2.5-flash-preview-09-2025");
        assert_eq!(config.fallback_model, "x-ai/grok-4-fast");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.models, config.models);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/lectern.toml"));
        let config = result.unwrap();
        assert_eq!(config.api_base, "https://openrouter.ai/api/v1");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("lectern.toml");
        std::fs::write(
            &path,
            "default_model = \"openai/gpt-4.1-mini\"\n[server]\nport = 9000\n",
        )
        .unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "openai/gpt-4.1-mini");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.frontend_url, "http://localhost:5173");
        assert_eq!(config.models.len(), 4);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("lectern.toml");
        std::fs::write(&path, "server = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                ("OPENROUTER_API_KEY", "sk-or-test"),
                ("DEFAULT_MODEL", "anthropic/claude-sonnet-4.5"),
                ("PORT", "8080"),
                ("FRONTEND_URL", "https://learn.example.com"),
                ("LESSONS_DIR", "/srv/lessons"),
                ("FALLBACK_MODEL", ""),
            ]))
            .unwrap();
        assert_eq!(config.require_api_key().unwrap(), "sk-or-test");
        assert_eq!(config.default_model, "anthropic/claude-sonnet-4.5");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.paths.lessons_dir, PathBuf::from("/srv/lessons"));
        assert_eq!(config.fallback_model, "x-ai/grok-4-fast");
        assert!(
            config
                .server
                .cors_origins()
                .contains(&"https://learn.example.com".to_string())
        );
    }

    #[test]
    fn bad_port_override_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(env(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn missing_api_key_is_configuration_error() {
        let config = AppConfig::default();
        assert!(!config.has_api_key());
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY is required"));

        let blank = AppConfig {
            api_key: Some("  ".into()),
            ..AppConfig::default()
        };
        assert!(blank.require_api_key().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-or-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-or-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn cors_origins_do_not_duplicate_frontend() {
        let server = ServerConfig::default();
        let origins = server.cors_origins();
        assert_eq!(origins.len(), 3);
        assert_eq!(origins[0], "http://localhost:5173");
    }

    #[test]
    fn invalid_model_rows_rejected() {
        let mut config = AppConfig::default();
        config.models[0].temperature = 5.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.models[1].output_cost_per_1m = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        let dup = config.models[0].clone();
        config.models.push(dup);
        assert!(config.validate().is_err());

        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn model_lookup_falls_back_for_unknown_ids() {
        let config = AppConfig::default();
        let known = config.model("anthropic/claude-sonnet-4.5");
        assert_eq!(known.max_tokens, 8000);
        assert!(config.known_model("vendor/other").is_none());
        let unknown = config.model("vendor/other");
        assert_eq!(unknown.max_tokens, 4000);
    }
}
