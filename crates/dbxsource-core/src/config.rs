//! Configuration module for dbxsource.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `source.access_token`.
pub const ACCESS_TOKEN_ENV: &str = "DBXSOURCE_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for dbxsource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// What to synchronize from Dropbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Remote folder to sync; empty means the account root.
    pub path: String,
    /// Descend into subfolders.
    pub recursive: bool,
    /// Emit folder nodes, the root node, and typed file kinds.
    pub create_folder_nodes: bool,
    /// Allowed file extensions, including the leading dot (case-sensitive).
    pub extensions: Vec<String>,
    /// Dropbox API access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Where local state lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database holding the cache and the published graph.
    pub database: PathBuf,
    /// Directory materialized blobs are written under.
    pub content_dir: PathBuf,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/dbxsource/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("dbxsource")
            .join("config.yaml")
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.source.access_token = Some(token);
        }
        self
    }
}

impl SourceConfig {
    /// The extension allow-list as a set.
    pub fn allowed_extensions(&self) -> BTreeSet<String> {
        self.extensions.iter().cloned().collect()
    }

    /// Access token if present and non-blank.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            recursive: true,
            create_folder_nodes: false,
            extensions: vec![".jpg".to_string(), ".png".to_string(), ".md".to_string()],
            access_token: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("dbxsource");
        Self {
            database: data_dir.join("dbxsource.db"),
            content_dir: data_dir.join("content"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"source.extensions"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- source ---
        if self.source.access_token().is_none() {
            errors.push(ValidationError {
                field: "source.access_token".into(),
                message: format!("is required (or set {ACCESS_TOKEN_ENV})"),
            });
        }

        if !self.source.path.is_empty() && !self.source.path.starts_with('/') {
            errors.push(ValidationError {
                field: "source.path".into(),
                message: format!(
                    "must be empty or start with '/': {}",
                    self.source.path
                ),
            });
        }

        if self.source.extensions.is_empty() {
            errors.push(ValidationError {
                field: "source.extensions".into(),
                message: "must contain at least one extension".into(),
            });
        }
        for ext in &self.source.extensions {
            if !ext.starts_with('.') || ext.len() < 2 || ext[1..].contains(['.', '/']) {
                errors.push(ValidationError {
                    field: "source.extensions".into(),
                    message: format!("invalid extension '{ext}'; expected a form like '.md'"),
                });
            }
        }

        // --- storage ---
        if self.storage.database.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.database".into(),
                message: "must not be empty".into(),
            });
        }
        if self.storage.content_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.content_dir".into(),
                message: "must not be empty".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use dbxsource_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .source_path("/blog")
///     .source_create_folder_nodes(true)
///     .source_access_token("sl.token")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- source ---

    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        self.config.source.path = path.into();
        self
    }

    pub fn source_recursive(mut self, recursive: bool) -> Self {
        self.config.source.recursive = recursive;
        self
    }

    pub fn source_create_folder_nodes(mut self, enabled: bool) -> Self {
        self.config.source.create_folder_nodes = enabled;
        self
    }

    pub fn source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.source.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.source.access_token = Some(token.into());
        self
    }

    // --- storage ---

    pub fn storage_database(mut self, path: PathBuf) -> Self {
        self.config.storage.database = path;
        self
    }

    pub fn storage_content_dir(mut self, path: PathBuf) -> Self {
        self.config.storage.content_dir = path;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the [`Config`] without validation.
    pub fn build(self) -> Config {
        self.config
    }

    /// Consume the builder, validate, and return the [`Config`] or all errors.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let errors = self.config.validate();
        if errors.is_empty() {
            Ok(self.config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
