//! Configuration management for mdview.
//!
//! Parses `mdview.toml` with serde and discovers it in the current directory
//! or any parent. CLI settings are applied on top via [`CliSettings`].
//!
//! ```toml
//! [diagrams]
//! kroki_url = "https://kroki.io"
//! timeout_secs = 30
//! scale = 2.0
//!
//! [images]
//! base_url = "https://example.com/docs"
//!
//! [render]
//! theme = "dark"
//! asset_dir = ".mdview/assets"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `diagrams.kroki_url`, `images.base_path`,
//! `images.base_url`, `render.asset_dir`.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdview.toml";

const DEFAULT_KROKI_URL: &str = "https://kroki.io";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCALE: f32 = 2.0;
const MAX_SCALE: f32 = 8.0;

/// CLI settings that override configuration file values.
///
/// Only `Some` values override. Setting one image base clears the other.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub kroki_url: Option<String>,
    pub diagrams_enabled: Option<bool>,
    pub theme: Option<ThemeName>,
    pub asset_dir: Option<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub base_url: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration.
    pub diagrams: DiagramsConfig,
    images: ImagesConfigRaw,
    render: RenderConfigRaw,

    /// Resolved image configuration (set after loading).
    #[serde(skip)]
    pub images_resolved: ImagesConfig,
    /// Resolved render configuration (set after loading).
    #[serde(skip)]
    pub render_resolved: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiagramsConfig {
    /// Whether mermaid blocks are rendered at all.
    pub enabled: bool,
    /// Kroki server URL.
    pub kroki_url: String,
    /// HTTP timeout for Kroki requests, in seconds.
    pub timeout_secs: u64,
    /// Deadline for rasterizing one diagram, in seconds.
    pub raster_timeout_secs: u64,
    /// Supersampling multiplier for rasterized images.
    pub scale: f32,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kroki_url: DEFAULT_KROKI_URL.to_owned(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            raster_timeout_secs: DEFAULT_TIMEOUT_SECS,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Raw image configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ImagesConfigRaw {
    base_path: Option<String>,
    base_url: Option<String>,
}

/// Resolved image base. At most one of the two is set.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImagesConfig {
    /// Directory relative image references resolve against.
    pub base_path: Option<PathBuf>,
    /// URL relative image references resolve against.
    pub base_url: Option<String>,
}

/// Display color scheme.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Light,
    Dark,
}

/// Raw render configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    theme: Option<ThemeName>,
    asset_dir: Option<String>,
}

/// Resolved render configuration with absolute paths.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderConfig {
    pub theme: ThemeName,
    /// Root for rasterized diagrams. `None` means a fresh temp directory.
    pub asset_dir: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar { field: String, message: String },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    let lower = url.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `mdview.toml` in the current directory and its parents, falling
    /// back to defaults when none exists. CLI settings are applied last and
    /// the result is validated again.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams.kroki_url.clone_from(kroki_url);
        }
        if let Some(enabled) = settings.diagrams_enabled {
            self.diagrams.enabled = enabled;
        }
        if let Some(theme) = settings.theme {
            self.render_resolved.theme = theme;
        }
        if let Some(asset_dir) = &settings.asset_dir {
            self.render_resolved.asset_dir = Some(asset_dir.clone());
        }
        if let Some(base_path) = &settings.base_path {
            self.images_resolved = ImagesConfig {
                base_path: Some(base_path.clone()),
                base_url: None,
            };
        }
        if let Some(base_url) = &settings.base_url {
            self.images_resolved = ImagesConfig {
                base_path: None,
                base_url: Some(base_url.clone()),
            };
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_diagrams()?;
        self.validate_images()?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams;
        if diagrams.enabled {
            require_non_empty(&diagrams.kroki_url, "diagrams.kroki_url")?;
            require_http_url(&diagrams.kroki_url, "diagrams.kroki_url")?;
        }
        if diagrams.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if diagrams.raster_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "diagrams.raster_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if !(diagrams.scale > 0.0 && diagrams.scale <= MAX_SCALE) {
            return Err(ConfigError::Validation(format!(
                "diagrams.scale must be in (0, {MAX_SCALE}]"
            )));
        }
        Ok(())
    }

    fn validate_images(&self) -> Result<(), ConfigError> {
        let images = &self.images_resolved;
        if images.base_path.is_some() && images.base_url.is_some() {
            return Err(ConfigError::Validation(
                "images.base_path and images.base_url are mutually exclusive".to_owned(),
            ));
        }
        if let Some(base_url) = &images.base_url {
            require_http_url(base_url, "images.base_url")?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.diagrams.kroki_url = expand::expand_env(&self.diagrams.kroki_url, "diagrams.kroki_url")?;

        if let Some(ref base_path) = self.images.base_path {
            self.images.base_path = Some(expand::expand_env(base_path, "images.base_path")?);
        }
        if let Some(ref base_url) = self.images.base_url {
            self.images.base_url = Some(expand::expand_env(base_url, "images.base_url")?);
        }
        if let Some(ref asset_dir) = self.render.asset_dir {
            self.render.asset_dir = Some(expand::expand_env(asset_dir, "render.asset_dir")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config file's directory.
    ///
    /// Empty strings count as unset.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

        self.images_resolved = ImagesConfig {
            base_path: non_empty(&self.images.base_path).map(|p| config_dir.join(p)),
            base_url: non_empty(&self.images.base_url),
        };
        self.render_resolved = RenderConfig {
            theme: self.render.theme.unwrap_or_default(),
            asset_dir: non_empty(&self.render.asset_dir).map(|p| config_dir.join(p)),
        };
    }
}
