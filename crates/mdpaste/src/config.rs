//! Configuration management for mdpaste.
//!
//! Parses `mdpaste.toml` with serde and auto-discovers the file by walking
//! parent directories from the current directory. CLI flags are applied
//! after loading and take precedence over file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mdpaste_diagrams::{DEFAULT_IMAGE_TYPE, DEFAULT_MAX_URL_LEN, DEFAULT_SERVICE_URL};
use mdpaste_hosting::{DEFAULT_API_URL, DEFAULT_URL_PREFIX};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpaste.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub(crate) struct CliSettings {
    /// Override the per-upload deadline in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Override payload compression.
    pub compress: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    /// Render service configuration.
    pub render: RenderConfig,
    /// Image hosting configuration.
    pub hosting: HostingConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Render service configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct RenderConfig {
    /// Render service base URL.
    pub service_url: String,
    /// Image type requested from the render service.
    pub image_type: String,
    /// Per-upload deadline in milliseconds.
    pub timeout_ms: u64,
    /// Whether flowchart payloads are compressed.
    pub compress: bool,
    /// Render-URL length above which the hosting service fetches the image
    /// itself.
    pub max_url_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_owned(),
            image_type: DEFAULT_IMAGE_TYPE.to_owned(),
            timeout_ms: 15_000,
            compress: true,
            max_url_len: DEFAULT_MAX_URL_LEN,
        }
    }
}

/// Image hosting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct HostingConfig {
    /// Hosting API endpoint.
    pub api_url: String,
    /// Prefix every hosted URL must start with.
    pub url_prefix: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            url_prefix: DEFAULT_URL_PREFIX.to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
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
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `mdpaste.toml` in the current directory and parents,
    /// falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the resulting configuration is invalid.
    pub(crate) fn load(
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
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(timeout_ms) = settings.timeout_ms {
            self.render.timeout_ms = timeout_ms;
        }
        if let Some(compress) = settings.compress {
            self.render.compress = compress;
        }
    }

    /// Search for the config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty, malformed,
    /// or zero where a positive value is required.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.service_url, "render.service_url")?;
        require_http_url(&self.render.service_url, "render.service_url")?;
        require_non_empty(&self.render.image_type, "render.image_type")?;
        if self.render.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "render.timeout_ms must be greater than 0".to_owned(),
            ));
        }
        if self.render.max_url_len == 0 {
            return Err(ConfigError::Validation(
                "render.max_url_len must be greater than 0".to_owned(),
            ));
        }

        require_non_empty(&self.hosting.api_url, "hosting.api_url")?;
        require_http_url(&self.hosting.api_url, "hosting.api_url")?;
        require_non_empty(&self.hosting.url_prefix, "hosting.url_prefix")?;
        require_http_url(&self.hosting.url_prefix, "hosting.url_prefix")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.render.service_url, "https://mermaid.ink");
        assert_eq!(config.render.image_type, "png");
        assert_eq!(config.render.timeout_ms, 15_000);
        assert!(config.render.compress);
        assert_eq!(config.render.max_url_len, 2000);
        assert_eq!(config.hosting.api_url, "https://catbox.moe/user/api.php");
        assert_eq!(config.hosting.url_prefix, "https://files.catbox.moe/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.render.service_url, "https://mermaid.ink");
        assert!(config.render.compress);
    }

    #[test]
    fn test_parse_render_section() {
        let toml = r#"
[render]
service_url = "https://mermaid.internal"
image_type = "svg"
timeout_ms = 5000
compress = false
max_url_len = 900
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.render.service_url, "https://mermaid.internal");
        assert_eq!(config.render.image_type, "svg");
        assert_eq!(config.render.timeout_ms, 5000);
        assert!(!config.render.compress);
        assert_eq!(config.render.max_url_len, 900);
        // Untouched section keeps defaults.
        assert_eq!(config.hosting.api_url, "https://catbox.moe/user/api.php");
    }

    #[test]
    fn test_parse_hosting_section() {
        let toml = r#"
[hosting]
api_url = "https://host.internal/api"
url_prefix = "https://host.internal/files/"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hosting.api_url, "https://host.internal/api");
        assert_eq!(config.hosting.url_prefix, "https://host.internal/files/");
    }

    #[test]
    fn test_cli_settings_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdpaste.toml");
        std::fs::write(&path, "[render]\ntimeout_ms = 5000\ncompress = true\n").unwrap();

        let settings = CliSettings {
            timeout_ms: Some(250),
            compress: Some(false),
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.render.timeout_ms, 250);
        assert!(!config.render.compress);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let err = Config::load(Some(Path::new("/nonexistent/mdpaste.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config: Config = toml::from_str("[render]\ntimeout_ms = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.timeout_ms"));
    }

    #[test]
    fn test_rejects_non_http_service_url() {
        let config: Config = toml::from_str("[render]\nservice_url = \"ftp://x\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render.service_url"));
    }

    #[test]
    fn test_parse_error_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdpaste.toml");
        std::fs::write(&path, "[render\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
