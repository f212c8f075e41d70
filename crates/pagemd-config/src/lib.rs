//! Configuration management for pagemd.
//!
//! Parses `pagemd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `store.path` supports a leading `~` and environment variable references:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Relative store paths are resolved against the config file's directory.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override database path.
    pub db_path: Option<PathBuf>,
    /// Override diagnostics flag.
    pub diagnostics: Option<bool>,
    /// Override live-only filtering.
    pub live_only: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "pagemd.toml";

/// Where the desktop client keeps its cache database.
const DEFAULT_STORE_PATH: &str = "~/Library/Application Support/Notion/notion.db";

/// Default number of entries listed by `pagemd recent`.
const DEFAULT_RECENT_LIMIT: u32 = 20;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store configuration (path is a raw string from TOML).
    store: StoreConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,
    /// Recent entries listing configuration.
    pub recent: RecentConfig,

    /// Resolved store configuration (set after loading).
    #[serde(skip)]
    pub store_resolved: StoreConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw store configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StoreConfigRaw {
    path: Option<String>,
}

/// Resolved store configuration.
#[derive(Debug)]
pub struct StoreConfig {
    /// Absolute path of the SQLite database.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(shellexpand::tilde(DEFAULT_STORE_PATH).into_owned()),
        }
    }
}

/// When table blocks list their row ids.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableListing {
    /// Always list row ids.
    #[default]
    Always,
    /// Only list row ids in diagnostics mode.
    DiagnosticsOnly,
}

/// Rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Append raw metadata after each rendered block.
    pub diagnostics: bool,
    /// When table blocks list their row ids.
    pub table_listing: TableListing,
    /// Skip blocks whose `alive` flag is false.
    pub live_only: bool,
}

/// Recent entries listing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecentConfig {
    /// Maximum number of entries listed.
    pub limit: u32,
}

impl Default for RecentConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RECENT_LIMIT,
        }
    }
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
    EnvVar {
        /// Config field path (e.g., "`store.path`").
        field: String,
        /// Error message (e.g., "${`NOTION_DB`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `pagemd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
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
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(db_path) = &settings.db_path {
            self.store_resolved.path.clone_from(db_path);
        }
        if let Some(diagnostics) = settings.diagnostics {
            self.render.diagnostics = diagnostics;
        }
        if let Some(live_only) = settings.live_only {
            self.render.live_only = live_only;
        }
    }

    /// Search for config file in current directory and parents.
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

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const MAX_RECENT_LIMIT: u32 = 1000;

        if self.store_resolved.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "store.path cannot be empty".to_owned(),
            ));
        }

        if self.recent.limit == 0 {
            return Err(ConfigError::Validation(
                "recent.limit must be greater than 0".to_owned(),
            ));
        }
        if self.recent.limit > MAX_RECENT_LIMIT {
            return Err(ConfigError::Validation(format!(
                "recent.limit cannot exceed {MAX_RECENT_LIMIT}"
            )));
        }

        Ok(())
    }

    /// Expand and resolve the store path against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        self.store_resolved = match self.store.path.as_deref() {
            Some(raw) => {
                let expanded = expand::expand_path(raw, "store.path")?;
                StoreConfig {
                    path: config_dir.join(expanded),
                }
            }
            None => StoreConfig::default(),
        };
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

        assert!(config.store_resolved.path.ends_with("Notion/notion.db"));
        assert!(!config.render.diagnostics);
        assert!(!config.render.live_only);
        assert_eq!(config.render.table_listing, TableListing::Always);
        assert_eq!(config.recent.limit, 20);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_render_config() {
        let toml = r#"
[render]
diagnostics = true
table_listing = "diagnostics_only"
live_only = true
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.render.diagnostics);
        assert!(config.render.live_only);
        assert_eq!(config.render.table_listing, TableListing::DiagnosticsOnly);
    }

    #[test]
    fn test_parse_unknown_table_listing_fails() {
        let toml = r#"
[render]
table_listing = "never"
"#;
        let result: Result<Config, _> = toml::from_str(toml);

        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_store_path() {
        let toml = r#"
[store]
path = "data/notion.db"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/project/data/notion.db")
        );
    }

    #[test]
    fn test_resolve_absolute_store_path() {
        let toml = r#"
[store]
path = "/var/cache/notion.db"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/var/cache/notion.db")
        );
    }

    #[test]
    fn test_resolve_store_path_env_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PAGEMD_TEST_DB_DIR", "/srv/notion");
        }

        let toml = r#"
[store]
path = "${PAGEMD_TEST_DB_DIR}/notion.db"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project")).unwrap();

        assert_eq!(
            config.store_resolved.path,
            PathBuf::from("/srv/notion/notion.db")
        );

        unsafe {
            std::env::remove_var("PAGEMD_TEST_DB_DIR");
        }
    }

    #[test]
    fn test_resolve_store_path_missing_var() {
        let toml = r#"
[store]
path = "${PAGEMD_TEST_MISSING_DB}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.resolve_paths(Path::new("/project")).unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PAGEMD_TEST_MISSING_DB"));
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[store]\npath = \"notion.db\"\n\n[recent]\nlimit = 5\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.store_resolved.path, dir.path().join("notion.db"));
        assert_eq!(config.recent.limit, 5);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/pagemd.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[store\npath = 1").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[recent]\nlimit = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(err.to_string().contains("recent.limit"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let settings = CliSettings {
            db_path: Some(PathBuf::from("/tmp/other.db")),
            diagnostics: Some(true),
            live_only: None,
        };

        config.apply_cli_settings(&settings);

        assert_eq!(config.store_resolved.path, PathBuf::from("/tmp/other.db"));
        assert!(config.render.diagnostics);
        assert!(!config.render.live_only);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        let before = config.store_resolved.path.clone();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.store_resolved.path, before);
        assert!(!config.render.diagnostics);
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_store_path() {
        let mut config = Config::default();
        config.store_resolved.path = PathBuf::new();

        let err = config.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn test_validate_recent_limit_too_high() {
        let mut config = Config::default();
        config.recent.limit = 5000;

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("cannot exceed 1000"));
    }
}
