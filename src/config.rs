use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DATA_DIR_VAR: &str = "SINERGY_DATA_DIR";
const USER_VAR: &str = "SINERGY_USER";

/// Where a setting came from, as shown by `sinergy config show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
    #[serde(rename = "command line")]
    CommandLine,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "environment",
            ConfigSource::CommandLine => "command line",
        };
        f.write_str(label)
    }
}

/// A setting together with the layer that supplied it.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Replaces the value when a later layer supplies one.
    fn overlay(&mut self, value: Option<T>, source: ConfigSource) {
        if let Some(value) = value {
            *self = Self::new(value, source);
        }
    }
}

/// Resolved CLI settings. Each layer (defaults, `config.yaml`, `SINERGY_*`
/// variables, `--user`) overrides the one before it.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root of the store; documents live under `users/<uid>/`
    pub data_dir: ConfigValue<PathBuf>,
    /// User the CLI acts as; unset means signed out
    pub user: ConfigValue<Option<String>>,
    /// The `config.yaml` that was read, when one existed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// On-disk shape of `config.yaml`; every key is optional.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    user: Option<String>,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
        // A file holding only comments is an empty document
        serde_yaml::from_str::<Option<Self>>(&contents)
            .map(|file| Some(file.unwrap_or_default()))
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }
}

impl Config {
    fn defaults() -> Self {
        Self {
            data_dir: ConfigValue::new(Self::default_data_dir(), ConfigSource::Default),
            user: ConfigValue::new(None, ConfigSource::Default),
            config_file: None,
        }
    }

    /// Resolves settings from `config_path` (or the default location) and the
    /// `SINERGY_DATA_DIR` / `SINERGY_USER` variables.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(Self::default_config_path);
        let mut config = Self::defaults();

        if let Some(file) = ConfigFile::read(&path)? {
            // Relative to the directory holding config.yaml
            let base = path.parent().unwrap_or(Path::new("."));
            config
                .data_dir
                .overlay(file.data_dir.map(|dir| base.join(dir)), ConfigSource::File);
            config.user.overlay(file.user.map(Some), ConfigSource::File);
            config.config_file = Some(path);
        }

        config.data_dir.overlay(
            std::env::var(DATA_DIR_VAR).ok().map(PathBuf::from),
            ConfigSource::Environment,
        );
        config
            .user
            .overlay(std::env::var(USER_VAR).ok().map(Some), ConfigSource::Environment);

        Ok(config)
    }

    /// Lets `--user` win over every other layer.
    pub fn with_user_override(mut self, user: Option<String>) -> Self {
        self.user.overlay(user.map(Some), ConfigSource::CommandLine);
        self
    }

    /// `sinergyfit/` under the platform config directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sinergyfit")
    }

    /// `sinergyfit/` under the platform data directory.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sinergyfit")
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn write_config(contents: &str) -> (TempDir, PathBuf) {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load(Some(temp_dir.path().join("absent.yaml"))).unwrap();

        assert!(config.data_dir.value.ends_with("sinergyfit"));
        assert_eq!(config.data_dir.source, ConfigSource::Default);
        assert_eq!(config.user.value, None);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_file_values_and_sources() {
        let (_dir, path) = write_config("data_dir: /srv/sinergy\nuser: alice\n");
        let config = Config::load(Some(path.clone())).unwrap();

        assert_eq!(config.data_dir.value, PathBuf::from("/srv/sinergy"));
        assert_eq!(config.data_dir.source, ConfigSource::File);
        assert_eq!(config.user.value.as_deref(), Some("alice"));
        assert_eq!(config.user.source, ConfigSource::File);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_relative_data_dir_is_next_to_config_file() {
        let (dir, path) = write_config("data_dir: store\n");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.data_dir.value, dir.path().join("store"));
    }

    #[test]
    fn test_comment_only_file_gives_defaults() {
        let (_dir, path) = write_config("# nothing set yet\n");
        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.user.value, None);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_file_without_user_keeps_default_source() {
        let (_dir, path) = write_config("data_dir: /srv/sinergy\n");
        let config = Config::load(Some(path)).unwrap();
        assert_eq!(config.user.source, ConfigSource::Default);
    }

    #[test]
    #[ignore] // Mutates process env; run alone with --ignored
    fn test_user_variable_beats_file() {
        let (_dir, path) = write_config("user: fromfile\n");

        std::env::set_var(USER_VAR, "fromenv");
        let config = Config::load(Some(path)).unwrap();
        std::env::remove_var(USER_VAR);

        assert_eq!(config.user.value.as_deref(), Some("fromenv"));
        assert_eq!(config.user.source, ConfigSource::Environment);
    }

    #[test]
    fn test_user_flag_beats_file() {
        let (_dir, path) = write_config("user: fromfile\n");
        let config = Config::load(Some(path))
            .unwrap()
            .with_user_override(Some("flag".into()));

        assert_eq!(config.user.value.as_deref(), Some("flag"));
        assert_eq!(config.user.source, ConfigSource::CommandLine);
    }

    #[test]
    fn test_no_user_flag_changes_nothing() {
        let (_dir, path) = write_config("user: fromfile\n");
        let config = Config::load(Some(path)).unwrap().with_user_override(None);
        assert_eq!(config.user.source, ConfigSource::File);
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let (_dir, path) = write_config("user: [unclosed\n");
        let err = Config::load(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_default_locations() {
        assert!(Config::default_config_path().ends_with("sinergyfit/config.yaml"));
        assert!(Config::default_data_dir().ends_with("sinergyfit"));
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(ConfigSource::CommandLine.to_string(), "command line");
        assert_eq!(ConfigSource::Environment.to_string(), "environment");
    }
}
