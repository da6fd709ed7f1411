//! Configuration manager - main API for config operations

use crate::persistence::ConfigPersistence;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Prefix of environment overrides, e.g. `CHAPTERCAST_PLAYER_SCRUB_STEP_SECS`
pub const ENV_PREFIX: &str = "CHAPTERCAST_";

/// Loads, saves and overrides the configuration file
pub struct ConfigManager {
    persistence: ConfigPersistence,
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager rooted at the platform config directory
    ///
    /// - Linux: `~/.config/chaptercast/`
    /// - macOS: `~/Library/Application Support/chaptercast/`
    /// - Windows: `%APPDATA%\chaptercast\`
    pub fn new() -> ConfigResult<Self> {
        let config_dir = Self::default_config_dir()?;
        Ok(Self::with_directory(config_dir))
    }

    /// Creates a manager with a custom config directory
    pub fn with_directory(config_dir: PathBuf) -> Self {
        let persistence = ConfigPersistence::new(config_dir.join("config.toml"));
        Self {
            persistence,
            config_dir,
        }
    }

    fn default_config_dir() -> ConfigResult<PathBuf> {
        ProjectDirs::from("", "", "chaptercast")
            .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::PathResolutionError {
                reason: "Could not determine user config directory".to_string(),
            })
    }

    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Loads the config file; a missing file yields the defaults
    pub fn load(&self) -> ConfigResult<Config> {
        self.persistence.load()
    }

    /// Loads the config, falling back to defaults on any error
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    }

    /// Validates and saves the config atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.persistence.save(config)
    }

    /// Loads, applies `update_fn` and saves
    ///
    /// ```rust,no_run
    /// # use chaptercast_config::ConfigManager;
    /// # let manager = ConfigManager::new().unwrap();
    /// manager.update(|config| {
    ///     config.player.scrub_step_secs = 15;
    /// }).expect("Failed to update config");
    /// ```
    pub fn update<F>(&self, update_fn: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        update_fn(&mut config);
        self.save(&config)
    }

    /// Writes a default config file if none exists
    ///
    /// Returns `Ok(true)` if a file was created.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            log::info!(
                "Config file already exists at {}",
                self.config_path().display()
            );
            return Ok(false);
        }

        self.save(&Config::default())?;
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Validates the config file, returning one message per problem
    pub fn validate(&self) -> ConfigResult<Vec<String>> {
        let config = self.load()?;

        match config.validate() {
            Ok(()) => Ok(Vec::new()),
            Err(errors) => Ok(errors.iter().map(|e| e.to_string()).collect()),
        }
    }

    /// Loads the file and applies `CHAPTERCAST_*` environment overrides
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config, std::env::vars());

        if let Err(errors) = config.validate() {
            log::warn!(
                "Config validation warnings after env overrides: {:?}",
                errors
            );
        }

        Ok(config)
    }
}

/// Applies `CHAPTERCAST_SECTION_FIELD=value` pairs to `config`
///
/// Unknown keys are ignored. Unparsable values are logged and skipped.
pub fn apply_env_overrides<I>(config: &mut Config, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };

        let applied = match name {
            "APP_LOG_LEVEL" => parse_into(&value, &mut config.app.log_level),
            "APP_PRESENCE_ENABLED" => parse_into(&value, &mut config.app.presence_enabled),
            "PLAYER_CONNECT_TIMEOUT_SECS" => {
                parse_into(&value, &mut config.player.connect_timeout_secs)
            }
            "PLAYER_STOP_WAIT_MS" => parse_into(&value, &mut config.player.stop_wait_ms),
            "PLAYER_STOP_POLL_INTERVAL_MS" => {
                parse_into(&value, &mut config.player.stop_poll_interval_ms)
            }
            "PLAYER_PROGRESS_INTERVAL_SECS" => {
                parse_into(&value, &mut config.player.progress_interval_secs)
            }
            "PLAYER_SCRUB_STEP_SECS" => parse_into(&value, &mut config.player.scrub_step_secs),
            "PLAYER_IDLE_TIMEOUT_SECS" => parse_into(&value, &mut config.player.idle_timeout_secs),
            "PLAYER_RESUME_RECONNECT_ATTEMPTS" => {
                parse_into(&value, &mut config.player.resume_reconnect_attempts)
            }
            "LIBRARY_ROOT" => {
                config.library.root = PathBuf::from(&value);
                true
            }
            "LIBRARY_CHAPTER_EXTENSIONS" => {
                config.library.chapter_extensions = value
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect();
                true
            }
            _ => {
                log::debug!("Ignoring unknown override {}", key);
                continue;
            }
        };

        if applied {
            log::info!("Config override {}={}", key, value);
        } else {
            log::warn!("Ignoring unparsable override {}={}", key, value);
        }
    }
}

fn parse_into<T: std::str::FromStr>(value: &str, slot: &mut T) -> bool {
    match value.trim().parse() {
        Ok(parsed) => {
            *slot = parsed;
            true
        }
        Err(_) => false,
    }
}
