use crate::models::UserConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "Modpack Manager.yaml";

/// INI settings file written by earlier versions of the manager
pub const LEGACY_SETTINGS_FILE: &str = "config.ini";

/// Configuration manager for loading and saving the settings file.
///
/// Settings live in `Modpack Manager.yaml`. When that file does not exist
/// yet, a legacy `config.ini` (`[HADES] path`, `[MODPACKS] path, selected`)
/// is migrated instead.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    user_config_path: Utf8PathBuf,
    legacy_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// # Arguments
    /// * `config_dir` - Directory containing configuration files (e.g., "Modpack Manager Data")
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            user_config_path: config_dir.join(SETTINGS_FILE),
            legacy_config_path: config_dir.join(LEGACY_SETTINGS_FILE),
            config_dir,
        })
    }

    /// Load the user configuration file.
    ///
    /// # Returns
    /// The loaded UserConfig, the migrated legacy config, or defaults if neither exists
    pub fn load_user_config(&self) -> Result<UserConfig> {
        if self.user_config_path.exists() {
            let file_contents = fs::read_to_string(&self.user_config_path).with_context(|| {
                format!("Failed to read user config: {}", self.user_config_path)
            })?;

            let config: UserConfig = serde_yaml_ng::from_str(&file_contents).with_context(|| {
                format!("Failed to parse user config: {}", self.user_config_path)
            })?;

            tracing::info!("Loaded user config from {}", self.user_config_path);
            return Ok(config);
        }

        if self.legacy_config_path.exists() {
            tracing::info!("Using legacy config file: {}", self.legacy_config_path);
            return self.load_legacy_config();
        }

        tracing::warn!(
            "User config file not found at {} or {}, using defaults",
            self.user_config_path,
            self.legacy_config_path
        );
        Ok(UserConfig::default())
    }

    /// Save the user configuration file.
    pub fn save_user_config(&self, config: &UserConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize user config to YAML")?;

        fs::write(&self.user_config_path, yaml_string)
            .with_context(|| format!("Failed to write user config: {}", self.user_config_path))?;

        tracing::info!("Saved user config to {}", self.user_config_path);
        Ok(())
    }

    /// Load, change and save the user configuration in one step
    pub fn update_user_config<F>(&self, update_fn: F) -> Result<UserConfig>
    where
        F: FnOnce(&mut UserConfig),
    {
        let mut config = self.load_user_config()?;
        update_fn(&mut config);
        self.save_user_config(&config)?;
        Ok(config)
    }

    /// Map the legacy INI onto the current settings, keeping defaults for
    /// everything the old format did not have.
    fn load_legacy_config(&self) -> Result<UserConfig> {
        let legacy = ::config::Config::builder()
            .add_source(::config::File::new(
                self.legacy_config_path.as_str(),
                ::config::FileFormat::Ini,
            ))
            .build()
            .with_context(|| format!("Failed to parse legacy config: {}", self.legacy_config_path))?;

        let get = |section: &str, key: &str| -> String {
            [
                format!("{}.{}", section, key),
                format!("{}.{}", section.to_lowercase(), key),
            ]
            .iter()
            .find_map(|k| legacy.get_string(k).ok())
            .unwrap_or_default()
        };

        let mut config = UserConfig::default();
        config.settings.hades_path = get("HADES", "path");
        config.settings.modpack_folder = get("MODPACKS", "path");
        config.settings.selected_modpack = get("MODPACKS", "selected");

        Ok(config)
    }

    /// Settings file `load_user_config` reads from, `None` when it falls
    /// back to defaults
    pub fn active_settings_path(&self) -> Option<&Utf8Path> {
        [&self.user_config_path, &self.legacy_config_path]
            .into_iter()
            .find(|path| path.exists())
            .map(|path| path.as_path())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
