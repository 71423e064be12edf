use serde::{Deserialize, Serialize};

/// User configuration from Modpack Manager.yaml
///
/// Contains the Hades and modpack paths plus importer preferences. Only the
/// front-end reads this; the install services take every value explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Manager_Settings", default)]
    pub settings: ManagerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerSettings {
    #[serde(rename = "Hades Path", default)]
    pub hades_path: String,

    #[serde(rename = "Modpack Folder", default)]
    pub modpack_folder: String,

    #[serde(rename = "Selected Modpack", default)]
    pub selected_modpack: String,

    #[serde(rename = "Trusted Hashes", default = "default_trusted_hashes")]
    pub trusted_hashes: String,

    /// Shell command used to run the importer; empty means platform default
    #[serde(rename = "Importer Command", default)]
    pub importer_command: String,

    #[serde(rename = "Poll Interval", default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            hades_path: String::new(),
            modpack_folder: String::new(),
            selected_modpack: String::new(),
            trusted_hashes: default_trusted_hashes(),
            importer_command: String::new(),
            poll_interval_ms: default_poll_interval(),
            debug_mode: false,
        }
    }
}

fn default_trusted_hashes() -> String {
    crate::services::TRUST_LIST_FILE.to_string()
}

fn default_poll_interval() -> u64 {
    250
}

impl UserConfig {
    /// Whether a Hades path has been chosen
    pub fn has_hades_path(&self) -> bool {
        !self.settings.hades_path.trim().is_empty()
    }

    /// Whether a modpack has been selected for installation
    pub fn has_selected_modpack(&self) -> bool {
        !self.settings.selected_modpack.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_settings_defaults() {
        let settings = ManagerSettings::default();
        assert_eq!(settings.poll_interval_ms, 250);
        assert_eq!(settings.trusted_hashes, "legal_modimporters.txt");
        assert!(settings.hades_path.is_empty());
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "Manager_Settings:\n  Hades Path: \"C:\\\\Games\\\\Hades\"\n";
        let config: UserConfig = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(config.settings.hades_path, "C:\\Games\\Hades");
        assert_eq!(config.settings.poll_interval_ms, 250);
        assert!(config.has_hades_path());
        assert!(!config.has_selected_modpack());
    }
}
