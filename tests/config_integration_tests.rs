//! Integration tests for configuration loading
//!
//! These tests verify:
//! - Settings round-trip through `Modpack Manager.yaml`
//! - Missing keys fall back to defaults
//! - A legacy `config.ini` is migrated when no YAML exists
//! - The YAML file wins over a legacy INI

use camino::Utf8PathBuf;
use modpack_manager::ConfigManager;
use modpack_manager::config::{LEGACY_SETTINGS_FILE, SETTINGS_FILE};
use std::fs;
use tempfile::TempDir;

fn config_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().join("Modpack Manager Data")).unwrap();
    (temp_dir, dir)
}

#[test]
fn test_new_creates_directory() {
    let (_temp_dir, dir) = config_dir();
    let manager = ConfigManager::new(&dir).unwrap();

    assert!(dir.is_dir());
    assert_eq!(manager.config_dir(), dir.as_path());
}

#[test]
fn test_defaults_without_any_file() {
    let (_temp_dir, dir) = config_dir();
    let config = ConfigManager::new(&dir).unwrap().load_user_config().unwrap();

    assert!(!config.has_hades_path());
    assert!(!config.has_selected_modpack());
    assert_eq!(config.settings.trusted_hashes, "legal_modimporters.txt");
    assert_eq!(config.settings.poll_interval_ms, 250);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let (_temp_dir, dir) = config_dir();
    let manager = ConfigManager::new(&dir).unwrap();
    fs::write(
        dir.join(SETTINGS_FILE),
        "Manager_Settings:\n  Hades Path: /games/Hades\n  Debug Mode: true\n",
    )
    .unwrap();

    let config = manager.load_user_config().unwrap();
    assert_eq!(config.settings.hades_path, "/games/Hades");
    assert!(config.settings.debug_mode);
    assert_eq!(config.settings.poll_interval_ms, 250);
    assert!(config.settings.importer_command.is_empty());
}

#[test]
fn test_legacy_ini_is_migrated() {
    let (_temp_dir, dir) = config_dir();
    let manager = ConfigManager::new(&dir).unwrap();
    fs::write(
        dir.join(LEGACY_SETTINGS_FILE),
        "[HADES]\npath = /games/Hades\n\n[MODPACKS]\npath = /packs\nselected = /packs/Demo_Pack.zip\n",
    )
    .unwrap();

    let config = manager.load_user_config().unwrap();
    assert_eq!(config.settings.hades_path, "/games/Hades");
    assert_eq!(config.settings.modpack_folder, "/packs");
    assert_eq!(config.settings.selected_modpack, "/packs/Demo_Pack.zip");
    assert_eq!(config.settings.trusted_hashes, "legal_modimporters.txt");
}

#[test]
fn test_yaml_wins_over_legacy_ini() {
    let (_temp_dir, dir) = config_dir();
    let manager = ConfigManager::new(&dir).unwrap();
    fs::write(dir.join(LEGACY_SETTINGS_FILE), "[HADES]\npath = /old/Hades\n").unwrap();

    manager
        .update_user_config(|c| c.settings.hades_path = "/new/Hades".to_string())
        .unwrap();

    let config = manager.load_user_config().unwrap();
    assert_eq!(config.settings.hades_path, "/new/Hades");
}
