//! Data models for the modpack manager.
//!
//! - [`UserConfig`]: Paths and preferences loaded from `Modpack Manager.yaml`
//! - [`InstallationRecord`]: The `Mods/modpack.info` record written at install time
//! - [`InstallationState`]: What the Mods folder holds right now (computed, never cached)

pub mod config;
pub mod installation;

pub use config::{ManagerSettings, UserConfig};
pub use installation::{InstallationRecord, InstallationState, RECORD_FILE};
