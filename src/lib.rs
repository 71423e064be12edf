// Modpack Manager - Install and uninstall Hades modpacks
//
// This is the library crate containing the install workflow and data structures.
// The binary crate (main.rs) provides the command-line front-end.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{InstallationRecord, InstallationState, ManagerSettings, UserConfig};
pub use services::{InstallError, Installer, PackageArchive, ScriptIntegrator, TrustStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
