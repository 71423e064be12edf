//! Modpack Manager - Install and uninstall Hades modpacks
//!
//! Main entry point for the command-line application.
//!
//! # Overview
//!
//! This binary crate provides the CLI front-end. It initializes:
//! - Logging infrastructure (file rotation + console output on stderr)
//! - Configuration loading ([`ConfigManager`])
//! - Tokio runtime (drives the modimporter subprocess)
//! - CLI controller ([`CliController`] - maps commands onto the install services)
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Initialize logging → `<config dir>/logs/modpack-manager.<date>`
//! 3. Load `Modpack Manager.yaml` (or migrate `config.ini`)
//! 4. Create a tokio runtime
//! 5. Run the command; Ctrl-C cancels a running modimporter
//! 6. Shutdown the runtime with a 5s timeout
//!
//! # Configuration Files
//!
//! Expected in the `--config-dir` directory (default `Modpack Manager Data/`):
//! - `Modpack Manager.yaml`: Hades path, modpack folder, selected modpack
//! - `legal_modimporters.txt`: MD5 hashes of trusted `modimporter.py` versions

use anyhow::Result;
use clap::Parser;
use modpack_manager::cli::{Cli, CliController};
use modpack_manager::{APP_NAME, ConfigManager, VERSION};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let user_config = config_manager.load_user_config()?;
    let debug_mode = cli.debug || user_config.settings.debug_mode;

    // Guard must outlive every log call
    let _log_guard = modpack_manager::logging::setup_logging(
        &cli.config_dir.join("logs"),
        "modpack-manager",
        debug_mode,
        true,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Config was read before the subscriber existed; report where it came from
    match config_manager.active_settings_path() {
        Some(path) => tracing::info!("Loaded settings from {}", path),
        None => tracing::warn!(
            "No settings file in {}, using defaults",
            config_manager.config_dir()
        ),
    }

    // One worker is plenty: operations run one at a time
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .thread_name("modpack-manager-worker")
        .build()?;

    let mut controller = CliController::new(config_manager, user_config, runtime);
    let result = controller.run(cli.command);
    controller.shutdown();

    tracing::info!("Shutdown complete");

    result.map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })
}
