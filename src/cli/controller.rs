use super::{Commands, ConfigAction, TrustAction};
use crate::config::ConfigManager;
use crate::models::UserConfig;
use crate::services::{
    InstallError, Installer, ScriptIntegrator, TrustStore, available_modpacks,
    modpack_path_by_name, trust,
};
use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

/// Bridges parsed CLI commands to the install services
///
/// Holds the loaded settings and the runtime that drives the importer.
/// Settings are only read here; every service call gets explicit paths.
pub struct CliController {
    config_manager: ConfigManager,
    config: UserConfig,
    runtime: Runtime,
}

impl CliController {
    pub fn new(config_manager: ConfigManager, config: UserConfig, runtime: Runtime) -> Self {
        Self {
            config_manager,
            config,
            runtime,
        }
    }

    /// Execute one command and return the process exit code
    pub fn run(&mut self, command: Commands) -> Result<ExitCode> {
        match command {
            Commands::Status { hades } => {
                let root = self.hades_root(hades)?;
                let state = self.installer_without_trust().status(&root)?;
                println!("{}", state);
            }
            Commands::Install {
                modpack,
                hades,
                replace,
            } => {
                let root = self.hades_root(hades)?;
                let archive = self.modpack_archive(modpack.as_deref())?;
                self.install(&root, &archive, replace)?;
            }
            Commands::Uninstall { hades } => {
                let root = self.hades_root(hades)?;
                let installer = self.installer_without_trust();
                let outcome = self.with_cancellation(|cancel| async move {
                    installer.uninstall(&root, &cancel).await
                })?;
                println!("Mods uninstalled (modimporter exit code {:?})", outcome.exit_code);
            }
            Commands::Validate { modpack } => {
                let archive = self.modpack_archive(Some(&modpack))?;
                let valid = self.installer_without_trust().validate(&archive)?;
                if !valid {
                    println!("{} is not a valid modpack", archive);
                    return Ok(ExitCode::FAILURE);
                }
                println!("{} is a valid modpack", archive);
            }
            Commands::Units { modpack } => {
                let archive = self.modpack_archive(Some(&modpack))?;
                for unit in self.installer_without_trust().list_units(&archive)? {
                    println!("{}", unit);
                }
            }
            Commands::List => {
                let folder = &self.config.settings.modpack_folder;
                if folder.trim().is_empty() {
                    bail!("No modpack folder selected; run `config set-modpack-folder` first");
                }
                for modpack in available_modpacks(Utf8Path::new(folder))? {
                    println!("{}", modpack);
                }
            }
            Commands::Config { action } => self.configure(action)?,
            Commands::Trust {
                action: TrustAction::Build { dir, output },
            } => {
                let store = TrustStore::from_directory(&dir)?;
                store.save(&output)?;
                println!("Wrote {} trusted hashes to {}", store.len(), output);
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    /// Stop the runtime, giving a killed importer a moment to be reaped
    pub fn shutdown(self) {
        self.runtime.shutdown_timeout(Duration::from_secs(5));
    }

    fn install(&self, root: &Utf8Path, archive: &Utf8Path, replace: bool) -> Result<()> {
        let installer = self.installer()?;

        if replace && !installer.status(root)?.is_empty() {
            let installer = installer.clone();
            let root = root.to_path_buf();
            self.with_cancellation(|cancel| async move {
                installer.uninstall(&root, &cancel).await
            })?;
        }

        let root = root.to_path_buf();
        let archive = archive.to_path_buf();
        let report = self.with_cancellation(|cancel| async move {
            installer.install(&root, &archive, &cancel).await
        })?;

        println!(
            "Installed {} ({} mods, {} files)",
            report.record.name,
            report.units.len(),
            report.files_extracted
        );
        if !report.integrator.succeeded() {
            println!(
                "Warning: modimporter exited with code {:?}",
                report.integrator.exit_code
            );
        }
        Ok(())
    }

    fn configure(&mut self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                let yaml = serde_yaml_ng::to_string(&self.config)
                    .context("Failed to serialize settings")?;
                print!("{}", yaml);
                return Ok(());
            }
            ConfigAction::SetHadesPath { path } => {
                self.config = self
                    .config_manager
                    .update_user_config(|c| c.settings.hades_path = path.to_string())?;
            }
            ConfigAction::SetModpackFolder { path } => {
                self.config = self
                    .config_manager
                    .update_user_config(|c| c.settings.modpack_folder = path.to_string())?;
            }
            ConfigAction::Select { modpack } => {
                let archive = self.modpack_archive(Some(&modpack))?;
                self.config = self
                    .config_manager
                    .update_user_config(|c| c.settings.selected_modpack = archive.to_string())?;
            }
        }
        println!("Settings saved to {}", self.config_manager.config_dir());
        Ok(())
    }

    /// Run a cancellable operation to completion; Ctrl-C cancels it
    fn with_cancellation<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, InstallError>>,
    {
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            self.runtime.spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Interrupted, cancelling");
                    cancel.cancel();
                }
            })
        };

        let result = self.runtime.block_on(operation(cancel));
        watcher.abort();
        Ok(result?)
    }

    fn installer(&self) -> Result<Installer> {
        let path = trust::trust_list_path(
            self.config_manager.config_dir(),
            &self.config.settings.trusted_hashes,
        );
        let trust_store = TrustStore::load(&path)?;
        if trust_store.is_empty() {
            tracing::warn!("Trusted modimporter list {} is empty", path);
        }
        Ok(Installer::new(trust_store, self.integrator()))
    }

    /// Installer for operations that never check an importer's hash
    fn installer_without_trust(&self) -> Installer {
        Installer::new(TrustStore::default(), self.integrator())
    }

    fn integrator(&self) -> ScriptIntegrator {
        let settings = &self.config.settings;
        ScriptIntegrator::new()
            .with_command(settings.importer_command.clone())
            .with_poll_interval(Duration::from_millis(settings.poll_interval_ms))
    }

    fn hades_root(&self, explicit: Option<Utf8PathBuf>) -> Result<Utf8PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }
        if !self.config.has_hades_path() {
            bail!("No Hades path selected; pass --hades or run `config set-hades-path` first");
        }
        Ok(Utf8PathBuf::from(&self.config.settings.hades_path))
    }

    /// Turn a path-or-name into an archive path
    ///
    /// An existing file wins; otherwise the value is looked up as a modpack
    /// name in the modpack folder. With no value, the selected modpack is used.
    fn modpack_archive(&self, modpack: Option<&str>) -> Result<Utf8PathBuf> {
        let settings = &self.config.settings;
        let Some(modpack) = modpack else {
            if !self.config.has_selected_modpack() {
                return Err(anyhow!(
                    "No modpack selected; pass one or run `config select` first"
                ));
            }
            return Ok(Utf8PathBuf::from(&settings.selected_modpack));
        };

        let as_path = Utf8PathBuf::from(modpack);
        if as_path.is_file() {
            return Ok(as_path);
        }

        modpack_path_by_name(&settings.modpack_folder, modpack)
            .with_context(|| format!("{} is not a file", modpack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn controller(config: UserConfig) -> (TempDir, CliController) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = Utf8PathBuf::try_from(temp_dir.path().join("data")).unwrap();
        let manager = ConfigManager::new(&config_dir).unwrap();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        (temp_dir, CliController::new(manager, config, runtime))
    }

    #[test]
    fn test_hades_root_prefers_explicit() {
        let mut config = UserConfig::default();
        config.settings.hades_path = "/configured/Hades".to_string();
        let (_temp_dir, controller) = controller(config);

        assert_eq!(
            controller.hades_root(Some("/explicit/Hades".into())).unwrap(),
            Utf8PathBuf::from("/explicit/Hades")
        );
        assert_eq!(
            controller.hades_root(None).unwrap(),
            Utf8PathBuf::from("/configured/Hades")
        );
    }

    #[test]
    fn test_hades_root_required() {
        let (_temp_dir, controller) = controller(UserConfig::default());
        assert!(controller.hades_root(None).is_err());
    }

    #[test]
    fn test_modpack_archive_resolution() {
        let mut config = UserConfig::default();
        config.settings.modpack_folder = "/packs".to_string();
        config.settings.selected_modpack = "/packs/Selected.zip".to_string();
        let (temp_dir, controller) = controller(config);

        let existing = Utf8PathBuf::try_from(temp_dir.path().join("Local.zip")).unwrap();
        fs::write(&existing, "").unwrap();

        assert_eq!(controller.modpack_archive(Some(existing.as_str())).unwrap(), existing);
        assert_eq!(
            controller.modpack_archive(Some("Demo_Pack")).unwrap(),
            Utf8PathBuf::from("/packs/Demo_Pack.zip")
        );
        assert_eq!(
            controller.modpack_archive(None).unwrap(),
            Utf8PathBuf::from("/packs/Selected.zip")
        );
    }

    #[test]
    fn test_config_commands_persist() {
        let (_temp_dir, mut controller) = controller(UserConfig::default());

        controller
            .run(Commands::Config {
                action: ConfigAction::SetHadesPath {
                    path: "/games/Hades".into(),
                },
            })
            .unwrap();

        let reloaded = controller.config_manager.load_user_config().unwrap();
        assert_eq!(reloaded.settings.hades_path, "/games/Hades");
    }
}
