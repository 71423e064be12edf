use super::archive::PackageArchive;
use super::error::InstallError;
use super::integrator::{IntegratorOutcome, ScriptIntegrator};
use super::paths::PathResolver;
use super::trust::TrustStore;
use crate::models::{InstallationRecord, InstallationState};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tokio_util::sync::CancellationToken;

/// Summary of a completed install
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub record: InstallationRecord,
    pub units: Vec<String>,
    pub files_extracted: usize,
    pub content_dir: Utf8PathBuf,
    pub integrator: IntegratorOutcome,
}

/// Install/uninstall workflow for one Hades content folder at a time
///
/// Each operation takes the root path and archive path explicitly; nothing
/// is remembered between calls except the trust list loaded at startup.
/// Concurrent operations on the same root from different processes are not
/// guarded against.
///
/// # Failure states
///
/// Path, state and validation failures leave the filesystem as it was.
/// An untrusted `modimporter.py` is deleted, but the mod folders extracted
/// before the check stay in place; `uninstall` clears them.
#[derive(Debug, Clone)]
pub struct Installer {
    resolver: PathResolver,
    trust_store: TrustStore,
    integrator: ScriptIntegrator,
}

impl Installer {
    pub fn new(trust_store: TrustStore, integrator: ScriptIntegrator) -> Self {
        Self {
            resolver: PathResolver::new(),
            trust_store,
            integrator,
        }
    }

    pub fn trust_store(&self) -> &TrustStore {
        &self.trust_store
    }

    pub fn integrator(&self) -> &ScriptIntegrator {
        &self.integrator
    }

    /// Current installation state for a root path
    pub fn status(&self, root: &Utf8Path) -> Result<InstallationState, InstallError> {
        let (_, mods) = self.resolver.resolve_all(root)?;
        InstallationState::compute(&mods)
    }

    /// Read-only structural check of a modpack archive
    pub fn validate(&self, archive_path: &Utf8Path) -> Result<bool, InstallError> {
        PackageArchive::validate(archive_path)
    }

    /// Installable mod folders in a modpack archive, in archive order
    pub fn list_units(&self, archive_path: &Utf8Path) -> Result<Vec<String>, InstallError> {
        Ok(PackageArchive::open(archive_path)?.list_units())
    }

    /// Install a modpack into the Mods folder and run its importer.
    ///
    /// Steps, stopping at the first failure:
    /// 1. Resolve `Content` and `Mods`
    /// 2. Refuse if anything is already installed
    /// 3. Check the archive has `Mods/` and `modimporter.py`
    /// 4. Extract the mod folders into `Mods`
    /// 5. Write `Mods/modpack.info`
    /// 6. Extract `modimporter.py` into `Content` and check its hash
    /// 7. Run the importer until it exits
    ///
    /// The importer's exit code is reported in the [`InstallReport`] but
    /// does not fail the install.
    pub async fn install(
        &self,
        root: &Utf8Path,
        archive_path: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<InstallReport, InstallError> {
        let (content, mods) = self.resolver.resolve_all(root)?;

        let state = InstallationState::compute(&mods)?;
        if !state.is_empty() {
            tracing::warn!("Refusing to install over existing mods: {}", state);
            return Err(InstallError::AlreadyInstalled(state.to_string()));
        }

        let mut archive = PackageArchive::open(archive_path)?;
        if let Some(reason) = archive.missing_requirement() {
            return Err(InstallError::InvalidPackage {
                path: archive_path.to_path_buf(),
                reason: reason.to_string(),
            });
        }

        let record = InstallationRecord::new(archive.display_name());
        let units = archive.list_units();
        tracing::info!(
            "Installing {} ({} mods) into {}",
            record.name,
            units.len(),
            mods
        );

        let files_extracted = archive.extract_units(&mods)?;
        record.write(&mods)?;

        let script = archive.extract_integrator(&content)?;
        let (trusted, digest) = self.trust_store.verify_file(&script)?;
        if !trusted {
            tracing::error!("modimporter {} has untrusted hash {}", script, digest);
            fs::remove_file(&script).map_err(|e| InstallError::io(&script, e))?;
            return Err(InstallError::UntrustedIntegrator(digest));
        }
        tracing::debug!("modimporter hash {} is trusted", digest);

        let integrator = self.integrator.run(&content, cancel).await?;

        tracing::info!("Installed {}", record.name);
        Ok(InstallReport {
            record,
            units,
            files_extracted,
            content_dir: content,
            integrator,
        })
    }

    /// Remove everything in the Mods folder and rerun the importer so the
    /// game drops the uninstalled mods.
    pub async fn uninstall(
        &self,
        root: &Utf8Path,
        cancel: &CancellationToken,
    ) -> Result<IntegratorOutcome, InstallError> {
        let (content, mods) = self.resolver.resolve_all(root)?;

        let state = InstallationState::compute(&mods)?;
        if state.is_empty() {
            return Err(InstallError::NothingInstalled);
        }

        tracing::info!("Uninstalling {} from {}", state, mods);
        fs::remove_dir_all(&mods).map_err(|e| InstallError::io(&mods, e))?;

        self.integrator.run(&content, cancel).await
    }
}
