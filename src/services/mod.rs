//! Services module - Pure business logic for installing and removing modpacks.
//!
//! Everything here is **framework-agnostic**: no CLI parsing, no settings
//! file access. Callers pass the Hades path, the modpack archive and the
//! trust list in explicitly, so the same calls back the CLI, a GUI or tests.
//!
//! # Components
//!
//! - [`PathResolver`]: Maps a `Hades`, `Content` or `Mods` path onto the
//!   `Content` folder and creates `Content/Mods` on demand
//! - [`TrustStore`]: MD5 allow-list of vetted `modimporter.py` versions
//! - [`PackageArchive`]: Validates a modpack zip, lists its mods, extracts them
//! - [`ScriptIntegrator`]: Runs `modimporter.py`, answering its prompts
//! - [`Installer`]: Orchestrates install, uninstall, status and validation
//! - [`catalog`]: Lists the zips in a modpack folder
//!
//! # Usage Example
//!
//! ```ignore
//! use modpack_manager::services::{Installer, ScriptIntegrator, TrustStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let trust = TrustStore::load("legal_modimporters.txt".into())?;
//! let installer = Installer::new(trust, ScriptIntegrator::new());
//!
//! let report = installer
//!     .install("C:/Games/Hades".into(), "Demo_Pack.zip".into(), &CancellationToken::new())
//!     .await?;
//! println!("Installed {} with {} mods", report.record.name, report.units.len());
//! ```

pub mod archive;
pub mod catalog;
pub mod error;
pub mod installer;
pub mod integrator;
pub mod paths;
pub mod trust;

pub use archive::{INTEGRATOR_SCRIPT, PackageArchive};
pub use catalog::{available_modpacks, modpack_path_by_name};
pub use error::InstallError;
pub use installer::{InstallReport, Installer};
pub use integrator::{DEFAULT_POLL_INTERVAL, IntegratorOutcome, ScriptIntegrator};
pub use paths::{PathResolver, RootShape};
pub use trust::{TRUST_LIST_FILE, TrustStore};
