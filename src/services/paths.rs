//! Locating the Hades `Content` folder and its managed `Mods` folder.
//!
//! Users point the manager at whatever folder they found first: the game
//! install (`.../Hades`), the `Content` folder inside it, or the `Mods`
//! folder inside that. [`PathResolver::resolve`] maps each of those shapes
//! onto the `Content` folder by looking only at the final path component.
//! Anything else is rejected; there is no searching or fuzzy matching.
//!
//! # Examples
//!
//! ```ignore
//! use modpack_manager::services::PathResolver;
//! use camino::Utf8Path;
//!
//! let resolver = PathResolver::new();
//! let content = resolver.resolve(Utf8Path::new("C:/Games/Hades"))?;
//! assert_eq!(content, "C:/Games/Hades/Content");
//!
//! let mods = resolver.managed_directory(&content)?;
//! assert_eq!(mods, "C:/Games/Hades/Content/Mods");
//! ```

use super::error::InstallError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Top-level directory name of the host game install
pub const HOST_APP_DIR: &str = "Hades";

/// Name of the game's content folder
pub const CONTENT_DIR: &str = "Content";

/// Name of the folder holding installed modpack contents
pub const MODS_DIR: &str = "Mods";

/// Which of the recognised folder shapes a root path matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// `.../Hades/Content`
    Content,
    /// `.../Hades`
    HostApp,
    /// `.../Hades/Content/Mods`
    Mods,
}

impl RootShape {
    /// Classify a root path by its final component (case-sensitive)
    pub fn of(root: &Utf8Path) -> Option<Self> {
        match root.file_name()? {
            CONTENT_DIR => Some(Self::Content),
            HOST_APP_DIR => Some(Self::HostApp),
            MODS_DIR => Some(Self::Mods),
            _ => None,
        }
    }
}

/// Derives the content and managed directories from a user-supplied root path
#[derive(Debug, Clone, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the `Content` folder for a root path.
    ///
    /// The root does not have to exist; a missing root is logged and the
    /// derived path is still returned so the caller gets a precise error
    /// from the first filesystem operation instead.
    ///
    /// # Errors
    ///
    /// [`InstallError::UnresolvablePath`] if the final component is not
    /// `Content`, `Hades` or `Mods`, or if a `Mods` root has no parent.
    pub fn resolve(&self, root: &Utf8Path) -> Result<Utf8PathBuf, InstallError> {
        if !root.exists() {
            tracing::warn!("Hades path {} does not exist", root);
        }

        let content = match RootShape::of(root) {
            Some(RootShape::Content) => Some(root.to_path_buf()),
            Some(RootShape::HostApp) => Some(root.join(CONTENT_DIR)),
            Some(RootShape::Mods) => root.parent().map(|parent| {
                if parent.as_str().is_empty() {
                    Utf8PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                }
            }),
            None => None,
        };

        match content {
            Some(content) => {
                tracing::debug!("Resolved Content folder {} from {}", content, root);
                Ok(content)
            }
            None => {
                tracing::error!("Could not find Content folder from {}", root);
                Err(InstallError::UnresolvablePath(root.to_path_buf()))
            }
        }
    }

    /// Return `content_dir/Mods`, creating it if it is missing.
    ///
    /// Only the `Mods` folder itself is created; a missing `Content` folder
    /// is an error rather than something to conjure up.
    pub fn managed_directory(&self, content_dir: &Utf8Path) -> Result<Utf8PathBuf, InstallError> {
        let mods = content_dir.join(MODS_DIR);

        match fs::create_dir(&mods) {
            Ok(()) => tracing::info!("Created Mods folder at {}", mods),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(source) => {
                return Err(InstallError::DirectoryUnavailable { path: mods, source });
            }
        }

        if !mods.is_dir() {
            return Err(InstallError::DirectoryUnavailable {
                path: mods,
                source: io::Error::other("exists but is not a directory"),
            });
        }

        Ok(mods)
    }

    /// Resolve both directories in one step: `(content_dir, managed_dir)`
    pub fn resolve_all(&self, root: &Utf8Path) -> Result<(Utf8PathBuf, Utf8PathBuf), InstallError> {
        let content = self.resolve(root)?;
        let mods = self.managed_directory(&content)?;
        Ok((content, mods))
    }
}
