use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// Errors that can occur while installing or uninstalling a modpack
///
/// Every variant carries the one message shown to the user for that failure.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Could not find the Content folder from {0} (expected a path ending in Content, Hades or Mods)")]
    UnresolvablePath(Utf8PathBuf),

    #[error("Failed to find or create Mods folder at {path}: {source}")]
    DirectoryUnavailable {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Mods are already installed ({0}), uninstall them first")]
    AlreadyInstalled(String),

    #[error("No mods are installed")]
    NothingInstalled,

    #[error("{path} is not a valid modpack: {reason}")]
    InvalidPackage { path: Utf8PathBuf, reason: String },

    #[error("Could not read {path} as a zip archive: {source}")]
    CorruptArchive {
        path: Utf8PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("modimporter.py is not a trusted version (md5 {0}), it has been removed")]
    UntrustedIntegrator(String),

    #[error("Failed to start modimporter: {0}")]
    IntegratorSpawn(#[source] io::Error),

    #[error("modimporter run was cancelled")]
    Cancelled,

    #[error("Failed to read trusted modimporter list {path}: {source}")]
    TrustList {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File operation failed on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<Utf8PathBuf>, source: zip::result::ZipError) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let err = InstallError::UnresolvablePath(Utf8PathBuf::from("/games/Steam"));
        assert!(err.to_string().contains("/games/Steam"));

        let err = InstallError::AlreadyInstalled("Demo Pack".to_string());
        assert!(err.to_string().contains("Demo Pack"));

        let err = InstallError::UntrustedIntegrator("d41d8cd98f00b204e9800998ecf8427e".to_string());
        assert!(err.to_string().contains("d41d8cd98f00b204e9800998ecf8427e"));
    }

    #[test]
    fn test_io_helper_keeps_path() {
        let err = InstallError::io(
            "Content/Mods/modpack.info",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        match err {
            InstallError::Io { path, .. } => assert_eq!(path, "Content/Mods/modpack.info"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
