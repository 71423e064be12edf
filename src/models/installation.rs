use crate::services::error::InstallError;
use camino::Utf8Path;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;

/// File inside the Mods folder recording which modpack is installed
pub const RECORD_FILE: &str = "modpack.info";

/// Metadata written to `Mods/modpack.info` at install time
///
/// Serialized as `{"name": "...", "installed": "<ISO-8601 UTC>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationRecord {
    pub name: String,
    pub installed: String,
}

impl InstallationRecord {
    /// Create a record stamped with the current UTC time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installed: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }

    /// Parse the install timestamp.
    ///
    /// Accepts RFC 3339 as well as the zone-less form older managers wrote,
    /// which is taken to be UTC.
    pub fn installed_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(stamp) = DateTime::parse_from_rfc3339(&self.installed) {
            return Some(stamp.with_timezone(&Utc));
        }

        NaiveDateTime::parse_from_str(&self.installed, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Read the record from a Mods folder; `None` if absent or unparseable
    pub fn read(managed_dir: &Utf8Path) -> Option<Self> {
        let path = managed_dir.join(RECORD_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!("No readable modpack record at {}: {}", path, e);
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Ignoring unparseable modpack record {}: {}", path, e);
                None
            }
        }
    }

    /// Write the record into a Mods folder, replacing any previous one
    pub fn write(&self, managed_dir: &Utf8Path) -> Result<(), InstallError> {
        let path = managed_dir.join(RECORD_FILE);
        let json = serde_json::to_string(self)
            .map_err(|e| InstallError::io(&path, std::io::Error::other(e)))?;

        fs::write(&path, json).map_err(|e| InstallError::io(&path, e))?;
        tracing::debug!("Wrote modpack record {}", path);
        Ok(())
    }
}

/// What the Mods folder currently holds
///
/// Always computed from disk; nothing caches it because the importer
/// script and the user can both change the folder behind our back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallationState {
    /// Mods folder has no entries
    Empty,
    /// A modpack record is present and readable
    Known(InstallationRecord),
    /// Something is installed but there is no usable record
    Unknown,
}

impl InstallationState {
    /// Inspect a Mods folder
    ///
    /// # Errors
    ///
    /// [`InstallError::DirectoryUnavailable`] if the folder cannot be listed.
    pub fn compute(managed_dir: &Utf8Path) -> Result<Self, InstallError> {
        let unavailable = |source| InstallError::DirectoryUnavailable {
            path: managed_dir.to_path_buf(),
            source,
        };

        let mut entries = managed_dir.read_dir_utf8().map_err(unavailable)?;
        let installed = match entries.next() {
            None => false,
            Some(entry) => {
                entry.map_err(unavailable)?;
                true
            }
        };

        if !installed {
            tracing::debug!("No mods installed in {}", managed_dir);
            return Ok(Self::Empty);
        }

        Ok(match InstallationRecord::read(managed_dir) {
            Some(record) => Self::Known(record),
            None => Self::Unknown,
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Name of the installed modpack, if known
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Known(record) => Some(&record.name),
            _ => None,
        }
    }
}

impl fmt::Display for InstallationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("No mods installed"),
            Self::Known(record) => f.write_str(&record.name),
            Self::Unknown => f.write_str("Unknown mods installed"),
        }
    }
}
