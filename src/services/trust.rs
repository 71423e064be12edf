//! Allow-list of modimporter scripts known to be safe.
//!
//! The list is a plain text file with one lowercase hex MD5 digest per line
//! (`legal_modimporters.txt`). It is built offline from a folder of vetted
//! scripts with [`TrustStore::from_directory`] and [`TrustStore::save`], then
//! shipped alongside the manager and loaded once at startup.

use super::error::InstallError;
use camino::{Utf8Path, Utf8PathBuf};
use md5::{Digest, Md5};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::sync::LazyLock;

/// Default file name of the trusted hash list
pub const TRUST_LIST_FILE: &str = "legal_modimporters.txt";

static DIGEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("Invalid digest regex"));

/// Compute the lowercase hex MD5 digest of a byte slice
pub fn md5_hex(content: &[u8]) -> String {
    format!("{:x}", Md5::digest(content))
}

/// Compute the lowercase hex MD5 digest of a file's contents
pub fn hash_file(path: &Utf8Path) -> Result<String, InstallError> {
    let content = fs::read(path).map_err(|e| InstallError::io(path, e))?;
    Ok(md5_hex(&content))
}

/// Immutable set of approved modimporter digests
#[derive(Debug, Clone, Default)]
pub struct TrustStore {
    hashes: HashSet<String>,
}

impl TrustStore {
    /// Build a store from digests already in memory
    pub fn from_hashes<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hashes: hashes
                .into_iter()
                .map(|h| h.as_ref().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Parse hash-list contents.
    ///
    /// Blank lines are ignored, duplicates collapse, and lines that are not
    /// 32 hex characters are skipped with a warning.
    pub fn parse(contents: &str) -> Self {
        let mut hashes = HashSet::new();

        for (index, line) in contents.lines().enumerate() {
            let digest = line.trim().to_ascii_lowercase();
            if digest.is_empty() {
                continue;
            }

            if DIGEST_PATTERN.is_match(&digest) {
                hashes.insert(digest);
            } else {
                tracing::warn!("Ignoring malformed digest on line {}: {:?}", index + 1, line);
            }
        }

        Self { hashes }
    }

    /// Load the hash list from a file
    pub fn load(path: &Utf8Path) -> Result<Self, InstallError> {
        let contents = fs::read_to_string(path).map_err(|source| InstallError::TrustList {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self::parse(&contents);
        tracing::info!("Loaded {} trusted modimporter hashes from {}", store.len(), path);
        Ok(store)
    }

    /// Hash every regular file directly inside `dir`.
    ///
    /// This is the offline step that produces the list from a folder of
    /// reviewed modimporter versions.
    pub fn from_directory(dir: &Utf8Path) -> Result<Self, InstallError> {
        let entries = dir.read_dir_utf8().map_err(|e| InstallError::io(dir, e))?;

        let mut hashes = HashSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| InstallError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let digest = hash_file(path)?;
            tracing::debug!("{} -> {}", path, digest);
            hashes.insert(digest);
        }

        Ok(Self { hashes })
    }

    /// Write the list, one digest per line, sorted so output is reproducible
    pub fn save(&self, path: &Utf8Path) -> Result<(), InstallError> {
        let sorted: BTreeSet<&str> = self.hashes.iter().map(String::as_str).collect();
        let mut output = String::with_capacity(sorted.len() * 33);
        for digest in sorted {
            output.push_str(digest);
            output.push('\n');
        }

        fs::write(path, output).map_err(|e| InstallError::io(path, e))?;
        tracing::info!("Wrote {} trusted modimporter hashes to {}", self.len(), path);
        Ok(())
    }

    pub fn is_trusted(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    /// Hash a file and check it against the list, returning the digest either way
    pub fn verify_file(&self, path: &Utf8Path) -> Result<(bool, String), InstallError> {
        let digest = hash_file(path)?;
        Ok((self.is_trusted(&digest), digest))
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Resolve the hash-list path relative to a base directory unless it is absolute
pub fn trust_list_path(base: &Utf8Path, configured: &str) -> Utf8PathBuf {
    let configured = if configured.is_empty() {
        TRUST_LIST_FILE
    } else {
        configured
    };

    let path = Utf8Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
