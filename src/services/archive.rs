use super::error::InstallError;
use super::paths::MODS_DIR;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use std::fs::{self, File};
use std::io;
use zip::ZipArchive;
use zip::result::ZipError;

/// File name of the importer script every modpack ships at its root
pub const INTEGRATOR_SCRIPT: &str = "modimporter.py";

const MODS_PREFIX: &str = "Mods/";

/// A modpack zip opened for reading
///
/// Entry names are captured once at open time in archive order, so every
/// listing and check afterwards is answered from the same snapshot.
pub struct PackageArchive {
    path: Utf8PathBuf,
    zip: ZipArchive<File>,
    entries: Vec<String>,
}

impl std::fmt::Debug for PackageArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageArchive")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl PackageArchive {
    /// Open a modpack archive read-only
    ///
    /// # Errors
    ///
    /// [`InstallError::CorruptArchive`] if the file cannot be opened or is
    /// not a readable zip.
    pub fn open(path: &Utf8Path) -> Result<Self, InstallError> {
        let file = File::open(path).map_err(|e| InstallError::corrupt(path, ZipError::Io(e)))?;
        let mut zip = ZipArchive::new(file).map_err(|e| InstallError::corrupt(path, e))?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let entry = zip.by_index(index).map_err(|e| InstallError::corrupt(path, e))?;
            entries.push(entry.name().to_string());
        }

        tracing::debug!("Opened {} with {} entries", path, entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            zip,
            entries,
        })
    }

    /// Open `path` and check it has both a `Mods/` folder and `modimporter.py`
    pub fn validate(path: &Utf8Path) -> Result<bool, InstallError> {
        Ok(Self::open(path)?.is_valid())
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// All entry names in archive order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Modpack display name: file stem with underscores turned into spaces
    pub fn display_name(&self) -> String {
        display_name(&self.path)
    }

    /// Describe the first structural requirement this archive misses, if any
    pub fn missing_requirement(&self) -> Option<&'static str> {
        if !self.entries.iter().any(|name| name.starts_with(MODS_PREFIX)) {
            tracing::error!("{} does not have a Mods folder", self.path);
            return Some("missing Mods folder");
        }

        if !self.entries.iter().any(|name| name == INTEGRATOR_SCRIPT) {
            tracing::error!("{} does not have a modimporter", self.path);
            return Some("missing modimporter.py");
        }

        None
    }

    pub fn is_valid(&self) -> bool {
        self.missing_requirement().is_none()
    }

    /// Names of the mod folders directly under `Mods/`, in archive order
    ///
    /// A name counts as a unit only when it is a folder, i.e. it appears as
    /// `Mods/<unit>/` or as the parent of some deeper entry. Loose files
    /// directly in `Mods/` are not units.
    pub fn list_units(&self) -> Vec<String> {
        let mut units = IndexSet::new();

        for name in &self.entries {
            let Some(rest) = name.strip_prefix(MODS_PREFIX) else {
                continue;
            };
            if let Some((unit, _)) = rest.split_once('/') {
                if !unit.is_empty() {
                    units.insert(unit);
                }
            }
        }

        units.into_iter().map(str::to_string).collect()
    }

    /// Extract everything under `Mods/` into `destination`, dropping the
    /// `Mods/` prefix so `Mods/Foo/a.lua` lands at `destination/Foo/a.lua`.
    ///
    /// Existing files with the same name are overwritten; anything else
    /// already in `destination` is left alone. Entries whose names would
    /// escape `destination` are skipped.
    ///
    /// # Returns
    ///
    /// Number of files written (folders are not counted)
    pub fn extract_units(&mut self, destination: &Utf8Path) -> Result<usize, InstallError> {
        tracing::debug!("Extracting mods from {} to {}", self.path, destination);

        let mut written = 0;
        for index in 0..self.entries.len() {
            let name = &self.entries[index];
            if !name.starts_with(MODS_PREFIX) || name == MODS_PREFIX {
                continue;
            }

            let Some(relative) = self.unit_relative_path(index)? else {
                tracing::warn!("Skipping unsafe archive entry {:?}", self.entries[index]);
                continue;
            };
            if relative.as_str().is_empty() {
                continue;
            }

            let target = destination.join(&relative);
            if self.extract_entry(index, &target)? {
                written += 1;
            }
        }

        tracing::debug!("Finished extracting {} mod files", written);
        Ok(written)
    }

    /// Extract `modimporter.py` into `destination` and return where it landed
    pub fn extract_integrator(&mut self, destination: &Utf8Path) -> Result<Utf8PathBuf, InstallError> {
        let index = self
            .entries
            .iter()
            .position(|name| name == INTEGRATOR_SCRIPT)
            .ok_or_else(|| InstallError::InvalidPackage {
                path: self.path.clone(),
                reason: "missing modimporter.py".to_string(),
            })?;

        let target = destination.join(INTEGRATOR_SCRIPT);
        self.extract_entry(index, &target)?;

        tracing::debug!("Extracted modimporter to {}", target);
        Ok(target)
    }

    /// Path of a `Mods/` entry relative to the Mods folder, or `None` if
    /// writing it would land outside that folder
    fn unit_relative_path(&mut self, index: usize) -> Result<Option<Utf8PathBuf>, InstallError> {
        let entry = self
            .zip
            .by_index(index)
            .map_err(|e| InstallError::corrupt(&self.path, e))?;

        let Some(enclosed) = entry.enclosed_name().and_then(Utf8Path::from_path) else {
            return Ok(None);
        };
        let Ok(relative) = enclosed.strip_prefix(MODS_DIR) else {
            return Ok(None);
        };

        // enclosed_name only keeps the entry inside the archive root;
        // `Mods/Foo/../../x` still climbs out of Mods
        if relative
            .components()
            .any(|c| matches!(c, Utf8Component::ParentDir))
        {
            return Ok(None);
        }

        Ok(Some(relative.to_path_buf()))
    }

    /// Write one entry to `target`; returns `true` if a file was written
    fn extract_entry(&mut self, index: usize, target: &Utf8Path) -> Result<bool, InstallError> {
        let mut entry = self
            .zip
            .by_index(index)
            .map_err(|e| InstallError::corrupt(&self.path, e))?;

        if entry.is_dir() {
            fs::create_dir_all(target).map_err(|e| InstallError::io(target, e))?;
            return Ok(false);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| InstallError::io(parent, e))?;
        }

        let mut outfile = File::create(target).map_err(|e| InstallError::io(target, e))?;
        io::copy(&mut entry, &mut outfile).map_err(|e| InstallError::io(target, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(target, fs::Permissions::from_mode(mode))
                    .map_err(|e| InstallError::io(target, e))?;
            }
        }

        Ok(true)
    }
}

/// Modpack display name for an archive path: `Demo_Pack.zip` -> `Demo Pack`
pub fn display_name(path: &Utf8Path) -> String {
    path.file_stem().unwrap_or_default().replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;

    fn write_zip(path: &Utf8Path, dirs: &[&str], files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);

        for dir in dirs {
            zip.add_directory(*dir, options).unwrap();
        }
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn temp_root() -> (TempDir, Utf8PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        (temp_dir, root)
    }

    #[test]
    fn test_list_units_in_archive_order() {
        let (_temp_dir, root) = temp_root();
        let zip_path = root.join("Pack.zip");
        write_zip(
            &zip_path,
            &["Mods/", "Mods/Zeta/", "Mods/Alpha/"],
            &[
                ("Mods/Zeta/modfile.txt", "z"),
                ("Mods/Alpha/modfile.txt", "a"),
                ("Mods/Beta/deep/file.lua", "b"),
                ("Mods/readme.txt", "not a unit"),
                ("modimporter.py", "print()"),
            ],
        );

        let archive = PackageArchive::open(&zip_path).unwrap();
        assert_eq!(archive.list_units(), vec!["Zeta", "Alpha", "Beta"]);
    }

    #[test]
    fn test_missing_requirements() {
        let (_temp_dir, root) = temp_root();

        let no_mods = root.join("NoMods.zip");
        write_zip(&no_mods, &[], &[("modimporter.py", "print()")]);
        let archive = PackageArchive::open(&no_mods).unwrap();
        assert_eq!(archive.missing_requirement(), Some("missing Mods folder"));

        let no_importer = root.join("NoImporter.zip");
        write_zip(&no_importer, &["Mods/", "Mods/Foo/"], &[]);
        let archive = PackageArchive::open(&no_importer).unwrap();
        assert_eq!(archive.missing_requirement(), Some("missing modimporter.py"));

        let nested_importer = root.join("Nested.zip");
        write_zip(&nested_importer, &["Mods/"], &[("Mods/modimporter.py", "print()")]);
        assert!(!PackageArchive::validate(&nested_importer).unwrap());
    }

    #[test]
    fn test_corrupt_archive() {
        let (_temp_dir, root) = temp_root();
        let bogus = root.join("bogus.zip");
        fs::write(&bogus, "not a zip file").unwrap();

        assert!(matches!(
            PackageArchive::validate(&bogus),
            Err(InstallError::CorruptArchive { .. })
        ));
    }

    #[test]
    fn test_extract_units_strips_prefix_and_overwrites() {
        let (_temp_dir, root) = temp_root();
        let zip_path = root.join("Pack.zip");
        write_zip(
            &zip_path,
            &["Mods/", "Mods/Foo/"],
            &[
                ("Mods/Foo/modfile.txt", "new"),
                ("Mods/Bar/init.lua", "bar"),
                ("modimporter.py", "print()"),
            ],
        );

        let dest = root.join("Mods");
        fs::create_dir_all(dest.join("Foo")).unwrap();
        fs::write(dest.join("Foo/modfile.txt"), "old").unwrap();
        fs::write(dest.join("unrelated.txt"), "keep").unwrap();

        let mut archive = PackageArchive::open(&zip_path).unwrap();
        let written = archive.extract_units(&dest).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest.join("Foo/modfile.txt")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest.join("Bar/init.lua")).unwrap(), "bar");
        assert_eq!(fs::read_to_string(dest.join("unrelated.txt")).unwrap(), "keep");
        assert!(!dest.join("modimporter.py").exists());
        assert!(!dest.join("Mods").exists());
    }

    #[test]
    fn test_extract_integrator() {
        let (_temp_dir, root) = temp_root();
        let zip_path = root.join("Pack.zip");
        write_zip(&zip_path, &["Mods/"], &[("modimporter.py", "print('hi')")]);

        let mut archive = PackageArchive::open(&zip_path).unwrap();
        let extracted = archive.extract_integrator(&root).unwrap();

        assert_eq!(extracted, root.join("modimporter.py"));
        assert_eq!(fs::read_to_string(extracted).unwrap(), "print('hi')");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Utf8Path::new("/packs/Demo_Pack.zip")), "Demo Pack");
        assert_eq!(
            display_name(Utf8Path::new("HyperDelivery1_Modpack.zip")),
            "HyperDelivery1 Modpack"
        );
    }

    #[test]
    fn test_extract_units_skips_escaping_entries() {
        let (_temp_dir, root) = temp_root();
        let zip_path = root.join("Pack.zip");
        write_zip(
            &zip_path,
            &["Mods/"],
            &[
                ("Mods/Foo/a.lua", "ok"),
                ("Mods/../../evil.txt", "evil"),
                ("Mods/Foo/../../sneaky.txt", "sneaky"),
                ("modimporter.py", "print()"),
            ],
        );

        let content = root.join("Content");
        let dest = content.join("Mods");
        fs::create_dir_all(&dest).unwrap();

        let mut archive = PackageArchive::open(&zip_path).unwrap();
        let written = archive.extract_units(&dest).unwrap();

        assert_eq!(written, 1);
        assert!(dest.join("Foo/a.lua").is_file());
        assert!(!content.join("sneaky.txt").exists());
        assert!(!root.join("evil.txt").exists());
    }

    #[test]
    fn test_missing_archive_is_corrupt() {
        let (_temp_dir, root) = temp_root();

        assert!(matches!(
            PackageArchive::validate(&root.join("Missing.zip")),
            Err(InstallError::CorruptArchive { .. })
        ));
    }
}
