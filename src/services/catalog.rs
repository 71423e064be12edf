//! Modpack zips available in the user's modpack folder.

use anyhow::{Context, Result, bail};
use camino::{Utf8Path, Utf8PathBuf};

/// List the stems of `*.zip` files directly inside `folder`, sorted
pub fn available_modpacks(folder: &Utf8Path) -> Result<Vec<String>> {
    let entries = folder
        .read_dir_utf8()
        .with_context(|| format!("Failed to read modpack folder: {}", folder))?;

    let mut modpacks = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read modpack folder: {}", folder))?;
        let path = entry.path();
        if !path.is_file() || path.extension() != Some("zip") {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            modpacks.push(stem.to_string());
        }
    }

    modpacks.sort();
    tracing::debug!("Found {} modpacks in {}", modpacks.len(), folder);
    Ok(modpacks)
}

/// Path of the zip for a modpack name inside the modpack folder
pub fn modpack_path_by_name(folder: &str, name: &str) -> Result<Utf8PathBuf> {
    if folder.trim().is_empty() {
        bail!("No modpack folder selected");
    }

    Ok(Utf8Path::new(folder).join(format!("{}.zip", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_available_modpacks() {
        let temp_dir = TempDir::new().unwrap();
        let folder = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        fs::write(folder.join("HyperDelivery2_Modpack.zip"), "").unwrap();
        fs::write(folder.join("HyperDelivery1_Modpack.zip"), "").unwrap();
        fs::write(folder.join("notes.txt"), "").unwrap();
        fs::create_dir(folder.join("Folder.zip")).unwrap();

        let modpacks = available_modpacks(&folder).unwrap();
        assert_eq!(
            modpacks,
            vec!["HyperDelivery1_Modpack", "HyperDelivery2_Modpack"]
        );
    }

    #[test]
    fn test_modpack_path_by_name() {
        let path = modpack_path_by_name("/packs", "Demo_Pack").unwrap();
        assert_eq!(path, Utf8PathBuf::from("/packs/Demo_Pack.zip"));

        assert!(modpack_path_by_name("", "Demo_Pack").is_err());
    }
}
