use std::io::Write;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::error::{Result, TrackerError};

/// Atomically write `data` to `path` using a tempfile in the same directory,
/// so a sync client never picks up a half-written record.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map_err(|e| TrackerError::store(format!("{}: {e}", path.display())))
}

pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_yaml::to_string(value)?;
    atomic_write(path, data.as_bytes())?;
    tracing::debug!(path = %path.display(), "wrote record");
    Ok(())
}

/// Sorted names of the sub-directories of `dir`. A missing directory yields
/// an empty list.
pub fn list_dirs(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, |p| p.is_dir())
}

/// Sorted names of `*.yaml` files directly inside `dir`.
pub fn list_yaml_files(dir: &Path) -> Result<Vec<String>> {
    list_entries(dir, |p| {
        p.is_file() && p.extension().is_some_and(|ext| ext == "yaml")
    })
}

fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if keep(&entry.path()) {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort_by(|a, b| crate::models::natural_cmp(a, b));
    Ok(names)
}
