//! Bundled data resources and their on-disk resolution.
//!
//! The bundle under `src/assets/data/` is embedded into the binary at compile
//! time, so resolution never consults installed-package metadata or any system
//! registry. The first [`load`] call extracts the bundle into a
//! content-addressed directory under the OS temp dir; every later call in the
//! process reuses that root.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use include_dir::{Dir, DirEntry, File, include_dir};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::AppError;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/assets/data");

static DATA_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Resolve a bundled resource name to an absolute path that exists on disk.
///
/// `name` is relative to the data root, e.g. `"nipreps.json"` or `"reports"`.
/// Resolving a directory name returns a directory path; further files can be
/// reached with ordinary `join` calls.
pub fn load(name: &str) -> Result<PathBuf, AppError> {
    let relative = validate_name(name)?;
    let path = data_root()?.join(relative);
    if path.exists() {
        Ok(path)
    } else {
        Err(AppError::ResourceNotFound(name.to_string()))
    }
}

/// Read a bundled UTF-8 resource straight from the embedded bundle.
pub fn read_str(name: &str) -> Result<&'static str, AppError> {
    let relative = validate_name(name)?;
    DATA_DIR
        .get_file(relative)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| AppError::ResourceNotFound(name.to_string()))
}

/// Deserialize a bundled JSON resource.
pub fn read_json<T: DeserializeOwned>(name: &str) -> Result<T, AppError> {
    Ok(serde_json::from_str(read_str(name)?)?)
}

/// The on-disk data root for this process, extracting the bundle on first use.
fn data_root() -> Result<&'static Path, AppError> {
    if let Some(root) = DATA_ROOT.get() {
        return Ok(root.as_path());
    }
    let materialized = materialize_bundle()?;
    // A concurrent first caller may have won the race; both computed the same value.
    Ok(DATA_ROOT.get_or_init(|| materialized).as_path())
}

/// Extract the embedded bundle into its content-addressed directory.
///
/// Extraction goes through an attempt-unique staging directory followed by a
/// rename, so concurrent first calls (across threads or processes) are safe
/// to race: the loser finds the final directory already in place.
fn materialize_bundle() -> Result<PathBuf, AppError> {
    static ATTEMPT: AtomicU64 = AtomicU64::new(0);

    let target = std::env::temp_dir()
        .join(format!("packdata-{}-{}", env!("CARGO_PKG_VERSION"), bundle_digest()));
    if target.is_dir() {
        return Ok(target);
    }

    let staging = std::env::temp_dir().join(format!(
        "packdata-stage-{}-{}",
        std::process::id(),
        ATTEMPT.fetch_add(1, Ordering::Relaxed)
    ));
    extract_entries(&DATA_DIR, &staging)?;

    match fs::rename(&staging, &target) {
        Ok(()) => Ok(target),
        Err(_) if target.is_dir() => {
            let _ = fs::remove_dir_all(&staging);
            Ok(target)
        }
        Err(err) => {
            let _ = fs::remove_dir_all(&staging);
            Err(err.into())
        }
    }
}

fn extract_entries(dir: &'static Dir, root: &Path) -> Result<(), AppError> {
    fs::create_dir_all(root.join(dir.path()))?;
    for entry in dir.entries() {
        match entry {
            DirEntry::File(file) => {
                fs::write(root.join(file.path()), file.contents())?;
            }
            DirEntry::Dir(subdir) => extract_entries(subdir, root)?,
        }
    }
    Ok(())
}

/// Short content digest of the bundle, keyed into the extraction path so a
/// stale extraction from another build can never be picked up.
fn bundle_digest() -> String {
    let mut files = Vec::new();
    collect_files(&DATA_DIR, &mut files);
    files.sort_by_key(|file| file.path().to_path_buf());

    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.path().to_string_lossy().as_bytes());
        hasher.update([0]);
        hasher.update(file.contents());
    }
    let mut digest = format!("{:x}", hasher.finalize());
    digest.truncate(12);
    digest
}

fn collect_files(dir: &'static Dir, files: &mut Vec<&'static File<'static>>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::File(file) => files.push(file),
            DirEntry::Dir(subdir) => collect_files(subdir, files),
        }
    }
}

/// Resource names are plain relative paths scoped beneath the data root.
fn validate_name(name: &str) -> Result<&Path, AppError> {
    let relative = Path::new(name);
    let plain = !name.is_empty()
        && relative.components().all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(relative)
    } else {
        Err(AppError::InvalidResourceName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_integrity() {
        // Ensure the embedded bundle is present and every file is readable.
        assert!(!DATA_DIR.entries().is_empty(), "Data bundle should not be empty");

        let mut files = Vec::new();
        collect_files(&DATA_DIR, &mut files);
        for file in files {
            assert!(!file.contents().is_empty(), "File {} is empty", file.path().display());
        }
    }

    #[test]
    fn test_bundle_digest_is_stable() {
        let first = bundle_digest();
        let second = bundle_digest();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_validate_name_accepts_nested_relative_paths() {
        assert!(validate_name("nipreps.json").is_ok());
        assert!(validate_name("reports/report.tpl").is_ok());
    }

    #[test]
    fn test_validate_name_rejects_escaping_paths() {
        for name in ["", "..", "../etc/passwd", "/etc/passwd", "./reports"] {
            let result = validate_name(name);
            assert!(
                matches!(result, Err(AppError::InvalidResourceName(_))),
                "'{name}' should be rejected"
            );
        }
    }

    #[test]
    fn test_read_str_missing_resource() {
        let result = read_str("missing.json");
        assert!(matches!(result, Err(AppError::ResourceNotFound(name)) if name == "missing.json"));
    }
}
