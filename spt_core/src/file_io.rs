//! # Bundle Files
//!
//! Reads and writes [`SoundingBundle`]s as pretty-printed JSON.
//!
//! - **Atomic saves**: write to a temp file, fsync, rename over the target
//! - **Version validation**: refuse bundles from an incompatible schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use spt_core::bundle::SoundingBundle;
//! use spt_core::file_io::{load_bundle, save_bundle};
//! use spt_core::sounding::Sounding;
//! use std::path::Path;
//!
//! let bundle = SoundingBundle::new(Sounding::new("SP-01"));
//! save_bundle(&bundle, Path::new("sp-01.spt.json"))?;
//!
//! let loaded = load_bundle(Path::new("sp-01.spt.json"))?;
//! assert_eq!(loaded.sounding.code_str(), "SP-01");
//! # Ok::<(), spt_core::errors::SptError>(())
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::bundle::{SoundingBundle, SCHEMA_VERSION};
use crate::errors::{SptError, SptResult};

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save a bundle with atomic write semantics.
///
/// Serialize, write `<file>.tmp`, fsync, then rename onto `path`. An
/// interrupted save leaves the previous file intact.
pub fn save_bundle(bundle: &SoundingBundle, path: &Path) -> SptResult<()> {
    let json = serde_json::to_string_pretty(bundle)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        SptError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        SptError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        SptError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SptError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!(path = %path.display(), code = bundle.sounding.code_str(), "bundle saved");
    Ok(())
}

/// Load a bundle and check its schema version.
///
/// # Errors
///
/// * `FileError` - the file cannot be read
/// * `SerializationError` - invalid JSON or wrong shape
/// * `VersionMismatch` - incompatible schema version
pub fn load_bundle(path: &Path) -> SptResult<SoundingBundle> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SptError::file_error("read", path.display().to_string(), e.to_string()))?;

    let bundle: SoundingBundle =
        serde_json::from_str(&contents).map_err(|e| SptError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&bundle.meta.version)?;

    info!(
        path = %path.display(),
        code = bundle.sounding.code_str(),
        samples = bundle.samples.len(),
        layers = bundle.layers.len(),
        "bundle loaded"
    );
    Ok(bundle)
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match. While on 0.x, a file with a newer minor
/// version is refused too.
pub fn validate_version(file_version: &str) -> SptResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || SptError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first())
    else {
        return Err(mismatch());
    };

    if file_major != current_major {
        return Err(mismatch());
    }

    if current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sounding::{Sample, Sounding};
    use std::env::temp_dir;

    fn temp_bundle_path(name: &str) -> PathBuf {
        temp_dir().join(format!("geospt_test_{}_{}.spt.json", name, std::process::id()))
    }

    #[test]
    fn test_tmp_path() {
        let tmp = tmp_path_for(Path::new("/data/sp-01.spt.json"));
        assert_eq!(tmp, Path::new("/data/sp-01.spt.json.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_bundle_path("roundtrip");

        let mut bundle = SoundingBundle::new(Sounding::new("SP-07"));
        bundle.samples.push(Sample::new(1, 1.0, Some(2), 3, 4));
        save_bundle(&bundle, &path).unwrap();

        let loaded = load_bundle(&path).unwrap();
        assert_eq!(loaded, bundle);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_leaves_no_tmp_file() {
        let path = temp_bundle_path("atomic");
        let bundle = SoundingBundle::new(Sounding::new("SP-01"));
        save_bundle(&bundle, &path).unwrap();

        assert!(!tmp_path_for(&path).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_bundle(Path::new("/definitely/not/here.spt.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let path = temp_bundle_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_bundle(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_bundle_path("newer");
        let mut bundle = SoundingBundle::new(Sounding::new("SP-01"));
        bundle.meta.version = "0.9.0".to_string();
        save_bundle(&bundle, &path).unwrap();

        let err = load_bundle(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }
}
