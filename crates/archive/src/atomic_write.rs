//! Atomic file write using the write-rename pattern.
//!
//! Data goes to `{path}.tmp`, is flushed with `sync_all()`, and the temp
//! file is then renamed over the final path. A crash mid-write leaves any
//! previous archive at `path` untouched.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically writes `data` to `path`, creating parent directories.
pub fn atomic_write(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("amm_atomic_write_test_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_atomic_write_creates_file_without_leftover_tmp() {
        let dir = test_dir("creates_file");
        let path = dir.join("run.ammr");

        atomic_write(&path, b"flow bytes").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"flow bytes");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_overwrites_existing() {
        let dir = test_dir("overwrites");
        let path = dir.join("run.ammr");

        atomic_write(&path, b"first run").unwrap();
        atomic_write(&path, b"second run").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second run");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = test_dir("parent_dirs");
        let path = dir.join("2024").join("storms").join("run.ammr");

        atomic_write(&path, b"nested").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"nested");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_stale_tmp_is_replaced() {
        let dir = test_dir("stale_tmp");
        let path = dir.join("run.ammr");

        atomic_write(&path, b"kept").unwrap();
        fs::write(tmp_path(&path), b"partial garbage from a crash").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"kept");

        atomic_write(&path, b"fresh").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"fresh");
        assert!(!tmp_path(&path).exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
