//! Filesystem housekeeping: input discovery, output directories, and the
//! per-run temp workspace.

use crate::config::PathsConfig;
use crate::defaults;
use crate::error::{EchodrillError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Whether a file name carries a supported media extension.
fn is_supported_media(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            defaults::INPUT_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Find the most-recently-modified supported media file in `dir`.
///
/// Files with unsupported extensions and subdirectories are skipped. An
/// unreadable or empty directory is `InputNotFound`.
pub fn find_latest_input(dir: &Path) -> Result<PathBuf> {
    let not_found = || EchodrillError::InputNotFound {
        dir: dir.display().to_string(),
    };

    let entries = fs::read_dir(dir).map_err(|_| not_found())?;

    let mut latest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_supported_media(&path) {
            continue;
        }
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if latest.as_ref().is_none_or(|(t, _)| modified > *t) {
            latest = Some((modified, path));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(not_found)
}

/// Auto-create the three output directories.
pub fn ensure_output_dirs(paths: &PathsConfig) -> Result<()> {
    for dir in [
        &paths.dictation_dir,
        &paths.shadowing_dir,
        &paths.transcript_dir,
    ] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// RAII guard for the per-run scratch directory.
///
/// Creation clears any leftovers from a previous run; Drop removes the
/// directory again. Because removal lives in Drop it runs on the failure
/// path too, so aborted runs leave no temp artifacts behind.
#[derive(Debug)]
pub struct TempWorkspace {
    root: PathBuf,
}

impl TempWorkspace {
    /// Clear and (re)create the scratch directory at `root`.
    pub fn create(root: &Path) -> Result<Self> {
        if root.exists() {
            fs::remove_dir_all(root)?;
        }
        fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a scratch file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        // Best-effort: a failed removal must not panic an unwinding thread.
        fs::remove_dir_all(&self.root).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_find_latest_picks_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.mp3");
        let new = dir.path().join("new.wav");
        fs::write(&old, b"x").unwrap();
        // Filesystem mtime granularity can be coarse
        std::thread::sleep(Duration::from_millis(20));
        fs::write(&new, b"y").unwrap();

        assert_eq!(find_latest_input(dir.path()).unwrap(), new);
    }

    #[test]
    fn test_find_latest_skips_unsupported_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let media = dir.path().join("lesson.m4a");
        fs::write(&media, b"y").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        fs::write(dir.path().join("newer.pdf"), b"z").unwrap();

        assert_eq!(find_latest_input(dir.path()).unwrap(), media);
    }

    #[test]
    fn test_find_latest_extension_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("LESSON.MP4");
        fs::write(&media, b"x").unwrap();

        assert_eq!(find_latest_input(dir.path()).unwrap(), media);
    }

    #[test]
    fn test_find_latest_empty_dir_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match find_latest_input(dir.path()) {
            Err(EchodrillError::InputNotFound { .. }) => {}
            other => panic!("expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_find_latest_missing_dir_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            find_latest_input(&missing),
            Err(EchodrillError::InputNotFound { .. })
        ));
    }

    #[test]
    fn test_ensure_output_dirs_creates_all_three() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathsConfig {
            input_dir: dir.path().join("in"),
            dictation_dir: dir.path().join("out/dictation"),
            shadowing_dir: dir.path().join("out/shadowing"),
            transcript_dir: dir.path().join("out/transcripts"),
            temp_dir: dir.path().join("tmp"),
            detector_script: PathBuf::from("detector.py"),
        };

        ensure_output_dirs(&paths).unwrap();
        assert!(paths.dictation_dir.is_dir());
        assert!(paths.shadowing_dir.is_dir());
        assert!(paths.transcript_dir.is_dir());
    }

    #[test]
    fn test_temp_workspace_clears_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scratch");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("stale.mp3"), b"old run").unwrap();

        let ws = TempWorkspace::create(&root).unwrap();
        assert!(ws.root().is_dir());
        assert!(!root.join("stale.mp3").exists());
    }

    #[test]
    fn test_temp_workspace_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scratch");

        {
            let ws = TempWorkspace::create(&root).unwrap();
            fs::write(ws.file("clip_000.mp3"), b"x").unwrap();
            assert!(root.exists());
        }

        assert!(!root.exists());
    }

    #[test]
    fn test_temp_workspace_removed_on_unwind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("scratch");
        let root_clone = root.clone();

        let result = std::panic::catch_unwind(move || {
            let _ws = TempWorkspace::create(&root_clone).unwrap();
            panic!("stage failure");
        });

        assert!(result.is_err());
        assert!(!root.exists());
    }
}
