//! Bounded directory of rendered audio files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use tracing::{debug, warn};

/// Extensions the pool manages; anything else in the directory is left alone
const MANAGED_EXTENSIONS: &[&str] = &["wav", "mp3"];

/// Keeps at most `capacity` audio files in `dir`, evicting oldest-created first.
#[derive(Debug)]
pub struct TempFilePool {
    dir: PathBuf,
    capacity: usize,
    lock: Mutex<()>,
}

impl TempFilePool {
    /// Create the pool, creating `dir` if needed. Capacity is at least 1.
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Managed files, oldest first
    pub fn files(&self) -> io::Result<Vec<PathBuf>> {
        let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let managed = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| MANAGED_EXTENSIONS.contains(&ext));
            if !managed {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((created, path));
        }

        entries.sort();
        Ok(entries.into_iter().map(|(_, path)| path).collect())
    }

    /// Delete the oldest files until at most `capacity` remain.
    ///
    /// Returns the removed paths. Files that vanish concurrently are skipped.
    pub fn enforce(&self) -> io::Result<Vec<PathBuf>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| io::Error::other(format!("pool lock poisoned: {e}")))?;

        let files = self.files()?;
        if files.len() <= self.capacity {
            return Ok(Vec::new());
        }

        let excess = files.len() - self.capacity;
        let mut removed = Vec::with_capacity(excess);

        for path in files.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(path = %path.display(), "Removed old audio file");
                    removed.push(path);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old audio file"),
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"x").unwrap();
        // distinct timestamps
        sleep(Duration::from_millis(20));
        path
    }

    #[test]
    fn test_enforce_evicts_oldest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = TempFilePool::new(tmp.path(), 2).unwrap();

        let first = touch(tmp.path(), "calm_1.wav");
        let second = touch(tmp.path(), "calm_2.mp3");
        let third = touch(tmp.path(), "calm_3.wav");

        let removed = pool.enforce().unwrap();
        assert_eq!(removed, vec![first.clone()]);
        assert!(!first.exists());
        assert!(second.exists());
        assert!(third.exists());
    }

    #[test]
    fn test_enforce_under_capacity_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = TempFilePool::new(tmp.path(), 10).unwrap();
        touch(tmp.path(), "a.wav");

        assert!(pool.enforce().unwrap().is_empty());
        assert_eq!(pool.files().unwrap().len(), 1);
    }

    #[test]
    fn test_unmanaged_files_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = TempFilePool::new(tmp.path(), 1).unwrap();
        let notes = touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "a.wav");
        touch(tmp.path(), "b.wav");

        pool.enforce().unwrap();
        assert!(notes.exists());
        assert_eq!(pool.files().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let tmp = tempfile::tempdir().unwrap();
        let pool = TempFilePool::new(tmp.path().join("nested"), 0).unwrap();
        assert_eq!(pool.capacity(), 1);
        assert!(pool.dir().exists());
    }
}
