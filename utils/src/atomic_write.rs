//! Atomic file write helpers.
//!
//! Bytes go to a temp file in the destination directory which is then renamed
//! over the target. On Windows, rename-over-existing fails, so an existing
//! target is moved aside to `.bak` first and restored if the rename fails.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Whether the temp file is flushed to disk before it is renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// `sync_all` the file, then best-effort sync the parent directory.
    #[default]
    Synced,
    /// Skip syncing. Suitable for tests and throwaway output.
    Fast,
}

/// How the rename treats an existing file at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Replace any existing file.
    #[default]
    Replace,
    /// Fail with `AlreadyExists` if the destination exists.
    CreateNew,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicWriteOptions {
    pub durability: Durability,
    pub placement: Placement,
}

/// Atomically write `bytes` to `path`, creating the parent directory if needed.
pub fn atomic_write(
    path: impl AsRef<Path>,
    bytes: &[u8],
    options: AtomicWriteOptions,
) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    if options.durability == Durability::Synced {
        tmp.as_file().sync_all()?;
    }

    match options.placement {
        Placement::CreateNew => {
            tmp.persist_noclobber(path).map_err(|err| err.error)?;
        }
        Placement::Replace => {
            if let Err(err) = tmp.persist(path) {
                if !path.exists() {
                    return Err(err.error);
                }
                let backup = path.with_extension("bak");
                let _ = fs::remove_file(&backup);
                fs::rename(path, &backup)?;
                if let Err(retry) = err.file.persist(path) {
                    let _ = fs::rename(&backup, path);
                    return Err(retry.error);
                }
                if let Err(e) = fs::remove_file(&backup) {
                    tracing::warn!(path = %backup.display(), "Failed to remove .bak after atomic write: {e}");
                }
            }
        }
    }

    if options.durability == Durability::Synced {
        sync_dir_best_effort(parent);
    }
    Ok(())
}

fn sync_dir_best_effort(dir: &Path) {
    #[cfg(unix)]
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        tracing::debug!(path = %dir.display(), "Parent directory sync_all failed (best-effort): {e}");
    }

    #[cfg(not(unix))]
    let _ = dir;
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{AtomicWriteOptions, Durability, Placement, atomic_write};

    fn fast() -> AtomicWriteOptions {
        AtomicWriteOptions {
            durability: Durability::Fast,
            ..AtomicWriteOptions::default()
        }
    }

    #[test]
    fn replaces_existing_and_cleans_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");

        atomic_write(&path, b"one", fast()).expect("write one");
        atomic_write(&path, b"two", fast()).expect("write two");

        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
        assert!(!path.with_extension("bak").exists());
    }

    #[test]
    fn creates_missing_parent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.txt");

        atomic_write(&path, b"1+1\n", fast()).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "1+1\n");
    }

    #[test]
    fn create_new_refuses_existing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.txt");
        let opts = AtomicWriteOptions {
            placement: Placement::CreateNew,
            ..fast()
        };

        atomic_write(&path, b"first", opts).expect("first write");
        let err = atomic_write(&path, b"second", opts).expect_err("must not clobber");

        assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).expect("read"), "first");
    }
}
