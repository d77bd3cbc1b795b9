//! Filesystem primitives for artifact output: atomic whole-file writes,
//! idempotent directory management, and domain-alias symlinks.
//!
//! Every artifact write goes through [`write_atomic`], which renders to a
//! sibling temp file and renames it over the target. A failed regeneration
//! therefore never leaves a truncated artifact behind; the previous version
//! stays in place until a complete replacement exists. Alias operations fail
//! soft: a racing duplicate create or remove is an expected outcome of
//! at-least-once task delivery, so those paths log and move on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Writes `bytes` to `path` as a single atomic replacement, creating parent
/// directories as needed. Concurrent writers of the same artifact converge
/// on one complete version or the other, never an interleaving.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp = tmp_sibling(path);
    fs::write(&tmp, bytes).map_err(|err| Error::Write {
        path: tmp.clone(),
        err,
    })?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::Write {
            path: path.to_owned(),
            err,
        });
    }
    debug!(path = %path.display(), bytes = bytes.len(), "wrote artifact");
    Ok(())
}

// Unique temp name in the same directory, so the rename never crosses a
// filesystem boundary.
fn tmp_sibling(path: &Path) -> PathBuf {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::from("artifact"),
    };
    let suffix = Uuid::new_v4().simple().to_string();
    path.with_file_name(format!(".{}.{}.tmp", file_name, &suffix[..8]))
}

/// Removes a single artifact file. Absence is not an error.
pub fn delete_file(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Delete {
            path: path.to_owned(),
            err,
        }),
    }
}

/// Creates a directory and any missing parents. Pre-existence is not an
/// error.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|err| Error::CreateDir {
        path: path.to_owned(),
        err,
    })
}

/// Recursively removes a directory tree. Absence is not an error.
pub fn remove_dir_recursive(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(Error::Clean {
            path: path.to_owned(),
            err,
        }),
    }
}

/// Creates a symlink at `link` pointing at `target`. Failure (most often a
/// link that already exists, from a duplicate delivery of the same task) is
/// logged and swallowed.
pub fn bind_alias(target: &Path, link: &Path) {
    match std::os::unix::fs::symlink(target, link) {
        Ok(()) => debug!(link = %link.display(), target = %target.display(), "created alias"),
        Err(err) => warn!(link = %link.display(), %err, "could not create alias"),
    }
}

/// Removes the symlink at `link`. Failure (usually the link is already gone)
/// is logged and swallowed.
pub fn unbind_alias(link: &Path) {
    match fs::remove_file(link) {
        Ok(()) => debug!(link = %link.display(), "removed alias"),
        Err(err) => warn!(link = %link.display(), %err, "could not remove alias"),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Filesystem failures for content files. These are fatal to the running
/// task (a missing artifact is a correctness gap); alias failures never
/// reach this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("writing '{path}': {err}")]
    Write {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("deleting '{path}': {err}")]
    Delete {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("creating directory '{path}': {err}")]
    CreateDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("cleaning directory '{path}': {err}")]
    Clean {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}
