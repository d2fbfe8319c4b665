//! Advisory per-site locks.
//!
//! Two remediation runs interleaving on one site could undo each other's
//! fixes, so callers hold a [`SiteLock`] for the duration of a run. The
//! lock is an exclusive `flock` on `<locks_dir>/<site>-<digest>.lock` and is
//! released when the guard drops.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::{Result, SeoError};

/// Lock file suffix.
const LOCK_SUFFIX: &str = ".lock";

/// Bytes of the site-id digest kept in the lock file name.
const DIGEST_BYTES: usize = 4;

/// Guard holding the exclusive lock for one site.
#[derive(Debug)]
pub struct SiteLock {
    site_id: String,
    path: PathBuf,
    file: File,
}

impl SiteLock {
    /// Try to take the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`SeoError::SiteLocked`] if another holder has it, or an IO
    /// error if the lock file cannot be created.
    pub fn acquire(locks_dir: impl AsRef<Path>, site_id: &str) -> Result<Self> {
        let dir = locks_dir.as_ref();
        fs::create_dir_all(dir)?;

        let path = Self::lock_path(dir, site_id);
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        if FileExt::try_lock_exclusive(&file).is_err() {
            return Err(SeoError::SiteLocked {
                site_id: site_id.to_string(),
            });
        }

        // Holder pid is informational only.
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        debug!(site_id, path = %path.display(), "Site lock acquired");
        Ok(Self {
            site_id: site_id.to_string(),
            path,
            file,
        })
    }

    /// The lock file path for a site.
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced so URLs map to
    /// flat file names. A digest of the raw site id keeps sites that
    /// sanitize to the same name on separate locks.
    #[must_use]
    pub fn lock_path(locks_dir: &Path, site_id: &str) -> PathBuf {
        let name: String = site_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let digest = Sha256::digest(site_id.as_bytes());
        let suffix = hex::encode(&digest[..DIGEST_BYTES]);
        locks_dir.join(format!("{name}-{suffix}{LOCK_SUFFIX}"))
    }

    #[must_use]
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SiteLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(site_id = %self.site_id, "Failed to release site lock: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let temp = TempDir::new().unwrap();
        let lock = SiteLock::acquire(temp.path(), "example.com").unwrap();
        assert_eq!(lock.site_id(), "example.com");
        assert!(lock.path().exists());
        drop(lock);

        assert!(SiteLock::acquire(temp.path(), "example.com").is_ok());
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let temp = TempDir::new().unwrap();
        let _held = SiteLock::acquire(temp.path(), "example.com").unwrap();

        let err = SiteLock::acquire(temp.path(), "example.com").unwrap_err();
        assert!(matches!(err, SeoError::SiteLocked { ref site_id } if site_id == "example.com"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_different_sites_do_not_contend() {
        let temp = TempDir::new().unwrap();
        let _a = SiteLock::acquire(temp.path(), "a.example.com").unwrap();
        assert!(SiteLock::acquire(temp.path(), "b.example.com").is_ok());
    }

    #[test]
    fn test_lock_path_sanitizes_site_id() {
        let path = SiteLock::lock_path(Path::new("/locks"), "https://example.com/blog");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(path.parent(), Some(Path::new("/locks")));
        assert!(name.starts_with("https___example.com_blog-"));
        assert!(name.ends_with(".lock"));
        // name, dash, 8 hex digits, suffix
        assert_eq!(name.len(), "https___example.com_blog".len() + 1 + 8 + 5);
    }

    #[test]
    fn test_lock_path_is_stable() {
        let dir = Path::new("/locks");
        assert_eq!(
            SiteLock::lock_path(dir, "example.com"),
            SiteLock::lock_path(dir, "example.com")
        );
    }

    #[test]
    fn test_colliding_sanitized_names_get_separate_locks() {
        let temp = TempDir::new().unwrap();
        assert_ne!(
            SiteLock::lock_path(temp.path(), "a/b"),
            SiteLock::lock_path(temp.path(), "a_b")
        );

        let _slash = SiteLock::acquire(temp.path(), "a/b").unwrap();
        assert!(SiteLock::acquire(temp.path(), "a_b").is_ok());
    }
}
