use crate::config::STAGING_PREFIX;
use crate::shutdown::{register_cleanup, unregister_cleanup};

use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Scratch directory owned by one install run.
///
/// Removed when dropped, and by the interrupt handler if the process is
/// stopped before that.
pub struct StagingArea {
    dir: TempDir,
    cleanup_id: usize,
}

impl StagingArea {
    /// Creates a fresh staging directory under the system temp dir
    pub fn create() -> std::io::Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    pub fn create_in(base: &Path) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(base)?;

        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "staging area created");

        let cleanup_id = register_cleanup(move || {
            if path.exists() {
                let _ = std::fs::remove_dir_all(&path);
            }
        });

        Ok(Self { dir, cleanup_id })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        unregister_cleanup(self.cleanup_id);
        debug!(path = %self.dir.path().display(), "removing staging area");
    }
}
