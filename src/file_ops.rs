use crate::error::InstallerError;

use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[allow(clippy::permissions_set_readonly_false)]
fn ensure_owner_writable(metadata: &std::fs::Metadata) -> std::fs::Permissions {
    let mut perms = metadata.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = perms.mode() | 0o200;
        perms.set_mode(mode);
    }

    #[cfg(not(unix))]
    {
        perms.set_readonly(false);
    }

    perms
}

/// One item that could not be staged, copied or removed
#[derive(Clone, Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a batch where per-item errors are isolated
#[derive(Clone, Debug, Default)]
pub struct OperationReport {
    pub processed: usize,
    pub failures: Vec<FileFailure>,
}

impl OperationReport {
    pub fn record_success(&mut self) {
        self.processed += 1;
    }

    pub fn record_failure(&mut self, path: &Path, error: impl ToString) {
        let error = error.to_string();
        warn!(path = %path.display(), error = %error, "skipping item");
        self.failures.push(FileFailure {
            path: path.to_path_buf(),
            error,
        });
    }

    pub fn merge(&mut self, other: OperationReport) {
        self.processed += other.processed;
        self.failures.extend(other.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rename, falling back to copy + remove across filesystems
pub fn atomic_rename_or_copy(src: &Path, dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent)?;
    }

    match std::fs::rename(src, dst) {
        Ok(_) => Ok(()),
        Err(rename_err) => match std::fs::copy(src, dst) {
            Ok(_) => {
                std::fs::remove_file(src)?;
                Ok(())
            }
            Err(copy_err) => Err(io::Error::other(format!(
                "rename failed: {}; copy failed: {}",
                rename_err, copy_err
            ))),
        },
    }
}

/// Resolves `.` and `..` without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }

    out
}

/// Fails unless `path` is `root` or lies beneath it
pub fn ensure_within_root(root: &Path, path: &Path) -> Result<(), InstallerError> {
    let root = normalize_lexically(root);
    let candidate = normalize_lexically(path);

    if candidate.starts_with(&root) {
        Ok(())
    } else {
        Err(InstallerError::OutsideGameRoot(path.to_path_buf()))
    }
}

/// Copies one file, replacing whatever is at `dest`
pub fn copy_file_overwrite(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if dest.is_file()
        && let Err(e) = std::fs::remove_file(dest)
    {
        if e.kind() != ErrorKind::PermissionDenied {
            return Err(e);
        }
        let metadata = std::fs::metadata(dest)?;
        std::fs::set_permissions(dest, ensure_owner_writable(&metadata))?;
        std::fs::remove_file(dest)?;
    }

    std::fs::copy(src, dest)?;
    Ok(())
}

/// Merges the tree under `src` into `dest`, file by file.
///
/// Same-named files are replaced; anything in `dest` without a counterpart
/// in `src` is left alone.
pub fn merge_copy_dir(src: &Path, dest: &Path) -> OperationReport {
    let mut report = OperationReport::default();

    if let Err(e) = std::fs::create_dir_all(dest) {
        report.record_failure(dest, e);
        return report;
    }

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                report.record_failure(&path, e);
                continue;
            }
        };

        let rel_path = match entry.path().strip_prefix(src) {
            Ok(rel) => rel,
            Err(e) => {
                report.record_failure(entry.path(), e);
                continue;
            }
        };
        let new_path = dest.join(rel_path);

        if entry.file_type().is_dir() {
            if let Err(e) = std::fs::create_dir_all(&new_path) {
                report.record_failure(&new_path, e);
            }
            continue;
        }

        match copy_file_overwrite(entry.path(), &new_path) {
            Ok(()) => report.record_success(),
            Err(e) => report.record_failure(entry.path(), e),
        }
    }

    report
}

#[derive(Clone, Debug)]
pub enum DeletionStatus {
    Success,
    Failed(String),
    /// Nothing existed at the path
    Skipped,
}

#[derive(Clone, Debug)]
pub struct DeletionResult {
    pub path: PathBuf,
    pub status: DeletionStatus,
}

impl DeletionResult {
    fn new(path: &Path, status: DeletionStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
        }
    }
}

/// Removes a file or a whole directory tree
pub fn delete_path(path: &Path) -> DeletionResult {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => delete_with(path, |p| std::fs::remove_dir_all(p)),
        Ok(_) => delete_with(path, |p| std::fs::remove_file(p)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            DeletionResult::new(path, DeletionStatus::Skipped)
        }
        Err(e) => DeletionResult::new(path, DeletionStatus::Failed(e.to_string())),
    }
}

fn delete_with(path: &Path, remove: impl Fn(&Path) -> io::Result<()>) -> DeletionResult {
    match remove(path) {
        Ok(_) => {
            if path.exists() {
                DeletionResult::new(
                    path,
                    DeletionStatus::Failed("path still exists after removal".to_string()),
                )
            } else {
                DeletionResult::new(path, DeletionStatus::Success)
            }
        }
        Err(e) => {
            // read-only entries: clear the flag and retry once
            if e.kind() == ErrorKind::PermissionDenied
                && let Ok(metadata) = std::fs::metadata(path)
            {
                let perms = ensure_owner_writable(&metadata);
                let _ = std::fs::set_permissions(path, perms);
                if remove(path).is_ok() {
                    return DeletionResult::new(path, DeletionStatus::Success);
                }
            }

            match e.kind() {
                ErrorKind::NotFound => DeletionResult::new(path, DeletionStatus::Skipped),
                ErrorKind::PermissionDenied => DeletionResult::new(
                    path,
                    DeletionStatus::Failed(format!("permission denied: {}", e)),
                ),
                _ => DeletionResult::new(path, DeletionStatus::Failed(e.to_string())),
            }
        }
    }
}

/// Tallies (removed, failed, not found)
pub fn count_results(results: &[DeletionResult]) -> (usize, usize, usize) {
    let mut success = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for result in results {
        match result.status {
            DeletionStatus::Success => success += 1,
            DeletionStatus::Failed(_) => failed += 1,
            DeletionStatus::Skipped => skipped += 1,
        }
    }

    (success, failed, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn normalize_resolves_parent_components() {
        assert_eq!(
            normalize_lexically(Path::new("/games/Foo/./data/../mods")),
            PathBuf::from("/games/Foo/mods")
        );
    }

    #[test]
    fn containment_rejects_escaping_paths() {
        let root = Path::new("/games/Foo");
        assert!(ensure_within_root(root, Path::new("/games/Foo/data/a.txt")).is_ok());
        assert!(ensure_within_root(root, Path::new("/games/Foo")).is_ok());
        assert!(ensure_within_root(root, Path::new("/games/Foo/../Bar/a.txt")).is_err());
        assert!(ensure_within_root(root, Path::new("/games/FooBar/a.txt")).is_err());
        assert!(ensure_within_root(root, Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn merge_overwrites_same_names_and_keeps_others() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        write(&src.path().join("textures/skin.dds"), "new skin");
        write(&src.path().join("textures/extra/hat.dds"), "hat");
        write(&dest.path().join("textures/skin.dds"), "old skin");
        write(&dest.path().join("textures/vanilla.dds"), "vanilla");

        let report = merge_copy_dir(src.path(), dest.path());

        assert!(report.is_clean());
        assert_eq!(report.processed, 2);
        assert_eq!(
            std::fs::read_to_string(dest.path().join("textures/skin.dds")).unwrap(),
            "new skin"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("textures/extra/hat.dds")).unwrap(),
            "hat"
        );
        assert_eq!(
            std::fs::read_to_string(dest.path().join("textures/vanilla.dds")).unwrap(),
            "vanilla"
        );
    }

    #[test]
    fn copy_replaces_read_only_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("out/dest.txt");
        write(&src, "fresh");
        write(&dest, "stale");

        let mut perms = std::fs::metadata(&dest).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&dest, perms).unwrap();

        copy_file_overwrite(&src, &dest).unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "fresh");
    }

    #[test]
    fn delete_handles_files_dirs_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        let tree = dir.path().join("tree");
        write(&file, "a");
        write(&tree.join("nested/b.txt"), "b");

        let results = vec![
            delete_path(&file),
            delete_path(&tree),
            delete_path(&dir.path().join("missing")),
        ];

        assert!(matches!(results[0].status, DeletionStatus::Success));
        assert!(matches!(results[1].status, DeletionStatus::Success));
        assert!(matches!(results[2].status, DeletionStatus::Skipped));
        assert!(!file.exists());
        assert!(!tree.exists());
        assert_eq!(count_results(&results), (2, 0, 1));
    }
}
