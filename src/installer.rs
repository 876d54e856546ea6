use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result};
use crate::file_ops::{
    FileFailure, OperationReport, copy_file_overwrite, ensure_within_root, merge_copy_dir,
};
use crate::manifest::{ManifestInstruction, parse_install_manifest};
use crate::staging::stage_mod_files;
use crate::temp_dir::StagingArea;

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Progress reported by a running install
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallEvent {
    Step { step: usize, description: String },
    Progress { current: usize, total: usize },
}

/// Result of a completed install run
#[derive(Clone, Debug)]
pub struct InstallSummary {
    pub game_root: PathBuf,
    pub staged: usize,
    pub installed: usize,
    pub failures: Vec<FileFailure>,
}

impl InstallSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies one instruction: merge for directories, overwrite for files
fn apply_instruction(instruction: &ManifestInstruction, game_root: &Path) -> OperationReport {
    let mut report = OperationReport::default();
    let ManifestInstruction {
        source,
        destination,
    } = instruction;

    if let Err(e) = ensure_within_root(game_root, destination) {
        report.record_failure(destination, e);
        return report;
    }

    if source.is_dir() {
        debug!(src = %source.display(), dest = %destination.display(), "merging directory");
        report.merge(merge_copy_dir(source, destination));
    } else if source.is_file() {
        debug!(src = %source.display(), dest = %destination.display(), "copying file");
        match copy_file_overwrite(source, destination) {
            Ok(()) => report.record_success(),
            Err(e) => report.record_failure(source, e),
        }
    } else {
        report.record_failure(source, "source does not exist");
    }

    report
}

/// Applies instructions in order; later instructions overwrite earlier ones.
///
/// There is no rollback: whatever was applied before a failure stays.
pub fn apply_instructions(
    instructions: &[ManifestInstruction],
    game_root: &Path,
    progress: &mut dyn FnMut(usize, usize),
) -> OperationReport {
    let mut report = OperationReport::default();
    let total = instructions.len();

    for (index, instruction) in instructions.iter().enumerate() {
        report.merge(apply_instruction(instruction, game_root));
        progress(index + 1, total);
    }

    report
}

/// Runs one install against a resolved game directory
pub struct Installer<'a> {
    config: &'a InstallerConfig,
    game_root: PathBuf,
}

impl<'a> Installer<'a> {
    pub fn new(config: &'a InstallerConfig, game_root: PathBuf) -> Self {
        Self { config, game_root }
    }

    /// Stages the payload and applies the manifest
    pub fn install(&self, mut on_event: impl FnMut(InstallEvent)) -> Result<InstallSummary> {
        let manifest = self.config.manifest_file();
        if !manifest.is_file() {
            return Err(InstallerError::ManifestMissing(manifest));
        }

        info!(game_root = %self.game_root.display(), "installing");

        // 1. Stage the payload; the staging area lives until this function returns
        on_event(InstallEvent::Step {
            step: 1,
            description: "Preparing mod files".to_string(),
        });
        let staging = StagingArea::create()?;
        let staged = stage_mod_files(
            &self.config.mod_files_dir(),
            staging.path(),
            &self.config.compressed_extension,
            &mut |current, total| on_event(InstallEvent::Progress { current, total }),
        )?;

        // 2. Load the manifest against the staging area
        on_event(InstallEvent::Step {
            step: 2,
            description: "Reading install manifest".to_string(),
        });
        let instructions = parse_install_manifest(&manifest, staging.path(), &self.game_root)?;

        // 3. Commit into the game directory
        on_event(InstallEvent::Step {
            step: 3,
            description: "Copying files into the game directory".to_string(),
        });
        let applied = apply_instructions(&instructions, &self.game_root, &mut |current, total| {
            on_event(InstallEvent::Progress { current, total })
        });

        let mut failures = staged.failures;
        failures.extend(applied.failures);

        info!(
            staged = staged.processed,
            installed = applied.processed,
            failed = failures.len(),
            "install finished"
        );

        Ok(InstallSummary {
            game_root: self.game_root.clone(),
            staged: staged.processed,
            installed: applied.processed,
            failures,
        })
    }
}
