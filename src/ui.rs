use crate::error::Result;
use crate::file_ops::FileFailure;
use crate::installer::InstallSummary;
use crate::shell::ShellAction;

use std::path::{Path, PathBuf};

/// Front-end abstraction shared by the interactive shell and plain CLI output
///
/// Every method is called from the UI thread only; background work reaches
/// the UI through the shell's event channel.
pub trait Ui: Send + Sync {
    fn display_welcome(&self) -> Result<()>;
    fn display_banner(&self, rows: &[String]) -> Result<()>;
    fn blank_line(&self) -> Result<()>;
    fn wait_for_key(&self) -> Result<()>;

    // General output
    fn message(&self, text: &str) -> Result<()>;
    fn warn(&self, text: &str) -> Result<()>;
    fn error(&self, text: &str) -> Result<()>;

    // Game path
    fn path_display_found(&self, path: &Path) -> Result<()>;
    /// Directory picker used when probing fails; `None` when the user gives up
    fn path_prompt_game_dir(&self) -> Result<Option<PathBuf>>;

    // Shell controls
    fn shell_select_action(&self, actions: &[ShellAction], volume: f32) -> Result<ShellAction>;
    fn shell_prompt_volume(&self, current: f32) -> Result<f32>;
    fn shell_display_status(&self, status: &str) -> Result<()>;

    // Install
    fn install_display_step(&self, step: usize, description: &str) -> Result<()>;
    fn install_display_failures(&self, failures: &[FileFailure]) -> Result<()>;
    fn install_finished(&self, summary: &InstallSummary) -> Result<()>;

    // Progress bars
    /// Starts a bar and returns the id for later updates
    fn progress_start(&self, label: &str, total: u64) -> Result<usize>;
    fn progress_update(&self, id: usize, position: u64) -> Result<()>;
    fn progress_finish(&self, id: usize) -> Result<()>;

    // Uninstall
    fn deletion_display_success(&self, path: &Path) -> Result<()>;
    fn deletion_display_failure(&self, path: &Path, error: &str) -> Result<()>;
    fn deletion_display_skipped(&self, path: &Path) -> Result<()>;
    fn deletion_display_summary(
        &self,
        success_count: usize,
        failed_count: usize,
        skipped_count: usize,
    ) -> Result<()>;
}
