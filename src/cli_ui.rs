use crate::error::Result;
use crate::file_ops::FileFailure;
use crate::installer::InstallSummary;
use crate::shell::ShellAction;
use crate::ui::Ui;

use std::path::{Path, PathBuf};

/// Plain line output for the uninstaller and unattended installs
pub struct CliUI {
    quiet: bool,
}

impl CliUI {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn stderr(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn stdout(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }
}

impl Ui for CliUI {
    fn display_welcome(&self) -> Result<()> {
        Ok(())
    }

    fn display_banner(&self, _rows: &[String]) -> Result<()> {
        Ok(())
    }

    fn blank_line(&self) -> Result<()> {
        Ok(())
    }

    fn wait_for_key(&self) -> Result<()> {
        Ok(())
    }

    fn message(&self, text: &str) -> Result<()> {
        self.stdout(text);
        Ok(())
    }

    fn warn(&self, text: &str) -> Result<()> {
        self.stderr(&format!("Warning: {}", text));
        Ok(())
    }

    fn error(&self, text: &str) -> Result<()> {
        self.stderr(&format!("Error: {}", text));
        Ok(())
    }

    fn path_display_found(&self, path: &Path) -> Result<()> {
        self.stdout(&format!("Found game path: {}", path.display()));
        Ok(())
    }

    fn path_prompt_game_dir(&self) -> Result<Option<PathBuf>> {
        Ok(None)
    }

    fn shell_select_action(&self, actions: &[ShellAction], _volume: f32) -> Result<ShellAction> {
        // Nothing to ask; take the way out
        Ok(actions
            .iter()
            .copied()
            .find(|a| matches!(a, ShellAction::Finish | ShellAction::Exit))
            .unwrap_or(ShellAction::Exit))
    }

    fn shell_prompt_volume(&self, current: f32) -> Result<f32> {
        Ok(current)
    }

    fn shell_display_status(&self, status: &str) -> Result<()> {
        self.stdout(status);
        Ok(())
    }

    fn install_display_step(&self, step: usize, description: &str) -> Result<()> {
        self.stdout(&format!("[Step {}] {}", step, description));
        Ok(())
    }

    fn install_display_failures(&self, failures: &[FileFailure]) -> Result<()> {
        for failure in failures {
            self.stderr(&format!(
                "Failed: {} ({})",
                failure.path.display(),
                failure.error
            ));
        }
        Ok(())
    }

    fn install_finished(&self, summary: &InstallSummary) -> Result<()> {
        self.stdout(&format!(
            "Installation complete: {} file(s) installed into {}",
            summary.installed,
            summary.game_root.display()
        ));
        if !summary.is_clean() {
            self.stderr(&format!(
                "Warning: {} item(s) could not be installed",
                summary.failures.len()
            ));
        }
        Ok(())
    }

    fn progress_start(&self, _label: &str, _total: u64) -> Result<usize> {
        Ok(0)
    }

    fn progress_update(&self, _id: usize, _position: u64) -> Result<()> {
        Ok(())
    }

    fn progress_finish(&self, _id: usize) -> Result<()> {
        Ok(())
    }

    fn deletion_display_success(&self, path: &Path) -> Result<()> {
        self.stdout(&format!("Removed: {}", path.display()));
        Ok(())
    }

    fn deletion_display_failure(&self, path: &Path, error: &str) -> Result<()> {
        self.stderr(&format!("Failed to remove {}: {}", path.display(), error));
        Ok(())
    }

    fn deletion_display_skipped(&self, path: &Path) -> Result<()> {
        self.stdout(&format!("File or directory not found: {}", path.display()));
        Ok(())
    }

    fn deletion_display_summary(
        &self,
        success_count: usize,
        failed_count: usize,
        skipped_count: usize,
    ) -> Result<()> {
        self.stdout(&format!(
            "Uninstall finished: {} removed, {} failed, {} not found",
            success_count, failed_count, skipped_count
        ));
        Ok(())
    }
}
