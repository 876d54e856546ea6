use crate::config::InstallerConfig;
use crate::error::Result;
use crate::file_ops::{
    DeletionResult, DeletionStatus, count_results, delete_path, ensure_within_root,
    normalize_lexically,
};
use crate::manifest::parse_uninstall_manifest;
use crate::ui::Ui;

use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UninstallSummary {
    pub removed: usize,
    pub failed: usize,
    pub not_found: usize,
}

fn guard_target(target: &Path, game_root: &Path) -> Option<DeletionResult> {
    let escapes = ensure_within_root(game_root, target).is_err()
        || normalize_lexically(target) == normalize_lexically(game_root);

    if escapes {
        warn!(path = %target.display(), "refusing to remove path outside the game directory");
        Some(DeletionResult {
            path: target.to_path_buf(),
            status: DeletionStatus::Failed("outside the game directory".to_string()),
        })
    } else {
        None
    }
}

/// Removes every target in order.
///
/// Missing targets are reported as skipped, so running this twice is
/// harmless. A target nested in one removed earlier simply shows up as
/// skipped.
pub fn apply_uninstall(targets: &[PathBuf], game_root: &Path) -> Vec<DeletionResult> {
    targets
        .iter()
        .map(|target| guard_target(target, game_root).unwrap_or_else(|| delete_path(target)))
        .collect()
}

/// Reverses an install using the manifest
pub struct Uninstaller<'a> {
    config: &'a InstallerConfig,
    game_root: PathBuf,
    ui: &'a dyn Ui,
}

impl<'a> Uninstaller<'a> {
    pub fn new(config: &'a InstallerConfig, game_root: PathBuf, ui: &'a dyn Ui) -> Self {
        Self {
            config,
            game_root,
            ui,
        }
    }

    /// Removes every manifest destination and reports each one
    pub fn uninstall(&self) -> Result<UninstallSummary> {
        self.ui.message(&format!(
            "Game Installation Path: {}",
            self.game_root.display()
        ))?;

        // 1. Manifest is mandatory
        let targets = parse_uninstall_manifest(&self.config.manifest_file(), &self.game_root)?;

        // 2. Remove in file order
        let results = apply_uninstall(&targets, &self.game_root);

        for result in &results {
            match &result.status {
                DeletionStatus::Success => self.ui.deletion_display_success(&result.path)?,
                DeletionStatus::Failed(error) => {
                    self.ui.deletion_display_failure(&result.path, error)?
                }
                DeletionStatus::Skipped => self.ui.deletion_display_skipped(&result.path)?,
            }
        }

        // 3. Summary
        let (removed, failed, not_found) = count_results(&results);
        self.ui.deletion_display_summary(removed, failed, not_found)?;

        info!(removed, failed, not_found, "uninstall finished");

        Ok(UninstallSummary {
            removed,
            failed,
            not_found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_ui::CliUI;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn removes_files_and_trees_in_order() {
        let game = tempfile::tempdir().unwrap();
        write(&game.path().join("data/textures/skin.dds"), "skin");
        write(&game.path().join("ank_readme.txt"), "readme");

        let targets = vec![
            game.path().join("data/textures"),
            game.path().join("data/textures/skin.dds"),
            game.path().join("ank_readme.txt"),
        ];
        let results = apply_uninstall(&targets, game.path());

        assert!(matches!(results[0].status, DeletionStatus::Success));
        assert!(matches!(results[1].status, DeletionStatus::Skipped));
        assert!(matches!(results[2].status, DeletionStatus::Success));
        assert!(game.path().join("data").is_dir());
        assert!(!game.path().join("data/textures").exists());
    }

    #[test]
    fn refuses_root_and_outside_targets() {
        let outer = tempfile::tempdir().unwrap();
        let game = outer.path().join("Foo");
        write(&game.join("keep.txt"), "keep");
        write(&outer.path().join("other.txt"), "other");

        let targets = vec![game.clone(), game.join("../other.txt")];
        let results = apply_uninstall(&targets, &game);

        assert_eq!(count_results(&results), (0, 2, 0));
        assert!(game.join("keep.txt").is_file());
        assert!(outer.path().join("other.txt").is_file());
    }

    #[test]
    fn second_run_reports_everything_not_found() {
        let base = tempfile::tempdir().unwrap();
        let game = tempfile::tempdir().unwrap();
        write(
            &base.path().join("extract_pointer.txt"),
            "Tempdir/textures -> %GamePath%/data/textures\n\
             Tempdir/readme.txt -> %GamePath%/ank_readme.txt\n",
        );
        write(&game.path().join("data/textures/skin.dds"), "skin");
        write(&game.path().join("ank_readme.txt"), "readme");

        let config = InstallerConfig::new(base.path().to_path_buf());
        let ui = CliUI::new(true);
        let uninstaller = Uninstaller::new(&config, game.path().to_path_buf(), &ui);

        let first = uninstaller.uninstall().unwrap();
        assert_eq!(
            first,
            UninstallSummary {
                removed: 2,
                failed: 0,
                not_found: 0
            }
        );

        let second = uninstaller.uninstall().unwrap();
        assert_eq!(
            second,
            UninstallSummary {
                removed: 0,
                failed: 0,
                not_found: 2
            }
        );
    }
}
