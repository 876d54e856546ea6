use crate::config::WINDOW_TITLE;
use crate::error::Result;
use crate::file_ops::FileFailure;
use crate::installer::InstallSummary;
use crate::playback::clamp_volume;
use crate::shell::ShellAction;
use crate::ui::Ui;

use console::{Term, style};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Interactive terminal front end
pub struct ConsoleUI {
    bars: Mutex<HashMap<usize, ProgressBar>>,
    next_id: AtomicUsize,
}

impl ConsoleUI {
    pub fn new() -> Self {
        Self {
            bars: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
        }
    }
}

impl Default for ConsoleUI {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui for ConsoleUI {
    fn display_welcome(&self) -> Result<()> {
        display_welcome()
    }

    fn display_banner(&self, rows: &[String]) -> Result<()> {
        for row in rows {
            println!("{}", row);
        }
        println!();
        Ok(())
    }

    fn blank_line(&self) -> Result<()> {
        println!();
        Ok(())
    }

    fn wait_for_key(&self) -> Result<()> {
        wait_for_key()
    }

    fn message(&self, text: &str) -> Result<()> {
        println!("{}", text);
        Ok(())
    }

    fn warn(&self, text: &str) -> Result<()> {
        println!("{}", style(text).yellow());
        Ok(())
    }

    fn error(&self, text: &str) -> Result<()> {
        println!();
        println!("{}", style(text).red());
        Ok(())
    }

    fn path_display_found(&self, path: &Path) -> Result<()> {
        println!("{}", style("Found game installation:").cyan());
        println!("  {}", path.display());
        println!();
        Ok(())
    }

    fn path_prompt_game_dir(&self) -> Result<Option<PathBuf>> {
        path_prompt_game_dir()
    }

    fn shell_select_action(&self, actions: &[ShellAction], volume: f32) -> Result<ShellAction> {
        shell_select_action(actions, volume)
    }

    fn shell_prompt_volume(&self, current: f32) -> Result<f32> {
        shell_prompt_volume(current)
    }

    fn shell_display_status(&self, status: &str) -> Result<()> {
        println!("{} {}", style("Status:").bold(), status);
        Ok(())
    }

    fn install_display_step(&self, step: usize, description: &str) -> Result<()> {
        println!();
        println!(
            "{} {}",
            style(format!("[{}/3]", step)).cyan().bold(),
            style(description).cyan()
        );
        Ok(())
    }

    fn install_display_failures(&self, failures: &[FileFailure]) -> Result<()> {
        install_display_failures(failures)
    }

    fn install_finished(&self, summary: &InstallSummary) -> Result<()> {
        install_finished(summary)
    }

    fn progress_start(&self, label: &str, total: u64) -> Result<usize> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let pb = ProgressBar::new(total);
        let style = match ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            Ok(s) => s.progress_chars("#>-"),
            Err(_) => ProgressStyle::default_bar(),
        };
        pb.set_style(style);
        pb.set_message(label.to_string());

        let mut guard = match self.bars.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        guard.insert(id, pb);

        Ok(id)
    }

    fn progress_update(&self, id: usize, position: u64) -> Result<()> {
        let guard = match self.bars.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };

        if let Some(pb) = guard.get(&id) {
            pb.set_position(position);
        }

        Ok(())
    }

    fn progress_finish(&self, id: usize) -> Result<()> {
        let mut guard = match self.bars.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };

        if let Some(pb) = guard.remove(&id) {
            pb.finish();
        }

        Ok(())
    }

    fn deletion_display_success(&self, path: &Path) -> Result<()> {
        println!("  {} {}", style("✔ ").green(), style(path.display()).dim());
        Ok(())
    }

    fn deletion_display_failure(&self, path: &Path, error: &str) -> Result<()> {
        println!(
            "  {} {} {}",
            style("✘ ").red(),
            path.display(),
            style(format!("({})", error)).red()
        );
        Ok(())
    }

    fn deletion_display_skipped(&self, path: &Path) -> Result<()> {
        println!(
            "  {} {}",
            style("- ").dim(),
            style(format!("not found: {}", path.display())).dim()
        );
        Ok(())
    }

    fn deletion_display_summary(
        &self,
        success_count: usize,
        failed_count: usize,
        skipped_count: usize,
    ) -> Result<()> {
        println!();
        println!(
            "Removed {}, failed {}, not found {}",
            style(success_count).green(),
            style(failed_count).red(),
            style(skipped_count).dim()
        );
        Ok(())
    }
}

// ==================== General ====================

fn display_welcome() -> Result<()> {
    let term = Term::stdout();
    term.clear_screen()?;

    println!("{}", style("═".repeat(60)).cyan());
    println!(
        "{}{} (v{})",
        " ".repeat(17),
        style(WINDOW_TITLE).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("═".repeat(60)).cyan());
    println!();

    Ok(())
}

fn wait_for_key() -> Result<()> {
    println!("{}", style("Press Enter to exit...").dim());

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;

    Ok(())
}

// ==================== Game path ====================

fn path_prompt_game_dir() -> Result<Option<PathBuf>> {
    let confirm = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(" Select the game installation directory manually?")
        .default(true)
        .interact_on_opt(&Term::stdout())?;
    if !confirm.unwrap_or(false) {
        return Ok(None);
    }

    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(" Game directory")
        .validate_with(|s: &String| -> std::result::Result<(), String> {
            if Path::new(s.trim()).is_dir() {
                Ok(())
            } else {
                Err("not a directory".to_string())
            }
        })
        .interact_text()?;

    Ok(Some(PathBuf::from(input.trim())))
}

// ==================== Shell ====================

fn shell_select_action(actions: &[ShellAction], volume: f32) -> Result<ShellAction> {
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(" Volume {:.0}%", volume * 100.0))
        .items(&labels)
        .default(0)
        .interact_on(&Term::stdout())?;

    Ok(actions[index])
}

fn shell_prompt_volume(current: f32) -> Result<f32> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(" Volume (0.0 - 1.0)")
        .with_initial_text(format!("{:.2}", current))
        .validate_with(|s: &String| -> std::result::Result<(), String> {
            match s.trim().parse::<f32>() {
                Ok(v) if (0.0..=1.0).contains(&v) => Ok(()),
                _ => Err("enter a number between 0.0 and 1.0".to_string()),
            }
        })
        .interact_text()?;

    Ok(input.trim().parse::<f32>().map(clamp_volume).unwrap_or(current))
}

// ==================== Install ====================

fn install_display_failures(failures: &[FileFailure]) -> Result<()> {
    if failures.is_empty() {
        return Ok(());
    }

    println!();
    println!(
        "{}",
        style(format!("{} item(s) could not be installed:", failures.len())).yellow()
    );
    for failure in failures {
        println!(
            "  {} {} {}",
            style("•").yellow(),
            failure.path.display(),
            style(format!("({})", failure.error)).dim()
        );
    }

    Ok(())
}

fn install_finished(summary: &InstallSummary) -> Result<()> {
    println!();
    if summary.is_clean() {
        println!("{}", style("Installation complete!").green().bold());
    } else {
        println!(
            "{}",
            style("Installation finished with warnings.").yellow().bold()
        );
    }
    println!(
        "{} file(s) installed into {}",
        summary.installed,
        summary.game_root.display()
    );
    println!();
    Ok(())
}
