use ank_mod_installer::banner::load_banner;
use ank_mod_installer::cli::InstallerCli;
use ank_mod_installer::cli_ui::CliUI;
use ank_mod_installer::config::InstallerConfig;
use ank_mod_installer::console_ui::ConsoleUI;
use ank_mod_installer::error::Result;
use ank_mod_installer::logging;
use ank_mod_installer::playback::{Playback, SilentPlayback, start_playback_or_silent};
use ank_mod_installer::shell::Shell;
use ank_mod_installer::ui::Ui;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

fn main() -> ExitCode {
    let cli = InstallerCli::parse();
    logging::init(cli.quiet);

    let config = Arc::new(cli.to_config());

    if cli.yes {
        let cli_ui = CliUI::new(cli.quiet);
        return match run_unattended(config, &cli_ui) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let _ = cli_ui.error(&e.to_string());
                ExitCode::from(1)
            }
        };
    }

    let console_ui = ConsoleUI::new();
    match run(config, &console_ui) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = console_ui.error(&format!("Error: {}", e));
            console_ui.wait_for_key().ok();
            ExitCode::from(1)
        }
    }
}

fn open_playback(config: &InstallerConfig) -> Box<dyn Playback> {
    if config.play_music {
        start_playback_or_silent(&config.music_file(), config.volume)
    } else {
        let mut silent = SilentPlayback::new(config.volume);
        silent.pause();
        Box::new(silent)
    }
}

fn run(config: Arc<InstallerConfig>, ui: &dyn Ui) -> Result<()> {
    // 1. Welcome and banner
    ui.display_welcome()?;
    if config.show_banner {
        match load_banner(&config.banner_image()) {
            Ok(rows) => ui.display_banner(&rows)?,
            Err(e) => warn!(error = %e, "banner skipped"),
        }
    }

    // 2. Music
    let playback = open_playback(&config);

    // 3. Menu loop
    let mut shell = Shell::new(config, ui, playback);
    shell.run()
}

fn run_unattended(config: Arc<InstallerConfig>, ui: &dyn Ui) -> Result<()> {
    let playback = Box::new(SilentPlayback::new(config.volume));
    let mut shell = Shell::new(config, ui, playback);

    let summary = shell.run_unattended()?;
    if !summary.is_clean() {
        warn!(failed = summary.failures.len(), "install finished with failures");
    }

    Ok(())
}
