use ank_mod_installer::cli::UninstallerCli;
use ank_mod_installer::cli_ui::CliUI;
use ank_mod_installer::error::InstallerError;
use ank_mod_installer::logging;
use ank_mod_installer::probe::locate_game_root;
use ank_mod_installer::ui::Ui;
use ank_mod_installer::uninstaller::Uninstaller;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = UninstallerCli::parse();
    logging::init(cli.quiet);

    let config = cli.to_config();
    let ui = CliUI::new(cli.quiet);

    // 1. Locate the game
    let game_root = match locate_game_root(&config) {
        Ok(path) => path,
        Err(InstallerError::GamePathNotFound(_)) => {
            let _ = ui.message("Game installation path not found.");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = ui.error(&e.to_string());
            return ExitCode::from(1);
        }
    };

    // 2. Remove everything the manifest lists
    match Uninstaller::new(&config, game_root, &ui).uninstall() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = ui.error(&e.to_string());
            ExitCode::from(1)
        }
    }
}
