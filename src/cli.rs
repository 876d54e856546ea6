use crate::config::{DEFAULT_VOLUME, InstallerConfig};
use crate::playback::clamp_volume;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "ank-installer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"), long_about = None)]
pub struct InstallerCli {
    /// Game installation directory (default: probe the Steam libraries).
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory holding gamefolder.txt, the manifest and modfiles/ (default: current directory).
    #[arg(long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Initial music volume between 0.0 and 1.0.
    #[arg(long, value_name = "VOLUME", default_value_t = DEFAULT_VOLUME)]
    pub volume: f32,

    /// Do not play background music.
    #[arg(long)]
    pub no_music: bool,

    /// Do not draw the banner image.
    #[arg(long)]
    pub no_banner: bool,

    /// Install right away without the interactive menu.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Suppress descriptive output (errors still shown).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl InstallerCli {
    pub fn to_config(&self) -> InstallerConfig {
        let mut config = InstallerConfig::new(self.base_dir.clone());
        config.game_path = self.path.clone();
        config.volume = clamp_volume(self.volume);
        config.play_music = !self.no_music;
        config.show_banner = !self.no_banner;
        config
    }
}

#[derive(Debug, Parser)]
#[command(name = "ank-uninstaller")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Removes the ANK mod files listed in the install manifest.", long_about = None)]
pub struct UninstallerCli {
    /// Game installation directory (default: probe the Steam libraries).
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Directory holding gamefolder.txt and the manifest (default: current directory).
    #[arg(long = "base-dir", value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Suppress descriptive output (errors still shown).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl UninstallerCli {
    pub fn to_config(&self) -> InstallerConfig {
        let mut config = InstallerConfig::new(self.base_dir.clone());
        config.game_path = self.path.clone();
        config.play_music = false;
        config.show_banner = false;
        config
    }
}
