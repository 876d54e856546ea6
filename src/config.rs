use crate::error::{InstallerError, Result};

use std::path::{Path, PathBuf};
use tracing::debug;

pub const WINDOW_TITLE: &str = "ANK Mod Installer";

pub const GAME_FOLDER_FILE: &str = "gamefolder.txt";
pub const MANIFEST_FILE: &str = "extract_pointer.txt";
pub const MOD_FILES_DIR: &str = "modfiles";
pub const MUSIC_FILE: &str = "music";
pub const BANNER_IMAGE: &str = "installer_image";

/// Files carrying this extension are gunzipped while staging
pub const COMPRESSED_EXTENSION: &str = "gz";

pub const DEFAULT_VOLUME: f32 = 0.5;

pub const STAGING_PREFIX: &str = "ank-staging-";

/// Settings shared by every component of one run
#[derive(Clone, Debug)]
pub struct InstallerConfig {
    /// Directory holding the config file, the manifest and the payload
    pub base_dir: PathBuf,
    /// Game directory given on the command line; skips probing
    pub game_path: Option<PathBuf>,
    pub volume: f32,
    pub play_music: bool,
    pub show_banner: bool,
    pub compressed_extension: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

impl InstallerConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            game_path: None,
            volume: DEFAULT_VOLUME,
            play_music: true,
            show_banner: true,
            compressed_extension: COMPRESSED_EXTENSION.to_string(),
        }
    }

    pub fn with_game_path(mut self, game_path: PathBuf) -> Self {
        self.game_path = Some(game_path);
        self
    }

    pub fn game_folder_file(&self) -> PathBuf {
        self.base_dir.join(GAME_FOLDER_FILE)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.base_dir.join(MANIFEST_FILE)
    }

    pub fn mod_files_dir(&self) -> PathBuf {
        self.base_dir.join(MOD_FILES_DIR)
    }

    pub fn music_file(&self) -> PathBuf {
        self.base_dir.join(MUSIC_FILE)
    }

    pub fn banner_image(&self) -> PathBuf {
        self.base_dir.join(BANNER_IMAGE)
    }
}

/// Reads the Steam `common` subfolder name from gamefolder.txt
pub fn read_game_folder(path: &Path) -> Result<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InstallerError::ConfigMissing(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let folder = content.trim();
    if folder.is_empty() {
        return Err(InstallerError::ConfigMissing(path.to_path_buf()));
    }

    debug!(folder, "game folder configured");
    Ok(folder.to_string())
}
