use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("game folder is not configured: {} is missing or empty", .0.display())]
    ConfigMissing(PathBuf),

    #[error("game installation path not found for \"{0}\"")]
    GamePathNotFound(String),

    #[error("install manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("mod files directory not found: {}", .0.display())]
    ModFilesMissing(PathBuf),

    #[error("refusing to touch {} outside the game directory", .0.display())]
    OutsideGameRoot(PathBuf),

    #[error("an installation is already running")]
    InstallInProgress,

    #[error("audio playback unavailable: {0}")]
    AudioInit(String),

    #[error("banner image unavailable: {0}")]
    Banner(String),

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("dialog error: {0}")]
    Dialog(String),

    #[error("{0}")]
    Other(String),

    #[error("operation cancelled by user")]
    UserCancelled,
}

impl From<dialoguer::Error> for InstallerError {
    fn from(err: dialoguer::Error) -> Self {
        let s = err.to_string();
        debug!(error = %s, "dialog failed");
        InstallerError::Dialog(s)
    }
}

impl From<std::io::Error> for InstallerError {
    fn from(err: std::io::Error) -> Self {
        debug!(error = %err, "io error");
        InstallerError::Io(err)
    }
}

impl From<walkdir::Error> for InstallerError {
    fn from(err: walkdir::Error) -> Self {
        InstallerError::Io(err.into())
    }
}

impl From<image::ImageError> for InstallerError {
    fn from(err: image::ImageError) -> Self {
        InstallerError::Banner(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;
