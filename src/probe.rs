//! Finds the game installation by probing well-known Steam library locations.

use crate::config::{InstallerConfig, read_game_folder};
use crate::error::{InstallerError, Result};

use std::path::{Path, PathBuf};
use steamlocate::SteamDir;
use tracing::{debug, info};

/// Library roots relative to a drive, in probe order
const STEAM_LIBRARY_ROOTS: &[&[&str]] = &[
    &["Program Files (x86)", "Steam"],
    &["Program Files", "Steam"],
    &["SteamLibrary"],
];

/// Existing drive roots in alphabetical order
#[cfg(windows)]
pub fn available_drives() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|drive| drive.exists())
        .collect()
}

/// Existing drive roots in alphabetical order
#[cfg(not(windows))]
pub fn available_drives() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}

fn common_dir(library: &Path) -> PathBuf {
    library.join("steamapps").join("common")
}

/// Every location probed for `folder`, highest priority first
pub fn candidate_paths(folder: &str, drives: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(drives.len() * STEAM_LIBRARY_ROOTS.len());

    for drive in drives {
        for root in STEAM_LIBRARY_ROOTS {
            let library = root.iter().fold(drive.clone(), |acc, part| acc.join(part));
            candidates.push(common_dir(&library).join(folder));
        }
    }

    candidates
}

/// Returns the first existing candidate
pub fn search_steam_directories(folder: &str, drives: &[PathBuf]) -> Option<PathBuf> {
    candidate_paths(folder, drives).into_iter().find(|candidate| {
        let found = candidate.exists();
        debug!(path = %candidate.display(), found, "probing");
        found
    })
}

/// Asks the Steam client for its library folders
fn search_steam_libraries(folder: &str) -> Option<PathBuf> {
    let steam_dir = SteamDir::locate().ok()?;
    let libraries = steam_dir.libraries().ok()?;

    for library in libraries.flatten() {
        let candidate = common_dir(library.path()).join(folder);
        if candidate.is_dir() {
            return Some(candidate);
        }
    }

    None
}

/// Resolves the installation directory of the game stored in `folder`
pub fn resolve_game_path(folder: &str) -> Result<PathBuf> {
    let drives = available_drives();

    if let Some(path) = search_steam_directories(folder, &drives) {
        info!(path = %path.display(), "found game path");
        return Ok(path);
    }

    if let Some(path) = search_steam_libraries(folder) {
        info!(path = %path.display(), "found game path in Steam library list");
        return Ok(path);
    }

    Err(InstallerError::GamePathNotFound(folder.to_string()))
}

/// Anchors a user-supplied game directory at the current directory
pub fn absolute_game_root(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Game directory for this run: the explicit path if given, otherwise probed
pub fn locate_game_root(config: &InstallerConfig) -> Result<PathBuf> {
    if let Some(path) = &config.game_path {
        if path.is_dir() {
            return absolute_game_root(path);
        }
        return Err(InstallerError::GamePathNotFound(path.display().to_string()));
    }

    let folder = read_game_folder(&config.game_folder_file())?;
    resolve_game_path(&folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_game_dir(drive: &Path, root: &[&str], folder: &str) -> PathBuf {
        let library = root.iter().fold(drive.to_path_buf(), |acc, p| acc.join(p));
        let path = common_dir(&library).join(folder);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn candidates_follow_drive_then_suffix_order() {
        let drives = vec![PathBuf::from("C:"), PathBuf::from("D:")];
        let candidates = candidate_paths("Foo", &drives);

        assert_eq!(candidates.len(), 6);
        assert_eq!(
            candidates[0],
            PathBuf::from("C:")
                .join("Program Files (x86)")
                .join("Steam")
                .join("steamapps")
                .join("common")
                .join("Foo")
        );
        assert_eq!(
            candidates[2],
            PathBuf::from("C:")
                .join("SteamLibrary")
                .join("steamapps")
                .join("common")
                .join("Foo")
        );
        assert!(candidates[3].starts_with("D:"));
    }

    #[test]
    fn earlier_suffix_wins_on_same_drive() {
        let drive = tempfile::tempdir().unwrap();
        let library = make_game_dir(drive.path(), &["SteamLibrary"], "Foo");
        let x86 = make_game_dir(drive.path(), &["Program Files (x86)", "Steam"], "Foo");

        let found = search_steam_directories("Foo", &[drive.path().to_path_buf()]);
        assert_eq!(found, Some(x86));
        assert_ne!(found, Some(library));
    }

    #[test]
    fn earlier_drive_wins_over_better_suffix() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let on_first = make_game_dir(first.path(), &["SteamLibrary"], "Foo");
        make_game_dir(second.path(), &["Program Files (x86)", "Steam"], "Foo");

        let drives = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(search_steam_directories("Foo", &drives), Some(on_first));
    }

    #[test]
    fn nothing_found_returns_none() {
        let drive = tempfile::tempdir().unwrap();
        make_game_dir(drive.path(), &["Program Files", "Steam"], "Other");

        assert_eq!(
            search_steam_directories("Foo", &[drive.path().to_path_buf()]),
            None
        );
    }

    #[test]
    fn explicit_game_path_skips_probing() {
        let game = tempfile::tempdir().unwrap();
        let config = InstallerConfig::new(PathBuf::from("/nonexistent"))
            .with_game_path(game.path().to_path_buf());

        assert_eq!(locate_game_root(&config).unwrap(), game.path());
    }

    #[test]
    fn relative_game_path_is_made_absolute() {
        let game = tempfile::tempdir_in(".").unwrap();
        let relative = PathBuf::from(".").join(game.path().file_name().unwrap());
        let config = InstallerConfig::new(PathBuf::from("/nonexistent")).with_game_path(relative);

        let root = locate_game_root(&config).unwrap();
        assert!(root.is_absolute());
        assert_eq!(
            root,
            std::env::current_dir()
                .unwrap()
                .join(game.path().file_name().unwrap())
        );
    }

    #[test]
    fn missing_config_aborts_resolution() {
        let base = tempfile::tempdir().unwrap();
        let config = InstallerConfig::new(base.path().to_path_buf());

        assert!(matches!(
            locate_game_root(&config),
            Err(InstallerError::ConfigMissing(_))
        ));
    }
}
