//! Parser for `extract_pointer.txt`.
//!
//! Each instruction line has the form `<source> -> <destination>`. Lines
//! without the separator are ignored, so blank lines and free-form comments
//! are allowed anywhere. Two placeholders are substituted:
//!
//! - `Tempdir/` at the start of a source means "relative to the staging area"
//! - `%GamePath%` anywhere in a destination is the game installation root

use crate::error::{InstallerError, Result};

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SEPARATOR: &str = "->";
pub const STAGING_MARKERS: &[&str] = &["Tempdir/", "Tempdir\\"];
pub const GAME_PATH_PLACEHOLDER: &str = "%GamePath%";

/// A resolved `source -> destination` pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestInstruction {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Splits an instruction line at the first separator into trimmed tokens
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    let (source, destination) = line.split_once(SEPARATOR)?;
    Some((source.trim(), destination.trim()))
}

pub fn resolve_source(token: &str, staging_dir: &Path) -> PathBuf {
    for marker in STAGING_MARKERS {
        if let Some(rest) = token.strip_prefix(marker) {
            return staging_dir.join(rest);
        }
    }

    PathBuf::from(token)
}

/// Substitutes the game path; a destination without the placeholder is
/// taken relative to the game path unless it is already absolute
pub fn resolve_destination(token: &str, game_path: &Path) -> PathBuf {
    if token.contains(GAME_PATH_PLACEHOLDER) {
        return PathBuf::from(token.replace(GAME_PATH_PLACEHOLDER, &game_path.to_string_lossy()));
    }

    let destination = PathBuf::from(token);
    if destination.is_absolute() {
        destination
    } else {
        game_path.join(destination)
    }
}

/// Parses one line; `None` for anything that is not a usable instruction
pub fn parse_line(line: &str, staging_dir: &Path, game_path: &Path) -> Option<ManifestInstruction> {
    let (source, destination) = split_line(line)?;

    if source.is_empty() || destination.is_empty() {
        warn!(line, "ignoring manifest line with an empty side");
        return None;
    }

    Some(ManifestInstruction {
        source: resolve_source(source, staging_dir),
        destination: resolve_destination(destination, game_path),
    })
}

fn read_manifest(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(InstallerError::ManifestMissing(path.to_path_buf()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Install instructions in file order
pub fn parse_install_manifest(
    path: &Path,
    staging_dir: &Path,
    game_path: &Path,
) -> Result<Vec<ManifestInstruction>> {
    let content = read_manifest(path)?;

    let instructions: Vec<_> = content
        .lines()
        .filter_map(|line| parse_line(line, staging_dir, game_path))
        .collect();

    debug!(count = instructions.len(), manifest = %path.display(), "parsed install manifest");
    Ok(instructions)
}

/// Destinations to remove, in file order; sources are ignored
pub fn parse_uninstall_manifest(path: &Path, game_path: &Path) -> Result<Vec<PathBuf>> {
    let content = read_manifest(path)?;

    let targets: Vec<_> = content
        .lines()
        .filter_map(split_line)
        .filter(|(_, destination)| !destination.is_empty())
        .map(|(_, destination)| resolve_destination(destination, game_path))
        .collect();

    debug!(count = targets.len(), manifest = %path.display(), "parsed uninstall manifest");
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_both_placeholders() {
        let instruction = parse_line(
            "Tempdir/textures/skin.dds -> %GamePath%/data/textures/skin.dds",
            Path::new("/tmp/stageA"),
            Path::new("/games/Foo"),
        )
        .unwrap();

        assert_eq!(
            instruction,
            ManifestInstruction {
                source: PathBuf::from("/tmp/stageA/textures/skin.dds"),
                destination: PathBuf::from("/games/Foo/data/textures/skin.dds"),
            }
        );
    }

    #[test]
    fn lines_without_separator_are_skipped() {
        let staging = Path::new("/tmp/stage");
        let game = Path::new("/games/Foo");

        assert_eq!(parse_line("", staging, game), None);
        assert_eq!(parse_line("# textures for the knight", staging, game), None);
        assert_eq!(parse_line("Tempdir/a.txt => %GamePath%/a.txt", staging, game), None);
        assert_eq!(parse_line("   -> %GamePath%/a.txt", staging, game), None);
    }

    #[test]
    fn splits_on_first_separator_only() {
        assert_eq!(split_line("  a -> b -> c  "), Some(("a", "b -> c")));
    }

    #[test]
    fn relative_destination_is_rooted_at_game_path() {
        assert_eq!(
            resolve_destination("data/ank.pak", Path::new("/games/Foo")),
            PathBuf::from("/games/Foo/data/ank.pak")
        );
    }

    #[test]
    fn relative_game_path_is_substituted_once() {
        let game = Path::new("games/Foo");

        assert_eq!(
            resolve_destination("%GamePath%/data/x.dds", game),
            PathBuf::from("games/Foo/data/x.dds")
        );
        assert_eq!(
            resolve_destination("data/x.dds", game),
            PathBuf::from("games/Foo/data/x.dds")
        );
    }

    #[test]
    fn unmarked_source_is_taken_verbatim() {
        assert_eq!(
            resolve_source("/opt/extra/readme.txt", Path::new("/tmp/stage")),
            PathBuf::from("/opt/extra/readme.txt")
        );
    }

    #[test]
    fn install_manifest_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("extract_pointer.txt");
        std::fs::write(
            &manifest,
            "ANK install map\n\
             Tempdir/textures -> %GamePath%/data/textures\n\
             \n\
             Tempdir/readme.txt -> %GamePath%/ank_readme.txt\n\
             Tempdir/readme_v2.txt -> %GamePath%/ank_readme.txt\n",
        )
        .unwrap();

        let staging = Path::new("/tmp/stage");
        let game = Path::new("/games/Foo");
        let instructions = parse_install_manifest(&manifest, staging, game).unwrap();

        assert_eq!(instructions.len(), 3);
        assert_eq!(instructions[0].source, PathBuf::from("/tmp/stage/textures"));
        assert_eq!(
            instructions[2].source,
            PathBuf::from("/tmp/stage/readme_v2.txt")
        );
        assert_eq!(instructions[1].destination, instructions[2].destination);
    }

    #[test]
    fn uninstall_manifest_yields_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("extract_pointer.txt");
        std::fs::write(
            &manifest,
            "Tempdir/textures -> %GamePath%/data/textures\nnot an instruction\n",
        )
        .unwrap();

        let targets = parse_uninstall_manifest(&manifest, Path::new("/games/Foo")).unwrap();
        assert_eq!(targets, vec![PathBuf::from("/games/Foo/data/textures")]);
    }

    #[test]
    fn missing_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("extract_pointer.txt");

        assert!(matches!(
            parse_uninstall_manifest(&missing, dir.path()),
            Err(InstallerError::ManifestMissing(_))
        ));
        assert!(matches!(
            parse_install_manifest(&missing, dir.path(), dir.path()),
            Err(InstallerError::ManifestMissing(_))
        ));
    }
}
