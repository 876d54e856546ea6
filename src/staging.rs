use crate::error::{InstallerError, Result};
use crate::file_ops::{OperationReport, atomic_rename_or_copy};

use flate2::read::GzDecoder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Destination name for a compressed payload entry, if `name` is one.
///
/// The extension is matched without regard to ASCII case.
fn decompressed_name(name: &str, extension: &str) -> Option<String> {
    let split = name.len().checked_sub(extension.len() + 1)?;
    if split == 0 || !name.is_char_boundary(split) {
        return None;
    }

    let (stem, suffix) = name.split_at(split);
    let ext = suffix.strip_prefix('.')?;
    if ext.eq_ignore_ascii_case(extension) {
        Some(stem.to_string())
    } else {
        None
    }
}

fn part_path(out: &Path) -> PathBuf {
    let mut name = out
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("staged"));
    name.push(".part");
    out.with_file_name(name)
}

/// Streams a gzip file into `out` through a sibling `.part` file
pub fn decompress_file(src: &Path, out: &Path) -> std::io::Result<u64> {
    let tmp_path = part_path(out);

    let result = (|| {
        let mut decoder = GzDecoder::new(BufReader::new(File::open(src)?));
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        let written = std::io::copy(&mut decoder, &mut writer)?;
        writer.flush()?;
        drop(writer);
        atomic_rename_or_copy(&tmp_path, out)?;
        Ok(written)
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }

    result
}

/// Mirrors `source_dir` into `dest_dir`, gunzipping compressed entries.
///
/// Directories are created as needed. Files ending in `.<extension>` are
/// decompressed to the same relative path without the extension, every
/// other file is copied verbatim. A file that fails is recorded in the
/// report and the walk carries on. `progress` receives (done, total) after
/// each file.
pub fn stage_mod_files(
    source_dir: &Path,
    dest_dir: &Path,
    extension: &str,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<OperationReport> {
    if !source_dir.is_dir() {
        return Err(InstallerError::ModFilesMissing(source_dir.to_path_buf()));
    }

    std::fs::create_dir_all(dest_dir)?;

    let walker = || {
        WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
    };

    let total = walker()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .count();

    let mut report = OperationReport::default();
    let mut done = 0;

    for entry in walker() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(source_dir).to_path_buf();
                report.record_failure(&path, e);
                continue;
            }
        };

        let rel_path = match entry.path().strip_prefix(source_dir) {
            Ok(rel) => rel,
            Err(e) => {
                report.record_failure(entry.path(), e);
                continue;
            }
        };
        let target = dest_dir.join(rel_path);

        if entry.file_type().is_dir() {
            if let Err(e) = std::fs::create_dir_all(&target) {
                report.record_failure(&target, e);
            }
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        let outcome = match decompressed_name(&name, extension) {
            Some(plain) => {
                let out = target.with_file_name(plain);
                debug!(src = %entry.path().display(), out = %out.display(), "decompressing");
                decompress_file(entry.path(), &out).map(|_| ())
            }
            None => std::fs::copy(entry.path(), &target).map(|_| ()),
        };

        match outcome {
            Ok(()) => report.record_success(),
            Err(e) => report.record_failure(entry.path(), e),
        }

        done += 1;
        progress(done, total);
    }

    info!(
        staged = report.processed,
        failed = report.failures.len(),
        "mod files staged"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn write(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn write_gz(path: &Path, content: &[u8]) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap();
    }

    #[test]
    fn decompressed_name_strips_extension() {
        assert_eq!(
            decompressed_name("skin.dds.gz", "gz").as_deref(),
            Some("skin.dds")
        );
        assert_eq!(decompressed_name("skin.dds", "gz"), None);
        assert_eq!(decompressed_name("archive.tgz", "gz"), None);
        assert_eq!(decompressed_name(".gz", "gz"), None);
        assert_eq!(
            decompressed_name("SKIN.DDS.GZ", "gz").as_deref(),
            Some("SKIN.DDS")
        );
        assert_eq!(decompressed_name("Music.Ogg.Gz", "gz").as_deref(), Some("Music.Ogg"));
    }

    #[test]
    fn uppercase_archive_is_decompressed() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write_gz(&src.path().join("textures/SKIN.DDS.GZ"), b"skin");

        let report = stage_mod_files(src.path(), dest.path(), "gz", &mut |_, _| {}).unwrap();

        assert!(report.is_clean());
        assert_eq!(std::fs::read(dest.path().join("textures/SKIN.DDS")).unwrap(), b"skin");
        assert!(!dest.path().join("textures/SKIN.DDS.GZ").exists());
    }

    #[test]
    fn stages_mixed_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        let big: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        write_gz(&src.path().join("textures/skin.dds.gz"), &big);
        write(&src.path().join("textures/armor/plate.dds"), b"\x00\x01plate\xff");
        write_gz(&src.path().join("sounds/battle/horn.ogg.gz"), b"horn");
        write(&src.path().join("readme.txt"), b"Install me");
        std::fs::create_dir_all(src.path().join("empty/inner")).unwrap();

        let mut calls = Vec::new();
        let report = stage_mod_files(src.path(), dest.path(), "gz", &mut |done, total| {
            calls.push((done, total))
        })
        .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.processed, 4);
        assert_eq!(calls.last(), Some(&(4, 4)));

        let d = dest.path();
        assert_eq!(std::fs::read(d.join("textures/skin.dds")).unwrap(), big);
        assert!(!d.join("textures/skin.dds.gz").exists());
        assert_eq!(
            std::fs::read(d.join("textures/armor/plate.dds")).unwrap(),
            b"\x00\x01plate\xff"
        );
        assert_eq!(std::fs::read(d.join("sounds/battle/horn.ogg")).unwrap(), b"horn");
        assert_eq!(std::fs::read(d.join("readme.txt")).unwrap(), b"Install me");
        assert!(d.join("empty/inner").is_dir());
        assert!(!d.join("textures/skin.dds.part").exists());
    }

    #[test]
    fn corrupt_archive_is_skipped_and_rest_continues() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        write(&src.path().join("a/broken.bin.gz"), b"definitely not gzip");
        write(&src.path().join("b/fine.txt"), b"fine");

        let report = stage_mod_files(src.path(), dest.path(), "gz", &mut |_, _| {}).unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].path.ends_with("a/broken.bin.gz"));
        assert!(!dest.path().join("a/broken.bin").exists());
        assert!(!dest.path().join("a/broken.bin.part").exists());
        assert_eq!(std::fs::read(dest.path().join("b/fine.txt")).unwrap(), b"fine");
    }

    #[test]
    fn restaging_into_existing_tree_is_idempotent() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        write(&src.path().join("data/x.txt"), b"x");

        stage_mod_files(src.path(), dest.path(), "gz", &mut |_, _| {}).unwrap();
        let report = stage_mod_files(src.path(), dest.path(), "gz", &mut |_, _| {}).unwrap();

        assert!(report.is_clean());
        assert_eq!(std::fs::read(dest.path().join("data/x.txt")).unwrap(), b"x");
    }

    #[test]
    fn missing_payload_directory_is_an_error() {
        let dest = tempfile::tempdir().unwrap();
        let missing = dest.path().join("modfiles");

        assert!(matches!(
            stage_mod_files(&missing, dest.path(), "gz", &mut |_, _| {}),
            Err(InstallerError::ModFilesMissing(_))
        ));
    }
}
