//! Subtree compaction: zip a completed first-channel directory, then delete
//! it. Runs once per subtree, immediately after the flush that closed it.

use crate::error::ArchiveError;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Extension of subtree archives under the output root.
pub const ARCHIVE_EXT: &str = "zip";

/// Outcome of an archive request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveReport {
    /// The live directory was packed and removed.
    Archived {
        /// Path of the container that was written.
        archive: PathBuf,
        /// Number of member files packed.
        files: usize,
    },
    /// No live directory existed; an earlier run already archived it.
    AlreadyArchived,
}

/// Packs `root/<c0:03>/` into `root/<c0:03>.zip` and removes the directory.
///
/// Member names are relative to `root`, preserving the `c0/c1/file` nesting.
/// The directory is deleted only after the container is fully written; any
/// failure before that point leaves the live tree untouched. Errors here are
/// fatal to the run and never retried, since a second attempt over a
/// half-removed tree could lose tiles.
pub fn archive_subtree(root: &Path, c0: u8) -> Result<ArchiveReport, ArchiveError> {
    let subtree = format!("{c0:03}");
    let live_dir = root.join(&subtree);
    if !live_dir.is_dir() {
        return Ok(ArchiveReport::AlreadyArchived);
    }

    let archive_path = root.join(format!("{subtree}.{ARCHIVE_EXT}"));
    tracing::info!("archiving subtree {subtree} into {}", archive_path.display());

    let mut members = Vec::new();
    for entry in WalkDir::new(&live_dir).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            members.push(entry.path().to_path_buf());
        }
    }
    members.sort();

    let container = File::create(&archive_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(container));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &members {
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writer.start_file(name, options)?;
        let mut member = File::open(path)?;
        io::copy(&mut member, &mut writer)?;
    }
    writer.finish()?;

    fs::remove_dir_all(&live_dir).map_err(|source| ArchiveError::Remove {
        path: live_dir.clone(),
        source,
    })?;

    tracing::info!(
        "archived {} files from subtree {subtree}; live directory removed",
        members.len()
    );
    Ok(ArchiveReport::Archived {
        archive: archive_path,
        files: members.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_subtree(root: &Path) {
        for c1 in ["000", "001"] {
            let dir = root.join("000").join(c1);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(format!("000_{c1}_000.png")), b"tile").unwrap();
        }
    }

    #[test]
    fn archive_replaces_the_live_directory() {
        let dir = tempfile::tempdir().unwrap();
        seed_subtree(dir.path());

        let report = archive_subtree(dir.path(), 0).unwrap();
        let ArchiveReport::Archived { archive, files } = report else {
            panic!("expected an archive to be written");
        };
        assert_eq!(files, 2);
        assert!(archive.is_file());
        assert_eq!(archive, dir.path().join("000.zip"));
        assert!(!dir.path().join("000").exists());
    }

    #[test]
    fn archive_preserves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        seed_subtree(dir.path());
        archive_subtree(dir.path(), 0).unwrap();

        let file = File::open(dir.path().join("000.zip")).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();
        let mut names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["000/000/000_000_000.png", "000/001/000_001_000.png"]);
    }

    #[test]
    fn rerun_after_success_finds_nothing_to_do() {
        let dir = tempfile::tempdir().unwrap();
        seed_subtree(dir.path());
        archive_subtree(dir.path(), 0).unwrap();

        assert_eq!(
            archive_subtree(dir.path(), 0).unwrap(),
            ArchiveReport::AlreadyArchived
        );
    }

    #[test]
    fn absent_subtree_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            archive_subtree(dir.path(), 7).unwrap(),
            ArchiveReport::AlreadyArchived
        );
        assert!(!dir.path().join("007.zip").exists());
    }
}
