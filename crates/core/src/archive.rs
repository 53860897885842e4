//! Packing and unpacking save archives.
//!
//! Archives are plain zips whose single root entry is the save folder
//! itself, so extraction recreates the folder name at the destination.

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::{Path, PathBuf},
};

use tracing::debug;
use walkdir::WalkDir;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// Pack `source_dir` into `<canonical_name>.zip` in the current working
/// directory and return the archive's path. The caller owns the file and
/// is expected to remove it once the transfer is done.
pub fn pack(source_dir: &Path, canonical_name: &str) -> Result<PathBuf, ArchiveError> {
    pack_into(source_dir, canonical_name, Path::new("."))
}

fn pack_into(
    source_dir: &Path,
    canonical_name: &str,
    out_dir: &Path,
) -> Result<PathBuf, ArchiveError> {
    if !source_dir.is_dir() {
        return Err(ArchiveError::MissingSource(source_dir.to_path_buf()));
    }

    // Entry names are rooted at the parent so the save folder's own name
    // becomes the archive's root entry.
    let prefix = source_dir.parent().unwrap_or(Path::new(""));

    let archive_path = out_dir.join(format!("{canonical_name}.zip"));
    let file = File::create(&archive_path).map_err(|source| ArchiveError::Io {
        path: archive_path.clone(),
        source,
    })?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(|err| ArchiveError::Io {
            path: source_dir.to_path_buf(),
            source: err.into(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(prefix)
            .map_err(|err| ArchiveError::Io {
                path: entry.path().to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidData, err),
            })?;
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            writer
                .add_directory(name, options)
                .map_err(|source| ArchiveError::Format {
                    path: archive_path.clone(),
                    source,
                })?;
        } else {
            writer
                .start_file(name, options)
                .map_err(|source| ArchiveError::Format {
                    path: archive_path.clone(),
                    source,
                })?;
            let mut input = File::open(entry.path()).map_err(|source| ArchiveError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            io::copy(&mut input, &mut writer).map_err(|source| ArchiveError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
        }
    }

    writer.finish().map_err(|source| ArchiveError::Format {
        path: archive_path.clone(),
        source,
    })?;

    debug!("packed {} into {}", source_dir.display(), archive_path.display());
    Ok(archive_path)
}

/// Extract `archive_path` into `destination`, recreating the archived
/// folder as a child. Extraction merges: colliding files are overwritten,
/// files already present at the destination but absent from the archive
/// are left untouched.
pub fn unpack(archive_path: &Path, destination: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive_path).map_err(|source| ArchiveError::Io {
        path: archive_path.to_path_buf(),
        source,
    })?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|source| ArchiveError::Format {
            path: archive_path.to_path_buf(),
            source,
        })?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|source| ArchiveError::Format {
                path: archive_path.to_path_buf(),
                source,
            })?;
        // enclosed_name rejects entries that would escape the destination.
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let out_path = destination.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|source| ArchiveError::Io {
                path: out_path.clone(),
                source,
            })?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|source| ArchiveError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let mut output = File::create(&out_path).map_err(|source| ArchiveError::Io {
                path: out_path.clone(),
                source,
            })?;
            io::copy(&mut entry, &mut output).map_err(|source| ArchiveError::Io {
                path: out_path.clone(),
                source,
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = fs::set_permissions(&out_path, fs::Permissions::from_mode(mode));
            }
        }
    }

    debug!(
        "unpacked {} into {}",
        archive_path.display(),
        destination.display()
    );
    Ok(())
}

fn entry_name(relative: &Path) -> String {
    // Zip entry names always use forward slashes.
    let parts: Vec<_> = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect();
    parts.join("/")
}
