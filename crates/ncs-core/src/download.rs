//! Archive download and extraction for server releases and app packages.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tempfile::NamedTempFile;
use zip::ZipArchive;

use crate::error::{NcsError, NcsResult, io_error};

/// Archive container format, detected from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArchiveKind {
    Zip,
    Tar { gzip: bool },
}

impl ArchiveKind {
    fn for_name(name: &str) -> Option<ArchiveKind> {
        let name = name.to_lowercase();
        if name.ends_with(".zip") {
            return Some(ArchiveKind::Zip);
        }
        if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
            return Some(ArchiveKind::Tar { gzip: true });
        }
        if name.ends_with(".tar") {
            return Some(ArchiveKind::Tar { gzip: false });
        }
        None
    }

    pub(crate) fn for_path(path: &Path) -> NcsResult<ArchiveKind> {
        path.file_name()
            .and_then(|name| ArchiveKind::for_name(&name.to_string_lossy()))
            .ok_or_else(|| NcsError::UnsupportedArchive {
                path: path.to_path_buf(),
                reason: "expected a .zip, .tar.gz, .tgz or .tar name".to_string(),
            })
    }

    pub(crate) fn for_url(url: &str) -> NcsResult<ArchiveKind> {
        let trimmed = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .trim_end_matches('/');
        let name = trimmed.rsplit('/').next().unwrap_or(trimmed);
        ArchiveKind::for_name(name).ok_or_else(|| NcsError::UnsupportedArchive {
            path: PathBuf::from(url),
            reason: "expected a .zip, .tar.gz, .tgz or .tar name".to_string(),
        })
    }
}

/// Refuse to touch a directory that already has entries.
pub(crate) fn ensure_empty(dir: &Path) -> NcsResult<()> {
    let mut entries = fs::read_dir(dir).map_err(|err| io_error(dir, err))?;
    if entries.next().is_some() {
        return Err(NcsError::DirectoryNotEmpty {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Fetch `url` into a temporary file on the local filesystem.
pub(crate) fn fetch_archive(url: &str) -> NcsResult<NamedTempFile> {
    tracing::info!(url, "downloading archive");
    let mut response = reqwest::blocking::get(url)?.error_for_status()?;
    let mut file =
        NamedTempFile::new().map_err(|err| io_error(std::env::temp_dir(), err))?;
    response.copy_to(file.as_file_mut())?;
    Ok(file)
}

/// Unpack `archive` into `dest`, returning the set of top-level entry names
/// seen in the archive.
///
/// With `strip_root` the leading path component of every entry is dropped,
/// which turns a `nextcloud/`-rooted release archive into the installation
/// directory layout. App packages keep their root directory: its name is the
/// app id.
pub(crate) fn extract_archive(
    archive: &Path,
    kind: ArchiveKind,
    dest: &Path,
    strip_root: bool,
) -> NcsResult<BTreeSet<String>> {
    fs::create_dir_all(dest).map_err(|err| io_error(dest, err))?;
    let mut roots = BTreeSet::new();
    match kind {
        ArchiveKind::Zip => extract_zip(archive, dest, strip_root, &mut roots)?,
        ArchiveKind::Tar { gzip } => extract_tar(archive, dest, gzip, strip_root, &mut roots)?,
    }
    Ok(roots)
}

fn extract_zip(
    archive: &Path,
    dest: &Path,
    strip_root: bool,
    roots: &mut BTreeSet<String>,
) -> NcsResult<()> {
    let file = File::open(archive).map_err(|err| io_error(archive, err))?;
    let mut zip = ZipArchive::new(file)?;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let raw = entry.name().replace('\\', "/");
        let Some(rel) = entry_destination(&raw, strip_root, roots)? else {
            continue;
        };
        let out = dest.join(&rel);
        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(|err| io_error(&out, err))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
        let mut out_file = File::create(&out).map_err(|err| io_error(&out, err))?;
        io::copy(&mut entry, &mut out_file).map_err(|err| io_error(&out, err))?;
    }
    Ok(())
}

fn extract_tar(
    archive: &Path,
    dest: &Path,
    gzip: bool,
    strip_root: bool,
    roots: &mut BTreeSet<String>,
) -> NcsResult<()> {
    let file = File::open(archive).map_err(|err| io_error(archive, err))?;
    let reader: Box<dyn Read> = if gzip {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let mut tar = Archive::new(reader);
    for entry in tar.entries().map_err(|err| io_error(archive, err))? {
        let mut entry = entry.map_err(|err| io_error(archive, err))?;
        let raw = entry
            .path()
            .map_err(|err| io_error(archive, err))?
            .to_string_lossy()
            .into_owned();
        let Some(rel) = entry_destination(&raw, strip_root, roots)? else {
            continue;
        };
        let out = dest.join(&rel);
        if entry.header().entry_type().is_dir() {
            fs::create_dir_all(&out).map_err(|err| io_error(&out, err))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
        }
        entry.unpack(&out).map_err(|err| io_error(&out, err))?;
    }
    Ok(())
}

/// Sanitize one entry path, record its top-level component, and resolve
/// where it lands under the destination. `None` means the entry maps to the
/// destination root itself and carries no content.
fn entry_destination(
    raw: &str,
    strip_root: bool,
    roots: &mut BTreeSet<String>,
) -> NcsResult<Option<PathBuf>> {
    let mut parts: Vec<String> = Vec::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => {
                return Err(NcsError::ArchiveEntryEscapes {
                    entry: raw.to_string(),
                });
            }
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
        }
    }
    let Some(first) = parts.first() else {
        return Ok(None);
    };
    roots.insert(first.clone());
    let kept = if strip_root { &parts[1..] } else { &parts[..] };
    if kept.is_empty() {
        return Ok(None);
    }
    Ok(Some(kept.iter().collect()))
}
