//! Copy and listing primitives
//!
//! Symbolic links are never followed: they are listed, copied and removed as
//! links. Every failure carries the path it happened at.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use filetime::FileTime;

use crate::text::{self, LineEnding};
use crate::{Error, RelativePath, Result};

/// Kind of a filesystem entry, determined without following links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
    Symlink,
}

/// Inspect `path` without following a final symbolic link.
///
/// Returns `None` when nothing exists at `path`.
pub fn entry_type(path: &Path) -> Result<Option<EntryType>> {
    match fs::symlink_metadata(path) {
        Ok(meta) => {
            let file_type = meta.file_type();
            Ok(Some(if file_type.is_symlink() {
                EntryType::Symlink
            } else if file_type.is_dir() {
                EntryType::Directory
            } else {
                EntryType::File
            }))
        }
        // A parent that became a file also means the entry is gone
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Kind of `path` beneath `root`, resolved one component at a time.
///
/// An entry reachable only through a link or a file is absent, so the
/// result never describes something outside the tree rooted at `root`.
pub fn entry_type_beneath(root: &Path, path: &RelativePath) -> Result<Option<EntryType>> {
    let mut current = root.to_path_buf();
    let mut components = path.components().peekable();
    while let Some(name) = components.next() {
        current.push(name);
        let kind = entry_type(&current)?;
        if components.peek().is_none() {
            return Ok(kind);
        }
        if kind != Some(EntryType::Directory) {
            return Ok(None);
        }
    }
    entry_type(root)
}

/// List the entry names of `dir`, sorted.
///
/// A missing directory lists as empty.
pub fn list_names(dir: &Path) -> Result<BTreeSet<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut names = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| Error::InvalidFileName { path: entry.path() })?;
        names.insert(name);
    }
    Ok(names)
}

/// Create `dir` (and missing parents). Returns whether it was created.
///
/// A non-directory entry in the way is replaced.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    match entry_type(dir)? {
        Some(EntryType::Directory) => return Ok(false),
        Some(_) => remove_entry(dir)?,
        None => {}
    }
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    Ok(true)
}

/// Remove whatever is at `path`: a file, a link (not its target) or a
/// directory tree. Missing entries are ignored.
pub fn remove_entry(path: &Path) -> Result<()> {
    match entry_type(path)? {
        Some(EntryType::Directory) => fs::remove_dir_all(path).map_err(|e| Error::io(path, e)),
        Some(_) => fs::remove_file(path).map_err(|e| Error::io(path, e)),
        None => Ok(()),
    }
}

/// Byte-for-byte copy. Returns the destination size.
pub fn copy_file(source: &Path, destination: &Path) -> Result<u64> {
    clear_for_file(destination)?;
    fs::copy(source, destination).map_err(|e| Error::io(destination, e))
}

/// Copy text content, rewriting every line break as `ending`.
///
/// Returns the destination size.
pub fn copy_normalized(source: &Path, destination: &Path, ending: LineEnding) -> Result<u64> {
    let content = fs::read(source).map_err(|e| Error::io(source, e))?;
    let normalized = text::normalize_newlines(&content, ending);
    clear_for_file(destination)?;
    fs::write(destination, &normalized).map_err(|e| Error::io(destination, e))?;
    Ok(normalized.len() as u64)
}

/// Copy a symbolic link itself, replacing whatever is at `destination`.
///
/// The link target is preserved verbatim. Timestamps are carried over where
/// the platform allows it.
pub fn copy_symlink(source: &Path, destination: &Path) -> Result<()> {
    let target = fs::read_link(source).map_err(|e| Error::io(source, e))?;
    remove_entry(destination)?;
    create_symlink(source, &target, destination)?;

    let meta = fs::symlink_metadata(source).map_err(|e| Error::io(source, e))?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    if let Err(e) = filetime::set_symlink_file_times(destination, atime, mtime) {
        tracing::debug!(path = %destination.display(), error = %e, "Could not preserve link timestamps");
    }
    Ok(())
}

#[cfg(unix)]
fn create_symlink(_source: &Path, target: &Path, destination: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, destination).map_err(|e| Error::io(destination, e))
}

#[cfg(windows)]
fn create_symlink(source: &Path, target: &Path, destination: &Path) -> Result<()> {
    let result = if source.is_dir() {
        std::os::windows::fs::symlink_dir(target, destination)
    } else {
        std::os::windows::fs::symlink_file(target, destination)
    };
    result.map_err(|e| Error::io(destination, e))
}

/// Make room for a regular file: links and directories in the way would
/// otherwise be written through or refuse the copy.
fn clear_for_file(destination: &Path) -> Result<()> {
    match entry_type(destination)? {
        Some(EntryType::Directory | EntryType::Symlink) => remove_entry(destination),
        _ => Ok(()),
    }
}

/// Write content atomically using write-to-temp-then-rename.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))
}

/// Size in bytes of the file at `path`, following links.
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| Error::io(path, e))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
