//! Content tree builders.

use std::fs;
use std::path::Path;

/// Write `files` (forward-slash relative path, content) under `root`.
///
/// A path ending in `/` creates an empty directory.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let native = path
            .split('/')
            .filter(|c| !c.is_empty())
            .fold(root.to_path_buf(), |acc, c| acc.join(c));
        if path.ends_with('/') {
            fs::create_dir_all(&native)
                .unwrap_or_else(|e| panic!("write_tree: failed to create {path}: {e}"));
            continue;
        }
        if let Some(parent) = native.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("write_tree: failed to create parent of {path}: {e}"));
        }
        fs::write(&native, content)
            .unwrap_or_else(|e| panic!("write_tree: failed to write {path}: {e}"));
    }
}

/// List every entry under `root` as sorted forward-slash relative paths,
/// directories included. Entries named in `skip` are not listed or entered.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn list_tree(root: &Path, skip: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    collect(root, "", skip, &mut out);
    out.sort();
    out
}

fn collect(dir: &Path, prefix: &str, skip: &[&str], out: &mut Vec<String>) {
    let entries =
        fs::read_dir(dir).unwrap_or_else(|e| panic!("list_tree: failed to read {}: {e}", dir.display()));
    for entry in entries {
        let entry = entry.unwrap_or_else(|e| panic!("list_tree: bad entry: {e}"));
        let name = entry.file_name().to_string_lossy().into_owned();
        if skip.contains(&name.as_str()) {
            continue;
        }
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let file_type = entry
            .file_type()
            .unwrap_or_else(|e| panic!("list_tree: no file type for {relative}: {e}"));
        if file_type.is_dir() {
            collect(&entry.path(), &relative, skip, out);
        }
        out.push(relative);
    }
}
