//! Lazy, sorted walk over a repository's code files

use std::path::Path;

use ignore::{DirEntry, WalkBuilder};

use crate::languages::CODE_EXTENSIONS;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "vendor",
    "dist",
    "build",
    "__pycache__",
];

/// Code files under `root` as repository-relative, forward-slash paths.
///
/// Entries come out in file-name order within each directory and are produced
/// on demand, so a caller that stops early never pays for the rest of the tree.
pub fn code_files(root: &Path) -> impl Iterator<Item = String> + use<> {
    let base = root.to_path_buf();
    build_walker(root)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter(|entry| is_code_file(entry.path()))
        .filter_map(move |entry| relative_path(&base, entry.path()))
}

/// Every file under `root` (any extension), same ordering and skips.
pub fn all_files(root: &Path) -> impl Iterator<Item = String> + use<> {
    let base = root.to_path_buf();
    build_walker(root)
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
        .filter_map(move |entry| relative_path(&base, entry.path()))
}

pub fn is_code_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext))
}

fn build_walker(root: &Path) -> ignore::Walk {
    WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_skipped_dir(entry))
        .build()
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}
