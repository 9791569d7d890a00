//! Rust `use` path resolution relative to the crate root

use super::ResolveContext;
use crate::path_index::PathIndex;
use crate::paths::{file_name, file_stem, join, parent_dir};

const CRATE_ROOTS: &[&str] = &["lib.rs", "main.rs", "src/lib.rs", "src/main.rs"];

/// Closest crate root file at or above `dir`.
pub fn crate_root(dir: &str, index: &PathIndex, ctx: &mut ResolveContext) -> Option<String> {
    if let Some(hit) = ctx.crate_roots.get(dir) {
        return hit.clone();
    }
    let mut current = dir;
    let found = loop {
        if let Some(root) = CRATE_ROOTS
            .iter()
            .map(|candidate| join(current, candidate))
            .find(|candidate| index.contains(candidate))
        {
            break Some(root);
        }
        if current.is_empty() {
            break None;
        }
        current = parent_dir(current);
    };
    ctx.crate_roots.insert(dir.to_string(), found.clone());
    found
}

/// Directory holding the children of the module defined by `file`.
///
/// `lib.rs` and `main.rs` beside the crate root are both crate-root files.
pub fn module_dir(file: &str, root_dir: &str) -> String {
    let is_crate_root =
        matches!(file_name(file), "lib.rs" | "main.rs") && parent_dir(file) == root_dir;
    if is_crate_root || file_name(file) == "mod.rs" {
        parent_dir(file).to_string()
    } else {
        join(parent_dir(file), file_stem(file))
    }
}

pub fn resolve(
    importer: &str,
    specifier: &str,
    index: &PathIndex,
    ctx: &mut ResolveContext,
) -> Option<String> {
    let mut segments = specifier.split("::").map(str::trim).peekable();
    let anchor = *segments.peek()?;
    if !matches!(anchor, "crate" | "self" | "super") {
        return None;
    }
    let root = crate_root(parent_dir(importer), index, ctx)?;
    let root_dir = parent_dir(&root).to_string();

    let mut dir = match anchor {
        "crate" => {
            segments.next();
            root_dir.clone()
        }
        "self" => {
            segments.next();
            module_dir(importer, &root_dir)
        }
        _ => module_dir(importer, &root_dir),
    };
    while segments.peek() == Some(&"super") {
        segments.next();
        if dir == root_dir {
            return None;
        }
        dir = parent_dir(&dir).to_string();
    }

    let mut last = None;
    for segment in segments {
        if !is_identifier(segment) {
            break;
        }
        let hop = [
            join(&dir, &format!("{segment}.rs")),
            join(&dir, &format!("{segment}/mod.rs")),
        ]
        .into_iter()
        .find(|c| index.contains(c));
        match hop {
            Some(file) => {
                last = Some(file);
                dir = join(&dir, segment);
            }
            None => break,
        }
    }
    last
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !matches!(segment, "self" | "super" | "crate")
}
