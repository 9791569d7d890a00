//! Go import resolution against the nearest `go.mod`

use super::{GoModuleRoot, ResolveContext};
use crate::path_index::PathIndex;
use crate::paths::{join, parent_dir};

/// First `module <path>` directive, skipping blanks and `//` comments.
pub fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().map(str::trim).find_map(|line| {
        if line.is_empty() || line.starts_with("//") {
            return None;
        }
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.split("//").next().unwrap_or_default();
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

/// Walk upward from `dir` to the closest directory with an indexed `go.mod`.
pub fn nearest_module(dir: &str, index: &PathIndex, ctx: &mut ResolveContext) -> Option<GoModuleRoot> {
    if let Some(hit) = ctx.go_roots.get(dir) {
        return hit.clone();
    }
    let mut current = dir;
    let found = loop {
        if let Some(module) = index.go_module(current) {
            break Some(GoModuleRoot {
                dir: current.to_string(),
                module: module.to_string(),
            });
        }
        if current.is_empty() {
            break None;
        }
        current = parent_dir(current);
    };
    ctx.go_roots.insert(dir.to_string(), found.clone());
    found
}

/// In-module imports map to a package directory; the package is represented
/// by its first non-test file, or its first test file when it only has tests.
pub fn resolve(
    importer: &str,
    specifier: &str,
    index: &PathIndex,
    ctx: &mut ResolveContext,
) -> Option<String> {
    let specifier = specifier.trim().trim_matches('"');
    let root = nearest_module(parent_dir(importer), index, ctx)?;
    let sub = if specifier == root.module {
        ""
    } else {
        specifier
            .strip_prefix(root.module.as_str())?
            .strip_prefix('/')?
    };
    representative_file(index, &join(&root.dir, sub))
}

pub fn representative_file(index: &PathIndex, dir: &str) -> Option<String> {
    let go_files: Vec<&str> = index
        .files_in_dir(dir)
        .into_iter()
        .filter(|f| f.ends_with(".go"))
        .collect();
    go_files
        .iter()
        .find(|f| !f.ends_with("_test.go"))
        .or_else(|| go_files.first())
        .map(|f| f.to_string())
}
