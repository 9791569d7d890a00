//! Python module resolution

use crate::path_index::PathIndex;
use crate::paths::{join, parent_dir};

pub fn resolve(importer: &str, specifier: &str, index: &PathIndex) -> Option<String> {
    let specifier = specifier.trim();
    if specifier.is_empty() {
        return None;
    }
    if specifier.starts_with('.') {
        resolve_relative(importer, specifier, index)
    } else {
        resolve_absolute(importer, specifier, index)
    }
}

/// `from ..pkg import x`: one leading dot is the importer's package, each
/// extra dot climbs one directory.
fn resolve_relative(importer: &str, specifier: &str, index: &PathIndex) -> Option<String> {
    let dots = specifier.chars().take_while(|c| *c == '.').count();
    let mut base = parent_dir(importer);
    for _ in 1..dots {
        if base.is_empty() {
            return None;
        }
        base = parent_dir(base);
    }
    let rest = &specifier[dots..];
    if rest.is_empty() {
        let init = join(base, "__init__.py");
        return index.contains(&init).then_some(init);
    }
    probe(base, &module_path(rest), index)
}

/// Roots tried in order; a match under a root derived from the importer wins,
/// several matches under unrelated roots are ambiguous.
fn resolve_absolute(importer: &str, specifier: &str, index: &PathIndex) -> Option<String> {
    let rel = module_path(specifier);
    let head = specifier.split('.').next().unwrap_or_default();

    let mut roots: Vec<(&str, bool)> = Vec::new();
    if importer.starts_with("src/") {
        roots.push(("src", true));
    }
    if let Some((top, _)) = importer.split_once('/') {
        if top != head && top != "src" {
            roots.push((top, true));
        }
    }
    roots.push(("", false));
    if !roots.iter().any(|(r, _)| *r == "src") {
        roots.push(("src", false));
    }

    let matches: Vec<(String, bool)> = roots
        .iter()
        .filter_map(|(root, preferred)| probe(root, &rel, index).map(|hit| (hit, *preferred)))
        .collect();

    match matches.as_slice() {
        [] => None,
        [(only, _)] => Some(only.clone()),
        [(first, true), ..] => Some(first.clone()),
        _ => {
            tracing::debug!(
                "Python import {} from {} is ambiguous across {} roots",
                specifier,
                importer,
                matches.len()
            );
            None
        }
    }
}

fn module_path(dotted: &str) -> String {
    dotted.split('.').collect::<Vec<_>>().join("/")
}

/// `<root>/<path>.py` then `<root>/<path>/__init__.py`.
fn probe(root: &str, rel: &str, index: &PathIndex) -> Option<String> {
    let base = join(root, rel);
    [format!("{base}.py"), format!("{base}/__init__.py")]
        .into_iter()
        .find(|c| index.contains(c))
}
