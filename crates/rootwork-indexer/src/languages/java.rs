//! Java fully-qualified imports, looked up through the suffix index

use crate::path_index::{PathIndex, SuffixMatch};

pub fn resolve(_importer: &str, specifier: &str, index: &PathIndex) -> Option<String> {
    let name = specifier.trim().trim_start_matches("static ").trim();
    if name.is_empty() || name.ends_with('*') {
        return None;
    }
    let segments: Vec<&str> = name.split('.').collect();
    match lookup(&segments, index) {
        Lookup::Found(path) => Some(path),
        Lookup::Ambiguous => None,
        // Static member or nested type: retry with the owning class.
        Lookup::Missing if segments.len() > 1 => match lookup(&segments[..segments.len() - 1], index) {
            Lookup::Found(path) => Some(path),
            _ => None,
        },
        Lookup::Missing => None,
    }
}

enum Lookup {
    Found(String),
    Ambiguous,
    Missing,
}

fn lookup(segments: &[&str], index: &PathIndex) -> Lookup {
    let suffix = format!("{}.java", segments.join("/"));
    match index.lookup_suffix(&suffix) {
        SuffixMatch::Unique(path) => Lookup::Found(path.to_string()),
        SuffixMatch::Ambiguous => Lookup::Ambiguous,
        SuffixMatch::Missing => Lookup::Missing,
    }
}
