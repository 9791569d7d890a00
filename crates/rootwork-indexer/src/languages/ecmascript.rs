//! ECMAScript-family resolution (`.ts .tsx .js .jsx .mjs .cjs`)

use crate::path_index::PathIndex;
use crate::paths::{extension, join, normalize, parent_dir};

/// Probe order for extensionless specifiers.
const PROBE_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs"];

/// Only `.` and `/` specifiers are local; bare ones are packages.
pub fn resolve(importer: &str, specifier: &str, index: &PathIndex) -> Option<String> {
    let base = match specifier.strip_prefix('/') {
        Some(rooted) => normalize(rooted)?,
        None if specifier.starts_with('.') => normalize(&join(parent_dir(importer), specifier))?,
        None => return None,
    };
    candidates(&base).into_iter().find(|c| index.contains(c))
}

/// Ordered probe list for a normalized base path.
///
/// A base with any extension is tried verbatim first; the extension probes
/// still follow so dotted stems such as `user.service` resolve.
pub fn candidates(base: &str) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(ext) = extension(base) {
        let stem = &base[..base.len() - ext.len() - 1];
        out.push(base.to_string());
        let siblings: &[&str] = match ext {
            "js" | "mjs" | "cjs" => &["ts", "tsx", "jsx"],
            "jsx" => &["tsx", "ts"],
            _ => &[],
        };
        out.extend(siblings.iter().map(|s| format!("{stem}.{s}")));
    }
    if !base.is_empty() {
        out.extend(PROBE_EXTENSIONS.iter().map(|ext| format!("{base}{ext}")));
    }
    out.extend(
        PROBE_EXTENSIONS
            .iter()
            .map(|ext| join(base, &format!("index{ext}"))),
    );
    out
}
