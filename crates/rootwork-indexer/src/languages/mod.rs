//! Module resolvers for the supported languages
//!
//! Each resolver maps `(importer, specifier)` onto a file that exists in the
//! [`PathIndex`], or gives up. None of them guess.

pub mod ecmascript;
pub mod go;
pub mod java;
pub mod python;
pub mod rust;

use std::collections::HashMap;

use crate::path_index::PathIndex;
use crate::paths::extension;

/// Extensions the walker and the global scanner treat as code.
pub const CODE_EXTENSIONS: &[&str] = &[
    "ts", "tsx", "js", "jsx", "mjs", "cjs", "mts", "cts", "py", "pyi", "go", "rs", "java",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    EcmaScript,
    Python,
    Go,
    Rust,
    Java,
}

impl SourceLanguage {
    /// Pick the language from a path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        match extension(path)? {
            "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" | "mts" | "cts" => {
                Some(SourceLanguage::EcmaScript)
            }
            "py" | "pyi" => Some(SourceLanguage::Python),
            "go" => Some(SourceLanguage::Go),
            "rs" => Some(SourceLanguage::Rust),
            "java" => Some(SourceLanguage::Java),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLanguage::EcmaScript => "ecmascript",
            SourceLanguage::Python => "python",
            SourceLanguage::Go => "go",
            SourceLanguage::Rust => "rust",
            SourceLanguage::Java => "java",
        }
    }

    /// Resolve `specifier` as written in `importer`, memoized in `ctx`.
    pub fn resolve(
        &self,
        importer: &str,
        specifier: &str,
        index: &PathIndex,
        ctx: &mut ResolveContext,
    ) -> Option<String> {
        let key = (importer.to_string(), specifier.to_string());
        if let Some(hit) = ctx.resolved.get(&key) {
            return hit.clone();
        }
        let resolved = match self {
            SourceLanguage::EcmaScript => ecmascript::resolve(importer, specifier, index),
            SourceLanguage::Python => python::resolve(importer, specifier, index),
            SourceLanguage::Go => go::resolve(importer, specifier, index, ctx),
            SourceLanguage::Rust => rust::resolve(importer, specifier, index, ctx),
            SourceLanguage::Java => java::resolve(importer, specifier, index),
        };
        tracing::debug!(
            "{} resolve {} from {} -> {:?}",
            self.as_str(),
            specifier,
            importer,
            resolved
        );
        ctx.resolved.insert(key, resolved.clone());
        resolved
    }
}

/// Nearest `go.mod` above a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModuleRoot {
    pub dir: String,
    pub module: String,
}

/// Memoization scoped to one request and one repository.
///
/// Never shared between requests; create a fresh one per repository.
#[derive(Debug, Default)]
pub struct ResolveContext {
    resolved: HashMap<(String, String), Option<String>>,
    go_roots: HashMap<String, Option<GoModuleRoot>>,
    crate_roots: HashMap<String, Option<String>>,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memoized(&self) -> usize {
        self.resolved.len()
    }
}
