//! Import extraction adapter: syntax-aware parser first, regex fallback second

use std::sync::Arc;

use rootwork_core::{Method, SourceRange};

use crate::heuristics;

/// Confidence of imports read off a syntax tree.
pub const PARSER_CONFIDENCE: f64 = 0.9;

/// Confidence of imports matched line-by-line.
pub const HEURISTIC_CONFIDENCE: f64 = 0.6;

/// A module specifier as written, with the span of its literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    pub module: String,
    pub range: SourceRange,
}

impl ModuleReference {
    pub fn new(module: impl Into<String>, range: SourceRange) -> Self {
        ModuleReference {
            module: module.into(),
            range,
        }
    }
}

/// A module reference tagged with how it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImport {
    pub module: String,
    pub range: SourceRange,
    pub method: Method,
    pub confidence: f64,
}

/// Syntax-aware import extraction.
///
/// `Ok(None)` means the parser has nothing to say about this file (unknown
/// language, unusable tree); callers fall back to heuristics.
#[async_trait::async_trait]
pub trait ModuleParser: Send + Sync {
    async fn extract_module_references(
        &self,
        path: &str,
        content: &str,
    ) -> anyhow::Result<Option<Vec<ModuleReference>>>;
}

/// Imports of one file, plus whether the regex fallback produced them.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub imports: Vec<ExtractedImport>,
    pub fell_back: bool,
}

#[derive(Clone)]
pub struct ImportExtractor {
    parser: Option<Arc<dyn ModuleParser>>,
}

impl ImportExtractor {
    pub fn new(parser: Arc<dyn ModuleParser>) -> Self {
        ImportExtractor {
            parser: Some(parser),
        }
    }

    /// Regex extraction only.
    pub fn heuristic_only() -> Self {
        ImportExtractor { parser: None }
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    pub async fn extract(&self, path: &str, content: &str) -> Extraction {
        if let Some(parser) = &self.parser {
            match parser.extract_module_references(path, content).await {
                Ok(Some(refs)) => {
                    return Extraction {
                        imports: tag(refs, Method::Exact, PARSER_CONFIDENCE),
                        fell_back: false,
                    };
                }
                Ok(None) => tracing::debug!("Parser declined {}, using heuristics", path),
                Err(e) => tracing::warn!("Parser failed on {}: {:#}, using heuristics", path, e),
            }
        }
        Extraction {
            imports: tag(
                heuristics::extract_module_references(path, content),
                Method::Heuristic,
                HEURISTIC_CONFIDENCE,
            ),
            fell_back: true,
        }
    }
}

fn tag(refs: Vec<ModuleReference>, method: Method, confidence: f64) -> Vec<ExtractedImport> {
    refs.into_iter()
        .map(|r| ExtractedImport {
            module: r.module,
            range: r.range,
            method,
            confidence,
        })
        .collect()
}
