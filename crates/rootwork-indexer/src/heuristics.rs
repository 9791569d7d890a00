//! Line-based import extraction used when no syntax tree is available

use once_cell::sync::Lazy;
use regex::Regex;
use rootwork_core::SourceRange;

use crate::extractor::ModuleReference;
use crate::languages::SourceLanguage;

static ES_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\b(?:import|export)\b|^\s*\})[^'"]*?\bfrom\s*['"]([^'"]+)['"]"#).expect("invalid import regex")
});
static ES_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s*['"]([^'"]+)['"]"#).expect("invalid import regex")
});
static ES_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("invalid import regex")
});

static PY_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+(\.*[\w.]*)\s+import\b").expect("invalid import regex")
});
static PY_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(.+)$").expect("invalid import regex")
});
static PY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.]+").expect("invalid import regex")
});

static GO_SINGLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*import\s+(?:[\w.]+\s+)?"([^"]+)""#).expect("invalid import regex")
});
static GO_BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s*\(").expect("invalid import regex")
});
static GO_BLOCK_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(?:[\w.]+\s+)?"([^"]+)""#).expect("invalid import regex")
});

static RS_USE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+([^;]+?)(?:\s+as\s+\w+)?\s*;").expect("invalid import regex")
});
static RS_MOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?mod\s+(\w+)\s*;").expect("invalid import regex")
});

static JAVA_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").expect("invalid import regex")
});

/// Extract module references from `content` by matching each line.
pub fn extract_module_references(path: &str, content: &str) -> Vec<ModuleReference> {
    let Some(language) = SourceLanguage::from_path(path) else {
        return Vec::new();
    };
    let mut refs = Vec::new();
    let mut in_go_block = false;

    for (i, line) in content.lines().enumerate() {
        let line_no = i as u32 + 1;
        match language {
            SourceLanguage::EcmaScript => {
                for re in [&*ES_FROM, &*ES_BARE, &*ES_CALL] {
                    for caps in re.captures_iter(line) {
                        push_capture(&mut refs, line_no, &caps, None);
                    }
                }
            }
            SourceLanguage::Python => {
                if let Some(caps) = PY_FROM.captures(line) {
                    push_capture(&mut refs, line_no, &caps, None);
                } else if let Some(caps) = PY_IMPORT.captures(line) {
                    if let Some(list) = caps.get(1) {
                        // `import a.b as c, d` -> a.b, d
                        let mut offset = list.start();
                        for item in list.as_str().split(',') {
                            if let Some(name) = PY_NAME.find(item) {
                                let col = (offset + name.start()) as u32 + 1;
                                refs.push(ModuleReference::new(
                                    name.as_str(),
                                    SourceRange::on_line(line_no, col, name.as_str().len() as u32),
                                ));
                            }
                            offset += item.len() + 1;
                        }
                    }
                }
            }
            SourceLanguage::Go => {
                if in_go_block {
                    if line.trim_start().starts_with(')') {
                        in_go_block = false;
                    } else if let Some(caps) = GO_BLOCK_SPEC.captures(line) {
                        push_capture(&mut refs, line_no, &caps, None);
                    }
                } else if GO_BLOCK_START.is_match(line) {
                    in_go_block = true;
                } else if let Some(caps) = GO_SINGLE.captures(line) {
                    push_capture(&mut refs, line_no, &caps, None);
                }
            }
            SourceLanguage::Rust => {
                if let Some(caps) = RS_USE.captures(line) {
                    push_capture(&mut refs, line_no, &caps, None);
                } else if let Some(caps) = RS_MOD.captures(line) {
                    push_capture(&mut refs, line_no, &caps, Some("self::"));
                }
            }
            SourceLanguage::Java => {
                if let Some(caps) = JAVA_IMPORT.captures(line) {
                    push_capture(&mut refs, line_no, &caps, None);
                }
            }
        }
    }
    refs.sort_by_key(|r| (r.range.start_line, r.range.start_col));
    refs.dedup();
    refs
}

fn push_capture(
    refs: &mut Vec<ModuleReference>,
    line_no: u32,
    caps: &regex::Captures<'_>,
    prefix: Option<&str>,
) {
    let Some(m) = caps.get(1) else {
        return;
    };
    let module = match prefix {
        Some(prefix) => format!("{prefix}{}", m.as_str()),
        None => m.as_str().to_string(),
    };
    refs.push(ModuleReference::new(
        module,
        SourceRange::on_line(line_no, m.start() as u32 + 1, m.as_str().len() as u32),
    ));
}
