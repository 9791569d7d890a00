//! Per-repository lookup structures: the known file set, a suffix index and
//! the `go.mod` module table

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::languages::go::parse_module_directive;
use crate::paths::file_name;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SuffixEntry {
    Unique(String),
    Ambiguous,
}

/// Outcome of a suffix lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixMatch<'a> {
    Unique(&'a str),
    /// Two or more files end with the suffix; not a resolution.
    Ambiguous,
    Missing,
}

/// Read-only view of one repository's file set. Built once per request.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    files: BTreeSet<String>,
    suffixes: HashMap<String, SuffixEntry>,
    /// Directory holding a `go.mod` -> declared module path.
    go_modules: BTreeMap<String, String>,
}

impl PathIndex {
    pub fn builder() -> PathIndexBuilder {
        PathIndexBuilder::default()
    }

    /// Index without any `go.mod` contents.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = PathIndex::builder();
        for path in paths {
            builder.add_file(path.as_ref());
        }
        builder.build()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All files in lexicographic order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Look up the single file whose trailing segments equal `suffix`.
    pub fn lookup_suffix(&self, suffix: &str) -> SuffixMatch<'_> {
        match self.suffixes.get(suffix) {
            Some(SuffixEntry::Unique(path)) => SuffixMatch::Unique(path),
            Some(SuffixEntry::Ambiguous) => SuffixMatch::Ambiguous,
            None => SuffixMatch::Missing,
        }
    }

    /// Direct children of `dir` (files only), lexicographic.
    pub fn files_in_dir(&self, dir: &str) -> Vec<&str> {
        if dir.is_empty() {
            return self
                .files
                .iter()
                .filter(|f| !f.contains('/'))
                .map(String::as_str)
                .collect();
        }
        let prefix = format!("{dir}/");
        self.files
            .range(prefix.clone()..)
            .take_while(|f| f.starts_with(&prefix))
            .filter(|f| !f[prefix.len()..].contains('/'))
            .map(String::as_str)
            .collect()
    }

    /// Module path declared by `<dir>/go.mod`, if the file was indexed with content.
    pub fn go_module(&self, dir: &str) -> Option<&str> {
        self.go_modules.get(dir).map(String::as_str)
    }

    pub fn go_module_count(&self) -> usize {
        self.go_modules.len()
    }
}

#[derive(Debug, Default)]
pub struct PathIndexBuilder {
    files: BTreeSet<String>,
    go_modules: BTreeMap<String, String>,
}

impl PathIndexBuilder {
    pub fn add_file(&mut self, path: &str) -> &mut Self {
        let path = path.trim_start_matches("./");
        if !path.is_empty() {
            self.files.insert(path.to_string());
        }
        self
    }

    /// Record a `go.mod` found at `path` together with its contents.
    pub fn add_go_mod(&mut self, path: &str, content: &str) -> &mut Self {
        self.add_file(path);
        if file_name(path) != "go.mod" {
            return self;
        }
        match parse_module_directive(content) {
            Some(module) => {
                let dir = crate::paths::parent_dir(path).to_string();
                tracing::debug!("go.mod at '{}' declares module {}", dir, module);
                self.go_modules.insert(dir, module);
            }
            None => tracing::debug!("go.mod at {} has no module directive", path),
        }
        self
    }

    pub fn build(self) -> PathIndex {
        let mut suffixes: HashMap<String, SuffixEntry> = HashMap::new();
        for path in &self.files {
            let mut start = 0;
            loop {
                let suffix = &path[start..];
                suffixes
                    .entry(suffix.to_string())
                    .and_modify(|entry| {
                        if *entry != SuffixEntry::Unique(path.clone()) {
                            *entry = SuffixEntry::Ambiguous;
                        }
                    })
                    .or_insert_with(|| SuffixEntry::Unique(path.clone()));
                match suffix.find('/') {
                    Some(i) => start += i + 1,
                    None => break,
                }
            }
        }
        PathIndex {
            files: self.files,
            suffixes,
            go_modules: self.go_modules,
        }
    }
}
