//! Deterministic evidence identities and source citations

use sha2::{Digest, Sha256};

use crate::model::{EdgeType, EvidenceItem, EvidenceKind, Method, SourceRange, SourceRef};

/// Snippets longer than this are cut, counted in chars.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Length of the hex prefix kept from the evidence digest.
pub const EVIDENCE_ID_LEN: usize = 24;

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Collapse whitespace runs to single spaces and clamp to [`SNIPPET_MAX_CHARS`].
pub fn clamp_snippet(line: &str) -> String {
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => collapsed[..cut].to_string(),
        None => collapsed,
    }
}

/// Hash over `[type, from, to, ...discriminators]`, truncated to [`EVIDENCE_ID_LEN`].
///
/// Same inputs always yield the same id, which is what makes edges diffable
/// across runs.
pub fn evidence_id(edge_type: EdgeType, from: &str, to: &str, discriminators: &[String]) -> String {
    let mut parts: Vec<&str> = vec![edge_type.as_str(), from, to];
    parts.extend(discriminators.iter().map(String::as_str));
    // A JSON array keeps part boundaries unambiguous ("a|b" + "c" vs "a" + "b|c").
    let payload = serde_json::to_string(&parts).unwrap_or_else(|_| parts.join("\u{1f}"));
    let mut digest = sha256_hex(payload.as_bytes());
    digest.truncate(EVIDENCE_ID_LEN);
    digest
}

impl SourceRef {
    /// Cite `range` in `file`, taking the snippet from the declaring line.
    pub fn new(file: &str, range: SourceRange, uri: String, line: &str) -> Self {
        let snippet = clamp_snippet(line);
        let snippet_sha256 = sha256_hex(snippet.as_bytes());
        SourceRef {
            file: file.to_string(),
            range,
            uri,
            snippet,
            snippet_sha256,
        }
    }

    /// The location parts that go into an evidence id.
    pub fn discriminators(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            self.range.start_line.to_string(),
            self.range.start_col.to_string(),
        ]
    }
}

impl EvidenceItem {
    pub fn edge(
        edge_type: EdgeType,
        from: &str,
        to: &str,
        method: Method,
        confidence: f64,
        source: SourceRef,
    ) -> Self {
        let evidence_id = evidence_id(edge_type, from, to, &source.discriminators());
        EvidenceItem {
            evidence_id,
            kind: EvidenceKind::Edge,
            edge_type,
            from: from.to_string(),
            to: to.to_string(),
            method,
            confidence: confidence.clamp(0.0, 1.0),
            sources: vec![source],
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
