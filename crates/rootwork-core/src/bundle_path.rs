//! Bundle-relative path grammar: `repos/{owner}/{repo}/norm/{path...}`

use std::fmt;

use crate::error::GraphError;

const REPOS: &str = "repos";
const NORM: &str = "norm";

/// A parsed bundle-relative file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundlePath {
    pub owner: String,
    pub repo: String,
    /// Path inside the repository's normalized tree, forward slashes.
    pub rel_path: String,
}

impl BundlePath {
    pub fn new(owner: &str, repo: &str, rel_path: &str) -> Self {
        BundlePath {
            owner: owner.to_string(),
            repo: repo.to_string(),
            rel_path: rel_path.to_string(),
        }
    }

    /// Parse a caller-supplied path, classifying failures.
    pub fn parse(raw: &str) -> Result<Self, GraphError> {
        let trimmed = raw.trim();
        if looks_absolute(trimmed) {
            return Err(GraphError::AbsolutePath {
                path: raw.to_string(),
            });
        }
        let unrecognized = || GraphError::UnrecognizedPath {
            path: raw.to_string(),
        };
        if trimmed.contains('\\') {
            return Err(unrecognized());
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() < 5 || segments[0] != REPOS || segments[3] != NORM {
            return Err(unrecognized());
        }
        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(unrecognized());
        }

        Ok(BundlePath {
            owner: segments[1].to_string(),
            repo: segments[2].to_string(),
            rel_path: segments[4..].join("/"),
        })
    }

    /// `owner/repo`
    pub fn repo_key(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Sibling path in the same repository.
    pub fn with_rel_path(&self, rel_path: &str) -> Self {
        BundlePath::new(&self.owner, &self.repo, rel_path)
    }
}

impl fmt::Display for BundlePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{REPOS}/{}/{}/{NORM}/{}",
            self.owner, self.repo, self.rel_path
        )
    }
}

/// True for POSIX roots, UNC/backslash roots, drive letters, home and file URLs.
pub fn looks_absolute(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let drive_letter = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    raw.starts_with('/')
        || raw.starts_with('\\')
        || raw.starts_with("~/")
        || raw.starts_with("file://")
        || drive_letter
}
