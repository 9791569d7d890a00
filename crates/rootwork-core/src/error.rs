//! Hard failures surfaced to callers
//!
//! Everything recoverable (parser failures, search caps, cache I/O, budget
//! exhaustion) becomes a warning on the result instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error(
        "target file `{path}` looks like an absolute filesystem path; \
         pass a bundle-relative path such as repos/<owner>/<repo>/norm/<path>"
    )]
    AbsolutePath { path: String },

    #[error(
        "target file `{path}` is well-formed but does not exist in bundle `{bundle_id}`; \
         check the owner/repo segments and the path under norm/"
    )]
    TargetNotFound { bundle_id: String, path: String },

    #[error(
        "target file `{path}` is not a recognized bundle-relative path; \
         expected repos/<owner>/<repo>/norm/<path>"
    )]
    UnrecognizedPath { path: String },

    #[error("target file `{path}` could not be read")]
    TargetUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("bundle `{0}` not found")]
    BundleNotFound(String),
}

impl GraphError {
    /// Stable code for programmatic branching.
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::AbsolutePath { .. } => "ABSOLUTE_PATH",
            GraphError::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            GraphError::UnrecognizedPath { .. } => "UNRECOGNIZED_PATH",
            GraphError::TargetUnreadable { .. } => "TARGET_UNREADABLE",
            GraphError::InvalidRequest(_) => "INVALID_REQUEST",
            GraphError::BundleNotFound(_) => "BUNDLE_NOT_FOUND",
        }
    }
}
