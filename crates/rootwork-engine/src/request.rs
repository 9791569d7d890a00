//! Graph request shape

use rootwork_core::{GraphOptions, TargetRef};
use serde::{Deserialize, Serialize};

/// `target` omitted means global mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    pub bundle_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    /// Ignore any cached global graph.
    #[serde(default)]
    pub force: bool,
    /// Falls back to the engine's configured limits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<GraphOptions>,
}

impl GraphRequest {
    pub fn global(bundle_id: &str) -> Self {
        GraphRequest {
            bundle_id: bundle_id.to_string(),
            target: None,
            force: false,
            options: None,
        }
    }

    pub fn targeted(bundle_id: &str, file: &str, symbol: Option<&str>) -> Self {
        GraphRequest {
            target: Some(TargetRef {
                file: file.to_string(),
                symbol: symbol.map(str::to_string),
            }),
            ..GraphRequest::global(bundle_id)
        }
    }

    pub fn with_options(mut self, options: GraphOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn forced(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}
