//! Serializable snapshot of a context

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// One repository of a context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mirrored: Vec<String>,
}

/// What a context resolves against, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub runtime: String,
    pub managed: bool,
    pub owns_engine: bool,
    pub offline: bool,
    pub local_repository: PathBuf,
    pub repositories: Vec<RepositorySummary>,
    pub active_profiles: Vec<String>,
}

impl ContextSummary {
    /// Convert to a JSON value for display or tooling
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({
                "runtime": self.runtime,
                "repositories": []
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shape() {
        let summary = ContextSummary {
            runtime: "standalone".into(),
            managed: true,
            owns_engine: true,
            offline: false,
            local_repository: PathBuf::from("/tmp/repository"),
            repositories: vec![RepositorySummary {
                id: "central".into(),
                url: "https://repo.maven.apache.org/maven2/".into(),
                mirrored: vec![],
            }],
            active_profiles: vec!["ci".into()],
        };

        let value = summary.to_json();
        assert_eq!(value["runtime"], "standalone");
        assert_eq!(value["repositories"][0]["id"], "central");
        assert!(value["repositories"][0].get("mirrored").is_none());
        assert_eq!(value["active_profiles"][0], "ci");
    }
}
