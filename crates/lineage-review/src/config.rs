//! Review configuration.
//!
//! One TOML document carries everything an operator tunes: the branch
//! topology, reviewer group names, and policy toggles.

use lineage_kernel::BranchTopology;
use lineage_policy::PolicyToggles;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reviewer group names the escalation controller attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerGroups {
    #[serde(default = "default_release_manager_group")]
    pub release_manager: String,
    #[serde(default = "default_review_team_group")]
    pub review_team: String,
    /// Group handling dedicated fork review. Fork escalations are skipped
    /// when unset.
    #[serde(default)]
    pub fork_review: Option<String>,
}

fn default_release_manager_group() -> String {
    "release-managers".to_string()
}

fn default_review_team_group() -> String {
    "review-team".to_string()
}

impl Default for ReviewerGroups {
    fn default() -> Self {
        Self {
            release_manager: default_release_manager_group(),
            review_team: default_review_team_group(),
            fork_review: None,
        }
    }
}

/// Full configuration of one review deployment.
///
/// Plain values come before the tables so the document also serializes
/// back to valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Extra reviewer group attached to submissions whose automated
    /// checks pass.
    #[serde(default)]
    pub custom_review_group: Option<String>,
    /// Whether the note log is posted as the request message.
    #[serde(default = "default_post_comments")]
    pub post_comments: bool,
    pub topology: BranchTopology,
    #[serde(default)]
    pub groups: ReviewerGroups,
    #[serde(default)]
    pub policy: PolicyToggles,
}

fn default_post_comments() -> bool {
    true
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl ReviewConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
