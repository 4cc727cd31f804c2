//! The read-only contract between the review engine and the build
//! service.
//!
//! The engine never fetches or parses wire formats; it consumes
//! already-decoded answers through this trait. Absence (a package without
//! source info, a branch without lookup data, a package without a devel
//! link) is modeled as `Ok(None)` or an empty collection — only transport
//! and decoding failures are errors.

use lineage_kernel::RequestMatch;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Errors raised at the data-source boundary.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The data source could not be reached. The affected submission is
    /// deferred; the batch continues.
    #[error("data source unreachable: {0}")]
    Unreachable(String),

    /// The data source answered with something undecodable.
    #[error("malformed answer from data source: {0}")]
    Malformed(String),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset document: {0}")]
    Document(#[from] serde_json::Error),
}

/// A recorded development branch for a trunk package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelLink {
    pub branch: String,
    /// Package name inside the devel branch, when it differs from the
    /// trunk name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// Read-only queries against the build service.
pub trait SourceProvider {
    /// Content fingerprint of a package's sources in a branch, optionally
    /// pinned to a revision. `None` when the package does not exist there.
    fn source_fingerprint(
        &self,
        branch: &str,
        package: &str,
        revision: Option<&str>,
    ) -> Result<Option<String>, SourceError>;

    /// Names of all packages a branch currently carries.
    fn branch_packages(&self, branch: &str) -> Result<BTreeSet<String>, SourceError>;

    /// Whether current sources of `package` in `branch` hash to
    /// `fingerprint`.
    fn branch_matches(
        &self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<bool, SourceError>;

    /// Whether an open request targeting `branch` would produce
    /// `fingerprint` for `package` if accepted.
    fn request_match(
        &self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<RequestMatch, SourceError>;

    /// The raw origin lookup table recorded for a branch. `None` when the
    /// branch has no recorded data; callers treat that as an empty table.
    fn lookup_table(&self, branch: &str)
    -> Result<Option<BTreeMap<String, String>>, SourceError>;

    /// The development branch recorded for a package of `branch`.
    fn devel_link(&self, branch: &str, package: &str) -> Result<Option<DevelLink>, SourceError>;
}
