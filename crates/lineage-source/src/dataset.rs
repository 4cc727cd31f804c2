//! Deterministic file-backed data source.
//!
//! A [`Dataset`] is one JSON document describing branches with their
//! packages, open requests, lookup tables, and devel links. It answers the
//! full [`SourceProvider`] contract without any network, which makes it
//! the backend for CLI runs over snapshots and the fixture format for
//! tests.

use crate::provider::{DevelLink, SourceError, SourceProvider};
use lineage_kernel::{RequestMatch, Submission};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Sources of one package in one branch.
///
/// Either an explicit fingerprint or a file→digest listing the fingerprint
/// is derived from. Fixtures usually supply the listing and let the
/// dataset derive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, String>,
}

impl SourceEntry {
    /// The entry's content fingerprint, deriving one from the source
    /// listing when none is recorded explicitly.
    pub fn resolved_fingerprint(&self) -> String {
        if let Some(fingerprint) = &self.fingerprint {
            return fingerprint.clone();
        }
        let mut hasher = Sha256::new();
        for (name, digest) in &self.sources {
            hasher.update(name.as_bytes());
            hasher.update([0]);
            hasher.update(digest.as_bytes());
            hasher.update([b'\n']);
        }
        format!("{:x}", hasher.finalize())
    }
}

/// One branch's current package contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchData {
    #[serde(default)]
    pub packages: BTreeMap<String, SourceEntry>,
}

/// An open request targeting some branch, as the build service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenRequest {
    pub id: String,
    pub target_branch: String,
    pub target_package: String,
    /// Fingerprint the request would produce if accepted. `None` when the
    /// request's sources cannot be resolved yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// The on-disk dataset document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDoc {
    #[serde(default)]
    pub branches: BTreeMap<String, BranchData>,
    #[serde(default)]
    pub requests: Vec<OpenRequest>,
    /// Raw origin lookup tables, keyed by branch.
    #[serde(default)]
    pub lookups: BTreeMap<String, BTreeMap<String, String>>,
    /// Devel links, keyed by branch then package.
    #[serde(default)]
    pub devel_links: BTreeMap<String, BTreeMap<String, DevelLink>>,
    /// Submissions pending review in this snapshot.
    #[serde(default)]
    pub submissions: Vec<Submission>,
    /// Branches that answer every query with an unreachable error. Used to
    /// exercise failure isolation.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unreachable_branches: BTreeSet<String>,
}

/// A loaded dataset acting as the data source.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    doc: DatasetDoc,
}

impl Dataset {
    pub fn new(doc: DatasetDoc) -> Self {
        Self { doc }
    }

    /// Load a dataset document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let bytes = std::fs::read(path)?;
        let doc: DatasetDoc = serde_json::from_slice(&bytes)?;
        Ok(Self::new(doc))
    }

    /// Submissions pending review in this snapshot.
    pub fn submissions(&self) -> &[Submission] {
        &self.doc.submissions
    }

    fn guard_reachable(&self, branch: &str) -> Result<(), SourceError> {
        if self.doc.unreachable_branches.contains(branch) {
            return Err(SourceError::Unreachable(format!(
                "branch {branch} is not answering"
            )));
        }
        Ok(())
    }

    fn entry(&self, branch: &str, package: &str) -> Option<&SourceEntry> {
        self.doc.branches.get(branch)?.packages.get(package)
    }
}

impl SourceProvider for Dataset {
    fn source_fingerprint(
        &self,
        branch: &str,
        package: &str,
        _revision: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        self.guard_reachable(branch)?;
        Ok(self
            .entry(branch, package)
            .map(SourceEntry::resolved_fingerprint))
    }

    fn branch_packages(&self, branch: &str) -> Result<BTreeSet<String>, SourceError> {
        self.guard_reachable(branch)?;
        Ok(self
            .doc
            .branches
            .get(branch)
            .map(|data| data.packages.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn branch_matches(
        &self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<bool, SourceError> {
        self.guard_reachable(branch)?;
        Ok(self
            .entry(branch, package)
            .is_some_and(|entry| entry.resolved_fingerprint() == fingerprint))
    }

    fn request_match(
        &self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<RequestMatch, SourceError> {
        self.guard_reachable(branch)?;
        let mut unresolved = false;
        for request in self
            .doc
            .requests
            .iter()
            .filter(|request| request.target_branch == branch && request.target_package == package)
        {
            match &request.fingerprint {
                Some(candidate) if candidate == fingerprint => {
                    return Ok(RequestMatch::WouldMatch);
                }
                Some(_) => {}
                None => unresolved = true,
            }
        }
        if unresolved {
            Ok(RequestMatch::Unresolved)
        } else {
            Ok(RequestMatch::NoMatch)
        }
    }

    fn lookup_table(
        &self,
        branch: &str,
    ) -> Result<Option<BTreeMap<String, String>>, SourceError> {
        self.guard_reachable(branch)?;
        Ok(self.doc.lookups.get(branch).cloned())
    }

    fn devel_link(&self, branch: &str, package: &str) -> Result<Option<DevelLink>, SourceError> {
        self.guard_reachable(branch)?;
        Ok(self
            .doc
            .devel_links
            .get(branch)
            .and_then(|links| links.get(package))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fingerprint: &str) -> SourceEntry {
        SourceEntry {
            fingerprint: Some(fingerprint.to_string()),
            sources: BTreeMap::new(),
        }
    }

    fn dataset() -> Dataset {
        let mut branches = BTreeMap::new();
        branches.insert(
            "factory".to_string(),
            BranchData {
                packages: BTreeMap::from([
                    ("widget".to_string(), entry("f1")),
                    ("gadget".to_string(), entry("f2")),
                ]),
            },
        );
        Dataset::new(DatasetDoc {
            branches,
            requests: vec![
                OpenRequest {
                    id: "10".to_string(),
                    target_branch: "factory".to_string(),
                    target_package: "widget".to_string(),
                    fingerprint: Some("f9".to_string()),
                },
                OpenRequest {
                    id: "11".to_string(),
                    target_branch: "factory".to_string(),
                    target_package: "gadget".to_string(),
                    fingerprint: None,
                },
            ],
            unreachable_branches: BTreeSet::from(["offline".to_string()]),
            ..DatasetDoc::default()
        })
    }

    #[test]
    fn fingerprints_resolve_from_listing_when_not_explicit() {
        let listing = SourceEntry {
            fingerprint: None,
            sources: BTreeMap::from([
                ("widget.spec".to_string(), "aa".to_string()),
                ("widget.tar".to_string(), "bb".to_string()),
            ]),
        };
        let first = listing.resolved_fingerprint();
        assert_eq!(first, listing.resolved_fingerprint());
        assert_ne!(first, SourceEntry::default().resolved_fingerprint());
    }

    #[test]
    fn branch_queries_answer_absence_without_error() {
        let data = dataset();
        assert_eq!(
            data.source_fingerprint("factory", "missing", None).unwrap(),
            None
        );
        assert!(data.branch_packages("no-such-branch").unwrap().is_empty());
        assert!(!data.branch_matches("factory", "widget", "zz").unwrap());
        assert_eq!(data.lookup_table("no-such-branch").unwrap(), None);
    }

    #[test]
    fn request_match_prefers_a_concrete_match_over_unresolved() {
        let data = dataset();
        assert_eq!(
            data.request_match("factory", "widget", "f9").unwrap(),
            RequestMatch::WouldMatch
        );
        assert_eq!(
            data.request_match("factory", "widget", "other").unwrap(),
            RequestMatch::NoMatch
        );
        assert_eq!(
            data.request_match("factory", "gadget", "anything").unwrap(),
            RequestMatch::Unresolved
        );
    }

    #[test]
    fn unreachable_branches_error_on_every_query() {
        let data = dataset();
        assert!(matches!(
            data.branch_packages("offline"),
            Err(SourceError::Unreachable(_))
        ));
        assert!(matches!(
            data.branch_matches("offline", "widget", "f1"),
            Err(SourceError::Unreachable(_))
        ));
    }
}
