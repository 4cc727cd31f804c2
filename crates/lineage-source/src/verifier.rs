//! The caching checksum verifier.
//!
//! One verifier lives for exactly one submission's evaluation. Within that
//! scope every primitive answer is cached: branch and request matches per
//! `(branch, package, fingerprint)`, package membership per branch. Rule
//! chain steps can therefore consult the same candidate repeatedly without
//! duplicate remote queries, and nothing leaks across submissions.

use crate::provider::{DevelLink, SourceError, SourceProvider};
use lineage_kernel::{RequestMatch, VerifyOutcome};
use std::collections::{BTreeMap, BTreeSet};

type VerifyKey = (String, String, String);

/// Caching composition layer over a [`SourceProvider`].
pub struct SourceVerifier<'a, P: SourceProvider + ?Sized> {
    provider: &'a P,
    membership: BTreeMap<String, BTreeSet<String>>,
    branch_results: BTreeMap<VerifyKey, bool>,
    request_results: BTreeMap<VerifyKey, RequestMatch>,
}

impl<'a, P: SourceProvider + ?Sized> SourceVerifier<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            membership: BTreeMap::new(),
            branch_results: BTreeMap::new(),
            request_results: BTreeMap::new(),
        }
    }

    /// Pass-through: fingerprint of the submission's proposed sources.
    pub fn source_fingerprint(
        &self,
        branch: &str,
        package: &str,
        revision: Option<&str>,
    ) -> Result<Option<String>, SourceError> {
        self.provider.source_fingerprint(branch, package, revision)
    }

    /// Pass-through: recorded devel branch for a trunk package.
    pub fn devel_link(
        &self,
        branch: &str,
        package: &str,
    ) -> Result<Option<DevelLink>, SourceError> {
        self.provider.devel_link(branch, package)
    }

    /// Whether a branch currently carries a package. The branch's package
    /// listing is fetched at most once per evaluation.
    pub fn package_in_branch(
        &mut self,
        branch: &str,
        package: &str,
    ) -> Result<bool, SourceError> {
        if !self.membership.contains_key(branch) {
            let packages = self.provider.branch_packages(branch)?;
            self.membership.insert(branch.to_string(), packages);
        }
        Ok(self.membership[branch].contains(package))
    }

    /// Cached primitive: do current branch sources match the fingerprint?
    pub fn branch_matches(
        &mut self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<bool, SourceError> {
        let key = key(branch, package, fingerprint);
        if let Some(cached) = self.branch_results.get(&key) {
            return Ok(*cached);
        }
        let matched = self.provider.branch_matches(branch, package, fingerprint)?;
        self.branch_results.insert(key, matched);
        Ok(matched)
    }

    /// Cached primitive: would an open request produce the fingerprint?
    pub fn request_match(
        &mut self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<RequestMatch, SourceError> {
        let key = key(branch, package, fingerprint);
        if let Some(cached) = self.request_results.get(&key) {
            return Ok(*cached);
        }
        let matched = self.provider.request_match(branch, package, fingerprint)?;
        self.request_results.insert(key, matched);
        Ok(matched)
    }

    /// The composite verification for one candidate branch.
    ///
    /// Confirmed if the branch itself matches; otherwise Pending if an
    /// open request would match or cannot be resolved yet; otherwise
    /// NotFound. The request primitive is only consulted when the branch
    /// did not match.
    pub fn verify(
        &mut self,
        branch: &str,
        package: &str,
        fingerprint: &str,
    ) -> Result<VerifyOutcome, SourceError> {
        if self.branch_matches(branch, package, fingerprint)? {
            return Ok(VerifyOutcome::Confirmed);
        }
        Ok(match self.request_match(branch, package, fingerprint)? {
            RequestMatch::WouldMatch | RequestMatch::Unresolved => VerifyOutcome::Pending,
            RequestMatch::NoMatch => VerifyOutcome::NotFound,
        })
    }
}

fn key(branch: &str, package: &str, fingerprint: &str) -> VerifyKey {
    (
        branch.to_string(),
        package.to_string(),
        fingerprint.to_string(),
    )
}
