//! Devel-branch discovery: which development branches feed a branch's
//! packages.

use crate::provider::{SourceError, SourceProvider};
use std::collections::BTreeSet;

/// Distinct devel branches recorded for the packages of `branch`, sorted.
///
/// A pure report; packages without a devel link simply contribute nothing.
pub fn devel_branches(
    provider: &impl SourceProvider,
    branch: &str,
) -> Result<Vec<String>, SourceError> {
    let mut found = BTreeSet::new();
    for package in provider.branch_packages(branch)? {
        if let Some(link) = provider.devel_link(branch, &package)? {
            found.insert(link.branch);
        }
    }
    Ok(found.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{BranchData, Dataset, DatasetDoc, SourceEntry};
    use crate::provider::DevelLink;
    use std::collections::BTreeMap;

    #[test]
    fn collects_distinct_sorted_branches() {
        let packages: BTreeMap<String, SourceEntry> = ["widget", "gadget", "gizmo"]
            .into_iter()
            .map(|name| (name.to_string(), SourceEntry::default()))
            .collect();
        let mut devel_links = BTreeMap::new();
        devel_links.insert(
            "factory".to_string(),
            BTreeMap::from([
                (
                    "widget".to_string(),
                    DevelLink {
                        branch: "systems:tools".to_string(),
                        package: None,
                    },
                ),
                (
                    "gadget".to_string(),
                    DevelLink {
                        branch: "systems:tools".to_string(),
                        package: Some("gadget-devel".to_string()),
                    },
                ),
                (
                    "gizmo".to_string(),
                    DevelLink {
                        branch: "apps:misc".to_string(),
                        package: None,
                    },
                ),
            ]),
        );
        let dataset = Dataset::new(DatasetDoc {
            branches: BTreeMap::from([("factory".to_string(), BranchData { packages })]),
            devel_links,
            ..DatasetDoc::default()
        });

        assert_eq!(
            devel_branches(&dataset, "factory").unwrap(),
            vec!["apps:misc".to_string(), "systems:tools".to_string()]
        );
        assert!(devel_branches(&dataset, "empty").unwrap().is_empty());
    }
}
