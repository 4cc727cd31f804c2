//! Branch topology: the named lines of development a deployment tracks.
//!
//! Topology is configuration, not discovery: operators declare the trunk,
//! the ordered stable generations, and the enterprise family, and every
//! policy question ("is this branch maintained?", "is this a later service
//! pack?") reduces to string matching over those declared names.

use serde::{Deserialize, Serialize};

/// One tracked stable release generation.
///
/// Generations are ordered newest first; the first entry is the generation
/// currently accepting submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableGeneration {
    /// Branch-name prefix every branch of this generation shares. The
    /// family name itself is also a valid branch (the release branch).
    pub family: String,
    /// Maintenance branch receiving post-release updates.
    pub update_branch: String,
    /// Branches whose lookup data is merged into this generation's origin
    /// table.
    #[serde(default)]
    pub lookup_branches: Vec<String>,
    /// Overlay branch carrying temporary downstream workarounds for
    /// enterprise-sourced packages, when this generation maintains one.
    #[serde(default)]
    pub workaround_branch: Option<String>,
}

/// The enterprise branch family and its service-pack ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterpriseFamily {
    /// Branch-name prefix shared by every enterprise branch.
    pub family: String,
    /// Service-pack prefixes in ascending order (base first). Entries must
    /// include their trailing separator so that a base prefix never matches
    /// a service-pack branch.
    #[serde(default)]
    pub service_packs: Vec<String>,
    /// Suffix naming a general-availability branch, e.g. `:ga`.
    pub ga_suffix: String,
    /// Suffix naming the corresponding maintenance branch, e.g. `:update`.
    pub update_suffix: String,
    /// Branches searched, most recent first, when a maintenance package
    /// appears to have silently moved to an enterprise source.
    #[serde(default)]
    pub fallback_branches: Vec<String>,
    /// Branch whose lookup table governs submissions targeting the
    /// enterprise family itself.
    #[serde(default)]
    pub lookup_branch: Option<String>,
}

impl EnterpriseFamily {
    /// Maintenance counterpart of a general-availability branch, if
    /// `origin` carries the GA suffix.
    pub fn ga_update_counterpart(&self, origin: &str) -> Option<String> {
        origin
            .strip_suffix(&self.ga_suffix)
            .map(|base| format!("{base}{}", self.update_suffix))
    }

    /// Whether `source` comes from a strictly later service pack than the
    /// pack `origin` belongs to.
    pub fn from_later_pack(&self, origin: &str, source: &str) -> bool {
        let Some(idx) = self
            .service_packs
            .iter()
            .position(|pack| origin.starts_with(pack.as_str()))
        else {
            return false;
        };
        self.service_packs[idx + 1..]
            .iter()
            .any(|pack| source.starts_with(pack.as_str()))
    }
}

/// The full branch topology one review run operates against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTopology {
    /// The rolling-development trunk branch.
    pub trunk: String,
    /// Non-free counterpart of the trunk, when the deployment keeps one.
    #[serde(default)]
    pub trunk_nonfree: Option<String>,
    /// Stable generations, newest (current review target) first.
    #[serde(default)]
    pub stable: Vec<StableGeneration>,
    pub enterprise: EnterpriseFamily,
}

impl BranchTopology {
    /// Whether a recorded origin traces back to the trunk.
    pub fn is_trunk_origin(&self, branch: &str) -> bool {
        branch.starts_with(&self.trunk)
    }

    /// Whether a branch belongs to the enterprise family.
    pub fn is_enterprise(&self, branch: &str) -> bool {
        branch.starts_with(&self.enterprise.family)
    }

    /// The generation currently accepting submissions.
    pub fn target_generation(&self) -> Option<&StableGeneration> {
        self.stable.first()
    }

    /// The generation immediately preceding the target.
    pub fn previous_generation(&self) -> Option<&StableGeneration> {
        self.stable.get(1)
    }

    /// The maintenance generation a recorded origin belongs to.
    ///
    /// The target generation itself is excluded: an origin naming the
    /// branch currently under review is not a maintenance origin, and the
    /// caller treats it as a policy gap.
    pub fn maintenance_generation_for(&self, origin: &str) -> Option<(usize, &StableGeneration)> {
        self.stable
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, generation)| origin.starts_with(&generation.family))
    }

    /// Whether a branch belongs to any maintained stable or enterprise
    /// family. Sources from outside these families need review-team
    /// oversight even when their content checks out.
    pub fn in_maintained_families(&self, branch: &str) -> bool {
        self.is_enterprise(branch)
            || self
                .stable
                .iter()
                .any(|generation| branch.starts_with(&generation.family))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topology() -> BranchTopology {
        BranchTopology {
            trunk: "factory".to_string(),
            trunk_nonfree: Some("factory:nonfree".to_string()),
            stable: vec![
                StableGeneration {
                    family: "maple-15.3".to_string(),
                    update_branch: "maple-15.3:update".to_string(),
                    lookup_branches: vec![
                        "maple-15.3".to_string(),
                        "maple-15.3:nonfree".to_string(),
                    ],
                    workaround_branch: Some("maple-15.3:ent-workarounds".to_string()),
                },
                StableGeneration {
                    family: "maple-15.2".to_string(),
                    update_branch: "maple-15.2:update".to_string(),
                    lookup_branches: vec!["maple-15.2:update".to_string()],
                    workaround_branch: Some("maple-15.2:ent-workarounds".to_string()),
                },
                StableGeneration {
                    family: "maple-15.1".to_string(),
                    update_branch: "maple-15.1:update".to_string(),
                    lookup_branches: vec!["maple-15.1:update".to_string()],
                    workaround_branch: None,
                },
            ],
            enterprise: EnterpriseFamily {
                family: "ent-4".to_string(),
                service_packs: vec![
                    "ent-4:".to_string(),
                    "ent-4-sp1:".to_string(),
                    "ent-4-sp2:".to_string(),
                    "ent-4-sp3:".to_string(),
                ],
                ga_suffix: ":ga".to_string(),
                update_suffix: ":update".to_string(),
                fallback_branches: vec![
                    "ent-4-sp3:ga".to_string(),
                    "ent-4-sp2:update".to_string(),
                    "ent-4-sp2:ga".to_string(),
                ],
                lookup_branch: Some("ent-4-sp3:ga".to_string()),
            },
        }
    }

    #[test]
    fn trunk_origin_accepts_nonfree_counterpart() {
        let topo = topology();
        assert!(topo.is_trunk_origin("factory"));
        assert!(topo.is_trunk_origin("factory:nonfree"));
        assert!(!topo.is_trunk_origin("maple-15.3"));
    }

    #[test]
    fn maintenance_generation_skips_the_target() {
        let topo = topology();
        assert!(topo.maintenance_generation_for("maple-15.3").is_none());

        let (idx, generation) = topo
            .maintenance_generation_for("maple-15.2:update")
            .expect("previous generation must match");
        assert_eq!(idx, 1);
        assert_eq!(generation.family, "maple-15.2");

        let (idx, _) = topo
            .maintenance_generation_for("maple-15.1:update")
            .expect("oldest generation must match");
        assert_eq!(idx, 2);
    }

    #[test]
    fn maintained_families_cover_stable_and_enterprise() {
        let topo = topology();
        assert!(topo.in_maintained_families("maple-15.2:update"));
        assert!(topo.in_maintained_families("ent-4-sp2:ga"));
        assert!(!topo.in_maintained_families("home:someone:branches"));
    }

    #[test]
    fn ga_update_counterpart_requires_the_suffix() {
        let enterprise = topology().enterprise;
        assert_eq!(
            enterprise.ga_update_counterpart("ent-4-sp2:ga").as_deref(),
            Some("ent-4-sp2:update")
        );
        assert_eq!(enterprise.ga_update_counterpart("ent-4-sp2:update"), None);
    }

    #[test]
    fn later_pack_is_strict_and_prefix_safe() {
        let enterprise = topology().enterprise;
        assert!(enterprise.from_later_pack("ent-4-sp1:ga", "ent-4-sp2:ga"));
        assert!(enterprise.from_later_pack("ent-4:ga", "ent-4-sp3:update"));
        assert!(!enterprise.from_later_pack("ent-4-sp2:ga", "ent-4-sp2:update"));
        assert!(!enterprise.from_later_pack("ent-4-sp3:ga", "ent-4-sp1:ga"));
        // the base prefix must not swallow service-pack branches
        assert!(!enterprise.from_later_pack("ent-4-sp3:ga", "ent-4:update"));
    }
}
