//! The sequential review sweep.
//!
//! One batch run builds every lookup snapshot once, then walks the
//! pending submissions in order. Each submission gets a fresh verifier
//! (caches never cross submissions) and is evaluated in isolation: an
//! unreachable data source defers that submission and the sweep moves on.

use crate::config::ReviewConfig;
use crate::escalate::apply_escalations;
use crate::sink::{Disposition, RequestSink};
use chrono::{DateTime, Utc};
use lineage_kernel::{BranchTopology, Decision, Escalations, Submission};
use lineage_policy::{PermissiveContinuity, ReviewContext, Verdict, review_submission};
use lineage_source::{
    OriginTable, OriginTableBuilder, OriginTables, SourceError, SourceProvider, SourceVerifier,
};
use serde::Serialize;

/// Build one origin-table snapshot per configured generation, plus the
/// enterprise table.
///
/// Lookup data is fetched once per run; branches without recorded data
/// contribute empty tables.
pub fn build_tables(
    provider: &impl SourceProvider,
    topology: &BranchTopology,
) -> Result<OriginTables, SourceError> {
    let mut builder = OriginTableBuilder::new();
    let mut stable = Vec::with_capacity(topology.stable.len());
    for generation in &topology.stable {
        for branch in &generation.lookup_branches {
            let merged = builder.load(provider, branch)?;
            tracing::debug!(branch, merged, "loaded lookup data");
        }
        let table = builder.snapshot();
        tracing::info!(
            family = %generation.family,
            entries = table.len(),
            "origin table ready"
        );
        stable.push(table);
        builder.reset();
    }

    let enterprise = match &topology.enterprise.lookup_branch {
        Some(branch) => {
            builder.load(provider, branch)?;
            let table = builder.snapshot();
            builder.reset();
            table
        }
        None => OriginTable::default(),
    };
    Ok(OriginTables { stable, enterprise })
}

/// Outcome of one submission within a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub request_id: String,
    pub source: String,
    pub target: String,
    pub decision: Decision,
    pub escalations: Escalations,
    pub automatic_submission: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trunk_presence: Option<bool>,
    pub pending_trunk_submission: bool,
    pub message: String,
    /// Transient failure that deferred this submission, when one struck.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Timestamped record of one full sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub deferred: usize,
    pub entries: Vec<SubmissionReport>,
}

/// Sweep all pending submissions once.
///
/// Fails only when the lookup snapshots cannot be built at all; every
/// per-submission failure is isolated into that submission's entry.
pub fn run_batch<P: SourceProvider, S: RequestSink>(
    provider: &P,
    sink: &mut S,
    config: &ReviewConfig,
    submissions: &[Submission],
) -> Result<BatchReport, SourceError> {
    let started_at = Utc::now();
    let tables = build_tables(provider, &config.topology)?;

    let mut entries = Vec::with_capacity(submissions.len());
    for submission in submissions {
        entries.push(review_one(provider, sink, config, &tables, submission));
    }

    let finished_at = Utc::now();
    let approved = count(&entries, Decision::Approve);
    let rejected = count(&entries, Decision::Reject);
    let deferred = count(&entries, Decision::Indeterminate);
    Ok(BatchReport {
        started_at,
        finished_at,
        total: entries.len(),
        approved,
        rejected,
        deferred,
        entries,
    })
}

fn count(entries: &[SubmissionReport], decision: Decision) -> usize {
    entries
        .iter()
        .filter(|entry| entry.decision == decision)
        .count()
}

fn review_one<P: SourceProvider, S: RequestSink>(
    provider: &P,
    sink: &mut S,
    config: &ReviewConfig,
    tables: &OriginTables,
    submission: &Submission,
) -> SubmissionReport {
    let span = tracing::info_span!("review", request_id = %submission.request_id);
    let _guard = span.enter();

    let mut verifier = SourceVerifier::new(provider);
    let ctx = ReviewContext {
        submission,
        topology: &config.topology,
        tables,
        toggles: &config.policy,
    };

    let mut deferred = None;
    let mut verdict = match review_submission(&ctx, &mut verifier, &PermissiveContinuity) {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::warn!(error = %err, "data source unavailable, deferring submission");
            let mut verdict = Verdict::new();
            verdict.note(format!("data source unavailable: {err}"));
            deferred = Some(err.to_string());
            verdict
        }
    };

    for error in &verdict.errors {
        tracing::error!("{error}");
    }
    if verdict.pending_trunk_submission && verdict.automatic_submission {
        verdict.note(
            "this request would have been created automatically once the trunk submission is accepted",
        );
    }
    if verdict.escalations.release_manager {
        verdict.note("request needs review by release management");
    }
    if verdict.decision == Decision::Approve && deferred.is_none() {
        verdict.escalations.custom_group = config.custom_review_group.clone();
    }

    if let Err(err) = apply_escalations(
        sink,
        &submission.request_id,
        &verdict.escalations,
        &config.groups,
    ) {
        tracing::error!(error = %err, "required escalation could not be recorded, declining");
        verdict.error(format!("required escalation could not be recorded: {err}"));
        verdict.decision = Decision::Reject;
    }

    let message = if config.post_comments {
        verdict.message_lines().join("\n")
    } else {
        String::new()
    };
    let disposition = Disposition::for_decision(verdict.decision, message.clone());
    if let Err(err) = sink.set_state(&submission.request_id, &disposition) {
        tracing::error!(error = %err, "failed to record request state");
        verdict.error(format!("failed to record request state: {err}"));
    }

    tracing::info!(decision = %verdict.decision, "review complete");
    SubmissionReport {
        request_id: submission.request_id.clone(),
        source: submission.source_label(),
        target: submission.target_label(),
        decision: verdict.decision,
        escalations: verdict.escalations,
        automatic_submission: verdict.automatic_submission,
        trunk_presence: verdict.trunk_presence,
        pending_trunk_submission: verdict.pending_trunk_submission,
        message,
        deferred,
        errors: verdict.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewerGroups;
    use crate::sink::{MemorySink, RequestResult, RequestState};
    use lineage_kernel::{EnterpriseFamily, StableGeneration};
    use lineage_policy::PolicyToggles;
    use lineage_source::dataset::{Dataset, DatasetDoc, SourceEntry};
    use std::collections::BTreeMap;

    fn config() -> ReviewConfig {
        ReviewConfig {
            topology: BranchTopology {
                trunk: "factory".to_string(),
                trunk_nonfree: None,
                stable: vec![
                    StableGeneration {
                        family: "maple-15.3".to_string(),
                        update_branch: "maple-15.3:update".to_string(),
                        lookup_branches: vec!["maple-15.3".to_string()],
                        workaround_branch: None,
                    },
                    StableGeneration {
                        family: "maple-15.2".to_string(),
                        update_branch: "maple-15.2:update".to_string(),
                        lookup_branches: vec!["maple-15.2:update".to_string()],
                        workaround_branch: None,
                    },
                ],
                enterprise: EnterpriseFamily {
                    family: "ent-4".to_string(),
                    service_packs: Vec::new(),
                    ga_suffix: ":ga".to_string(),
                    update_suffix: ":update".to_string(),
                    fallback_branches: Vec::new(),
                    lookup_branch: None,
                },
            },
            groups: ReviewerGroups {
                release_manager: "release-managers".to_string(),
                review_team: "review-team".to_string(),
                fork_review: Some("fork-reviewers".to_string()),
            },
            policy: PolicyToggles::default(),
            custom_review_group: None,
            post_comments: true,
        }
    }

    fn set_entry(doc: &mut DatasetDoc, branch: &str, package: &str, fingerprint: &str) {
        doc.branches
            .entry(branch.to_string())
            .or_default()
            .packages
            .insert(
                package.to_string(),
                SourceEntry {
                    fingerprint: Some(fingerprint.to_string()),
                    sources: BTreeMap::new(),
                },
            );
    }

    fn set_lookup(doc: &mut DatasetDoc, branch: &str, package: &str, raw: &str) {
        doc.lookups
            .entry(branch.to_string())
            .or_default()
            .insert(package.to_string(), raw.to_string());
    }

    fn submission(id: &str, source_branch: &str, package: &str) -> Submission {
        Submission {
            request_id: id.to_string(),
            source_branch: source_branch.to_string(),
            source_package: package.to_string(),
            source_revision: None,
            target_branch: "maple-15.3".to_string(),
            target_package: package.to_string(),
        }
    }

    #[test]
    fn batch_maps_decisions_to_terminal_states() {
        let mut doc = DatasetDoc::default();
        // widget: recorded trunk origin, submitted from trunk → accepted
        set_entry(&mut doc, "factory", "widget", "fp-w");
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");
        // gadget: devel link, submitted from elsewhere → declined
        set_entry(&mut doc, "otherbranch", "gadget", "fp-g");
        set_lookup(&mut doc, "maple-15.3", "gadget", "Devel;systems:tools;gadget");
        // gizmo: no history, enterprise source → accepted
        set_entry(&mut doc, "ent-4-sp1:update", "gizmo", "fp-z");

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        for id in ["r1", "r2", "r3"] {
            sink.seed_request(id);
        }
        let submissions = vec![
            submission("r1", "factory", "widget"),
            submission("r2", "otherbranch", "gadget"),
            submission("r3", "ent-4-sp1:update", "gizmo"),
        ];

        let report = run_batch(&dataset, &mut sink, &config(), &submissions).unwrap();
        assert_eq!(report.total, 3);
        assert_eq!(report.approved, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.deferred, 0);

        let accepted = sink.request("r1").unwrap().disposition.as_ref().unwrap();
        assert_eq!(accepted.state, RequestState::Done);
        assert_eq!(accepted.result, Some(RequestResult::Accepted));

        let declined = sink.request("r2").unwrap().disposition.as_ref().unwrap();
        assert_eq!(declined.result, Some(RequestResult::Declined));
        assert!(declined.message.contains("devel branch"));

        assert!(sink.request("r1").unwrap().reviewers.is_empty());
    }

    #[test]
    fn indeterminate_outcomes_leave_the_request_open() {
        let mut doc = DatasetDoc::default();
        set_entry(&mut doc, "home:dev", "widget", "fp");
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");
        doc.requests.push(lineage_source::dataset::OpenRequest {
            id: "42".to_string(),
            target_branch: "factory".to_string(),
            target_package: "widget".to_string(),
            fingerprint: Some("fp".to_string()),
        });

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        sink.seed_request("r1");
        let submissions = vec![submission("r1", "home:dev", "widget")];

        let report = run_batch(&dataset, &mut sink, &config(), &submissions).unwrap();
        assert_eq!(report.deferred, 1);

        let disposition = sink.request("r1").unwrap().disposition.as_ref().unwrap();
        assert_eq!(disposition.state, RequestState::Seen);
        assert_eq!(disposition.result, None);
        assert!(
            disposition
                .message
                .contains("created automatically once the trunk submission is accepted")
        );
    }

    #[test]
    fn escalation_failure_overturns_an_approval_into_decline() {
        let mut doc = DatasetDoc::default();
        // unknown origin from outside: relaxed approval with review-team
        set_entry(&mut doc, "home:dev", "widget", "fp");

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        sink.seed_request("r1");
        sink.fail_attachments_for("review-team");
        let submissions = vec![submission("r1", "home:dev", "widget")];

        let report = run_batch(&dataset, &mut sink, &config(), &submissions).unwrap();
        assert_eq!(report.entries[0].decision, Decision::Reject);

        let disposition = sink.request("r1").unwrap().disposition.as_ref().unwrap();
        assert_eq!(disposition.result, Some(RequestResult::Declined));
        assert!(
            disposition
                .message
                .contains("required escalation could not be recorded")
        );
        assert!(disposition.message.contains("review-team"));
    }

    #[test]
    fn one_unreachable_submission_does_not_abort_the_batch() {
        let mut doc = DatasetDoc::default();
        doc.unreachable_branches.insert("offline:branch".to_string());
        set_entry(&mut doc, "factory", "widget", "fp");
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        sink.seed_request("r1");
        sink.seed_request("r2");
        let submissions = vec![
            submission("r1", "offline:branch", "widget"),
            submission("r2", "factory", "widget"),
        ];

        let report = run_batch(&dataset, &mut sink, &config(), &submissions).unwrap();
        assert_eq!(report.entries[0].decision, Decision::Indeterminate);
        assert!(report.entries[0].deferred.is_some());
        assert_eq!(report.entries[1].decision, Decision::Approve);

        let deferred = sink.request("r1").unwrap().disposition.as_ref().unwrap();
        assert_eq!(deferred.state, RequestState::Seen);
    }

    #[test]
    fn comments_can_be_suppressed() {
        let mut doc = DatasetDoc::default();
        set_entry(&mut doc, "factory", "widget", "fp");
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        sink.seed_request("r1");
        let mut config = config();
        config.post_comments = false;

        run_batch(
            &dataset,
            &mut sink,
            &config,
            &[submission("r1", "factory", "widget")],
        )
        .unwrap();
        assert!(
            sink.request("r1")
                .unwrap()
                .disposition
                .as_ref()
                .unwrap()
                .message
                .is_empty()
        );
    }

    #[test]
    fn custom_group_is_attached_when_checks_pass() {
        let mut doc = DatasetDoc::default();
        set_entry(&mut doc, "factory", "widget", "fp");
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");
        set_entry(&mut doc, "otherbranch", "gadget", "fp-g");
        set_lookup(&mut doc, "maple-15.3", "gadget", "Devel;systems:tools;gadget");

        let dataset = Dataset::new(doc);
        let mut sink = MemorySink::new();
        sink.seed_request("r1");
        sink.seed_request("r2");
        let mut config = config();
        config.custom_review_group = Some("source-checkers".to_string());

        run_batch(
            &dataset,
            &mut sink,
            &config,
            &[
                submission("r1", "factory", "widget"),
                submission("r2", "otherbranch", "gadget"),
            ],
        )
        .unwrap();

        let approved_reviewers = &sink.request("r1").unwrap().reviewers;
        assert!(
            approved_reviewers
                .iter()
                .any(|reviewer| reviewer.group == "source-checkers")
        );
        // a declined submission gets no custom reviewer
        assert!(sink.request("r2").unwrap().reviewers.is_empty());
    }

    #[test]
    fn build_tables_keeps_generations_independent() {
        let mut doc = DatasetDoc::default();
        set_lookup(&mut doc, "maple-15.3", "widget", "factory");
        set_lookup(&mut doc, "maple-15.2:update", "widget", "maple-15.2:update");
        let dataset = Dataset::new(doc);

        let tables = build_tables(&dataset, &config().topology).unwrap();
        assert_eq!(tables.stable.len(), 2);
        assert_eq!(tables.stable[0].raw("widget"), Some("factory"));
        assert_eq!(tables.stable[1].raw("widget"), Some("maple-15.2:update"));
        assert!(tables.enterprise.is_empty());
    }
}
