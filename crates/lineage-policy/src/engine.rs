//! The rule chain.
//!
//! Priority order: devel links reject foreign sources outright; trunk
//! origins approve on exact provenance; forks need continuity plus human
//! review; maintenance and enterprise origins approve along their
//! documented upgrade paths; everything else funnels into the shared
//! trunk-verification step, whose outcome is shaped by the per-arm
//! relaxation flag.
//!
//! Every candidate query goes through the caching
//! [`SourceVerifier`]; fallback candidates are only consulted after
//! earlier ones return NotFound.

use crate::continuity::ContinuityValidator;
use crate::verdict::Verdict;
use lineage_kernel::{
    BranchTopology, ClassifiedOrigin, Decision, FORK_MARKER, StableGeneration, Submission,
    VerifyOutcome, classify_origin,
};
use lineage_source::{OriginTables, SourceError, SourceProvider, SourceVerifier};
use serde::{Deserialize, Serialize};

/// Operator toggles tightening the automated policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyToggles {
    /// Release management must approve version updates arriving from
    /// trunk or a devel branch.
    #[serde(default)]
    pub must_approve_version_updates: bool,
    /// Release management must approve maintenance updates.
    #[serde(default)]
    pub must_approve_maintenance_updates: bool,
}

/// Borrowed inputs of one submission's evaluation.
pub struct ReviewContext<'a> {
    pub submission: &'a Submission,
    pub topology: &'a BranchTopology,
    pub tables: &'a OriginTables,
    pub toggles: &'a PolicyToggles,
}

/// What an arm concluded: a final decision, or a hand-off to the shared
/// verification step. `relaxed` arms approve even when no candidate
/// matches, at the price of review-team oversight.
enum ArmFlow {
    Decided(Decision),
    FallThrough { relaxed: bool },
}

/// Evaluate one submission.
///
/// Transient data-source failures propagate as [`SourceError`] and are the
/// caller's cue to defer the submission; every policy conclusion,
/// including data-integrity rejections, comes back as an `Ok` verdict.
pub fn review_submission<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    continuity: &dyn ContinuityValidator,
) -> Result<Verdict, SourceError> {
    let submission = ctx.submission;
    let mut verdict = Verdict::new();

    let Some(fingerprint) = verifier.source_fingerprint(
        &submission.source_branch,
        &submission.source_package,
        submission.source_revision.as_deref(),
    )?
    else {
        // a missing source is evidence of an invalid request
        verdict.error(format!(
            "could not retrieve source info for {}",
            submission.source_label()
        ));
        verdict.decision = Decision::Reject;
        return Ok(verdict);
    };

    if ctx.topology.is_enterprise(&submission.target_branch) {
        enterprise_target_review(ctx, verifier, &mut verdict, &fingerprint)?;
        return Ok(verdict);
    }

    let raw = ctx
        .tables
        .current()
        .and_then(|table| table.raw(&submission.target_package));
    if let Some(raw) = raw {
        let unchanged = submission.source_branch.starts_with(raw);
        verdict.note(format!(
            "expected origin is '{raw}' ({})",
            if unchanged { "unchanged" } else { "changed" }
        ));
    }
    let origin = match classify_origin(raw) {
        Ok(origin) => origin,
        Err(err) => {
            verdict.error(format!("{err} for {}", submission.target_label()));
            verdict.decision = Decision::Reject;
            return Ok(verdict);
        }
    };

    let flow = match &origin {
        ClassifiedOrigin::DevelLink { branch } => devel_link_arm(ctx, &mut verdict, branch),
        ClassifiedOrigin::Fork => fork_arm(ctx, continuity, &mut verdict)?,
        ClassifiedOrigin::Unknown => unknown_arm(ctx, &mut verdict),
        ClassifiedOrigin::PlainBranch { branch } => {
            plain_branch_arm(ctx, verifier, &mut verdict, branch, &fingerprint)?
        }
    };

    verdict.decision = match flow {
        ArmFlow::Decided(decision) => decision,
        ArmFlow::FallThrough { relaxed } => {
            shared_verification(ctx, verifier, &mut verdict, &fingerprint, relaxed)?
        }
    };
    Ok(verdict)
}

/// A devel-sourced package must arrive from exactly its recorded devel
/// branch; nothing else is even verified.
fn devel_link_arm(ctx: &ReviewContext<'_>, verdict: &mut Verdict, devel_branch: &str) -> ArmFlow {
    let submission = ctx.submission;
    if submission.source_branch != devel_branch {
        verdict.note(format!(
            "{} must be submitted from its devel branch {devel_branch}, not {}",
            submission.target_package, submission.source_branch
        ));
        return ArmFlow::Decided(Decision::Reject);
    }
    if ctx.toggles.must_approve_version_updates {
        verdict.escalations.release_manager = true;
    }
    ArmFlow::FallThrough { relaxed: true }
}

fn trunk_arm(ctx: &ReviewContext<'_>, verdict: &mut Verdict, origin: &str) -> ArmFlow {
    let submission = ctx.submission;
    // a trunk origin means automation would have created this request
    verdict.automatic_submission = true;
    if ctx.toggles.must_approve_version_updates {
        verdict.escalations.release_manager = true;
    }
    if origin == submission.source_branch {
        verdict.trunk_presence = Some(true);
        verdict.note(format!(
            "submitted from the recorded trunk origin {origin}"
        ));
        return ArmFlow::Decided(Decision::Approve);
    }
    verdict.escalations.release_manager = true;
    ArmFlow::FallThrough { relaxed: false }
}

fn fork_arm(
    ctx: &ReviewContext<'_>,
    continuity: &dyn ContinuityValidator,
    verdict: &mut Verdict,
) -> Result<ArmFlow, SourceError> {
    verdict.escalations.release_manager = true;
    verdict.escalations.fork_review = true;
    if !continuity.continuity_ok(ctx.submission)? {
        verdict.note(format!(
            "source branch continuity check failed for {}",
            ctx.submission.source_label()
        ));
        return Ok(ArmFlow::Decided(Decision::Reject));
    }
    Ok(ArmFlow::FallThrough { relaxed: true })
}

fn unknown_arm(ctx: &ReviewContext<'_>, verdict: &mut Verdict) -> ArmFlow {
    if ctx.topology.is_enterprise(&ctx.submission.source_branch) {
        verdict.note("new package sourced from the enterprise family");
        return ArmFlow::Decided(Decision::Approve);
    }
    verdict.escalations.release_manager = true;
    ArmFlow::FallThrough { relaxed: true }
}

fn plain_branch_arm<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    origin: &str,
    fingerprint: &str,
) -> Result<ArmFlow, SourceError> {
    if ctx.topology.is_trunk_origin(origin) {
        return Ok(trunk_arm(ctx, verdict, origin));
    }
    if let Some((index, generation)) = ctx.topology.maintenance_generation_for(origin) {
        return maintenance_arm(ctx, verifier, verdict, index, generation, origin, fingerprint);
    }
    if ctx.topology.is_enterprise(origin) {
        return enterprise_origin_arm(ctx, verifier, verdict, origin, fingerprint);
    }
    // a policy gap, not a judgment call: reject loudly, never approve
    verdict.error(format!(
        "unhandled origin '{origin}' for {}",
        ctx.submission.target_label()
    ));
    Ok(ArmFlow::Decided(Decision::Reject))
}

fn maintenance_arm<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    generation_index: usize,
    generation: &StableGeneration,
    origin: &str,
    fingerprint: &str,
) -> Result<ArmFlow, SourceError> {
    let submission = ctx.submission;
    if ctx.toggles.must_approve_maintenance_updates {
        verdict.escalations.release_manager = true;
    }

    if submission.source_branch == origin {
        verdict.note(format!("submission from {origin} matches the recorded origin"));
        return Ok(ArmFlow::Decided(Decision::Approve));
    }
    if submission.source_branch.starts_with(origin) {
        verdict.escalations.release_manager = true;
        verdict.note(format!(
            "submission from a newer maintenance level of {origin}"
        ));
        return Ok(ArmFlow::Decided(Decision::Approve));
    }
    if ctx.topology.is_enterprise(&submission.source_branch) {
        verdict.escalations.release_manager = true;
        verdict.note("maintenance package switching to an enterprise source");
        return Ok(ArmFlow::Decided(Decision::Approve));
    }

    match verifier.verify(&generation.update_branch, &submission.target_package, fingerprint)? {
        VerifyOutcome::Confirmed => {
            verdict.note(format!(
                "matching sources found in {}",
                generation.update_branch
            ));
            return Ok(ArmFlow::Decided(Decision::Approve));
        }
        VerifyOutcome::Pending => {
            verdict.note(format!(
                "an open request against {} would match",
                generation.update_branch
            ));
            return Ok(ArmFlow::Decided(Decision::Indeterminate));
        }
        VerifyOutcome::NotFound => {}
    }

    // where did this package come from before? a trunk history licenses
    // the silent-enterprise-move search
    if let Some(table) = ctx.tables.generation(generation_index)
        && let Some(old_raw) = table.raw(&submission.target_package)
        && let Ok(ClassifiedOrigin::PlainBranch { branch }) = classify_origin(Some(old_raw))
        && ctx.topology.is_trunk_origin(&branch)
    {
        verdict.note(format!(
            "package came from {branch} in {}",
            generation.family
        ));
        for candidate in &ctx.topology.enterprise.fallback_branches {
            if verifier.branch_matches(candidate, &submission.target_package, fingerprint)? {
                verdict.escalations.release_manager = true;
                verdict.note(format!(
                    "request sources come from enterprise branch {candidate}"
                ));
                return Ok(ArmFlow::Decided(Decision::Approve));
            }
        }
    }

    verdict.escalations.release_manager = true;
    Ok(ArmFlow::FallThrough { relaxed: false })
}

fn enterprise_origin_arm<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    origin: &str,
    fingerprint: &str,
) -> Result<ArmFlow, SourceError> {
    let submission = ctx.submission;
    if ctx.toggles.must_approve_maintenance_updates {
        verdict.escalations.release_manager = true;
    }

    // workaround overlays are informational: they pull in release
    // management but never change the decision
    for generation in &ctx.topology.stable {
        let Some(overlay) = &generation.workaround_branch else {
            continue;
        };
        if verifier.package_in_branch(overlay, &submission.target_package)? {
            verdict.note(format!("found package in {overlay}"));
            if !verifier.branch_matches(overlay, &submission.target_package, fingerprint)? {
                verdict.note(format!("sources in {overlay} are not identical"));
            }
            verdict.escalations.release_manager = true;
        }
    }

    if submission.source_branch == origin {
        verdict.note(format!("submission from the recorded origin {origin}"));
        return Ok(ArmFlow::Decided(Decision::Approve));
    }
    if let Some(update) = ctx.topology.enterprise.ga_update_counterpart(origin)
        && submission.source_branch == update
    {
        verdict.note(format!("submission from the update counterpart {update}"));
        return Ok(ArmFlow::Decided(Decision::Approve));
    }
    if ctx
        .topology
        .enterprise
        .from_later_pack(origin, &submission.source_branch)
    {
        verdict.note(format!(
            "submission from a later service pack than {origin}"
        ));
        return Ok(ArmFlow::Decided(Decision::Approve));
    }

    verdict.escalations.release_manager = true;
    Ok(ArmFlow::FallThrough { relaxed: true })
}

/// Composite verification against trunk and its non-free counterpart.
fn verify_trunk_pair<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    package: &str,
    fingerprint: &str,
) -> Result<VerifyOutcome, SourceError> {
    match verifier.verify(&ctx.topology.trunk, package, fingerprint)? {
        VerifyOutcome::NotFound => {}
        outcome => return Ok(outcome),
    }
    if let Some(nonfree) = &ctx.topology.trunk_nonfree {
        match verifier.verify(nonfree, package, fingerprint)? {
            VerifyOutcome::NotFound => {}
            outcome => return Ok(outcome),
        }
    }
    Ok(VerifyOutcome::NotFound)
}

/// Widening search: trunk pair, then the previous stable generation, then
/// the package's recorded devel branch. Strictly sequential; a fallback is
/// only consulted after everything before it returned NotFound.
fn trunk_presence_search<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    fingerprint: &str,
) -> Result<VerifyOutcome, SourceError> {
    let package = &ctx.submission.target_package;

    match verify_trunk_pair(ctx, verifier, package, fingerprint)? {
        VerifyOutcome::NotFound => {}
        outcome => return Ok(outcome),
    }

    if let Some(previous) = ctx.topology.previous_generation()
        && verifier.package_in_branch(&previous.update_branch, package)?
    {
        match verifier.verify(&previous.update_branch, package, fingerprint)? {
            VerifyOutcome::NotFound => {
                verdict.note(format!("different sources in {}", previous.update_branch));
            }
            outcome => {
                verdict.note(format!("found source match in {}", previous.update_branch));
                return Ok(outcome);
            }
        }
    }

    match verifier.devel_link(&ctx.topology.trunk, package)? {
        Some(link) => {
            let devel_package = link.package.clone().unwrap_or_else(|| package.clone());
            if verifier.package_in_branch(&link.branch, &devel_package)? {
                match verifier.verify(&link.branch, &devel_package, fingerprint)? {
                    VerifyOutcome::NotFound => {
                        verdict.note(format!(
                            "different sources in {}/{devel_package}",
                            link.branch
                        ));
                    }
                    outcome => {
                        verdict.note(format!(
                            "matching sources in {}/{devel_package}",
                            link.branch
                        ));
                        return Ok(outcome);
                    }
                }
            }
        }
        None => {
            verdict.note(format!(
                "no devel branch recorded for {}/{package}",
                ctx.topology.trunk
            ));
        }
    }

    Ok(VerifyOutcome::NotFound)
}

/// The shared fallthrough every undecided arm lands in.
fn shared_verification<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    fingerprint: &str,
    relaxed: bool,
) -> Result<Decision, SourceError> {
    let presence = trunk_presence_search(ctx, verifier, verdict, fingerprint)?;
    let outside_families = !ctx
        .topology
        .in_maintained_families(&ctx.submission.source_branch);

    Ok(match presence {
        VerifyOutcome::Confirmed => {
            verdict.trunk_presence = Some(true);
            verdict.escalations.review_team = outside_families;
            verdict.note("submitted sources are in or accepted for trunk");
            Decision::Approve
        }
        VerifyOutcome::Pending => {
            verdict.pending_trunk_submission = true;
            verdict.escalations.review_team = false;
            verdict.note("submission is waiting for a trunk request to complete");
            Decision::Indeterminate
        }
        VerifyOutcome::NotFound => {
            verdict.trunk_presence = Some(false);
            verdict.note("submitted sources are not in trunk");
            if relaxed {
                verdict.escalations.review_team = true;
                Decision::Approve
            } else {
                verdict.escalations.review_team = outside_families;
                Decision::Reject
            }
        }
    })
}

/// Review path for submissions targeting the enterprise family itself.
///
/// The enterprise lookup table supplies the expected origin; trunk
/// presence approves or defers outright, and when nothing matches anywhere
/// the decision falls back to whether the origin is unchanged.
fn enterprise_target_review<P: SourceProvider + ?Sized>(
    ctx: &ReviewContext<'_>,
    verifier: &mut SourceVerifier<'_, P>,
    verdict: &mut Verdict,
    fingerprint: &str,
) -> Result<(), SourceError> {
    let submission = ctx.submission;
    let package = &submission.target_package;

    let origin_unchanged = match ctx.tables.enterprise.raw(package) {
        None => true,
        Some(raw) => {
            let unchanged =
                raw == FORK_MARKER || submission.source_branch.starts_with(raw);
            verdict.note(format!(
                "expected origin is '{raw}' ({})",
                if unchanged { "unchanged" } else { "changed" }
            ));
            unchanged
        }
    };

    match verify_trunk_pair(ctx, verifier, package, fingerprint)? {
        VerifyOutcome::Confirmed => {
            verdict.trunk_presence = Some(true);
            verdict.note("submitted sources are in or accepted for trunk");
            verdict.decision = Decision::Approve;
            return Ok(());
        }
        VerifyOutcome::Pending => {
            verdict.pending_trunk_submission = true;
            verdict.note("submission is waiting for a trunk request to complete");
            verdict.decision = Decision::Indeterminate;
            return Ok(());
        }
        VerifyOutcome::NotFound => {}
    }

    if verifier.package_in_branch(&ctx.topology.trunk, package)? {
        verdict.note(format!(
            "different sources in {}/{package}",
            ctx.topology.trunk
        ));
    }
    if let Some(previous) = ctx.topology.previous_generation()
        && verifier.package_in_branch(&previous.family, package)?
    {
        if verifier.branch_matches(&previous.family, package, fingerprint)? {
            verdict.note(format!("found source match in {}", previous.family));
        } else {
            verdict.note(format!("different sources in {}/{package}", previous.family));
        }
    }

    match verifier.devel_link(&ctx.topology.trunk, package)? {
        Some(link) => {
            let devel_package = link.package.clone().unwrap_or_else(|| package.clone());
            if verifier.package_in_branch(&link.branch, &devel_package)? {
                if verifier.branch_matches(&link.branch, &devel_package, fingerprint)? {
                    verdict.note(format!(
                        "matching sources in {}/{devel_package}",
                        link.branch
                    ));
                    verdict.decision = Decision::Approve;
                    return Ok(());
                }
                verdict.note(format!(
                    "different sources in {}/{devel_package}",
                    link.branch
                ));
            }
        }
        None => {
            verdict.note(format!(
                "no devel branch recorded for {}/{package}",
                ctx.topology.trunk
            ));
        }
    }

    verdict.note("no matching sources in trunk, the previous stable generation, or the devel branch");
    verdict.decision = if origin_unchanged {
        Decision::Approve
    } else {
        Decision::Reject
    };
    Ok(())
}
