use crate::support::{load_config_or_exit, load_dataset_or_exit, print_json_or_exit, yes_no};
use lineage_review::{BatchReport, MemorySink, run_batch};

pub struct Args {
    pub config: String,
    pub dataset: String,
    pub manual_version_updates: bool,
    pub manual_maintenance_updates: bool,
    pub custom_review_group: Option<String>,
    pub no_comment: bool,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut config = load_config_or_exit(&args.config);
    if args.manual_version_updates {
        config.policy.must_approve_version_updates = true;
    }
    if args.manual_maintenance_updates {
        config.policy.must_approve_maintenance_updates = true;
    }
    if args.custom_review_group.is_some() {
        config.custom_review_group = args.custom_review_group;
    }
    if args.no_comment {
        config.post_comments = false;
    }

    let dataset = load_dataset_or_exit(&args.dataset);
    let submissions = dataset.submissions().to_vec();
    let mut sink = MemorySink::new();
    for submission in &submissions {
        sink.seed_request(&submission.request_id);
    }

    let report = run_batch(&dataset, &mut sink, &config, &submissions).unwrap_or_else(|e| {
        eprintln!("error: failed to build lookup snapshots: {e}");
        std::process::exit(1);
    });

    if args.json {
        print_json_or_exit(&report);
        return;
    }
    render_text(&report);
}

fn render_text(report: &BatchReport) {
    println!(
        "lineage review: {} submissions ({} approved, {} rejected, {} deferred)",
        report.total, report.approved, report.rejected, report.deferred
    );
    for entry in &report.entries {
        println!(
            "  {} {} -> {}: {}",
            entry.request_id, entry.source, entry.target, entry.decision
        );
        if !entry.escalations.is_empty() {
            println!(
                "    escalations: release-manager={} review-team={} fork-review={}{}",
                yes_no(entry.escalations.release_manager),
                yes_no(entry.escalations.review_team),
                yes_no(entry.escalations.fork_review),
                entry
                    .escalations
                    .custom_group
                    .as_deref()
                    .map(|group| format!(" custom={group}"))
                    .unwrap_or_default()
            );
        }
        for line in entry.message.lines() {
            println!("    - {line}");
        }
        if let Some(deferred) = &entry.deferred {
            println!("    deferred: {deferred}");
        }
    }
}
