use crate::support::{load_dataset_or_exit, print_json_or_exit};
use lineage_source::SourceVerifier;
use serde_json::json;

pub fn run(
    dataset: String,
    branch: String,
    package: String,
    fingerprint: String,
    json_output: bool,
) {
    let dataset = load_dataset_or_exit(&dataset);
    let mut verifier = SourceVerifier::new(&dataset);

    let outcome = verifier
        .verify(&branch, &package, &fingerprint)
        .unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        });

    if json_output {
        print_json_or_exit(&json!({
            "branch": branch,
            "package": package,
            "fingerprint": fingerprint,
            "outcome": outcome,
        }));
        return;
    }
    println!("lineage verify-source {branch}/{package}: {outcome}");
}
