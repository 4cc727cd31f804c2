use crate::support::{load_config_or_exit, load_dataset_or_exit, print_json_or_exit};
use lineage_source::devel_branches;
use serde_json::json;

pub fn run(dataset: String, config: String, branch: Option<String>, json_output: bool) {
    let branch = branch.unwrap_or_else(|| load_config_or_exit(&config).topology.trunk);
    let dataset = load_dataset_or_exit(&dataset);

    let branches = devel_branches(&dataset, &branch).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    if json_output {
        print_json_or_exit(&json!({
            "branch": branch,
            "develBranches": branches,
        }));
        return;
    }

    if branches.is_empty() {
        println!("no devel branches found");
        return;
    }
    for devel in branches {
        println!("{devel}");
    }
}
