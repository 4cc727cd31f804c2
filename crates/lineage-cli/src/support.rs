use lineage_review::ReviewConfig;
use lineage_source::Dataset;

pub fn load_config_or_exit(path: &str) -> ReviewConfig {
    ReviewConfig::load_from(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_dataset_or_exit(path: &str) -> Dataset {
    Dataset::load(path).unwrap_or_else(|e| {
        eprintln!("error: failed to load dataset {path}: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit<T: serde::Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("error: failed to render json: {e}");
        std::process::exit(1);
    });
    println!("{rendered}");
}

pub fn yes_no(ok: bool) -> &'static str {
    if ok { "yes" } else { "no" }
}
