use crate::support::print_json_or_exit;
use lineage_kernel::classify_origin;

pub fn run(descriptor: Option<String>, json_output: bool) {
    let origin = classify_origin(descriptor.as_deref()).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(2);
    });

    if json_output {
        print_json_or_exit(&origin);
        return;
    }
    println!("{origin}");
}
