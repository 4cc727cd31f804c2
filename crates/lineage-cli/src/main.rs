//! Lineage CLI: the `lineage` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Review {
            config,
            dataset,
            manual_version_updates,
            manual_maintenance_updates,
            custom_review_group,
            no_comment,
            json,
        } => commands::review::run(commands::review::Args {
            config,
            dataset,
            manual_version_updates,
            manual_maintenance_updates,
            custom_review_group,
            no_comment,
            json,
        }),

        Commands::DevelProjects {
            dataset,
            config,
            branch,
            json,
        } => commands::devel_projects::run(dataset, config, branch, json),

        Commands::Classify { descriptor, json } => commands::classify::run(descriptor, json),

        Commands::VerifySource {
            dataset,
            branch,
            package,
            fingerprint,
            json,
        } => commands::verify_source::run(dataset, branch, package, fingerprint, json),
    }
}
