use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lineage",
    about = "Lineage: provenance-driven acceptance review for package submissions",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review pending submissions from a data-source snapshot
    Review {
        /// Path to the review configuration (TOML)
        #[arg(long, default_value = "lineage.toml")]
        config: String,

        /// Path to the data-source snapshot (JSON)
        #[arg(long, default_value = "dataset.json")]
        dataset: String,

        /// Release manager must approve version updates
        #[arg(long)]
        manual_version_updates: bool,

        /// Release manager must approve maintenance updates
        #[arg(long)]
        manual_maintenance_updates: bool,

        /// Extra reviewer group attached when automated checks pass
        #[arg(long, value_name = "GROUP")]
        custom_review_group: Option<String>,

        /// Don't post the note log as the request message
        #[arg(long)]
        no_comment: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the devel branches recorded for a branch's packages
    DevelProjects {
        /// Path to the data-source snapshot (JSON)
        #[arg(long, default_value = "dataset.json")]
        dataset: String,

        /// Path to the review configuration (TOML); supplies the default
        /// branch
        #[arg(long, default_value = "lineage.toml")]
        config: String,

        /// Branch to inspect instead of the configured trunk
        #[arg(long)]
        branch: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a raw origin descriptor
    Classify {
        /// The descriptor; omit for a package with no recorded history
        descriptor: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the composite checksum verification for one candidate branch
    VerifySource {
        /// Path to the data-source snapshot (JSON)
        #[arg(long, default_value = "dataset.json")]
        dataset: String,

        /// Candidate branch
        #[arg(long)]
        branch: String,

        /// Package name
        #[arg(long)]
        package: String,

        /// Expected content fingerprint
        #[arg(long)]
        fingerprint: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
