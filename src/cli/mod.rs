pub mod demo;
pub mod export;
pub mod init;
pub mod inspect;
pub mod sources;

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "shepherd",
    about = "Migrate church-management exports into Slingshot packages."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up Shepherd: choose a data directory and defaults.
    Init {
        /// Path for scratch and settings data (default: ~/Documents/shepherd)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Maximum rows processed per export phase
        #[arg(long = "loop-threshold")]
        loop_threshold: Option<u64>,
    },
    /// Export a source-system directory into a .slingshot package.
    Export {
        /// Directory containing the source system's export files
        input: String,
        /// Source system key (see `shepherd sources`); auto-detected when omitted
        #[arg(long)]
        source: Option<String>,
        /// Output package path (default: <input>/export.slingshot)
        #[arg(long)]
        output: Option<String>,
        /// Skip profile photos and the sibling image archives
        #[arg(long = "no-images")]
        no_images: bool,
    },
    /// List supported source systems.
    Sources,
    /// Show the contents of a .slingshot package.
    Inspect {
        /// Path to a .slingshot file
        package: String,
    },
    /// Build a small sample package to explore the output format.
    Demo {
        /// Output package path (default: ./demo.slingshot)
        #[arg(long)]
        output: Option<String>,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

pub fn completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
