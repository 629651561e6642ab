mod cli;
mod coerce;
mod error;
mod fmt;
mod keygen;
mod models;
mod package;
mod progress;
mod settings;
mod sources;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            loop_threshold,
        } => cli::init::run(data_dir, loop_threshold),
        Commands::Export {
            input,
            source,
            output,
            no_images,
        } => cli::export::run(&input, source.as_deref(), output.as_deref(), no_images),
        Commands::Sources => cli::sources::run(),
        Commands::Inspect { package } => cli::inspect::run(&package),
        Commands::Demo { output } => cli::demo::run(output.as_deref()),
        Commands::Completions { shell } => {
            cli::completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
