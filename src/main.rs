// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run one upload.
// - Returns `anyhow::Result` so read and transport errors exit non-zero.

use clap::Parser;
use datalake_upload::ui::{run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    run(&cli)?;
    Ok(())
}
