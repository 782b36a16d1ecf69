// UI layer: command-line arguments and the single upload run. Prints one
// status line; a rejected upload is still a normal exit.

use crate::api::{upload_file, Credentials, UploadClient, UploadOutcome};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "datalake-upload")]
#[command(about = "Compress a file and upload it to the data lake", long_about = None)]
pub struct Cli {
    /// Full path to the file to upload
    pub filepath: PathBuf,

    /// Method name the file belongs to
    pub methodname: String,

    /// Username registered in the system
    pub username: String,

    /// Secret key that authenticates the user
    pub secretkey: String,

    /// Name under which the file is stored in the data lake
    #[arg(long)]
    pub filename: Option<String>,

    /// Upload endpoint, overrides DATALAKE_UPLOAD_URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Log pipeline steps to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.methodname, &self.secretkey)
    }

    pub fn client(&self) -> Result<UploadClient> {
        let client = match &self.endpoint {
            Some(endpoint) => UploadClient::new(endpoint.as_str()),
            None => UploadClient::from_env(),
        };
        client.context("Failed to build HTTP client")
    }
}

/// Run one upload and print its outcome. Local read errors and transport
/// errors are returned; a server rejection is printed and returns `Ok`.
pub fn run(cli: &Cli) -> Result<UploadOutcome> {
    let client = cli.client()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(format!("Uploading {}...", cli.filepath.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = upload_file(
        &client,
        &cli.filepath,
        &cli.credentials(),
        cli.filename.as_deref(),
    );
    spinner.finish_and_clear();

    let outcome = result.with_context(|| format!("Upload of {} failed", cli.filepath.display()))?;
    if cli.json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        println!("{}", outcome);
    }
    Ok(outcome)
}
