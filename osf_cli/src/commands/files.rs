use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use osf_api::services::normalize_file_id;
use osf_api::Client;

use crate::output::{print_files_table, print_json, OutputFormat};

#[derive(Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    pub command: FilesCommand,
}

#[derive(Subcommand)]
pub enum FilesCommand {
    /// Show one file
    Get(GetArgs),
}

#[derive(Args)]
pub struct GetArgs {
    /// File id, with or without the storage provider prefix
    pub id: String,
}

pub async fn run(args: &FilesArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    match &args.command {
        FilesCommand::Get(args) => get(args, client, format).await,
    }
}

async fn get(args: &GetArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let id = normalize_file_id(&args.id);
    let resp = client
        .files()
        .get(id)
        .await
        .with_context(|| format!("Failed to fetch file {}", id))?;

    match format {
        OutputFormat::Table => print_files_table(std::slice::from_ref(&resp.data)),
        OutputFormat::Json => print_json(&resp.data),
    }

    Ok(())
}
