mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "osf")]
#[command(about = "Browse and submit preprints on the Open Science Framework")]
struct Cli {
    /// Output format: table or json
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Use the OSF test server instead of production
    #[arg(long, global = true)]
    test_server: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, show, create or update preprints
    Preprints(commands::preprints::PreprintsArgs),
    /// List or show preprint providers
    Providers(commands::providers::ProvidersArgs),
    /// Show stored files
    Files(commands::files::FilesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("osf=info".parse()?)
                .add_directive("osf_api=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Table,
    };

    let client = Config::from_env(cli.test_server).build_client()?;

    match &cli.command {
        Commands::Preprints(args) => commands::preprints::run(args, &client, &format).await?,
        Commands::Providers(args) => commands::providers::run(args, &client, &format).await?,
        Commands::Files(args) => commands::files::run(args, &client, &format).await?,
    }

    Ok(())
}
