use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use osf_api::{Client, PreprintProviderQuery, Query};

use crate::output::{print_json, print_providers_table, OutputFormat};

#[derive(Args)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

#[derive(Subcommand)]
pub enum ProvidersCommand {
    /// List preprint providers
    List(ListArgs),
    /// Show one provider, including its acceptable subjects
    Get(GetArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by provider name
    #[arg(long)]
    pub name: Option<String>,

    /// Only providers that accept submissions
    #[arg(long)]
    pub accepting: bool,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value = "10")]
    pub page_size: u32,
}

#[derive(Args)]
pub struct GetArgs {
    /// Provider id (e.g. osf, psyarxiv)
    pub id: String,
}

pub async fn run(args: &ProvidersArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    match &args.command {
        ProvidersCommand::List(args) => list(args, client, format).await,
        ProvidersCommand::Get(args) => get(args, client, format).await,
    }
}

async fn list(args: &ListArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let mut query = PreprintProviderQuery::default()
        .with_page(args.page)
        .with_page_size(args.page_size);

    if let Some(ref name) = args.name {
        query = query.with_name(name);
    }
    if args.accepting {
        query = query.with_allow_submissions(true);
    }

    let resp = client.preprint_providers().list(&query).await?;

    eprintln!(
        "Page {} ({} per page, {} total providers)",
        resp.pagination.page, resp.pagination.per_page, resp.pagination.total
    );

    match format {
        OutputFormat::Table => print_providers_table(&resp.data),
        OutputFormat::Json => print_json(&resp.data),
    }

    Ok(())
}

async fn get(args: &GetArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client
        .preprint_providers()
        .get(&args.id)
        .await
        .with_context(|| format!("Failed to fetch provider {}", args.id))?;
    let provider = resp.data;

    match format {
        OutputFormat::Table => {
            print_providers_table(std::slice::from_ref(&provider));
            for subject in &provider.subjects_acceptable {
                eprintln!(
                    "  {}{}",
                    subject.taxonomy_ids.join(" > "),
                    if subject.include_all_children {
                        " (and all children)"
                    } else {
                        ""
                    }
                );
            }
        }
        OutputFormat::Json => print_json(&provider),
    }

    Ok(())
}
