use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use osf_api::types::{LinkAvailability, OsfTime, PreprintInput};
use osf_api::{CancellationToken, Client, CreationError, PreprintQuery, Query, Upload};

use crate::output::{print_json, print_preprints_table, OutputFormat};

#[derive(Args)]
pub struct PreprintsArgs {
    #[command(subcommand)]
    pub command: PreprintsCommand,
}

#[derive(Subcommand)]
pub enum PreprintsCommand {
    /// List preprints
    List(ListArgs),
    /// Show one preprint
    Get(GetArgs),
    /// Create a preprint with its primary file, optionally publishing it
    Create(Box<CreateArgs>),
    /// Update attributes of an existing preprint
    Update(Box<UpdateArgs>),
}

#[derive(Args)]
pub struct ListArgs {
    /// Filter by provider id (e.g. osf, psyarxiv)
    #[arg(long)]
    pub provider: Option<String>,

    /// Filter by review state (e.g. pending, accepted)
    #[arg(long)]
    pub reviews_state: Option<String>,

    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Filter by publication status
    #[arg(long)]
    pub published: Option<bool>,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value = "10")]
    pub page_size: u32,
}

#[derive(Args)]
pub struct GetArgs {
    /// Preprint id
    pub id: String,
}

/// Attributes shared by `create` and `update`.
#[derive(Args)]
pub struct AttributeArgs {
    /// Preprint title
    #[arg(long)]
    pub title: Option<String>,

    /// Abstract
    #[arg(long)]
    pub description: Option<String>,

    /// Tag, repeatable
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Subject path as comma-separated ids, top-level subject first; repeatable
    #[arg(long = "subject")]
    pub subjects: Vec<String>,

    /// DOI of the peer-reviewed publication
    #[arg(long)]
    pub doi: Option<String>,

    /// Original publication date (YYYY-MM-DD or full timestamp)
    #[arg(long, value_parser = parse_date)]
    pub original_publication_date: Option<OsfTime>,

    /// Whether the authors declare a conflict of interest
    #[arg(long)]
    pub has_coi: Option<bool>,

    /// Conflict of interest statement
    #[arg(long)]
    pub coi_statement: Option<String>,

    /// Data links: available, no or not_applicable
    #[arg(long)]
    pub has_data_links: Option<LinkAvailability>,

    /// Data link URL, repeatable
    #[arg(long = "data-link")]
    pub data_links: Vec<String>,

    /// Reason for not sharing data
    #[arg(long)]
    pub why_no_data: Option<String>,

    /// Preregistration links: available, no or not_applicable
    #[arg(long)]
    pub has_prereg_links: Option<LinkAvailability>,

    /// Preregistration link URL, repeatable
    #[arg(long = "prereg-link")]
    pub prereg_links: Vec<String>,

    /// Reason for not preregistering
    #[arg(long)]
    pub why_no_prereg: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Provider to submit to
    #[arg(long)]
    pub provider: String,

    /// Primary file to upload
    #[arg(long)]
    pub file: PathBuf,

    /// Publish once the primary file is attached
    #[arg(long)]
    pub publish: bool,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Preprint id
    pub id: String,

    /// Set the publication status
    #[arg(long)]
    pub published: Option<bool>,

    #[command(flatten)]
    pub attributes: AttributeArgs,
}

pub async fn run(args: &PreprintsArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    match &args.command {
        PreprintsCommand::List(args) => list(args, client, format).await,
        PreprintsCommand::Get(args) => get(args, client, format).await,
        PreprintsCommand::Create(args) => create(args, client, format).await,
        PreprintsCommand::Update(args) => update(args, client, format).await,
    }
}

async fn list(args: &ListArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let mut query = PreprintQuery::default()
        .with_page(args.page)
        .with_page_size(args.page_size);

    if let Some(ref provider) = args.provider {
        query = query.with_provider(provider);
    }
    if let Some(ref state) = args.reviews_state {
        query = query.with_reviews_state(state);
    }
    if let Some(ref tag) = args.tag {
        query = query.with_tag(tag);
    }
    if let Some(published) = args.published {
        query = query.with_published(published);
    }

    let resp = client.preprints().list(&query).await?;

    eprintln!(
        "Page {} ({} per page, {} total preprints)",
        resp.pagination.page, resp.pagination.per_page, resp.pagination.total
    );

    match format {
        OutputFormat::Table => print_preprints_table(&resp.data, &resp.resources),
        OutputFormat::Json => print_json(&resp.data),
    }

    Ok(())
}

async fn get(args: &GetArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client
        .preprints()
        .get(&args.id)
        .await
        .with_context(|| format!("Failed to fetch preprint {}", args.id))?;

    match format {
        OutputFormat::Table => {
            print_preprints_table(std::slice::from_ref(&resp.data), std::slice::from_ref(&resp.resource))
        }
        OutputFormat::Json => print_json(&resp.data),
    }

    Ok(())
}

async fn create(args: &CreateArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let input = build_input(
        PreprintInput::for_provider(&args.provider).with_published(args.publish),
        &args.attributes,
    )?;
    let upload = Upload::from_path(&args.file)
        .await
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Interrupted, cancelling preprint creation");
            on_interrupt.cancel();
        }
    });

    let mut workflow = client
        .preprints()
        .create(input, upload)
        .with_cancellation(cancel);
    if let Some(secs) = args.timeout_secs {
        workflow = workflow.with_timeout(Duration::from_secs(secs));
    }

    let created = match workflow.run().await {
        Ok(created) => created,
        Err(e) => {
            report_partial(&e);
            return Err(e.into());
        }
    };

    eprintln!(
        "Created preprint {} with primary file {} (last stage: {})",
        created.preprint.id, created.file_id, created.stage
    );

    match format {
        OutputFormat::Table => print_preprints_table(std::slice::from_ref(&created.preprint), &[]),
        OutputFormat::Json => print_json(&created.preprint),
    }

    Ok(())
}

async fn update(args: &UpdateArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let mut input = build_input(PreprintInput::default(), &args.attributes)?;
    input.is_published = args.published;

    let resp = client
        .preprints()
        .update(&args.id, Some(&input), None)
        .await
        .with_context(|| format!("Failed to update preprint {}", args.id))?;

    match format {
        OutputFormat::Table => {
            print_preprints_table(std::slice::from_ref(&resp.data), std::slice::from_ref(&resp.resource))
        }
        OutputFormat::Json => print_json(&resp.data),
    }

    Ok(())
}

fn build_input(mut input: PreprintInput, attrs: &AttributeArgs) -> Result<PreprintInput> {
    if let Some(ref title) = attrs.title {
        input = input.with_title(title);
    }
    if let Some(ref description) = attrs.description {
        input = input.with_description(description);
    }
    if !attrs.tags.is_empty() {
        input = input.with_tags(&attrs.tags);
    }
    for subject in &attrs.subjects {
        let path = parse_subject_path(subject)?;
        input = input.with_subject_path(&path);
    }
    if let Some(ref doi) = attrs.doi {
        input = input.with_doi(doi);
    }
    if let Some(date) = attrs.original_publication_date {
        input = input.with_original_publication_date(date);
    }
    if let Some(has_coi) = attrs.has_coi {
        input = input.with_coi(has_coi);
    }
    input.conflict_of_interest_statement = attrs.coi_statement.clone();

    if let Some(availability) = attrs.has_data_links {
        input = input.with_data_links(availability);
    }
    if !attrs.data_links.is_empty() {
        input.data_links = Some(attrs.data_links.clone());
    }
    input.why_no_data = attrs.why_no_data.clone();

    if let Some(availability) = attrs.has_prereg_links {
        input = input.with_prereg_links(availability);
    }
    if !attrs.prereg_links.is_empty() {
        input.prereg_links = Some(attrs.prereg_links.clone());
    }
    input.why_no_prereg = attrs.why_no_prereg.clone();

    Ok(input)
}

fn parse_subject_path(raw: &str) -> Result<Vec<String>> {
    let path: Vec<String> = raw
        .split(',')
        .map(|id| id.trim().to_string())
        .collect();
    if path.iter().any(|id| id.is_empty()) {
        bail!("Invalid subject path {:?}: expected comma-separated subject ids", raw);
    }
    Ok(path)
}

fn parse_date(raw: &str) -> Result<OsfTime, String> {
    let raw = raw.trim();
    let full = if raw.len() == 10 {
        format!("{}T00:00:00", raw)
    } else {
        raw.to_string()
    };
    full.parse::<OsfTime>()
        .map_err(|e| format!("invalid date {:?}: {}", raw, e))
}

fn report_partial(err: &CreationError) {
    eprintln!("Preprint creation failed at the {} stage", err.stage);
    if err.created_nothing() {
        eprintln!("Nothing was created.");
        return;
    }
    if let Some(ref id) = err.preprint_id {
        eprintln!("Draft preprint left behind: {}", id);
    }
    if let Some(ref id) = err.file_id {
        eprintln!("Uploaded file: {}", id);
    }
}
