use osf_api::codec::ResourceMeta;
use osf_api::types::{File, Preprint, PreprintLinks, PreprintProvider};
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct PreprintRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "State")]
    reviews_state: String,
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Created")]
    date_created: String,
}

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Submissions")]
    allow_submissions: String,
    #[tabled(rename = "Subject rules")]
    subjects_acceptable: usize,
    #[tabled(rename = "Domain")]
    domain: String,
}

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Modified")]
    date_modified: String,
}

/// Pairs each preprint with the provider id from its envelope, if known.
fn build_preprint_rows(
    preprints: &[Preprint],
    resources: &[ResourceMeta<PreprintLinks>],
) -> Vec<PreprintRow> {
    preprints
        .iter()
        .enumerate()
        .map(|(i, p)| PreprintRow {
            id: p.id.clone(),
            title: truncate(&p.title, 60),
            provider: resources
                .get(i)
                .and_then(|r| r.relationships.get("provider"))
                .and_then(|rel| rel.identifier())
                .map(|ident| ident.id.clone())
                .unwrap_or_else(|| "-".to_string()),
            reviews_state: p.reviews_state.clone(),
            published: yes_no(p.is_published),
            date_created: p
                .date_created
                .as_ref()
                .map(|d| d.as_datetime().format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn build_provider_rows(providers: &[PreprintProvider]) -> Vec<ProviderRow> {
    providers
        .iter()
        .map(|p| ProviderRow {
            id: p.id.clone(),
            name: p.name.clone(),
            allow_submissions: yes_no(p.allow_submissions),
            subjects_acceptable: p.subjects_acceptable.len(),
            domain: p.domain.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn build_file_rows(files: &[File]) -> Vec<FileRow> {
    files
        .iter()
        .map(|f| FileRow {
            id: f.id.clone(),
            name: f.name.clone(),
            kind: f.kind.clone(),
            size: f.size.map(format_size).unwrap_or_else(|| "-".to_string()),
            provider: f.provider.clone(),
            date_modified: f.date_modified.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn print_preprints_table(preprints: &[Preprint], resources: &[ResourceMeta<PreprintLinks>]) {
    println!("{}", Table::new(build_preprint_rows(preprints, resources)));
}

pub fn print_providers_table(providers: &[PreprintProvider]) {
    println!("{}", Table::new(build_provider_rows(providers)));
}

pub fn print_files_table(files: &[File]) {
    println!("{}", Table::new(build_file_rows(files)));
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn yes_no(value: bool) -> String {
    let answer = if value { "yes" } else { "no" };
    answer.to_string()
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}
