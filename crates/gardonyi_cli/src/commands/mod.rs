//! CLI command implementations.

pub mod demo;
pub mod entity;
pub mod route;

use clap::{Args, ValueEnum};
use gardonyi_client::{ClientResult, HttpClient, HttpTransport, StoreRegistry, SyncState};
use gardonyi_model::{Page, Post, Record};
use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Entity type selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    /// Pages.
    Page,
    /// Blog posts.
    Post,
}

/// Record fields given on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Content
    #[arg(long)]
    pub content: Option<String>,

    /// Author (posts only)
    #[arg(long)]
    pub author: Option<String>,
}

impl FieldArgs {
    /// Builds a page from the given fields.
    pub fn to_page(&self) -> Page {
        if self.author.is_some() {
            tracing::warn!("pages have no author; ignoring --author");
        }
        Page {
            id: None,
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }

    /// Builds a post from the given fields.
    pub fn to_post(&self) -> Post {
        Post {
            id: None,
            title: self.title.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
        }
    }
}

/// Store state as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct StateReport<'a, R: Record> {
    /// Entity name.
    pub entity_name: &'static str,
    /// Cached page of records.
    pub entities: &'a [R],
    /// Current record.
    pub entity: &'a R,
    /// Total record count.
    pub total_items: u64,
    /// Read in flight.
    pub loading: bool,
    /// Write in flight.
    pub updating: bool,
    /// Last write succeeded.
    pub update_success: bool,
    /// Last delete succeeded.
    pub delete_success: bool,
    /// Last failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<&'a str>,
}

impl<'a, R: Record> StateReport<'a, R> {
    /// Captures `state`.
    pub fn new(state: &'a SyncState<R>) -> Self {
        Self {
            entity_name: R::ENTITY_NAME,
            entities: state.entities(),
            entity: state.entity(),
            total_items: state.total_items(),
            loading: state.loading(),
            updating: state.updating(),
            update_success: state.update_success(),
            delete_success: state.delete_success(),
            error_message: state.error_message(),
        }
    }
}

/// Formats a record as one line of text.
pub fn record_line<R: Record>(record: &R) -> String {
    let id = record
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let fields: Vec<String> = record
        .fields()
        .into_iter()
        .map(|(name, value)| format!("{}={}", name, value.unwrap_or("")))
        .collect();
    format!("{:>5}  {}", id, fields.join("  "))
}

/// Prints a list of records.
pub fn print_records<R: Record>(
    records: &[R],
    total: u64,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(records)?),
        OutputFormat::Text => {
            println!("{} ({} of {})", R::RESOURCE_PATH, records.len(), total);
            for record in records {
                println!("{}", record_line(record));
            }
        }
    }
    Ok(())
}

/// Prints one record.
pub fn print_record<R: Record>(
    record: &R,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => println!("{}", record_line(record)),
    }
    Ok(())
}

/// Prints a store state.
pub fn print_state<R: Record>(
    state: &SyncState<R>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = StateReport::new(state);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{}: {} cached of {} | loading={} updating={} update_success={} delete_success={}",
                report.entity_name,
                report.entities.len(),
                report.total_items,
                report.loading,
                report.updating,
                report.update_success,
                report.delete_success
            );
            println!("entity: {}", record_line(report.entity));
            for record in report.entities {
                println!("{}", record_line(record));
            }
            if let Some(message) = report.error_message {
                println!("error: {}", message);
            }
        }
    }
    Ok(())
}

/// Fills the stores of an in-process server with sample content.
pub async fn seed<C: HttpClient + 'static>(registry: &StoreRegistry) -> ClientResult<()> {
    let pages = registry.store::<Page, HttpTransport<C>>()?;
    pages
        .create_entity(Page::new("Home", "Welcome to Gárdonyi"))
        .await?;
    pages.create_entity(Page::new("About", "Who we are")).await?;

    let posts = registry.store::<Post, HttpTransport<C>>()?;
    posts
        .create_entity(Post::new("Hello", "First post", "admin"))
        .await?;
    Ok(())
}
