//! Shared helpers for the `libraryapp` command-line client: configuration
//! loading and plain-text rendering of records.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use libraryapp_remote::RemoteConfig;
use libraryapp_types::{Book, BookDetails, Library, LoanRecord};
use std::fs;
use std::path::Path;
use tracing::info;

/// Builds the remote configuration. Values from the JSON file at `path` (if
/// any) are overridden by the flags that were given.
pub fn load_config(
    path: Option<&Path>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<RemoteConfig> {
    let mut config = match path {
        Some(path) => {
            info!("Loading config from {:?}", path);
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => RemoteConfig::default(),
    };

    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    if let Some(timeout_secs) = timeout_secs {
        config.timeout_secs = timeout_secs;
    }
    Ok(config)
}

pub fn render_library(library: &Library) -> String {
    format!(
        "[{}] {} | {} | {}-{} {}",
        library.id,
        library.name,
        library.address,
        library.open_time,
        library.close_time,
        library.open_days
    )
}

pub fn render_book(book: &Book) -> String {
    let authors = book.authors_line();
    let authors = if authors.is_empty() { "-" } else { authors.as_str() };
    format!(
        "{} | {} | {} | {} available",
        book.isbn, book.title, authors, book.available
    )
}

/// One loan line; past-due loans are flagged.
pub fn render_loan(loan: &LoanRecord, today: NaiveDate) -> String {
    let overdue = if loan.is_overdue(today) { " (overdue)" } else { "" };
    format!(
        "{} | {} | library {} | due {}{}",
        loan.book.title,
        loan.primary_author(),
        loan.library_id,
        loan.due_date,
        overdue
    )
}

pub fn render_book_details(details: &BookDetails) -> String {
    format!("Book ISBN: {}", details.isbn)
}
