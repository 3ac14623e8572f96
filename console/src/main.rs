//! LibraryApp command-line client
//!
//! Runs one sync operation against the library-management service and prints
//! the reconciled store.
//!
//! Usage:
//!   libraryapp libraries
//!   libraryapp checkout 1 978-0441013593 --user alice

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use libraryapp_console::{
    load_config, render_book, render_book_details, render_library, render_loan,
};
use libraryapp_remote::HttpRemote;
use libraryapp_sync::{CheckoutWorkflow, StatusSink, StoreHandle, SyncController, SyncEvent};
use libraryapp_types::{
    Book, BookDetails, Isbn, Library, LibraryDraft, LibraryId, LoanRecord, ScreenId,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "libraryapp")]
#[command(about = "LibraryApp command-line client")]
struct Args {
    /// Base URL of the library service
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all libraries
    Libraries,

    /// Create a library
    AddLibrary {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
        #[arg(long, default_value = "")]
        open: String,
        #[arg(long, default_value = "")]
        close: String,
        #[arg(long, default_value = "")]
        days: String,
    },

    /// Edit a library; omitted fields keep their current value
    EditLibrary {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        open: Option<String>,
        #[arg(long)]
        close: Option<String>,
        #[arg(long)]
        days: Option<String>,
    },

    /// Delete a library
    DeleteLibrary { id: String },

    /// List the books of a library
    Books { library_id: String },

    /// Check a book out of a library
    Checkout {
        library_id: String,
        isbn: String,
        /// Borrower name
        #[arg(short, long)]
        user: String,
    },

    /// List the loans of a user
    Loans { username: String },

    /// Show a book's details
    Book { isbn: Option<String> },
}

/// Logs every status transition.
struct LogSink;

impl StatusSink for LogSink {
    fn publish(&self, event: SyncEvent) {
        debug!("[{}] {:?} -> {:?}", event.screen, event.operation, event.state);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let config = load_config(args.config.as_deref(), args.base_url, args.timeout)?;
    info!("Using library service at {}", config.base_url);
    let remote = HttpRemote::new(config).context("Failed to build HTTP client")?;
    let controller = SyncController::with_sink(Arc::new(remote), Arc::new(LogSink));

    run(&controller, args.command).await
}

async fn run(controller: &SyncController, command: Command) -> Result<()> {
    match command {
        Command::Libraries => {
            let libraries = screen::<Library>();
            for library in controller.load_libraries(&libraries).await? {
                println!("{}", render_library(&library));
            }
        }
        Command::AddLibrary {
            name,
            address,
            open,
            close,
            days,
        } => {
            let libraries = screen::<Library>();
            let draft = LibraryDraft::new(name, address)
                .with_hours(open, close)
                .with_days(days);
            let created = controller.create_library(&libraries, draft).await?;
            println!("Created {}", render_library(&created));
        }
        Command::EditLibrary {
            id,
            name,
            address,
            open,
            close,
            days,
        } => {
            let libraries = screen::<Library>();
            let id = LibraryId::new(id);
            controller.load_libraries(&libraries).await?;
            let current = libraries
                .get(id.as_str())
                .await
                .with_context(|| format!("Library {} does not exist", id))?;

            let mut draft = current.draft();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(address) = address {
                draft.address = address;
            }
            if let Some(open) = open {
                draft.open_time = open;
            }
            if let Some(close) = close {
                draft.close_time = close;
            }
            if let Some(days) = days {
                draft.open_days = days;
            }

            controller.update_library(&libraries, &id, draft).await?;
            if let Some(updated) = libraries.get(id.as_str()).await {
                println!("Updated {}", render_library(&updated));
            }
        }
        Command::DeleteLibrary { id } => {
            let libraries = screen::<Library>();
            controller
                .delete_library(&libraries, &LibraryId::new(id.as_str()))
                .await?;
            println!("Deleted library {}", id);
        }
        Command::Books { library_id } => {
            let books = screen::<Book>();
            let library_id = LibraryId::new(library_id);
            for book in controller.load_books(&library_id, &books).await? {
                println!("{}", render_book(&book));
            }
        }
        Command::Checkout {
            library_id,
            isbn,
            user,
        } => {
            let books = screen::<Book>();
            let library_id = LibraryId::new(library_id);
            let isbn = Isbn::new(isbn);
            controller.load_books(&library_id, &books).await?;

            CheckoutWorkflow::new(controller)
                .checkout(&library_id, &books, &isbn, &user)
                .await?;
            if let Some(book) = books.get(isbn.as_str()).await {
                println!("Checked out {}", render_book(&book));
            }
        }
        Command::Loans { username } => {
            let loans = screen::<LoanRecord>();
            let today = chrono::Local::now().date_naive();
            let records = controller.load_loans(&username, &loans).await?;
            if records.is_empty() {
                println!("No loans for {}", username.trim());
            }
            for loan in records {
                println!("{}", render_loan(&loan, today));
            }
        }
        Command::Book { isbn } => {
            let details = BookDetails::from_params(isbn.as_deref());
            println!("{}", render_book_details(&details));
        }
    }
    Ok(())
}

/// A fresh store scoped to this invocation.
fn screen<T: libraryapp_types::Record>() -> StoreHandle<T> {
    StoreHandle::new(ScreenId::new())
}
