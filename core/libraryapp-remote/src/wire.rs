//! Request and response shapes that differ from the domain entities.

use libraryapp_types::{Author, Book, Cover, Isbn};
use serde::{Deserialize, Serialize};

/// One element of `GET /v1/library/{id}/book`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryBookEntry {
    pub isbn: Isbn,
    pub available: u32,
    pub book: LibraryBookInfo,
}

/// Catalog data nested inside a [`LibraryBookEntry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryBookInfo {
    pub title: String,
    pub authors: Vec<Author>,
    pub cover: Cover,
}

impl From<LibraryBookEntry> for Book {
    fn from(entry: LibraryBookEntry) -> Self {
        Book {
            isbn: entry.isbn,
            title: entry.book.title,
            authors: entry.book.authors,
            cover: entry.book.cover,
            available: entry.available,
        }
    }
}

/// Body of `POST /v1/library/{id}/book/{isbn}/checkout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub username: String,
}
