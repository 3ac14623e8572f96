//! Book entity as held by a single library.

use crate::ids::Isbn;
use crate::kind::EntityKind;
use crate::record::Record;
use crate::Error;
use serde::{Deserialize, Serialize};

/// ISBN used when a book details view is opened without one.
pub const PLACEHOLDER_ISBN: &str = "unknown";

/// A book author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Cover image URLs in three sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cover {
    pub large_url: String,
    pub medium_url: String,
    pub small_url: String,
}

/// A book in one library's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub authors: Vec<Author>,
    pub cover: Cover,
    /// Number of copies that can still be checked out.
    pub available: u32,
}

impl Book {
    /// Whether at least one copy can be checked out.
    pub fn is_available(&self) -> bool {
        self.available > 0
    }

    /// Author names joined with ", ".
    pub fn authors_line(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Partial update of a book. Only the copy count changes on the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub available: Option<u32>,
}

impl BookPatch {
    pub fn available(count: u32) -> Self {
        Self {
            available: Some(count),
        }
    }
}

impl Record for Book {
    type Patch = BookPatch;

    const KIND: EntityKind = EntityKind::Book;

    fn key(&self) -> String {
        self.isbn.to_string()
    }

    fn apply(&mut self, patch: BookPatch) {
        if let Some(available) = patch.available {
            self.available = available;
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.isbn.is_empty() {
            return Err(Error::empty(EntityKind::Book, "isbn"));
        }
        Ok(())
    }
}

/// Parameters of the book details view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub isbn: Isbn,
}

impl BookDetails {
    /// Builds the details view from navigation parameters. A missing or
    /// blank ISBN falls back to [`PLACEHOLDER_ISBN`].
    pub fn from_params(isbn: Option<&str>) -> Self {
        let isbn = match isbn.map(str::trim) {
            Some(isbn) if !isbn.is_empty() => isbn,
            _ => PLACEHOLDER_ISBN,
        };
        Self {
            isbn: Isbn::from(isbn),
        }
    }

    /// Whether the placeholder was substituted.
    pub fn is_placeholder(&self) -> bool {
        self.isbn.as_str() == PLACEHOLDER_ISBN
    }
}
