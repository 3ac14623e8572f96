//! Loan records returned by the loans-for-user query.

use crate::book::Author;
use crate::ids::{Isbn, LibraryId};
use crate::kind::EntityKind;
use crate::record::Record;
use crate::Error;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Shown in place of an author name when a loan carries none.
pub const UNKNOWN_AUTHOR: &str = "Unknown author";

/// The book part of a loan record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub title: String,
    /// The service omits authors for some catalog entries.
    #[serde(default)]
    pub authors: Vec<Author>,
    pub isbn: Isbn,
}

/// A book on loan to a user. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    pub book: BookRef,
    pub library_id: LibraryId,
    pub due_date: String,
}

impl LoanRecord {
    /// Name of the first author, or [`UNKNOWN_AUTHOR`].
    pub fn primary_author(&self) -> &str {
        self.book
            .authors
            .first()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Parses the due date, accepting `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn due_date(&self) -> Option<NaiveDate> {
        let raw = self.due_date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    /// Whether the loan is past due on `today`. Unparseable dates are never
    /// overdue.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date().is_some_and(|due| due < today)
    }
}

impl Record for LoanRecord {
    type Patch = Infallible;

    const KIND: EntityKind = EntityKind::LoanRecord;

    // Loans carry no id; the service may list the same loan twice.
    const IDENTIFIED: bool = false;

    fn key(&self) -> String {
        format!("{}/{}/{}", self.library_id, self.book.isbn, self.due_date)
    }

    fn apply(&mut self, patch: Infallible) {
        match patch {}
    }

    fn validate(&self) -> crate::Result<()> {
        if self.library_id.is_empty() {
            return Err(Error::empty(EntityKind::LoanRecord, "libraryId"));
        }
        if self.book.isbn.is_empty() {
            return Err(Error::empty(EntityKind::LoanRecord, "book.isbn"));
        }
        Ok(())
    }
}
