//! Library entity.

use crate::ids::LibraryId;
use crate::kind::EntityKind;
use crate::record::Record;
use crate::Error;
use serde::{Deserialize, Serialize};

/// A library as returned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Server-assigned id.
    pub id: LibraryId,
    pub name: String,
    pub address: String,
    pub open_time: String,
    pub close_time: String,
    pub open_days: String,
}

impl Library {
    /// Builds a library from its server id and editable fields.
    pub fn from_draft(id: LibraryId, draft: LibraryDraft) -> Self {
        Self {
            id,
            name: draft.name,
            address: draft.address,
            open_time: draft.open_time,
            close_time: draft.close_time,
            open_days: draft.open_days,
        }
    }

    /// Returns the editable fields.
    pub fn draft(&self) -> LibraryDraft {
        LibraryDraft {
            name: self.name.clone(),
            address: self.address.clone(),
            open_time: self.open_time.clone(),
            close_time: self.close_time.clone(),
            open_days: self.open_days.clone(),
        }
    }
}

/// Library fields minus the id: the body of a create, the editable part of
/// an update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDraft {
    pub name: String,
    pub address: String,
    pub open_time: String,
    pub close_time: String,
    pub open_days: String,
}

impl LibraryDraft {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            ..Default::default()
        }
    }

    /// Sets the opening hours.
    pub fn with_hours(mut self, open_time: impl Into<String>, close_time: impl Into<String>) -> Self {
        self.open_time = open_time.into();
        self.close_time = close_time.into();
        self
    }

    /// Sets the days the library is open, e.g. `"Mon-Fri"`.
    pub fn with_days(mut self, open_days: impl Into<String>) -> Self {
        self.open_days = open_days.into();
        self
    }
}

/// Partial update of a library's editable fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub open_days: Option<String>,
}

impl LibraryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.open_time.is_none()
            && self.close_time.is_none()
            && self.open_days.is_none()
    }
}

impl From<LibraryDraft> for LibraryPatch {
    fn from(draft: LibraryDraft) -> Self {
        Self {
            name: Some(draft.name),
            address: Some(draft.address),
            open_time: Some(draft.open_time),
            close_time: Some(draft.close_time),
            open_days: Some(draft.open_days),
        }
    }
}

impl Record for Library {
    type Patch = LibraryPatch;

    const KIND: EntityKind = EntityKind::Library;

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn apply(&mut self, patch: LibraryPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(open_time) = patch.open_time {
            self.open_time = open_time;
        }
        if let Some(close_time) = patch.close_time {
            self.close_time = close_time;
        }
        if let Some(open_days) = patch.open_days {
            self.open_days = open_days;
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.id.is_empty() {
            return Err(Error::empty(EntityKind::Library, "id"));
        }
        Ok(())
    }
}
