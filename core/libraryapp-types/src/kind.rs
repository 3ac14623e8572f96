//! Entity and mutation kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The remote-sourced entity types the client synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Library,
    Book,
    LoanRecord,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Library => "library",
            EntityKind::Book => "book",
            EntityKind::LoanRecord => "loan record",
        };
        f.write_str(name)
    }
}

/// The kind of remote mutation a [`PendingMutation`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
    Checkout,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
            MutationKind::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// Correlation token for one in-flight mutation.
///
/// Lives only for the duration of a single network round trip. Two tokens
/// conflict when they share `(entity, target_id)`, whatever their `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingMutation {
    pub entity: EntityKind,
    pub target_id: String,
    pub kind: MutationKind,
}

impl PendingMutation {
    pub fn new(entity: EntityKind, target_id: impl Into<String>, kind: MutationKind) -> Self {
        Self {
            entity,
            target_id: target_id.into(),
            kind,
        }
    }

    /// The identity the single-in-flight rule is enforced on.
    pub fn gate_key(&self) -> (EntityKind, &str) {
        (self.entity, &self.target_id)
    }
}

impl fmt::Display for PendingMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.entity, self.target_id)
    }
}
