use crate::kind::EntityKind;

/// A remote-sourced entity that can live in an entity store.
///
/// `key` is what the store indexes by; it must be stable for the lifetime of
/// the record. For identified records (`IDENTIFIED`) the key is the entity's
/// identity and a store never holds two entries with the same key; other
/// records keep every entry a listing returns. `validate` runs after every decode and rejects values the
/// type system alone lets through (empty identifiers and the like).
pub trait Record: Clone + Send + Sync + 'static {
    /// Partial update applied by the store's `patch`.
    type Patch: Send;

    /// Which entity kind this record is.
    const KIND: EntityKind;

    /// Whether equal keys denote the same entity.
    const IDENTIFIED: bool = true;

    /// The key the store indexes this record by.
    fn key(&self) -> String;

    /// Applies a partial update in place.
    fn apply(&mut self, patch: Self::Patch);

    /// Checks the decoded fields.
    fn validate(&self) -> crate::Result<()>;
}
