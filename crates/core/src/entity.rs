//! Entity trait: identity + continuity across state changes.

/// A persisted record with two identities: the store-assigned record id
/// (creation ordered) and the caller-assigned business key (unique).
pub trait Entity {
    /// Store-assigned identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    /// Caller-assigned business key (carton number, issue number).
    type Key: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the record identifier.
    fn id(&self) -> Self::Id;

    /// Returns the business key.
    fn key(&self) -> &Self::Key;
}

/// Find an entity by business key.
pub fn find_by_key<'a, E: Entity>(items: &'a [E], key: &E::Key) -> Option<&'a E> {
    items.iter().find(|e| e.key() == key)
}
