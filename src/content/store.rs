//! In-memory collection map.
//!
//! Two-level ordered map: collection name → entry id → metadata. Keys are the
//! raw names; quoting for generated text happens at render time only.
//!
//! Mutation goes through four primitives, none of which can leave an entry
//! without its owning collection:
//!
//! | Operation             | Effect                                     |
//! |-----------------------|--------------------------------------------|
//! | `add_collection`      | Create, or reset an existing one to empty  |
//! | `remove_collection`   | Drop the collection and all its entries    |
//! | `set_entry`           | Upsert an entry into an existing collection|
//! | `remove_entry`        | Drop an entry; no-op if absent             |

use std::collections::BTreeMap;

/// Metadata tracked per content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub slug: String,
}

impl EntryMetadata {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

/// Entries of one collection, ordered by id.
pub type Entries = BTreeMap<String, EntryMetadata>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionMap {
    collections: BTreeMap<String, Entries>,
}

impl CollectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Create `collection` empty. An existing collection is reset, not merged.
    pub fn add_collection(&mut self, collection: &str) {
        self.collections
            .insert(collection.to_owned(), Entries::new());
    }

    /// Remove `collection` and every entry in it.
    pub fn remove_collection(&mut self, collection: &str) -> bool {
        self.collections.remove(collection).is_some()
    }

    /// Insert or replace an entry.
    ///
    /// Returns `false` and changes nothing when the collection does not exist.
    pub fn set_entry(&mut self, collection: &str, id: &str, metadata: EntryMetadata) -> bool {
        match self.collections.get_mut(collection) {
            Some(entries) => {
                entries.insert(id.to_owned(), metadata);
                true
            }
            None => false,
        }
    }

    /// Remove an entry. Returns whether it existed.
    pub fn remove_entry(&mut self, collection: &str, id: &str) -> bool {
        self.collections
            .get_mut(collection)
            .is_some_and(|entries| entries.remove(id).is_some())
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn contains_collection(&self, collection: &str) -> bool {
        self.collections.contains_key(collection)
    }

    pub fn contains_entry(&self, collection: &str, id: &str) -> bool {
        self.get_entry(collection, id).is_some()
    }

    pub fn get_entry(&self, collection: &str, id: &str) -> Option<&EntryMetadata> {
        self.collections.get(collection)?.get(id)
    }

    #[cfg(test)]
    pub fn entries(&self, collection: &str) -> Option<&Entries> {
        self.collections.get(collection)
    }

    /// Collections in lexicographic order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &Entries)> {
        self.collections
            .iter()
            .map(|(name, entries)| (name.as_str(), entries))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
