use slotmap::{Key, SlotMap};
use std::collections::HashMap;

use crate::domain::utils::id::ResourceUri;

/// Implemented by every record stored in an [`Arena`].
pub trait InventoryRecord: std::fmt::Debug + Clone {
    fn uri(&self) -> &ResourceUri;
}

#[derive(Debug, Clone)]
struct Versioned<T> {
    /// Incremented every time a committed transaction rewrites the record.
    version: u64,
    record: T,
}

/// Typed record storage with a URI index.
///
/// Keys stay valid across clones of the arena, which is what lets a transaction work on a copy
/// and write touched records back under the same key.
#[derive(Debug, Clone)]
pub struct Arena<K: Key, T: InventoryRecord> {
    slots: SlotMap<K, Versioned<T>>,
    uri_index: HashMap<ResourceUri, K>,
}

impl<K: Key, T: InventoryRecord> Default for Arena<K, T> {
    fn default() -> Self {
        Self { slots: SlotMap::with_key(), uri_index: HashMap::new() }
    }
}

impl<K: Key, T: InventoryRecord> Arena<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: T) -> K {
        let uri = record.uri().clone();
        let key = self.slots.insert(Versioned { version: 0, record });
        self.uri_index.insert(uri, key);
        key
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key).map(|v| &v.record)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key).map(|v| &mut v.record)
    }

    pub fn find(&self, uri: &ResourceUri) -> Option<K> {
        self.uri_index.get(uri).copied()
    }

    pub fn version(&self, key: K) -> Option<u64> {
        self.slots.get(key).map(|v| v.version)
    }

    /// Overwrites the record under `key` with the one held by `source` and bumps its version.
    pub fn overwrite_from(&mut self, source: &Arena<K, T>, key: K) -> bool {
        let Some(incoming) = source.get(key) else {
            return false;
        };
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.record = incoming.clone();
                slot.version += 1;
                true
            }
            None => false,
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().map(|(k, v)| (k, &v.record))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
