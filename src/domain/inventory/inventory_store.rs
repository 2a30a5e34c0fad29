use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::utils::id::ResourceUri;
use crate::error::AllocationError;

#[derive(Debug, Default)]
struct StoreInner {
    inventory: Inventory,
    composed_nodes: HashMap<ResourceUri, ComposedNode>,
}

/// Shared inventory plus the composed nodes built from it.
///
/// Cloning the store clones the handle, not the data. Allocations never lock the store while they
/// run; they work on a transaction snapshot and `commit` performs the compare-and-commit under a
/// single write lock.
#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InventoryStore {
    pub fn new(inventory: Inventory) -> Self {
        Self { inner: Arc::new(RwLock::new(StoreInner { inventory, composed_nodes: HashMap::new() })) }
    }

    /// Opens a transaction on a snapshot of the current inventory.
    pub fn begin(&self) -> InventoryTransaction {
        let guard = self.inner.read().expect("RwLock poisoned");
        InventoryTransaction::new(guard.inventory.clone())
    }

    /// Applies the transaction if none of the resources it touched changed since it was opened.
    ///
    /// # Returns
    /// Returns `AllocationError::Conflict` naming the first stale resource, in which case nothing
    /// is written.
    pub fn commit(&self, transaction: InventoryTransaction) -> Result<(), AllocationError> {
        let (working, touched, persisted) = transaction.into_parts();
        let mut guard = self.inner.write().expect("RwLock poisoned");

        for key in &touched {
            if guard.inventory.version_of(*key) != working.version_of(*key) {
                let uri = working.uri_of(*key).cloned().unwrap_or_else(|| ResourceUri::new("<unknown>"));
                log::info!("Commit rejected, {} was changed by a concurrent allocation", uri);
                return Err(AllocationError::Conflict(uri));
            }
        }

        for key in &touched {
            guard.inventory.overwrite_from(&working, *key);
        }
        for node in persisted {
            log::debug!("Persisting composed node {}", node.uri);
            guard.composed_nodes.insert(node.uri.clone(), node);
        }

        Ok(())
    }

    /// Copy of the committed inventory.
    pub fn snapshot(&self) -> Inventory {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.inventory.clone()
    }

    pub fn find_composed_node(&self, uri: &ResourceUri) -> Option<ComposedNode> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.composed_nodes.get(uri).cloned()
    }

    pub fn composed_nodes(&self) -> Vec<ComposedNode> {
        let guard = self.inner.read().expect("RwLock poisoned");
        guard.composed_nodes.values().cloned().collect()
    }
}
