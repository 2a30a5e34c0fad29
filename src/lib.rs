use crate::domain::allocation::allocation_service::AllocationService;
use crate::domain::allocation::node_allocation_strategy::AllocationContext;
use crate::domain::composer_config::ComposerConfig;
use crate::domain::inventory::inventory_store::InventoryStore;
use crate::domain::matcher::Matchers;
use crate::domain::request::requested_node::RequestedNode;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Allocates one node against the store and commits the claimed resources.
///
/// The transaction is dropped, and nothing is written, if allocation or commit fails.
pub fn compose_node(store: &InventoryStore, request: &RequestedNode, config: &ComposerConfig) -> Result<AllocationContext> {
    let service = AllocationService::new(Matchers::default(), config.clone());

    let mut tx = store.begin();
    let context = service.create(&mut tx, request)?;
    store.commit(tx)?;

    log::info!("Composed node {} committed.", context.composed_node_uri);
    Ok(context)
}
