pub mod endpoint_strategy;
pub mod existing_remote_drive_strategy;
pub mod new_remote_drive_strategy;
pub mod remote_drive_describer;
pub mod remote_drive_strategy_factory;
pub mod remote_target;
pub mod volume_strategy;

use crate::domain::allocation::remote_drive::existing_remote_drive_strategy::ExistingRemoteDriveAllocationStrategy;
use crate::domain::allocation::remote_drive::new_remote_drive_strategy::NewRemoteDriveAllocationStrategy;
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::node_task::NodeTask;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Remote storage part of an allocation, chosen once from the request.
#[derive(Debug, Clone)]
pub enum RemoteDriveAllocationStrategy {
    /// The request asks for no remote drive.
    None,
    Existing(ExistingRemoteDriveAllocationStrategy),
    New(NewRemoteDriveAllocationStrategy),
}

impl AllocationStrategy for RemoteDriveAllocationStrategy {
    fn validate(&self, inventory: &Inventory) -> Violations {
        match self {
            RemoteDriveAllocationStrategy::None => Violations::new(),
            RemoteDriveAllocationStrategy::Existing(strategy) => strategy.validate(inventory),
            RemoteDriveAllocationStrategy::New(strategy) => strategy.validate(inventory),
        }
    }

    fn allocate(&mut self, tx: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<Vec<NodeTask>, AllocationError> {
        match self {
            RemoteDriveAllocationStrategy::None => Ok(Vec::new()),
            RemoteDriveAllocationStrategy::Existing(strategy) => strategy.allocate(tx, node),
            RemoteDriveAllocationStrategy::New(strategy) => strategy.allocate(tx, node),
        }
    }
}
