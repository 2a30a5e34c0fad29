use crate::domain::allocation::compute::computer_system_allocation_strategy::ComputerSystemAllocationStrategy;
use crate::domain::allocation::node_allocation_strategy::NodeAllocationStrategy;
use crate::domain::allocation::remote_drive::remote_drive_strategy_factory::RemoteDriveStrategyFactory;
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::composer_config::ComposerConfig;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::matcher::Matchers;
use crate::domain::request::requested_node::RequestedNode;
use crate::error::AllocationError;

/// Builds and validates the strategies for a request.
///
/// Takes the inventory by shared reference: nothing can be claimed before every check passed.
#[derive(Debug, Clone, Default)]
pub struct AllocationStrategyFactory {
    matchers: Matchers,
    remote_drives: RemoteDriveStrategyFactory,
}

impl AllocationStrategyFactory {
    pub fn new(matchers: Matchers, config: ComposerConfig) -> Self {
        Self { matchers, remote_drives: RemoteDriveStrategyFactory::new(config) }
    }

    pub fn create(&self, request: &RequestedNode, inventory: &Inventory) -> Result<NodeAllocationStrategy, AllocationError> {
        let remote_drive = self.remote_drives.create(request, inventory)?;
        let compute = ComputerSystemAllocationStrategy::new(request.clone(), self.matchers.clone());

        let mut violations = compute.validate(inventory);
        violations.add_all(remote_drive.validate(inventory));
        if violations.has_violations() {
            return Err(AllocationError::Rejected(violations));
        }

        Ok(NodeAllocationStrategy::new(request.name.clone(), request.description.clone(), compute, remote_drive))
    }
}
