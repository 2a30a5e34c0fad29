use crate::domain::allocation::remote_drive::endpoint_strategy::EndpointStrategy;
use crate::domain::allocation::remote_drive::remote_target::{RemoteTarget, remote_target_tasks};
use crate::domain::allocation::remote_drive::volume_strategy::VolumeStrategy;
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::allocation::validation::protocol_validator::ProtocolValidator;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::RequestedRemoteDrive;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// What an existing-resource sub-strategy claimed, and the target left to zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingResourceAllocation {
    /// Tasks that must run before the node's system is zoned with the target.
    pub tasks: Vec<NodeTask>,
    pub target: RemoteTarget,
}

/// Kind of existing resource a remote drive request points at.
#[derive(Debug, Clone, PartialEq)]
pub enum ExistingResourceStrategy {
    Volume(VolumeStrategy),
    Endpoint(EndpointStrategy),
    /// The referenced URI is unknown or names neither a volume nor an endpoint.
    Unresolved { violation: String },
}

impl ExistingResourceStrategy {
    fn validate(&self, inventory: &Inventory) -> Violations {
        match self {
            ExistingResourceStrategy::Volume(strategy) => strategy.validate(inventory),
            ExistingResourceStrategy::Endpoint(strategy) => strategy.validate(inventory),
            ExistingResourceStrategy::Unresolved { violation } => Violations::of(violation.clone()),
        }
    }

    fn allocate(
        &self,
        tx: &mut InventoryTransaction,
        node: &mut ComposedNode,
        requested: &RequestedRemoteDrive,
    ) -> Result<ExistingResourceAllocation, AllocationError> {
        match self {
            ExistingResourceStrategy::Volume(strategy) => strategy.allocate(tx, node, requested.protocol),
            ExistingResourceStrategy::Endpoint(strategy) => strategy.allocate(tx, node),
            ExistingResourceStrategy::Unresolved { violation } => Err(Violations::of(violation.clone()).into()),
        }
    }
}

/// Attaches a volume or endpoint that already exists in the inventory.
#[derive(Debug, Clone)]
pub struct ExistingRemoteDriveAllocationStrategy {
    requested: RequestedRemoteDrive,
    resource: ExistingResourceStrategy,
}

impl ExistingRemoteDriveAllocationStrategy {
    pub fn new(requested: RequestedRemoteDrive, resource: ExistingResourceStrategy) -> Self {
        Self { requested, resource }
    }
}

impl AllocationStrategy for ExistingRemoteDriveAllocationStrategy {
    fn validate(&self, inventory: &Inventory) -> Violations {
        let mut violations = self.resource.validate(inventory);
        violations.add_all(ProtocolValidator::validate(&self.requested, inventory));
        violations
    }

    fn allocate(&mut self, tx: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<Vec<NodeTask>, AllocationError> {
        let ExistingResourceAllocation { mut tasks, target } = self.resource.allocate(tx, node, &self.requested)?;
        tasks.extend(remote_target_tasks(tx.inventory(), node, target)?);
        Ok(tasks)
    }
}
