use serde::Serialize;

use crate::domain::allocation::compute::computer_system_allocation_strategy::ComputerSystemAllocationStrategy;
use crate::domain::allocation::remote_drive::RemoteDriveAllocationStrategy;
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::composed_node::{ComposedNode, ComposedNodeState};
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::node_task::NodeTask;
use crate::domain::utils::id::ResourceUri;
use crate::domain::utils::statistics::ANALYTICS_TARGET;
use crate::error::AllocationError;

/// Result of a successful allocation, handed to the task executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationContext {
    pub composed_node_uri: ResourceUri,
    pub tasks: Vec<NodeTask>,
}

/// Validated pair of strategies that together build one composed node.
///
/// Only `AllocationStrategyFactory` constructs it, after both strategies passed validation.
#[derive(Debug)]
pub struct NodeAllocationStrategy {
    name: String,
    description: Option<String>,
    compute: ComputerSystemAllocationStrategy,
    remote_drive: RemoteDriveAllocationStrategy,
}

impl NodeAllocationStrategy {
    pub(crate) fn new(
        name: String,
        description: Option<String>,
        compute: ComputerSystemAllocationStrategy,
        remote_drive: RemoteDriveAllocationStrategy,
    ) -> Self {
        Self { name, description, compute, remote_drive }
    }

    pub fn allocate(mut self, tx: &mut InventoryTransaction) -> Result<AllocationContext, AllocationError> {
        let mut node = ComposedNode::new(self.name.clone(), self.description.clone());
        log::debug!("Allocating composed node {} ({})", node.uri, node.name);

        let mut tasks = self.compute.allocate(tx, &mut node)?;
        let compute_tasks = tasks.len();
        tasks.extend(self.remote_drive.allocate(tx, &mut node)?);
        tasks.push(NodeTask::mark_assembled(node.uri.clone()));

        node.state = ComposedNodeState::Allocated;

        tracing::info!(
            target: ANALYTICS_TARGET,
            event = "NodeAllocated",
            composed_node = %node.uri,
            computer_system = ?node.computer_system.as_ref().map(|uri| uri.as_str()),
            assets = node.assets.len(),
            compute_tasks = compute_tasks,
            total_tasks = tasks.len(),
        );

        let context = AllocationContext { composed_node_uri: node.uri.clone(), tasks };
        tx.persist(node);
        Ok(context)
    }
}
