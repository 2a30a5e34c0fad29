use crate::domain::allocation::remote_drive::remote_drive_describer::RemoteDriveDescriber;
use crate::domain::allocation::remote_drive::remote_target::{RemoteTarget, remote_target_tasks};
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::node_task::{NodeTask, ReplicaSource, ZoneMember};
use crate::domain::request::requested_node::RequestedRemoteDrive;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Creates a brand new remote volume and zones it with the node's system.
#[derive(Debug, Clone)]
pub struct NewRemoteDriveAllocationStrategy {
    requested: RequestedRemoteDrive,
    describer: RemoteDriveDescriber,
}

impl NewRemoteDriveAllocationStrategy {
    pub fn new(requested: RequestedRemoteDrive, describer: RemoteDriveDescriber) -> Self {
        Self { requested, describer }
    }
}

impl AllocationStrategy for NewRemoteDriveAllocationStrategy {
    fn validate(&self, inventory: &Inventory) -> Violations {
        self.describer.describe(&self.requested, inventory).err().unwrap_or_default()
    }

    fn allocate(&mut self, tx: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<Vec<NodeTask>, AllocationError> {
        let inventory = tx.inventory();
        let descriptor = self.describer.describe(&self.requested, inventory)?;

        let pool = inventory
            .storage_pools
            .get(descriptor.storage_pool)
            .ok_or_else(|| AllocationError::Internal("Described storage pool is missing".to_string()))?;
        let service = inventory
            .storage_services
            .get(descriptor.storage_service)
            .ok_or_else(|| AllocationError::Internal("Described storage service is missing".to_string()))?;
        let replica = descriptor
            .replica
            .and_then(|(volume, replica_type)| inventory.volumes.get(volume).map(|v| ReplicaSource { volume: v.uri.clone(), replica_type }));

        node.remote_drive_capacity_gib = Some(descriptor.capacity_gib);
        node.storage_pools.insert(pool.uri.clone());

        let mut tasks = vec![NodeTask::CreateRemoteVolume {
            composed_node: node.uri.clone(),
            storage_pool: pool.uri.clone(),
            storage_service: service.uri.clone(),
            capacity_gib: descriptor.capacity_gib,
            protocol: descriptor.protocol,
            replica,
        }];

        let target = RemoteTarget { fabric: service.fabric, protocol: descriptor.protocol, bootable: descriptor.bootable, member: ZoneMember::NewVolumeTarget };
        tasks.extend(remote_target_tasks(inventory, node, target)?);

        Ok(tasks)
    }
}
