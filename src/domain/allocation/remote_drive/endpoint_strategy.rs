use crate::domain::allocation::remote_drive::existing_remote_drive_strategy::ExistingResourceAllocation;
use crate::domain::allocation::remote_drive::remote_target::RemoteTarget;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{EndpointKey, Inventory, ResourceKey, VolumeKey};
use crate::domain::inventory::resources::{Endpoint, EntityRole};
use crate::domain::inventory::transaction::{AttachableAsset, InventoryTransaction};
use crate::domain::node_task::ZoneMember;
use crate::domain::utils::id::ResourceUri;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Attaches an existing target endpoint together with the volumes behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointStrategy {
    uri: ResourceUri,
}

impl EndpointStrategy {
    pub fn new(uri: ResourceUri) -> Self {
        Self { uri }
    }

    fn resolve<'a>(&self, inventory: &'a Inventory) -> Option<(EndpointKey, &'a Endpoint)> {
        match inventory.resource_kind(&self.uri)? {
            ResourceKey::Endpoint(key) => inventory.endpoints.get(key).map(|endpoint| (key, endpoint)),
            _ => None,
        }
    }

    fn unallocated_volumes(endpoint: &Endpoint, inventory: &Inventory) -> Vec<VolumeKey> {
        endpoint.connected_volumes().filter(|key| inventory.volumes.get(*key).is_some_and(|v| !v.allocated)).collect()
    }

    /// Every check runs so the client sees all problems at once.
    pub fn validate(&self, inventory: &Inventory) -> Violations {
        let Some((_, endpoint)) = self.resolve(inventory) else {
            return Violations::of(format!("Specified endpoint ({}) does not exist.", self.uri));
        };

        let mut violations = Violations::new();
        if !endpoint.status.is_enabled_and_healthy() {
            violations.add_violation(format!("Endpoint {} is not enabled and healthy", self.uri));
        }
        if !endpoint.achievable {
            violations.add_violation(format!("Endpoint {} is not achievable", self.uri));
        }
        if endpoint.allocated {
            violations.add_violation(format!("Endpoint {} is already allocated", self.uri));
        }
        if endpoint.zone.is_some() {
            violations.add_violation(format!("Endpoint {} is already a member of a zone", self.uri));
        }
        if !endpoint.has_role(EntityRole::Target) {
            violations.add_violation(format!("Endpoint {} does not have the target role", self.uri));
        }
        if endpoint.connected_volumes().next().is_none() {
            violations.add_violation(format!("Endpoint {} has no connected volume", self.uri));
        } else if Self::unallocated_volumes(endpoint, inventory).is_empty() {
            violations.add_violation(format!("Endpoint {} has no unallocated connected volume", self.uri));
        }
        violations
    }

    pub fn allocate(&self, tx: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<ExistingResourceAllocation, AllocationError> {
        let inventory = tx.inventory();
        let Some((endpoint_key, endpoint)) = self.resolve(inventory).filter(|(_, e)| e.is_attachable()) else {
            return Err(Violations::of(format!("Endpoint {} is no longer available", self.uri)).into());
        };

        let volumes = Self::unallocated_volumes(endpoint, inventory);
        let bootable = volumes.first().and_then(|key| inventory.volumes.get(*key)).is_some_and(|v| v.bootable);
        let target =
            RemoteTarget { fabric: endpoint.fabric, protocol: endpoint.protocol, bootable, member: ZoneMember::Existing { endpoint: endpoint.uri.clone() } };

        tx.attach_asset(node, AttachableAsset::Endpoint(endpoint_key));
        for volume in volumes {
            tx.attach_asset(node, AttachableAsset::Volume(volume));
        }

        Ok(ExistingResourceAllocation { tasks: Vec::new(), target })
    }
}
