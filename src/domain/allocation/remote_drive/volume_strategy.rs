use crate::domain::allocation::remote_drive::existing_remote_drive_strategy::ExistingResourceAllocation;
use crate::domain::allocation::remote_drive::remote_target::RemoteTarget;
use crate::domain::allocation::validation::protocol_validator::ProtocolValidator;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{EndpointKey, Inventory, ResourceKey, VolumeKey};
use crate::domain::inventory::resources::{EntityRole, Protocol, Volume};
use crate::domain::inventory::transaction::{AttachableAsset, InventoryTransaction};
use crate::domain::node_task::{NodeTask, ZoneMember};
use crate::domain::utils::id::ResourceUri;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

pub const ENDPOINTS_USED_VIOLATION: &str = "All endpoints attached to volume are used";
pub const ENDPOINT_GONE_VIOLATION: &str = "Endpoint is no longer available";

/// Attaches an existing volume, reusing a free target endpoint when it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeStrategy {
    uri: ResourceUri,
}

impl VolumeStrategy {
    pub fn new(uri: ResourceUri) -> Self {
        Self { uri }
    }

    fn resolve<'a>(&self, inventory: &'a Inventory) -> Option<(VolumeKey, &'a Volume)> {
        match inventory.resource_kind(&self.uri)? {
            ResourceKey::Volume(key) => inventory.volumes.get(key).map(|volume| (key, volume)),
            _ => None,
        }
    }

    /// Target endpoint of the volume that is neither claimed nor zoned.
    fn free_target_endpoint(volume: &Volume, inventory: &Inventory) -> Option<EndpointKey> {
        volume
            .endpoints
            .iter()
            .copied()
            .find(|key| inventory.endpoints.get(*key).is_some_and(|e| e.is_attachable() && e.has_role(EntityRole::Target)))
    }

    pub fn validate(&self, inventory: &Inventory) -> Violations {
        let Some((_, volume)) = self.resolve(inventory) else {
            return Violations::of(format!("Specified volume ({}) does not exist.", self.uri));
        };

        let mut violations = Violations::new();
        if !volume.endpoints.is_empty() && Self::free_target_endpoint(volume, inventory).is_none() {
            violations.add_violation(ENDPOINTS_USED_VIOLATION);
        }
        if !volume.status.is_enabled_and_healthy() {
            violations.add_violation(format!("Volume {} is not enabled and healthy", self.uri));
        }
        if !volume.achievable {
            violations.add_violation(format!("Volume {} is not achievable", self.uri));
        }
        if volume.allocated {
            violations.add_violation(format!("Volume {} is already allocated", self.uri));
        }
        violations
    }

    pub fn allocate(
        &self,
        tx: &mut InventoryTransaction,
        node: &mut ComposedNode,
        requested_protocol: Option<Protocol>,
    ) -> Result<ExistingResourceAllocation, AllocationError> {
        let inventory = tx.inventory();
        let (volume_key, volume) = self.resolve(inventory).ok_or_else(|| Violations::of(format!("Specified volume ({}) does not exist.", self.uri)))?;

        let endpoint_key = Self::free_target_endpoint(volume, inventory);
        if endpoint_key.is_none() && !volume.endpoints.is_empty() {
            return Err(Violations::of(ENDPOINT_GONE_VIOLATION).into());
        }

        let protocol = ProtocolValidator::resource_protocol(ResourceKey::Volume(volume_key), inventory)
            .or(requested_protocol)
            .ok_or_else(|| Violations::of(format!("Protocol of volume {} cannot be determined", self.uri)))?;
        let endpoint = endpoint_key.and_then(|key| inventory.endpoints.get(key));
        let fabric = volume
            .storage_service
            .and_then(|service| inventory.storage_services.get(service))
            .and_then(|service| service.fabric)
            .or_else(|| endpoint.and_then(|e| e.fabric));
        let bootable = volume.bootable;

        let mut tasks = Vec::new();
        let member = match endpoint {
            Some(endpoint) => ZoneMember::Existing { endpoint: endpoint.uri.clone() },
            None => {
                tasks.push(NodeTask::CreateTargetEndpoint {
                    composed_node: node.uri.clone(),
                    volume: volume.uri.clone(),
                    fabric: fabric.and_then(|f| inventory.fabrics.get(f)).map(|f| f.uri.clone()),
                    protocol,
                });
                ZoneMember::NewTarget { volume: volume.uri.clone() }
            }
        };

        tx.attach_asset(node, AttachableAsset::Volume(volume_key));
        if let Some(endpoint_key) = endpoint_key {
            tx.attach_asset(node, AttachableAsset::Endpoint(endpoint_key));
        }

        Ok(ExistingResourceAllocation { tasks, target: RemoteTarget { fabric, protocol, bootable, member } })
    }
}
