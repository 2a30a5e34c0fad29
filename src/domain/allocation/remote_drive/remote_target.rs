use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{FabricKey, Inventory, ResourceKey};
use crate::domain::inventory::resources::Protocol;
use crate::domain::node_task::{NodeTask, ZoneMember};
use crate::error::AllocationError;

/// Storage target the composed node's system has to be zoned with.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTarget {
    pub fabric: Option<FabricKey>,
    pub protocol: Protocol,
    pub bootable: bool,
    pub member: ZoneMember,
}

/// Tasks connecting the node's system to a remote target: an initiator endpoint if the system has
/// none on the fabric yet, the iSCSI boot set when it applies, and the zone itself.
pub fn remote_target_tasks(inventory: &Inventory, node: &ComposedNode, target: RemoteTarget) -> Result<Vec<NodeTask>, AllocationError> {
    let system_key = match node.computer_system.as_ref().and_then(|uri| inventory.resource_kind(uri)) {
        Some(ResourceKey::System(key)) => key,
        _ => return Err(AllocationError::Internal(format!("Composed node {} has no computer system to attach a remote drive to", node.uri))),
    };
    let system = inventory
        .systems
        .get(system_key)
        .ok_or_else(|| AllocationError::Internal(format!("Computer system of composed node {} is missing", node.uri)))?;
    let fabric_uri = target.fabric.and_then(|key| inventory.fabrics.get(key)).map(|f| f.uri.clone());

    let mut tasks = Vec::new();

    let initiator = match inventory.find_initiator_endpoint(system_key, target.fabric).and_then(|key| inventory.endpoints.get(key)) {
        Some(endpoint) => ZoneMember::Existing { endpoint: endpoint.uri.clone() },
        None => {
            tasks.push(NodeTask::CreateInitiatorEndpoint {
                composed_node: node.uri.clone(),
                system: system.uri.clone(),
                fabric: fabric_uri.clone(),
                protocol: target.protocol,
            });
            ZoneMember::NewInitiator { system: system.uri.clone() }
        }
    };

    if target.protocol.is_network_attached_storage() {
        if let Some(function) = system.network_device_functions.first() {
            tasks.push(NodeTask::ConfigureIscsiBoot { system: system.uri.clone(), network_device_function: function.clone() });
            if target.bootable {
                tasks.push(NodeTask::SetBootSourceOverride { system: system.uri.clone() });
            }
        }
    }

    tasks.push(NodeTask::CreateZone { composed_node: node.uri.clone(), fabric: fabric_uri, initiator, target: target.member });
    Ok(tasks)
}
