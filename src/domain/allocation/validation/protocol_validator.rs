use crate::domain::inventory::inventory::{Inventory, ResourceKey};
use crate::domain::inventory::resources::Protocol;
use crate::domain::request::requested_node::RequestedRemoteDrive;
use crate::domain::violations::Violations;

/// Checks that an existing remote resource speaks the protocol the request asks for.
#[derive(Debug, Clone, Default)]
pub struct ProtocolValidator;

impl ProtocolValidator {
    pub fn validate(requested: &RequestedRemoteDrive, inventory: &Inventory) -> Violations {
        let (Some(expected), Some(uri)) = (requested.protocol, requested.resource.as_ref()) else {
            return Violations::new();
        };

        match inventory.resource_kind(uri).and_then(|kind| Self::resource_protocol(kind, inventory)) {
            Some(actual) if actual != expected => {
                Violations::of(format!("Requested protocol {:?} does not match protocol {:?} of resource {}", expected, actual, uri))
            }
            _ => Violations::new(),
        }
    }

    /// Protocol a remote volume or endpoint is exposed with, if it can be determined.
    pub fn resource_protocol(kind: ResourceKey, inventory: &Inventory) -> Option<Protocol> {
        match kind {
            ResourceKey::Volume(key) => {
                let volume = inventory.volumes.get(key)?;
                volume
                    .storage_service
                    .and_then(|service| inventory.storage_service_protocol(service))
                    .or_else(|| volume.endpoints.iter().find_map(|e| inventory.endpoints.get(*e)).map(|e| e.protocol))
            }
            ResourceKey::Endpoint(key) => inventory.endpoints.get(key).map(|e| e.protocol),
            _ => None,
        }
    }
}
