use crate::domain::inventory::inventory::{Inventory, ResourceKey, SystemKey};
use crate::domain::request::requested_node::{ProcessorConnectivity, RequestedNode};
use crate::domain::utils::id::ResourceUri;
use crate::domain::violations::Violations;

pub const MULTIPLE_SYSTEMS_VIOLATION: &str = "Allocation of assets on multiple computer systems is not supported";

/// Derives the candidate systems from the resources a request references explicitly.
#[derive(Debug, Clone, Default)]
pub struct ComputerSystemCollector;

impl ComputerSystemCollector {
    /// Systems allowed to host the request, before matching.
    ///
    /// # Returns
    /// Every system when the request references nothing that pins a system, otherwise the systems
    /// compatible with all references. Unknown or unusable references are reported as violations.
    pub fn collect_candidates(request: &RequestedNode, inventory: &Inventory) -> Result<Vec<SystemKey>, Violations> {
        match Self::collect_common_systems(request, inventory)? {
            Some(systems) => Ok(systems),
            None => Ok(inventory.systems.keys().collect()),
        }
    }

    /// Intersection of the systems each reference allows, or `None` if no reference pins a system.
    pub fn collect_common_systems(request: &RequestedNode, inventory: &Inventory) -> Result<Option<Vec<SystemKey>>, Violations> {
        let mut violations = Violations::new();
        let mut common: Option<Vec<SystemKey>> = None;

        for uri in request.referenced_resources() {
            match Self::systems_for_reference(uri, request, inventory) {
                Ok(Some(allowed)) => {
                    common = Some(match common {
                        None => allowed,
                        Some(current) => current.into_iter().filter(|s| allowed.contains(s)).collect(),
                    });
                }
                Ok(None) => {}
                Err(message) => violations.add_violation(message),
            }
        }

        if violations.has_violations() {
            return Err(violations);
        }
        if common.as_ref().is_some_and(|systems| systems.is_empty()) {
            return Err(Violations::of(MULTIPLE_SYSTEMS_VIOLATION));
        }
        Ok(common)
    }

    fn systems_for_reference(uri: &ResourceUri, request: &RequestedNode, inventory: &Inventory) -> Result<Option<Vec<SystemKey>>, String> {
        let Some(kind) = inventory.resource_kind(uri) else {
            return Err(format!("Specified resource ({}) does not exist.", uri));
        };
        let not_valid = || format!("Specified resource ({}) is not valid.", uri);

        match kind {
            ResourceKey::MemoryModule(system) => Ok(Some(vec![system])),
            ResourceKey::EthernetInterface(_) => inventory.owning_system(kind).map(|s| Some(vec![s])).ok_or_else(not_valid),
            ResourceKey::Processor(key) => {
                let processor = inventory.processors.get(key).ok_or_else(not_valid)?;
                if let Some(system) = processor.system {
                    return Ok(Some(vec![system]));
                }
                let Some(remote) = processor.remote.as_ref().filter(|_| processor.is_fpga()) else {
                    return Err(not_valid());
                };
                let connectivity = remote.connectivity();
                if !request.processors.iter().any(|p| p.resource.as_ref() == Some(uri) && p.allows(connectivity)) {
                    return Err(not_valid());
                }
                if connectivity == ProcessorConnectivity::Ethernet {
                    return Ok(None);
                }
                let reachable: Vec<SystemKey> =
                    inventory.systems.iter().filter(|(_, s)| s.shares_pcie_connection(&remote.pcie_connection_ids)).map(|(k, _)| k).collect();
                if reachable.is_empty() {
                    return Err(format!("Specified resource ({}) is not reachable from any computer system.", uri));
                }
                Ok(Some(reachable))
            }
            ResourceKey::Drive(key) => {
                let drive = inventory.drives.get(key).ok_or_else(not_valid)?;
                if let Some(system) = drive.system {
                    return Ok(Some(vec![system]));
                }
                if drive.is_pcie_fabric_attached() {
                    let reachable: Vec<SystemKey> =
                        inventory.systems.iter().filter(|(_, s)| s.shares_pcie_connection(&drive.pcie_connection_ids)).map(|(k, _)| k).collect();
                    return Ok(Some(reachable));
                }
                Err(not_valid())
            }
            _ => Err(not_valid()),
        }
    }
}
