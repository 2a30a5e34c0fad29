use std::fmt::Debug;

use crate::domain::inventory::inventory::{Inventory, ProcessorKey, SystemKey};
use crate::domain::inventory::resources::{ComputerSystem, Processor};
use crate::domain::matcher::ethernet_interface_mapper::{DefaultEthernetInterfaceMapper, EthernetInterfaceMapper};
use crate::domain::matcher::local_drive_mapper::{DefaultLocalDriveMapper, LocalDriveMapper};
use crate::domain::request::requested_node::{RequestedNode, RequestedProcessor};

/// Reduces candidate systems to those able to host the requested node.
pub trait ComputerSystemMatcher: Debug + Send + Sync {
    /// Keeps the order of `candidates`.
    fn matches(&self, request: &RequestedNode, candidates: Vec<SystemKey>, inventory: &Inventory) -> Vec<SystemKey>;
}

/// Rule-based matcher used when no other matcher is plugged in.
///
/// A system qualifies when it is free, achievable, enabled and healthy, and when its processors,
/// memory, ethernet interfaces, visible local drives and trusted modules cover the request.
#[derive(Debug, Clone, Default)]
pub struct DefaultComputerSystemMatcher {
    drive_mapper: DefaultLocalDriveMapper,
    interface_mapper: DefaultEthernetInterfaceMapper,
}

impl DefaultComputerSystemMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn processor_satisfies(requested: &RequestedProcessor, processor: &Processor) -> bool {
        if let Some(uri) = &requested.resource {
            return &processor.uri == uri;
        }
        requested.processor_type.is_none_or(|t| processor.processor_type == t)
            && requested.total_cores.is_none_or(|cores| processor.total_cores.is_some_and(|c| c >= cores))
    }

    fn has_processors(&self, request: &RequestedNode, system: &ComputerSystem, inventory: &Inventory) -> bool {
        let mut used: Vec<ProcessorKey> = Vec::new();

        for requested in &request.processors {
            // FPGAs that may be reached over a fabric are resolved during allocation.
            if requested.is_fpga(inventory) && requested.accepts_remote_attachment() {
                continue;
            }
            let found = system.processors.iter().copied().find(|key| {
                !used.contains(key) && inventory.processors.get(*key).is_some_and(|p| Self::processor_satisfies(requested, p))
            });
            match found {
                Some(key) => used.push(key),
                None => return false,
            }
        }
        true
    }

    fn has_memory(request: &RequestedNode, system: &ComputerSystem) -> bool {
        let by_reference = request.memory.iter().filter_map(|m| m.resource.as_ref()).all(|uri| system.memory_modules.iter().any(|m| &m.uri == uri));
        let requested_mib: u64 = request.memory.iter().filter_map(|m| m.capacity_mib).sum();

        by_reference && system.total_memory_mib() >= requested_mib
    }

    fn has_trusted_module(request: &RequestedNode, system: &ComputerSystem) -> bool {
        let Some(security) = &request.security else {
            return true;
        };
        if let Some(interface_type) = security.tpm_interface_type {
            return system.trusted_modules.iter().any(|m| m.interface_type == interface_type);
        }
        if security.tpm_present == Some(true) {
            return !system.trusted_modules.is_empty();
        }
        true
    }

    fn satisfies(&self, request: &RequestedNode, key: SystemKey, inventory: &Inventory) -> bool {
        let Some(system) = inventory.systems.get(key) else {
            return false;
        };
        if !system.is_available() {
            return false;
        }

        let drives: Vec<_> = inventory.visible_local_drives(key).into_iter().filter(|d| inventory.drives.get(*d).is_some_and(|d| d.is_available())).collect();
        let drives_mapped = self.drive_mapper.map(&request.local_drives, &drives, inventory).len() == request.local_drives.len();
        let interfaces_mapped =
            self.interface_mapper.map(&request.ethernet_interfaces, &system.ethernet_interfaces, inventory).len() == request.ethernet_interfaces.len();

        self.has_processors(request, system, inventory)
            && Self::has_memory(request, system)
            && Self::has_trusted_module(request, system)
            && drives_mapped
            && interfaces_mapped
    }
}

impl ComputerSystemMatcher for DefaultComputerSystemMatcher {
    fn matches(&self, request: &RequestedNode, candidates: Vec<SystemKey>, inventory: &Inventory) -> Vec<SystemKey> {
        candidates.into_iter().filter(|key| self.satisfies(request, *key, inventory)).collect()
    }
}
