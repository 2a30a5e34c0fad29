use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{Inventory, ProcessorKey, ResourceKey, SystemKey};
use crate::domain::inventory::resources::{ComputerSystem, RemoteAttachment};
use crate::domain::inventory::transaction::{AttachableAsset, InventoryTransaction};
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::{ProcessorConnectivity, RequestedProcessor};
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Claims the processors of the chosen system and resolves FPGAs that may live elsewhere.
#[derive(Debug)]
pub struct ProcessorAllocator<'a> {
    requested: &'a [RequestedProcessor],
}

impl<'a> ProcessorAllocator<'a> {
    pub fn new(requested: &'a [RequestedProcessor]) -> Self {
        Self { requested }
    }

    pub fn allocate(&self, tx: &mut InventoryTransaction, node: &mut ComposedNode, system: SystemKey) -> Result<Vec<NodeTask>, AllocationError> {
        let hosted = tx.inventory().systems.get(system).map(|s| s.processors.clone()).unwrap_or_default();
        for key in hosted {
            if let Some(processor) = tx.processor_mut(key) {
                processor.allocated = true;
            }
        }

        let mut tasks = Vec::new();
        let mut used: Vec<ProcessorKey> = Vec::new();

        for requested in self.requested {
            let inventory = tx.inventory();
            if !(requested.is_fpga(inventory) && requested.accepts_remote_attachment()) {
                continue;
            }

            let Some(key) = Self::resolve_fpga(requested, inventory, system, &used) else {
                let system_uri = inventory.systems.get(system).map(|s| s.uri.to_string()).unwrap_or_default();
                return Err(Violations::of(format!("No achievable FPGA processor available for computer system {}", system_uri)).into());
            };
            used.push(key);

            let Some(processor) = inventory.processors.get(key) else {
                continue;
            };
            if processor.system == Some(system) {
                log::debug!("FPGA request satisfied by local processor {}", processor.uri);
                continue;
            }

            let fabric = processor
                .remote
                .as_ref()
                .and_then(|r| inventory.fabrics.get(r.fabric))
                .ok_or_else(|| AllocationError::Internal(format!("Fabric of remote processor {} is not in the inventory", processor.uri)))?;
            let host = inventory
                .systems
                .get(system)
                .ok_or_else(|| AllocationError::Internal(format!("Computer system for remote processor {} is not in the inventory", processor.uri)))?;
            tasks.push(NodeTask::AttachRemoteProcessor {
                composed_node: node.uri.clone(),
                system: host.uri.clone(),
                processor: processor.uri.clone(),
                fabric: fabric.uri.clone(),
            });
            tx.attach_asset(node, AttachableAsset::Processor(key));
        }

        Ok(tasks)
    }

    /// Explicit reference, then a PCIe-fabric FPGA behind a shared switch port, then one reachable
    /// over any other fabric, then the first FPGA of the system itself.
    fn resolve_fpga(requested: &RequestedProcessor, inventory: &Inventory, system: SystemKey, used: &[ProcessorKey]) -> Option<ProcessorKey> {
        let host = inventory.systems.get(system)?;

        if let Some(uri) = &requested.resource {
            let Some(ResourceKey::Processor(key)) = inventory.resource_kind(uri) else {
                return None;
            };
            let processor = inventory.processors.get(key)?;
            let usable = processor.system == Some(system)
                || (processor.is_attachable() && processor.remote.as_ref().is_some_and(|remote| Self::reaches(requested, host, remote)));
            return (usable && !used.contains(&key)).then_some(key);
        }

        let remote_fpgas = || {
            inventory
                .processors
                .iter()
                .filter(|(key, p)| p.is_fpga() && p.system.is_none() && p.is_attachable() && !used.contains(key))
                .filter_map(|(key, p)| p.remote.as_ref().map(|remote| (key, remote)))
                .filter(|(_, remote)| Self::reaches(requested, host, remote))
        };

        let over_pcie = remote_fpgas().find(|(_, remote)| remote.connectivity() == ProcessorConnectivity::RemotePcie);
        if let Some((key, _)) = over_pcie.or_else(|| remote_fpgas().next()) {
            return Some(key);
        }

        host.processors.iter().copied().find(|key| !used.contains(key) && inventory.processors.get(*key).is_some_and(|p| p.is_fpga()))
    }

    /// The request accepts the attachment, and a PCIe-fabric FPGA shares a connection with `host`.
    fn reaches(requested: &RequestedProcessor, host: &ComputerSystem, remote: &RemoteAttachment) -> bool {
        let connectivity = remote.connectivity();
        requested.allows(connectivity) && (connectivity == ProcessorConnectivity::Ethernet || host.shares_pcie_connection(&remote.pcie_connection_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::inventory_store::InventoryStore;
    use crate::domain::inventory::resources::{Fabric, Processor, ProcessorType, Protocol, Status};
    use crate::domain::utils::id::{ResourceUri, ServiceUri};
    use uuid::Uuid;

    fn system(uri: &str, connection: &str) -> ComputerSystem {
        ComputerSystem {
            uri: ResourceUri::new(uri),
            service: ServiceUri::new("/services/1"),
            uuid: Uuid::new_v4(),
            status: Status::enabled_and_healthy(),
            achievable: true,
            allocated: false,
            composed_node: None,
            processors: Vec::new(),
            memory_modules: Vec::new(),
            ethernet_interfaces: Vec::new(),
            trusted_modules: Vec::new(),
            user_mode_enabled: None,
            network_device_functions: Vec::new(),
            pcie_connection_ids: vec![connection.to_string()],
        }
    }

    fn processor(uri: &str, processor_type: ProcessorType, system: Option<SystemKey>, remote: Option<RemoteAttachment>) -> Processor {
        Processor {
            uri: ResourceUri::new(uri),
            service: ServiceUri::new("/services/1"),
            processor_type,
            total_cores: Some(4),
            status: Status::enabled_and_healthy(),
            achievable: true,
            allocated: false,
            composed_node: None,
            system,
            remote,
        }
    }

    fn fabric(uri: &str, protocol: Protocol) -> Fabric {
        Fabric { uri: ResourceUri::new(uri), service: ServiceUri::new("/services/1"), protocol, status: Status::enabled_and_healthy() }
    }

    fn fpga_request(connectivity: Vec<ProcessorConnectivity>) -> RequestedProcessor {
        RequestedProcessor { processor_type: Some(ProcessorType::Fpga), connectivity, ..Default::default() }
    }

    struct Fixture {
        store: InventoryStore,
        system: SystemKey,
        local_fpga: ProcessorKey,
        pcie_fpga: ProcessorKey,
        ethernet_fpga: ProcessorKey,
    }

    fn fixture() -> Fixture {
        let mut inventory = Inventory::new();
        let system = inventory.add_system(system("/redfish/v1/Systems/1", "conn-1"));
        let pcie_fabric = inventory.add_fabric(fabric("/redfish/v1/Fabrics/PCIe", Protocol::Pcie));
        let ethernet_fabric = inventory.add_fabric(fabric("/redfish/v1/Fabrics/FPGAoF", Protocol::FpgaOverFabrics));

        inventory.add_processor(processor("/redfish/v1/Systems/1/Processors/CPU1", ProcessorType::Cpu, Some(system), None));
        let local_fpga = inventory.add_processor(processor("/redfish/v1/Systems/1/Processors/FPGA1", ProcessorType::Fpga, Some(system), None));
        let pcie_fpga = inventory.add_processor(processor(
            "/redfish/v1/Chassis/PCIe/Processors/FPGA1",
            ProcessorType::Fpga,
            None,
            Some(RemoteAttachment { fabric: pcie_fabric, protocol: Protocol::Pcie, pcie_connection_ids: vec!["conn-1".to_string()] }),
        ));
        let ethernet_fpga = inventory.add_processor(processor(
            "/redfish/v1/Chassis/FPGAoF/Processors/FPGA1",
            ProcessorType::Fpga,
            None,
            Some(RemoteAttachment { fabric: ethernet_fabric, protocol: Protocol::FpgaOverFabrics, pcie_connection_ids: Vec::new() }),
        ));

        Fixture { store: InventoryStore::new(inventory), system, local_fpga, pcie_fpga, ethernet_fpga }
    }

    #[test]
    fn prefers_pcie_fabric_fpga_when_connectivity_is_open() {
        let f = fixture();
        let inventory = f.store.snapshot();

        let resolved = ProcessorAllocator::resolve_fpga(&fpga_request(Vec::new()), &inventory, f.system, &[]);

        assert_eq!(resolved, Some(f.pcie_fpga));
    }

    #[test]
    fn ethernet_connectivity_skips_pcie_fabric() {
        let f = fixture();
        let inventory = f.store.snapshot();

        let resolved = ProcessorAllocator::resolve_fpga(&fpga_request(vec![ProcessorConnectivity::Ethernet]), &inventory, f.system, &[]);

        assert_eq!(resolved, Some(f.ethernet_fpga));
    }

    #[test]
    fn falls_back_to_local_fpga() {
        let f = fixture();
        let inventory = f.store.snapshot();

        let resolved =
            ProcessorAllocator::resolve_fpga(&fpga_request(vec![ProcessorConnectivity::RemotePcie]), &inventory, f.system, &[f.pcie_fpga]);

        assert_eq!(resolved, Some(f.local_fpga));
    }

    #[test]
    fn referenced_fpga_must_match_requested_connectivity() {
        let f = fixture();
        let inventory = f.store.snapshot();
        let mut requested = fpga_request(vec![ProcessorConnectivity::Ethernet]);
        requested.resource = Some(ResourceUri::new("/redfish/v1/Chassis/PCIe/Processors/FPGA1"));

        assert_eq!(ProcessorAllocator::resolve_fpga(&requested, &inventory, f.system, &[]), None);

        requested.connectivity = vec![ProcessorConnectivity::RemotePcie];
        assert_eq!(ProcessorAllocator::resolve_fpga(&requested, &inventory, f.system, &[]), Some(f.pcie_fpga));
    }

    #[test]
    fn referenced_pcie_fpga_behind_another_switch_is_not_resolved() {
        let f = fixture();
        let mut inventory = f.store.snapshot();
        let other = inventory.add_system(system("/redfish/v1/Systems/2", "conn-2"));
        let mut requested = fpga_request(Vec::new());
        requested.resource = Some(ResourceUri::new("/redfish/v1/Chassis/PCIe/Processors/FPGA1"));

        assert_eq!(ProcessorAllocator::resolve_fpga(&requested, &inventory, other, &[]), None);
        assert_eq!(ProcessorAllocator::resolve_fpga(&requested, &inventory, f.system, &[]), Some(f.pcie_fpga));
    }

    #[test]
    fn remote_fpga_is_attached_with_a_task() {
        let f = fixture();
        let mut tx = f.store.begin();
        let mut node = ComposedNode::new("node", None);
        let requested = vec![fpga_request(vec![ProcessorConnectivity::RemotePcie])];

        let tasks = ProcessorAllocator::new(&requested).allocate(&mut tx, &mut node, f.system).unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name(), "AttachRemoteProcessor");
        assert!(tx.inventory().processors.get(f.pcie_fpga).unwrap().allocated);
        assert!(tx.inventory().processors.get(f.local_fpga).unwrap().allocated);
        assert_eq!(node.processors().count(), 1);
    }

    #[test]
    fn no_fpga_left_is_rejected() {
        let f = fixture();
        let mut tx = f.store.begin();
        let mut node = ComposedNode::new("node", None);
        let requested = vec![fpga_request(Vec::new()), fpga_request(Vec::new()), fpga_request(Vec::new()), fpga_request(Vec::new())];

        let error = ProcessorAllocator::new(&requested).allocate(&mut tx, &mut node, f.system).unwrap_err();

        assert!(error.violations().unwrap().iter().next().unwrap().starts_with("No achievable FPGA processor available"));
    }
}
