use slotmap::new_key_type;
use std::collections::HashMap;

use crate::domain::inventory::arena::Arena;
use crate::domain::inventory::resources::{
    ComputerSystem, Drive, Endpoint, EntityLink, EntityRole, EthernetInterface, EthernetSwitchPort, Fabric, Processor, Protocol, StoragePool,
    StorageService, Volume, Zone,
};
use crate::domain::utils::id::ResourceUri;

new_key_type! {
    pub struct SystemKey;
    pub struct ProcessorKey;
    pub struct DriveKey;
    pub struct VolumeKey;
    pub struct EndpointKey;
    pub struct ZoneKey;
    pub struct FabricKey;
    pub struct StoragePoolKey;
    pub struct StorageServiceKey;
    pub struct EthernetInterfaceKey;
    pub struct SwitchPortKey;
}

/// What a URI points at. Doubles as the type dispatch table for references in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKey {
    System(SystemKey),
    /// Memory modules live inside their system record.
    MemoryModule(SystemKey),
    Processor(ProcessorKey),
    Drive(DriveKey),
    Volume(VolumeKey),
    Endpoint(EndpointKey),
    Zone(ZoneKey),
    Fabric(FabricKey),
    StoragePool(StoragePoolKey),
    StorageService(StorageServiceKey),
    EthernetInterface(EthernetInterfaceKey),
    SwitchPort(SwitchPortKey),
}

/// Snapshot of all discovered hardware.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub systems: Arena<SystemKey, ComputerSystem>,
    pub processors: Arena<ProcessorKey, Processor>,
    pub drives: Arena<DriveKey, Drive>,
    pub volumes: Arena<VolumeKey, Volume>,
    pub endpoints: Arena<EndpointKey, Endpoint>,
    pub zones: Arena<ZoneKey, Zone>,
    pub fabrics: Arena<FabricKey, Fabric>,
    pub storage_pools: Arena<StoragePoolKey, StoragePool>,
    pub storage_services: Arena<StorageServiceKey, StorageService>,
    pub ethernet_interfaces: Arena<EthernetInterfaceKey, EthernetInterface>,
    pub switch_ports: Arena<SwitchPortKey, EthernetSwitchPort>,
    kinds: HashMap<ResourceUri, ResourceKey>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    //----------------------
    // --- Registration ---
    //----------------------
    pub fn add_system(&mut self, system: ComputerSystem) -> SystemKey {
        let memory_uris: Vec<ResourceUri> = system.memory_modules.iter().map(|m| m.uri.clone()).collect();
        let uri = system.uri.clone();
        let key = self.systems.insert(system);
        self.kinds.insert(uri, ResourceKey::System(key));
        for memory_uri in memory_uris {
            self.kinds.insert(memory_uri, ResourceKey::MemoryModule(key));
        }
        key
    }

    /// Registers a processor and links it to its hosting system, if any.
    pub fn add_processor(&mut self, processor: Processor) -> ProcessorKey {
        let uri = processor.uri.clone();
        let host = processor.system;
        let key = self.processors.insert(processor);
        self.kinds.insert(uri, ResourceKey::Processor(key));
        if let Some(system) = host.and_then(|s| self.systems.get_mut(s)) {
            system.processors.push(key);
        }
        key
    }

    pub fn add_drive(&mut self, drive: Drive) -> DriveKey {
        let uri = drive.uri.clone();
        let key = self.drives.insert(drive);
        self.kinds.insert(uri, ResourceKey::Drive(key));
        key
    }

    pub fn add_volume(&mut self, volume: Volume) -> VolumeKey {
        let uri = volume.uri.clone();
        let key = self.volumes.insert(volume);
        self.kinds.insert(uri, ResourceKey::Volume(key));
        key
    }

    /// Registers an endpoint and links it to the volumes and drives it exposes and to its zone.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) -> EndpointKey {
        let uri = endpoint.uri.clone();
        let volumes: Vec<VolumeKey> = endpoint.connected_volumes().collect();
        let drives: Vec<DriveKey> = endpoint
            .connected_entities
            .iter()
            .filter_map(|e| match e.entity {
                EntityLink::Drive(drive) => Some(drive),
                _ => None,
            })
            .collect();
        let zone = endpoint.zone;
        let key = self.endpoints.insert(endpoint);
        self.kinds.insert(uri, ResourceKey::Endpoint(key));
        for volume in volumes {
            if let Some(volume) = self.volumes.get_mut(volume) {
                volume.endpoints.push(key);
            }
        }
        for drive in drives {
            if let Some(drive) = self.drives.get_mut(drive) {
                drive.endpoint = Some(key);
            }
        }
        if let Some(zone) = zone.and_then(|z| self.zones.get_mut(z)) {
            zone.endpoints.push(key);
        }
        key
    }

    pub fn add_zone(&mut self, zone: Zone) -> ZoneKey {
        let uri = zone.uri.clone();
        let key = self.zones.insert(zone);
        self.kinds.insert(uri, ResourceKey::Zone(key));
        key
    }

    pub fn add_fabric(&mut self, fabric: Fabric) -> FabricKey {
        let uri = fabric.uri.clone();
        let key = self.fabrics.insert(fabric);
        self.kinds.insert(uri, ResourceKey::Fabric(key));
        key
    }

    pub fn add_storage_pool(&mut self, pool: StoragePool) -> StoragePoolKey {
        let uri = pool.uri.clone();
        let key = self.storage_pools.insert(pool);
        self.kinds.insert(uri, ResourceKey::StoragePool(key));
        key
    }

    pub fn add_storage_service(&mut self, service: StorageService) -> StorageServiceKey {
        let uri = service.uri.clone();
        let key = self.storage_services.insert(service);
        self.kinds.insert(uri, ResourceKey::StorageService(key));
        key
    }

    /// Registers an ethernet interface and links it to its hosting system, if any.
    pub fn add_ethernet_interface(&mut self, interface: EthernetInterface) -> EthernetInterfaceKey {
        let uri = interface.uri.clone();
        let host = interface.system;
        let key = self.ethernet_interfaces.insert(interface);
        self.kinds.insert(uri, ResourceKey::EthernetInterface(key));
        if let Some(system) = host.and_then(|s| self.systems.get_mut(s)) {
            system.ethernet_interfaces.push(key);
        }
        key
    }

    pub fn add_switch_port(&mut self, port: EthernetSwitchPort) -> SwitchPortKey {
        let uri = port.uri.clone();
        let key = self.switch_ports.insert(port);
        self.kinds.insert(uri, ResourceKey::SwitchPort(key));
        key
    }

    //-----------------
    // --- Lookups ---
    //-----------------
    pub fn resource_kind(&self, uri: &ResourceUri) -> Option<ResourceKey> {
        self.kinds.get(uri).copied()
    }

    pub fn contains(&self, uri: &ResourceUri) -> bool {
        self.kinds.contains_key(uri)
    }

    pub fn uri_of(&self, key: ResourceKey) -> Option<&ResourceUri> {
        match key {
            ResourceKey::System(k) | ResourceKey::MemoryModule(k) => self.systems.get(k).map(|r| &r.uri),
            ResourceKey::Processor(k) => self.processors.get(k).map(|r| &r.uri),
            ResourceKey::Drive(k) => self.drives.get(k).map(|r| &r.uri),
            ResourceKey::Volume(k) => self.volumes.get(k).map(|r| &r.uri),
            ResourceKey::Endpoint(k) => self.endpoints.get(k).map(|r| &r.uri),
            ResourceKey::Zone(k) => self.zones.get(k).map(|r| &r.uri),
            ResourceKey::Fabric(k) => self.fabrics.get(k).map(|r| &r.uri),
            ResourceKey::StoragePool(k) => self.storage_pools.get(k).map(|r| &r.uri),
            ResourceKey::StorageService(k) => self.storage_services.get(k).map(|r| &r.uri),
            ResourceKey::EthernetInterface(k) => self.ethernet_interfaces.get(k).map(|r| &r.uri),
            ResourceKey::SwitchPort(k) => self.switch_ports.get(k).map(|r| &r.uri),
        }
    }

    pub fn version_of(&self, key: ResourceKey) -> Option<u64> {
        match key {
            ResourceKey::System(k) | ResourceKey::MemoryModule(k) => self.systems.version(k),
            ResourceKey::Processor(k) => self.processors.version(k),
            ResourceKey::Drive(k) => self.drives.version(k),
            ResourceKey::Volume(k) => self.volumes.version(k),
            ResourceKey::Endpoint(k) => self.endpoints.version(k),
            ResourceKey::Zone(k) => self.zones.version(k),
            ResourceKey::Fabric(k) => self.fabrics.version(k),
            ResourceKey::StoragePool(k) => self.storage_pools.version(k),
            ResourceKey::StorageService(k) => self.storage_services.version(k),
            ResourceKey::EthernetInterface(k) => self.ethernet_interfaces.version(k),
            ResourceKey::SwitchPort(k) => self.switch_ports.version(k),
        }
    }

    /// Copies one record from a transaction's working copy into this inventory.
    pub fn overwrite_from(&mut self, source: &Inventory, key: ResourceKey) -> bool {
        match key {
            ResourceKey::System(k) | ResourceKey::MemoryModule(k) => self.systems.overwrite_from(&source.systems, k),
            ResourceKey::Processor(k) => self.processors.overwrite_from(&source.processors, k),
            ResourceKey::Drive(k) => self.drives.overwrite_from(&source.drives, k),
            ResourceKey::Volume(k) => self.volumes.overwrite_from(&source.volumes, k),
            ResourceKey::Endpoint(k) => self.endpoints.overwrite_from(&source.endpoints, k),
            ResourceKey::Zone(k) => self.zones.overwrite_from(&source.zones, k),
            ResourceKey::Fabric(k) => self.fabrics.overwrite_from(&source.fabrics, k),
            ResourceKey::StoragePool(k) => self.storage_pools.overwrite_from(&source.storage_pools, k),
            ResourceKey::StorageService(k) => self.storage_services.overwrite_from(&source.storage_services, k),
            ResourceKey::EthernetInterface(k) => self.ethernet_interfaces.overwrite_from(&source.ethernet_interfaces, k),
            ResourceKey::SwitchPort(k) => self.switch_ports.overwrite_from(&source.switch_ports, k),
        }
    }

    /// System hosting the given resource directly, following processor, drive, memory and interface links.
    pub fn owning_system(&self, key: ResourceKey) -> Option<SystemKey> {
        match key {
            ResourceKey::System(k) | ResourceKey::MemoryModule(k) => Some(k),
            ResourceKey::Processor(k) => self.processors.get(k).and_then(|p| p.system),
            ResourceKey::Drive(k) => self.drives.get(k).and_then(|d| d.system),
            ResourceKey::EthernetInterface(k) => self.ethernet_interfaces.get(k).and_then(|i| i.system),
            _ => None,
        }
    }

    /// Fabric protocol behind a storage service.
    pub fn storage_service_protocol(&self, service: StorageServiceKey) -> Option<Protocol> {
        let fabric = self.storage_services.get(service)?.fabric?;
        self.fabrics.get(fabric).map(|f| f.protocol)
    }

    /// Initiator endpoint that already connects the system to the fabric.
    pub fn find_initiator_endpoint(&self, system: SystemKey, fabric: Option<FabricKey>) -> Option<EndpointKey> {
        self.endpoints
            .iter()
            .find(|(_, endpoint)| {
                endpoint.connected_entities.iter().any(|e| e.entity == EntityLink::System(system) && e.role == EntityRole::Initiator)
                    && (fabric.is_none() || endpoint.fabric == fabric)
            })
            .map(|(key, _)| key)
    }

    /// Local storage a system can use: its own drives plus PCIe drives behind a shared switch port.
    pub fn visible_local_drives(&self, system: SystemKey) -> Vec<DriveKey> {
        let Some(host) = self.systems.get(system) else {
            return Vec::new();
        };
        self.drives
            .iter()
            .filter(|(_, drive)| drive.system == Some(system) || (drive.is_pcie_fabric_attached() && host.shares_pcie_connection(&drive.pcie_connection_ids)))
            .map(|(key, _)| key)
            .collect()
    }

    pub fn system_has_fpga(&self, system: SystemKey) -> bool {
        self.systems
            .get(system)
            .is_some_and(|s| s.processors.iter().any(|p| self.processors.get(*p).is_some_and(|p| p.is_fpga())))
    }
}
