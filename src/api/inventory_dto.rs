use serde::{Deserialize, Serialize};
use slotmap::Key;
use uuid::Uuid;

use crate::domain::inventory::arena::{Arena, InventoryRecord};
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::resources::{
    ComputerSystem, ConnectedEntity, Drive, Endpoint, EntityLink, EntityRole, EthernetInterface, EthernetSwitchPort, Fabric, MediaType, MemoryModule,
    Processor, ProcessorType, Protocol, RemoteAttachment, Status, StoragePool, StorageService, TpmInterfaceType, TrustedModule, Volume, Zone,
};
use crate::domain::utils::id::{ResourceUri, ServiceUri};
use crate::error::ConversionError;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryDto {
    pub fabrics: Vec<FabricDto>,
    pub storage_services: Vec<StorageServiceDto>,
    pub storage_pools: Vec<StoragePoolDto>,
    pub systems: Vec<ComputerSystemDto>,
    pub processors: Vec<ProcessorDto>,
    pub ethernet_interfaces: Vec<EthernetInterfaceDto>,
    pub switch_ports: Vec<SwitchPortDto>,
    pub drives: Vec<DriveDto>,
    pub volumes: Vec<VolumeDto>,
    pub zones: Vec<ZoneDto>,
    pub endpoints: Vec<EndpointDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FabricDto {
    pub uri: String,
    pub service: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageServiceDto {
    pub uri: String,
    pub service: String,
    pub fabric: Option<String>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePoolDto {
    pub uri: String,
    pub service: String,
    pub remaining_capacity_bytes: u64,
    pub storage_service: String,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryModuleDto {
    pub uri: String,
    pub capacity_mib: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedModuleDto {
    pub interface_type: TpmInterfaceType,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputerSystemDto {
    pub uri: String,
    pub service: String,
    pub uuid: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
    #[serde(default)]
    pub memory_modules: Vec<MemoryModuleDto>,
    #[serde(default)]
    pub trusted_modules: Vec<TrustedModuleDto>,
    pub user_mode_enabled: Option<bool>,
    #[serde(default)]
    pub network_device_functions: Vec<String>,
    #[serde(default)]
    pub pcie_connection_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttachmentDto {
    pub fabric: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub pcie_connection_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorDto {
    pub uri: String,
    pub service: String,
    pub processor_type: ProcessorType,
    pub total_cores: Option<u32>,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
    pub system: Option<String>,
    pub remote: Option<RemoteAttachmentDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EthernetInterfaceDto {
    pub uri: String,
    pub service: String,
    pub mac_address: Option<String>,
    pub speed_mbps: Option<u32>,
    #[serde(default)]
    pub vlan_enable: bool,
    #[serde(default)]
    pub status: Status,
    pub system: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchPortDto {
    pub uri: String,
    pub service: String,
    pub neighbor_mac: Option<String>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDto {
    pub uri: String,
    pub service: String,
    pub capacity_gib: f64,
    pub protocol: Protocol,
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
    pub system: Option<String>,
    #[serde(default)]
    pub pcie_connection_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDto {
    pub uri: String,
    pub service: String,
    pub capacity_bytes: u64,
    pub storage_pool: Option<String>,
    pub storage_service: Option<String>,
    #[serde(default)]
    pub bootable: bool,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDto {
    pub uri: String,
    pub service: String,
    pub fabric: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedEntityDto {
    pub role: EntityRole,
    pub entity: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDto {
    pub uri: String,
    pub service: String,
    pub protocol: Protocol,
    #[serde(default)]
    pub connected_entities: Vec<ConnectedEntityDto>,
    #[serde(default)]
    pub status: Status,
    #[serde(default = "default_true")]
    pub achievable: bool,
    #[serde(default)]
    pub allocated: bool,
    pub zone: Option<String>,
    pub fabric: Option<String>,
}

//-------------------------------------------
// --- Helpers for the Inventory conversion ---
//-------------------------------------------

fn ensure_new(inventory: &Inventory, uri: &str) -> Result<ResourceUri, ConversionError> {
    let uri = ResourceUri::new(uri);
    if inventory.contains(&uri) {
        return Err(ConversionError::DuplicateResource(uri.to_string()));
    }
    Ok(uri)
}

fn lookup<K: Key, T: InventoryRecord>(arena: &Arena<K, T>, owner: &str, kind: &'static str, uri: &str) -> Result<K, ConversionError> {
    arena
        .find(&ResourceUri::new(uri))
        .ok_or_else(|| ConversionError::UnknownReference { owner: owner.to_string(), kind, uri: uri.to_string() })
}

fn lookup_optional<K: Key, T: InventoryRecord>(
    arena: &Arena<K, T>,
    owner: &str,
    kind: &'static str,
    uri: Option<&String>,
) -> Result<Option<K>, ConversionError> {
    uri.map(|uri| lookup(arena, owner, kind, uri)).transpose()
}

fn entity_link(inventory: &Inventory, owner: &str, uri: &str) -> Result<EntityLink, ConversionError> {
    let target = ResourceUri::new(uri);
    if let Some(key) = inventory.systems.find(&target) {
        return Ok(EntityLink::System(key));
    }
    if let Some(key) = inventory.volumes.find(&target) {
        return Ok(EntityLink::Volume(key));
    }
    if let Some(key) = inventory.drives.find(&target) {
        return Ok(EntityLink::Drive(key));
    }
    if let Some(key) = inventory.processors.find(&target) {
        return Ok(EntityLink::Processor(key));
    }
    Err(ConversionError::UnknownReference { owner: owner.to_string(), kind: "connected entity", uri: uri.to_string() })
}

/// Builds the inventory in dependency order so every reference resolves to an existing record.
impl TryFrom<InventoryDto> for Inventory {
    type Error = ConversionError;

    fn try_from(dto: InventoryDto) -> Result<Self, Self::Error> {
        let mut inventory = Inventory::new();

        for fabric in dto.fabrics {
            let uri = ensure_new(&inventory, &fabric.uri)?;
            inventory.add_fabric(Fabric { uri, service: ServiceUri::new(fabric.service), protocol: fabric.protocol, status: fabric.status });
        }

        for service in dto.storage_services {
            let uri = ensure_new(&inventory, &service.uri)?;
            let fabric = lookup_optional(&inventory.fabrics, &service.uri, "fabric", service.fabric.as_ref())?;
            inventory.add_storage_service(StorageService { uri, service: ServiceUri::new(service.service), fabric, status: service.status });
        }

        for pool in dto.storage_pools {
            let uri = ensure_new(&inventory, &pool.uri)?;
            let storage_service = lookup(&inventory.storage_services, &pool.uri, "storage service", &pool.storage_service)?;
            inventory.add_storage_pool(StoragePool {
                uri,
                service: ServiceUri::new(pool.service),
                remaining_capacity_bytes: pool.remaining_capacity_bytes,
                storage_service,
                status: pool.status,
            });
        }

        for system in dto.systems {
            let uri = ensure_new(&inventory, &system.uri)?;
            let uuid = Uuid::parse_str(&system.uuid).map_err(|_| ConversionError::InvalidUuid(system.uuid.clone()))?;
            for memory in &system.memory_modules {
                ensure_new(&inventory, &memory.uri)?;
            }
            inventory.add_system(ComputerSystem {
                uri,
                service: ServiceUri::new(system.service),
                uuid,
                status: system.status,
                achievable: system.achievable,
                allocated: system.allocated,
                composed_node: None,
                processors: Vec::new(),
                memory_modules: system.memory_modules.into_iter().map(|m| MemoryModule { uri: ResourceUri::new(m.uri), capacity_mib: m.capacity_mib }).collect(),
                ethernet_interfaces: Vec::new(),
                trusted_modules: system.trusted_modules.into_iter().map(|t| TrustedModule { interface_type: t.interface_type, status: t.status }).collect(),
                user_mode_enabled: system.user_mode_enabled,
                network_device_functions: system.network_device_functions.into_iter().map(ResourceUri::new).collect(),
                pcie_connection_ids: system.pcie_connection_ids,
            });
        }

        for processor in dto.processors {
            let uri = ensure_new(&inventory, &processor.uri)?;
            let system = lookup_optional(&inventory.systems, &processor.uri, "computer system", processor.system.as_ref())?;
            let remote = match processor.remote {
                Some(remote) => Some(RemoteAttachment {
                    fabric: lookup(&inventory.fabrics, &processor.uri, "fabric", &remote.fabric)?,
                    protocol: remote.protocol,
                    pcie_connection_ids: remote.pcie_connection_ids,
                }),
                None => None,
            };
            inventory.add_processor(Processor {
                uri,
                service: ServiceUri::new(processor.service),
                processor_type: processor.processor_type,
                total_cores: processor.total_cores,
                status: processor.status,
                achievable: processor.achievable,
                allocated: processor.allocated,
                composed_node: None,
                system,
                remote,
            });
        }

        for interface in dto.ethernet_interfaces {
            let uri = ensure_new(&inventory, &interface.uri)?;
            let system = lookup_optional(&inventory.systems, &interface.uri, "computer system", interface.system.as_ref())?;
            inventory.add_ethernet_interface(EthernetInterface {
                uri,
                service: ServiceUri::new(interface.service),
                mac_address: interface.mac_address,
                speed_mbps: interface.speed_mbps,
                vlan_enable: interface.vlan_enable,
                status: interface.status,
                system,
            });
        }

        for port in dto.switch_ports {
            let uri = ensure_new(&inventory, &port.uri)?;
            inventory.add_switch_port(EthernetSwitchPort { uri, service: ServiceUri::new(port.service), neighbor_mac: port.neighbor_mac, status: port.status });
        }

        for drive in dto.drives {
            let uri = ensure_new(&inventory, &drive.uri)?;
            let system = lookup_optional(&inventory.systems, &drive.uri, "computer system", drive.system.as_ref())?;
            inventory.add_drive(Drive {
                uri,
                service: ServiceUri::new(drive.service),
                capacity_gib: drive.capacity_gib,
                protocol: drive.protocol,
                media_type: drive.media_type,
                status: drive.status,
                achievable: drive.achievable,
                allocated: drive.allocated,
                composed_node: None,
                system,
                pcie_connection_ids: drive.pcie_connection_ids,
                endpoint: None,
            });
        }

        for volume in dto.volumes {
            let uri = ensure_new(&inventory, &volume.uri)?;
            let storage_pool = lookup_optional(&inventory.storage_pools, &volume.uri, "storage pool", volume.storage_pool.as_ref())?;
            let storage_service = lookup_optional(&inventory.storage_services, &volume.uri, "storage service", volume.storage_service.as_ref())?;
            inventory.add_volume(Volume {
                uri,
                service: ServiceUri::new(volume.service),
                capacity_bytes: volume.capacity_bytes,
                storage_pool,
                storage_service,
                bootable: volume.bootable,
                endpoints: Vec::new(),
                status: volume.status,
                achievable: volume.achievable,
                allocated: volume.allocated,
                composed_node: None,
            });
        }

        for zone in dto.zones {
            let uri = ensure_new(&inventory, &zone.uri)?;
            let fabric = lookup(&inventory.fabrics, &zone.uri, "fabric", &zone.fabric)?;
            inventory.add_zone(Zone { uri, service: ServiceUri::new(zone.service), fabric, endpoints: Vec::new() });
        }

        for endpoint in dto.endpoints {
            let uri = ensure_new(&inventory, &endpoint.uri)?;
            let connected_entities = endpoint
                .connected_entities
                .iter()
                .map(|e| Ok(ConnectedEntity { role: e.role, entity: entity_link(&inventory, &endpoint.uri, &e.entity)? }))
                .collect::<Result<Vec<_>, ConversionError>>()?;
            let zone = lookup_optional(&inventory.zones, &endpoint.uri, "zone", endpoint.zone.as_ref())?;
            let fabric = lookup_optional(&inventory.fabrics, &endpoint.uri, "fabric", endpoint.fabric.as_ref())?;
            inventory.add_endpoint(Endpoint {
                uri,
                service: ServiceUri::new(endpoint.service),
                protocol: endpoint.protocol,
                connected_entities,
                status: endpoint.status,
                achievable: endpoint.achievable,
                allocated: endpoint.allocated,
                composed_node: None,
                zone,
                fabric,
            });
        }

        log::debug!(
            "Inventory built: {} systems, {} processors, {} drives, {} volumes, {} endpoints",
            inventory.systems.len(),
            inventory.processors.len(),
            inventory.drives.len(),
            inventory.volumes.len(),
            inventory.endpoints.len()
        );
        Ok(inventory)
    }
}
