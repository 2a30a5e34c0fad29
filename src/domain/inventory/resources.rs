use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::inventory::arena::InventoryRecord;
use crate::domain::inventory::inventory::{
    DriveKey, EndpointKey, EthernetInterfaceKey, FabricKey, ProcessorKey, StoragePoolKey, StorageServiceKey, SystemKey, VolumeKey, ZoneKey,
};
use crate::domain::request::requested_node::ProcessorConnectivity;
use crate::domain::utils::id::{ResourceUri, ServiceUri};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Enabled,
    Disabled,
    StandbyOffline,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    pub state: State,
    pub health: Health,
    pub health_rollup: Option<Health>,
}

impl Status {
    /// Enabled/OK/OK, the status every freshly composed node starts with.
    pub const fn enabled_and_healthy() -> Self {
        Status { state: State::Enabled, health: Health::Ok, health_rollup: Some(Health::Ok) }
    }

    pub fn is_enabled_and_healthy(&self) -> bool {
        self.state == State::Enabled && self.health == Health::Ok
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::enabled_and_healthy()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "PCIe")]
    Pcie,
    #[serde(rename = "NVMe")]
    Nvme,
    #[serde(rename = "NVMeOverFabrics")]
    NvmeOverFabrics,
    #[serde(rename = "iSCSI")]
    Iscsi,
    #[serde(rename = "FC")]
    FibreChannel,
    #[serde(rename = "SAS")]
    Sas,
    #[serde(rename = "SATA")]
    Sata,
    Ethernet,
    #[serde(rename = "FPGAoF")]
    FpgaOverFabrics,
}

impl Protocol {
    /// Network-attached storage protocols need initiator/target endpoints and boot configuration
    /// on the host's network device function.
    pub fn is_network_attached_storage(&self) -> bool {
        matches!(self, Protocol::Iscsi)
    }

    pub fn is_pcie_class(&self) -> bool {
        matches!(self, Protocol::Pcie | Protocol::Nvme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityRole {
    Target,
    Initiator,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessorType {
    #[serde(rename = "CPU")]
    Cpu,
    #[serde(rename = "GPU")]
    Gpu,
    #[serde(rename = "FPGA")]
    Fpga,
    #[serde(rename = "DSP")]
    Dsp,
    Accelerator,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "SSD")]
    Ssd,
    #[serde(rename = "HDD")]
    Hdd,
}

/// Interface type of a trusted platform module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TpmInterfaceType {
    #[serde(rename = "TPM1_2")]
    Tpm1_2,
    #[serde(rename = "TPM2_0")]
    Tpm2_0,
    #[serde(rename = "TCM1_0")]
    Tcm1_0,
}

impl TpmInterfaceType {
    /// Lower value wins when no interface type was requested explicitly.
    pub fn priority(&self) -> u8 {
        match self {
            TpmInterfaceType::Tpm2_0 => 0,
            TpmInterfaceType::Tpm1_2 => 1,
            TpmInterfaceType::Tcm1_0 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaType {
    Clone,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryModule {
    pub uri: ResourceUri,
    pub capacity_mib: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedModule {
    pub interface_type: TpmInterfaceType,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct ComputerSystem {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub uuid: Uuid,
    pub status: Status,
    pub achievable: bool,
    pub allocated: bool,
    pub composed_node: Option<ResourceUri>,
    pub processors: Vec<ProcessorKey>,
    pub memory_modules: Vec<MemoryModule>,
    pub ethernet_interfaces: Vec<EthernetInterfaceKey>,
    pub trusted_modules: Vec<TrustedModule>,
    pub user_mode_enabled: Option<bool>,
    pub network_device_functions: Vec<ResourceUri>,
    pub pcie_connection_ids: Vec<String>,
}

impl ComputerSystem {
    pub fn is_available(&self) -> bool {
        !self.allocated && self.achievable && self.status.is_enabled_and_healthy()
    }

    pub fn total_memory_mib(&self) -> u64 {
        self.memory_modules.iter().map(|m| m.capacity_mib).sum()
    }

    pub fn shares_pcie_connection(&self, connection_ids: &[String]) -> bool {
        connection_ids.iter().any(|id| self.pcie_connection_ids.contains(id))
    }
}

/// How a processor that is not hosted by a system can be reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAttachment {
    pub fabric: FabricKey,
    pub protocol: Protocol,
    pub pcie_connection_ids: Vec<String>,
}

impl RemoteAttachment {
    /// How a system reaches the processor: PCIe-class fabrics go through a switch port.
    pub fn connectivity(&self) -> ProcessorConnectivity {
        if self.protocol.is_pcie_class() { ProcessorConnectivity::RemotePcie } else { ProcessorConnectivity::Ethernet }
    }
}

#[derive(Debug, Clone)]
pub struct Processor {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub processor_type: ProcessorType,
    pub total_cores: Option<u32>,
    pub status: Status,
    pub achievable: bool,
    pub allocated: bool,
    pub composed_node: Option<ResourceUri>,
    /// Hosting system for processors sitting directly on a compute tray.
    pub system: Option<SystemKey>,
    pub remote: Option<RemoteAttachment>,
}

impl Processor {
    pub fn is_fpga(&self) -> bool {
        self.processor_type == ProcessorType::Fpga
    }

    pub fn is_attachable(&self) -> bool {
        !self.allocated && self.achievable && self.status.is_enabled_and_healthy()
    }
}

#[derive(Debug, Clone)]
pub struct Drive {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub capacity_gib: f64,
    pub protocol: Protocol,
    pub media_type: Option<MediaType>,
    pub status: Status,
    pub achievable: bool,
    pub allocated: bool,
    pub composed_node: Option<ResourceUri>,
    /// Set for drives attached directly to one system's storage controller.
    pub system: Option<SystemKey>,
    /// Set for drives reachable through a PCIe switch.
    pub pcie_connection_ids: Vec<String>,
    pub endpoint: Option<EndpointKey>,
}

impl Drive {
    pub fn is_available(&self) -> bool {
        !self.allocated && self.achievable && self.status.is_enabled_and_healthy()
    }

    pub fn is_pcie_fabric_attached(&self) -> bool {
        self.system.is_none() && !self.pcie_connection_ids.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Volume {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub capacity_bytes: u64,
    pub storage_pool: Option<StoragePoolKey>,
    pub storage_service: Option<StorageServiceKey>,
    pub bootable: bool,
    pub endpoints: Vec<EndpointKey>,
    pub status: Status,
    pub achievable: bool,
    pub allocated: bool,
    pub composed_node: Option<ResourceUri>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLink {
    System(SystemKey),
    Volume(VolumeKey),
    Drive(DriveKey),
    Processor(ProcessorKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedEntity {
    pub role: EntityRole,
    pub entity: EntityLink,
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub protocol: Protocol,
    pub connected_entities: Vec<ConnectedEntity>,
    pub status: Status,
    pub achievable: bool,
    pub allocated: bool,
    pub composed_node: Option<ResourceUri>,
    pub zone: Option<ZoneKey>,
    pub fabric: Option<FabricKey>,
}

impl Endpoint {
    pub fn has_role(&self, role: EntityRole) -> bool {
        self.connected_entities.iter().any(|e| e.role == role)
    }

    /// Not claimed by another node and not a member of any zone.
    pub fn is_attachable(&self) -> bool {
        !self.allocated && self.zone.is_none()
    }

    pub fn connected_volumes(&self) -> impl Iterator<Item = VolumeKey> + '_ {
        self.connected_entities.iter().filter_map(|e| match e.entity {
            EntityLink::Volume(volume) => Some(volume),
            _ => None,
        })
    }

}

#[derive(Debug, Clone)]
pub struct Zone {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub fabric: FabricKey,
    pub endpoints: Vec<EndpointKey>,
}

#[derive(Debug, Clone)]
pub struct Fabric {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub protocol: Protocol,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct StoragePool {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub remaining_capacity_bytes: u64,
    pub storage_service: StorageServiceKey,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct StorageService {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub fabric: Option<FabricKey>,
    pub status: Status,
}

#[derive(Debug, Clone)]
pub struct EthernetInterface {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub mac_address: Option<String>,
    pub speed_mbps: Option<u32>,
    pub vlan_enable: bool,
    pub status: Status,
    pub system: Option<SystemKey>,
}

#[derive(Debug, Clone)]
pub struct EthernetSwitchPort {
    pub uri: ResourceUri,
    pub service: ServiceUri,
    pub neighbor_mac: Option<String>,
    pub status: Status,
}

macro_rules! impl_inventory_record {
    ($($record:ty),* $(,)?) => {
        $(impl InventoryRecord for $record {
            fn uri(&self) -> &ResourceUri {
                &self.uri
            }
        })*
    };
}

impl_inventory_record!(ComputerSystem, Processor, Drive, Volume, Endpoint, Zone, Fabric, StoragePool, StorageService, EthernetInterface, EthernetSwitchPort);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tpm_2_0_has_the_highest_priority() {
        let mut types = vec![TpmInterfaceType::Tcm1_0, TpmInterfaceType::Tpm2_0, TpmInterfaceType::Tpm1_2];
        types.sort_by_key(|t| t.priority());
        assert_eq!(types, vec![TpmInterfaceType::Tpm2_0, TpmInterfaceType::Tpm1_2, TpmInterfaceType::Tcm1_0]);
    }

    #[test]
    fn only_iscsi_is_network_attached_storage() {
        assert!(Protocol::Iscsi.is_network_attached_storage());
        assert!(!Protocol::NvmeOverFabrics.is_network_attached_storage());
        assert!(!Protocol::Pcie.is_network_attached_storage());
    }

    #[test]
    fn status_deserializes_from_redfish_names() {
        let status: Status = serde_json::from_str(r#"{"State":"Enabled","Health":"OK","HealthRollup":"Warning"}"#).unwrap();
        assert!(status.is_enabled_and_healthy());
        assert_eq!(status.health_rollup, Some(Health::Warning));
    }
}
