use serde::{Deserialize, Serialize};

use crate::domain::inventory::resources::{MediaType, ProcessorType, Protocol, ReplicaType, TpmInterfaceType};
use crate::domain::request::requested_node::{
    ProcessorConnectivity, RequestedEthernetInterface, RequestedLocalDrive, RequestedMasterDrive, RequestedMemory, RequestedNode, RequestedProcessor,
    RequestedRemoteDrive, RequestedSecurity, RequestedVlan,
};
use crate::domain::utils::id::ResourceUri;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedNodeDto {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub processors: Vec<RequestedProcessorDto>,
    #[serde(default)]
    pub memory: Vec<RequestedMemoryDto>,
    #[serde(default)]
    pub local_drives: Vec<RequestedLocalDriveDto>,
    #[serde(default)]
    pub remote_drives: Vec<RequestedRemoteDriveDto>,
    #[serde(default)]
    pub ethernet_interfaces: Vec<RequestedEthernetInterfaceDto>,
    pub security: Option<RequestedSecurityDto>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub enum ConnectivityDto {
    Local,
    Ethernet,
    #[serde(rename = "RemotePCIe")]
    RemotePcie,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedProcessorDto {
    pub processor_type: Option<ProcessorType>,
    pub total_cores: Option<u32>,
    #[serde(default)]
    pub connectivity: Vec<ConnectivityDto>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedMemoryDto {
    pub capacity_mib: Option<u64>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedLocalDriveDto {
    pub capacity_gib: Option<f64>,
    pub protocol: Option<Protocol>,
    pub media_type: Option<MediaType>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedMasterDriveDto {
    #[serde(rename = "type")]
    pub replica_type: ReplicaType,
    pub resource: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedRemoteDriveDto {
    pub capacity_gib: Option<f64>,
    pub protocol: Option<Protocol>,
    pub master: Option<RequestedMasterDriveDto>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedVlanDto {
    pub vlan_id: u32,
    #[serde(default)]
    pub tagged: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedEthernetInterfaceDto {
    pub speed_mbps: Option<u32>,
    pub primary_vlan: Option<u32>,
    #[serde(default)]
    pub vlans: Vec<RequestedVlanDto>,
    pub resource: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedSecurityDto {
    pub tpm_present: Option<bool>,
    pub tpm_interface_type: Option<TpmInterfaceType>,
    pub txt_enabled: Option<bool>,
    pub clear_tpm_on_delete: Option<bool>,
    pub clear_optane_memory_on_delete: Option<bool>,
}

impl From<ConnectivityDto> for ProcessorConnectivity {
    fn from(dto: ConnectivityDto) -> Self {
        match dto {
            ConnectivityDto::Local => ProcessorConnectivity::Local,
            ConnectivityDto::Ethernet => ProcessorConnectivity::Ethernet,
            ConnectivityDto::RemotePcie => ProcessorConnectivity::RemotePcie,
        }
    }
}

impl From<RequestedNodeDto> for RequestedNode {
    fn from(dto: RequestedNodeDto) -> Self {
        RequestedNode {
            name: dto.name,
            description: dto.description,
            processors: dto
                .processors
                .into_iter()
                .map(|p| RequestedProcessor {
                    processor_type: p.processor_type,
                    total_cores: p.total_cores,
                    connectivity: p.connectivity.into_iter().map(ProcessorConnectivity::from).collect(),
                    resource: p.resource.map(ResourceUri::new),
                })
                .collect(),
            memory: dto.memory.into_iter().map(|m| RequestedMemory { capacity_mib: m.capacity_mib, resource: m.resource.map(ResourceUri::new) }).collect(),
            local_drives: dto
                .local_drives
                .into_iter()
                .map(|d| RequestedLocalDrive {
                    capacity_gib: d.capacity_gib,
                    protocol: d.protocol,
                    media_type: d.media_type,
                    resource: d.resource.map(ResourceUri::new),
                })
                .collect(),
            remote_drives: dto
                .remote_drives
                .into_iter()
                .map(|d| RequestedRemoteDrive {
                    capacity_gib: d.capacity_gib,
                    protocol: d.protocol,
                    master: d.master.map(|m| RequestedMasterDrive { replica_type: m.replica_type, resource: ResourceUri::new(m.resource) }),
                    resource: d.resource.map(ResourceUri::new),
                })
                .collect(),
            ethernet_interfaces: dto
                .ethernet_interfaces
                .into_iter()
                .map(|e| RequestedEthernetInterface {
                    speed_mbps: e.speed_mbps,
                    primary_vlan: e.primary_vlan,
                    vlans: e.vlans.into_iter().map(|v| RequestedVlan { vlan_id: v.vlan_id, tagged: v.tagged }).collect(),
                    resource: e.resource.map(ResourceUri::new),
                })
                .collect(),
            security: dto.security.map(|s| RequestedSecurity {
                tpm_present: s.tpm_present,
                tpm_interface_type: s.tpm_interface_type,
                txt_enabled: s.txt_enabled,
                clear_tpm_on_delete: s.clear_tpm_on_delete,
                clear_optane_memory_on_delete: s.clear_optane_memory_on_delete,
            }),
        }
    }
}
