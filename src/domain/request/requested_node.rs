use serde::Serialize;

use crate::domain::inventory::inventory::{Inventory, ResourceKey};
use crate::domain::inventory::resources::{MediaType, ProcessorType, Protocol, ReplicaType, TpmInterfaceType};
use crate::domain::utils::id::ResourceUri;

/// Abstract description of the node a client wants composed.
///
/// The request is read-only for the whole allocation; strategies keep their own copy of the part
/// they work on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedNode {
    pub name: String,
    pub description: Option<String>,
    pub processors: Vec<RequestedProcessor>,
    pub memory: Vec<RequestedMemory>,
    pub local_drives: Vec<RequestedLocalDrive>,
    pub remote_drives: Vec<RequestedRemoteDrive>,
    pub ethernet_interfaces: Vec<RequestedEthernetInterface>,
    pub security: Option<RequestedSecurity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorConnectivity {
    Local,
    Ethernet,
    RemotePcie,
}

impl ProcessorConnectivity {
    pub fn is_remote(&self) -> bool {
        !matches!(self, ProcessorConnectivity::Local)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedProcessor {
    pub processor_type: Option<ProcessorType>,
    pub total_cores: Option<u32>,
    /// Empty when the request does not care how the processor is reached.
    pub connectivity: Vec<ProcessorConnectivity>,
    pub resource: Option<ResourceUri>,
}

impl RequestedProcessor {
    /// Whether the request asks for an FPGA, either by type or by pointing at one.
    pub fn is_fpga(&self, inventory: &Inventory) -> bool {
        if let Some(uri) = &self.resource {
            if let Some(ResourceKey::Processor(key)) = inventory.resource_kind(uri) {
                return inventory.processors.get(key).is_some_and(|p| p.is_fpga());
            }
        }
        self.processor_type == Some(ProcessorType::Fpga)
    }

    pub fn has_connectivity(&self) -> bool {
        !self.connectivity.is_empty()
    }

    /// No connectivity requirement, or at least one remote one.
    pub fn accepts_remote_attachment(&self) -> bool {
        self.connectivity.is_empty() || self.connectivity.iter().any(|c| c.is_remote())
    }

    pub fn allows(&self, connectivity: ProcessorConnectivity) -> bool {
        self.connectivity.is_empty() || self.connectivity.contains(&connectivity)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedMemory {
    pub capacity_mib: Option<u64>,
    pub resource: Option<ResourceUri>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedLocalDrive {
    pub capacity_gib: Option<f64>,
    pub protocol: Option<Protocol>,
    pub media_type: Option<MediaType>,
    pub resource: Option<ResourceUri>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestedMasterDrive {
    pub replica_type: ReplicaType,
    pub resource: ResourceUri,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedRemoteDrive {
    pub capacity_gib: Option<f64>,
    pub protocol: Option<Protocol>,
    pub master: Option<RequestedMasterDrive>,
    /// Existing volume or endpoint to attach instead of creating a new volume.
    pub resource: Option<ResourceUri>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedVlan {
    pub vlan_id: u32,
    pub tagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedEthernetInterface {
    pub speed_mbps: Option<u32>,
    pub primary_vlan: Option<u32>,
    pub vlans: Vec<RequestedVlan>,
    pub resource: Option<ResourceUri>,
}

impl RequestedEthernetInterface {
    pub fn requests_vlans(&self) -> bool {
        !self.vlans.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedSecurity {
    pub tpm_present: Option<bool>,
    pub tpm_interface_type: Option<TpmInterfaceType>,
    pub txt_enabled: Option<bool>,
    pub clear_tpm_on_delete: Option<bool>,
    pub clear_optane_memory_on_delete: Option<bool>,
}

impl RequestedSecurity {
    pub fn requests_tpm(&self) -> bool {
        self.tpm_present == Some(true) || self.tpm_interface_type.is_some()
    }
}

impl RequestedNode {
    /// FPGA tie-break condition: every requested processor is an FPGA and none names a connectivity.
    pub fn requests_only_fpgas_without_connectivity(&self, inventory: &Inventory) -> bool {
        !self.processors.is_empty() && self.processors.iter().all(|p| p.is_fpga(inventory) && !p.has_connectivity())
    }

    /// Every resource URI the request points at explicitly, outside of remote drives.
    pub fn referenced_resources(&self) -> Vec<&ResourceUri> {
        let processors = self.processors.iter().filter_map(|p| p.resource.as_ref());
        let memory = self.memory.iter().filter_map(|m| m.resource.as_ref());
        let drives = self.local_drives.iter().filter_map(|d| d.resource.as_ref());
        let interfaces = self.ethernet_interfaces.iter().filter_map(|e| e.resource.as_ref());

        processors.chain(memory).chain(drives).chain(interfaces).collect()
    }

    pub fn clear_tpm_on_delete(&self) -> bool {
        self.security.as_ref().and_then(|s| s.clear_tpm_on_delete).unwrap_or(true)
    }

    pub fn clear_optane_memory_on_delete(&self) -> bool {
        self.security.as_ref().and_then(|s| s.clear_optane_memory_on_delete).unwrap_or(true)
    }
}
