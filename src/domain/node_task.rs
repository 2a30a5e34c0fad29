use serde::Serialize;

use crate::domain::composed_node::ComposedNodeState;
use crate::domain::inventory::resources::{Protocol, ReplicaType, TpmInterfaceType};
use crate::domain::request::requested_node::RequestedVlan;
use crate::domain::utils::id::ResourceUri;

/// Endpoint taking part in a zone that may not exist until an earlier task has run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ZoneMember {
    Existing { endpoint: ResourceUri },
    /// Initiator created for the system by a preceding `CreateInitiatorEndpoint`.
    NewInitiator { system: ResourceUri },
    /// Target created for an existing volume by a preceding `CreateTargetEndpoint`.
    NewTarget { volume: ResourceUri },
    /// Target exposing the volume created by a preceding `CreateRemoteVolume`.
    NewVolumeTarget,
}

/// Source a new remote volume is replicated from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaSource {
    pub volume: ResourceUri,
    pub replica_type: ReplicaType,
}

/// Deferred configuration step for the owning hardware-management service.
///
/// Tasks are produced in execution order and are never run by the engine itself. Applying a task
/// twice has the same effect as applying it once.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum NodeTask {
    #[serde(rename_all = "camelCase")]
    DetachDriveFromZone { drive: ResourceUri, endpoint: ResourceUri, zone: ResourceUri },

    #[serde(rename_all = "camelCase")]
    AttachPcieDrive { composed_node: ResourceUri, system: ResourceUri, drive: ResourceUri },

    #[serde(rename_all = "camelCase")]
    AttachRemoteProcessor { composed_node: ResourceUri, system: ResourceUri, processor: ResourceUri, fabric: ResourceUri },

    #[serde(rename_all = "camelCase")]
    CreateVlans { ethernet_interface: ResourceUri, switch_port: ResourceUri, primary_vlan: Option<u32>, vlans: Vec<RequestedVlan> },

    #[serde(rename_all = "camelCase")]
    EnableUserMode { system: ResourceUri },

    #[serde(rename_all = "camelCase")]
    ChangeTpmState { system: ResourceUri, interface_type: TpmInterfaceType, device_enabled: bool, txt_enabled: Option<bool> },

    #[serde(rename_all = "camelCase")]
    CreateRemoteVolume {
        composed_node: ResourceUri,
        storage_pool: ResourceUri,
        storage_service: ResourceUri,
        capacity_gib: f64,
        protocol: Protocol,
        replica: Option<ReplicaSource>,
    },

    #[serde(rename_all = "camelCase")]
    CreateInitiatorEndpoint { composed_node: ResourceUri, system: ResourceUri, fabric: Option<ResourceUri>, protocol: Protocol },

    #[serde(rename_all = "camelCase")]
    CreateTargetEndpoint { composed_node: ResourceUri, volume: ResourceUri, fabric: Option<ResourceUri>, protocol: Protocol },

    #[serde(rename_all = "camelCase")]
    ConfigureIscsiBoot { system: ResourceUri, network_device_function: ResourceUri },

    #[serde(rename_all = "camelCase")]
    SetBootSourceOverride { system: ResourceUri },

    #[serde(rename_all = "camelCase")]
    CreateZone { composed_node: ResourceUri, fabric: Option<ResourceUri>, initiator: ZoneMember, target: ZoneMember },

    #[serde(rename_all = "camelCase")]
    ChangeComposedNodeState { composed_node: ResourceUri, state: ComposedNodeState },
}

impl NodeTask {
    pub fn mark_assembled(composed_node: ResourceUri) -> Self {
        NodeTask::ChangeComposedNodeState { composed_node, state: ComposedNodeState::Assembled }
    }

    pub fn is_mark_assembled(&self) -> bool {
        matches!(self, NodeTask::ChangeComposedNodeState { state: ComposedNodeState::Assembled, .. })
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeTask::DetachDriveFromZone { .. } => "DetachDriveFromZone",
            NodeTask::AttachPcieDrive { .. } => "AttachPcieDrive",
            NodeTask::AttachRemoteProcessor { .. } => "AttachRemoteProcessor",
            NodeTask::CreateVlans { .. } => "CreateVlans",
            NodeTask::EnableUserMode { .. } => "EnableUserMode",
            NodeTask::ChangeTpmState { .. } => "ChangeTpmState",
            NodeTask::CreateRemoteVolume { .. } => "CreateRemoteVolume",
            NodeTask::CreateInitiatorEndpoint { .. } => "CreateInitiatorEndpoint",
            NodeTask::CreateTargetEndpoint { .. } => "CreateTargetEndpoint",
            NodeTask::ConfigureIscsiBoot { .. } => "ConfigureIscsiBoot",
            NodeTask::SetBootSourceOverride { .. } => "SetBootSourceOverride",
            NodeTask::CreateZone { .. } => "CreateZone",
            NodeTask::ChangeComposedNodeState { .. } => "ChangeComposedNodeState",
        }
    }
}
