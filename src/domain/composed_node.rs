use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::domain::inventory::resources::Status;
use crate::domain::utils::id::ResourceUri;

/// Lifecycle state of a composed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComposedNodeState {
    /// Resources are being selected and claimed.
    Allocating,

    /// Resources are claimed, the generated tasks have not been executed yet.
    Allocated,

    /// The task executor is applying the generated tasks.
    Assembling,

    /// Every task was applied; the node is ready to use.
    Assembled,

    Failed,
}

/// Inventory resource that became part of a composed node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "type", content = "uri")]
pub enum AttachedAsset {
    Drive(ResourceUri),
    Volume(ResourceUri),
    Processor(ResourceUri),
    Endpoint(ResourceUri),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedNode {
    pub id: Uuid,
    pub uri: ResourceUri,
    pub name: String,
    pub description: Option<String>,
    pub state: ComposedNodeState,
    pub status: Status,
    pub computer_system: Option<ResourceUri>,
    pub associated_computer_system_uuid: Option<Uuid>,
    pub assets: BTreeSet<AttachedAsset>,
    pub storage_pools: BTreeSet<ResourceUri>,
    pub remote_drive_capacity_gib: Option<f64>,
    pub clear_tpm_on_delete: bool,
    pub clear_optane_memory_on_delete: bool,
}

impl ComposedNode {
    /// Creates the empty shell an allocation starts from.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        let id = Uuid::new_v4();
        ComposedNode {
            id,
            uri: ResourceUri::new(format!("/redfish/v1/Nodes/{}", id)),
            name: name.into(),
            description,
            state: ComposedNodeState::Allocating,
            status: Status::enabled_and_healthy(),
            computer_system: None,
            associated_computer_system_uuid: None,
            assets: BTreeSet::new(),
            storage_pools: BTreeSet::new(),
            remote_drive_capacity_gib: None,
            clear_tpm_on_delete: true,
            clear_optane_memory_on_delete: true,
        }
    }

    pub fn add_asset(&mut self, asset: AttachedAsset) {
        self.assets.insert(asset);
    }

    pub fn drives(&self) -> impl Iterator<Item = &ResourceUri> {
        self.assets.iter().filter_map(|a| match a {
            AttachedAsset::Drive(uri) => Some(uri),
            _ => None,
        })
    }

    pub fn volumes(&self) -> impl Iterator<Item = &ResourceUri> {
        self.assets.iter().filter_map(|a| match a {
            AttachedAsset::Volume(uri) => Some(uri),
            _ => None,
        })
    }

    pub fn processors(&self) -> impl Iterator<Item = &ResourceUri> {
        self.assets.iter().filter_map(|a| match a {
            AttachedAsset::Processor(uri) => Some(uri),
            _ => None,
        })
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &ResourceUri> {
        self.assets.iter().filter_map(|a| match a {
            AttachedAsset::Endpoint(uri) => Some(uri),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_node_starts_allocating_with_healthy_status() {
        let node = ComposedNode::new("node-1", None);

        assert_eq!(node.state, ComposedNodeState::Allocating);
        assert!(node.status.is_enabled_and_healthy());
        assert_eq!(node.uri.as_str(), format!("/redfish/v1/Nodes/{}", node.id));
        assert!(node.clear_tpm_on_delete);
        assert!(node.clear_optane_memory_on_delete);
    }

    #[test]
    fn assets_are_grouped_by_kind() {
        let mut node = ComposedNode::new("node-1", Some("test".to_string()));
        node.add_asset(AttachedAsset::Volume(ResourceUri::new("/v/1")));
        node.add_asset(AttachedAsset::Endpoint(ResourceUri::new("/e/1")));
        node.add_asset(AttachedAsset::Volume(ResourceUri::new("/v/1")));

        assert_eq!(node.assets.len(), 2);
        assert_eq!(node.volumes().count(), 1);
        assert_eq!(node.endpoints().count(), 1);
        assert_eq!(node.drives().count(), 0);
    }
}
