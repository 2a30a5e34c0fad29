use std::collections::BTreeSet;

use crate::domain::composed_node::{AttachedAsset, ComposedNode};
use crate::domain::inventory::inventory::{DriveKey, EndpointKey, Inventory, ProcessorKey, ResourceKey, SystemKey, VolumeKey};
use crate::domain::inventory::resources::{ComputerSystem, Drive, Endpoint, Processor, Volume};

/// Inventory resource that can be claimed by a composed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachableAsset {
    Drive(DriveKey),
    Volume(VolumeKey),
    Processor(ProcessorKey),
    Endpoint(EndpointKey),
}

/// Working copy of the inventory for one allocation.
///
/// Opened by the caller through `InventoryStore::begin` and handed to the engine, which never
/// commits it. Every mutable accessor records the touched resource so the store can verify at
/// commit time that nobody else changed it in the meantime. Dropping the transaction discards
/// all changes.
#[derive(Debug)]
pub struct InventoryTransaction {
    working: Inventory,
    touched: BTreeSet<ResourceKey>,
    persisted: Vec<ComposedNode>,
}

impl InventoryTransaction {
    pub(crate) fn new(snapshot: Inventory) -> Self {
        Self { working: snapshot, touched: BTreeSet::new(), persisted: Vec::new() }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.working
    }

    pub fn system_mut(&mut self, key: SystemKey) -> Option<&mut ComputerSystem> {
        self.touched.insert(ResourceKey::System(key));
        self.working.systems.get_mut(key)
    }

    pub fn processor_mut(&mut self, key: ProcessorKey) -> Option<&mut Processor> {
        self.touched.insert(ResourceKey::Processor(key));
        self.working.processors.get_mut(key)
    }

    pub fn drive_mut(&mut self, key: DriveKey) -> Option<&mut Drive> {
        self.touched.insert(ResourceKey::Drive(key));
        self.working.drives.get_mut(key)
    }

    pub fn volume_mut(&mut self, key: VolumeKey) -> Option<&mut Volume> {
        self.touched.insert(ResourceKey::Volume(key));
        self.working.volumes.get_mut(key)
    }

    pub fn endpoint_mut(&mut self, key: EndpointKey) -> Option<&mut Endpoint> {
        self.touched.insert(ResourceKey::Endpoint(key));
        self.working.endpoints.get_mut(key)
    }

    /// Claims the asset for the node: flips its allocation flag, records the back reference and
    /// adds it to the node's asset set.
    pub fn attach_asset(&mut self, node: &mut ComposedNode, asset: AttachableAsset) -> bool {
        let node_uri = Some(node.uri.clone());
        let attached = match asset {
            AttachableAsset::Drive(key) => self.drive_mut(key).map(|drive| {
                drive.allocated = true;
                drive.composed_node = node_uri;
                AttachedAsset::Drive(drive.uri.clone())
            }),
            AttachableAsset::Volume(key) => self.volume_mut(key).map(|volume| {
                volume.allocated = true;
                volume.composed_node = node_uri;
                AttachedAsset::Volume(volume.uri.clone())
            }),
            AttachableAsset::Processor(key) => self.processor_mut(key).map(|processor| {
                processor.allocated = true;
                processor.composed_node = node_uri;
                AttachedAsset::Processor(processor.uri.clone())
            }),
            AttachableAsset::Endpoint(key) => self.endpoint_mut(key).map(|endpoint| {
                endpoint.allocated = true;
                endpoint.composed_node = node_uri;
                AttachedAsset::Endpoint(endpoint.uri.clone())
            }),
        };

        match attached {
            Some(asset) => {
                log::debug!("Attaching {:?} to composed node {}", asset, node.uri);
                node.add_asset(asset);
                true
            }
            None => false,
        }
    }

    /// Queues the node to be stored when the transaction is committed.
    pub fn persist(&mut self, node: ComposedNode) {
        self.persisted.push(node);
    }

    pub fn persisted_nodes(&self) -> &[ComposedNode] {
        &self.persisted
    }

    pub fn touched(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.touched.iter().copied()
    }

    pub fn has_changes(&self) -> bool {
        !self.touched.is_empty() || !self.persisted.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Inventory, BTreeSet<ResourceKey>, Vec<ComposedNode>) {
        (self.working, self.touched, self.persisted)
    }
}
