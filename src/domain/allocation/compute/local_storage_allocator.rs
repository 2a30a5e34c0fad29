use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{DriveKey, Inventory, SystemKey};
use crate::domain::inventory::resources::Protocol;
use crate::domain::inventory::transaction::{AttachableAsset, InventoryTransaction};
use crate::domain::matcher::local_drive_mapper::LocalDriveMapper;
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::RequestedLocalDrive;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// Claims the local drives of the chosen system, including PCIe drives behind its switch ports.
#[derive(Debug)]
pub struct LocalStorageAllocator<'a> {
    requested: &'a [RequestedLocalDrive],
    mapper: &'a dyn LocalDriveMapper,
}

impl<'a> LocalStorageAllocator<'a> {
    pub fn new(requested: &'a [RequestedLocalDrive], mapper: &'a dyn LocalDriveMapper) -> Self {
        Self { requested, mapper }
    }

    pub fn allocate(&self, tx: &mut InventoryTransaction, node: &mut ComposedNode, system: SystemKey) -> Result<Vec<NodeTask>, AllocationError> {
        let inventory = tx.inventory();
        let available: Vec<DriveKey> =
            inventory.visible_local_drives(system).into_iter().filter(|k| inventory.drives.get(*k).is_some_and(|d| d.is_available())).collect();

        let mapping = self.mapper.map(self.requested, &available, inventory);
        if mapping.len() != self.requested.len() {
            let system_uri = inventory.systems.get(system).map(|s| s.uri.to_string()).unwrap_or_default();
            return Err(Violations::of(format!("Requested local drives cannot be mapped on computer system {}", system_uri)).into());
        }
        let selected: Vec<DriveKey> = mapping.into_iter().map(|(_, drive)| drive).collect();

        let mut tasks = Self::detach_tasks(inventory, &available, &selected);
        tasks.extend(Self::attach_tasks(inventory, node, system, &selected));

        for drive in selected {
            tx.attach_asset(node, AttachableAsset::Drive(drive));
        }

        Ok(tasks)
    }

    /// Unselected PCIe drives still zoned for someone else are released first.
    fn detach_tasks(inventory: &Inventory, available: &[DriveKey], selected: &[DriveKey]) -> Vec<NodeTask> {
        available
            .iter()
            .filter(|key| !selected.contains(key))
            .filter_map(|key| {
                let drive = inventory.drives.get(*key)?;
                if !drive.is_pcie_fabric_attached() {
                    return None;
                }
                let endpoint = inventory.endpoints.get(drive.endpoint?)?;
                if !(endpoint.protocol.is_pcie_class() || endpoint.protocol == Protocol::NvmeOverFabrics) {
                    return None;
                }
                let zone = inventory.zones.get(endpoint.zone?)?;
                log::debug!("Drive {} is zoned through {} and will be detached from {}", drive.uri, endpoint.uri, zone.uri);

                Some(NodeTask::DetachDriveFromZone { drive: drive.uri.clone(), endpoint: endpoint.uri.clone(), zone: zone.uri.clone() })
            })
            .collect()
    }

    fn attach_tasks(inventory: &Inventory, node: &ComposedNode, system: SystemKey, selected: &[DriveKey]) -> Vec<NodeTask> {
        let Some(host) = inventory.systems.get(system) else {
            return Vec::new();
        };
        selected
            .iter()
            .filter_map(|key| inventory.drives.get(*key))
            .filter(|drive| drive.is_pcie_fabric_attached())
            .map(|drive| NodeTask::AttachPcieDrive { composed_node: node.uri.clone(), system: host.uri.clone(), drive: drive.uri.clone() })
            .collect()
    }
}
