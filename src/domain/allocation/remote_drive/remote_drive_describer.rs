use crate::domain::inventory::inventory::{Inventory, ResourceKey, StoragePoolKey, StorageServiceKey, VolumeKey};
use crate::domain::inventory::resources::{Protocol, ReplicaType};
use crate::domain::request::requested_node::{RequestedMasterDrive, RequestedRemoteDrive};
use crate::domain::utils::statistics::{bytes_to_gib, gib_to_bytes};
use crate::domain::violations::Violations;

pub const NO_POOL_WITH_SPACE_VIOLATION: &str = "There is no storage pool with sufficient space available";

/// Everything needed to create a new remote volume.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDriveDescriptor {
    pub capacity_gib: f64,
    pub protocol: Protocol,
    pub storage_pool: StoragePoolKey,
    pub storage_service: StorageServiceKey,
    pub replica: Option<(VolumeKey, ReplicaType)>,
    pub bootable: bool,
}

/// How the shape of a new remote volume is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteDriveDescriber {
    /// Empty volume carved from the first pool with enough room.
    FromScratch { default_protocol: Option<Protocol> },

    /// Replica of an existing master volume, created in the master's pool.
    MasterClone(RequestedMasterDrive),
}

impl RemoteDriveDescriber {
    pub fn describe(&self, requested: &RequestedRemoteDrive, inventory: &Inventory) -> Result<RemoteDriveDescriptor, Violations> {
        match self {
            RemoteDriveDescriber::FromScratch { default_protocol } => Self::describe_from_scratch(requested, *default_protocol, inventory),
            RemoteDriveDescriber::MasterClone(master) => Self::describe_master_clone(requested, master, inventory),
        }
    }

    fn describe_from_scratch(
        requested: &RequestedRemoteDrive,
        default_protocol: Option<Protocol>,
        inventory: &Inventory,
    ) -> Result<RemoteDriveDescriptor, Violations> {
        let Some(capacity_gib) = requested.capacity_gib else {
            return Err(Violations::of("Capacity of a new remote drive has to be specified"));
        };
        let protocol = requested.protocol.or(default_protocol);
        let required_bytes = gib_to_bytes(capacity_gib);

        let found = inventory.storage_pools.iter().find_map(|(pool_key, pool)| {
            if pool.remaining_capacity_bytes < required_bytes {
                return None;
            }
            let service = inventory.storage_services.get(pool.storage_service)?;
            if !service.status.is_enabled_and_healthy() {
                return None;
            }
            let service_protocol = inventory.storage_service_protocol(pool.storage_service)?;
            if protocol.is_some_and(|p| p != service_protocol) {
                return None;
            }
            Some((pool_key, pool.storage_service, service_protocol))
        });

        let Some((storage_pool, storage_service, protocol)) = found else {
            return Err(Violations::of(NO_POOL_WITH_SPACE_VIOLATION));
        };
        log::debug!("New remote drive of {} GiB will be created in pool {:?}", capacity_gib, inventory.storage_pools.get(storage_pool).map(|p| &p.uri));

        Ok(RemoteDriveDescriptor { capacity_gib, protocol, storage_pool, storage_service, replica: None, bootable: false })
    }

    fn describe_master_clone(
        requested: &RequestedRemoteDrive,
        master: &RequestedMasterDrive,
        inventory: &Inventory,
    ) -> Result<RemoteDriveDescriptor, Violations> {
        let Some(ResourceKey::Volume(master_key)) = inventory.resource_kind(&master.resource) else {
            return Err(Violations::of(format!("Master drive ({}) does not exist.", master.resource)));
        };
        let Some(volume) = inventory.volumes.get(master_key) else {
            return Err(Violations::of(format!("Master drive ({}) does not exist.", master.resource)));
        };

        let Some(pool) = volume.storage_pool.and_then(|key| inventory.storage_pools.get(key).map(|pool| (key, pool))) else {
            return Err(Violations::of(format!("There is no storage pool found for master drive ({})", master.resource)));
        };
        let (pool_key, pool) = pool;
        if pool.remaining_capacity_bytes < volume.capacity_bytes {
            return Err(Violations::of(format!("There is no storage pool with sufficient space available for master drive ({})", master.resource)));
        }

        let storage_service = volume.storage_service.unwrap_or(pool.storage_service);
        let Some(protocol) = inventory.storage_service_protocol(storage_service).or(requested.protocol) else {
            return Err(Violations::of(format!("Protocol of master drive ({}) cannot be determined", master.resource)));
        };

        Ok(RemoteDriveDescriptor {
            capacity_gib: requested.capacity_gib.unwrap_or_else(|| bytes_to_gib(volume.capacity_bytes)),
            protocol,
            storage_pool: pool_key,
            storage_service,
            replica: Some((master_key, master.replica_type)),
            bootable: volume.bootable,
        })
    }
}
