use crate::domain::allocation::remote_drive::RemoteDriveAllocationStrategy;
use crate::domain::allocation::remote_drive::endpoint_strategy::EndpointStrategy;
use crate::domain::allocation::remote_drive::existing_remote_drive_strategy::{ExistingRemoteDriveAllocationStrategy, ExistingResourceStrategy};
use crate::domain::allocation::remote_drive::new_remote_drive_strategy::NewRemoteDriveAllocationStrategy;
use crate::domain::allocation::remote_drive::remote_drive_describer::RemoteDriveDescriber;
use crate::domain::allocation::remote_drive::volume_strategy::VolumeStrategy;
use crate::domain::composer_config::ComposerConfig;
use crate::domain::inventory::inventory::{Inventory, ResourceKey};
use crate::domain::request::requested_node::RequestedNode;
use crate::domain::violations::Violations;

pub const MULTIPLE_REMOTE_DRIVES_VIOLATION: &str = "Allocation of more than one remote drive is not supported";

/// Chooses the remote-drive strategy for a request.
#[derive(Debug, Clone, Default)]
pub struct RemoteDriveStrategyFactory {
    config: ComposerConfig,
}

impl RemoteDriveStrategyFactory {
    pub fn new(config: ComposerConfig) -> Self {
        Self { config }
    }

    /// # Returns
    /// The strategy to validate and run. Only a request for more than one remote drive is refused
    /// here; an unusable resource reference is reported by the strategy's own validation.
    pub fn create(&self, request: &RequestedNode, inventory: &Inventory) -> Result<RemoteDriveAllocationStrategy, Violations> {
        let requested = match request.remote_drives.as_slice() {
            [] => return Ok(RemoteDriveAllocationStrategy::None),
            [requested] => requested.clone(),
            _ => return Err(Violations::of(MULTIPLE_REMOTE_DRIVES_VIOLATION)),
        };

        if let Some(uri) = &requested.resource {
            let resource = match inventory.resource_kind(uri) {
                Some(ResourceKey::Volume(_)) => ExistingResourceStrategy::Volume(VolumeStrategy::new(uri.clone())),
                Some(ResourceKey::Endpoint(_)) => ExistingResourceStrategy::Endpoint(EndpointStrategy::new(uri.clone())),
                Some(_) => ExistingResourceStrategy::Unresolved { violation: format!("Specified resource ({}) is not a volume or an endpoint.", uri) },
                None => ExistingResourceStrategy::Unresolved { violation: format!("Specified resource ({}) does not exist.", uri) },
            };
            return Ok(RemoteDriveAllocationStrategy::Existing(ExistingRemoteDriveAllocationStrategy::new(requested, resource)));
        }

        let describer = match &requested.master {
            Some(master) => RemoteDriveDescriber::MasterClone(master.clone()),
            None => RemoteDriveDescriber::FromScratch { default_protocol: self.config.default_remote_drive_protocol },
        };
        Ok(RemoteDriveAllocationStrategy::New(NewRemoteDriveAllocationStrategy::new(requested, describer)))
    }
}
