use std::fmt::Debug;

use crate::domain::inventory::inventory::{DriveKey, Inventory};
use crate::domain::inventory::resources::Drive;
use crate::domain::request::requested_node::RequestedLocalDrive;

/// Maps requested local drives onto the drives a system can see.
pub trait LocalDriveMapper: Debug + Send + Sync {
    /// # Returns
    /// Pairs of (index into `requested`, chosen drive). Requests that cannot be satisfied are
    /// left out; no drive is used twice.
    fn map(&self, requested: &[RequestedLocalDrive], available: &[DriveKey], inventory: &Inventory) -> Vec<(usize, DriveKey)>;
}

/// First-fit mapping: explicit references first, then the first unused drive that is large enough
/// and matches the requested protocol and media type.
#[derive(Debug, Clone, Default)]
pub struct DefaultLocalDriveMapper;

impl DefaultLocalDriveMapper {
    fn satisfies(requested: &RequestedLocalDrive, drive: &Drive) -> bool {
        requested.capacity_gib.is_none_or(|capacity| drive.capacity_gib >= capacity)
            && requested.protocol.is_none_or(|protocol| drive.protocol == protocol)
            && requested.media_type.is_none_or(|media| drive.media_type == Some(media))
    }
}

impl LocalDriveMapper for DefaultLocalDriveMapper {
    fn map(&self, requested: &[RequestedLocalDrive], available: &[DriveKey], inventory: &Inventory) -> Vec<(usize, DriveKey)> {
        let mut used: Vec<DriveKey> = Vec::new();
        let mut mapping = Vec::new();

        // References are resolved before free-form requests so they cannot be taken by them.
        let by_reference = requested.iter().enumerate().filter(|(_, r)| r.resource.is_some());
        for (index, request) in by_reference {
            let found = available.iter().copied().find(|key| {
                !used.contains(key) && inventory.drives.get(*key).is_some_and(|d| Some(&d.uri) == request.resource.as_ref())
            });
            if let Some(key) = found {
                used.push(key);
                mapping.push((index, key));
            }
        }

        let free_form = requested.iter().enumerate().filter(|(_, r)| r.resource.is_none());
        for (index, request) in free_form {
            let found = available
                .iter()
                .copied()
                .find(|key| !used.contains(key) && inventory.drives.get(*key).is_some_and(|d| Self::satisfies(request, d)));
            if let Some(key) = found {
                used.push(key);
                mapping.push((index, key));
            }
        }

        mapping.sort_by_key(|(index, _)| *index);
        mapping
    }
}
