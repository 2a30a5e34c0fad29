use crate::domain::inventory::inventory::{Inventory, SystemKey};
use crate::domain::inventory::resources::TrustedModule;
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::RequestedSecurity;
use crate::error::AllocationError;

/// Emits the user-mode and TPM tasks for the chosen system.
#[derive(Debug)]
pub struct SecurityAllocator<'a> {
    requested: Option<&'a RequestedSecurity>,
}

impl<'a> SecurityAllocator<'a> {
    pub fn new(requested: Option<&'a RequestedSecurity>) -> Self {
        Self { requested }
    }

    pub fn allocate(&self, inventory: &Inventory, system: SystemKey) -> Result<Vec<NodeTask>, AllocationError> {
        let Some(host) = inventory.systems.get(system) else {
            return Ok(Vec::new());
        };
        let mut tasks = Vec::new();

        if host.user_mode_enabled.is_some() {
            tasks.push(NodeTask::EnableUserMode { system: host.uri.clone() });
        }

        let Some(security) = self.requested.filter(|s| s.requests_tpm()) else {
            return Ok(tasks);
        };

        let module = Self::select_trusted_module(security, &host.trusted_modules).ok_or_else(|| {
            let wanted = security.tpm_interface_type.map(|t| format!("{:?}", t)).unwrap_or_else(|| "any".to_string());
            AllocationError::Internal(format!("Computer system {} has no trusted module of type {}", host.uri, wanted))
        })?;

        tasks.push(NodeTask::ChangeTpmState {
            system: host.uri.clone(),
            interface_type: module.interface_type,
            device_enabled: true,
            txt_enabled: security.txt_enabled,
        });
        Ok(tasks)
    }

    fn select_trusted_module<'m>(security: &RequestedSecurity, modules: &'m [TrustedModule]) -> Option<&'m TrustedModule> {
        match security.tpm_interface_type {
            Some(interface_type) => modules.iter().find(|m| m.interface_type == interface_type),
            None => modules.iter().min_by_key(|m| m.interface_type.priority()),
        }
    }
}
