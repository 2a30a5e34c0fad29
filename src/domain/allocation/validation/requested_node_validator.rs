use std::collections::HashSet;

use crate::domain::allocation::validation::computer_system_collector::ComputerSystemCollector;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::request::requested_node::{RequestedEthernetInterface, RequestedNode};
use crate::domain::violations::Violations;

const MIN_VLAN_ID: u32 = 1;
const MAX_VLAN_ID: u32 = 4094;

/// Shape checks on a request that need no allocation decision.
#[derive(Debug, Clone, Default)]
pub struct RequestedNodeValidator;

impl RequestedNodeValidator {
    pub fn validate(request: &RequestedNode, inventory: &Inventory) -> Violations {
        let mut violations = Violations::new();

        if let Err(collector_violations) = ComputerSystemCollector::collect_common_systems(request, inventory) {
            violations.add_all(collector_violations);
        }

        for interface in &request.ethernet_interfaces {
            violations.add_all(Self::validate_vlans(interface));
        }

        for drive in &request.local_drives {
            if drive.capacity_gib.is_some_and(|c| c <= 0.0) {
                violations.add_violation("Requested local drive capacity must be greater than zero");
            }
        }

        for drive in &request.remote_drives {
            if drive.capacity_gib.is_some_and(|c| c <= 0.0) {
                violations.add_violation("Requested remote drive capacity must be greater than zero");
            }
        }

        if let Some(security) = &request.security {
            if security.tpm_present == Some(false) && security.tpm_interface_type.is_some() {
                violations.add_violation("TPM interface type cannot be requested together with TPM presence disabled");
            }
        }

        violations
    }

    fn validate_vlans(interface: &RequestedEthernetInterface) -> Violations {
        let mut violations = Violations::new();
        let mut seen = HashSet::new();

        for vlan in &interface.vlans {
            if !(MIN_VLAN_ID..=MAX_VLAN_ID).contains(&vlan.vlan_id) {
                violations.add_violation(format!("VLAN id {} is outside of the allowed range {}-{}", vlan.vlan_id, MIN_VLAN_ID, MAX_VLAN_ID));
            }
            if !seen.insert(vlan.vlan_id) {
                violations.add_violation(format!("VLAN id {} is requested more than once on the same interface", vlan.vlan_id));
            }
        }

        if let Some(primary) = interface.primary_vlan {
            if !interface.vlans.iter().any(|v| v.vlan_id == primary) {
                violations.add_violation(format!("Primary VLAN {} is not among the requested VLANs", primary));
            }
        }

        violations
    }
}
