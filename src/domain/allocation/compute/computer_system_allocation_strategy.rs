use crate::domain::allocation::compute::ethernet_allocator::EthernetAllocator;
use crate::domain::allocation::compute::local_storage_allocator::LocalStorageAllocator;
use crate::domain::allocation::compute::processor_allocator::ProcessorAllocator;
use crate::domain::allocation::compute::security_allocator::SecurityAllocator;
use crate::domain::allocation::strategy_trait::AllocationStrategy;
use crate::domain::allocation::validation::computer_system_collector::ComputerSystemCollector;
use crate::domain::allocation::validation::requested_node_validator::RequestedNodeValidator;
use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::{Inventory, SystemKey};
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::matcher::Matchers;
use crate::domain::node_task::NodeTask;
use crate::domain::request::requested_node::RequestedNode;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

pub const NO_SYSTEM_AVAILABLE_VIOLATION: &str = "There are no computer systems available for this allocation request.";

/// Picks the computer system of a new node and claims everything hosted by it.
///
/// Sub-allocators run in a fixed order: local storage, processors, ethernet, security. Their tasks
/// are returned in the same order.
#[derive(Debug)]
pub struct ComputerSystemAllocationStrategy {
    request: RequestedNode,
    matchers: Matchers,
}

impl ComputerSystemAllocationStrategy {
    pub fn new(request: RequestedNode, matchers: Matchers) -> Self {
        Self { request, matchers }
    }

    fn matching_systems(&self, inventory: &Inventory) -> Result<Vec<SystemKey>, Violations> {
        let candidates = ComputerSystemCollector::collect_candidates(&self.request, inventory)?;
        Ok(self.matchers.computer_system.matches(&self.request, candidates, inventory))
    }

    /// First matching system, or the first one that carries an FPGA of its own when the request
    /// asks for nothing but FPGAs and leaves their connectivity open.
    fn select_system(&self, inventory: &Inventory) -> Result<SystemKey, AllocationError> {
        let systems = self.matching_systems(inventory)?;

        let preferred = if self.request.requests_only_fpgas_without_connectivity(inventory) {
            systems.iter().copied().find(|key| inventory.system_has_fpga(*key))
        } else {
            None
        };

        preferred.or_else(|| systems.first().copied()).ok_or_else(|| Violations::of(NO_SYSTEM_AVAILABLE_VIOLATION).into())
    }

    fn claim_system(tx: &mut InventoryTransaction, node: &mut ComposedNode, key: SystemKey) -> Result<(), AllocationError> {
        let system = tx.system_mut(key).ok_or_else(|| AllocationError::Internal("Selected computer system vanished from the inventory".to_string()))?;
        system.allocated = true;
        system.composed_node = Some(node.uri.clone());

        node.computer_system = Some(system.uri.clone());
        node.associated_computer_system_uuid = Some(system.uuid);
        log::debug!("Computer system {} selected for composed node {}", system.uri, node.uri);
        Ok(())
    }
}

impl AllocationStrategy for ComputerSystemAllocationStrategy {
    fn validate(&self, inventory: &Inventory) -> Violations {
        let mut violations = RequestedNodeValidator::validate(&self.request, inventory);
        if violations.has_violations() {
            return violations;
        }

        match self.matching_systems(inventory) {
            Ok(systems) if systems.is_empty() => violations.add_violation(NO_SYSTEM_AVAILABLE_VIOLATION),
            Ok(_) => {}
            Err(collector_violations) => violations.add_all(collector_violations),
        }
        violations
    }

    fn allocate(&mut self, tx: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<Vec<NodeTask>, AllocationError> {
        let system = self.select_system(tx.inventory())?;
        Self::claim_system(tx, node, system)?;

        let mut tasks = LocalStorageAllocator::new(&self.request.local_drives, self.matchers.local_drives.as_ref()).allocate(tx, node, system)?;
        tasks.extend(ProcessorAllocator::new(&self.request.processors).allocate(tx, node, system)?);
        tasks.extend(EthernetAllocator::new(&self.request.ethernet_interfaces, self.matchers.ethernet_interfaces.as_ref()).allocate(tx.inventory(), system)?);
        tasks.extend(SecurityAllocator::new(self.request.security.as_ref()).allocate(tx.inventory(), system)?);

        node.clear_tpm_on_delete = self.request.clear_tpm_on_delete();
        node.clear_optane_memory_on_delete = self.request.clear_optane_memory_on_delete();

        Ok(tasks)
    }
}
