use crate::domain::composed_node::ComposedNode;
use crate::domain::inventory::inventory::Inventory;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::node_task::NodeTask;
use crate::domain::violations::Violations;
use crate::error::AllocationError;

/// One family of resources a composed node is built from.
pub trait AllocationStrategy: std::fmt::Debug {
    /// Checks the request against the inventory without changing anything.
    fn validate(&self, inventory: &Inventory) -> Violations;

    /// Claims resources inside the transaction, attaches them to `node` and returns the tasks that
    /// finish the job on the hardware, in execution order.
    ///
    /// May still reject: a resource can turn out to be unusable only once it is being claimed.
    fn allocate(&mut self, transaction: &mut InventoryTransaction, node: &mut ComposedNode) -> Result<Vec<NodeTask>, AllocationError>;
}
