use crate::domain::allocation::allocation_strategy_factory::AllocationStrategyFactory;
use crate::domain::allocation::node_allocation_strategy::AllocationContext;
use crate::domain::composer_config::ComposerConfig;
use crate::domain::inventory::transaction::InventoryTransaction;
use crate::domain::matcher::Matchers;
use crate::domain::request::requested_node::RequestedNode;
use crate::domain::utils::statistics::ANALYTICS_TARGET;
use crate::error::AllocationError;

/// Entry point turning a requested node into a composed node and its task list.
///
/// Works inside the caller's transaction and never commits it. On error the caller drops the
/// transaction, which leaves the inventory untouched.
#[derive(Debug, Clone, Default)]
pub struct AllocationService {
    factory: AllocationStrategyFactory,
}

impl AllocationService {
    pub fn new(matchers: Matchers, config: ComposerConfig) -> Self {
        Self { factory: AllocationStrategyFactory::new(matchers, config) }
    }

    pub fn create(&self, tx: &mut InventoryTransaction, request: &RequestedNode) -> Result<AllocationContext, AllocationError> {
        let strategy = match self.factory.create(request, tx.inventory()) {
            Ok(strategy) => strategy,
            Err(error) => {
                Self::log_rejection(request, &error);
                return Err(error);
            }
        };

        match strategy.allocate(tx) {
            Ok(context) => {
                log::info!("Composed node {} allocated with {} tasks", context.composed_node_uri, context.tasks.len());
                Ok(context)
            }
            Err(error) => {
                Self::log_rejection(request, &error);
                Err(error)
            }
        }
    }

    fn log_rejection(request: &RequestedNode, error: &AllocationError) {
        match error {
            AllocationError::Rejected(violations) => {
                log::info!("Allocation of node '{}' rejected: {}", request.name, violations);
                tracing::info!(target: ANALYTICS_TARGET, event = "AllocationRejected", node = %request.name, violations = violations.len());
            }
            other => log::error!("Allocation of node '{}' failed: {}", request.name, other),
        }
    }
}
