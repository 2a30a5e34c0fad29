pub mod allocation_service;
pub mod allocation_strategy_factory;
pub mod compute;
pub mod node_allocation_strategy;
pub mod remote_drive;
pub mod strategy_trait;
pub mod validation;
