pub mod computer_system_collector;
pub mod protocol_validator;
pub mod requested_node_validator;
