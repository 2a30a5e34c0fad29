pub mod allocation;
pub mod composed_node;
pub mod composer_config;
pub mod inventory;
pub mod matcher;
pub mod node_task;
pub mod request;
pub mod utils;
pub mod violations;
