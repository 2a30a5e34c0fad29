pub mod composer_config_dto;
pub mod inventory_dto;
pub mod requested_node_dto;
