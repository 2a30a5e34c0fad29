pub mod arena;
pub mod inventory;
pub mod inventory_store;
pub mod resources;
pub mod transaction;
