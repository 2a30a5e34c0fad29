pub mod computer_system_allocation_strategy;
pub mod ethernet_allocator;
pub mod local_storage_allocator;
pub mod processor_allocator;
pub mod security_allocator;
