pub mod requested_node;
