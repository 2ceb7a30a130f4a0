pub mod action_link;
pub mod errors;
pub mod order;
pub mod ports;
pub mod pricing;
