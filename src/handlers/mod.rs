pub mod action_links;
pub mod events;
pub mod orders;
