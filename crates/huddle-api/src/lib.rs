pub mod events;
pub mod types;
pub mod validation;
