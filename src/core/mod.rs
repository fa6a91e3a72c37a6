// Core domain layer
pub mod models;
pub mod plugin;

pub use models::*;
pub use plugin::*;
