pub mod app;
pub mod cli;
pub mod core;
pub mod daemon;
pub mod infrastructure;
pub mod plugins;
pub mod utils;
