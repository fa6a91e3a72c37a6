// Installer daemon: stores titles and pushes them to FBI
pub mod error;
pub mod files;
pub mod forms;
pub mod routes;
pub mod sender;

pub use routes::{create_router, run_daemon, DaemonState};
