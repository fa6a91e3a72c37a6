// Application bootstrap: create, register plugins, mount
pub mod application;
pub mod bootstrap;
pub mod component;
pub mod document;
pub mod plugins;

pub use application::*;
pub use bootstrap::*;
pub use component::*;
pub use document::*;
pub use plugins::*;
