// Infrastructure layer
pub mod dev_server;
pub mod import_rewriter;
pub mod module_cache;
pub mod module_resolver;
pub mod processors;
pub mod proxy;

pub use dev_server::*;
pub use import_rewriter::*;
pub use module_cache::*;
pub use module_resolver::*;
pub use proxy::*;
