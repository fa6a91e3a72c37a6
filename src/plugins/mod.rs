// Built-in source plugins of the dev server

pub mod define_plugin;
pub mod vue_plugin;

pub use define_plugin::DefinePlugin;
pub use vue_plugin::{SfcBlock, SfcDescriptor, VuePlugin};
