//! Configuration model for kiln.
//!
//! Entry points and their validated shapes, the plugin configuration root,
//! typed bundler configurations, the deep-merge rules and the resolution of
//! user-supplied config sources.

pub mod bundler;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod merge;
pub mod plugin_config;
pub mod source;

// Re-export main types
pub use bundler::*;
pub use entry::*;
pub use error::*;
pub use merge::{merge_configs, merge_values};
pub use plugin_config::*;
pub use source::*;

pub use discovery::{load_value_from, ConfigDiscovery};
