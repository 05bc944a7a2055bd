//! Extension Discovery
//!
//! Locates manifest-described extensions across prioritized search roots,
//! classifies them by declared type and resolves name collisions by origin
//! precedence.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod output;

pub use discovery::{
    DirectoryScanner, ExtensionDescriptor, ExtensionDiscovery, ExtensionRegistry, SearchRoot,
};
pub use error::{Error, Result};
