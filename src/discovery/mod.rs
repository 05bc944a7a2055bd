//! Extension discovery: directory scanning, manifest type detection and
//! cross-root precedence resolution.

pub mod cache;
pub mod descriptor;
pub mod detector;
pub mod filter;
pub mod orchestrator;
pub mod scanner;
pub mod utils;

pub use cache::{DescriptorCache, MemoryDescriptorCache, ScanCache};
pub use descriptor::{ExtensionDescriptor, ExtensionRegistry, ScanResult, MANIFEST_SUFFIX};
pub use detector::{ManifestTypeDetector, TypeLineDetector};
pub use filter::{ExtensionDirFilter, TraversalFilter};
pub use orchestrator::{
    ExclusionHook, ExtensionDiscovery, SearchRoot, DEFAULT_ORIGIN_WEIGHT, DEFAULT_SEARCH_DIR,
};
pub use scanner::DirectoryScanner;
