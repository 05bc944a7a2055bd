use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::descriptor::{ExtensionDescriptor, ScanResult};

/// Externally owned cache of descriptors keyed by absolute manifest path.
///
/// A hit is trusted as-is and the manifest is not read again. Invalidation is
/// the owner's job; the scanner only ever adds entries.
pub trait DescriptorCache: Send + Sync {
    fn lookup(&self, path: &Path) -> Option<ExtensionDescriptor>;

    fn store(&self, path: PathBuf, descriptor: ExtensionDescriptor);
}

#[derive(Debug, Default)]
pub struct MemoryDescriptorCache {
    entries: RwLock<HashMap<PathBuf, ExtensionDescriptor>>,
}

impl MemoryDescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

impl DescriptorCache for MemoryDescriptorCache {
    fn lookup(&self, path: &Path) -> Option<ExtensionDescriptor> {
        self.entries.read().ok()?.get(path).cloned()
    }

    fn store(&self, path: PathBuf, descriptor: ExtensionDescriptor) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(path, descriptor);
        }
    }
}

/// Memoized scanner output for one discovery session.
#[derive(Debug, Default)]
pub struct ScanCache {
    entries: HashMap<(String, bool), ScanResult>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, base_dir: &str, include_tests: bool) -> Option<&ScanResult> {
        self.entries.get(&(base_dir.to_string(), include_tests))
    }

    pub fn contains(&self, base_dir: &str, include_tests: bool) -> bool {
        self.get(base_dir, include_tests).is_some()
    }

    pub fn insert(&mut self, base_dir: &str, include_tests: bool, result: ScanResult) {
        self.entries
            .insert((base_dir.to_string(), include_tests), result);
    }

    /// Returns the cached result, running `scan` only on a miss.
    pub fn get_or_scan<F>(&mut self, base_dir: &str, include_tests: bool, scan: F) -> &ScanResult
    where
        F: FnOnce() -> ScanResult,
    {
        self.entries
            .entry((base_dir.to_string(), include_tests))
            .or_insert_with(scan)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
