use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use extension_discovery::discovery::{
    DescriptorCache, DirectoryScanner, ExtensionDescriptor, ExtensionDiscovery,
    ManifestTypeDetector, MemoryDescriptorCache, SearchRoot, TypeLineDetector,
    DEFAULT_ORIGIN_WEIGHT, DEFAULT_SEARCH_DIR,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn default_discovery(root: &Path) -> ExtensionDiscovery {
    ExtensionDiscovery::new(DirectoryScanner::new(root), SearchRoot::default_roots())
}

#[derive(Default)]
struct CountingCache {
    inner: MemoryDescriptorCache,
    lookups: AtomicUsize,
    stores: AtomicUsize,
}

impl DescriptorCache for CountingCache {
    fn lookup(&self, path: &Path) -> Option<ExtensionDescriptor> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(path)
    }

    fn store(&self, path: PathBuf, descriptor: ExtensionDescriptor) {
        self.stores.fetch_add(1, Ordering::SeqCst);
        self.inner.store(path, descriptor);
    }
}

struct CountingDetector {
    reads: Arc<AtomicUsize>,
}

impl ManifestTypeDetector for CountingDetector {
    fn detect_type(&self, reader: &mut dyn BufRead) -> Option<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        TypeLineDetector.detect_type(reader)
    }
}

#[test]
fn test_single_module_without_companion() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "name: Alpha\ntype: module\n");

    let registry = default_discovery(root).scan("module", None);

    assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["alpha"]);
    let alpha = &registry["alpha"];
    assert_eq!(alpha.extension_type, "module");
    assert_eq!(alpha.relative_path, "modules/pdb/alpha/alpha.info.yml");
    assert_eq!(alpha.primary_file, None);
    assert_eq!(alpha.origin, DEFAULT_SEARCH_DIR);
}

#[test]
fn test_single_module_with_companion() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: module\n");
    write(root, "modules/pdb/alpha/alpha.module", "<?php\n");

    let registry = default_discovery(root).scan("module", None);

    assert_eq!(registry["alpha"].primary_file.as_deref(), Some("alpha.module"));
    assert!(registry["alpha"].primary_file_path().unwrap().is_file());
}

#[test]
fn test_companion_must_match_type() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: theme\n");
    write(root, "modules/pdb/alpha/alpha.module", "");

    let registry = default_discovery(root).scan("theme", None);
    assert_eq!(registry["alpha"].primary_file, None);
}

#[test]
fn test_manifest_without_type_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "name: Alpha\n");

    let mut discovery = default_discovery(root);
    assert!(discovery.scan("module", Some(false)).is_empty());
    assert!(discovery.scan("module", Some(true)).is_empty());
}

#[test]
fn test_missing_search_root_yields_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let registry = default_discovery(temp_dir.path()).scan("module", None);
    assert!(registry.is_empty());
}

#[test]
fn test_tests_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: module\n");
    write(
        root,
        "modules/pdb/alpha/tests/modules/alpha_test/alpha_test.info.yml",
        "type: module\n",
    );

    let mut discovery = default_discovery(root);
    let without = discovery.scan("module", Some(false));
    let with = discovery.scan("module", Some(true));

    assert_eq!(without.keys().collect::<Vec<_>>(), vec!["alpha"]);
    assert_eq!(with.keys().collect::<Vec<_>>(), vec!["alpha", "alpha_test"]);
}

#[test]
fn test_precedence_across_roots() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "core/modules/foo/foo.info.yml", "type: module\n");
    write(root, "core/modules/bar/bar.info.yml", "type: module\n");
    write(root, "sites/all/modules/foo/foo.info.yml", "type: module\n");

    let roots = vec![
        SearchRoot::new(0, "core/modules"),
        SearchRoot::new(1, "sites/all/modules"),
    ];
    let registry = ExtensionDiscovery::new(DirectoryScanner::new(root), roots).scan("module", None);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry["foo"].origin, "sites/all/modules");
    assert_eq!(registry["foo"].relative_path, "sites/all/modules/foo/foo.info.yml");
    assert_eq!(registry["bar"].origin, "core/modules");
}

#[test]
fn test_types_are_separated() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: module\n");
    write(root, "modules/pdb/olivero/olivero.info.yml", "type: 'theme'\n");

    let mut discovery = default_discovery(root);
    assert_eq!(discovery.scan("module", None).keys().collect::<Vec<_>>(), vec!["alpha"]);
    assert_eq!(discovery.scan("theme", None).keys().collect::<Vec<_>>(), vec!["olivero"]);
    assert!(discovery.scan("profile", None).is_empty());
    assert_eq!(discovery.scan_cache().len(), 1);
}

#[test]
fn test_repeat_scan_is_idempotent_and_memoized() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: module\n");
    write(root, "modules/pdb/beta/beta.info.yml", "type: module\n");

    let cache = Arc::new(CountingCache::default());
    let reads = Arc::new(AtomicUsize::new(0));
    let scanner = DirectoryScanner::new(root)
        .with_cache(cache.clone())
        .with_detector(Box::new(CountingDetector {
            reads: reads.clone(),
        }));
    let mut discovery = ExtensionDiscovery::new(scanner, SearchRoot::default_roots());

    let first = discovery.scan("module", Some(false));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.stores.load(Ordering::SeqCst), 2);
    let lookups = cache.lookups.load(Ordering::SeqCst);

    let second = discovery.scan("module", Some(false));
    assert_eq!(first, second);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(cache.lookups.load(Ordering::SeqCst), lookups);
}

#[test]
fn test_shared_descriptor_cache_skips_manifest_reads() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "modules/pdb/alpha/alpha.info.yml", "type: module\n");

    let cache = Arc::new(CountingCache::default());
    let reads = Arc::new(AtomicUsize::new(0));
    let build = || {
        let scanner = DirectoryScanner::new(root)
            .with_cache(cache.clone())
            .with_detector(Box::new(CountingDetector {
                reads: reads.clone(),
            }));
        ExtensionDiscovery::new(scanner, SearchRoot::default_roots())
    };

    let first = build().scan("module", None);
    let second = build().scan("module", None);

    assert_eq!(first, second);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stores.load(Ordering::SeqCst), 1);
}

#[test]
fn test_default_root_weight() {
    let roots = SearchRoot::default_roots();
    assert_eq!(roots, vec![SearchRoot::new(DEFAULT_ORIGIN_WEIGHT, DEFAULT_SEARCH_DIR)]);
}
