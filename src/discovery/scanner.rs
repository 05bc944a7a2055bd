use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::cache::DescriptorCache;
use super::descriptor::{extension_name, is_manifest, ExtensionDescriptor, ScanResult};
use super::detector::{ManifestTypeDetector, TypeLineDetector};
use super::filter::{ExtensionDirFilter, TraversalFilter, DEFAULT_EXCLUDED_DIRS};
use super::utils::{join_relative, to_slash};

/// Walks one base directory below a fixed root and groups manifests by type.
pub struct DirectoryScanner {
    root: Arc<PathBuf>,
    detector: Box<dyn ManifestTypeDetector>,
    cache: Option<Arc<dyn DescriptorCache>>,
    excluded_dirs: Vec<String>,
    follow_links: bool,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root: Arc::new(root),
            detector: Box::new(TypeLineDetector::new()),
            cache: None,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            follow_links: true,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn DescriptorCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn ManifestTypeDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Symlinks are followed by default; walkdir reports link loops as walk
    /// errors, which are skipped like any other.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans `base_dir` (relative to the root) with the default directory filter.
    pub fn scan(&self, base_dir: &str, include_tests: bool) -> ScanResult {
        let filter = ExtensionDirFilter::new(include_tests)
            .with_excluded_dirs(self.excluded_dirs.iter().cloned());
        self.scan_with_filter(base_dir, &filter)
    }

    pub fn scan_with_filter(&self, base_dir: &str, filter: &dyn TraversalFilter) -> ScanResult {
        let mut result = ScanResult::new();
        let dir = self.root.join(base_dir);

        if !dir.is_dir() {
            debug!("Search directory {} does not exist, skipping", dir.display());
            return result;
        }

        let walker = WalkDir::new(&dir)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if !e.file_type().is_dir() {
                    return filter.accept_file(&name);
                }
                let sub_path = e.path().strip_prefix(&dir).unwrap_or(e.path());
                filter.accept_dir(&name, sub_path)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Skipping unreadable entry under {}: {}", dir.display(), err);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_manifest(entry.path()) {
                continue;
            }

            if let Some(descriptor) = self.describe(&dir, base_dir, entry.path()) {
                result
                    .entry(descriptor.extension_type.clone())
                    .or_default()
                    .insert(entry.path().to_path_buf(), descriptor);
            }
        }

        debug!(
            "Scanned {}: {} manifests across {} types",
            dir.display(),
            result.values().map(|group| group.len()).sum::<usize>(),
            result.len()
        );
        result
    }

    fn describe(&self, dir: &Path, base_dir: &str, path: &Path) -> Option<ExtensionDescriptor> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(path) {
                trace!("Descriptor cache hit for {}", path.display());
                return Some(hit);
            }
        }

        let Some(extension_type) = self.detector.detect_file(path) else {
            trace!("No type declared in {}, skipping", path.display());
            return None;
        };

        let name = extension_name(path.file_name()?.to_str()?)?.to_string();
        let manifest_dir = path.parent()?;
        let sub_path = manifest_dir
            .strip_prefix(dir)
            .map(to_slash)
            .unwrap_or_default();
        let relative_path = join_relative(base_dir, &to_slash(path.strip_prefix(dir).ok()?));

        let companion = format!("{name}.{extension_type}");
        let primary_file = manifest_dir.join(&companion).is_file().then_some(companion);

        let descriptor = ExtensionDescriptor {
            name,
            root: Arc::clone(&self.root),
            extension_type,
            relative_path,
            primary_file,
            sub_path,
            origin: base_dir.to_string(),
        };

        if let Some(cache) = &self.cache {
            cache.store(path.to_path_buf(), descriptor.clone());
        }

        Some(descriptor)
    }
}

impl std::fmt::Debug for DirectoryScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryScanner")
            .field("root", &self.root)
            .field("cached", &self.cache.is_some())
            .field("excluded_dirs", &self.excluded_dirs)
            .field("follow_links", &self.follow_links)
            .finish()
    }
}
