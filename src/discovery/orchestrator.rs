use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::cache::ScanCache;
use super::descriptor::{ExtensionDescriptor, ExtensionRegistry};
use super::scanner::DirectoryScanner;
use crate::error::ConfigError;

/// Search directory used when nothing else is configured.
pub const DEFAULT_SEARCH_DIR: &str = "modules/pdb";

pub const DEFAULT_ORIGIN_WEIGHT: i32 = 1;

/// One search directory, relative to the scanner root, with its precedence
/// weight. Higher weights override lower ones on name collisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRoot {
    pub weight: i32,
    pub directory: String,
}

impl SearchRoot {
    pub fn new(weight: i32, directory: impl Into<String>) -> Self {
        Self {
            weight,
            directory: directory.into(),
        }
    }

    pub fn default_roots() -> Vec<SearchRoot> {
        vec![Self::new(DEFAULT_ORIGIN_WEIGHT, DEFAULT_SEARCH_DIR)]
    }

    /// Parses a list of `WEIGHT=DIR` or bare `DIR` specs. Bare entries take
    /// their declared position as weight.
    pub fn parse_list<S: AsRef<str>>(specs: &[S]) -> Result<Vec<SearchRoot>, ConfigError> {
        let roots = specs
            .iter()
            .enumerate()
            .map(|(position, spec)| {
                let spec = spec.as_ref();
                if spec.contains('=') {
                    spec.parse::<SearchRoot>()
                } else {
                    parse_directory(spec, spec).map(|dir| Self::new(position as i32, dir))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::ensure_unique(&roots)?;
        Ok(roots)
    }

    /// Each directory may appear once; a second weight for it would be ambiguous.
    pub fn ensure_unique(roots: &[SearchRoot]) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for root in roots {
            if !seen.insert(root.directory.as_str()) {
                return Err(ConfigError::invalid_search_root(
                    root.to_string(),
                    "directory is listed more than once",
                ));
            }
        }
        Ok(())
    }
}

impl FromStr for SearchRoot {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let Some((weight, directory)) = spec.split_once('=') else {
            return Ok(Self::new(DEFAULT_ORIGIN_WEIGHT, parse_directory(spec, spec)?));
        };
        let weight = weight
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid_search_root(spec, "weight is not an integer"))?;
        Ok(Self::new(weight, parse_directory(spec, directory)?))
    }
}

fn parse_directory(spec: &str, directory: &str) -> Result<String, ConfigError> {
    let directory = directory.trim().replace('\\', "/");
    let directory = directory.trim_end_matches('/');
    if directory.is_empty() {
        return Err(ConfigError::invalid_search_root(spec, "directory is empty"));
    }
    Ok(directory.to_string())
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.weight, self.directory)
    }
}

/// Returns true when a candidate must not take part in precedence resolution.
pub type ExclusionHook = Box<dyn Fn(&ExtensionDescriptor) -> bool + Send + Sync>;

/// Scans every search root, merges the results and resolves name collisions
/// by origin precedence.
pub struct ExtensionDiscovery {
    scanner: DirectoryScanner,
    roots: Vec<SearchRoot>,
    scan_cache: ScanCache,
    default_include_tests: bool,
    exclusions: Vec<ExclusionHook>,
}

impl ExtensionDiscovery {
    pub fn new(scanner: DirectoryScanner, roots: Vec<SearchRoot>) -> Self {
        Self {
            scanner,
            roots,
            scan_cache: ScanCache::new(),
            default_include_tests: false,
            exclusions: Vec::new(),
        }
    }

    /// Test inclusion used when `scan` is called without an explicit flag.
    pub fn with_default_include_tests(mut self, include_tests: bool) -> Self {
        self.default_include_tests = include_tests;
        self
    }

    pub fn with_exclusion<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ExtensionDescriptor) -> bool + Send + Sync + 'static,
    {
        self.exclusions.push(Box::new(hook));
        self
    }

    pub fn roots(&self) -> &[SearchRoot] {
        &self.roots
    }

    pub fn scan_cache(&self) -> &ScanCache {
        &self.scan_cache
    }

    pub fn scanner(&self) -> &DirectoryScanner {
        &self.scanner
    }

    /// Returns every extension of `extension_type`, one descriptor per name.
    ///
    /// Each `(directory, include_tests)` pair is walked at most once per
    /// instance; later calls, including calls for other types, read the memoized
    /// grouping. An unknown type yields an empty registry.
    pub fn scan(&mut self, extension_type: &str, include_tests: Option<bool>) -> ExtensionRegistry {
        let include_tests = include_tests.unwrap_or(self.default_include_tests);
        let mut accumulated: HashMap<_, ExtensionDescriptor> = HashMap::new();

        // Overlapping roots report the same manifest path; merging in
        // precedence order lets the higher-precedence copy overwrite.
        let mut merge_order: Vec<(i32, usize, &SearchRoot)> = self
            .roots
            .iter()
            .enumerate()
            .map(|(position, root)| (root.weight, position, root))
            .collect();
        merge_order.sort_by_key(|(weight, position, _)| (*weight, *position));

        for (_, _, root) in merge_order {
            let scanner = &self.scanner;
            let grouping = self
                .scan_cache
                .get_or_scan(&root.directory, include_tests, || {
                    scanner.scan(&root.directory, include_tests)
                });

            if let Some(found) = grouping.get(extension_type) {
                accumulated.extend(found.iter().map(|(path, d)| (path.clone(), d.clone())));
            }
        }

        let registry = self.process(accumulated.into_values().collect());
        info!(
            "Discovered {} {} extension(s) across {} search root(s)",
            registry.len(),
            extension_type,
            self.roots.len()
        );
        registry
    }

    /// Orders candidates by origin precedence and keys them by name, so the
    /// highest-precedence origin wins each collision.
    fn process(&self, mut candidates: Vec<ExtensionDescriptor>) -> ExtensionRegistry {
        let origin_weights: HashMap<&str, (i32, usize)> = self
            .roots
            .iter()
            .enumerate()
            .map(|(position, root)| (root.directory.as_str(), (root.weight, position)))
            .collect();

        candidates.retain(|d| {
            let excluded = self.exclusions.iter().any(|hook| hook(d));
            if excluded {
                debug!("Excluding {} from {}", d.name, d.origin);
            }
            !excluded
        });

        candidates.sort_by(|a, b| {
            let weight_a = origin_weights.get(a.origin.as_str());
            let weight_b = origin_weights.get(b.origin.as_str());
            weight_a
                .cmp(&weight_b)
                .then_with(|| a.relative_path.cmp(&b.relative_path))
        });

        let mut registry = ExtensionRegistry::new();
        for descriptor in candidates {
            if let Some(previous) = registry.get(&descriptor.name) {
                debug!(
                    "{} from {} overrides {}",
                    descriptor.name, descriptor.origin, previous.origin
                );
            }
            registry.insert(descriptor.name.clone(), descriptor);
        }
        registry
    }
}

impl fmt::Debug for ExtensionDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDiscovery")
            .field("scanner", &self.scanner)
            .field("roots", &self.roots)
            .field("cached_scans", &self.scan_cache.len())
            .field("default_include_tests", &self.default_include_tests)
            .field("exclusions", &self.exclusions.len())
            .finish()
    }
}
