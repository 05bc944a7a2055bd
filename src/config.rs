use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::{DescriptorCache, DirectoryScanner, ExtensionDiscovery, SearchRoot};
use crate::error::ConfigError;

/// Environment signal consulted when test inclusion is not set explicitly.
pub const INCLUDE_TESTS_ENV: &str = "EXTDISC_INCLUDE_TESTS";

/// Discovery settings, usually read from a YAML file.
///
/// ```yaml
/// root: /srv/site
/// search_roots:
///   - weight: 1
///     directory: modules/pdb
/// include_tests: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub search_roots: Vec<SearchRoot>,
    pub excluded_dirs: Option<Vec<String>>,
    pub include_tests: Option<bool>,
    pub follow_links: Option<bool>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let settings = Self::from_yaml(&content, path)?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Configured roots, or the single default root when none are set.
    pub fn search_roots(&self) -> Vec<SearchRoot> {
        if self.search_roots.is_empty() {
            SearchRoot::default_roots()
        } else {
            self.search_roots.clone()
        }
    }

    /// Test inclusion from the settings, falling back to the environment.
    pub fn include_tests(&self) -> Result<bool, ConfigError> {
        match self.include_tests {
            Some(include) => Ok(include),
            None => include_tests_from_env(),
        }
    }

    pub fn build_scanner(&self, root: &Path, cache: Option<Arc<dyn DescriptorCache>>) -> DirectoryScanner {
        let mut scanner = DirectoryScanner::new(root).follow_links(self.follow_links.unwrap_or(true));
        if let Some(dirs) = &self.excluded_dirs {
            scanner = scanner.with_excluded_dirs(dirs.iter().cloned());
        }
        if let Some(cache) = cache {
            scanner = scanner.with_cache(cache);
        }
        scanner
    }

    pub fn build_discovery(
        &self,
        root: &Path,
        cache: Option<Arc<dyn DescriptorCache>>,
    ) -> Result<ExtensionDiscovery, ConfigError> {
        let roots = self.search_roots();
        SearchRoot::ensure_unique(&roots)?;
        let scanner = self.build_scanner(root, cache);
        Ok(ExtensionDiscovery::new(scanner, roots)
            .with_default_include_tests(self.include_tests()?))
    }
}

pub fn include_tests_from_env() -> Result<bool, ConfigError> {
    match std::env::var(INCLUDE_TESTS_ENV) {
        Ok(value) => parse_flag(INCLUDE_TESTS_ENV, &value),
        Err(_) => Ok(false),
    }
}

pub fn parse_flag(variable: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_flag(variable, value)),
    }
}
