use std::path::Path;

/// Directory names that never contain extensions.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", "vendor", "bower_components"];

pub const TESTS_DIR: &str = "tests";

/// Decides which subtrees the scanner descends into.
pub trait TraversalFilter: Send + Sync {
    /// `name` is the directory's own name, `sub_path` its path relative to the
    /// scanned base directory.
    fn accept_dir(&self, name: &str, sub_path: &Path) -> bool;

    /// Hidden files are skipped, matching the hidden-directory rule.
    fn accept_file(&self, name: &str) -> bool {
        !name.starts_with('.')
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionDirFilter {
    excluded_dirs: Vec<String>,
    include_tests: bool,
}

impl ExtensionDirFilter {
    pub fn new(include_tests: bool) -> Self {
        Self {
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            include_tests,
        }
    }

    pub fn with_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_tests(&self) -> bool {
        self.include_tests
    }
}

impl TraversalFilter for ExtensionDirFilter {
    fn accept_dir(&self, name: &str, _sub_path: &Path) -> bool {
        // Covers .git, .svn and friends.
        if name.starts_with('.') {
            return false;
        }
        if !self.include_tests && name == TESTS_DIR {
            return false;
        }
        !self.excluded_dirs.iter().any(|d| d == name)
    }
}
