use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};

/// File name suffix that marks a manifest.
pub const MANIFEST_SUFFIX: &str = ".info.yml";

/// One discovered extension.
///
/// Identity for precedence resolution is `name`, not the manifest path: two
/// descriptors with the same name from different search roots describe the
/// same logical extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionDescriptor {
    pub name: String,
    #[serde(serialize_with = "serialize_root")]
    pub root: Arc<PathBuf>,
    #[serde(rename = "type")]
    pub extension_type: String,
    pub relative_path: String,
    pub primary_file: Option<String>,
    pub sub_path: String,
    pub origin: String,
}

impl ExtensionDescriptor {
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.relative_path)
    }

    /// Directory holding the manifest, relative to the root.
    pub fn directory(&self) -> &str {
        self.relative_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }

    pub fn primary_file_path(&self) -> Option<PathBuf> {
        self.primary_file
            .as_ref()
            .map(|file| self.root.join(self.directory()).join(file))
    }
}

fn serialize_root<S: Serializer>(root: &Arc<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&root.to_string_lossy())
}

/// Raw scanner output: type -> absolute manifest path -> descriptor.
pub type ScanResult = HashMap<String, HashMap<PathBuf, ExtensionDescriptor>>;

/// Final registry keyed by extension name.
pub type ExtensionRegistry = BTreeMap<String, ExtensionDescriptor>;

/// Extension name for a manifest file name, or `None` when it is not a manifest.
pub fn extension_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(MANIFEST_SUFFIX)
        .filter(|name| !name.is_empty())
}

pub(crate) fn is_manifest(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(extension_name)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(relative_path: &str, primary_file: Option<&str>) -> ExtensionDescriptor {
        ExtensionDescriptor {
            name: "alpha".to_string(),
            root: Arc::new(PathBuf::from("/srv/site")),
            extension_type: "module".to_string(),
            relative_path: relative_path.to_string(),
            primary_file: primary_file.map(str::to_string),
            sub_path: "alpha".to_string(),
            origin: "modules/pdb".to_string(),
        }
    }

    #[test]
    fn test_extension_name() {
        assert_eq!(extension_name("alpha.info.yml"), Some("alpha"));
        assert_eq!(extension_name("alpha.yml"), None);
        assert_eq!(extension_name(".info.yml"), None);
    }

    #[test]
    fn test_is_manifest() {
        assert!(is_manifest(Path::new("/a/b/alpha.info.yml")));
        assert!(!is_manifest(Path::new("/a/b/alpha.module")));
    }

    #[test]
    fn test_paths() {
        let d = descriptor("modules/pdb/alpha/alpha.info.yml", Some("alpha.module"));
        assert_eq!(d.directory(), "modules/pdb/alpha");
        assert_eq!(
            d.manifest_path(),
            PathBuf::from("/srv/site/modules/pdb/alpha/alpha.info.yml")
        );
        assert_eq!(
            d.primary_file_path(),
            Some(PathBuf::from("/srv/site/modules/pdb/alpha/alpha.module"))
        );
    }

    #[test]
    fn test_serialize_uses_type_key() {
        let d = descriptor("modules/pdb/alpha/alpha.info.yml", None);
        let value = serde_json::to_value(&d).unwrap();
        assert_eq!(value["type"], "module");
        assert_eq!(value["root"], "/srv/site");
        assert!(value["primary_file"].is_null());
    }
}
