use std::path::{Component, Path};

/// Renders a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins a configured base directory and a walk sub-path into one
/// slash-normalized relative path.
pub fn join_relative(base_dir: &str, sub_path: &str) -> String {
    let base = base_dir.replace('\\', "/");
    let base = base.trim_matches('/');
    match (base.is_empty(), sub_path.is_empty()) {
        (true, _) => sub_path.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{sub_path}"),
    }
}
