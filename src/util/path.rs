use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a path-like string.
///
/// Unresolvable references leave the input unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Directory holding a TOC source, used to look up its local config.
///
/// A bare file name resolves to the current directory.
pub fn source_dir(toc: &Path) -> PathBuf {
    match toc.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
